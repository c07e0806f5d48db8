//! Error handlers
//!
//! Maps portal errors to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::error;

use crate::error::types::{AuthError, MailError, PortalError};

/// Handle a portal error
pub fn handle_error(err: &PortalError) {
    error!("Portal error: {}", err);
}

/// Convert an error to the HTTP status code returned to the client
pub fn error_to_status(err: &PortalError) -> StatusCode {
    match err {
        PortalError::Auth(AuthError::LoginFailed) => StatusCode::UNAUTHORIZED,
        PortalError::Auth(AuthError::Transport(_)) => StatusCode::BAD_GATEWAY,
        PortalError::Directory(_) => StatusCode::BAD_GATEWAY,
        PortalError::Mail(MailError::MissingFields) => StatusCode::BAD_REQUEST,
        PortalError::Mail(_) => StatusCode::INTERNAL_SERVER_ERROR,
        PortalError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        PortalError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// The message the client sees. Internal detail stays in the logs.
fn user_message(err: &PortalError) -> String {
    match err {
        PortalError::Auth(AuthError::LoginFailed) => err.to_string(),
        PortalError::Mail(MailError::MissingFields) => {
            "Name, email, and message are required".to_string()
        }
        PortalError::Mail(_) => "Failed to send email".to_string(),
        PortalError::Directory(_) => "Directory lookup failed".to_string(),
        _ => "Internal server error".to_string(),
    }
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        handle_error(&self);
        let status = error_to_status(&self);
        let body = serde_json::json!({ "error": user_message(&self) });
        (status, Json(body)).into_response()
    }
}
