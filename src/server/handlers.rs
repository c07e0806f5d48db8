//! Request handlers
//!
//! Handlers for the contact mail relay and the admin credential API.
//! Remote-call failures on the check endpoints fail closed: the client
//! sees an invalid result, never a distinct transport error.

use axum::Json;
use axum::extract::State;
use chrono::Local;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::auth::Session;
use crate::directory::{AdminDirectory, AdminRecord, Authenticator};
use crate::error::{AuthError, PortalError};
use crate::mail::{self, ContactMessage};
use crate::middleware::logging;
use crate::server::core::AppState;

#[derive(Deserialize)]
pub struct FindUserRequest {
    pub username: String,
}

#[derive(Serialize)]
pub struct FindUserResponse {
    pub record: Option<AdminRecord>,
}

#[derive(Deserialize)]
pub struct CheckSecretRequest {
    pub username: String,
    pub secret_key: String,
}

#[derive(Serialize)]
pub struct CheckResponse {
    pub valid: bool,
}

#[derive(Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct SignOutRequest {
    pub token: String,
}

/// POST /api/send-email
///
/// Validates the submission, renders it, and forwards it through the
/// configured SMTP transport.
pub async fn send_email(
    State(state): State<AppState>,
    Json(contact): Json<ContactMessage>,
) -> Result<Json<serde_json::Value>, PortalError> {
    logging::log_contact_request(&contact.name, &contact.email);

    contact.validate()?;

    let rendered = mail::render(&contact, Local::now());
    let to = state.runtime.read().await.mail_to.clone();

    let id = state.mailer.send(&contact, &rendered, &to).await?;
    info!("Contact message relayed as {}", id.0);

    Ok(Json(serde_json::json!({
        "message": "Email sent successfully",
        "messageId": id.0,
    })))
}

/// POST /api/admin/find-user
pub async fn find_user(
    State(state): State<AppState>,
    Json(req): Json<FindUserRequest>,
) -> Result<Json<FindUserResponse>, PortalError> {
    logging::log_admin_check("find-user", &req.username);
    let record = state.store.find_user(&req.username).await?;
    Ok(Json(FindUserResponse { record }))
}

/// POST /api/admin/check-secret
///
/// The stored secret never leaves the server; the response is a boolean.
pub async fn check_secret(
    State(state): State<AppState>,
    Json(req): Json<CheckSecretRequest>,
) -> Json<CheckResponse> {
    logging::log_admin_check("check-secret", &req.username);

    let valid = match state
        .store
        .verify_secret_key(&req.username, &req.secret_key)
        .await
    {
        Ok(valid) => valid,
        Err(e) => {
            warn!("Secret key check failed: {}", e);
            false
        }
    };

    Json(CheckResponse { valid })
}

/// POST /api/admin/sign-in
///
/// Any rejection maps to the same generic message.
pub async fn sign_in(
    State(state): State<AppState>,
    Json(req): Json<SignInRequest>,
) -> Result<Json<Session>, PortalError> {
    match state.store.sign_in(&req.email, &req.password).await {
        Ok(session) => {
            info!("Admin session issued for {}", req.email);
            Ok(Json(session))
        }
        Err(e) => {
            warn!("Sign-in rejected for {}: {}", req.email, e);
            Err(PortalError::Auth(AuthError::LoginFailed))
        }
    }
}

/// POST /api/admin/sign-out
pub async fn sign_out(
    State(state): State<AppState>,
    Json(req): Json<SignOutRequest>,
) -> Result<Json<serde_json::Value>, PortalError> {
    state
        .store
        .sign_out(&req.token)
        .await
        .map_err(PortalError::Auth)?;
    Ok(Json(serde_json::json!({ "status": "signed out" })))
}
