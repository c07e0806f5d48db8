//! Remote directory
//!
//! HTTP-backed implementations of the directory contracts, for consumers
//! embedding the credential controller outside the portal process. Talks
//! to the portal's admin API.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::auth::Session;
use crate::directory::store::{AdminDirectory, AdminRecord, Authenticator};
use crate::error::{AuthError, DirectoryError};

fn transport_error(e: reqwest::Error) -> DirectoryError {
    if e.is_timeout() {
        DirectoryError::Timeout
    } else {
        DirectoryError::Transport(e.to_string())
    }
}

#[derive(Deserialize)]
struct FindUserResponse {
    record: Option<AdminRecord>,
}

#[derive(Deserialize)]
struct CheckResponse {
    valid: bool,
}

/// Record lookups over the portal admin API.
pub struct RemoteDirectory {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteDirectory {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl AdminDirectory for RemoteDirectory {
    async fn find_user(&self, username: &str) -> Result<Option<AdminRecord>, DirectoryError> {
        let response = self
            .client
            .post(format!("{}/api/admin/find-user", self.base_url))
            .json(&serde_json::json!({ "username": username }))
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(DirectoryError::Transport(format!(
                "find-user returned {}",
                response.status()
            )));
        }

        let body: FindUserResponse = response
            .json()
            .await
            .map_err(transport_error)?;
        Ok(body.record)
    }

    async fn verify_secret_key(
        &self,
        username: &str,
        secret_key: &str,
    ) -> Result<bool, DirectoryError> {
        let response = self
            .client
            .post(format!("{}/api/admin/check-secret", self.base_url))
            .json(&serde_json::json!({
                "username": username,
                "secret_key": secret_key,
            }))
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(DirectoryError::Transport(format!(
                "check-secret returned {}",
                response.status()
            )));
        }

        let body: CheckResponse = response
            .json()
            .await
            .map_err(transport_error)?;
        Ok(body.valid)
    }
}

/// Sign-in/sign-out over the portal admin API.
pub struct RemoteAuthenticator {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteAuthenticator {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Authenticator for RemoteAuthenticator {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let response = self
            .client
            .post(format!("{}/api/admin/sign-in", self.base_url))
            .json(&serde_json::json!({
                "email": email,
                "password": password,
            }))
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            Err(AuthError::LoginFailed)
        } else if status.is_success() {
            response
                .json::<Session>()
                .await
                .map_err(|e| AuthError::Transport(e.to_string()))
        } else {
            Err(AuthError::Transport(format!("sign-in returned {}", status)))
        }
    }

    async fn sign_out(&self, token: &str) -> Result<(), AuthError> {
        self.client
            .post(format!("{}/api/admin/sign-out", self.base_url))
            .json(&serde_json::json!({ "token": token }))
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        Ok(())
    }
}
