//! In-memory directory
//!
//! Instance-owned admin record store implementing both directory contracts.
//! Backs the development server and the test suite; in production this
//! would be the hosted database.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use uuid::Uuid;

use crate::auth::Session;
use crate::directory::store::{AdminDirectory, AdminRecord, Authenticator};
use crate::error::{AuthError, DirectoryError};

struct StoredAdmin {
    email: String,
    secret_key: String,
    password: String,
}

/// In-memory admin store with session tracking.
pub struct MemoryStore {
    records: HashMap<String, StoredAdmin>,
    sessions: Mutex<HashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
            sessions: Mutex::new(HashSet::new()),
        }
    }

    /// Register an admin account. Builder-style, used at startup and in tests.
    pub fn with_admin(
        mut self,
        username: &str,
        email: &str,
        secret_key: &str,
        password: &str,
    ) -> Self {
        self.records.insert(
            username.to_string(),
            StoredAdmin {
                email: email.to_string(),
                secret_key: secret_key.to_string(),
                password: password.to_string(),
            },
        );
        self
    }

    /// Development store with the default admin account.
    pub fn seeded() -> Self {
        Self::new().with_admin("admin", "admin@matron.dev", "matron-key", "admin123")
    }

    /// Whether a session token is currently active.
    pub fn session_active(&self, token: &str) -> bool {
        self.sessions.lock().unwrap().contains(token)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AdminDirectory for MemoryStore {
    async fn find_user(&self, username: &str) -> Result<Option<AdminRecord>, DirectoryError> {
        Ok(self.records.get(username).map(|stored| AdminRecord {
            username: username.to_string(),
            email: stored.email.clone(),
        }))
    }

    async fn verify_secret_key(
        &self,
        username: &str,
        secret_key: &str,
    ) -> Result<bool, DirectoryError> {
        Ok(self
            .records
            .get(username)
            .map(|stored| stored.secret_key == secret_key)
            .unwrap_or(false))
    }
}

#[async_trait]
impl Authenticator for MemoryStore {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let matched = self
            .records
            .values()
            .any(|stored| stored.email == email && stored.password == password);

        if !matched {
            return Err(AuthError::LoginFailed);
        }

        let session = Session {
            token: Uuid::new_v4().to_string(),
            email: email.to_string(),
            issued_at: Utc::now(),
        };
        self.sessions.lock().unwrap().insert(session.token.clone());
        Ok(session)
    }

    async fn sign_out(&self, token: &str) -> Result<(), AuthError> {
        self.sessions.lock().unwrap().remove(token);
        Ok(())
    }
}
