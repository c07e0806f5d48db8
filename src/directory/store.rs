//! Directory and authentication contracts
//!
//! These traits stand in for the hosted backend. Implementations can be
//! in-process (development, tests) or remote, and the rest of the crate
//! only ever talks to the contracts.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::auth::Session;
use crate::error::{AuthError, DirectoryError};

/// An admin user record as exposed by the directory.
///
/// Carries the sign-in identifier only. The stored secret key never leaves
/// the directory; callers ask it to verify a candidate instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminRecord {
    pub username: String,
    pub email: String,
}

/// Record lookup service.
#[async_trait]
pub trait AdminDirectory: Send + Sync {
    /// Fetch the record registered under `username`, if any.
    async fn find_user(&self, username: &str) -> Result<Option<AdminRecord>, DirectoryError>;

    /// Compare a candidate secret key against the stored one for `username`.
    ///
    /// Returns `false` for unknown usernames as well as mismatches.
    async fn verify_secret_key(
        &self,
        username: &str,
        secret_key: &str,
    ) -> Result<bool, DirectoryError>;
}

/// Authentication service.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Exchange an email/password pair for a session.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    /// Invalidate a previously issued session token.
    async fn sign_out(&self, token: &str) -> Result<(), AuthError>;
}
