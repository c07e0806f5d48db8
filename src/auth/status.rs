//! Validation status types
//!
//! Defines the per-field validation states and the observable form snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Validation state of a remotely checked credential field.
///
/// `Unknown` is both the initial state and the state of an empty field.
/// Transitions are driven only by completed remote lookups or by upstream
/// invalidation; a field re-enters `Unknown` the moment its input changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FieldStatus {
    #[default]
    Unknown,
    Checking,
    Valid,
    Invalid,
}

impl FieldStatus {
    /// Whether the field has passed its remote check.
    pub fn is_valid(&self) -> bool {
        matches!(self, FieldStatus::Valid)
    }
}

/// An authenticated admin session returned by a successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub email: String,
    pub issued_at: DateTime<Utc>,
}

/// Observable state of the login form, published on every transition.
///
/// Consumers (the view layer) subscribe to this instead of reading any
/// ambient flags; drafts themselves are not included.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormSnapshot {
    pub username_status: FieldStatus,
    pub secret_key_status: FieldStatus,
    pub authenticated: bool,
    /// User-visible error from the last submit attempt, if any
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_status_is_unknown() {
        assert_eq!(FieldStatus::default(), FieldStatus::Unknown);
        assert!(!FieldStatus::Unknown.is_valid());
        assert!(FieldStatus::Valid.is_valid());
    }

    #[test]
    fn test_snapshot_default() {
        let snapshot = FormSnapshot::default();
        assert_eq!(snapshot.username_status, FieldStatus::Unknown);
        assert_eq!(snapshot.secret_key_status, FieldStatus::Unknown);
        assert!(!snapshot.authenticated);
        assert!(snapshot.error.is_none());
    }
}
