//! Contact message
//!
//! The contact-form payload and its validation.

use serde::Deserialize;

use crate::error::MailError;

/// A contact-form submission.
#[derive(Debug, Clone, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactMessage {
    /// All three fields must be present and non-blank.
    pub fn validate(&self) -> Result<(), MailError> {
        if self.name.trim().is_empty()
            || self.email.trim().is_empty()
            || self.message.trim().is_empty()
        {
            return Err(MailError::MissingFields);
        }
        Ok(())
    }
}
