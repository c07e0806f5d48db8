//! Error types
//!
//! Defines domain-specific error types for each module of the portal.

use std::fmt;
use std::io;

/// User-visible message for any failed sign-in attempt. Kept deliberately
/// generic so the response does not reveal which credential was wrong.
pub const LOGIN_FAILED_MESSAGE: &str = "Login failed. Please try again.";

/// Authentication module errors
#[derive(Debug)]
pub enum AuthError {
    /// Sign-in was rejected; surfaced to users as one generic message
    LoginFailed,
    /// The authentication service could not be reached
    Transport(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::LoginFailed => write!(f, "{}", LOGIN_FAILED_MESSAGE),
            AuthError::Transport(e) => write!(f, "Authentication service unreachable: {}", e),
        }
    }
}

impl std::error::Error for AuthError {}

/// Directory (record lookup) module errors
#[derive(Debug)]
pub enum DirectoryError {
    Transport(String),
    Timeout,
}

impl fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectoryError::Transport(e) => write!(f, "Directory lookup failed: {}", e),
            DirectoryError::Timeout => write!(f, "Directory lookup timed out"),
        }
    }
}

impl std::error::Error for DirectoryError {}

/// Mail relay module errors
#[derive(Debug)]
pub enum MailError {
    /// One or more of name/email/message was missing or blank
    MissingFields,
    InvalidAddress(String),
    Transport(String),
}

impl fmt::Display for MailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MailError::MissingFields => {
                write!(f, "Name, email, and message are required")
            }
            MailError::InvalidAddress(addr) => write!(f, "Invalid mail address: {}", addr),
            MailError::Transport(e) => write!(f, "Mail transport error: {}", e),
        }
    }
}

impl std::error::Error for MailError {}

/// General portal error that encompasses all error types
#[derive(Debug)]
pub enum PortalError {
    Auth(AuthError),
    Directory(DirectoryError),
    Mail(MailError),
    Config(config::ConfigError),
    IoError(io::Error),
}

impl fmt::Display for PortalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortalError::Auth(e) => write!(f, "Authentication error: {}", e),
            PortalError::Directory(e) => write!(f, "Directory error: {}", e),
            PortalError::Mail(e) => write!(f, "Mail error: {}", e),
            PortalError::Config(e) => write!(f, "Configuration error: {}", e),
            PortalError::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for PortalError {}

// Implement conversions from specific errors to PortalError
impl From<AuthError> for PortalError {
    fn from(error: AuthError) -> Self {
        PortalError::Auth(error)
    }
}

impl From<DirectoryError> for PortalError {
    fn from(error: DirectoryError) -> Self {
        PortalError::Directory(error)
    }
}

impl From<MailError> for PortalError {
    fn from(error: MailError) -> Self {
        PortalError::Mail(error)
    }
}

impl From<config::ConfigError> for PortalError {
    fn from(error: config::ConfigError) -> Self {
        PortalError::Config(error)
    }
}

impl From<io::Error> for PortalError {
    fn from(error: io::Error) -> Self {
        PortalError::IoError(error)
    }
}
