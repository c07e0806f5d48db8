//! Admin authentication
//!
//! Implements the staged credential validation flow behind the admin login:
//! username, then secret key, then password, each gating the next.

pub mod controller;
pub mod status;

pub use controller::{CredentialController, Timing};
pub use status::{FieldStatus, FormSnapshot, Session};
