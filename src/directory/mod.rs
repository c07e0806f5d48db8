//! Admin directory
//!
//! Contracts for the hosted record-lookup and authentication services,
//! plus the in-process and HTTP-backed implementations.

pub mod memory;
pub mod remote;
pub mod store;

pub use memory::MemoryStore;
pub use remote::{RemoteAuthenticator, RemoteDirectory};
pub use store::{AdminDirectory, AdminRecord, Authenticator};
