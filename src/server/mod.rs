//! HTTP server
//!
//! This module contains the router setup, request handlers, and the
//! server bootstrap for the portal.

pub mod core;
pub mod handlers;

pub use core::{AppState, Server, build_router};
