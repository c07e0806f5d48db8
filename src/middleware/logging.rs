//! Logging middleware
//!
//! Provides request logging functionality.

use log::info;

/// Log an incoming contact-form submission
pub fn log_contact_request(name: &str, email: &str) {
    info!("Received contact message from {} <{}>", name, email);
}

/// Log an admin credential check
pub fn log_admin_check(endpoint: &str, username: &str) {
    info!("Admin {} request for '{}'", endpoint, username);
}
