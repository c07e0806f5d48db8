//! MATRON Portal - Entry Point
//!
//! Backend for the MATRON portfolio site: contact-form mail relay,
//! admin credential API, and static frontend serving.

use env_logger;
use log::{error, info};

use matron_portal::Server;
use matron_portal::config::PortalConfig;

#[tokio::main]
async fn main() {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::init();

    info!("Launching MATRON portal...");

    let (startup, runtime) = match PortalConfig::load() {
        Ok(config) => config.split(),
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return;
        }
    };

    let server = Server::new(startup, runtime).await;
    server.start().await;
}
