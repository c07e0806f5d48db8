//! Server core
//!
//! Builds the axum router and owns the listener lifecycle.

use axum::Router;
use axum::routing::{get, post};
use log::{error, info};
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::{ServeDir, ServeFile};

use crate::config::{SharedRuntimeConfig, StartupConfig};
use crate::directory::MemoryStore;
use crate::mail::{MailTransport, SmtpMailer};
use crate::server::handlers;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MemoryStore>,
    pub mailer: Arc<dyn MailTransport>,
    pub runtime: SharedRuntimeConfig,
}

/// Assemble the portal router: relay + admin API, health probe, and the
/// static frontend with SPA fallback.
pub fn build_router(state: AppState, startup: &StartupConfig) -> Router {
    let index = Path::new(&startup.static_dir).join("index.html");
    let frontend = ServeDir::new(&startup.static_dir).not_found_service(ServeFile::new(index));

    Router::new()
        .route("/api/send-email", post(handlers::send_email))
        .route("/api/admin/find-user", post(handlers::find_user))
        .route("/api/admin/check-secret", post(handlers::check_secret))
        .route("/api/admin/sign-in", post(handlers::sign_in))
        .route("/api/admin/sign-out", post(handlers::sign_out))
        .route("/health", get(health))
        .with_state(state)
        .fallback_service(frontend)
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(startup.max_body_bytes))
}

async fn health() -> &'static str {
    "ok"
}

pub struct Server {
    listener: TcpListener,
    router: Router,
}

impl Server {
    pub async fn new(startup: StartupConfig, runtime: SharedRuntimeConfig) -> Self {
        let mailer = match SmtpMailer::from_config(&startup) {
            Ok(mailer) => mailer,
            Err(e) => {
                error!("Failed to configure mail transport: {}", e);
                panic!("Mail transport setup failed: {}", e);
            }
        };
        mailer.check_connection().await;

        let state = AppState {
            store: Arc::new(MemoryStore::seeded()),
            mailer: Arc::new(mailer),
            runtime,
        };
        let router = build_router(state, &startup);

        let socket = startup.bind_socket();
        let listener = match TcpListener::bind(&socket).await {
            Ok(listener) => {
                info!("Server bound to {}", socket);
                listener
            }
            Err(e) => {
                error!("Failed to bind to {}: {}", socket, e);
                panic!("Server startup failed on socket {}: {}", socket, e);
            }
        };

        Self { listener, router }
    }

    pub async fn start(self) {
        if let Ok(addr) = self.listener.local_addr() {
            info!("Starting MATRON portal on {}", addr);
        }

        if let Err(e) = axum::serve(self.listener, self.router).await {
            error!("Server error: {}", e);
        }
    }
}
