//! Configuration management for the MATRON portal
//!
//! Separates startup configuration (requires restart) from runtime configuration
//! (can be updated while the server is running).

use config::{Config, Environment, File};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Complete portal configuration with startup/runtime separation
#[derive(Debug, Deserialize, Clone)]
pub struct PortalConfig {
    #[serde(flatten)]
    pub startup: StartupConfig,

    #[serde(flatten)]
    pub runtime: RuntimeConfig,
}

/// Configuration that requires a server restart to take effect
/// These values are loaded once during server initialization
#[derive(Debug, Deserialize, Clone)]
pub struct StartupConfig {
    // ═══ NETWORK (Environment Override Supported) ═══
    /// IP address to bind the HTTP listener (restart required)
    pub bind_address: String,

    /// Port for the HTTP listener (restart required)
    pub port: u16,

    /// Directory holding the built frontend bundle (restart required)
    pub static_dir: String,

    /// Maximum accepted request body size in bytes (restart required)
    pub max_body_bytes: usize,

    // ═══ MAIL RELAY (restart required) ═══
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_user: String,
    pub smtp_pass: String,

    /// Sender address for relayed contact messages
    pub mail_from: String,
    pub mail_from_name: String,

    // ═══ CREDENTIAL VALIDATION TIMING (restart required) ═══
    /// Debounce delay before a username existence check fires
    pub username_debounce_ms: u64,

    /// Debounce delay before a secret-key check fires
    pub secret_key_debounce_ms: u64,

    /// Upper bound on any single remote lookup or sign-in call
    pub lookup_timeout_secs: u64,
}

/// Configuration that can be updated at runtime
/// These values can be changed while the server is running
#[derive(Debug, Deserialize, Clone)]
pub struct RuntimeConfig {
    /// Destination inbox for relayed contact messages (runtime updatable)
    /// Environment: MATRON_MAIL_TO
    pub mail_to: String,
}

/// Thread-safe runtime configuration wrapper
pub type SharedRuntimeConfig = Arc<RwLock<RuntimeConfig>>;

impl PortalConfig {
    /// Load configuration from config.toml with environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        // Try production path first, then development path
        let config_paths = vec![
            "matron-portal/config", // Docker production: /app/matron-portal/config.toml
            "config",               // Local development: ./config.toml
        ];

        let mut last_error = None;

        for config_path in &config_paths {
            match Config::builder()
                .add_source(File::with_name(config_path))
                .add_source(Environment::with_prefix("MATRON").separator("_"))
                .build()
            {
                Ok(settings) => {
                    let config: PortalConfig = settings.try_deserialize()?;
                    config.validate()?;
                    return Ok(config);
                }
                Err(e) => {
                    last_error = Some(e);
                    continue;
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            config::ConfigError::Message(format!(
                "failed to load config.toml from any of {config_paths:?}"
            ))
        }))
    }

    /// Split into startup (immutable) and runtime (mutable) parts
    pub fn split(self) -> (StartupConfig, SharedRuntimeConfig) {
        let runtime = Arc::new(RwLock::new(self.runtime));
        (self.startup, runtime)
    }

    /// Validation for all configuration values
    fn validate(&self) -> Result<(), config::ConfigError> {
        // Validate startup config
        if self.startup.port == 0 {
            return Err(config::ConfigError::Message("port cannot be 0".into()));
        }

        if self.startup.smtp_host.is_empty() {
            return Err(config::ConfigError::Message(
                "smtp_host cannot be empty".into(),
            ));
        }

        if !self.startup.mail_from.contains('@') {
            return Err(config::ConfigError::Message(
                "mail_from must be an email address".into(),
            ));
        }

        if self.startup.username_debounce_ms == 0 || self.startup.secret_key_debounce_ms == 0 {
            return Err(config::ConfigError::Message(
                "debounce delays must be greater than 0".into(),
            ));
        }

        if self.startup.lookup_timeout_secs == 0 {
            return Err(config::ConfigError::Message(
                "lookup_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.startup.max_body_bytes == 0 {
            return Err(config::ConfigError::Message(
                "max_body_bytes must be greater than 0".into(),
            ));
        }

        // Validate runtime config
        if !self.runtime.mail_to.contains('@') {
            return Err(config::ConfigError::Message(
                "mail_to must be an email address".into(),
            ));
        }

        Ok(())
    }
}

impl StartupConfig {
    /// Get bind address and port as a socket address string
    pub fn bind_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Get the username debounce delay as a Duration
    pub fn username_debounce(&self) -> Duration {
        Duration::from_millis(self.username_debounce_ms)
    }

    /// Get the secret-key debounce delay as a Duration
    pub fn secret_key_debounce(&self) -> Duration {
        Duration::from_millis(self.secret_key_debounce_ms)
    }

    /// Get the remote lookup timeout as a Duration
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_secs)
    }
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 3001,
            static_dir: "dist".to_string(),
            max_body_bytes: 64 * 1024,
            smtp_host: "smtp-relay.brevo.com".to_string(),
            smtp_port: 587,
            smtp_user: String::new(),
            smtp_pass: String::new(),
            mail_from: "matron-mail@skybersupport.me".to_string(),
            mail_from_name: "MATRON Portfolio".to_string(),
            username_debounce_ms: 800,
            secret_key_debounce_ms: 500,
            lookup_timeout_secs: 10,
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            mail_to: "soul@skybersupport.me".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> PortalConfig {
        PortalConfig {
            startup: StartupConfig::default(),
            runtime: RuntimeConfig::default(),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_port() {
        let mut config = valid_config();
        config.startup.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_debounce() {
        let mut config = valid_config();
        config.startup.secret_key_debounce_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_mail_to() {
        let mut config = valid_config();
        config.runtime.mail_to = "not-an-address".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duration_getters() {
        let startup = StartupConfig::default();
        assert_eq!(startup.username_debounce(), Duration::from_millis(800));
        assert_eq!(startup.secret_key_debounce(), Duration::from_millis(500));
        assert_eq!(startup.lookup_timeout(), Duration::from_secs(10));
        assert_eq!(startup.bind_socket(), "127.0.0.1:3001");
    }
}
