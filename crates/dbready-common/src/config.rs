//! Application configuration loaded from environment variables and config files.
//!
//! Supports `.env` files for development and environment variables in pipelines.
//! Config precedence: env vars > .env file > dbready.toml > defaults

use serde::Deserialize;
use std::sync::OnceLock;
use std::time::Duration;

use crate::error::ConfigError;
use crate::validation::validate_identifier;

static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Initialize the global configuration from environment.
///
/// Should be called once at startup. Later calls return the first configuration.
pub fn init() -> Result<&'static AppConfig, ConfigError> {
    // Load .env file if present (development)
    let _ = dotenvy::dotenv();

    let cfg = builder()?
        // Optional config file
        .add_source(config::File::with_name("dbready").required(false))
        // Environment variables (DBREADY_PROBE__MARKER_TABLE, DBREADY_LOG__FILTER, etc.)
        .add_source(
            config::Environment::with_prefix("DBREADY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let app_config: AppConfig = cfg.try_deserialize()?;
    app_config.validate()?;
    Ok(CONFIG.get_or_init(|| app_config))
}

/// Builder pre-loaded with every default, before any file or env source.
fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
    config::Config::builder()
        .set_default("probe.admin_database", "postgres")?
        .set_default("probe.marker_table", "ir_model")?
        .set_default("probe.retry_interval_ms", 1000)?
        .set_default("probe.connect_timeout_secs", 10)?
        .set_default("provision.url", "localhost:8069")?
        .set_default("provision.master_password_file", "/etc/odoo/odoo.conf")?
        .set_default("websocket.url", "ws://localhost:8072/")?
        .set_default("websocket.connect_timeout_secs", 10)?
        .set_default("log.filter", "dbready=warn")
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub probe: ProbeConfig,
    pub provision: ProvisionConfig,
    pub websocket: WebSocketConfig,
    pub log: LogConfig,
}

impl AppConfig {
    /// Reject values that would only fail later, mid-probe.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_identifier(&self.probe.marker_table).map_err(|message| ConfigError::Invalid {
            key: "probe.marker_table",
            message,
        })?;

        if self.probe.admin_database.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "probe.admin_database",
                message: "must not be empty".into(),
            });
        }

        if self.probe.retry_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "probe.retry_interval_ms",
                message: "must be greater than zero".into(),
            });
        }

        if self.websocket.connect_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "websocket.connect_timeout_secs",
                message: "must be greater than zero".into(),
            });
        }

        if self.probe.connect_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "probe.connect_timeout_secs",
                message: "must be greater than zero".into(),
            });
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProbeConfig {
    /// Always-present database used for liveness checks.
    pub admin_database: String,
    /// Table whose presence marks an initialized application database.
    pub marker_table: String,
    /// Fixed pause between failed connection attempts.
    pub retry_interval_ms: u64,
    /// Upper bound for a single connection attempt.
    pub connect_timeout_secs: u64,
}

impl ProbeConfig {
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProvisionConfig {
    /// Application server base URL, with or without scheme.
    pub url: String,
    /// Server config file holding `admin_passwd`, used when no password is given.
    pub master_password_file: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WebSocketConfig {
    pub url: String,
    pub connect_timeout_secs: u64,
}

impl WebSocketConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` takes precedence.
    pub filter: String,
}
