//! Centralized error types for dbready.
//!
//! Probe errors are all preconditions: they are reported before (or instead of)
//! any connection retry and are never retried themselves.

/// Reasons a probe refuses to run or aborts without a verdict.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("--database is required when using --check-init")]
    MissingDatabase,

    #[error("Timeout must be at least 1 second, got {0}")]
    InvalidTimeout(u64),

    /// Connection settings the connector can never succeed with.
    #[error("Invalid connection settings: {0}")]
    InvalidSettings(String),
}

/// Failures while loading or checking the layered configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration value for `{key}`: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Convenience type alias for Results using ProbeError.
pub type ProbeResult<T> = Result<T, ProbeError>;
