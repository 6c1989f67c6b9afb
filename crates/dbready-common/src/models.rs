//! Probe request and outcome types shared by the prober and the CLI.

use std::fmt;

use crate::error::{ProbeError, ProbeResult};

/// Generic diagnostic used when the deadline passes without any recorded error.
pub const TIMEOUT_MESSAGE: &str = "Failed to connect to the database within the timeout period.";

/// What a probe should establish before reporting success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeMode {
    /// The server accepts connections.
    Liveness,
    /// The target database accepts connections and carries the schema marker.
    InitCheck,
}

/// Database password. Never printed through `Debug` or `Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

impl From<String> for Password {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Coordinates, credentials and policy for one probe invocation.
#[derive(Debug, Clone)]
pub struct ProbeRequest {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Password,
    pub target_database: Option<String>,
    pub timeout_seconds: u64,
    pub mode: ProbeMode,
}

impl ProbeRequest {
    /// Check preconditions that must hold before any connection is attempted.
    pub fn validate(&self) -> ProbeResult<()> {
        if self.timeout_seconds == 0 {
            return Err(ProbeError::InvalidTimeout(self.timeout_seconds));
        }

        if self.mode == ProbeMode::InitCheck && self.init_database().is_none() {
            return Err(ProbeError::MissingDatabase);
        }

        Ok(())
    }

    /// Target database for init checks, ignoring blank values.
    pub fn init_database(&self) -> Option<&str> {
        self.target_database
            .as_deref()
            .filter(|name| !name.trim().is_empty())
    }
}

/// Terminal verdict of a probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub reachable: bool,
    /// Set only in init-check mode once a connection succeeded.
    pub initialized: Option<bool>,
    pub last_error: Option<String>,
    /// Connection attempts made, including the successful one.
    pub attempts: u32,
}

impl ProbeOutcome {
    pub fn live(attempts: u32) -> Self {
        Self {
            reachable: true,
            initialized: None,
            last_error: None,
            attempts,
        }
    }

    pub fn connected(initialized: bool, attempts: u32) -> Self {
        Self {
            reachable: true,
            initialized: Some(initialized),
            last_error: None,
            attempts,
        }
    }

    pub fn unreachable(last_error: Option<String>, attempts: u32) -> Self {
        Self {
            reachable: false,
            initialized: None,
            last_error,
            attempts,
        }
    }

    /// Whether the caller should treat the target as ready (exit status 0).
    pub fn is_ready(&self) -> bool {
        self.reachable && self.initialized.unwrap_or(true)
    }

    /// One-line message for stderr when the target is not ready.
    pub fn diagnostic(&self, database: Option<&str>) -> Option<String> {
        if !self.reachable {
            return Some(match &self.last_error {
                Some(error) => format!("Database connection failure: {error}"),
                None => TIMEOUT_MESSAGE.to_string(),
            });
        }

        match (self.initialized, database) {
            (Some(false), Some(name)) => Some(format!(
                "Database '{name}' is reachable but not initialized."
            )),
            (Some(false), None) => Some("Database is reachable but not initialized.".into()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(mode: ProbeMode, database: Option<&str>, timeout_seconds: u64) -> ProbeRequest {
        ProbeRequest {
            host: "db".into(),
            port: 5432,
            user: "odoo".into(),
            password: Password::new("hunter2"),
            target_database: database.map(str::to_owned),
            timeout_seconds,
            mode,
        }
    }

    #[test]
    fn test_init_check_requires_database() {
        let req = request(ProbeMode::InitCheck, None, 5);
        assert!(matches!(req.validate(), Err(ProbeError::MissingDatabase)));

        let req = request(ProbeMode::InitCheck, Some("  "), 5);
        assert!(matches!(req.validate(), Err(ProbeError::MissingDatabase)));

        let req = request(ProbeMode::InitCheck, Some("odoo"), 5);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_liveness_ignores_database() {
        let req = request(ProbeMode::Liveness, None, 5);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let req = request(ProbeMode::Liveness, None, 0);
        assert!(matches!(req.validate(), Err(ProbeError::InvalidTimeout(0))));
    }

    #[test]
    fn test_password_is_redacted() {
        let req = request(ProbeMode::Liveness, None, 5);
        let debug = format!("{req:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("Password(***)"));
    }

    #[test]
    fn test_readiness_verdicts() {
        assert!(ProbeOutcome::live(1).is_ready());
        assert!(ProbeOutcome::connected(true, 1).is_ready());
        assert!(!ProbeOutcome::connected(false, 1).is_ready());
        assert!(!ProbeOutcome::unreachable(None, 5).is_ready());
    }

    #[test]
    fn test_diagnostics() {
        assert_eq!(ProbeOutcome::live(1).diagnostic(None), None);
        assert_eq!(
            ProbeOutcome::unreachable(None, 5).diagnostic(None).as_deref(),
            Some(TIMEOUT_MESSAGE)
        );
        assert_eq!(
            ProbeOutcome::unreachable(Some("connection refused".into()), 5)
                .diagnostic(None)
                .as_deref(),
            Some("Database connection failure: connection refused")
        );
        assert_eq!(
            ProbeOutcome::connected(false, 1)
                .diagnostic(Some("odoo"))
                .as_deref(),
            Some("Database 'odoo' is reachable but not initialized.")
        );
    }
}
