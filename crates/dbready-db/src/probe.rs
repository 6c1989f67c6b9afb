//! Readiness prober: poll a database server until it answers or a deadline passes.
//!
//! Each iteration makes exactly one connection attempt. Operational failures are
//! logged and retried after a fixed interval; the first successful connection is
//! terminal in both modes. In init-check mode a missing schema marker yields
//! `initialized = false` rather than another retry.

use std::time::Duration;

use dbready_common::config::ProbeConfig;
use dbready_common::error::{ProbeError, ProbeResult};
use dbready_common::models::{ProbeMode, ProbeOutcome, ProbeRequest};
use tokio::time::{sleep, Instant};

use crate::connector::{ConnectError, Connector, Session};

/// Tunables that are not part of an individual request.
#[derive(Debug, Clone)]
pub struct ProbeSettings {
    pub admin_database: String,
    pub marker_table: String,
    pub retry_interval: Duration,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            admin_database: "postgres".into(),
            marker_table: "ir_model".into(),
            retry_interval: Duration::from_secs(1),
        }
    }
}

impl From<&ProbeConfig> for ProbeSettings {
    fn from(config: &ProbeConfig) -> Self {
        Self {
            admin_database: config.admin_database.clone(),
            marker_table: config.marker_table.clone(),
            retry_interval: config.retry_interval(),
        }
    }
}

pub struct Prober<C> {
    connector: C,
    settings: ProbeSettings,
}

impl<C: Connector> Prober<C> {
    pub fn new(connector: C) -> Self {
        Self::with_settings(connector, ProbeSettings::default())
    }

    pub fn with_settings(connector: C, settings: ProbeSettings) -> Self {
        Self {
            connector,
            settings,
        }
    }

    #[cfg(test)]
    fn connector(&self) -> &C {
        &self.connector
    }

    /// Run one probe to completion.
    ///
    /// Returns `Err` only for preconditions: an invalid request, checked before
    /// any attempt, or connection settings the connector rejects outright.
    pub async fn probe(&self, request: &ProbeRequest) -> ProbeResult<ProbeOutcome> {
        request.validate()?;

        let database = match request.mode {
            ProbeMode::Liveness => self.settings.admin_database.as_str(),
            ProbeMode::InitCheck => request.init_database().ok_or(ProbeError::MissingDatabase)?,
        };

        let deadline = Instant::now() + Duration::from_secs(request.timeout_seconds);
        let mut attempts: u32 = 0;
        let mut last_error: Option<String> = None;

        while Instant::now() < deadline {
            attempts += 1;

            match self.connector.connect(request, database).await {
                Ok(mut session) => {
                    let outcome = match request.mode {
                        ProbeMode::Liveness => ProbeOutcome::live(attempts),
                        ProbeMode::InitCheck => {
                            let initialized = self.check_marker(&mut session, database).await;
                            ProbeOutcome::connected(initialized, attempts)
                        }
                    };

                    if let Err(e) = session.close().await {
                        tracing::debug!(database, "Error while closing connection: {e}");
                    }

                    tracing::info!(database, attempts, "Database reachable");
                    return Ok(outcome);
                }
                Err(ConnectError::Configuration(message)) => {
                    return Err(ProbeError::InvalidSettings(message));
                }
                Err(ConnectError::Operational(message)) => {
                    tracing::warn!(
                        database,
                        attempt = attempts,
                        "Database connection failure: {message}"
                    );
                    last_error = Some(message);
                    sleep(self.settings.retry_interval).await;
                }
            }
        }

        tracing::debug!(
            database,
            attempts,
            timeout_secs = request.timeout_seconds,
            "Deadline passed without a connection"
        );
        Ok(ProbeOutcome::unreachable(last_error, attempts))
    }

    async fn check_marker(&self, session: &mut C::Session, database: &str) -> bool {
        match session.query_marker(&self.settings.marker_table).await {
            Ok(()) => true,
            Err(e) => {
                tracing::info!(database, "Database not initialized: {e}");
                false
            }
        }
    }
}
