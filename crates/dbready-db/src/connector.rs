//! Connection capability driven by the prober.
//!
//! The prober never talks to a database directly. It asks a [`Connector`] for a
//! [`Session`] on a named database, optionally queries the schema marker, and
//! closes the session before the next attempt.

use async_trait::async_trait;
use dbready_common::models::ProbeRequest;

/// Why a connection attempt failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectError {
    /// Server not listening yet, auth rejected, network trouble, attempt timed out.
    /// Retried until the deadline.
    #[error("{0}")]
    Operational(String),

    /// Settings that can never produce a connection. Aborts the probe.
    #[error("{0}")]
    Configuration(String),
}

/// The schema marker could not be read: table missing or not accessible.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("schema marker `{table}` unavailable: {reason}")]
pub struct MarkerError {
    pub table: String,
    pub reason: String,
}

/// Opens authenticated connections to a database server.
#[async_trait]
pub trait Connector: Send + Sync {
    type Session: Session;

    /// Open one connection to `database` using the request's coordinates and credentials.
    async fn connect(
        &self,
        request: &ProbeRequest,
        database: &str,
    ) -> Result<Self::Session, ConnectError>;
}

/// One open connection, scoped to a single probe attempt.
#[async_trait]
pub trait Session: Send {
    /// Run one lightweight read against `table`.
    async fn query_marker(&mut self, table: &str) -> Result<(), MarkerError>;

    /// Close the connection gracefully.
    async fn close(self) -> Result<(), ConnectError>;
}
