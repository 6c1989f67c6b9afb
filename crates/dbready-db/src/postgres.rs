//! PostgreSQL connector.

use std::time::Duration;

use async_trait::async_trait;
use dbready_common::models::ProbeRequest;
use dbready_common::validation::validate_identifier;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{ConnectOptions, Connection};

use crate::connector::{ConnectError, Connector, MarkerError, Session};

/// Opens a fresh `PgConnection` per attempt. No pooling.
#[derive(Debug, Clone)]
pub struct PgConnector {
    connect_timeout: Duration,
}

impl PgConnector {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }

    fn options(request: &ProbeRequest, database: &str) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&request.host)
            .port(request.port)
            .username(&request.user)
            .password(request.password.expose())
            .database(database)
            .application_name("dbready")
            .disable_statement_logging()
    }
}

impl Default for PgConnector {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

#[async_trait]
impl Connector for PgConnector {
    type Session = PgSession;

    async fn connect(
        &self,
        request: &ProbeRequest,
        database: &str,
    ) -> Result<PgSession, ConnectError> {
        let options = Self::options(request, database);
        tracing::debug!(
            host = %request.host,
            port = request.port,
            database,
            "Connecting to PostgreSQL..."
        );

        match tokio::time::timeout(self.connect_timeout, options.connect()).await {
            Ok(Ok(conn)) => Ok(PgSession { conn }),
            Ok(Err(e)) => Err(classify(e)),
            Err(_) => Err(ConnectError::Operational(format!(
                "connection attempt timed out after {}s",
                self.connect_timeout.as_secs()
            ))),
        }
    }
}

/// Split connect-time failures into retryable and fatal.
fn classify(err: sqlx::Error) -> ConnectError {
    match err {
        sqlx::Error::Configuration(e) => ConnectError::Configuration(e.to_string()),
        other => ConnectError::Operational(other.to_string()),
    }
}

/// A single open PostgreSQL connection.
pub struct PgSession {
    conn: PgConnection,
}

#[async_trait]
impl Session for PgSession {
    async fn query_marker(&mut self, table: &str) -> Result<(), MarkerError> {
        let marker_error = |reason: String| MarkerError {
            table: table.to_string(),
            reason,
        };

        validate_identifier(table).map_err(marker_error)?;

        let sql = format!("SELECT 1 FROM {table} LIMIT 1");
        sqlx::query(&sql)
            .execute(&mut self.conn)
            .await
            .map(|_| ())
            .map_err(|e| marker_error(e.to_string()))
    }

    async fn close(self) -> Result<(), ConnectError> {
        self.conn
            .close()
            .await
            .map_err(|e| ConnectError::Operational(e.to_string()))
    }
}
