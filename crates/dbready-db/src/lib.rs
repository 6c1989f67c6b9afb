//! # dbready-db
//!
//! Database layer for dbready:
//! - **connector** — the capability the prober drives, one connection per attempt
//! - **postgres** — the PostgreSQL implementation on top of `sqlx`
//! - **probe** — the deadline-bounded, fixed-interval readiness loop

pub mod connector;
pub mod postgres;
pub mod probe;

pub use connector::{ConnectError, Connector, MarkerError, Session};
pub use postgres::PgConnector;
pub use probe::{ProbeSettings, Prober};
