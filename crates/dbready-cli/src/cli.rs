//! Command-line surface.
//!
//! Flag spellings follow the deployment scripts that call these tools
//! (`--db_host`, `--check-init`, `--mpwd_file`, ...).

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use dbready_common::models::{Password, ProbeMode, ProbeRequest};
use dbready_provision::CreateDatabase;
use dbready_ws::DEFAULT_GREETING;

#[derive(Debug, Parser)]
#[command(name = "dbready", version, about = "Deployment readiness probes for PostgreSQL-backed apps")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Load `.env` (or `env_file`), then parse `args`.
    ///
    /// The env file has to be in the process environment before clap resolves
    /// `env = "DBREADY_*"` fallbacks. Existing variables are not overridden.
    pub fn parse_after_env<I, T>(env_file: Option<&Path>, args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let _ = match env_file {
            Some(path) => dotenvy::from_path(path),
            None => dotenvy::dotenv().map(|_| ()),
        };
        Self::try_parse_from(args)
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Wait until the database server accepts connections, optionally checking the schema.
    #[command(alias = "check-db-status")]
    Check(CheckArgs),

    /// Create the application database through the server's database manager.
    #[command(name = "create-db")]
    CreateDb(CreateDbArgs),

    /// Open a WebSocket, send a greeting and print whatever comes back.
    #[command(name = "ws-echo", alias = "websocket-test")]
    WsEcho(WsEchoArgs),
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    #[arg(long = "db_host", env = "DBREADY_DB_HOST")]
    pub db_host: String,

    #[arg(long = "db_port", env = "DBREADY_DB_PORT")]
    pub db_port: u16,

    #[arg(long = "db_user", env = "DBREADY_DB_USER")]
    pub db_user: String,

    #[arg(long = "db_password", env = "DBREADY_DB_PASSWORD", hide_env_values = true)]
    pub db_password: String,

    /// Database to inspect; only required with --check-init.
    #[arg(long, env = "DBREADY_DATABASE")]
    pub database: Option<String>,

    /// Seconds to keep retrying before giving up.
    #[arg(long, default_value_t = 5)]
    pub timeout: u64,

    /// Check if the database is initialized.
    #[arg(long = "check-init")]
    pub check_init: bool,
}

impl CheckArgs {
    pub fn into_request(self) -> ProbeRequest {
        ProbeRequest {
            host: self.db_host,
            port: self.db_port,
            user: self.db_user,
            password: Password::new(self.db_password),
            target_database: self.database,
            timeout_seconds: self.timeout,
            mode: if self.check_init {
                ProbeMode::InitCheck
            } else {
                ProbeMode::Liveness
            },
        }
    }
}

#[derive(Debug, Args)]
pub struct CreateDbArgs {
    /// Master password for the application server.
    #[arg(short = 'm', long = "mpwd", conflicts_with = "mpwd_file")]
    pub mpwd: Option<String>,

    /// Server config file containing admin_passwd.
    #[arg(short = 'f', long = "mpwd_file")]
    pub mpwd_file: Option<PathBuf>,

    #[arg(long = "db_name", default_value = "odoo")]
    pub db_name: String,

    /// Admin login for the new database.
    #[arg(long, default_value = "admin")]
    pub login: String,

    /// Admin password for the new database.
    #[arg(long, default_value = "admin")]
    pub password: String,

    #[arg(long, default_value = "en_US")]
    pub lang: String,

    #[arg(long = "country_code", default_value = "tw")]
    pub country_code: String,

    #[arg(long, default_value = "+886987654321")]
    pub phone: String,

    /// Base URL such as `localhost:8069` or `https://erp.example.com`.
    #[arg(short = 'u', long)]
    pub url: Option<String>,

    /// Skip TLS certificate verification.
    #[arg(long = "ignore_ssl")]
    pub ignore_ssl: bool,
}

/// Where the master password comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MasterPasswordSource {
    Inline(String),
    File(PathBuf),
}

impl CreateDbArgs {
    /// Inline password if given, else the explicit file, else `default_file`.
    pub fn master_password_source(&self, default_file: &str) -> MasterPasswordSource {
        match (&self.mpwd, &self.mpwd_file) {
            (Some(pwd), _) => MasterPasswordSource::Inline(pwd.clone()),
            (None, Some(path)) => MasterPasswordSource::File(path.clone()),
            (None, None) => MasterPasswordSource::File(PathBuf::from(default_file)),
        }
    }

    pub fn to_request(&self, master_pwd: String) -> CreateDatabase {
        CreateDatabase {
            master_pwd,
            name: self.db_name.clone(),
            login: self.login.clone(),
            password: self.password.clone(),
            lang: self.lang.clone(),
            country_code: self.country_code.clone(),
            phone: self.phone.clone(),
        }
    }
}

#[derive(Debug, Args)]
pub struct WsEchoArgs {
    /// WebSocket URL, e.g. ws://localhost:8072/
    #[arg(long)]
    pub url: Option<String>,

    #[arg(long, default_value = DEFAULT_GREETING)]
    pub message: String,

    /// Stop after this many messages instead of waiting for the server to close.
    #[arg(long)]
    pub count: Option<usize>,
}
