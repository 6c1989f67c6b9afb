//! # dbready
//!
//! Deployment pipeline helpers for PostgreSQL-backed application stacks:
//! - `check` — wait for the database server, optionally for the app schema
//! - `create-db` — create the app database through the server's database manager
//! - `ws-echo` — poke the app's WebSocket port
//!
//! Exit status is 0 when the step succeeded and 1 otherwise. Diagnostics go to stderr.

mod cli;

use std::process::ExitCode;

use dbready_common::config::AppConfig;
use dbready_db::{PgConnector, ProbeSettings, Prober};
use dbready_provision::{read_master_password, CreateOutcome, DatabaseCreator};
use dbready_ws::{EchoClient, EchoEvent};

use crate::cli::{CheckArgs, Cli, Command, CreateDbArgs, MasterPasswordSource, WsEchoArgs};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse_after_env(None, std::env::args_os()).unwrap_or_else(|e| e.exit());

    // Load configuration
    let config = dbready_common::config::init()?;

    // Initialize tracing (structured logging, stderr only)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log.filter.as_str().into()),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    tracing::debug!("dbready v{}", env!("CARGO_PKG_VERSION"));

    let code = match cli.command {
        Command::Check(args) => check(args, config).await,
        Command::CreateDb(args) => create_db(args, config).await,
        Command::WsEcho(args) => ws_echo(args, config).await,
    };
    Ok(code)
}

async fn check(args: CheckArgs, config: &AppConfig) -> ExitCode {
    let request = args.into_request();
    let prober = Prober::with_settings(
        PgConnector::new(config.probe.connect_timeout()),
        ProbeSettings::from(&config.probe),
    );

    match prober.probe(&request).await {
        Ok(outcome) => {
            if let Some(message) = outcome.diagnostic(request.init_database()) {
                eprintln!("{message}");
            }
            if outcome.is_ready() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn create_db(args: CreateDbArgs, config: &AppConfig) -> ExitCode {
    let master_pwd = match args.master_password_source(&config.provision.master_password_file) {
        MasterPasswordSource::Inline(pwd) => pwd,
        MasterPasswordSource::File(path) => match read_master_password(&path) {
            Ok(pwd) => pwd,
            Err(e) => {
                eprintln!("Error reading master password from file: {e}");
                return ExitCode::FAILURE;
            }
        },
    };

    let url = args.url.as_deref().unwrap_or(&config.provision.url);
    let creator = match DatabaseCreator::new(url, args.ignore_ssl) {
        Ok(creator) => creator,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match creator.create(&args.to_request(master_pwd)).await {
        Ok(CreateOutcome::Created) => {
            println!("Database created successfully!");
            ExitCode::SUCCESS
        }
        Ok(CreateOutcome::AccessDenied) => {
            eprintln!("Database creation failed: Access Denied. The master password is incorrect.");
            ExitCode::FAILURE
        }
        Ok(CreateOutcome::Failed { status, body }) => {
            eprintln!("Failed to create database. Status code: {status}");
            eprintln!("Response: {body}");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn ws_echo(args: WsEchoArgs, config: &AppConfig) -> ExitCode {
    let url = args.url.unwrap_or_else(|| config.websocket.url.clone());
    let client = EchoClient::new(url)
        .with_greeting(args.message)
        .with_max_messages(args.count)
        .with_connect_timeout(config.websocket.connect_timeout());

    let result = client
        .run(|event| match event {
            EchoEvent::Opened => println!("### Connection opened ###"),
            EchoEvent::Received(text) => println!("Received: {text}"),
            EchoEvent::Closed => println!("### Connection closed ###"),
        })
        .await;

    match result {
        Ok(received) => {
            tracing::debug!(received, "WebSocket session finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
