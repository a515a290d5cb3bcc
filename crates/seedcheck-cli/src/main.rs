mod logging;
mod report;
mod server;
mod settings;

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand};
use seedcheck_core::{RunOutcome, redact_dsn};
use seedcheck_seed::{EphemeralDatabase, ProvisionError, run_with_options};
use sqlx::postgres::PgConnectOptions;
use thiserror::Error;
use uuid::Uuid;

use logging::{LoggingError, init_logging};
use report::{RunReport, write_report};
use server::{AppState, router};
use settings::{Settings, SettingsError, load_settings};

#[derive(Debug, Error)]
enum CliError {
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
    #[error("logging error: {0}")]
    Logging(#[from] LoggingError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid database url: {0}")]
    DatabaseUrl(#[from] sqlx::Error),
    #[error("provisioning error: {0}")]
    Provision(#[from] ProvisionError),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("run aborted: {0}")]
    Aborted(String),
}

#[derive(Parser, Debug)]
#[command(name = "seedcheck", version, about = "Validate a schema and its mock data against PostgreSQL")]
struct Cli {
    /// Settings file (defaults to ./seedcheck.toml when present).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one validation and print the result.
    Run(RunArgs),
    /// Serve `POST /test` and `GET /health`.
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// DDL script to apply.
    #[arg(long, value_name = "PATH")]
    schema: PathBuf,
    /// JSON document mapping table names to rows.
    #[arg(long, value_name = "PATH")]
    mock_data: PathBuf,
    /// Target database; with --ephemeral, the admin database.
    #[arg(long, value_name = "CONNECTION_STRING")]
    database_url: Option<String>,
    /// Create a throwaway database for this run and drop it afterwards.
    #[arg(long, default_value_t = false)]
    ephemeral: bool,
    /// Also write a JSON run report here.
    #[arg(long, value_name = "PATH")]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to listen on, overriding the settings file.
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,
    /// Admin database used to create per-request databases.
    #[arg(long, value_name = "CONNECTION_STRING")]
    admin_database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;
    init_logging(&settings.logging)?;

    match cli.command {
        Command::Run(args) => run_once(args, &settings).await,
        Command::Serve(args) => serve(args, &settings).await,
    }
}

async fn run_once(args: RunArgs, settings: &Settings) -> Result<(), CliError> {
    let RunArgs {
        schema,
        mock_data,
        database_url,
        ephemeral,
        out,
    } = args;

    let ddl = std::fs::read_to_string(&schema)?;
    let mock_data = std::fs::read_to_string(&mock_data)?;

    let url = database_url
        .or_else(|| settings.database.admin_url.clone())
        .ok_or_else(|| CliError::InvalidConfig("database url is required".to_string()))?;
    let connect = PgConnectOptions::from_str(&url)?;
    let seed = settings.seed_options();

    let run_id = Uuid::new_v4().to_string();
    let started_at = chrono::Utc::now();
    tracing::info!(event = "cli_run_started", run_id = %run_id, database = %redact_dsn(&url));

    let (outcome, target) = if ephemeral {
        let database = EphemeralDatabase::create(&connect, &seed).await?;
        let target = format!("{} (ephemeral {})", redact_dsn(&url), database.name());
        let outcome = run_with_options(database.connect_options(), &seed, &ddl, &mock_data).await;
        if let Err(err) = database.drop_database().await {
            tracing::warn!(event = "teardown_failed", run_id = %run_id, error = %err);
        }
        (outcome, target)
    } else {
        let outcome = run_with_options(&connect, &seed, &ddl, &mock_data).await;
        (outcome, redact_dsn(&url))
    };

    println!("{}", serde_json::to_string_pretty(outcome.result())?);

    if let Some(out) = out {
        let report = RunReport::new(
            &run_id,
            started_at,
            target,
            outcome.is_aborted(),
            outcome.result().clone(),
        );
        write_report(&out, &report)?;
        tracing::info!(event = "report_written", path = %out.display());
    }

    match outcome {
        RunOutcome::Completed(_) => Ok(()),
        RunOutcome::Aborted { error, .. } => Err(CliError::Aborted(error.to_string())),
    }
}

async fn serve(args: ServeArgs, settings: &Settings) -> Result<(), CliError> {
    let bind = args.bind.unwrap_or_else(|| settings.server.bind.clone());
    let admin_url = args
        .admin_database_url
        .or_else(|| settings.database.admin_url.clone())
        .ok_or_else(|| CliError::InvalidConfig("admin database url is required".to_string()))?;
    let admin = PgConnectOptions::from_str(&admin_url)?;

    let state = AppState::new(admin, settings.seed_options(), settings.request_timeout());
    let listener = tokio::net::TcpListener::bind(&bind).await?;

    tracing::info!(
        event = "server_started",
        bind = %bind,
        admin_database = %redact_dsn(&admin_url),
        pid = std::process::id()
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!(event = "server_stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(event = "signal_handler_failed", error = %err);
        std::future::pending::<()>().await;
    }
}
