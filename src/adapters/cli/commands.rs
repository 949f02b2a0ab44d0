//! CLI Command Handlers
//!
//! `run` drives the poll loop; `check-config` prints the resolved endpoint
//! table without touching the network.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::adapters::LiveConnector;
use crate::application::IngestOrchestrator;
use crate::config::{load_settings, Settings, DEFAULT_ENV_FILE};

/// BitDelta Vision - crypto price poller feeding InfluxDB
#[derive(Parser, Debug)]
#[command(
    name = "bitdelta-vision",
    version = env!("CARGO_PKG_VERSION"),
    about = "Polls CoinCap market prices and writes them to InfluxDB",
    long_about = "BitDelta Vision polls the CoinCap markets API for every configured \
                  exchange and currency pair at a fixed interval and stores each price \
                  as a tagged InfluxDB point."
)]
pub struct CliApp {
    /// The command to execute (defaults to `run`)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Key-value file holding API and database credentials
    #[arg(long, value_name = "FILE", global = true, default_value = DEFAULT_ENV_FILE)]
    pub env_file: PathBuf,

    /// TOML file replacing the built-in endpoint table
    #[arg(long, value_name = "FILE", global = true)]
    pub endpoints: Option<PathBuf>,

    /// Override the poll interval in seconds
    #[arg(long, value_name = "SECS", global = true, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start the poll loop
    Run,

    /// Print the endpoint table and fetch URLs, then exit
    CheckConfig,
}

impl CliApp {
    /// Resolve settings from the env file, endpoints file and overrides
    pub fn settings(&self) -> Result<Settings> {
        let env_file = expand_path(&self.env_file);
        let endpoints = self.endpoints.as_ref().map(|p| expand_path(p));

        let settings = load_settings(&env_file, endpoints.as_deref())
            .with_context(|| format!("Failed to load configuration from {}", env_file.display()))?;

        Ok(match self.interval {
            Some(secs) => settings.with_poll_interval(Duration::from_secs(secs)),
            None => settings,
        })
    }
}

/// Expand a leading `~` in a path
fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}

pub async fn execute(app: CliApp) -> Result<()> {
    let settings = app.settings()?;

    match app.command.unwrap_or(Command::Run) {
        Command::Run => run_command(settings).await,
        Command::CheckConfig => {
            print!("{}", render_endpoint_table(&settings));
            Ok(())
        }
    }
}

async fn run_command(settings: Settings) -> Result<()> {
    tracing::info!("Starting BitDelta Vision...");

    if settings.credentials.influxdb_url.is_none() {
        tracing::warn!("INFLUXDB_URL is not set; every write will fail");
    }

    let connector = LiveConnector::new(settings.credentials.clone());
    let orchestrator = IngestOrchestrator::new(settings, connector);

    // Setup Ctrl+C handler
    let orch = orchestrator.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Shutdown signal received");
                orch.stop().await;
            }
            Err(e) => tracing::warn!("Could not listen for Ctrl+C: {}", e),
        }
    });

    orchestrator.run().await;

    let status = orchestrator.status().await;
    tracing::info!(
        "BitDelta Vision stopped after {} iterations ({} failed, {} points written)",
        status.iterations,
        status.failed_iterations,
        status.points_written
    );
    Ok(())
}

/// Human-readable dump of the endpoint table and the URLs one iteration fetches
pub fn render_endpoint_table(settings: &Settings) -> String {
    let mut out = String::new();
    let creds = &settings.credentials;

    let _ = writeln!(out, "Poll interval: {}s", settings.poll_interval.as_secs());
    let _ = writeln!(
        out,
        "InfluxDB: url={} org={} bucket={} token={}",
        creds.influxdb_url.as_deref().unwrap_or("<unset>"),
        creds.influxdb_org.as_deref().unwrap_or("<unset>"),
        creds.influxdb_bucket.as_deref().unwrap_or("<unset>"),
        if creds.influxdb_token.is_some() { "<set>" } else { "<unset>" },
    );

    for endpoint in settings.endpoints.iter() {
        let _ = writeln!(
            out,
            "{} ({}) api_key={}",
            endpoint.exchange_id,
            endpoint.name,
            if endpoint.api_key.as_deref().is_some_and(|k| !k.is_empty()) { "<set>" } else { "<unset>" },
        );
        for task in endpoint.fetch_tasks() {
            let _ = writeln!(out, "  {} -> {}", task.pair, task.url);
        }
    }

    out
}
