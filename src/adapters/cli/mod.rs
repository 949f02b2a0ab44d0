//! CLI Adapter
//!
//! Command-line interface for the BitDelta Vision ingester.
//! Uses clap derive macros for argument parsing.

mod commands;

pub use commands::{CliApp, Command, render_endpoint_table};

use anyhow::Result;

/// Execute the CLI command
pub async fn execute(app: CliApp) -> Result<()> {
    commands::execute(app).await
}
