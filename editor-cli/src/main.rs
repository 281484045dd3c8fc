//! # Canvas Edit
//!
//! Replays canvas edits headlessly and prints the resulting document.

use std::fs;

use anyhow::Context;
use clap::Parser;
use editor_cli::{run, CliArgs, CliConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = CliConfig::from(CliArgs::parse());
    tracing::info!("Starting canvas-edit");

    let summary = run(&config)?;
    let json = summary.document.to_json()?;

    match &config.output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Wrote document to {}", path.display());
        }
        None => println!("{json}"),
    }

    if summary.failed > 0 {
        tracing::warn!("{} of {} commands failed", summary.failed, summary.applied + summary.failed);
    }
    Ok(())
}

/// Initialize tracing.
///
/// Set `RUST_LOG` to control log levels (default: info,editor_core=debug,editor_cli=debug).
/// Set `RUST_LOG_FORMAT=json` for JSON output. Logs go to stderr so the
/// document on stdout stays clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,editor_core=debug,editor_cli=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}
