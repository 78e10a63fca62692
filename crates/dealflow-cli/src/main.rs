//! Terminal demo runner for the dealflow workflow engine.
//!
//! This binary plays the scripted sales-agent session end to end: it builds
//! a controller over a fresh session, subscribes a renderer to the event
//! bus, and triggers the three entry points in order, printing the
//! transcript, suggestion chips, and final proposal as they land.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use dealflow_engine::{EngineConfig, EntryPoint, EventBus, WorkflowController};

mod config;
mod render;

use config::{CliConfig, LogFormat};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Dealflow — a scripted sales-agent workflow demo.
#[derive(Parser)]
#[command(
    name = "dealflow",
    version,
    about = "Scripted sales-agent workflow demo",
    long_about = "Replays a scripted agent session: email analysis, draft review, and a \
                  human-in-the-loop discount revision, driven by a single-flight \
                  workflow controller."
)]
struct Cli {
    /// Run every script step immediately, without its scripted delay.
    #[arg(long)]
    instant: bool,

    /// Path to the TOML config file.
    #[arg(long, default_value = "config/dealflow.toml")]
    config: PathBuf,

    /// Emit logs as JSON instead of human-readable lines.
    #[arg(long)]
    json_logs: bool,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = CliConfig::load(&cli.config);

    init_tracing(cli.json_logs || config.log_format == LogFormat::Json);

    let pace = if cli.instant { 0.0 } else { config.pace };
    info!(pace, "starting dealflow demo");

    let bus = EventBus::new(256);
    let mut rx = bus.subscribe();
    let controller = WorkflowController::new(bus, EngineConfig { pace });

    // The seeded greeting predates the subscription; print it directly.
    for message in controller.transcript().await {
        println!("{}", render::format_message(&message));
    }

    // Renderer: draws every visible event as it is published.
    let renderer = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Some(line) = render::format_event(&event) {
                        println!("{line}");
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    warn!(missed, "renderer fell behind the event bus");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    // Drive the scripted session: each trigger resolves when its script's
    // final step has been applied.
    controller
        .trigger(EntryPoint::Analyze)
        .await
        .context("analyze trigger rejected")?;
    controller
        .trigger(EntryPoint::OpenDraft)
        .await
        .context("open-draft trigger rejected")?;

    // Let the renderer flush before interleaving our own output.
    tokio::task::yield_now().await;

    let chips = controller.suggestions().await;
    if !chips.is_empty() {
        println!();
        for chip in &chips {
            println!("{}", render::format_suggestion(chip));
        }
        println!();
    }

    controller
        .trigger(EntryPoint::ReviseTerms)
        .await
        .context("revise-terms trigger rejected")?;

    tokio::task::yield_now().await;
    println!();
    println!("{}", render::format_proposal(&controller.proposal().await));

    info!(state = %controller.state().await, "session complete");

    // Dropping the controller drops the bus sender; the renderer drains
    // whatever is still buffered, then exits on `Closed`.
    drop(controller);
    renderer.await.context("renderer task panicked")?;
    Ok(())
}

/// Initialize the tracing subscriber. Respects `RUST_LOG`, defaulting to
/// `info`.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
