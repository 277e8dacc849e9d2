//! Process entry point: mirror the configured feed once, then exit.
//!
//! Exits non-zero on the first unrecoverable error surfaced by the core or
//! its collaborators; there is no partial-success exit status.

use std::path::Path;
use std::process::ExitCode;

use feed_mirror::{Config, Event, Mirror, Result, RunSummary, run_with_shutdown};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run().await {
        Ok(summary) => {
            tracing::info!(
                stored = summary.stored,
                skipped = summary.skipped,
                "mirror run complete"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "mirror run failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<RunSummary> {
    // Config file path from argv, then the environment, else defaults
    let config = match config_path() {
        Some(path) => Config::load(Path::new(&path)).await?,
        None => Config::default(),
    };

    // Opening the mirror ensures the schema exists
    let mirror = Mirror::new(config).await?;

    // Report each id at dispatch time
    let mut events = mirror.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                Event::ItemDispatched { id } => {
                    tracing::info!(%id, "downloading item");
                }
                Event::ItemSkipped { id, status } => {
                    tracing::warn!(%id, status, "skipped missing item");
                }
                _ => {}
            }
        }
    });

    run_with_shutdown(&mirror).await
}

fn config_path() -> Option<String> {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var("FEED_MIRROR_CONFIG").ok())
}
