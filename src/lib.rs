//! # feed-mirror
//!
//! Resumable mirror for remote, append-only, integer-indexed item feeds.
//!
//! Each run determines the gap between the highest id the feed knows and the
//! highest id already stored locally, then fills that gap with bounded
//! parallelism: at most a fixed number of fetch-and-store units in flight,
//! every write funneled through a single-connection SQLite store. Progress
//! survives interruption — the next run resumes from the highest stored id.
//!
//! ## Design Philosophy
//!
//! - **Resumable** - The store itself is the checkpoint; no side state
//! - **Bounded** - A permit pool caps in-flight fetches and outbound connections
//! - **Library-first** - No CLI coupling, purely a Rust crate for embedding
//! - **Event-driven** - Consumers subscribe to events, no polling required
//!
//! ## Quick Start
//!
//! ```no_run
//! use feed_mirror::{Config, Mirror};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mirror = Mirror::new(Config::default()).await?;
//!
//!     // Subscribe to events
//!     let mut events = mirror.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let summary = mirror.run().await?;
//!     println!("stored {} items", summary.stored);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Database persistence layer
pub mod db;
/// Error types
pub mod error;
/// Remote feed client
pub mod feed;
/// Core mirror implementation (resume calculation, bounded download)
pub mod mirror;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use config::{Config, DownloadConfig, FeedConfig, PersistenceConfig};
pub use db::{Database, StoredItem};
pub use error::{Error, FeedError, Result, StoreError};
pub use feed::{FeedClient, ItemSource};
pub use mirror::Mirror;
pub use types::{Event, ItemId, ItemRange, RunSummary};

/// Helper function to run a mirror pass with graceful signal handling.
///
/// Drives [`Mirror::run`] to completion while listening for a termination
/// signal; on signal the run is cancelled, in-flight units drain, and the
/// call returns [`Error::Cancelled`].
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use feed_mirror::{Config, Mirror, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mirror = Mirror::new(Config::default()).await?;
///     let summary = run_with_shutdown(&mirror).await?;
///     println!("stored {} items", summary.stored);
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(mirror: &Mirror) -> Result<RunSummary> {
    let run = mirror.run();
    tokio::pin!(run);

    tokio::select! {
        result = &mut run => result,
        () = wait_for_signal() => {
            tracing::info!("Cancelling run after termination signal");
            mirror.cancel();
            run.await
        }
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
