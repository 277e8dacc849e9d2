//! Core mirror implementation split into focused submodules.
//!
//! The `Mirror` struct and its methods are organized by domain:
//! - [`resume`] - Resume range computation from store and feed state
//! - [`download`] - Bounded-concurrency range download and write serialization

mod download;
mod resume;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

use std::sync::Arc;

use crate::config::Config;
use crate::db::Database;
use crate::error::Result;
use crate::feed::{FeedClient, ItemSource};
use crate::types::{Event, RunSummary};

/// Mirror instance tying the feed, the store, and the download engine together
/// (cloneable - all fields are Arc-wrapped or cheap handles)
#[derive(Clone)]
pub struct Mirror {
    /// Database instance for persistence (wrapped in Arc for sharing across tasks)
    /// Public for integration tests to query stored items
    pub db: Arc<Database>,
    /// Remote feed, behind the trait seam so tests can substitute a source
    pub(crate) source: Arc<dyn ItemSource>,
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
    /// Permit pool bounding simultaneous fetch-and-store units
    pub(crate) fetch_slots: Arc<tokio::sync::Semaphore>,
    /// Cancellation signal shared by the dispatch loop and every worker unit
    pub(crate) cancel_token: tokio_util::sync::CancellationToken,
}

impl Mirror {
    /// Create a new Mirror instance
    ///
    /// This initializes all core components:
    /// - Opens/creates the SQLite database and runs migrations
    /// - Builds the HTTP feed client
    /// - Sets up the event broadcast channel and the permit pool
    pub async fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let source = Arc::new(FeedClient::new(&config.feed)?);
        let db = Arc::new(Database::new(&config.persistence.database_path).await?);

        Ok(Self::assemble(config, db, source))
    }

    /// Create a Mirror over an already-open database and a custom item source
    ///
    /// Embedders use this to mirror from something other than the stock HTTP
    /// feed; tests use it to inject in-process sources.
    pub fn with_source(
        config: Config,
        db: Arc<Database>,
        source: Arc<dyn ItemSource>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::assemble(config, db, source))
    }

    fn assemble(config: Config, db: Arc<Database>, source: Arc<dyn ItemSource>) -> Self {
        // Broadcast buffer of 1000 events; slow subscribers lag rather than
        // blocking the run
        let (event_tx, _rx) = tokio::sync::broadcast::channel(1000);

        let fetch_slots = Arc::new(tokio::sync::Semaphore::new(
            config.download.max_concurrent_fetches,
        ));

        Self {
            db,
            source,
            config: Arc::new(config),
            event_tx,
            fetch_slots,
            cancel_token: tokio_util::sync::CancellationToken::new(),
        }
    }

    /// Mirror everything the feed has that the store doesn't
    ///
    /// Computes the resume range once, then downloads it with bounded
    /// concurrency. Returns once every dispatched unit has drained: a
    /// successful return means every id in the range is durably stored.
    pub async fn run(&self) -> Result<RunSummary> {
        let range = self.resume_range().await?;

        tracing::info!(
            last_posted = range.last.get(),
            last_downloaded = range.first.get() - 1,
            pending = range.len(),
            "resume range computed"
        );

        self.download_range(range).await
    }

    /// Subscribe to mirror events
    ///
    /// Multiple subscribers are supported. Each subscriber receives all events
    /// independently. Events are buffered, but a subscriber falling behind by
    /// more than 1000 events receives a `RecvError::Lagged` error.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Request cancellation of the current run
    ///
    /// The dispatch loop stops issuing ids and in-flight units stop at their
    /// next suspension point; `run` then returns [`crate::Error::Cancelled`]
    /// after draining.
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Emit an event to all subscribers
    ///
    /// If there are no active subscribers, the event is silently dropped
    /// (ok() converts Err to None) and the run continues.
    pub(crate) fn emit_event(&self, event: Event) {
        self.event_tx.send(event).ok();
    }
}
