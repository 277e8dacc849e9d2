//! Bounded-concurrency range download.
//!
//! The dispatch loop walks the resume range in increasing id order. Each id
//! costs one permit from a pool of `max_concurrent_fetches`; acquisition
//! blocks once that many fetch-and-store units are in flight, which is the
//! engine's only backpressure mechanism. Dispatch order is strictly
//! increasing, completion order is unspecified.

use std::sync::Arc;

use tokio::task::JoinSet;

use crate::db::Database;
use crate::error::{Error, FeedError, Result};
use crate::feed::ItemSource;
use crate::types::{Event, ItemId, ItemRange, RunSummary};

use super::Mirror;

/// Terminal state of one fetch-and-store unit
enum UnitOutcome {
    /// Item fetched and durably written
    Stored,
    /// Missing remote item skipped (skip-missing mode only)
    Skipped,
    /// Unit gave up because the run was cancelled; no write happened
    Cancelled,
}

impl Mirror {
    /// Fetch and store every id in `range` with bounded concurrency
    ///
    /// At most `max_concurrent_fetches` units run simultaneously. The first
    /// fetch or store failure cancels the run: the dispatch loop stops
    /// issuing ids, in-flight units stop at their next suspension point, and
    /// the collected first error is returned after every unit has been
    /// joined. A successful return therefore means every id in the range is
    /// durably stored (or skipped, in skip-missing mode) — not merely
    /// dispatched.
    pub async fn download_range(&self, range: ItemRange) -> Result<RunSummary> {
        if range.is_empty() {
            tracing::info!(%range, "store is current, nothing to fetch");
            self.emit_event(Event::RangeCompleted { stored: 0 });
            return Ok(RunSummary {
                range,
                stored: 0,
                skipped: 0,
            });
        }

        self.emit_event(Event::RangeStarted {
            first: range.first,
            last: range.last,
        });

        let first_error: Arc<tokio::sync::Mutex<Option<Error>>> =
            Arc::new(tokio::sync::Mutex::new(None));
        let mut units: JoinSet<UnitOutcome> = JoinSet::new();

        for id in range.ids() {
            // The backpressure point: blocks while W units are in flight.
            // Cancellation (first failure or external) stops dispatch here,
            // and wins over an available permit when both are ready.
            let permit = tokio::select! {
                biased;
                () = self.cancel_token.cancelled() => break,
                acquired = self.fetch_slots.clone().acquire_owned() => {
                    match acquired {
                        Ok(permit) => permit,
                        Err(_) => break,
                    }
                }
            };

            // Progress is reported at dispatch time, not completion time
            self.emit_event(Event::ItemDispatched { id });
            tracing::debug!(%id, "dispatching fetch");

            let source = Arc::clone(&self.source);
            let db = Arc::clone(&self.db);
            let event_tx = self.event_tx.clone();
            let cancel = self.cancel_token.clone();
            let first_error = Arc::clone(&first_error);
            let skip_missing = self.config.download.skip_missing_items;

            units.spawn(async move {
                // Held for the unit's whole lifetime; released by drop
                // regardless of outcome
                let _permit = permit;

                let result = tokio::select! {
                    biased;
                    () = cancel.cancelled() => return UnitOutcome::Cancelled,
                    result = fetch_and_store(source.as_ref(), &db, id) => result,
                };

                match result {
                    Ok(()) => {
                        event_tx.send(Event::ItemStored { id }).ok();
                        UnitOutcome::Stored
                    }
                    Err(err) if skip_missing && err.is_missing_item() => {
                        let status = match &err {
                            Error::Feed(FeedError::ItemStatus { status, .. }) => *status,
                            _ => 0,
                        };
                        tracing::warn!(%id, status, "item missing on feed, skipping");
                        event_tx.send(Event::ItemSkipped { id, status }).ok();
                        UnitOutcome::Skipped
                    }
                    Err(err) => {
                        tracing::error!(%id, error = %err, "fetch-and-store failed, aborting run");
                        let mut slot = first_error.lock().await;
                        if slot.is_none() {
                            *slot = Some(err);
                        }
                        drop(slot);
                        cancel.cancel();
                        UnitOutcome::Cancelled
                    }
                }
            });
        }

        // Join every outstanding unit before declaring the run finished.
        // The range being exhausted only means every id was dispatched;
        // "done" requires all writes durable.
        let mut stored = 0u64;
        let mut skipped = 0u64;
        while let Some(joined) = units.join_next().await {
            match joined {
                Ok(UnitOutcome::Stored) => stored += 1,
                Ok(UnitOutcome::Skipped) => skipped += 1,
                Ok(UnitOutcome::Cancelled) => {}
                Err(join_err) => {
                    let mut slot = first_error.lock().await;
                    if slot.is_none() {
                        *slot = Some(Error::Task(join_err.to_string()));
                    }
                    drop(slot);
                    self.cancel_token.cancel();
                }
            }
        }

        if let Some(err) = first_error.lock().await.take() {
            self.emit_event(Event::RangeAborted {
                error: err.to_string(),
            });
            return Err(err);
        }

        if self.cancel_token.is_cancelled() {
            let err = Error::Cancelled;
            self.emit_event(Event::RangeAborted {
                error: err.to_string(),
            });
            return Err(err);
        }

        tracing::info!(stored, skipped, %range, "range mirrored");
        self.emit_event(Event::RangeCompleted { stored });

        Ok(RunSummary {
            range,
            stored,
            skipped,
        })
    }
}

/// One unit of work: fetch the item, then write it through the store's
/// single-writer gate.
async fn fetch_and_store(source: &dyn ItemSource, db: &Database, id: ItemId) -> Result<()> {
    let payload = source.fetch_item(id).await?;
    db.insert_item(id, &payload).await
}
