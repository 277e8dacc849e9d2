//! Shared helpers for mirror tests: an instrumented in-process item source
//! and a Mirror factory over a temp database.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tempfile::NamedTempFile;

use crate::config::Config;
use crate::db::Database;
use crate::error::{FeedError, Result};
use crate::feed::ItemSource;
use crate::mirror::Mirror;
use crate::types::ItemId;

/// In-process [`ItemSource`] with failure injection and concurrency
/// instrumentation.
///
/// Counters make the permit-pool bound observable: `max_in_flight` records
/// the highest number of simultaneously running `fetch_item` calls.
pub(crate) struct MockSource {
    max_id: i64,
    fail_statuses: HashMap<i64, u16>,
    fail_max_id_status: Option<u16>,
    fetch_delay: Option<Duration>,
    pub(crate) fetch_count: AtomicUsize,
    in_flight: AtomicUsize,
    pub(crate) max_in_flight: AtomicUsize,
    pub(crate) fetch_order: std::sync::Mutex<Vec<i64>>,
}

impl MockSource {
    pub(crate) fn new(max_id: i64) -> Self {
        Self {
            max_id,
            fail_statuses: HashMap::new(),
            fail_max_id_status: None,
            fetch_delay: None,
            fetch_count: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            fetch_order: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Answer fetches of `id` with the given HTTP status instead of a payload
    pub(crate) fn fail_item(mut self, id: i64, status: u16) -> Self {
        self.fail_statuses.insert(id, status);
        self
    }

    /// Answer the max-id query with the given HTTP status
    pub(crate) fn fail_max_id(mut self, status: u16) -> Self {
        self.fail_max_id_status = Some(status);
        self
    }

    /// Delay every item fetch, giving concurrent units time to overlap
    pub(crate) fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = Some(delay);
        self
    }

    pub(crate) fn payload_for(id: ItemId) -> String {
        format!(r#"{{"id":{},"type":"story"}}"#, id)
    }
}

#[async_trait::async_trait]
impl ItemSource for MockSource {
    async fn max_item_id(&self) -> Result<ItemId> {
        if let Some(status) = self.fail_max_id_status {
            return Err(FeedError::MaxIdStatus { status }.into());
        }
        Ok(ItemId(self.max_id))
    }

    async fn fetch_item(&self, id: ItemId) -> Result<String> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        self.fetch_order.lock().unwrap().push(id.get());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let result = async {
            if let Some(delay) = self.fetch_delay {
                tokio::time::sleep(delay).await;
            }
            if let Some(status) = self.fail_statuses.get(&id.get()) {
                return Err(FeedError::ItemStatus {
                    id,
                    status: *status,
                }
                .into());
            }
            Ok(Self::payload_for(id))
        }
        .await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Build a Mirror over a fresh temp database and the given source.
///
/// The returned `NamedTempFile` must stay alive for the duration of the test.
pub(crate) async fn test_mirror(
    source: Arc<MockSource>,
    workers: usize,
    skip_missing: bool,
) -> (Mirror, NamedTempFile) {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Arc::new(Database::new(temp_file.path()).await.unwrap());

    let mut config = Config::default();
    config.download.max_concurrent_fetches = workers;
    config.download.skip_missing_items = skip_missing;

    let mirror = Mirror::with_source(config, db, source as Arc<dyn ItemSource>).unwrap();
    (mirror, temp_file)
}
