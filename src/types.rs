//! Core types for feed-mirror

use serde::{Deserialize, Serialize};

/// Unique identifier for a feed item
///
/// Item ids are positive integers assigned by the remote feed in posting
/// order. They are dense-ish but not guaranteed contiguous: an id in range
/// may refer to a deleted item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub i64);

impl ItemId {
    /// Create a new ItemId
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner i64 value
    pub fn get(&self) -> i64 {
        self.0
    }

    /// The id immediately after this one
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl From<i64> for ItemId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<ItemId> for i64 {
    fn from(id: ItemId) -> Self {
        id.0
    }
}

impl PartialEq<i64> for ItemId {
    fn eq(&self, other: &i64) -> bool {
        self.0 == *other
    }
}

impl PartialEq<ItemId> for i64 {
    fn eq(&self, other: &ItemId) -> bool {
        *self == other.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ItemId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

// Implement sqlx Type, Encode, and Decode for database operations
impl sqlx::Type<sqlx::Sqlite> for ItemId {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <i64 as sqlx::Type<sqlx::Sqlite>>::type_info()
    }

    fn compatible(ty: &sqlx::sqlite::SqliteTypeInfo) -> bool {
        <i64 as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for ItemId {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        sqlx::Encode::<sqlx::Sqlite>::encode_by_ref(&self.0, buf)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for ItemId {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let id = <i64 as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        Ok(Self(id))
    }
}

/// Closed interval of item ids to mirror in one run
///
/// Computed once per run by the resume calculator and consumed entirely by
/// one download pass. `first > last` means there is nothing to fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRange {
    /// First id to fetch (inclusive)
    pub first: ItemId,
    /// Last id to fetch (inclusive)
    pub last: ItemId,
}

impl ItemRange {
    /// Create a new range covering `[first, last]`
    pub fn new(first: ItemId, last: ItemId) -> Self {
        Self { first, last }
    }

    /// Whether the range contains no ids
    pub fn is_empty(&self) -> bool {
        self.first.0 > self.last.0
    }

    /// Number of ids in the range
    pub fn len(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            (self.last.0 - self.first.0 + 1) as u64
        }
    }

    /// Iterate the ids in increasing order
    pub fn ids(&self) -> impl Iterator<Item = ItemId> {
        (self.first.0..=self.last.0).map(ItemId)
    }
}

impl std::fmt::Display for ItemRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.first, self.last)
    }
}

/// Outcome of a completed mirror run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    /// The range this run was asked to mirror
    pub range: ItemRange,
    /// Number of items fetched and persisted by this run
    pub stored: u64,
    /// Number of missing items skipped (only nonzero in skip-missing mode)
    pub skipped: u64,
}

/// Events emitted during a mirror run
///
/// Events are delivered over a broadcast channel; subscribers that fall
/// behind the buffer receive a `Lagged` error rather than stalling the run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// A run started with a non-trivial resume range
    RangeStarted {
        /// First id that will be dispatched
        first: ItemId,
        /// Last id that will be dispatched
        last: ItemId,
    },
    /// An id was handed to a worker unit (reported at dispatch time,
    /// before the fetch completes)
    ItemDispatched {
        /// The dispatched id
        id: ItemId,
    },
    /// An item was fetched and durably written
    ItemStored {
        /// The persisted id
        id: ItemId,
    },
    /// A missing remote item was skipped (skip-missing mode only)
    ItemSkipped {
        /// The skipped id
        id: ItemId,
        /// HTTP status the feed answered with
        status: u16,
    },
    /// Every id in the range was dispatched and every unit drained
    RangeCompleted {
        /// Number of items persisted by the run
        stored: u64,
    },
    /// The run stopped before the range was fully mirrored
    RangeAborted {
        /// Diagnostic for the first failure observed
        error: String,
    },
}
