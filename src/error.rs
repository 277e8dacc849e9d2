//! Error types for feed-mirror
//!
//! This module provides error handling for the library, including:
//! - Domain-specific error types (Feed, Store)
//! - Contextual information (which operation failed, for which item id)
//!
//! No error in this crate is recovered or retried: any fetch or store failure
//! surfaced during a run terminates that run with the first error observed.

use crate::types::ItemId;
use thiserror::Error;

/// Result type alias for feed-mirror operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for feed-mirror
///
/// This is the primary error type used throughout the library. Each variant includes
/// contextual information to help diagnose issues.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "feed.base_url")
        key: Option<String>,
    },

    /// Remote feed operation failed
    #[error("feed error: {0}")]
    Feed(#[from] FeedError),

    /// Local store operation failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A spawned worker unit could not be joined (panicked or was aborted)
    #[error("worker task failed: {0}")]
    Task(String),

    /// The run was cancelled before the range was fully mirrored
    #[error("run cancelled before completing")]
    Cancelled,
}

/// Remote feed errors
///
/// Each variant names the endpoint that failed and, for per-item operations,
/// the item id. The feed client performs no retries; one failure is terminal
/// for the operation that hit it.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Network-level failure talking to the max-item endpoint
    #[error("failed to fetch max item id: {reason}")]
    MaxIdUnavailable {
        /// Underlying transport error
        reason: String,
    },

    /// Max-item endpoint answered with a non-success status
    #[error("max item endpoint returned HTTP {status}")]
    MaxIdStatus {
        /// The HTTP status code received
        status: u16,
    },

    /// Max-item endpoint body was not a bare decimal integer
    #[error("max item body {body:?} is not an integer")]
    MaxIdParse {
        /// The body that failed to parse
        body: String,
    },

    /// Network-level failure fetching one item
    #[error("failed to fetch item {id}: {reason}")]
    ItemUnavailable {
        /// The item id that was being fetched
        id: ItemId,
        /// Underlying transport error
        reason: String,
    },

    /// Item endpoint answered with a non-success status
    #[error("item {id} returned HTTP {status}")]
    ItemStatus {
        /// The item id that was being fetched
        id: ItemId,
        /// The HTTP status code received
        status: u16,
    },

    /// Item response body could not be fully read
    #[error("failed to read body of item {id}: {reason}")]
    ItemRead {
        /// The item id whose body failed to read
        id: ItemId,
        /// Underlying read error
        reason: String,
    },
}

/// Local store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to open or connect to the store
    #[error("failed to connect to store: {0}")]
    ConnectionFailed(String),

    /// Failed to run schema migrations
    #[error("failed to run migrations: {0}")]
    MigrationFailed(String),

    /// A write failed, including primary-key violations on duplicate ids
    #[error("failed to persist item {id}: {reason}")]
    Persist {
        /// The item id that was being written
        id: ItemId,
        /// Underlying write error
        reason: String,
    },

    /// A read or aggregate query failed
    #[error("store scan failed: {0}")]
    Scan(String),
}

impl FeedError {
    /// The HTTP status carried by this error, if it was a status failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            FeedError::MaxIdStatus { status } | FeedError::ItemStatus { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

impl Error {
    /// Whether this error is a per-item fetch that came back 404/410.
    ///
    /// Used by the skip-missing mode to distinguish a deleted remote item
    /// from a feed outage.
    pub fn is_missing_item(&self) -> bool {
        matches!(
            self,
            Error::Feed(FeedError::ItemStatus {
                status: 404 | 410,
                ..
            })
        )
    }
}
