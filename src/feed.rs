//! Remote feed client
//!
//! The feed exposes two well-known HTTP endpoints: one returning the current
//! maximum item id as a bare decimal integer, and one returning a single
//! item's raw representation by id. The client treats item payloads as
//! opaque text; the feed's internal schema is irrelevant here.

use crate::config::FeedConfig;
use crate::error::{Error, FeedError, Result};
use crate::types::ItemId;
use url::Url;

/// Abstraction over the remote feed, enabling testability.
///
/// The bounded downloader drives this trait rather than a concrete HTTP
/// client, so tests can substitute an in-process source.
#[async_trait::async_trait]
pub trait ItemSource: Send + Sync {
    /// Current upper bound of valid item ids on the feed
    async fn max_item_id(&self) -> Result<ItemId>;

    /// Raw representation of one item
    async fn fetch_item(&self, id: ItemId) -> Result<String>;
}

/// Production [`ItemSource`] over the feed's HTTP API.
pub struct FeedClient {
    http_client: reqwest::Client,
    base_url: Url,
}

impl FeedClient {
    /// Create a new feed client
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created or the base URL
    /// cannot serve as a join base for the item endpoints.
    pub fn new(config: &FeedConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::Config {
                message: format!("Failed to create HTTP client: {}", e),
                key: None,
            })?;

        // Reject cannot-be-a-base URLs up front rather than on first fetch
        config.base_url.join("maxitem.json").map_err(|e| Error::Config {
            message: format!("Feed base URL cannot address endpoints: {}", e),
            key: Some("feed.base_url".to_string()),
        })?;

        Ok(Self {
            http_client,
            base_url: config.base_url.clone(),
        })
    }

    fn max_item_url(&self) -> Result<Url> {
        self.base_url
            .join("maxitem.json")
            .map_err(|e| FeedError::MaxIdUnavailable { reason: e.to_string() }.into())
    }

    fn item_url(&self, id: ItemId) -> Result<Url> {
        self.base_url
            .join(&format!("item/{}.json", id))
            .map_err(|e| {
                FeedError::ItemUnavailable {
                    id,
                    reason: e.to_string(),
                }
                .into()
            })
    }
}

#[async_trait::async_trait]
impl ItemSource for FeedClient {
    async fn max_item_id(&self) -> Result<ItemId> {
        let url = self.max_item_url()?;
        tracing::debug!(%url, "fetching max item id");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| FeedError::MaxIdUnavailable { reason: e.to_string() })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::MaxIdStatus {
                status: status.as_u16(),
            }
            .into());
        }

        let body = response
            .text()
            .await
            .map_err(|e| FeedError::MaxIdUnavailable { reason: e.to_string() })?;

        // The endpoint returns a bare decimal, usually newline-terminated
        let id: i64 = body.trim().parse().map_err(|_| FeedError::MaxIdParse {
            body: body.clone(),
        })?;

        Ok(ItemId(id))
    }

    async fn fetch_item(&self, id: ItemId) -> Result<String> {
        let url = self.item_url(id)?;

        let response = self.http_client.get(url).send().await.map_err(|e| {
            FeedError::ItemUnavailable {
                id,
                reason: e.to_string(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::ItemStatus {
                id,
                status: status.as_u16(),
            }
            .into());
        }

        let body = response.text().await.map_err(|e| FeedError::ItemRead {
            id,
            reason: e.to_string(),
        })?;

        Ok(body)
    }
}
