// Consentium feed client
use crate::application::feed_provider::{FeedError, FeedProvider};
use crate::domain::feed::FeedPayload;
use crate::infrastructure::config::FeedEndpoint;
use async_trait::async_trait;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ConsentiumFeedProvider {
    endpoint: Option<FeedEndpoint>,
    client: reqwest::Client,
}

impl ConsentiumFeedProvider {
    /// `None` puts the provider in disabled mode: every fetch answers empty.
    pub fn new(endpoint: Option<FeedEndpoint>, timeout: Duration) -> anyhow::Result<Self> {
        if endpoint.is_none() {
            tracing::warn!("Consentium credentials not set, feed polling disabled");
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { endpoint, client })
    }

    fn build_url(endpoint: &FeedEndpoint, recents: bool) -> String {
        let mut url = format!(
            "{}/getData?receiveKey={}&boardKey={}",
            endpoint.base_url,
            urlencoding::encode(&endpoint.receive_key),
            urlencoding::encode(&endpoint.board_key)
        );
        if recents {
            url.push_str("&recents=true");
        }
        url
    }

    async fn fetch(&self, recents: bool) -> Result<FeedPayload, FeedError> {
        let Some(endpoint) = &self.endpoint else {
            return Ok(FeedPayload::default());
        };
        let url = Self::build_url(endpoint, recents);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| FeedError::Transport(e.without_url().to_string()))?;

        if !response.status().is_success() {
            return Err(FeedError::Status(response.status().as_u16()));
        }

        let payload = response
            .json::<FeedPayload>()
            .await
            .map_err(|e| FeedError::Malformed(e.without_url().to_string()))?;

        if payload.feeds.is_none() {
            return Err(FeedError::Malformed("missing feeds array".to_string()));
        }
        if payload.feeds().is_empty() {
            tracing::warn!("Consentium returned no feed data");
        }

        tracing::debug!(
            "Fetched {} feed records (recents: {})",
            payload.feeds().len(),
            recents
        );
        Ok(payload)
    }
}

#[async_trait]
impl FeedProvider for ConsentiumFeedProvider {
    fn is_enabled(&self) -> bool {
        self.endpoint.is_some()
    }

    async fn fetch_history(&self) -> Result<FeedPayload, FeedError> {
        self.fetch(false).await
    }

    async fn fetch_latest(&self) -> Result<FeedPayload, FeedError> {
        self.fetch(true).await
    }
}
