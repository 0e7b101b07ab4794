// Provider trait for sensor feed access
use crate::domain::feed::FeedPayload;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed request failed: {0}")]
    Transport(String),

    #[error("feed returned status {0}")]
    Status(u16),

    #[error("malformed feed payload: {0}")]
    Malformed(String),

    #[error("feed request timed out after {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait FeedProvider: Send + Sync {
    /// False when the provider has no credentials and always answers empty
    fn is_enabled(&self) -> bool;

    /// Full history snapshot, newest record first
    async fn fetch_history(&self) -> Result<FeedPayload, FeedError>;

    /// Most recent records only, newest first
    async fn fetch_latest(&self) -> Result<FeedPayload, FeedError>;
}
