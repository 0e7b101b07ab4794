// Provider trait for model-generated advice
use crate::domain::reading::CanonicalReading;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum AdvisoryRequest {
    /// Ask for recommendations about a single reading
    Latest(CanonicalReading),
    /// Ask for a forecast over a recent window, oldest first
    Window(Vec<CanonicalReading>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub forecast: String,
    pub analysis: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdvisoryResponse {
    Recommendations(Vec<String>),
    Forecast(Forecast),
}

#[derive(Debug, Error)]
pub enum AdvisoryError {
    #[error("advisory request failed: {0}")]
    Transport(String),

    #[error("advisory provider returned status {0}: {1}")]
    Status(u16, String),

    #[error("unparsable advisory response: {0}")]
    Unparsable(String),

    #[error("advisory request timed out after {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait AdvisoryProvider: Send + Sync {
    async fn advise(&self, request: &AdvisoryRequest) -> Result<AdvisoryResponse, AdvisoryError>;
}
