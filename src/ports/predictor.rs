use crate::domain::jobs::PredictionRequest;
use crate::domain::prediction::Prediction;
use async_trait::async_trait;
use std::error::Error as StdError;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Prediction API request failed: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    #[error("Prediction API returned {status}: {detail}")]
    Api { status: u16, detail: String },

    #[error("Failed to read staged video: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PredictionPort: Send + Sync {
    /// Create a prediction, sending the staged video as its video input.
    /// How the content travels (upload, data URI...) is up to the adapter.
    async fn create_prediction(
        &self,
        request: &PredictionRequest,
        video: &Path,
    ) -> Result<Prediction, ProviderError>;

    /// Fetch the current state of a prediction
    async fn get_prediction(&self, id: &str) -> Result<Prediction, ProviderError>;
}
