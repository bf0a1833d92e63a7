//! Replicate error mapping.

use crate::ports::predictor::ProviderError;

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Transport(Box::new(err))
    }
}

/// Replicate reports problems as `{"title": .., "detail": ..}`; fall back to the raw body.
pub(super) fn api_detail(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(String::from))
        .unwrap_or_else(|| body.trim().to_string())
}
