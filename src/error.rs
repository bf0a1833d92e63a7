//! Errors raised while handling one segmentation request.

use crate::ports::predictor::ProviderError;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SegmentError {
    /// Staging or removing the uploaded video failed.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// The prediction reached a non-success terminal state.
    #[error("Prediction failed: {0}")]
    PredictionFailed(String),

    /// The prediction succeeded but carried no output.
    #[error("No output video URL received from Replicate.")]
    MissingOutput,

    #[error("Prediction {id} did not finish within {waited:?}")]
    DeadlineExceeded { id: String, waited: Duration },

    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Required form field absent from the upload.
    #[error("Missing form field: {0}")]
    MissingField(&'static str),

    #[error("Invalid multipart body: {0}")]
    Multipart(String),
}
