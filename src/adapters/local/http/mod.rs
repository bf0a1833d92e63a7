//! HTTP inbound adapter.
//!
//! Serves the segmentation endpoint, the welcome message and the static
//! front-end bundle.

mod routes;
mod upload;

pub use routes::{router, AppState, SegmentResponse};
