//! Replicate adapter.
//!
//! Implements `PredictionPort` over the Replicate HTTP API:
//! - staged videos go through the files API and are referenced by URL
//! - predictions are created against a pinned version and polled by id

mod client;
mod error;

pub use client::ReplicateClient;
