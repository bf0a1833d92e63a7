//! Local adapters: upload staging on disk and the inbound HTTP API.

pub mod fs;
pub mod http;

pub use fs::{StagedVideo, StagingArea};
