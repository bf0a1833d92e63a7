//! SAM 2 Video Segmenter - segmentation request orchestrator
//!
//! Hexagonal Architecture:
//! - domain/: Segmentation job and prediction types, result translation
//! - ports/: Trait definitions
//! - adapters/: Concrete implementations (local fs + HTTP, Replicate)
//! - application/: Submit / wait / translate service
//! - config: Environment and command-line configuration
//! - error: Request-level error taxonomy

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;

// Re-exports for convenience
pub use adapters::local::http::router;
pub use adapters::replicate::ReplicateClient;
pub use application::segmenter::SegmentationService;
pub use config::{AppConfig, ServerArgs};
pub use error::SegmentError;
