//! Domain layer - Pure business logic.

// Segmentation job definitions
pub mod jobs;

// Remote prediction model and outcome translation
pub mod prediction;
