//! Adapters - Concrete implementations of ports.

pub mod local;
pub mod replicate;
