//! Segmenter server binary.
//!
//! Wires up:
//! - Replicate prediction adapter
//! - Segmentation service (submit, poll, translate)
//! - Local staging area and the HTTP API

use clap::Parser;
use sam2_segmenter::adapters::local::http::{router, AppState};
use sam2_segmenter::adapters::local::StagingArea;
use sam2_segmenter::{AppConfig, ReplicateClient, SegmentationService, ServerArgs};

#[tokio::main]
async fn main() {
    let args = ServerArgs::parse();

    tracing_subscriber::fmt::init();

    let config = match AppConfig::load(args) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    // 1. Adapters
    let replicate = match ReplicateClient::from_config(&config) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Failed to create Replicate client: {}", e);
            std::process::exit(1);
        }
    };

    // 2. Application service
    let state = AppState {
        service: SegmentationService::new(replicate, config.poll),
        staging: StagingArea::new(&config.staging_dir),
        model_version: config.model_version.clone(),
    };

    // 3. HTTP layer
    let app = router(state, &config.static_dir);

    // 4. Start server
    let listener = tokio::net::TcpListener::bind(format!("{}:{}", config.addr, config.port))
        .await
        .expect("Failed to bind TCP listener");
    tracing::info!(
        staging_dir = ?config.staging_dir,
        static_dir = ?config.static_dir,
        "Listening at {}:{}",
        config.addr,
        config.port
    );
    axum::serve(listener, app)
        .await
        .expect("Server failed to start");
}
