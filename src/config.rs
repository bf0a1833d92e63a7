//! Configuration for the segmenter server.
//!
//! The Replicate token is the only value read from the environment (after
//! loading `.env`). Everything else is a command-line option with a default.

use crate::application::segmenter::PollPolicy;
use clap::Parser;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the Replicate API token.
pub const API_TOKEN_VAR: &str = "REPLICATE_API_TOKEN";

/// Pinned snapshot of the remote model, never "latest".
pub const DEFAULT_MODEL_VERSION: &str =
    "meta/sam-2-video:33432afdfc06a10da6b4018932893d39b0159f838b6d11dd1236dff85cc5ec1d";

pub const DEFAULT_API_BASE_URL: &str = "https://api.replicate.com/v1";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("REPLICATE_API_TOKEN env var required")]
    MissingToken,
    #[error("REPLICATE_API_TOKEN is empty")]
    EmptyToken,
}

/// Command-line options for the server binary.
#[derive(Parser, Debug, Clone)]
#[command(name = "sam2-segmenter", version, about = "SAM 2 video segmentation backend")]
pub struct ServerArgs {
    /// HTTP server bind address
    #[arg(long, default_value = "0.0.0.0")]
    pub addr: String,

    /// HTTP server port
    #[arg(long, default_value_t = 8000)]
    pub port: u16,

    /// Directory served under /static
    #[arg(long, default_value = "static")]
    pub static_dir: PathBuf,

    /// Directory for staged uploads (defaults to the system temp dir)
    #[arg(long)]
    pub staging_dir: Option<PathBuf>,

    /// Model version as `owner/name:hash`, or a bare hash
    #[arg(long, default_value = DEFAULT_MODEL_VERSION)]
    pub model_version: String,

    /// Replicate API base URL
    #[arg(long, default_value = DEFAULT_API_BASE_URL)]
    pub api_base_url: String,

    /// Network timeout of the Replicate client, in seconds
    #[arg(long, default_value_t = 600)]
    pub http_timeout_secs: u64,

    /// Delay between two status checks, in milliseconds
    #[arg(long, default_value_t = 500)]
    pub poll_interval_ms: u64,

    /// Give up waiting for a prediction after this many seconds
    #[arg(long, default_value_t = 600)]
    pub poll_deadline_secs: u64,
}

/// Immutable configuration shared by every request.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub addr: String,
    pub port: u16,
    pub static_dir: PathBuf,
    pub staging_dir: PathBuf,
    pub api_token: String,
    pub api_base_url: String,
    pub model_version: String,
    pub http_timeout: Duration,
    pub poll: PollPolicy,
}

impl AppConfig {
    /// Load `.env`, read the API token and merge it with the parsed arguments.
    pub fn load(args: ServerArgs) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let token = env::var(API_TOKEN_VAR).map_err(|_| ConfigError::MissingToken)?;
        Self::from_parts(token, args)
    }

    pub fn from_parts(api_token: String, args: ServerArgs) -> Result<Self, ConfigError> {
        let api_token = api_token.trim().to_string();
        if api_token.is_empty() {
            return Err(ConfigError::EmptyToken);
        }

        Ok(Self {
            addr: args.addr,
            port: args.port,
            static_dir: args.static_dir,
            staging_dir: args.staging_dir.unwrap_or_else(env::temp_dir),
            api_token,
            api_base_url: args.api_base_url.trim_end_matches('/').to_string(),
            model_version: version_id(&args.model_version).to_string(),
            http_timeout: Duration::from_secs(args.http_timeout_secs),
            poll: PollPolicy {
                interval: Duration::from_millis(args.poll_interval_ms),
                deadline: Duration::from_secs(args.poll_deadline_secs),
            },
        })
    }
}

/// Replicate expects only the hash part of `owner/name:hash`.
pub fn version_id(model_version: &str) -> &str {
    model_version
        .rsplit(':')
        .next()
        .unwrap_or(model_version)
}
