use super::error::api_detail;
use crate::config::AppConfig;
use crate::domain::jobs::{PredictionRequest, SegmentationInput};
use crate::domain::prediction::Prediction;
use crate::ports::predictor::{PredictionPort, ProviderError};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

/// Replicate API client with its own long network timeout.
#[derive(Clone)]
pub struct ReplicateClient {
    client: Client,
    base_url: String,
    api_token: String,
}

#[derive(Deserialize)]
struct UploadedFile {
    urls: FileUrls,
}

#[derive(Deserialize)]
struct FileUrls {
    get: String,
}

#[derive(Serialize)]
struct CreatePrediction<'a> {
    version: &'a str,
    input: VideoInput<'a>,
}

#[derive(Serialize)]
struct VideoInput<'a> {
    #[serde(flatten)]
    settings: &'a SegmentationInput,
    input_video: &'a str,
}

impl ReplicateClient {
    pub fn new(
        base_url: impl Into<String>,
        api_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token: api_token.into(),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ProviderError> {
        Self::new(
            config.api_base_url.clone(),
            config.api_token.clone(),
            config.http_timeout,
        )
    }

    /// Stream a local file to the files API and return its URL.
    pub async fn upload_file(&self, path: &Path) -> Result<String, ProviderError> {
        let file = File::open(path).await?;
        let length = file.metadata().await?.len();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video.mp4".to_string());

        let body = Body::wrap_stream(ReaderStream::new(file));
        let part = Part::stream_with_length(body, length)
            .file_name(file_name)
            .mime_str("video/mp4")?;
        let form = Form::new().part("content", part);

        let response = self
            .client
            .post(format!("{}/files", self.base_url))
            .bearer_auth(&self.api_token)
            .multipart(form)
            .send()
            .await?;

        let uploaded: UploadedFile = decode(response).await?;
        tracing::debug!(url = %uploaded.urls.get, size = length, "Staged video uploaded");
        Ok(uploaded.urls.get)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ProviderError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Api {
            status: status.as_u16(),
            detail: api_detail(&body),
        });
    }
    Ok(response.json::<T>().await?)
}

#[async_trait]
impl PredictionPort for ReplicateClient {
    async fn create_prediction(
        &self,
        request: &PredictionRequest,
        video: &Path,
    ) -> Result<Prediction, ProviderError> {
        let video_url = self.upload_file(video).await?;

        let body = CreatePrediction {
            version: &request.version,
            input: VideoInput {
                settings: &request.input,
                input_video: &video_url,
            },
        };

        let response = self
            .client
            .post(format!("{}/predictions", self.base_url))
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await?;

        decode(response).await
    }

    async fn get_prediction(&self, id: &str) -> Result<Prediction, ProviderError> {
        let response = self
            .client
            .get(format!("{}/predictions/{}", self.base_url, id))
            .bearer_auth(&self.api_token)
            .send()
            .await?;

        decode(response).await
    }
}
