use super::upload;
use crate::adapters::local::fs::StagingArea;
use crate::application::segmenter::SegmentationService;
use crate::domain::jobs::SegmentationJob;
use crate::error::SegmentError;
use crate::ports::predictor::PredictionPort;
use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

const WELCOME: &str =
    "Welcome to SAM 2 Video Segmenter. Go to /static/index.html to use the app.";

/// Shared, immutable per-process state.
pub struct AppState<P> {
    pub service: SegmentationService<P>,
    pub staging: StagingArea,
    pub model_version: String,
}

#[derive(Debug, Serialize)]
pub struct SegmentResponse {
    pub output_video: Value,
}

pub fn router<P>(state: AppState<P>, static_dir: &Path) -> Router
where
    P: PredictionPort + 'static,
{
    Router::new()
        .route("/", get(root))
        .route("/api/segment", post(segment_video::<P>))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

async fn root() -> Json<Value> {
    Json(json!({ "message": WELCOME }))
}

// Stage the upload, run the prediction, always drop the staged file.
async fn segment_video<P>(
    State(state): State<Arc<AppState<P>>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SegmentResponse>, SegmentError>
where
    P: PredictionPort + 'static,
{
    let multipart = multipart.map_err(|rej| SegmentError::Multipart(rej.body_text()))?;
    let upload = upload::receive(&state.staging, multipart).await?;
    let job = SegmentationJob::new(
        upload.video.path().to_path_buf(),
        &state.model_version,
        &upload.clicks,
    );

    let outcome = state.service.run(&job).await;
    let removed = upload.video.remove();

    // Removal failure only surfaces when nothing else went wrong.
    let output_video = match (outcome, removed) {
        (Ok(output_video), Ok(())) => output_video,
        (Ok(_), Err(e)) => return Err(SegmentError::Io(e)),
        (Err(err), removed) => {
            if let Err(e) = removed {
                tracing::warn!(path = ?job.temp_video_path, error = %e, "Failed to remove staged video");
            }
            return Err(err);
        }
    };
    Ok(Json(SegmentResponse { output_video }))
}

impl IntoResponse for SegmentError {
    fn into_response(self) -> Response {
        let status = match &self {
            SegmentError::MissingField(_) => StatusCode::UNPROCESSABLE_ENTITY,
            SegmentError::Multipart(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = ?self, "Segmentation request failed: {}", self);
        } else {
            tracing::warn!("Rejected segmentation request: {}", self);
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
