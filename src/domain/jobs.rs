use serde::Serialize;
use std::path::PathBuf;

/// Mask rendering mode requested from the model.
pub const MASK_TYPE: &str = "highlighted";

/// Frame rate of the rendered output video.
pub const VIDEO_FPS: u32 = 25;

/// Click annotations supplied by the user, passed through verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickPrompts {
    pub coordinates: String,
    pub frames: String,
    pub object_ids: String,
}

impl ClickPrompts {
    pub fn new(coordinates: impl Into<String>) -> Self {
        Self {
            coordinates: coordinates.into(),
            frames: "1".to_string(),
            object_ids: "1".to_string(),
        }
    }
}

/// Model input without the video, which the provider adapter attaches.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentationInput {
    pub mask_type: String,
    pub video_fps: u32,
    pub click_frames: String,
    pub output_video: bool,
    pub click_object_ids: String,
    pub click_coordinates: String,
}

impl From<&ClickPrompts> for SegmentationInput {
    fn from(clicks: &ClickPrompts) -> Self {
        Self {
            mask_type: MASK_TYPE.to_string(),
            video_fps: VIDEO_FPS,
            click_frames: clicks.frames.clone(),
            output_video: true,
            click_object_ids: clicks.object_ids.clone(),
            click_coordinates: clicks.coordinates.clone(),
        }
    }
}

/// A prediction to create against a pinned model version.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRequest {
    pub version: String,
    pub input: SegmentationInput,
}

/// One segmentation job per HTTP request.
#[derive(Debug, Clone)]
pub struct SegmentationJob {
    pub temp_video_path: PathBuf,
    pub request: PredictionRequest,
}

impl SegmentationJob {
    pub fn new(temp_video_path: PathBuf, version: &str, clicks: &ClickPrompts) -> Self {
        Self {
            temp_video_path,
            request: PredictionRequest {
                version: version.to_string(),
                input: SegmentationInput::from(clicks),
            },
        }
    }
}
