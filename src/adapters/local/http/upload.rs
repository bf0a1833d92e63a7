use crate::adapters::local::fs::{StagedVideo, StagingArea};
use crate::domain::jobs::ClickPrompts;
use crate::error::SegmentError;
use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;

/// A parsed `/api/segment` form: the staged video and the click prompts.
#[derive(Debug)]
pub(super) struct SegmentUpload {
    pub video: StagedVideo,
    pub clicks: ClickPrompts,
}

fn multipart_error(err: MultipartError) -> SegmentError {
    SegmentError::Multipart(err.body_text())
}

/// Read the form, streaming the `video` part straight into the staging area.
///
/// Click strings are taken verbatim. `click_frames` and `click_object_ids`
/// default to `"1"`.
pub(super) async fn receive(
    staging: &StagingArea,
    mut multipart: Multipart,
) -> Result<SegmentUpload, SegmentError> {
    let mut video = None;
    let mut coordinates = None;
    let mut frames = None;
    let mut object_ids = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            "video" => video = Some(staging.stage(field).await?),
            "click_coordinates" => coordinates = Some(field.text().await.map_err(multipart_error)?),
            "click_frames" => frames = Some(field.text().await.map_err(multipart_error)?),
            "click_object_ids" => object_ids = Some(field.text().await.map_err(multipart_error)?),
            _ => continue,
        }
    }

    let video = video.ok_or(SegmentError::MissingField("video"))?;
    let coordinates = coordinates.ok_or(SegmentError::MissingField("click_coordinates"))?;

    let mut clicks = ClickPrompts::new(coordinates);
    if let Some(frames) = frames {
        clicks.frames = frames;
    }
    if let Some(object_ids) = object_ids {
        clicks.object_ids = object_ids;
    }

    Ok(SegmentUpload { video, clicks })
}
