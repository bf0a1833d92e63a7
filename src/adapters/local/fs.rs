//! Staging area for uploaded videos.

use crate::error::SegmentError;
use axum::body::Bytes;
use axum::BoxError;
use futures::{Stream, TryStreamExt};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tokio::{fs::File, io::BufWriter};
use tokio_util::io::StreamReader;
use uuid::Uuid;

/// Directory where uploads live while their request is handled.
#[derive(Clone, Debug)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Fresh, collision-free file name for one request.
    fn next_path(&self) -> PathBuf {
        self.dir.join(format!("temp_{}.mp4", Uuid::new_v4()))
    }

    /// Write the whole stream to a new staged file.
    ///
    /// A failed write leaves nothing behind: the partial file is removed
    /// when the returned guard would have been.
    pub async fn stage<S, E>(&self, stream: S) -> Result<StagedVideo, SegmentError>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: Into<BoxError>,
    {
        let staged = StagedVideo {
            path: TempPath::try_from_path(self.next_path())?,
        };
        let file = File::create(staged.path()).await?;

        stream_to_file(file, stream).await?;
        tracing::debug!(path = ?staged.path(), "Video staged");
        Ok(staged)
    }
}

/// A staged upload. The file is deleted on drop if not removed explicitly.
#[derive(Debug)]
pub struct StagedVideo {
    path: TempPath,
}

impl StagedVideo {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the file now, reporting any failure.
    pub fn remove(self) -> io::Result<()> {
        self.path.close()
    }
}

// Save a `Stream` to a file
async fn stream_to_file<S, E>(file: File, stream: S) -> io::Result<()>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Into<BoxError>,
{
    let body_with_io_error = stream.map_err(|err| io::Error::new(io::ErrorKind::Other, err));
    let body_reader = StreamReader::new(body_with_io_error);
    futures::pin_mut!(body_reader);

    let mut file = BufWriter::new(file);
    tokio::io::copy(&mut body_reader, &mut file).await?;
    tokio::io::AsyncWriteExt::flush(&mut file).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures::stream;
    use std::fs;
    use tempfile::tempdir;

    type E = std::io::Error;

    #[tokio::test]
    async fn test_stage_writes_content() {
        let temp_dir = tempdir().unwrap();
        let staging = StagingArea::new(temp_dir.path());

        let mock_stream = stream::iter(vec![
            Ok::<Bytes, E>(Bytes::from("Hello, ")),
            Ok(Bytes::from("world!")),
        ]);
        let staged = staging.stage(mock_stream).await.unwrap();

        assert!(staged.path().is_absolute());
        assert!(staged.path().starts_with(temp_dir.path()));
        let name = staged.path().file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("temp_") && name.ends_with(".mp4"));
        assert_eq!(fs::read_to_string(staged.path()).unwrap(), "Hello, world!");
    }

    #[tokio::test]
    async fn test_remove_deletes_file() {
        let temp_dir = tempdir().unwrap();
        let staging = StagingArea::new(temp_dir.path());

        let staged = staging
            .stage(stream::iter(vec![Ok::<Bytes, E>(Bytes::from("x"))]))
            .await
            .unwrap();
        let path = staged.path().to_path_buf();
        assert!(path.exists());

        staged.remove().unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_drop_deletes_file() {
        let temp_dir = tempdir().unwrap();
        let staging = StagingArea::new(temp_dir.path());

        let staged = staging
            .stage(stream::iter(vec![Ok::<Bytes, E>(Bytes::from("x"))]))
            .await
            .unwrap();
        let path = staged.path().to_path_buf();
        drop(staged);

        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_stream_error_leaves_nothing_behind() {
        let temp_dir = tempdir().unwrap();
        let staging = StagingArea::new(temp_dir.path());

        let mock_stream = stream::iter(vec![Ok(Bytes::from("partial")), Err("Test error")]);
        let result = staging.stage(mock_stream).await;

        match result {
            Err(SegmentError::Io(e)) => assert_eq!(e.to_string(), "Test error"),
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_missing_directory_fails() {
        let temp_dir = tempdir().unwrap();
        let staging = StagingArea::new(temp_dir.path().join("does-not-exist"));

        let result = staging
            .stage(stream::iter(vec![Ok::<Bytes, E>(Bytes::from("x"))]))
            .await;

        assert!(matches!(result, Err(SegmentError::Io(_))));
    }

    #[tokio::test]
    async fn test_concurrent_stages_get_distinct_names() {
        let temp_dir = tempdir().unwrap();
        let staging = StagingArea::new(temp_dir.path());

        let (a, b) = tokio::join!(
            staging.stage(stream::iter(vec![Ok::<Bytes, E>(Bytes::from("a"))])),
            staging.stage(stream::iter(vec![Ok::<Bytes, E>(Bytes::from("b"))])),
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_ne!(a.path(), b.path());
        assert_eq!(fs::read_to_string(a.path()).unwrap(), "a");
        assert_eq!(fs::read_to_string(b.path()).unwrap(), "b");
    }
}
