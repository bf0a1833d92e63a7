use crate::domain::jobs::SegmentationJob;
use crate::domain::prediction::Prediction;
use crate::error::SegmentError;
use crate::ports::predictor::PredictionPort;
use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;

/// How often and for how long to poll a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub deadline: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            deadline: Duration::from_secs(600),
        }
    }
}

/// Submits a segmentation job, waits for it and translates the result.
pub struct SegmentationService<P> {
    predictor: P,
    poll: PollPolicy,
}

impl<P> SegmentationService<P>
where
    P: PredictionPort,
{
    pub fn new(predictor: P, poll: PollPolicy) -> Self {
        Self { predictor, poll }
    }

    pub async fn run(&self, job: &SegmentationJob) -> Result<Value, SegmentError> {
        tracing::info!(
            video = ?job.temp_video_path,
            clicks = %job.request.input.click_coordinates,
            "Processing video"
        );

        let prediction = self.submit(job).await?;
        let prediction = self.wait(prediction).await?;

        let outcome = prediction.into_outcome();
        match &outcome {
            Ok(output) => tracing::info!(%output, "Prediction succeeded"),
            Err(e) => tracing::warn!(error = %e, "Prediction did not produce a video"),
        }
        outcome
    }

    async fn submit(&self, job: &SegmentationJob) -> Result<Prediction, SegmentError> {
        let prediction = self
            .predictor
            .create_prediction(&job.request, &job.temp_video_path)
            .await?;
        tracing::info!(prediction_id = %prediction.id, status = %prediction.status, "Prediction started");
        Ok(prediction)
    }

    /// Poll until the prediction is terminal or the deadline passes.
    pub async fn wait(&self, mut prediction: Prediction) -> Result<Prediction, SegmentError> {
        let started = Instant::now();

        while !prediction.status.is_terminal() {
            if started.elapsed() >= self.poll.deadline {
                return Err(SegmentError::DeadlineExceeded {
                    id: prediction.id,
                    waited: started.elapsed(),
                });
            }
            tokio::time::sleep(self.poll.interval).await;

            let previous = prediction.status;
            prediction = self.predictor.get_prediction(&prediction.id).await?;
            if prediction.status != previous {
                tracing::debug!(
                    prediction_id = %prediction.id,
                    from = %previous,
                    to = %prediction.status,
                    "Prediction status changed"
                );
            }
        }

        if let Some(logs) = prediction.logs.as_deref().filter(|l| !l.is_empty()) {
            let tail = logs.lines().last().unwrap_or_default();
            tracing::debug!(prediction_id = %prediction.id, last_log = tail, "Prediction finished");
        }
        Ok(prediction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::jobs::ClickPrompts;
    use crate::domain::prediction::PredictionStatus;
    use crate::ports::predictor::{MockPredictionPort, ProviderError};
    use mockall::predicate::eq;
    use mockall::Sequence;
    use serde_json::json;
    use std::path::{Path, PathBuf};

    fn fast_poll() -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(1),
            deadline: Duration::from_secs(5),
        }
    }

    fn job() -> SegmentationJob {
        SegmentationJob::new(
            PathBuf::from("temp_test.mp4"),
            "33432afd",
            &ClickPrompts::new("150,200"),
        )
    }

    fn prediction(status: PredictionStatus) -> Prediction {
        Prediction {
            id: "p1".to_string(),
            status,
            output: None,
            error: None,
            logs: None,
        }
    }

    #[tokio::test]
    async fn test_run_polls_until_succeeded() {
        let mut port = MockPredictionPort::new();
        let mut seq = Sequence::new();

        port.expect_create_prediction()
            .withf(|request, video| {
                request.version == "33432afd"
                    && request.input.click_coordinates == "150,200"
                    && video == Path::new("temp_test.mp4")
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(prediction(PredictionStatus::Starting)));
        port.expect_get_prediction()
            .with(eq("p1"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(prediction(PredictionStatus::Processing)));
        port.expect_get_prediction()
            .with(eq("p1"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(Prediction {
                    output: Some(json!("https://replicate.delivery/out.mp4")),
                    ..prediction(PredictionStatus::Succeeded)
                })
            });

        let service = SegmentationService::new(port, fast_poll());
        let output = service.run(&job()).await.unwrap();

        assert_eq!(output, json!("https://replicate.delivery/out.mp4"));
    }

    #[tokio::test]
    async fn test_run_reports_failure_detail() {
        let mut port = MockPredictionPort::new();
        port.expect_create_prediction()
            .times(1)
            .returning(|_, _| Ok(prediction(PredictionStatus::Processing)));
        port.expect_get_prediction().times(1).returning(|_| {
            Ok(Prediction {
                error: Some(json!("invalid click coordinates")),
                ..prediction(PredictionStatus::Failed)
            })
        });

        let service = SegmentationService::new(port, fast_poll());
        let err = service.run(&job()).await.unwrap_err();

        assert_eq!(err.to_string(), "Prediction failed: invalid click coordinates");
    }

    #[tokio::test]
    async fn test_terminal_on_creation_skips_polling() {
        let mut port = MockPredictionPort::new();
        port.expect_create_prediction().times(1).returning(|_, _| {
            Ok(Prediction {
                output: Some(json!(["https://replicate.delivery/a.mp4"])),
                ..prediction(PredictionStatus::Succeeded)
            })
        });
        port.expect_get_prediction().times(0);

        let service = SegmentationService::new(port, fast_poll());
        let output = service.run(&job()).await.unwrap();

        assert_eq!(output, json!(["https://replicate.delivery/a.mp4"]));
    }

    #[tokio::test]
    async fn test_wait_gives_up_after_deadline() {
        let mut port = MockPredictionPort::new();
        port.expect_get_prediction()
            .returning(|_| Ok(prediction(PredictionStatus::Processing)));

        let service = SegmentationService::new(
            port,
            PollPolicy {
                interval: Duration::from_millis(5),
                deadline: Duration::from_millis(30),
            },
        );
        let err = service
            .wait(prediction(PredictionStatus::Starting))
            .await
            .unwrap_err();

        match err {
            SegmentError::DeadlineExceeded { id, waited } => {
                assert_eq!(id, "p1");
                assert!(waited >= Duration::from_millis(30));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_provider_error_stops_polling() {
        let mut port = MockPredictionPort::new();
        port.expect_create_prediction()
            .times(1)
            .returning(|_, _| Ok(prediction(PredictionStatus::Starting)));
        port.expect_get_prediction().times(1).returning(|_| {
            Err(ProviderError::Api {
                status: 502,
                detail: "Bad Gateway".to_string(),
            })
        });

        let service = SegmentationService::new(port, fast_poll());
        let err = service.run(&job()).await.unwrap_err();

        assert_eq!(err.to_string(), "Prediction API returned 502: Bad Gateway");
    }
}
