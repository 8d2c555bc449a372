use std::sync::Arc;

use futures::StreamExt;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::Instrument;
use uuid::Uuid;

use crate::application::ports::{
    ImageRepository, ImageStore, ImageStoreError, RepositoryError, VisionClient, VisionClientError,
};
use crate::domain::{
    CompletedAnalysis, Identity, Image, ImageId, InvalidAnalysisOutput, UserId, VisionAnalysis,
    extract_extension, generate_filename,
};

const EVENT_BUFFER: usize = 32;
const UNKNOWN_ERROR: &str = "Unknown error";

/// Progress of one analysis run as seen by the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AnalysisEvent {
    Processing { message: String },
    Completed { result: AnalysisOutcome },
    Error { message: String },
}

impl AnalysisEvent {
    fn processing(message: &str) -> Self {
        Self::Processing {
            message: message.to_string(),
        }
    }

    fn error(message: &str) -> Self {
        Self::Error {
            message: message.to_string(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Processing { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutcome {
    pub image_id: Uuid,
    pub new_name: String,
    pub objects: Vec<String>,
    /// Empty when no text was detected; the stored record keeps `None`.
    pub detected_text: String,
    pub location: Option<String>,
}

pub struct AnalysisService {
    repository: Arc<dyn ImageRepository>,
    store: Arc<dyn ImageStore>,
    vision_client: Arc<dyn VisionClient>,
}

impl AnalysisService {
    pub fn new(
        repository: Arc<dyn ImageRepository>,
        store: Arc<dyn ImageStore>,
        vision_client: Arc<dyn VisionClient>,
    ) -> Self {
        Self {
            repository,
            store,
            vision_client,
        }
    }

    /// Runs the analysis on its own task and returns its event feed.
    ///
    /// Dropping the receiver does not stop the run; the record always ends
    /// in `completed` or `failed` once the analysis has started.
    pub fn start(
        self: &Arc<Self>,
        identity: &Identity,
        image_id: ImageId,
    ) -> mpsc::Receiver<AnalysisEvent> {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let service = Arc::clone(self);
        let owner = identity.owner();
        let span = tracing::info_span!("analysis", image_id = %image_id);

        tokio::spawn(
            async move {
                let events = EventSink(tx);
                service.run(owner, image_id, &events).await;
            }
            .instrument(span),
        );

        rx
    }

    async fn run(&self, owner: Option<UserId>, image_id: ImageId, events: &EventSink) {
        let image = match self.repository.get(owner, image_id).await {
            Ok(Some(image)) => image,
            Ok(None) => {
                events.send(AnalysisEvent::error("Image not found")).await;
                return;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load image for analysis");
                events.send(AnalysisEvent::error("Analysis failed")).await;
                return;
            }
        };

        match self.repository.begin_analysis(image_id).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::info!(status = %image.analysis_status, "Analysis trigger rejected");
                events
                    .send(AnalysisEvent::error(
                        "Analysis already in progress or completed",
                    ))
                    .await;
                return;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to mark image as processing");
                events.send(AnalysisEvent::error("Analysis failed")).await;
                return;
            }
        }

        events
            .send(AnalysisEvent::processing("Starting analysis..."))
            .await;

        match self.analyze(&image, events).await {
            Ok(outcome) => {
                tracing::info!(new_name = %outcome.new_name, "Analysis completed");
                events
                    .send(AnalysisEvent::Completed { result: outcome })
                    .await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Analysis failed");
                let message = e.to_string();
                let message = if message.is_empty() {
                    UNKNOWN_ERROR
                } else {
                    message.as_str()
                };
                if let Err(e) = self.repository.fail_analysis(image_id, message).await {
                    tracing::error!(error = %e, "Failed to record analysis failure");
                }
                events.send(AnalysisEvent::error("Analysis failed")).await;
            }
        }
    }

    async fn analyze(
        &self,
        image: &Image,
        events: &EventSink,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        let bytes = self.store.fetch(&image.cloud_storage_path).await?;

        events
            .send(AnalysisEvent::processing("Analyzing image with Vision AI..."))
            .await;

        let mut tokens = self
            .vision_client
            .analyze_stream(&bytes, &image.mime_type)
            .await?;

        let mut answer = String::new();
        while let Some(fragment) = tokens.next().await {
            answer.push_str(&fragment?);
            events.send(AnalysisEvent::processing("Analyzing...")).await;
        }

        let analysis = VisionAnalysis::parse(&answer)?;

        let ordinal = self.repository.next_ordinal().await?;
        let extension = extract_extension(&image.original_name);
        let new_name = generate_filename(&analysis.filename_request(ordinal, extension));

        let completed = CompletedAnalysis {
            new_name,
            objects: analysis.objects(),
            detected_text: analysis.detected_text(),
            location: analysis.location(),
        };

        if !self
            .repository
            .complete_analysis(image.id, &completed)
            .await?
        {
            return Err(AnalysisError::StateConflict);
        }

        Ok(AnalysisOutcome {
            image_id: image.id.as_uuid(),
            new_name: completed.new_name,
            objects: completed.objects,
            detected_text: completed.detected_text.unwrap_or_default(),
            location: completed.location,
        })
    }
}

/// Delivery to a caller that may have gone away.
struct EventSink(mpsc::Sender<AnalysisEvent>);

impl EventSink {
    async fn send(&self, event: AnalysisEvent) {
        if self.0.send(event).await.is_err() {
            tracing::debug!("Analysis subscriber disconnected");
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("storage: {0}")]
    Storage(#[from] ImageStoreError),
    #[error("vision model: {0}")]
    Vision(#[from] VisionClientError),
    #[error("{0}")]
    InvalidOutput(#[from] InvalidAnalysisOutput),
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
    #[error("image left processing state during analysis")]
    StateConflict,
}
