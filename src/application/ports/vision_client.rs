use std::pin::Pin;

use async_trait::async_trait;
use futures::stream::Stream;

/// Content fragments of a streamed model answer, in order.
///
/// The stream ends after the model signalled completion. A transport that
/// closes before that yields [`VisionClientError::IncompleteStream`].
pub type VisionTokenStream =
    Pin<Box<dyn Stream<Item = Result<String, VisionClientError>> + Send + 'static>>;

#[async_trait]
pub trait VisionClient: Send + Sync {
    async fn analyze_stream(
        &self,
        image: &[u8],
        mime_type: &str,
    ) -> Result<VisionTokenStream, VisionClientError>;
}

#[derive(Debug, thiserror::Error)]
pub enum VisionClientError {
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("rate limited")]
    RateLimited,
    #[error("stream ended before completion")]
    IncompleteStream,
    #[error("configuration error: {0}")]
    Configuration(String),
}
