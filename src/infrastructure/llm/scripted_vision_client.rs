use crate::application::ports::{VisionClient, VisionClientError, VisionTokenStream};

/// Replays a fixed model answer, split into the given fragments.
pub struct ScriptedVisionClient {
    fragments: Vec<String>,
    fail_with: Option<String>,
}

impl ScriptedVisionClient {
    pub fn answering(fragments: &[&str]) -> Self {
        Self {
            fragments: fragments.iter().map(|f| (*f).to_string()).collect(),
            fail_with: None,
        }
    }

    /// Rejects every request before any fragment is streamed.
    pub fn failing(message: &str) -> Self {
        Self {
            fragments: Vec::new(),
            fail_with: Some(message.to_string()),
        }
    }
}

#[async_trait::async_trait]
impl VisionClient for ScriptedVisionClient {
    async fn analyze_stream(
        &self,
        _image: &[u8],
        _mime_type: &str,
    ) -> Result<VisionTokenStream, VisionClientError> {
        if let Some(message) = &self.fail_with {
            return Err(VisionClientError::ApiRequestFailed(message.clone()));
        }
        let items: Vec<Result<String, VisionClientError>> =
            self.fragments.iter().cloned().map(Ok).collect();
        Ok(Box::pin(futures::stream::iter(items)))
    }
}
