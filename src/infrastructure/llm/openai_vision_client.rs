use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use futures::stream::StreamExt;
use reqwest::Client;
use serde::Serialize;

use crate::application::ports::{VisionClient, VisionClientError, VisionTokenStream};
use crate::infrastructure::observability::output_preview;
use crate::presentation::config::VisionSettings;

use super::sse_decoder::{SseDecoder, SseFrame};

const ANALYSIS_PROMPT: &str = r#"Analyze this image and provide the following information in JSON format:
{
  "objects": ["list of main objects, items, or subjects visible in the image"],
  "detectedText": "any text or writing visible in the image (OCR). If there are multiple signs or text elements, extract all of them.",
  "location": "if identifiable from visual landmarks or context, provide specific location name, otherwise null",
  "isLocationFromMetadata": false (IMPORTANT: always set to false since we cannot extract EXIF metadata from base64),
  "mainObject": "the PRIMARY object or subject in the image - this should be the object that is either centrally positioned OR occupies more than 50% of the image area",
  "isPrimaryObjectCentral": true/false (is the main object centrally positioned or occupying more than 50% of image),
  "isSign": true/false (is the main object a sign, placard, or contains text as its primary feature)
}

IMPORTANT RULES:
- The mainObject must be the most prominent object (central position OR >50% coverage)
- Set isSign to true if the main object is a sign, placard, traffic sign, street sign, billboard, or any object where text is the primary feature
- Extract ALL visible text in detectedText, not just from signs

Respond with raw JSON only. Do not include code blocks, markdown, or any other formatting."#;

/// Streams image analyses from an OpenAI-compatible chat completions API.
pub struct OpenAiVisionClient {
    client: Client,
    provider: String,
    completions_url: String,
    api_key: String,
    model: String,
    max_tokens: usize,
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: usize,
    stream: bool,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: Vec<ContentPart>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    ImageUrl { image_url: ImageUrl },
    Text { text: String },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    r#type: &'static str,
}

impl OpenAiVisionClient {
    pub fn completions_url(&self) -> &str {
        &self.completions_url
    }

    fn build_request(&self, image: &[u8], mime_type: &str) -> ChatCompletionRequest {
        let data_url = format!("data:{};base64,{}", mime_type, BASE64.encode(image));
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: data_url },
                    },
                    ContentPart::Text {
                        text: ANALYSIS_PROMPT.to_string(),
                    },
                ],
            }],
            max_tokens: self.max_tokens,
            stream: true,
            response_format: ResponseFormat {
                r#type: "json_object",
            },
        }
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.provider == "azure" {
            request.header("api-key", &self.api_key)
        } else {
            request.header("Authorization", format!("Bearer {}", self.api_key))
        }
    }
}

#[async_trait]
impl VisionClient for OpenAiVisionClient {
    #[tracing::instrument(skip(self, image), fields(bytes = image.len(), model = %self.model))]
    async fn analyze_stream(
        &self,
        image: &[u8],
        mime_type: &str,
    ) -> Result<VisionTokenStream, VisionClientError> {
        let request_body = self.build_request(image, mime_type);

        let request = self
            .client
            .post(&self.completions_url)
            .json(&request_body);
        let response = self
            .apply_auth(request)
            .send()
            .await
            .map_err(|e| VisionClientError::ApiRequestFailed(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(VisionClientError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(VisionClientError::ApiRequestFailed(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let mut bytes = Box::pin(response.bytes_stream());
        let token_stream = async_stream::stream! {
            let mut decoder = SseDecoder::new();
            let mut transcript = String::new();
            while let Some(chunk) = bytes.next().await {
                match chunk {
                    Ok(chunk) => {
                        for frame in decoder.push(&chunk) {
                            match frame {
                                SseFrame::Delta(content) => {
                                    transcript.push_str(&content);
                                    yield Ok(content);
                                }
                                SseFrame::Done => {
                                    tracing::debug!(output = %output_preview(&transcript), "Vision stream completed");
                                    return;
                                }
                            }
                        }
                    }
                    Err(e) => {
                        yield Err(VisionClientError::ApiRequestFailed(e.to_string()));
                        return;
                    }
                }
            }
            for frame in decoder.finish() {
                match frame {
                    SseFrame::Delta(content) => {
                        transcript.push_str(&content);
                        yield Ok(content);
                    }
                    SseFrame::Done => {
                        tracing::debug!(output = %output_preview(&transcript), "Vision stream completed");
                        return;
                    }
                }
            }
            tracing::warn!(output = %output_preview(&transcript), "Vision stream closed before completion");
            yield Err(VisionClientError::IncompleteStream);
        };

        Ok(Box::pin(token_stream))
    }
}

const DEFAULT_AZURE_API_VERSION: &str = "2024-06-01";

/// Resolves the provider's chat completions endpoint. `base_url` overrides
/// the hosted defaults.
pub fn create_vision_client(
    settings: &VisionSettings,
) -> Result<OpenAiVisionClient, VisionClientError> {
    let base_url = settings
        .base_url
        .as_deref()
        .map(|url| url.trim_end_matches('/').to_string());

    let completions_url = match settings.provider.as_str() {
        "openai" => format!(
            "{}/chat/completions",
            base_url.as_deref().unwrap_or("https://api.openai.com/v1")
        ),
        "abacus" => format!(
            "{}/chat/completions",
            base_url.as_deref().unwrap_or("https://apps.abacus.ai/v1")
        ),
        "lmstudio" => {
            let base_url = base_url.ok_or_else(|| {
                VisionClientError::Configuration(
                    "base_url required for lmstudio provider".to_string(),
                )
            })?;
            format!("{base_url}/chat/completions")
        }
        "azure" => {
            let endpoint = settings.azure_endpoint.as_deref().ok_or_else(|| {
                VisionClientError::Configuration(
                    "azure_endpoint required for azure provider".to_string(),
                )
            })?;
            format!(
                "{}/openai/deployments/{}/chat/completions?api-version={}",
                endpoint.trim_end_matches('/'),
                settings.model,
                settings
                    .api_version
                    .as_deref()
                    .unwrap_or(DEFAULT_AZURE_API_VERSION)
            )
        }
        other => {
            return Err(VisionClientError::Configuration(format!(
                "unknown provider: {other}"
            )));
        }
    };

    Ok(OpenAiVisionClient {
        client: Client::new(),
        provider: settings.provider.clone(),
        completions_url,
        api_key: settings.api_key.clone(),
        model: settings.model.clone(),
        max_tokens: settings.max_tokens,
    })
}
