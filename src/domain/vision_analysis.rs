use serde::Deserialize;

use super::filename::FilenameRequest;

/// Structured answer the vision model is asked to produce.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisionAnalysis {
    #[serde(default)]
    pub objects: Option<Vec<String>>,
    #[serde(default)]
    pub detected_text: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub main_object: Option<String>,
    #[serde(default)]
    pub is_sign: Option<bool>,
}

#[derive(Debug, thiserror::Error)]
#[error("invalid analysis output: {0}")]
pub struct InvalidAnalysisOutput(String);

impl VisionAnalysis {
    /// Parses the reassembled model output. The output must be a JSON object;
    /// a surrounding Markdown code fence is tolerated.
    pub fn parse(raw: &str) -> Result<Self, InvalidAnalysisOutput> {
        let body = strip_code_fence(raw.trim());
        serde_json::from_str(body).map_err(|e| InvalidAnalysisOutput(e.to_string()))
    }

    pub fn objects(&self) -> Vec<String> {
        self.objects.clone().unwrap_or_default()
    }

    pub fn detected_text(&self) -> Option<String> {
        self.detected_text.clone().filter(|t| !t.is_empty())
    }

    pub fn location(&self) -> Option<String> {
        self.location.clone().filter(|l| !l.is_empty())
    }

    /// The location is never trusted: the model only sees re-encoded pixels,
    /// so whatever it reports cannot come from capture metadata.
    pub fn filename_request<'a>(
        &'a self,
        sequence_index: u64,
        extension: &'a str,
    ) -> FilenameRequest<'a> {
        FilenameRequest {
            location: self.location.as_deref(),
            location_is_trusted: false,
            main_object: self.main_object.as_deref(),
            detected_text: self.detected_text.as_deref(),
            is_sign: self.is_sign.unwrap_or(false),
            sequence_index,
            extension,
        }
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
