use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::Image;

/// Wire shape of an image record, shared by the listing and JSON export.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageView {
    pub id: Uuid,
    pub original_name: String,
    pub new_name: Option<String>,
    pub cloud_storage_path: String,
    pub file_size: u64,
    pub mime_type: String,
    /// JSON array text, as stored.
    pub objects: Option<String>,
    pub detected_text: Option<String>,
    pub location: Option<String>,
    pub metadata: Option<String>,
    pub analysis_status: String,
    pub analysis_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Image> for ImageView {
    fn from(image: &Image) -> Self {
        Self {
            id: image.id.as_uuid(),
            original_name: image.original_name.clone(),
            new_name: image.new_name.clone(),
            cloud_storage_path: image.cloud_storage_path.as_str().to_string(),
            file_size: image.file_size,
            mime_type: image.mime_type.clone(),
            objects: image.objects.as_ref().map(|o| objects_text(o)),
            detected_text: image.detected_text.clone(),
            location: image.location.clone(),
            metadata: image.metadata.clone(),
            analysis_status: image.analysis_status.as_str().to_string(),
            analysis_error: image.analysis_error.clone(),
            created_at: image.created_at,
            updated_at: image.updated_at,
        }
    }
}

pub(crate) fn objects_text(objects: &[String]) -> String {
    serde_json::to_string(objects).unwrap_or_default()
}
