use super::{AnalysisStatus, ImageId, StoragePath, UserId};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub id: ImageId,
    pub owner_id: Option<UserId>,
    pub original_name: String,
    pub new_name: Option<String>,
    pub cloud_storage_path: StoragePath,
    pub file_size: u64,
    pub mime_type: String,
    pub objects: Option<Vec<String>>,
    pub detected_text: Option<String>,
    pub location: Option<String>,
    pub metadata: Option<String>,
    pub analysis_status: AnalysisStatus,
    pub analysis_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Image {
    pub fn new(
        id: ImageId,
        owner_id: Option<UserId>,
        original_name: String,
        cloud_storage_path: StoragePath,
        file_size: u64,
        mime_type: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            owner_id,
            original_name,
            new_name: None,
            cloud_storage_path,
            file_size,
            mime_type,
            objects: None,
            detected_text: None,
            location: None,
            metadata: None,
            analysis_status: AnalysisStatus::Pending,
            analysis_error: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, owner: Option<UserId>) -> bool {
        match owner {
            Some(user_id) => self.owner_id == Some(user_id),
            None => true,
        }
    }
}

/// Fields written when an analysis completes successfully.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedAnalysis {
    pub new_name: String,
    pub objects: Vec<String>,
    pub detected_text: Option<String>,
    pub location: Option<String>,
}
