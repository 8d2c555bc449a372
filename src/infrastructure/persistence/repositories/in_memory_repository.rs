use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::application::ports::{ImageRepository, RepositoryError, UserRepository};
use crate::domain::{AnalysisStatus, CompletedAnalysis, Image, ImageId, User, UserId};

/// Process-local image records, for tests and storage-less local runs.
#[derive(Default)]
pub struct InMemoryImageRepository {
    images: Mutex<HashMap<ImageId, Image>>,
    ordinal: AtomicU64,
}

impl InMemoryImageRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(mut images: Vec<Image>) -> Vec<Image> {
    images.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    images
}

#[async_trait::async_trait]
impl ImageRepository for InMemoryImageRepository {
    async fn create(&self, image: &Image) -> Result<(), RepositoryError> {
        let mut images = self.images.lock().await;
        if images.contains_key(&image.id) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "duplicate image id: {}",
                image.id
            )));
        }
        images.insert(image.id, image.clone());
        Ok(())
    }

    async fn get(
        &self,
        owner: Option<UserId>,
        id: ImageId,
    ) -> Result<Option<Image>, RepositoryError> {
        let images = self.images.lock().await;
        Ok(images.get(&id).filter(|i| i.is_owned_by(owner)).cloned())
    }

    async fn list(&self, owner: Option<UserId>) -> Result<Vec<Image>, RepositoryError> {
        let images = self.images.lock().await;
        Ok(newest_first(
            images
                .values()
                .filter(|i| i.is_owned_by(owner))
                .cloned()
                .collect(),
        ))
    }

    async fn list_completed(&self, owner: Option<UserId>) -> Result<Vec<Image>, RepositoryError> {
        let images = self.images.lock().await;
        Ok(newest_first(
            images
                .values()
                .filter(|i| {
                    i.is_owned_by(owner) && i.analysis_status == AnalysisStatus::Completed
                })
                .cloned()
                .collect(),
        ))
    }

    async fn list_created_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Image>, RepositoryError> {
        let images = self.images.lock().await;
        let mut expired: Vec<Image> = images
            .values()
            .filter(|i| i.created_at < cutoff)
            .cloned()
            .collect();
        expired.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(expired)
    }

    async fn find_many(
        &self,
        owner: Option<UserId>,
        ids: &[ImageId],
    ) -> Result<Vec<Image>, RepositoryError> {
        let images = self.images.lock().await;
        Ok(newest_first(
            ids.iter()
                .filter_map(|id| images.get(id))
                .filter(|i| i.is_owned_by(owner))
                .cloned()
                .collect(),
        ))
    }

    async fn rename(
        &self,
        owner: Option<UserId>,
        id: ImageId,
        new_name: &str,
    ) -> Result<Option<Image>, RepositoryError> {
        let mut images = self.images.lock().await;
        match images
            .get_mut(&id)
            .filter(|i| i.is_owned_by(owner) && i.analysis_status == AnalysisStatus::Completed)
        {
            Some(image) => {
                image.new_name = Some(new_name.to_string());
                image.updated_at = Utc::now();
                Ok(Some(image.clone()))
            }
            None => Ok(None),
        }
    }

    async fn begin_analysis(&self, id: ImageId) -> Result<bool, RepositoryError> {
        let mut images = self.images.lock().await;
        match images.get_mut(&id) {
            Some(image) if image.analysis_status.can_start_analysis() => {
                image.analysis_status = AnalysisStatus::Processing;
                image.analysis_error = None;
                image.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn complete_analysis(
        &self,
        id: ImageId,
        analysis: &CompletedAnalysis,
    ) -> Result<bool, RepositoryError> {
        let mut images = self.images.lock().await;
        match images.get_mut(&id) {
            Some(image) if image.analysis_status == AnalysisStatus::Processing => {
                image.new_name = Some(analysis.new_name.clone());
                image.objects = Some(analysis.objects.clone());
                image.detected_text = analysis.detected_text.clone();
                image.location = analysis.location.clone();
                image.analysis_status = AnalysisStatus::Completed;
                image.analysis_error = None;
                image.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn fail_analysis(
        &self,
        id: ImageId,
        error_message: &str,
    ) -> Result<bool, RepositoryError> {
        let mut images = self.images.lock().await;
        match images.get_mut(&id) {
            Some(image) if image.analysis_status == AnalysisStatus::Processing => {
                image.analysis_status = AnalysisStatus::Failed;
                image.analysis_error = Some(error_message.to_string());
                image.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn next_ordinal(&self) -> Result<u64, RepositoryError> {
        Ok(self.ordinal.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn delete_many(
        &self,
        owner: Option<UserId>,
        ids: &[ImageId],
    ) -> Result<u64, RepositoryError> {
        let mut images = self.images.lock().await;
        let mut deleted = 0;
        for id in ids {
            let owned = images.get(id).is_some_and(|i| i.is_owned_by(owner));
            if owned && images.remove(id).is_some() {
                deleted += 1;
            }
        }
        Ok(deleted)
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<String, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &User) -> Result<(), RepositoryError> {
        let mut users = self.users.lock().await;
        let email = user.email.to_lowercase();
        if users.contains_key(&email) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "email already registered: {}",
                email
            )));
        }
        users.insert(email, user.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let users = self.users.lock().await;
        Ok(users.get(&email.to_lowercase()).cloned())
    }
}
