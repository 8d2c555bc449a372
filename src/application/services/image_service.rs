use std::io;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{Duration, Utc};
use futures::stream::BoxStream;
use serde::Serialize;

use crate::application::ports::{ImageRepository, ImageStore, ImageStoreError, RepositoryError};
use crate::domain::{AnalysisStatus, Identity, Image, ImageId, StoragePath};

pub struct ImageService {
    repository: Arc<dyn ImageRepository>,
    store: Arc<dyn ImageStore>,
    folder_prefix: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub deleted_records: u64,
    pub deleted_objects: u64,
}

impl ImageService {
    pub fn new(
        repository: Arc<dyn ImageRepository>,
        store: Arc<dyn ImageStore>,
        folder_prefix: String,
    ) -> Self {
        Self {
            repository,
            store,
            folder_prefix,
        }
    }

    /// Streams the bytes to object storage and records a `pending` image.
    #[tracing::instrument(skip(self, identity, stream), fields(filename = %filename))]
    pub async fn upload(
        &self,
        identity: &Identity,
        filename: &str,
        mime_type: &str,
        stream: BoxStream<'_, Result<Bytes, io::Error>>,
    ) -> Result<Image, ImageServiceError> {
        let id = ImageId::new();
        let path = StoragePath::for_upload(&self.folder_prefix, &id, filename);

        let file_size = self.store.store(&path, stream).await?;

        let image = Image::new(
            id,
            identity.owner(),
            filename.to_string(),
            path,
            file_size,
            mime_type.to_string(),
        );

        if let Err(e) = self.repository.create(&image).await {
            self.delete_object_best_effort(&image.cloud_storage_path)
                .await;
            return Err(e.into());
        }

        tracing::info!(image_id = %id, size = file_size, "Image uploaded");
        Ok(image)
    }

    pub async fn list(&self, identity: &Identity) -> Result<Vec<Image>, ImageServiceError> {
        Ok(self.repository.list(identity.owner()).await?)
    }

    pub async fn rename(
        &self,
        identity: &Identity,
        id: ImageId,
        new_name: &str,
    ) -> Result<Image, ImageServiceError> {
        if new_name.trim().is_empty() {
            return Err(ImageServiceError::InvalidInput(
                "Image ID and new name are required".to_string(),
            ));
        }

        let image = self
            .repository
            .get(identity.owner(), id)
            .await?
            .ok_or(ImageServiceError::NotFound)?;
        if image.analysis_status != AnalysisStatus::Completed {
            return Err(ImageServiceError::NotAnalyzed);
        }

        // The status may change between the read and the update.
        self.repository
            .rename(identity.owner(), id, new_name)
            .await?
            .ok_or(ImageServiceError::NotAnalyzed)
    }

    #[tracing::instrument(skip(self, identity))]
    pub async fn delete(&self, identity: &Identity, id: ImageId) -> Result<(), ImageServiceError> {
        let image = self
            .repository
            .get(identity.owner(), id)
            .await?
            .ok_or(ImageServiceError::NotFound)?;

        self.delete_object_best_effort(&image.cloud_storage_path)
            .await;
        self.repository.delete_many(identity.owner(), &[id]).await?;

        tracing::info!("Image deleted");
        Ok(())
    }

    #[tracing::instrument(skip(self, identity, ids), fields(requested = ids.len()))]
    pub async fn batch_delete(
        &self,
        identity: &Identity,
        ids: &[ImageId],
    ) -> Result<u64, ImageServiceError> {
        if ids.is_empty() {
            return Err(ImageServiceError::InvalidInput(
                "No image ids given".to_string(),
            ));
        }

        let images = self.repository.find_many(identity.owner(), ids).await?;
        if images.is_empty() {
            return Err(ImageServiceError::NotFound);
        }

        self.delete_images(identity, &images).await
    }

    pub async fn delete_all(&self, identity: &Identity) -> Result<u64, ImageServiceError> {
        let images = self.repository.list(identity.owner()).await?;
        if images.is_empty() {
            return Ok(0);
        }

        self.delete_images(identity, &images).await
    }

    /// Removes every image older than `max_age`, regardless of owner.
    #[tracing::instrument(skip(self))]
    pub async fn sweep_expired(&self, max_age: Duration) -> Result<SweepReport, ImageServiceError> {
        let cutoff = Utc::now() - max_age;
        let expired = self.repository.list_created_before(cutoff).await?;
        if expired.is_empty() {
            return Ok(SweepReport::default());
        }

        let mut deleted_objects = 0;
        for image in &expired {
            if self.delete_object_best_effort(&image.cloud_storage_path).await {
                deleted_objects += 1;
            }
        }

        let ids: Vec<ImageId> = expired.iter().map(|i| i.id).collect();
        let deleted_records = self.repository.delete_many(None, &ids).await?;

        tracing::info!(deleted_records, deleted_objects, "Retention sweep finished");
        Ok(SweepReport {
            deleted_records,
            deleted_objects,
        })
    }

    async fn delete_images(
        &self,
        identity: &Identity,
        images: &[Image],
    ) -> Result<u64, ImageServiceError> {
        for image in images {
            self.delete_object_best_effort(&image.cloud_storage_path)
                .await;
        }

        let ids: Vec<ImageId> = images.iter().map(|i| i.id).collect();
        let deleted = self.repository.delete_many(identity.owner(), &ids).await?;
        tracing::info!(deleted, "Images deleted");
        Ok(deleted)
    }

    async fn delete_object_best_effort(&self, path: &StoragePath) -> bool {
        match self.store.delete(path).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, path = %path, "Failed to delete stored object");
                false
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ImageServiceError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("image not found")]
    NotFound,
    #[error("image has not been analysed")]
    NotAnalyzed,
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
    #[error("storage: {0}")]
    Storage(#[from] ImageStoreError),
}
