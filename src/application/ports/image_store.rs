use std::io;

use bytes::Bytes;
use futures::stream::BoxStream;

use crate::domain::StoragePath;

/// Object storage holding image bytes under opaque keys.
#[async_trait::async_trait]
pub trait ImageStore: Send + Sync {
    /// Streams the bytes to `path` and returns the number of bytes written.
    async fn store(
        &self,
        path: &StoragePath,
        stream: BoxStream<'_, Result<Bytes, io::Error>>,
    ) -> Result<u64, ImageStoreError>;

    async fn fetch(&self, path: &StoragePath) -> Result<Vec<u8>, ImageStoreError>;

    async fn delete(&self, path: &StoragePath) -> Result<(), ImageStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ImageStoreError {
    #[error("upload failed: {0}")]
    UploadFailed(String),
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("download failed: {0}")]
    DownloadFailed(String),
    #[error("delete failed: {0}")]
    DeleteFailed(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
