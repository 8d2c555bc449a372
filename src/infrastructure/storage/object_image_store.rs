use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as StorePath;
use object_store::{ObjectStore, WriteMultipart};

use crate::application::ports::{ImageStore, ImageStoreError};
use crate::domain::StoragePath;

const MAX_CONCURRENT_PARTS: usize = 4;

/// [`ImageStore`] backed by any `object_store` implementation.
pub struct ObjectImageStore {
    inner: Arc<dyn ObjectStore>,
}

impl ObjectImageStore {
    pub fn local(base_path: PathBuf) -> Result<Self, ImageStoreError> {
        std::fs::create_dir_all(&base_path).map_err(ImageStoreError::Io)?;
        let fs = LocalFileSystem::new_with_prefix(base_path)
            .map_err(|e| ImageStoreError::Configuration(e.to_string()))?;
        Ok(Self {
            inner: Arc::new(fs),
        })
    }

    /// Credentials come from the usual `AWS_*` environment variables.
    pub fn s3(
        bucket: &str,
        region: Option<&str>,
        endpoint: Option<&str>,
    ) -> Result<Self, ImageStoreError> {
        let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket);
        if let Some(region) = region {
            builder = builder.with_region(region);
        }
        if let Some(endpoint) = endpoint {
            builder = builder
                .with_endpoint(endpoint)
                .with_allow_http(endpoint.starts_with("http://"));
        }
        let store = builder
            .build()
            .map_err(|e| ImageStoreError::Configuration(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(store),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(InMemory::new()),
        }
    }
}

#[async_trait::async_trait]
impl ImageStore for ObjectImageStore {
    #[tracing::instrument(skip(self, stream), fields(path = %path))]
    async fn store(
        &self,
        path: &StoragePath,
        mut stream: BoxStream<'_, Result<Bytes, io::Error>>,
    ) -> Result<u64, ImageStoreError> {
        let store_path = StorePath::from(path.as_str());
        let upload = self
            .inner
            .put_multipart(&store_path)
            .await
            .map_err(|e| ImageStoreError::UploadFailed(e.to_string()))?;
        let mut writer = WriteMultipart::new(upload);

        let mut total_bytes: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let bytes = match chunk {
                Ok(b) => b,
                Err(e) => {
                    let _ = writer.abort().await;
                    return Err(ImageStoreError::Io(e));
                }
            };
            if let Err(e) = writer.wait_for_capacity(MAX_CONCURRENT_PARTS).await {
                let _ = writer.abort().await;
                return Err(ImageStoreError::UploadFailed(e.to_string()));
            }
            total_bytes += bytes.len() as u64;
            writer.write(&bytes);
        }

        writer
            .finish()
            .await
            .map_err(|e| ImageStoreError::UploadFailed(e.to_string()))?;

        Ok(total_bytes)
    }

    async fn fetch(&self, path: &StoragePath) -> Result<Vec<u8>, ImageStoreError> {
        let store_path = StorePath::from(path.as_str());
        let result = self.inner.get(&store_path).await.map_err(|e| match e {
            object_store::Error::NotFound { .. } => ImageStoreError::NotFound(path.to_string()),
            other => ImageStoreError::DownloadFailed(other.to_string()),
        })?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| ImageStoreError::DownloadFailed(e.to_string()))?;

        Ok(bytes.to_vec())
    }

    async fn delete(&self, path: &StoragePath) -> Result<(), ImageStoreError> {
        let store_path = StorePath::from(path.as_str());
        self.inner
            .delete(&store_path)
            .await
            .map_err(|e| ImageStoreError::DeleteFailed(e.to_string()))
    }
}
