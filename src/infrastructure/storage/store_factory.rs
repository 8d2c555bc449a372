use std::path::PathBuf;
use std::sync::Arc;

use crate::application::ports::{ImageStore, ImageStoreError};
use crate::presentation::config::{StorageProviderSetting, StorageSettings};

use super::object_image_store::ObjectImageStore;

pub struct ImageStoreFactory;

impl ImageStoreFactory {
    pub fn create(settings: &StorageSettings) -> Result<Arc<dyn ImageStore>, ImageStoreError> {
        match settings.provider {
            StorageProviderSetting::Local => {
                let store = ObjectImageStore::local(PathBuf::from(&settings.local_path))?;
                Ok(Arc::new(store))
            }
            StorageProviderSetting::S3 => {
                let bucket = settings.bucket.as_deref().ok_or_else(|| {
                    ImageStoreError::Configuration("storage.bucket required for s3".into())
                })?;
                let store = ObjectImageStore::s3(
                    bucket,
                    settings.region.as_deref(),
                    settings.endpoint.as_deref(),
                )?;
                Ok(Arc::new(store))
            }
        }
    }
}
