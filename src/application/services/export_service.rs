use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::sync::Arc;

use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

use crate::application::ports::{ImageRepository, ImageStore, RepositoryError};
use crate::domain::{Identity, Image};

use super::image_view::{ImageView, objects_text};

const CSV_HEADER: &str = "Original Name,New Name,Objects,Detected Text,Location,Metadata";
const ZIP_COMPRESSION_LEVEL: i64 = 6;

pub struct ExportService {
    repository: Arc<dyn ImageRepository>,
    store: Arc<dyn ImageStore>,
}

impl ExportService {
    pub fn new(repository: Arc<dyn ImageRepository>, store: Arc<dyn ImageStore>) -> Self {
        Self { repository, store }
    }

    pub async fn csv(&self, identity: &Identity) -> Result<String, ExportError> {
        let images = self.repository.list_completed(identity.owner()).await?;
        generate_csv(&images)
    }

    pub async fn json(&self, identity: &Identity) -> Result<String, ExportError> {
        let images = self.repository.list_completed(identity.owner()).await?;
        generate_json(&images)
    }

    /// Archive of every renamed image, each stored under its new name.
    #[tracing::instrument(skip(self, identity))]
    pub async fn zip(&self, identity: &Identity) -> Result<Vec<u8>, ExportError> {
        let images: Vec<Image> = self
            .repository
            .list_completed(identity.owner())
            .await?
            .into_iter()
            .filter(|i| i.new_name.is_some())
            .collect();

        if images.is_empty() {
            return Err(ExportError::NothingToExport);
        }

        let mut entries = Vec::with_capacity(images.len());
        for image in images {
            let Some(name) = image.new_name else {
                continue;
            };
            match self.store.fetch(&image.cloud_storage_path).await {
                Ok(bytes) => entries.push((name, bytes)),
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        image_id = %image.id,
                        "Skipping image missing from storage"
                    );
                }
            }
        }

        tracing::info!(entries = entries.len(), "Building zip archive");
        tokio::task::spawn_blocking(move || build_zip(entries))
            .await
            .map_err(|e| ExportError::Archive(e.to_string()))?
    }
}

/// Every field quoted, quotes doubled, detected text on a single line.
pub fn generate_csv(images: &[Image]) -> Result<String, ExportError> {
    let mut out = Vec::new();
    out.extend_from_slice(CSV_HEADER.as_bytes());
    out.push(b'\n');

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(out);

    for image in images {
        let objects = image
            .objects
            .as_deref()
            .map(objects_text)
            .unwrap_or_default();
        let detected_text = image
            .detected_text
            .as_deref()
            .unwrap_or_default()
            .replace('\n', " ");

        writer
            .write_record([
                image.original_name.as_str(),
                image.new_name.as_deref().unwrap_or_default(),
                objects.as_str(),
                detected_text.as_str(),
                image.location.as_deref().unwrap_or_default(),
                image.metadata.as_deref().unwrap_or_default(),
            ])
            .map_err(|e| ExportError::Csv(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Csv(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ExportError::Csv(e.to_string()))
}

pub fn generate_json(images: &[Image]) -> Result<String, ExportError> {
    let views: Vec<ImageView> = images.iter().map(ImageView::from).collect();
    serde_json::to_string_pretty(&views).map_err(|e| ExportError::Json(e.to_string()))
}

fn build_zip(entries: Vec<(String, Vec<u8>)>) -> Result<Vec<u8>, ExportError> {
    let mut archive = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(ZIP_COMPRESSION_LEVEL));

    let mut seen = HashSet::new();
    for (name, bytes) in entries {
        if !seen.insert(name.clone()) {
            tracing::warn!(name = %name, "Skipping duplicate archive entry");
            continue;
        }
        archive
            .start_file(name, options)
            .map_err(|e| ExportError::Archive(e.to_string()))?;
        archive
            .write_all(&bytes)
            .map_err(|e| ExportError::Archive(e.to_string()))?;
    }

    let cursor = archive
        .finish()
        .map_err(|e| ExportError::Archive(e.to_string()))?;
    Ok(cursor.into_inner())
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("no analysed images available for download")]
    NothingToExport,
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
    #[error("csv: {0}")]
    Csv(String),
    #[error("json: {0}")]
    Json(String),
    #[error("archive: {0}")]
    Archive(String),
}
