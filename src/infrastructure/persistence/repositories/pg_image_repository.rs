use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::application::ports::{ImageRepository, RepositoryError};
use crate::domain::{AnalysisStatus, CompletedAnalysis, Image, ImageId, StoragePath, UserId};

const IMAGE_COLUMNS: &str = "id, owner_id, original_name, new_name, cloud_storage_path, \
     file_size, mime_type, objects, detected_text, location, metadata, analysis_status, \
     analysis_error, created_at, updated_at";

pub struct PgImageRepository {
    pool: PgPool,
}

impl PgImageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn select_where(
        &self,
        condition: &str,
        owner: Option<UserId>,
    ) -> Result<Vec<Image>, RepositoryError> {
        let sql = format!(
            "SELECT {IMAGE_COLUMNS} FROM images \
             WHERE ($1::uuid IS NULL OR owner_id = $1) AND {condition} \
             ORDER BY created_at DESC"
        );
        let rows: Vec<ImageRow> = sqlx::query_as(&sql)
            .bind(owner.map(|o| o.as_uuid()))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        rows.into_iter().map(Image::try_from).collect()
    }
}

#[derive(sqlx::FromRow)]
struct ImageRow {
    id: Uuid,
    owner_id: Option<Uuid>,
    original_name: String,
    new_name: Option<String>,
    cloud_storage_path: String,
    file_size: i64,
    mime_type: String,
    objects: Option<String>,
    detected_text: Option<String>,
    location: Option<String>,
    metadata: Option<String>,
    analysis_status: String,
    analysis_error: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ImageRow> for Image {
    type Error = RepositoryError;

    fn try_from(r: ImageRow) -> Result<Self, Self::Error> {
        let analysis_status = r
            .analysis_status
            .parse::<AnalysisStatus>()
            .map_err(RepositoryError::QueryFailed)?;

        let objects = match r.objects {
            Some(raw) => Some(
                serde_json::from_str::<Vec<String>>(&raw)
                    .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?,
            ),
            None => None,
        };

        Ok(Image {
            id: ImageId::from_uuid(r.id),
            owner_id: r.owner_id.map(UserId::from_uuid),
            original_name: r.original_name,
            new_name: r.new_name,
            cloud_storage_path: StoragePath::from_raw(r.cloud_storage_path),
            file_size: u64::try_from(r.file_size).unwrap_or_default(),
            mime_type: r.mime_type,
            objects,
            detected_text: r.detected_text,
            location: r.location,
            metadata: r.metadata,
            analysis_status,
            analysis_error: r.analysis_error,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

fn serialize_objects(objects: &[String]) -> Result<String, RepositoryError> {
    serde_json::to_string(objects).map_err(|e| RepositoryError::QueryFailed(e.to_string()))
}

#[async_trait]
impl ImageRepository for PgImageRepository {
    #[instrument(skip(self, image), fields(image_id = %image.id))]
    async fn create(&self, image: &Image) -> Result<(), RepositoryError> {
        let objects = image
            .objects
            .as_deref()
            .map(serialize_objects)
            .transpose()?;

        sqlx::query(
            r#"
            INSERT INTO images (id, owner_id, original_name, new_name, cloud_storage_path,
                file_size, mime_type, objects, detected_text, location, metadata,
                analysis_status, analysis_error, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(image.id.as_uuid())
        .bind(image.owner_id.map(|o| o.as_uuid()))
        .bind(&image.original_name)
        .bind(&image.new_name)
        .bind(image.cloud_storage_path.as_str())
        .bind(i64::try_from(image.file_size).unwrap_or(i64::MAX))
        .bind(&image.mime_type)
        .bind(objects)
        .bind(&image.detected_text)
        .bind(&image.location)
        .bind(&image.metadata)
        .bind(image.analysis_status.as_str())
        .bind(&image.analysis_error)
        .bind(image.created_at)
        .bind(image.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self), fields(image_id = %id))]
    async fn get(
        &self,
        owner: Option<UserId>,
        id: ImageId,
    ) -> Result<Option<Image>, RepositoryError> {
        let sql = format!(
            "SELECT {IMAGE_COLUMNS} FROM images \
             WHERE id = $1 AND ($2::uuid IS NULL OR owner_id = $2)"
        );
        let row: Option<ImageRow> = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .bind(owner.map(|o| o.as_uuid()))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        row.map(Image::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn list(&self, owner: Option<UserId>) -> Result<Vec<Image>, RepositoryError> {
        self.select_where("TRUE", owner).await
    }

    #[instrument(skip(self))]
    async fn list_completed(&self, owner: Option<UserId>) -> Result<Vec<Image>, RepositoryError> {
        self.select_where("analysis_status = 'completed'", owner).await
    }

    #[instrument(skip(self))]
    async fn list_created_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Image>, RepositoryError> {
        let sql = format!(
            "SELECT {IMAGE_COLUMNS} FROM images WHERE created_at < $1 ORDER BY created_at"
        );
        let rows: Vec<ImageRow> = sqlx::query_as(&sql)
            .bind(cutoff)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        rows.into_iter().map(Image::try_from).collect()
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn find_many(
        &self,
        owner: Option<UserId>,
        ids: &[ImageId],
    ) -> Result<Vec<Image>, RepositoryError> {
        let uuids: Vec<Uuid> = ids.iter().map(ImageId::as_uuid).collect();
        let sql = format!(
            "SELECT {IMAGE_COLUMNS} FROM images \
             WHERE id = ANY($1) AND ($2::uuid IS NULL OR owner_id = $2) \
             ORDER BY created_at DESC"
        );
        let rows: Vec<ImageRow> = sqlx::query_as(&sql)
            .bind(uuids)
            .bind(owner.map(|o| o.as_uuid()))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        rows.into_iter().map(Image::try_from).collect()
    }

    #[instrument(skip(self, new_name), fields(image_id = %id))]
    async fn rename(
        &self,
        owner: Option<UserId>,
        id: ImageId,
        new_name: &str,
    ) -> Result<Option<Image>, RepositoryError> {
        let sql = format!(
            "UPDATE images SET new_name = $1, updated_at = $2 \
             WHERE id = $3 AND ($4::uuid IS NULL OR owner_id = $4) AND analysis_status = $5 \
             RETURNING {IMAGE_COLUMNS}"
        );
        let row: Option<ImageRow> = sqlx::query_as(&sql)
            .bind(new_name)
            .bind(Utc::now())
            .bind(id.as_uuid())
            .bind(owner.map(|o| o.as_uuid()))
            .bind(AnalysisStatus::Completed.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        row.map(Image::try_from).transpose()
    }

    #[instrument(skip(self), fields(image_id = %id))]
    async fn begin_analysis(&self, id: ImageId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE images
            SET analysis_status = $1, analysis_error = NULL, updated_at = $2
            WHERE id = $3 AND analysis_status IN ($4, $5)
            "#,
        )
        .bind(AnalysisStatus::Processing.as_str())
        .bind(Utc::now())
        .bind(id.as_uuid())
        .bind(AnalysisStatus::Pending.as_str())
        .bind(AnalysisStatus::Failed.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self, analysis), fields(image_id = %id, new_name = %analysis.new_name))]
    async fn complete_analysis(
        &self,
        id: ImageId,
        analysis: &CompletedAnalysis,
    ) -> Result<bool, RepositoryError> {
        let objects = serialize_objects(&analysis.objects)?;

        let result = sqlx::query(
            r#"
            UPDATE images
            SET new_name = $1, objects = $2, detected_text = $3, location = $4,
                analysis_status = $5, analysis_error = NULL, updated_at = $6
            WHERE id = $7 AND analysis_status = $8
            "#,
        )
        .bind(&analysis.new_name)
        .bind(objects)
        .bind(&analysis.detected_text)
        .bind(&analysis.location)
        .bind(AnalysisStatus::Completed.as_str())
        .bind(Utc::now())
        .bind(id.as_uuid())
        .bind(AnalysisStatus::Processing.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self, error_message), fields(image_id = %id))]
    async fn fail_analysis(
        &self,
        id: ImageId,
        error_message: &str,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE images
            SET analysis_status = $1, analysis_error = $2, updated_at = $3
            WHERE id = $4 AND analysis_status = $5
            "#,
        )
        .bind(AnalysisStatus::Failed.as_str())
        .bind(error_message)
        .bind(Utc::now())
        .bind(id.as_uuid())
        .bind(AnalysisStatus::Processing.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self))]
    async fn next_ordinal(&self) -> Result<u64, RepositoryError> {
        let value: i64 = sqlx::query_scalar("SELECT nextval('image_ordinal_seq')")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        u64::try_from(value).map_err(|e| RepositoryError::QueryFailed(e.to_string()))
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn delete_many(
        &self,
        owner: Option<UserId>,
        ids: &[ImageId],
    ) -> Result<u64, RepositoryError> {
        let uuids: Vec<Uuid> = ids.iter().map(ImageId::as_uuid).collect();
        let result = sqlx::query(
            "DELETE FROM images WHERE id = ANY($1) AND ($2::uuid IS NULL OR owner_id = $2)",
        )
        .bind(uuids)
        .bind(owner.map(|o| o.as_uuid()))
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
