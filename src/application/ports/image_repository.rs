use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{CompletedAnalysis, Image, ImageId, UserId};

use super::RepositoryError;

/// Persistent image records.
///
/// Every `owner` argument scopes the call: `Some(user)` restricts it to that
/// user's images, `None` applies it to all images.
#[async_trait]
pub trait ImageRepository: Send + Sync {
    async fn create(&self, image: &Image) -> Result<(), RepositoryError>;

    async fn get(&self, owner: Option<UserId>, id: ImageId)
    -> Result<Option<Image>, RepositoryError>;

    /// Newest first.
    async fn list(&self, owner: Option<UserId>) -> Result<Vec<Image>, RepositoryError>;

    /// Completed images, newest first.
    async fn list_completed(&self, owner: Option<UserId>) -> Result<Vec<Image>, RepositoryError>;

    async fn list_created_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Image>, RepositoryError>;

    async fn find_many(
        &self,
        owner: Option<UserId>,
        ids: &[ImageId],
    ) -> Result<Vec<Image>, RepositoryError>;

    /// Renames a `completed` image. Returns `None` when no matching completed
    /// image exists.
    async fn rename(
        &self,
        owner: Option<UserId>,
        id: ImageId,
        new_name: &str,
    ) -> Result<Option<Image>, RepositoryError>;

    /// Moves `pending` or `failed` to `processing`. Returns `false` when the
    /// image is in any other state, so a concurrent trigger loses the race.
    async fn begin_analysis(&self, id: ImageId) -> Result<bool, RepositoryError>;

    /// Moves `processing` to `completed` and stores the result.
    async fn complete_analysis(
        &self,
        id: ImageId,
        analysis: &CompletedAnalysis,
    ) -> Result<bool, RepositoryError>;

    /// Moves `processing` to `failed` with a diagnostic message.
    async fn fail_analysis(&self, id: ImageId, error_message: &str)
    -> Result<bool, RepositoryError>;

    /// Reserves the next filename ordinal. Values are unique and increasing.
    async fn next_ordinal(&self) -> Result<u64, RepositoryError>;

    async fn delete_many(
        &self,
        owner: Option<UserId>,
        ids: &[ImageId],
    ) -> Result<u64, RepositoryError>;
}
