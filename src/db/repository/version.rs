//! Timetable version repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::error::RepositoryResult;
use crate::api::{BatchId, VersionId};
use crate::models::{TimetableVersion, VersionStatus};

/// Repository trait for the per-batch version lifecycle.
///
/// The draft-singleton and published-singleton invariants are enforced by
/// the calling sequences in the service layer, not by this trait; read paths
/// therefore always select the most recently created matching row so a
/// transient duplicate produced by racing writers stays harmless.
#[async_trait]
pub trait VersionRepository: Send + Sync {
    /// Most recently created draft for a batch, if any.
    async fn latest_draft(&self, batch_id: BatchId) -> RepositoryResult<Option<TimetableVersion>>;

    /// Most recently published version for a batch, if any.
    async fn latest_published(
        &self,
        batch_id: BatchId,
    ) -> RepositoryResult<Option<TimetableVersion>>;

    /// Fetch a version by id.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` if the version doesn't exist
    async fn get_version(&self, version_id: VersionId) -> RepositoryResult<TimetableVersion>;

    /// All versions of a batch, newest first.
    async fn list_versions(&self, batch_id: BatchId) -> RepositoryResult<Vec<TimetableVersion>>;

    /// Create a version row.
    async fn create_version(
        &self,
        batch_id: BatchId,
        status: VersionStatus,
        name: &str,
    ) -> RepositoryResult<TimetableVersion>;

    /// Archive every published version of a batch.
    ///
    /// Re-running against an already-archived-or-absent published version is
    /// a no-op, which is what makes the publish sequence retryable.
    ///
    /// # Returns
    /// Number of rows transitioned.
    async fn archive_published(&self, batch_id: BatchId) -> RepositoryResult<usize>;

    /// Transition one version to published and stamp `published_at`.
    async fn mark_published(
        &self,
        version_id: VersionId,
        published_at: DateTime<Utc>,
    ) -> RepositoryResult<()>;
}
