//! Timetable version manager: the per-batch draft → published → archived
//! lifecycle.
//!
//! The draft and published singletons are enforced by calling sequences,
//! not storage constraints, so every read path selects the most recently
//! created matching row; a duplicate draft produced by racing editors is a
//! tolerated-but-undesirable state that resolves itself the same way.

use chrono::Utc;
use log::{info, warn};

use super::error::{ScheduleError, ScheduleResult};
use crate::api::{BatchId, PublishOutcome, VersionId, Workspace};
use crate::db::repository::FullRepository;
use crate::models::{TimetableVersion, VersionStatus};

const DRAFT_NAME: &str = "Draft";

/// Return the batch's current draft, creating one lazily when absent.
///
/// Safe to call repeatedly: the check-then-create sequence is best-effort
/// idempotent under sequential callers, and concurrent callers that race
/// past the check are resolved by always preferring the most recent draft.
pub async fn ensure_draft<R: FullRepository + ?Sized>(
    repo: &R,
    batch_id: BatchId,
) -> ScheduleResult<TimetableVersion> {
    if let Some(draft) = repo.latest_draft(batch_id).await? {
        return Ok(draft);
    }

    info!("no draft for batch {}, creating one", batch_id);
    let created = repo
        .create_version(batch_id, VersionStatus::Draft, DRAFT_NAME)
        .await?;
    Ok(created)
}

/// The most recently published version of a batch, if any.
pub async fn get_published<R: FullRepository + ?Sized>(
    repo: &R,
    batch_id: BatchId,
) -> ScheduleResult<Option<TimetableVersion>> {
    Ok(repo.latest_published(batch_id).await?)
}

/// The draft/published pair driving the two-mode view toggle.
pub async fn workspace<R: FullRepository + ?Sized>(repo: &R, batch_id: BatchId) -> ScheduleResult<Workspace> {
    let draft = ensure_draft(repo, batch_id).await?;
    let published = repo.latest_published(batch_id).await?;
    Ok(Workspace {
        batch_id,
        draft,
        published,
    })
}

/// Publish a draft: archive the current published version, promote the
/// draft, and spawn a fresh empty draft for continued editing.
///
/// The three steps are distinct writes with no surrounding transaction. If
/// a later step fails after the archive succeeded, the batch is left with
/// no published version; re-running the whole sequence is the recovery
/// path, since re-archiving an absent published version is a no-op.
pub async fn publish<R: FullRepository + ?Sized>(
    repo: &R,
    batch_id: BatchId,
    draft_version_id: VersionId,
) -> ScheduleResult<PublishOutcome> {
    let draft = match repo.get_version(draft_version_id).await {
        Ok(v) => v,
        Err(e) if e.is_not_found() => {
            return Err(ScheduleError::VersionNotReady(format!(
                "version {} does not exist",
                draft_version_id
            )))
        }
        Err(e) => return Err(e.into()),
    };
    if draft.batch_id != batch_id {
        return Err(ScheduleError::VersionNotReady(format!(
            "version {} belongs to batch {}, not {}",
            draft_version_id, draft.batch_id, batch_id
        )));
    }
    if draft.status != VersionStatus::Draft {
        return Err(ScheduleError::VersionNotReady(format!(
            "version {} has status {}, expected draft",
            draft_version_id, draft.status
        )));
    }

    // Step 1: archive whatever is currently published. A no-op on retry.
    let archived = repo.archive_published(batch_id).await?;
    if archived > 0 {
        info!(
            "archived {} published version(s) of batch {}",
            archived, batch_id
        );
    }

    // Step 2: promote the draft.
    let published_at = Utc::now();
    if let Err(e) = repo.mark_published(draft_version_id, published_at).await {
        warn!(
            "publish of version {} failed after archiving; batch {} has no published version until retried",
            draft_version_id, batch_id
        );
        return Err(e.into());
    }

    // Step 3: spawn the next draft.
    let new_draft = repo
        .create_version(batch_id, VersionStatus::Draft, DRAFT_NAME)
        .await?;

    info!(
        "published version {} for batch {}, new draft is {}",
        draft_version_id, batch_id, new_draft.id
    );

    let published = repo.get_version(draft_version_id).await?;
    Ok(PublishOutcome {
        published,
        new_draft,
    })
}
