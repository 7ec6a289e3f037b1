//! Timetable event repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::{EventId, RoomId, VersionId};
use crate::models::{NewTimetableEvent, TimeOfDay, TimetableEvent};

/// Repository trait for committed placements.
///
/// This is the read path every conflict check relies on, so implementations
/// must reflect all committed writes before any subsequent call returns
/// (no stale reads across sequential calls).
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// All events of a version.
    async fn events_for_version(
        &self,
        version_id: VersionId,
    ) -> RepositoryResult<Vec<TimetableEvent>>;

    /// Fetch a single event.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` if the event doesn't exist
    async fn get_event(&self, event_id: EventId) -> RepositoryResult<TimetableEvent>;

    /// Insert one event row.
    async fn insert_event(&self, event: &NewTimetableEvent) -> RepositoryResult<TimetableEvent>;

    /// Delete one event row.
    ///
    /// # Returns
    /// Number of rows removed (0 or 1).
    async fn delete_event(&self, event_id: EventId) -> RepositoryResult<usize>;

    /// Delete several events at once.
    async fn delete_events(&self, event_ids: &[EventId]) -> RepositoryResult<usize>;

    /// Delete whatever occupies a cell, keyed by the normalized start time.
    async fn delete_events_at_cell(
        &self,
        version_id: VersionId,
        day_of_week: i16,
        start_time: TimeOfDay,
    ) -> RepositoryResult<usize>;

    /// Write a batch of events, replacing any existing row at the same
    /// `(version_id, day_of_week, start_time)` cell in one statement each.
    ///
    /// # Returns
    /// Number of rows written.
    async fn upsert_events(&self, events: &[NewTimetableEvent]) -> RepositoryResult<usize>;

    /// Reassign the room of an event; all other fields keep their identity.
    async fn update_event_room(
        &self,
        event_id: EventId,
        room_id: Option<RoomId>,
    ) -> RepositoryResult<()>;
}
