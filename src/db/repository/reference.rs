//! Read-only access to the reference registries owned by the surrounding
//! administrative layer.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::{BatchId, FacultyId, OfferingId, RoomId, SubjectId};
use crate::models::{CourseOffering, Faculty, Room, Subject};

/// Repository trait for the external reference data the engine consumes:
/// course offerings, rooms, faculty, and subjects. The engine never mutates
/// these; CRUD lives in the administrative layer.
#[async_trait]
pub trait ReferenceRepository: Send + Sync {
    /// Placeable offerings of a batch, newest first.
    async fn offerings_for_batch(
        &self,
        batch_id: BatchId,
    ) -> RepositoryResult<Vec<CourseOffering>>;

    /// Fetch a single offering.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` if the offering doesn't exist
    async fn get_offering(&self, offering_id: OfferingId) -> RepositoryResult<CourseOffering>;

    /// All rooms, ordered by room number.
    async fn list_rooms(&self) -> RepositoryResult<Vec<Room>>;

    /// Fetch a single room.
    async fn get_room(&self, room_id: RoomId) -> RepositoryResult<Room>;

    /// All faculty members.
    async fn list_faculty(&self) -> RepositoryResult<Vec<Faculty>>;

    /// Fetch a single faculty member.
    async fn get_faculty(&self, faculty_id: FacultyId) -> RepositoryResult<Faculty>;

    /// All subjects.
    async fn list_subjects(&self) -> RepositoryResult<Vec<Subject>>;

    /// Fetch a single subject.
    async fn get_subject(&self, subject_id: SubjectId) -> RepositoryResult<Subject>;
}
