//! Domain error taxonomy for the scheduling engine.
//!
//! Conflicts and validation failures are distinct, named kinds carrying the
//! identities involved, so a caller can render an actionable message. They
//! are never retried automatically; the user resolves them by choosing a
//! different room or slot. Transient store failures pass through as
//! [`ScheduleError::Store`] and stay distinguishable (and retryable) via
//! [`RepositoryError::is_retryable`].

use crate::api::{FacultyId, OfferingId, RoomId};
use crate::db::repository::RepositoryError;
use crate::models::{TimeOfDay, TimeParseError};

/// Result type for engine operations.
pub type ScheduleResult<T> = Result<T, ScheduleError>;

/// Errors surfaced by the template store, version manager, and placement
/// engine.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    /// Start time does not match any slot in the active period template.
    #[error("no slot in the active template starts at {start_time}")]
    InvalidSlot { start_time: TimeOfDay },

    /// Target slot is marked as a break.
    #[error("slot '{slot_name}' is a break and cannot hold a class")]
    BreakSlotNotSchedulable { slot_name: String },

    /// Target room already occupied at that day/slot within the version.
    #[error(
        "room {room_id} is already occupied on {day_of_week} at {start_time} by offering {occupant_offering_id}"
    )]
    RoomConflict {
        day_of_week: i16,
        start_time: TimeOfDay,
        room_id: RoomId,
        occupant_offering_id: OfferingId,
    },

    /// Target faculty already occupied at that day/slot within the version.
    #[error(
        "faculty {faculty_id} is already scheduled on {day_of_week} at {start_time} via offering {occupant_offering_id}"
    )]
    FacultyConflict {
        day_of_week: i16,
        start_time: TimeOfDay,
        faculty_id: FacultyId,
        occupant_offering_id: OfferingId,
    },

    /// The target range is covered by a spanning event anchored in another
    /// cell, so replace-at-cell semantics cannot free it.
    #[error(
        "cell ({day_of_week}, {start_time}) is covered by a multi-period event of offering {occupant_offering_id}"
    )]
    SlotOccupied {
        day_of_week: i16,
        start_time: TimeOfDay,
        occupant_offering_id: OfferingId,
    },

    /// Day index outside the Monday..Saturday grid.
    #[error("day_of_week must be between 0 and 5, got {day}")]
    InvalidDay { day: i16 },

    /// No period template is active; no schedulable grid exists.
    #[error("no active period template")]
    NoActiveTemplate,

    /// The active period template has no slots.
    #[error("the active period template has no slots")]
    EmptyTemplate,

    /// Draft/published version lookup returned none (or the wrong version)
    /// when one was required.
    #[error("timetable version not ready: {0}")]
    VersionNotReady(String),

    /// Deleting the active template is rejected.
    #[error("template '{name}' is active and cannot be deleted")]
    TemplateActive { name: String },

    /// A time string could not be canonicalized.
    #[error(transparent)]
    InvalidTime(#[from] TimeParseError),

    /// Transient or structural storage failure; retryable at the caller's
    /// discretion, unlike the domain conflicts above.
    #[error(transparent)]
    Store(#[from] RepositoryError),
}

impl ScheduleError {
    /// Whether the underlying cause is a transient store failure worth
    /// retrying. Domain conflicts always return false.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ScheduleError::Store(e) if e.is_retryable())
    }

    /// Short machine-readable code for API payloads.
    pub fn code(&self) -> &'static str {
        match self {
            ScheduleError::InvalidSlot { .. } => "INVALID_SLOT",
            ScheduleError::BreakSlotNotSchedulable { .. } => "BREAK_SLOT",
            ScheduleError::RoomConflict { .. } => "ROOM_CONFLICT",
            ScheduleError::FacultyConflict { .. } => "FACULTY_CONFLICT",
            ScheduleError::SlotOccupied { .. } => "SLOT_OCCUPIED",
            ScheduleError::InvalidDay { .. } => "INVALID_DAY",
            ScheduleError::NoActiveTemplate => "NO_ACTIVE_TEMPLATE",
            ScheduleError::EmptyTemplate => "EMPTY_TEMPLATE",
            ScheduleError::VersionNotReady(_) => "VERSION_NOT_READY",
            ScheduleError::TemplateActive { .. } => "TEMPLATE_ACTIVE",
            ScheduleError::InvalidTime(_) => "INVALID_TIME",
            ScheduleError::Store(_) => "STORE_ERROR",
        }
    }
}
