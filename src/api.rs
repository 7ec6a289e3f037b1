//! Public API surface for the timetable engine.
//!
//! This file consolidates the identifier newtypes and the read-model DTO
//! types consumed by the HTTP layer and the rendering frontend. All types
//! derive Serialize/Deserialize for JSON serialization.

use serde::{Deserialize, Serialize};

use crate::models::{SubjectType, TimeOfDay, TimetableVersion};

macro_rules! id_newtype {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub i64);

        impl $name {
            pub fn new(value: i64) -> Self {
                $name(value)
            }

            pub fn value(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

id_newtype!(
    /// Period template identifier (database primary key).
    TemplateId
);
id_newtype!(
    /// Timetable version identifier.
    VersionId
);
id_newtype!(
    /// Timetable event identifier.
    EventId
);
id_newtype!(
    /// Course offering identifier.
    OfferingId
);
id_newtype!(
    /// Scheduling unit identifier, opaque to this engine.
    BatchId
);
id_newtype!(
    /// Room registry identifier.
    RoomId
);
id_newtype!(
    /// Faculty registry identifier.
    FacultyId
);
id_newtype!(
    /// Subject registry identifier.
    SubjectId
);

/// The draft/published pair that drives the two-mode view toggle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    pub batch_id: BatchId,
    pub draft: TimetableVersion,
    pub published: Option<TimetableVersion>,
}

/// Result of the publish transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishOutcome {
    pub published: TimetableVersion,
    pub new_draft: TimetableVersion,
}

/// One event resolved against the offering, subject, faculty, and room
/// registries for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventView {
    pub id: EventId,
    pub version_id: VersionId,
    pub offering_id: OfferingId,
    pub day_of_week: i16,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub room_id: Option<RoomId>,
    pub room_number: Option<String>,
    pub subject_code: String,
    pub subject_name: String,
    pub subject_type: SubjectType,
    pub faculty_id: Option<FacultyId>,
    pub faculty_name: Option<String>,
}

/// One occupied primary cell of the rendered grid. Spanning events appear
/// once, anchored at their first covered slot, with `row_span` > 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridCell {
    pub day_of_week: i16,
    pub start_time: TimeOfDay,
    pub row_span: usize,
    pub event: EventView,
}

/// How often an offering appears in a version, for the sidebar badges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferingLoad {
    pub offering_id: OfferingId,
    pub scheduled_count: usize,
}

/// The full read model for one version's grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridView {
    pub version_id: VersionId,
    pub cells: Vec<GridCell>,
    pub offering_load: Vec<OfferingLoad>,
}

impl GridView {
    /// Offering ids with at least one placement in this version.
    pub fn assigned_offerings(&self) -> impl Iterator<Item = OfferingId> + '_ {
        self.offering_load
            .iter()
            .filter(|l| l.scheduled_count > 0)
            .map(|l| l.offering_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_newtype_value() {
        let id = VersionId::new(42);
        assert_eq!(id.value(), 42);
        assert_eq!(i64::from(id), 42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_id_serde_is_transparent_number() {
        let id = OfferingId(7);
        assert_eq!(serde_json::to_string(&id).unwrap(), "7");
        let back: OfferingId = serde_json::from_str("7").unwrap();
        assert_eq!(back, id);
    }
}
