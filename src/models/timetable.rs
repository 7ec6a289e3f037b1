//! Timetable versions, committed events, and the reference entities the
//! engine reads from the surrounding administrative layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::time::TimeOfDay;
use crate::api::{BatchId, EventId, FacultyId, OfferingId, RoomId, SubjectId, VersionId};

/// Weekday labels for the six-day grid, Monday first.
pub const DAYS: [&str; 6] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Lifecycle state of a timetable version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionStatus {
    Draft,
    Published,
    Archived,
}

impl VersionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionStatus::Draft => "draft",
            VersionStatus::Published => "published",
            VersionStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VersionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(VersionStatus::Draft),
            "published" => Ok(VersionStatus::Published),
            "archived" => Ok(VersionStatus::Archived),
            other => Err(format!("unknown version status: {}", other)),
        }
    }
}

/// One full snapshot of placements for a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimetableVersion {
    pub id: VersionId,
    pub batch_id: BatchId,
    pub status: VersionStatus,
    pub name: String,
    pub created_at: DateTime<Utc>,
    /// Set only when the version transitions to published.
    pub published_at: Option<DateTime<Utc>>,
}

/// One committed placement of an offering into a day/slot cell.
///
/// Within one version the pair `(day_of_week, start_time)` is unique; the
/// end time always comes from the template's slot definitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimetableEvent {
    pub id: EventId,
    pub version_id: VersionId,
    pub offering_id: OfferingId,
    /// 0 = Monday .. 5 = Saturday.
    pub day_of_week: i16,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub room_id: Option<RoomId>,
}

impl TimetableEvent {
    /// Canonical cell key for occupancy lookups.
    pub fn cell(&self) -> CellRef {
        CellRef {
            day_of_week: self.day_of_week,
            start_time: self.start_time,
        }
    }

    /// Whether this event overlaps the half-open time range on the same day.
    pub fn overlaps(&self, day_of_week: i16, start: TimeOfDay, end: TimeOfDay) -> bool {
        self.day_of_week == day_of_week && self.start_time < end && self.end_time > start
    }
}

/// Event row about to be written; the id is assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTimetableEvent {
    pub version_id: VersionId,
    pub offering_id: OfferingId,
    pub day_of_week: i16,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub room_id: Option<RoomId>,
}

/// Addressable grid cell within one version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRef {
    pub day_of_week: i16,
    pub start_time: TimeOfDay,
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.day_of_week, self.start_time)
    }
}

/// A subject assigned to a batch, eligible for placement. Owned by the
/// administrative layer; read-only here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseOffering {
    pub id: OfferingId,
    pub batch_id: BatchId,
    pub subject_id: SubjectId,
    pub faculty_id: Option<FacultyId>,
    pub default_room_id: Option<RoomId>,
}

/// Component type of a subject; labs occupy two consecutive periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubjectType {
    Lecture,
    Lab,
    Tutorial,
}

impl SubjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectType::Lecture => "LECTURE",
            SubjectType::Lab => "LAB",
            SubjectType::Tutorial => "TUTORIAL",
        }
    }
}

impl FromStr for SubjectType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LECTURE" => Ok(SubjectType::Lecture),
            "LAB" => Ok(SubjectType::Lab),
            "TUTORIAL" => Ok(SubjectType::Tutorial),
            other => Err(format!("unknown subject type: {}", other)),
        }
    }
}

/// Subject registry entry (external reference data).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub code: String,
    pub name: String,
    pub subject_type: SubjectType,
}

/// Faculty registry entry (external reference data).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Faculty {
    pub id: FacultyId,
    pub name: String,
}

/// Room registry entry (external reference data).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub room_number: String,
    pub department_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{EventId, OfferingId, VersionId};

    fn event(day: i16, start: &str, end: &str) -> TimetableEvent {
        TimetableEvent {
            id: EventId(1),
            version_id: VersionId(1),
            offering_id: OfferingId(1),
            day_of_week: day,
            start_time: TimeOfDay::parse(start).unwrap(),
            end_time: TimeOfDay::parse(end).unwrap(),
            room_id: None,
        }
    }

    #[test]
    fn test_version_status_round_trip() {
        for status in [
            VersionStatus::Draft,
            VersionStatus::Published,
            VersionStatus::Archived,
        ] {
            assert_eq!(status.as_str().parse::<VersionStatus>().unwrap(), status);
        }
        assert!("frozen".parse::<VersionStatus>().is_err());
    }

    #[test]
    fn test_overlap_is_half_open() {
        let ev = event(0, "09:00", "10:00");
        let t = |s: &str| TimeOfDay::parse(s).unwrap();

        assert!(ev.overlaps(0, t("09:00"), t("10:00")));
        assert!(ev.overlaps(0, t("09:30"), t("10:30")));
        // Adjacent ranges do not overlap.
        assert!(!ev.overlaps(0, t("10:00"), t("11:00")));
        assert!(!ev.overlaps(0, t("08:00"), t("09:00")));
        // Different day never overlaps.
        assert!(!ev.overlaps(1, t("09:00"), t("10:00")));
    }

    #[test]
    fn test_cell_key_uses_canonical_time() {
        let a = event(2, "09:00", "10:00").cell();
        let b = event(2, "09:00:00", "10:00:00").cell();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "2|09:00:00");
    }
}
