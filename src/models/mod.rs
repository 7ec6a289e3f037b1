//! Domain models for the timetable engine.

pub mod template;
pub mod time;
pub mod timetable;

pub use template::{new_slot_id, normalize_slots, slot_at_start, PeriodTemplate, Slot, SlotDraft};
pub use time::{TimeOfDay, TimeParseError};
pub use timetable::{
    CellRef, CourseOffering, Faculty, NewTimetableEvent, Room, Subject, SubjectType,
    TimetableEvent, TimetableVersion, VersionStatus, DAYS,
};
