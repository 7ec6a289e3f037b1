use chrono::{DateTime, NaiveTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

use super::schema::{
    course_offerings, faculty, period_templates, rooms, subjects, timetable_events,
    timetable_versions,
};
use crate::api::{BatchId, EventId, FacultyId, OfferingId, RoomId, SubjectId, TemplateId, VersionId};
use crate::db::repository::{RepositoryError, RepositoryResult};
use crate::models::{
    CourseOffering, Faculty, NewTimetableEvent, PeriodTemplate, Room, Slot, Subject,
    TimetableEvent, TimetableVersion, VersionStatus,
};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = period_templates)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TemplateRow {
    pub id: i64,
    pub name: String,
    pub is_active: bool,
    pub slots: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = period_templates)]
pub struct NewTemplateRow {
    pub name: String,
    pub is_active: bool,
    pub slots: Value,
}

impl TemplateRow {
    pub fn into_domain(self) -> RepositoryResult<PeriodTemplate> {
        let slots: Vec<Slot> = serde_json::from_value(self.slots).map_err(|e| {
            RepositoryError::internal(format!("Failed to parse template slots JSON: {}", e))
        })?;
        Ok(PeriodTemplate {
            id: TemplateId(self.id),
            name: self.name,
            is_active: self.is_active,
            slots,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

pub fn slots_to_json(slots: &[Slot]) -> RepositoryResult<Value> {
    serde_json::to_value(slots).map_err(|e| {
        RepositoryError::internal(format!("Failed to serialize template slots: {}", e))
    })
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = timetable_versions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct VersionRow {
    pub id: i64,
    pub batch_id: i64,
    pub status: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = timetable_versions)]
pub struct NewVersionRow {
    pub batch_id: i64,
    pub status: String,
    pub name: String,
}

impl VersionRow {
    pub fn into_domain(self) -> RepositoryResult<TimetableVersion> {
        let status: VersionStatus = self
            .status
            .parse()
            .map_err(RepositoryError::internal)?;
        Ok(TimetableVersion {
            id: VersionId(self.id),
            batch_id: BatchId(self.batch_id),
            status,
            name: self.name,
            created_at: self.created_at,
            published_at: self.published_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = timetable_events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct EventRow {
    pub id: i64,
    pub version_id: i64,
    pub offering_id: i64,
    pub day_of_week: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub room_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = timetable_events)]
pub struct NewEventRow {
    pub version_id: i64,
    pub offering_id: i64,
    pub day_of_week: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub room_id: Option<i64>,
}

impl EventRow {
    pub fn into_domain(self) -> TimetableEvent {
        TimetableEvent {
            id: EventId(self.id),
            version_id: VersionId(self.version_id),
            offering_id: OfferingId(self.offering_id),
            day_of_week: self.day_of_week,
            start_time: self.start_time.into(),
            end_time: self.end_time.into(),
            room_id: self.room_id.map(RoomId),
        }
    }
}

impl NewEventRow {
    pub fn from_domain(event: &NewTimetableEvent) -> Self {
        Self {
            version_id: event.version_id.value(),
            offering_id: event.offering_id.value(),
            day_of_week: event.day_of_week,
            start_time: event.start_time.as_naive(),
            end_time: event.end_time.as_naive(),
            room_id: event.room_id.map(|r| r.value()),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = course_offerings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OfferingRow {
    pub id: i64,
    pub batch_id: i64,
    pub subject_id: i64,
    pub faculty_id: Option<i64>,
    pub default_room_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl OfferingRow {
    pub fn into_domain(self) -> CourseOffering {
        CourseOffering {
            id: OfferingId(self.id),
            batch_id: BatchId(self.batch_id),
            subject_id: SubjectId(self.subject_id),
            faculty_id: self.faculty_id.map(FacultyId),
            default_room_id: self.default_room_id.map(RoomId),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = rooms)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RoomRow {
    pub id: i64,
    pub room_number: String,
    pub department_id: i64,
}

impl RoomRow {
    pub fn into_domain(self) -> Room {
        Room {
            id: RoomId(self.id),
            room_number: self.room_number,
            department_id: self.department_id,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = faculty)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct FacultyRow {
    pub id: i64,
    pub name: String,
}

impl FacultyRow {
    pub fn into_domain(self) -> Faculty {
        Faculty {
            id: FacultyId(self.id),
            name: self.name,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = subjects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SubjectRow {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub subject_type: String,
}

impl SubjectRow {
    pub fn into_domain(self) -> RepositoryResult<Subject> {
        let subject_type = self
            .subject_type
            .parse()
            .map_err(RepositoryError::internal)?;
        Ok(Subject {
            id: SubjectId(self.id),
            code: self.code,
            name: self.name,
            subject_type,
        })
    }
}
