//! In-memory local repository implementation.
//!
//! This module provides a local implementation of all repository traits
//! suitable for unit testing and local development. All data is stored in
//! memory using HashMap structures, providing fast, deterministic, and
//! isolated execution.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::api::{BatchId, EventId, FacultyId, OfferingId, RoomId, SubjectId, TemplateId, VersionId};
use crate::db::repository::*;
use crate::models::{
    CourseOffering, Faculty, NewTimetableEvent, PeriodTemplate, Room, Slot, Subject, SubjectType,
    TimeOfDay, TimetableEvent, TimetableVersion, VersionStatus,
};

/// In-memory local repository.
///
/// Stores all data in HashMaps behind one lock, making it ideal for unit
/// tests and local development that need isolation and speed. Seeding
/// helpers (`insert_*_impl`) populate the reference registries that the
/// administrative layer would own in production.
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    templates: HashMap<TemplateId, PeriodTemplate>,
    versions: HashMap<VersionId, TimetableVersion>,
    events: HashMap<EventId, TimetableEvent>,

    // Reference registries (read-only to the engine)
    offerings: HashMap<OfferingId, CourseOffering>,
    rooms: HashMap<RoomId, Room>,
    faculty: HashMap<FacultyId, Faculty>,
    subjects: HashMap<SubjectId, Subject>,

    // ID counters
    next_template_id: i64,
    next_version_id: i64,
    next_event_id: i64,
    next_reference_id: i64,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            templates: HashMap::new(),
            versions: HashMap::new(),
            events: HashMap::new(),
            offerings: HashMap::new(),
            rooms: HashMap::new(),
            faculty: HashMap::new(),
            subjects: HashMap::new(),
            next_template_id: 1,
            next_version_id: 1,
            next_event_id: 1,
            next_reference_id: 1,
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        let mut data = self.data.write().unwrap();
        data.is_healthy = healthy;
    }

    /// Clear all data from the repository.
    pub fn clear(&self) {
        let mut data = self.data.write().unwrap();
        let healthy = data.is_healthy;
        *data = LocalData {
            is_healthy: healthy,
            ..Default::default()
        };
    }

    /// Number of stored events across all versions.
    pub fn event_count(&self) -> usize {
        self.data.read().unwrap().events.len()
    }

    /// Number of stored versions across all batches.
    pub fn version_count(&self) -> usize {
        self.data.read().unwrap().versions.len()
    }

    /// Seed a subject into the registry, assigning an id.
    pub fn insert_subject_impl(&self, code: &str, name: &str, subject_type: SubjectType) -> SubjectId {
        let mut data = self.data.write().unwrap();
        let id = SubjectId(data.next_reference_id);
        data.next_reference_id += 1;
        data.subjects.insert(
            id,
            Subject {
                id,
                code: code.to_string(),
                name: name.to_string(),
                subject_type,
            },
        );
        id
    }

    /// Seed a faculty member into the registry, assigning an id.
    pub fn insert_faculty_impl(&self, name: &str) -> FacultyId {
        let mut data = self.data.write().unwrap();
        let id = FacultyId(data.next_reference_id);
        data.next_reference_id += 1;
        data.faculty.insert(
            id,
            Faculty {
                id,
                name: name.to_string(),
            },
        );
        id
    }

    /// Seed a room into the registry, assigning an id.
    pub fn insert_room_impl(&self, room_number: &str, department_id: i64) -> RoomId {
        let mut data = self.data.write().unwrap();
        let id = RoomId(data.next_reference_id);
        data.next_reference_id += 1;
        data.rooms.insert(
            id,
            Room {
                id,
                room_number: room_number.to_string(),
                department_id,
            },
        );
        id
    }

    /// Seed a course offering into the registry, assigning an id.
    pub fn insert_offering_impl(
        &self,
        batch_id: BatchId,
        subject_id: SubjectId,
        faculty_id: Option<FacultyId>,
        default_room_id: Option<RoomId>,
    ) -> OfferingId {
        let mut data = self.data.write().unwrap();
        let id = OfferingId(data.next_reference_id);
        data.next_reference_id += 1;
        data.offerings.insert(
            id,
            CourseOffering {
                id,
                batch_id,
                subject_id,
                faculty_id,
                default_room_id,
            },
        );
        id
    }

    /// Helper to check health and return an error if unhealthy.
    fn check_health(&self) -> RepositoryResult<()> {
        let data = self.data.read().unwrap();
        if !data.is_healthy {
            return Err(RepositoryError::connection("Database is not healthy"));
        }
        Ok(())
    }

    fn get_template_impl(&self, template_id: TemplateId) -> RepositoryResult<PeriodTemplate> {
        let data = self.data.read().unwrap();
        data.templates.get(&template_id).cloned().ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Template {} not found", template_id),
                ErrorContext::default()
                    .with_entity("template")
                    .with_entity_id(template_id),
            )
        })
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

// ==================== Template Repository ====================

#[async_trait]
impl TemplateRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        let data = self.data.read().unwrap();
        Ok(data.is_healthy)
    }

    async fn list_templates(&self) -> RepositoryResult<Vec<PeriodTemplate>> {
        let data = self.data.read().unwrap();
        let mut templates: Vec<PeriodTemplate> = data.templates.values().cloned().collect();
        // Newest first; id order stands in for creation order.
        templates.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(templates)
    }

    async fn get_template(&self, template_id: TemplateId) -> RepositoryResult<PeriodTemplate> {
        self.get_template_impl(template_id)
    }

    async fn get_active_template(&self) -> RepositoryResult<Option<PeriodTemplate>> {
        let data = self.data.read().unwrap();
        let mut active: Vec<&PeriodTemplate> =
            data.templates.values().filter(|t| t.is_active).collect();
        active.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        Ok(active.first().map(|t| (*t).clone()))
    }

    async fn create_template(
        &self,
        name: &str,
        slots: &[Slot],
    ) -> RepositoryResult<PeriodTemplate> {
        self.check_health()?;
        let mut data = self.data.write().unwrap();
        let id = TemplateId(data.next_template_id);
        data.next_template_id += 1;
        let now = Utc::now();
        let template = PeriodTemplate {
            id,
            name: name.to_string(),
            is_active: false,
            slots: slots.to_vec(),
            created_at: now,
            updated_at: now,
        };
        data.templates.insert(id, template.clone());
        Ok(template)
    }

    async fn replace_template_slots(
        &self,
        template_id: TemplateId,
        slots: &[Slot],
    ) -> RepositoryResult<()> {
        let mut data = self.data.write().unwrap();
        let template = data.templates.get_mut(&template_id).ok_or_else(|| {
            RepositoryError::not_found(format!("Template {} not found", template_id))
        })?;
        template.slots = slots.to_vec();
        template.updated_at = Utc::now();
        Ok(())
    }

    async fn deactivate_all_templates(&self) -> RepositoryResult<usize> {
        self.check_health()?;
        let mut data = self.data.write().unwrap();
        let now = Utc::now();
        let mut changed = 0;
        for template in data.templates.values_mut() {
            if template.is_active {
                template.is_active = false;
                template.updated_at = now;
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn activate_template(&self, template_id: TemplateId) -> RepositoryResult<()> {
        self.check_health()?;
        let mut data = self.data.write().unwrap();
        let template = data.templates.get_mut(&template_id).ok_or_else(|| {
            RepositoryError::not_found(format!("Template {} not found", template_id))
        })?;
        template.is_active = true;
        template.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_template(&self, template_id: TemplateId) -> RepositoryResult<usize> {
        let mut data = self.data.write().unwrap();
        Ok(if data.templates.remove(&template_id).is_some() {
            1
        } else {
            0
        })
    }
}

// ==================== Version Repository ====================

#[async_trait]
impl VersionRepository for LocalRepository {
    async fn latest_draft(&self, batch_id: BatchId) -> RepositoryResult<Option<TimetableVersion>> {
        let data = self.data.read().unwrap();
        let mut drafts: Vec<&TimetableVersion> = data
            .versions
            .values()
            .filter(|v| v.batch_id == batch_id && v.status == VersionStatus::Draft)
            .collect();
        drafts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(drafts.first().map(|v| (*v).clone()))
    }

    async fn latest_published(
        &self,
        batch_id: BatchId,
    ) -> RepositoryResult<Option<TimetableVersion>> {
        let data = self.data.read().unwrap();
        let mut published: Vec<&TimetableVersion> = data
            .versions
            .values()
            .filter(|v| v.batch_id == batch_id && v.status == VersionStatus::Published)
            .collect();
        published.sort_by(|a, b| {
            b.published_at
                .cmp(&a.published_at)
                .then(b.id.cmp(&a.id))
        });
        Ok(published.first().map(|v| (*v).clone()))
    }

    async fn get_version(&self, version_id: VersionId) -> RepositoryResult<TimetableVersion> {
        let data = self.data.read().unwrap();
        data.versions.get(&version_id).cloned().ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Version {} not found", version_id),
                ErrorContext::default()
                    .with_entity("version")
                    .with_entity_id(version_id),
            )
        })
    }

    async fn list_versions(&self, batch_id: BatchId) -> RepositoryResult<Vec<TimetableVersion>> {
        let data = self.data.read().unwrap();
        let mut versions: Vec<TimetableVersion> = data
            .versions
            .values()
            .filter(|v| v.batch_id == batch_id)
            .cloned()
            .collect();
        versions.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(versions)
    }

    async fn create_version(
        &self,
        batch_id: BatchId,
        status: VersionStatus,
        name: &str,
    ) -> RepositoryResult<TimetableVersion> {
        self.check_health()?;
        let mut data = self.data.write().unwrap();
        let id = VersionId(data.next_version_id);
        data.next_version_id += 1;
        let version = TimetableVersion {
            id,
            batch_id,
            status,
            name: name.to_string(),
            created_at: Utc::now(),
            published_at: None,
        };
        data.versions.insert(id, version.clone());
        Ok(version)
    }

    async fn archive_published(&self, batch_id: BatchId) -> RepositoryResult<usize> {
        self.check_health()?;
        let mut data = self.data.write().unwrap();
        let mut changed = 0;
        for version in data.versions.values_mut() {
            if version.batch_id == batch_id && version.status == VersionStatus::Published {
                version.status = VersionStatus::Archived;
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn mark_published(
        &self,
        version_id: VersionId,
        published_at: DateTime<Utc>,
    ) -> RepositoryResult<()> {
        self.check_health()?;
        let mut data = self.data.write().unwrap();
        let version = data.versions.get_mut(&version_id).ok_or_else(|| {
            RepositoryError::not_found(format!("Version {} not found", version_id))
        })?;
        version.status = VersionStatus::Published;
        version.published_at = Some(published_at);
        Ok(())
    }
}

// ==================== Event Repository ====================

#[async_trait]
impl EventRepository for LocalRepository {
    async fn events_for_version(
        &self,
        version_id: VersionId,
    ) -> RepositoryResult<Vec<TimetableEvent>> {
        let data = self.data.read().unwrap();
        let mut events: Vec<TimetableEvent> = data
            .events
            .values()
            .filter(|e| e.version_id == version_id)
            .cloned()
            .collect();
        events.sort_by(|a, b| {
            a.day_of_week
                .cmp(&b.day_of_week)
                .then(a.start_time.cmp(&b.start_time))
        });
        Ok(events)
    }

    async fn get_event(&self, event_id: EventId) -> RepositoryResult<TimetableEvent> {
        let data = self.data.read().unwrap();
        data.events.get(&event_id).cloned().ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Event {} not found", event_id),
                ErrorContext::default()
                    .with_entity("event")
                    .with_entity_id(event_id),
            )
        })
    }

    async fn insert_event(&self, event: &NewTimetableEvent) -> RepositoryResult<TimetableEvent> {
        self.check_health()?;
        let mut data = self.data.write().unwrap();
        let id = EventId(data.next_event_id);
        data.next_event_id += 1;
        let row = TimetableEvent {
            id,
            version_id: event.version_id,
            offering_id: event.offering_id,
            day_of_week: event.day_of_week,
            start_time: event.start_time,
            end_time: event.end_time,
            room_id: event.room_id,
        };
        data.events.insert(id, row.clone());
        Ok(row)
    }

    async fn delete_event(&self, event_id: EventId) -> RepositoryResult<usize> {
        let mut data = self.data.write().unwrap();
        Ok(if data.events.remove(&event_id).is_some() {
            1
        } else {
            0
        })
    }

    async fn delete_events(&self, event_ids: &[EventId]) -> RepositoryResult<usize> {
        let mut data = self.data.write().unwrap();
        let mut removed = 0;
        for id in event_ids {
            if data.events.remove(id).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn delete_events_at_cell(
        &self,
        version_id: VersionId,
        day_of_week: i16,
        start_time: TimeOfDay,
    ) -> RepositoryResult<usize> {
        let mut data = self.data.write().unwrap();
        let doomed: Vec<EventId> = data
            .events
            .values()
            .filter(|e| {
                e.version_id == version_id
                    && e.day_of_week == day_of_week
                    && e.start_time == start_time
            })
            .map(|e| e.id)
            .collect();
        for id in &doomed {
            data.events.remove(id);
        }
        Ok(doomed.len())
    }

    async fn upsert_events(&self, events: &[NewTimetableEvent]) -> RepositoryResult<usize> {
        self.check_health()?;
        let mut data = self.data.write().unwrap();
        for event in events {
            let doomed: Vec<EventId> = data
                .events
                .values()
                .filter(|e| {
                    e.version_id == event.version_id
                        && e.day_of_week == event.day_of_week
                        && e.start_time == event.start_time
                })
                .map(|e| e.id)
                .collect();
            for id in &doomed {
                data.events.remove(id);
            }
            let id = EventId(data.next_event_id);
            data.next_event_id += 1;
            data.events.insert(
                id,
                TimetableEvent {
                    id,
                    version_id: event.version_id,
                    offering_id: event.offering_id,
                    day_of_week: event.day_of_week,
                    start_time: event.start_time,
                    end_time: event.end_time,
                    room_id: event.room_id,
                },
            );
        }
        Ok(events.len())
    }

    async fn update_event_room(
        &self,
        event_id: EventId,
        room_id: Option<RoomId>,
    ) -> RepositoryResult<()> {
        let mut data = self.data.write().unwrap();
        let event = data
            .events
            .get_mut(&event_id)
            .ok_or_else(|| RepositoryError::not_found(format!("Event {} not found", event_id)))?;
        event.room_id = room_id;
        Ok(())
    }
}

// ==================== Reference Repository ====================

#[async_trait]
impl ReferenceRepository for LocalRepository {
    async fn offerings_for_batch(
        &self,
        batch_id: BatchId,
    ) -> RepositoryResult<Vec<CourseOffering>> {
        let data = self.data.read().unwrap();
        let mut offerings: Vec<CourseOffering> = data
            .offerings
            .values()
            .filter(|o| o.batch_id == batch_id)
            .cloned()
            .collect();
        offerings.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(offerings)
    }

    async fn get_offering(&self, offering_id: OfferingId) -> RepositoryResult<CourseOffering> {
        let data = self.data.read().unwrap();
        data.offerings.get(&offering_id).cloned().ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Offering {} not found", offering_id),
                ErrorContext::default()
                    .with_entity("offering")
                    .with_entity_id(offering_id),
            )
        })
    }

    async fn list_rooms(&self) -> RepositoryResult<Vec<Room>> {
        let data = self.data.read().unwrap();
        let mut rooms: Vec<Room> = data.rooms.values().cloned().collect();
        rooms.sort_by(|a, b| a.room_number.cmp(&b.room_number));
        Ok(rooms)
    }

    async fn get_room(&self, room_id: RoomId) -> RepositoryResult<Room> {
        let data = self.data.read().unwrap();
        data.rooms
            .get(&room_id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(format!("Room {} not found", room_id)))
    }

    async fn list_faculty(&self) -> RepositoryResult<Vec<Faculty>> {
        let data = self.data.read().unwrap();
        let mut faculty: Vec<Faculty> = data.faculty.values().cloned().collect();
        faculty.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(faculty)
    }

    async fn get_faculty(&self, faculty_id: FacultyId) -> RepositoryResult<Faculty> {
        let data = self.data.read().unwrap();
        data.faculty
            .get(&faculty_id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(format!("Faculty {} not found", faculty_id)))
    }

    async fn list_subjects(&self) -> RepositoryResult<Vec<Subject>> {
        let data = self.data.read().unwrap();
        let mut subjects: Vec<Subject> = data.subjects.values().cloned().collect();
        subjects.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(subjects)
    }

    async fn get_subject(&self, subject_id: SubjectId) -> RepositoryResult<Subject> {
        let data = self.data.read().unwrap();
        data.subjects
            .get(&subject_id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(format!("Subject {} not found", subject_id)))
    }
}
