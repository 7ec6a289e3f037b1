//! Read-model helpers: events resolved for display and the cell-keyed grid.
//!
//! These are the only read paths the rendering layer consumes; they reflect
//! all committed writes, so a placement immediately followed by a grid read
//! always sees its own effect.

use std::collections::HashMap;

use super::error::ScheduleResult;
use crate::api::{EventView, GridCell, GridView, OfferingId, OfferingLoad, VersionId};
use crate::db::repository::FullRepository;
use crate::models::{CourseOffering, Slot, TimetableEvent};

/// Raw event rows of a version.
pub async fn events_for_version<R: FullRepository + ?Sized>(
    repo: &R,
    version_id: VersionId,
) -> ScheduleResult<Vec<TimetableEvent>> {
    Ok(repo.events_for_version(version_id).await?)
}

async fn resolve_event<R: FullRepository + ?Sized>(
    repo: &R,
    event: &TimetableEvent,
    offerings: &mut HashMap<OfferingId, CourseOffering>,
) -> ScheduleResult<EventView> {
    let offering = match offerings.get(&event.offering_id) {
        Some(o) => o.clone(),
        None => {
            let o = repo.get_offering(event.offering_id).await?;
            offerings.insert(event.offering_id, o.clone());
            o
        }
    };

    let subject = repo.get_subject(offering.subject_id).await?;
    let faculty = match offering.faculty_id {
        Some(id) => Some(repo.get_faculty(id).await?),
        None => None,
    };
    let room = match event.room_id {
        Some(id) => Some(repo.get_room(id).await?),
        None => None,
    };

    Ok(EventView {
        id: event.id,
        version_id: event.version_id,
        offering_id: event.offering_id,
        day_of_week: event.day_of_week,
        start_time: event.start_time,
        end_time: event.end_time,
        room_id: event.room_id,
        room_number: room.map(|r| r.room_number),
        subject_code: subject.code,
        subject_name: subject.name,
        subject_type: subject.subject_type,
        faculty_id: offering.faculty_id,
        faculty_name: faculty.map(|f| f.name),
    })
}

/// Events of a version, each resolved to its offering, subject, faculty,
/// and room labels.
pub async fn resolved_events<R: FullRepository + ?Sized>(
    repo: &R,
    version_id: VersionId,
) -> ScheduleResult<Vec<EventView>> {
    let events = repo.events_for_version(version_id).await?;
    let mut offerings = HashMap::new();
    let mut views = Vec::with_capacity(events.len());
    for event in &events {
        views.push(resolve_event(repo, event, &mut offerings).await?);
    }
    Ok(views)
}

/// Number of non-break slots an event covers in the given template, for
/// rendering spanning events across grid rows.
pub fn event_row_span(event: &TimetableEvent, slots: &[Slot]) -> usize {
    let covered = slots
        .iter()
        .filter(|s| !s.is_break)
        .filter(|s| s.start_time >= event.start_time && s.end_time <= event.end_time)
        .count();
    covered.max(1)
}

/// Assemble the grid read model: one cell per event, anchored at its start
/// slot with its row span, plus per-offering placement counts.
///
/// When no template is active every event renders with a span of one row.
pub async fn grid_for_version<R: FullRepository + ?Sized>(
    repo: &R,
    version_id: VersionId,
) -> ScheduleResult<GridView> {
    let events = repo.events_for_version(version_id).await?;
    let slots = repo
        .get_active_template()
        .await?
        .map(|t| t.slots)
        .unwrap_or_default();

    let mut counts: HashMap<OfferingId, usize> = HashMap::new();
    let mut offerings = HashMap::new();
    let mut cells = Vec::with_capacity(events.len());

    for event in &events {
        *counts.entry(event.offering_id).or_insert(0) += 1;
        let view = resolve_event(repo, event, &mut offerings).await?;
        cells.push(GridCell {
            day_of_week: event.day_of_week,
            start_time: event.start_time,
            row_span: event_row_span(event, &slots),
            event: view,
        });
    }

    let mut offering_load: Vec<OfferingLoad> = counts
        .into_iter()
        .map(|(offering_id, scheduled_count)| OfferingLoad {
            offering_id,
            scheduled_count,
        })
        .collect();
    offering_load.sort_by_key(|l| l.offering_id);

    Ok(GridView {
        version_id,
        cells,
        offering_load,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{EventId, OfferingId, VersionId};
    use crate::models::{normalize_slots, SlotDraft, TimeOfDay};

    fn slots() -> Vec<Slot> {
        normalize_slots(vec![
            SlotDraft {
                period_number: Some(1),
                start_time: Some("09:00".into()),
                end_time: Some("10:00".into()),
                ..Default::default()
            },
            SlotDraft {
                period_number: Some(2),
                start_time: Some("10:00".into()),
                end_time: Some("11:00".into()),
                ..Default::default()
            },
            SlotDraft {
                period_number: Some(3),
                name: Some("Lunch".into()),
                start_time: Some("11:00".into()),
                end_time: Some("11:45".into()),
                is_break: true,
                ..Default::default()
            },
        ])
        .unwrap()
    }

    fn event(start: &str, end: &str) -> TimetableEvent {
        TimetableEvent {
            id: EventId(1),
            version_id: VersionId(1),
            offering_id: OfferingId(1),
            day_of_week: 0,
            start_time: TimeOfDay::parse(start).unwrap(),
            end_time: TimeOfDay::parse(end).unwrap(),
            room_id: None,
        }
    }

    #[test]
    fn test_single_slot_span() {
        assert_eq!(event_row_span(&event("09:00", "10:00"), &slots()), 1);
    }

    #[test]
    fn test_lab_spans_two_rows() {
        assert_eq!(event_row_span(&event("09:00", "11:00"), &slots()), 2);
    }

    #[test]
    fn test_break_slots_do_not_count_toward_span() {
        assert_eq!(event_row_span(&event("10:00", "11:45"), &slots()), 1);
    }

    #[test]
    fn test_span_defaults_to_one_without_template() {
        assert_eq!(event_row_span(&event("09:00", "10:00"), &[]), 1);
    }
}
