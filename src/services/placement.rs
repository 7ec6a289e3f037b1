//! Conflict-checked placement of course offerings into grid cells.
//!
//! A placement resolves the target slot in the active template, derives the
//! event's end time from slot definitions (never from the client), checks
//! the version's current events for room and faculty double-booking, and
//! commits with delete-then-insert replace semantics. The two-step write is
//! intentionally not atomic: if the delete lands and the insert fails the
//! cell is left empty rather than duplicated, and re-placing is cheap.

use log::info;

use super::error::{ScheduleError, ScheduleResult};
use super::templates;
use crate::api::{EventId, OfferingId, RoomId, VersionId};
use crate::db::repository::FullRepository;
use crate::models::{
    slot_at_start, CellRef, CourseOffering, NewTimetableEvent, Slot, TimeOfDay, TimetableEvent,
    DAYS,
};

fn check_day(day_of_week: i16) -> ScheduleResult<()> {
    if !(0..DAYS.len() as i16).contains(&day_of_week) {
        return Err(ScheduleError::InvalidDay { day: day_of_week });
    }
    Ok(())
}

/// Resolve the run of slots an event will cover.
///
/// The run always begins at the slot whose start matches `start_time`. When
/// the requested end lines up with the end of a later consecutive non-break
/// slot (a lab dropped across two periods), the run extends through it;
/// any other requested end is ignored and the run is the single start slot,
/// so the committed end time always comes from the template.
fn resolve_slot_run(
    slots: &[Slot],
    start_time: TimeOfDay,
    requested_end: TimeOfDay,
) -> ScheduleResult<Vec<Slot>> {
    let start_idx = slots
        .iter()
        .position(|s| s.start_time == start_time)
        .ok_or(ScheduleError::InvalidSlot { start_time })?;

    let first = &slots[start_idx];
    if first.is_break {
        return Err(ScheduleError::BreakSlotNotSchedulable {
            slot_name: first.name.clone(),
        });
    }

    let mut run = vec![first.clone()];
    let mut last_end = first.end_time;
    while requested_end > last_end {
        match slots.get(start_idx + run.len()) {
            Some(next) if next.is_break => {
                return Err(ScheduleError::BreakSlotNotSchedulable {
                    slot_name: next.name.clone(),
                });
            }
            Some(next) => {
                last_end = next.end_time;
                run.push(next.clone());
            }
            // The requested end reaches past the template.
            None => break,
        }
    }

    // A requested end that never lined up with a slot boundary collapses to
    // the single start slot.
    if last_end != requested_end {
        run.truncate(1);
    }

    Ok(run)
}

/// How an existing event relates to a pending placement.
enum Occupant {
    Replaced,
    Conflicting(ScheduleError),
}

async fn classify_occupant<R: FullRepository + ?Sized>(
    repo: &R,
    existing: &TimetableEvent,
    offering: &CourseOffering,
    covered_cells: &[CellRef],
    room_id: Option<RoomId>,
) -> ScheduleResult<Occupant> {
    // Re-placing the same offering is never a room or faculty conflict.
    if existing.offering_id != offering.id {
        if let (Some(room), Some(theirs)) = (room_id, existing.room_id) {
            if room == theirs {
                return Ok(Occupant::Conflicting(ScheduleError::RoomConflict {
                    day_of_week: existing.day_of_week,
                    start_time: existing.start_time,
                    room_id: room,
                    occupant_offering_id: existing.offering_id,
                }));
            }
        }

        if let Some(faculty_id) = offering.faculty_id {
            let theirs = repo.get_offering(existing.offering_id).await?;
            if theirs.faculty_id == Some(faculty_id) {
                return Ok(Occupant::Conflicting(ScheduleError::FacultyConflict {
                    day_of_week: existing.day_of_week,
                    start_time: existing.start_time,
                    faculty_id,
                    occupant_offering_id: existing.offering_id,
                }));
            }
        }
    }

    // No room or faculty clash: the occupant is replaced if its own cell is
    // one we are about to overwrite. A spanning event anchored elsewhere
    // cannot be freed by replace-at-cell semantics, so it blocks us.
    if covered_cells.contains(&existing.cell()) {
        Ok(Occupant::Replaced)
    } else {
        Ok(Occupant::Conflicting(ScheduleError::SlotOccupied {
            day_of_week: existing.day_of_week,
            start_time: existing.start_time,
            occupant_offering_id: existing.offering_id,
        }))
    }
}

/// Place an offering into a `(day, slot)` cell of a version.
///
/// Steps, in order:
/// 1. normalize both times to `HH:MM:SS`;
/// 2. resolve the target slot in the active template, rejecting unknown
///    start times and break slots;
/// 3. derive the effective end time from the resolved slot run;
/// 4. check the version's current events for room and faculty conflicts;
/// 5. delete whatever occupies the covered cells, then insert the new row.
///
/// Later steps observe the effects of earlier ones; the conflict checks run
/// against the event list as committed before this call.
pub async fn place_offering<R: FullRepository + ?Sized>(
    repo: &R,
    version_id: VersionId,
    offering_id: OfferingId,
    day_of_week: i16,
    start_time: &str,
    end_time: &str,
    room_id: Option<RoomId>,
) -> ScheduleResult<TimetableEvent> {
    check_day(day_of_week)?;
    let start = TimeOfDay::parse(start_time)?;
    let requested_end = TimeOfDay::parse(end_time)?;

    let slots = templates::active_slots(repo).await?;
    let run = resolve_slot_run(&slots, start, requested_end)?;
    let effective_end = run
        .last()
        .map(|s| s.end_time)
        .ok_or(ScheduleError::InvalidSlot { start_time: start })?;

    let covered_cells: Vec<CellRef> = run
        .iter()
        .map(|s| CellRef {
            day_of_week,
            start_time: s.start_time,
        })
        .collect();

    let offering = repo.get_offering(offering_id).await?;
    let events = repo.events_for_version(version_id).await?;

    for existing in events
        .iter()
        .filter(|e| e.overlaps(day_of_week, start, effective_end))
    {
        match classify_occupant(repo, existing, &offering, &covered_cells, room_id).await? {
            Occupant::Replaced => {}
            Occupant::Conflicting(err) => return Err(err),
        }
    }

    // Replace semantics: free every covered cell, then write the one event.
    for cell in &covered_cells {
        repo.delete_events_at_cell(version_id, cell.day_of_week, cell.start_time)
            .await?;
    }

    let created = repo
        .insert_event(&NewTimetableEvent {
            version_id,
            offering_id,
            day_of_week,
            start_time: start,
            end_time: effective_end,
            room_id,
        })
        .await?;

    info!(
        "placed offering {} at ({}, {}) spanning {} slot(s) in version {}",
        offering_id,
        DAYS[day_of_week as usize],
        start,
        run.len(),
        version_id
    );
    Ok(created)
}

/// Remove one event, freeing its cell. No cascading side effects.
pub async fn delete_event<R: FullRepository + ?Sized>(
    repo: &R,
    version_id: VersionId,
    event_id: EventId,
) -> ScheduleResult<()> {
    let removed = repo.delete_event(event_id).await?;
    if removed > 0 {
        info!("deleted event {} from version {}", event_id, version_id);
    }
    Ok(())
}

/// Remove a batch of events at once (drag-select clear).
pub async fn clear_cells<R: FullRepository + ?Sized>(
    repo: &R,
    version_id: VersionId,
    event_ids: &[EventId],
) -> ScheduleResult<usize> {
    let removed = repo.delete_events(event_ids).await?;
    info!("cleared {} event(s) from version {}", removed, version_id);
    Ok(removed)
}

/// Paint one offering into many cells at once, using the storage upsert
/// keyed on `(version_id, day_of_week, start_time)` so each cell is
/// replaced in a single statement. Rooms default to the offering's default
/// room; break slots and unknown start times are rejected before any write.
pub async fn paint_offering<R: FullRepository + ?Sized>(
    repo: &R,
    version_id: VersionId,
    offering_id: OfferingId,
    cells: &[CellRef],
) -> ScheduleResult<usize> {
    if cells.is_empty() {
        return Ok(0);
    }

    let slots = templates::active_slots(repo).await?;
    let offering = repo.get_offering(offering_id).await?;

    let mut rows = Vec::with_capacity(cells.len());
    for cell in cells {
        check_day(cell.day_of_week)?;
        let slot = slot_at_start(&slots, cell.start_time).ok_or(ScheduleError::InvalidSlot {
            start_time: cell.start_time,
        })?;
        if slot.is_break {
            return Err(ScheduleError::BreakSlotNotSchedulable {
                slot_name: slot.name.clone(),
            });
        }
        rows.push(NewTimetableEvent {
            version_id,
            offering_id,
            day_of_week: cell.day_of_week,
            start_time: slot.start_time,
            end_time: slot.end_time,
            room_id: offering.default_room_id,
        });
    }

    let written = repo.upsert_events(&rows).await?;
    info!(
        "painted offering {} into {} cell(s) of version {}",
        offering_id, written, version_id
    );
    Ok(written)
}

/// Reassign an event's room, re-validating the room and faculty rules
/// against all other events in the same version and range.
pub async fn update_event_room<R: FullRepository + ?Sized>(
    repo: &R,
    version_id: VersionId,
    event_id: EventId,
    room_id: Option<RoomId>,
) -> ScheduleResult<()> {
    let event = repo.get_event(event_id).await?;
    if event.version_id != version_id {
        return Err(ScheduleError::VersionNotReady(format!(
            "event {} belongs to version {}, not {}",
            event_id, event.version_id, version_id
        )));
    }

    let offering = repo.get_offering(event.offering_id).await?;
    let events = repo.events_for_version(version_id).await?;

    for other in events.iter().filter(|e| {
        e.id != event_id && e.overlaps(event.day_of_week, event.start_time, event.end_time)
    }) {
        if let (Some(room), Some(theirs)) = (room_id, other.room_id) {
            if room == theirs {
                return Err(ScheduleError::RoomConflict {
                    day_of_week: other.day_of_week,
                    start_time: other.start_time,
                    room_id: room,
                    occupant_offering_id: other.offering_id,
                });
            }
        }
        if let Some(faculty_id) = offering.faculty_id {
            let theirs = repo.get_offering(other.offering_id).await?;
            if theirs.faculty_id == Some(faculty_id) {
                return Err(ScheduleError::FacultyConflict {
                    day_of_week: other.day_of_week,
                    start_time: other.start_time,
                    faculty_id,
                    occupant_offering_id: other.offering_id,
                });
            }
        }
    }

    repo.update_event_room(event_id, room_id).await?;
    info!("updated room of event {} in version {}", event_id, version_id);
    Ok(())
}
