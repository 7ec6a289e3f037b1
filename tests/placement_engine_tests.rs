//! Placement engine tests against the local repository.
//!
//! These cover the conflict rules (cell uniqueness, room and faculty
//! double-booking, break immutability), replace semantics, multi-period
//! spans, and the error kinds each failure mode must surface.

use timegrid::api::{BatchId, FacultyId, OfferingId, RoomId, TemplateId, VersionId};
use timegrid::db::repositories::LocalRepository;
use timegrid::db::repository::{EventRepository, VersionRepository};
use timegrid::models::{NewTimetableEvent, SlotDraft, SubjectType, TimeOfDay, VersionStatus};
use timegrid::services::{placement, templates, ScheduleError};

fn slot(period: i32, name: &str, start: &str, end: &str, is_break: bool) -> SlotDraft {
    SlotDraft {
        period_number: Some(period),
        name: Some(name.to_string()),
        start_time: Some(start.to_string()),
        end_time: Some(end.to_string()),
        is_break,
        ..Default::default()
    }
}

/// Standard grid: two morning periods, a lunch break, one afternoon period.
async fn activate_standard_template(repo: &LocalRepository) -> TemplateId {
    let template = templates::create_template(repo, "Standard Day").await.unwrap();
    templates::replace_slots(
        repo,
        template.id,
        vec![
            slot(1, "Period 1", "09:00", "10:00", false),
            slot(2, "Period 2", "10:00", "11:00", false),
            slot(3, "Lunch", "11:00", "11:30", true),
            slot(4, "Period 3", "11:30", "12:30", false),
        ],
    )
    .await
    .unwrap();
    templates::set_active(repo, template.id).await.unwrap();
    template.id
}

struct Fixture {
    repo: LocalRepository,
    version_id: VersionId,
    /// CS101 lecture taught by faculty_a
    lecture_a: OfferingId,
    /// MA201 lecture also taught by faculty_a
    lecture_b: OfferingId,
    /// PH301 lab taught by faculty_b
    lab: OfferingId,
    faculty_a: FacultyId,
    room_1: RoomId,
    room_2: RoomId,
}

async fn fixture() -> Fixture {
    let repo = LocalRepository::new();
    activate_standard_template(&repo).await;

    let batch = BatchId(1);
    let cs = repo.insert_subject_impl("CS101", "Programming", SubjectType::Lecture);
    let ma = repo.insert_subject_impl("MA201", "Linear Algebra", SubjectType::Lecture);
    let ph = repo.insert_subject_impl("PH301", "Physics Lab", SubjectType::Lab);
    let faculty_a = repo.insert_faculty_impl("A. Hoare");
    let faculty_b = repo.insert_faculty_impl("B. Liskov");
    let room_1 = repo.insert_room_impl("B-101", 1);
    let room_2 = repo.insert_room_impl("B-102", 1);

    let lecture_a = repo.insert_offering_impl(batch, cs, Some(faculty_a), Some(room_1));
    let lecture_b = repo.insert_offering_impl(batch, ma, Some(faculty_a), None);
    let lab = repo.insert_offering_impl(batch, ph, Some(faculty_b), Some(room_2));

    let version = repo
        .create_version(batch, VersionStatus::Draft, "Draft")
        .await
        .unwrap();

    Fixture {
        repo,
        version_id: version.id,
        lecture_a,
        lecture_b,
        lab,
        faculty_a,
        room_1,
        room_2,
    }
}

fn t(s: &str) -> TimeOfDay {
    TimeOfDay::parse(s).unwrap()
}

// =========================================================
// Basic placement
// =========================================================

#[tokio::test]
async fn test_place_takes_end_time_from_slot() {
    let f = fixture().await;

    // Client sends a short-form start and a bogus end; the committed event
    // uses the slot's end.
    let event = placement::place_offering(
        &f.repo,
        f.version_id,
        f.lecture_a,
        0,
        "09:00",
        "09:45",
        None,
    )
    .await
    .unwrap();

    assert_eq!(event.start_time, t("09:00:00"));
    assert_eq!(event.end_time, t("10:00:00"));
}

#[tokio::test]
async fn test_idempotent_placement_leaves_one_event() {
    let f = fixture().await;

    for _ in 0..2 {
        placement::place_offering(&f.repo, f.version_id, f.lecture_a, 0, "09:00", "10:00", None)
            .await
            .unwrap();
    }

    let events = f.repo.events_for_version(f.version_id).await.unwrap();
    assert_eq!(events.len(), 1);
}

#[tokio::test]
async fn test_mixed_granularity_inputs_hit_the_same_cell() {
    let f = fixture().await;

    placement::place_offering(&f.repo, f.version_id, f.lecture_a, 0, "09:00", "10:00", None)
        .await
        .unwrap();
    placement::place_offering(
        &f.repo,
        f.version_id,
        f.lecture_a,
        0,
        "09:00:00",
        "10:00:00",
        None,
    )
    .await
    .unwrap();

    let events = f.repo.events_for_version(f.version_id).await.unwrap();
    assert_eq!(events.len(), 1, "both spellings must address one cell");
}

#[tokio::test]
async fn test_replace_semantics_swaps_cell_occupant() {
    let f = fixture().await;

    placement::place_offering(&f.repo, f.version_id, f.lecture_a, 0, "09:00", "10:00", None)
        .await
        .unwrap();
    // lab has a different faculty and room, so it replaces the occupant.
    placement::place_offering(&f.repo, f.version_id, f.lab, 0, "09:00", "10:00", None)
        .await
        .unwrap();

    let events = f.repo.events_for_version(f.version_id).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].offering_id, f.lab);
}

// =========================================================
// Conflict rules
// =========================================================

#[tokio::test]
async fn test_faculty_conflict_in_same_cell() {
    let f = fixture().await;

    placement::place_offering(&f.repo, f.version_id, f.lecture_a, 0, "09:00", "10:00", None)
        .await
        .unwrap();

    // lecture_b shares faculty_a; same cell without deleting first must
    // fail with the named kind, carrying the conflicting identities.
    let err = placement::place_offering(
        &f.repo,
        f.version_id,
        f.lecture_b,
        0,
        "09:00",
        "10:00",
        None,
    )
    .await
    .unwrap_err();

    match err {
        ScheduleError::FacultyConflict {
            faculty_id,
            occupant_offering_id,
            ..
        } => {
            assert_eq!(faculty_id, f.faculty_a);
            assert_eq!(occupant_offering_id, f.lecture_a);
        }
        other => panic!("expected FacultyConflict, got {:?}", other),
    }
}

#[tokio::test]
async fn test_same_faculty_different_cell_is_allowed() {
    let f = fixture().await;

    placement::place_offering(&f.repo, f.version_id, f.lecture_a, 0, "09:00", "10:00", None)
        .await
        .unwrap();
    // Same faculty on another day is fine.
    placement::place_offering(&f.repo, f.version_id, f.lecture_b, 1, "09:00", "10:00", None)
        .await
        .unwrap();

    let events = f.repo.events_for_version(f.version_id).await.unwrap();
    assert_eq!(events.len(), 2);
}

#[tokio::test]
async fn test_room_conflict_in_same_cell() {
    let f = fixture().await;

    placement::place_offering(
        &f.repo,
        f.version_id,
        f.lecture_a,
        0,
        "09:00",
        "10:00",
        Some(f.room_1),
    )
    .await
    .unwrap();

    let err = placement::place_offering(
        &f.repo,
        f.version_id,
        f.lab,
        0,
        "09:00",
        "10:00",
        Some(f.room_1),
    )
    .await
    .unwrap_err();

    match err {
        ScheduleError::RoomConflict {
            room_id,
            occupant_offering_id,
            ..
        } => {
            assert_eq!(room_id, f.room_1);
            assert_eq!(occupant_offering_id, f.lecture_a);
        }
        other => panic!("expected RoomConflict, got {:?}", other),
    }
}

#[tokio::test]
async fn test_break_slot_never_schedulable() {
    let f = fixture().await;

    let err =
        placement::place_offering(&f.repo, f.version_id, f.lecture_a, 0, "11:00", "11:30", None)
            .await
            .unwrap_err();
    assert!(matches!(err, ScheduleError::BreakSlotNotSchedulable { .. }));
}

#[tokio::test]
async fn test_unknown_start_time_fails_invalid_slot() {
    let f = fixture().await;

    let err =
        placement::place_offering(&f.repo, f.version_id, f.lecture_a, 0, "07:00", "08:00", None)
            .await
            .unwrap_err();
    assert!(matches!(err, ScheduleError::InvalidSlot { .. }));
}

#[tokio::test]
async fn test_day_out_of_range_rejected() {
    let f = fixture().await;

    let err =
        placement::place_offering(&f.repo, f.version_id, f.lecture_a, 6, "09:00", "10:00", None)
            .await
            .unwrap_err();
    assert!(matches!(err, ScheduleError::InvalidDay { day: 6 }));
}

#[tokio::test]
async fn test_no_active_template_blocks_placement() {
    let repo = LocalRepository::new();
    let subject = repo.insert_subject_impl("CS101", "Programming", SubjectType::Lecture);
    let offering = repo.insert_offering_impl(BatchId(1), subject, None, None);
    let version = repo
        .create_version(BatchId(1), VersionStatus::Draft, "Draft")
        .await
        .unwrap();

    let err = placement::place_offering(&repo, version.id, offering, 0, "09:00", "10:00", None)
        .await
        .unwrap_err();
    assert!(matches!(err, ScheduleError::NoActiveTemplate));
}

#[tokio::test]
async fn test_empty_active_template_blocks_placement() {
    let repo = LocalRepository::new();
    let template = templates::create_template(&repo, "Bare").await.unwrap();
    templates::set_active(&repo, template.id).await.unwrap();

    let subject = repo.insert_subject_impl("CS101", "Programming", SubjectType::Lecture);
    let offering = repo.insert_offering_impl(BatchId(1), subject, None, None);
    let version = repo
        .create_version(BatchId(1), VersionStatus::Draft, "Draft")
        .await
        .unwrap();

    let err = placement::place_offering(&repo, version.id, offering, 0, "09:00", "10:00", None)
        .await
        .unwrap_err();
    assert!(matches!(err, ScheduleError::EmptyTemplate));
}

// =========================================================
// Multi-period spans (labs)
// =========================================================

#[tokio::test]
async fn test_lab_spans_two_consecutive_slots() {
    let f = fixture().await;

    let event =
        placement::place_offering(&f.repo, f.version_id, f.lab, 2, "09:00", "11:00", None)
            .await
            .unwrap();

    assert_eq!(event.start_time, t("09:00:00"));
    assert_eq!(event.end_time, t("11:00:00"));

    let events = f.repo.events_for_version(f.version_id).await.unwrap();
    assert_eq!(events.len(), 1, "a span commits as a single event row");
}

#[tokio::test]
async fn test_span_blocked_by_break() {
    let f = fixture().await;

    // 10:00 -> 11:30 would have to extend across the lunch break.
    let err = placement::place_offering(&f.repo, f.version_id, f.lab, 2, "10:00", "11:30", None)
        .await
        .unwrap_err();
    assert!(matches!(err, ScheduleError::BreakSlotNotSchedulable { .. }));
}

#[tokio::test]
async fn test_second_slot_of_span_is_occupied() {
    let f = fixture().await;

    placement::place_offering(&f.repo, f.version_id, f.lab, 0, "09:00", "11:00", None)
        .await
        .unwrap();

    // The 10:00 cell is covered by the lab but anchored at 09:00, so a
    // single-slot placement there cannot free it by replacement.
    let err = placement::place_offering(
        &f.repo,
        f.version_id,
        f.lecture_a,
        0,
        "10:00",
        "11:00",
        None,
    )
    .await
    .unwrap_err();

    match err {
        ScheduleError::SlotOccupied {
            occupant_offering_id,
            ..
        } => assert_eq!(occupant_offering_id, f.lab),
        other => panic!("expected SlotOccupied, got {:?}", other),
    }
}

#[tokio::test]
async fn test_placing_at_span_anchor_replaces_whole_span() {
    let f = fixture().await;

    placement::place_offering(&f.repo, f.version_id, f.lab, 0, "09:00", "11:00", None)
        .await
        .unwrap();
    placement::place_offering(&f.repo, f.version_id, f.lecture_a, 0, "09:00", "10:00", None)
        .await
        .unwrap();

    let events = f.repo.events_for_version(f.version_id).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].offering_id, f.lecture_a);
    assert_eq!(events[0].end_time, t("10:00:00"));
}

// =========================================================
// Deletion, bulk paint, and room updates
// =========================================================

#[tokio::test]
async fn test_delete_event_frees_cell() {
    let f = fixture().await;

    let event =
        placement::place_offering(&f.repo, f.version_id, f.lecture_a, 0, "09:00", "10:00", None)
            .await
            .unwrap();
    placement::delete_event(&f.repo, f.version_id, event.id)
        .await
        .unwrap();

    assert!(f.repo.events_for_version(f.version_id).await.unwrap().is_empty());

    // The freed cell is immediately placeable again.
    placement::place_offering(&f.repo, f.version_id, f.lecture_b, 0, "09:00", "10:00", None)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_paint_offering_into_selection() {
    let f = fixture().await;

    let cells: Vec<timegrid::models::CellRef> = (0..3)
        .map(|day| timegrid::models::CellRef {
            day_of_week: day,
            start_time: t("10:00"),
        })
        .collect();

    let written = placement::paint_offering(&f.repo, f.version_id, f.lecture_a, &cells)
        .await
        .unwrap();
    assert_eq!(written, 3);

    let events = f.repo.events_for_version(f.version_id).await.unwrap();
    assert_eq!(events.len(), 3);
    // Paint applies the offering's default room.
    assert!(events.iter().all(|e| e.room_id == Some(f.room_1)));

    // Repainting the same selection with another offering replaces, never
    // duplicates.
    placement::paint_offering(&f.repo, f.version_id, f.lecture_b, &cells)
        .await
        .unwrap();
    let events = f.repo.events_for_version(f.version_id).await.unwrap();
    assert_eq!(events.len(), 3);
    assert!(events.iter().all(|e| e.offering_id == f.lecture_b));
}

#[tokio::test]
async fn test_paint_rejects_break_cells_before_writing() {
    let f = fixture().await;

    let cells = vec![
        timegrid::models::CellRef {
            day_of_week: 0,
            start_time: t("09:00"),
        },
        timegrid::models::CellRef {
            day_of_week: 0,
            start_time: t("11:00"), // lunch
        },
    ];

    let err = placement::paint_offering(&f.repo, f.version_id, f.lecture_a, &cells)
        .await
        .unwrap_err();
    assert!(matches!(err, ScheduleError::BreakSlotNotSchedulable { .. }));
    // Nothing was written.
    assert!(f.repo.events_for_version(f.version_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_clear_cells_removes_selection() {
    let f = fixture().await;

    let a = placement::place_offering(&f.repo, f.version_id, f.lecture_a, 0, "09:00", "10:00", None)
        .await
        .unwrap();
    let b = placement::place_offering(&f.repo, f.version_id, f.lecture_b, 1, "09:00", "10:00", None)
        .await
        .unwrap();

    let removed = placement::clear_cells(&f.repo, f.version_id, &[a.id, b.id])
        .await
        .unwrap();
    assert_eq!(removed, 2);
    assert!(f.repo.events_for_version(f.version_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_event_room_success() {
    let f = fixture().await;

    let event =
        placement::place_offering(&f.repo, f.version_id, f.lecture_a, 0, "09:00", "10:00", None)
            .await
            .unwrap();

    placement::update_event_room(&f.repo, f.version_id, event.id, Some(f.room_2))
        .await
        .unwrap();

    let stored = f.repo.get_event(event.id).await.unwrap();
    assert_eq!(stored.room_id, Some(f.room_2));
    // Identity is preserved across the room change.
    assert_eq!(stored.id, event.id);
    assert_eq!(stored.offering_id, f.lecture_a);
}

#[tokio::test]
async fn test_update_event_room_revalidates_against_cell_mates() {
    let f = fixture().await;

    let event =
        placement::place_offering(&f.repo, f.version_id, f.lecture_a, 0, "09:00", "10:00", None)
            .await
            .unwrap();

    // Simulate the duplicate a racing editor could leave behind by writing
    // directly through the repository, bypassing the engine.
    f.repo
        .insert_event(&NewTimetableEvent {
            version_id: f.version_id,
            offering_id: f.lab,
            day_of_week: 0,
            start_time: t("09:00"),
            end_time: t("10:00"),
            room_id: Some(f.room_2),
        })
        .await
        .unwrap();

    let err = placement::update_event_room(&f.repo, f.version_id, event.id, Some(f.room_2))
        .await
        .unwrap_err();
    assert!(matches!(err, ScheduleError::RoomConflict { .. }));

    // The event keeps its previous room.
    assert_eq!(f.repo.get_event(event.id).await.unwrap().room_id, None);
}

#[tokio::test]
async fn test_update_event_room_rejects_foreign_version() {
    let f = fixture().await;

    let event =
        placement::place_offering(&f.repo, f.version_id, f.lecture_a, 0, "09:00", "10:00", None)
            .await
            .unwrap();

    let err = placement::update_event_room(&f.repo, VersionId(999), event.id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ScheduleError::VersionNotReady(_)));
}
