//! Template store tests: activation sequencing, slot-list rewrites, and
//! deletion rules.

use timegrid::db::repositories::LocalRepository;
use timegrid::db::repository::TemplateRepository;
use timegrid::models::SlotDraft;
use timegrid::services::{templates, ScheduleError};

fn slot(period: i32, start: &str, end: &str) -> SlotDraft {
    SlotDraft {
        period_number: Some(period),
        name: Some(format!("Period {}", period)),
        start_time: Some(start.to_string()),
        end_time: Some(end.to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_created_template_is_inactive_and_empty() {
    let repo = LocalRepository::new();
    let template = templates::create_template(&repo, "Morning Grid").await.unwrap();

    assert!(!template.is_active);
    assert!(template.slots.is_empty());
}

#[tokio::test]
async fn test_list_templates_newest_first() {
    let repo = LocalRepository::new();
    templates::create_template(&repo, "First").await.unwrap();
    templates::create_template(&repo, "Second").await.unwrap();
    templates::create_template(&repo, "Third").await.unwrap();

    let names: Vec<String> = templates::list_templates(&repo)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, vec!["Third", "Second", "First"]);
}

#[tokio::test]
async fn test_set_active_switches_exclusively() {
    let repo = LocalRepository::new();
    let a = templates::create_template(&repo, "A").await.unwrap();
    let b = templates::create_template(&repo, "B").await.unwrap();

    templates::set_active(&repo, a.id).await.unwrap();
    templates::set_active(&repo, b.id).await.unwrap();

    let listed = templates::list_templates(&repo).await.unwrap();
    let active: Vec<_> = listed.iter().filter(|t| t.is_active).collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, b.id);
}

#[tokio::test]
async fn test_set_active_unknown_template_changes_nothing() {
    let repo = LocalRepository::new();
    let a = templates::create_template(&repo, "A").await.unwrap();
    templates::set_active(&repo, a.id).await.unwrap();

    let err = templates::set_active(&repo, timegrid::api::TemplateId(99))
        .await
        .unwrap_err();
    assert!(matches!(err, ScheduleError::Store(_)));

    // The bad id was rejected before any deactivation ran.
    assert_eq!(
        repo.get_active_template().await.unwrap().map(|t| t.id),
        Some(a.id)
    );
}

#[tokio::test]
async fn test_replace_slots_normalizes_and_sorts() {
    let repo = LocalRepository::new();
    let template = templates::create_template(&repo, "Grid").await.unwrap();

    let stored = templates::replace_slots(
        &repo,
        template.id,
        vec![
            slot(2, "10:00", "11:00"),
            slot(1, "09:00", "10:00:00"),
        ],
    )
    .await
    .unwrap();

    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].period_number, 1);
    assert_eq!(stored[0].start_time.to_string(), "09:00:00");
    assert_eq!(stored[1].period_number, 2);

    let fetched = templates::get_template(&repo, template.id).await.unwrap();
    assert_eq!(fetched.slots, stored);
}

#[tokio::test]
async fn test_replace_slots_preserves_ids_across_edits() {
    let repo = LocalRepository::new();
    let template = templates::create_template(&repo, "Grid").await.unwrap();

    let first = templates::replace_slots(&repo, template.id, vec![slot(1, "09:00", "10:00")])
        .await
        .unwrap();
    let kept_id = first[0].id.clone();

    // Edit one field by rewriting the whole list, carrying the id through.
    let edited = templates::replace_slots(
        &repo,
        template.id,
        vec![SlotDraft {
            id: Some(kept_id.clone()),
            period_number: Some(1),
            name: Some("Opening Period".to_string()),
            start_time: Some("09:00".to_string()),
            end_time: Some("10:00".to_string()),
            is_break: false,
        }],
    )
    .await
    .unwrap();

    assert_eq!(edited[0].id, kept_id);
    assert_eq!(edited[0].name, "Opening Period");
}

#[tokio::test]
async fn test_delete_active_template_rejected() {
    let repo = LocalRepository::new();
    let template = templates::create_template(&repo, "Grid").await.unwrap();
    templates::set_active(&repo, template.id).await.unwrap();

    let err = templates::delete_template(&repo, template.id).await.unwrap_err();
    assert!(matches!(err, ScheduleError::TemplateActive { .. }));

    // Still present.
    assert!(templates::get_template(&repo, template.id).await.is_ok());
}

#[tokio::test]
async fn test_delete_inactive_template_succeeds() {
    let repo = LocalRepository::new();
    let keep = templates::create_template(&repo, "Keep").await.unwrap();
    let doomed = templates::create_template(&repo, "Doomed").await.unwrap();
    templates::set_active(&repo, keep.id).await.unwrap();

    templates::delete_template(&repo, doomed.id).await.unwrap();
    assert_eq!(templates::list_templates(&repo).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_clone_template_copies_slots_with_fresh_ids() {
    let repo = LocalRepository::new();
    let source = templates::create_template(&repo, "CS Sem 3").await.unwrap();
    templates::replace_slots(
        &repo,
        source.id,
        vec![slot(1, "09:00", "10:00"), slot(2, "10:00", "11:00")],
    )
    .await
    .unwrap();

    let copy = templates::clone_template(&repo, source.id, Some("ME Sem 3"))
        .await
        .unwrap();

    assert_eq!(copy.name, "ME Sem 3");
    assert!(!copy.is_active);
    assert_eq!(copy.slots.len(), 2);

    let source = templates::get_template(&repo, source.id).await.unwrap();
    for (theirs, ours) in source.slots.iter().zip(copy.slots.iter()) {
        assert_eq!(theirs.start_time, ours.start_time);
        assert_eq!(theirs.end_time, ours.end_time);
        assert_ne!(theirs.id, ours.id, "the copy owns its cell identities");
    }
}

#[tokio::test]
async fn test_active_slots_requires_active_nonempty_template() {
    let repo = LocalRepository::new();

    let err = templates::active_slots(&repo).await.unwrap_err();
    assert!(matches!(err, ScheduleError::NoActiveTemplate));

    let template = templates::create_template(&repo, "Grid").await.unwrap();
    templates::set_active(&repo, template.id).await.unwrap();

    let err = templates::active_slots(&repo).await.unwrap_err();
    assert!(matches!(err, ScheduleError::EmptyTemplate));

    templates::replace_slots(&repo, template.id, vec![slot(1, "09:00", "10:00")])
        .await
        .unwrap();
    assert_eq!(templates::active_slots(&repo).await.unwrap().len(), 1);
}
