//! Period template store: the canonical ordered set of time slots used to
//! render the grid and validate placements.
//!
//! Exactly one template is meant to be active system-wide. Activation is a
//! deactivate-all-then-activate-one sequence of two distinct writes; if the
//! second write fails the system is left with zero active templates, which
//! placement reports as [`ScheduleError::NoActiveTemplate`] rather than
//! crashing.

use log::{info, warn};

use super::error::{ScheduleError, ScheduleResult};
use crate::api::TemplateId;
use crate::db::repository::FullRepository;
use crate::models::{normalize_slots, PeriodTemplate, Slot, SlotDraft};

/// List all templates, newest first. No side effects.
pub async fn list_templates<R: FullRepository + ?Sized>(repo: &R) -> ScheduleResult<Vec<PeriodTemplate>> {
    Ok(repo.list_templates().await?)
}

/// Fetch one template.
pub async fn get_template<R: FullRepository + ?Sized>(
    repo: &R,
    template_id: TemplateId,
) -> ScheduleResult<PeriodTemplate> {
    Ok(repo.get_template(template_id).await?)
}

/// Create a new, inactive template with an empty slot list.
pub async fn create_template<R: FullRepository + ?Sized>(
    repo: &R,
    name: &str,
) -> ScheduleResult<PeriodTemplate> {
    info!("creating period template '{}'", name);
    Ok(repo.create_template(name, &[]).await?)
}

/// Copy an existing template's slots into a new inactive template.
///
/// Slot ids are regenerated so the copy gets its own grid-cell identities.
pub async fn clone_template<R: FullRepository + ?Sized>(
    repo: &R,
    source_id: TemplateId,
    name: Option<&str>,
) -> ScheduleResult<PeriodTemplate> {
    let source = repo.get_template(source_id).await?;
    let drafts: Vec<SlotDraft> = source
        .slots
        .iter()
        .map(|s| SlotDraft {
            id: None,
            period_number: Some(s.period_number),
            name: Some(s.name.clone()),
            start_time: Some(s.start_time.to_string()),
            end_time: Some(s.end_time.to_string()),
            is_break: s.is_break,
        })
        .collect();
    let slots = normalize_slots(drafts)?;
    let new_name = name.unwrap_or(&source.name);
    info!(
        "cloning template '{}' ({} slots) into '{}'",
        source.name,
        slots.len(),
        new_name
    );
    Ok(repo.create_template(new_name, &slots).await?)
}

/// Make one template the active grid, deactivating every other template.
///
/// The two writes are issued in order; a failure after the first leaves no
/// active template, so callers must treat that state as "no schedulable
/// grid" until activation is retried.
pub async fn set_active<R: FullRepository + ?Sized>(repo: &R, template_id: TemplateId) -> ScheduleResult<()> {
    // Fail early on a bad id so we never deactivate everything for nothing.
    let template = repo.get_template(template_id).await?;

    let cleared = repo.deactivate_all_templates().await?;
    if let Err(e) = repo.activate_template(template_id).await {
        warn!(
            "activation of template {} failed after deactivating {} templates; no template is active",
            template_id, cleared
        );
        return Err(e.into());
    }
    info!("template '{}' is now active", template.name);
    Ok(())
}

/// Validate, coerce, sort, and store a full slot list.
///
/// Every slot edit goes through this path: read the current list, apply one
/// change, rewrite the whole list. Slot ids survive the rewrite so the UI
/// keeps stable cell identities.
pub async fn replace_slots<R: FullRepository + ?Sized>(
    repo: &R,
    template_id: TemplateId,
    drafts: Vec<SlotDraft>,
) -> ScheduleResult<Vec<Slot>> {
    let slots = normalize_slots(drafts)?;
    repo.replace_template_slots(template_id, &slots).await?;
    Ok(slots)
}

/// Delete a template. Rejected while the template is active.
pub async fn delete_template<R: FullRepository + ?Sized>(
    repo: &R,
    template_id: TemplateId,
) -> ScheduleResult<()> {
    let template = repo.get_template(template_id).await?;
    if template.is_active {
        return Err(ScheduleError::TemplateActive {
            name: template.name,
        });
    }
    repo.delete_template(template_id).await?;
    info!("deleted template '{}'", template.name);
    Ok(())
}

/// The active template's slots, ready for placement validation.
///
/// # Errors
/// * [`ScheduleError::NoActiveTemplate`] when no template is active
/// * [`ScheduleError::EmptyTemplate`] when the active template has no slots
pub async fn active_slots<R: FullRepository + ?Sized>(repo: &R) -> ScheduleResult<Vec<Slot>> {
    let template = repo
        .get_active_template()
        .await?
        .ok_or(ScheduleError::NoActiveTemplate)?;
    if template.slots.is_empty() {
        return Err(ScheduleError::EmptyTemplate);
    }
    Ok(template.slots)
}
