//! Period template model: the ordered set of teaching periods and breaks
//! that defines the weekly grid.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::time::{TimeOfDay, TimeParseError};
use crate::api::TemplateId;

/// One row of a period template: a teaching period or a break.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    /// Stable identifier, preserved across slot-list rewrites so grid cells
    /// keep their identity in the UI.
    pub id: String,
    /// Defines display and lookup order.
    pub period_number: i32,
    pub name: String,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub is_break: bool,
}

/// A named, ordered collection of slots. At most one template is active
/// system-wide at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodTemplate {
    pub id: TemplateId,
    pub name: String,
    pub is_active: bool,
    pub slots: Vec<Slot>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Loosely-typed slot as submitted by a client. Every field except
/// `is_break` may be missing; [`normalize_slots`] fills in the defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlotDraft {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub period_number: Option<i32>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub is_break: bool,
}

/// Generate a process-wide-unique slot id.
pub fn new_slot_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Validate and coerce a submitted slot list into canonical form.
///
/// Missing period numbers fall back to the list position, missing names to
/// `Period N`, missing times to a 09:00-10:00 default hour. Existing ids are
/// preserved; new slots get a fresh id. The result is sorted by
/// `period_number`.
pub fn normalize_slots(drafts: Vec<SlotDraft>) -> Result<Vec<Slot>, TimeParseError> {
    let mut slots = Vec::with_capacity(drafts.len());
    for (idx, draft) in drafts.into_iter().enumerate() {
        let start_raw = draft.start_time.unwrap_or_else(|| "09:00:00".to_string());
        let end_raw = draft.end_time.unwrap_or_else(|| "10:00:00".to_string());
        slots.push(Slot {
            id: draft.id.filter(|id| !id.is_empty()).unwrap_or_else(new_slot_id),
            period_number: draft.period_number.unwrap_or(idx as i32 + 1),
            name: draft
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| format!("Period {}", idx + 1)),
            start_time: TimeOfDay::parse(&start_raw)?,
            end_time: TimeOfDay::parse(&end_raw)?,
            is_break: draft.is_break,
        });
    }
    slots.sort_by_key(|s| s.period_number);
    Ok(slots)
}

/// Find the slot whose start time matches the given canonical time.
pub fn slot_at_start(slots: &[Slot], start: TimeOfDay) -> Option<&Slot> {
    slots.iter().find(|s| s.start_time == start)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(period: i32, start: &str, end: &str) -> SlotDraft {
        SlotDraft {
            period_number: Some(period),
            start_time: Some(start.to_string()),
            end_time: Some(end.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_normalize_fills_defaults() {
        let slots = normalize_slots(vec![SlotDraft::default()]).unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].period_number, 1);
        assert_eq!(slots[0].name, "Period 1");
        assert_eq!(slots[0].start_time.to_string(), "09:00:00");
        assert_eq!(slots[0].end_time.to_string(), "10:00:00");
        assert!(!slots[0].is_break);
        assert!(!slots[0].id.is_empty());
    }

    #[test]
    fn test_normalize_sorts_by_period_number() {
        let slots = normalize_slots(vec![
            draft(3, "11:00", "12:00"),
            draft(1, "09:00", "10:00"),
            draft(2, "10:00", "11:00"),
        ])
        .unwrap();
        let numbers: Vec<i32> = slots.iter().map(|s| s.period_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_normalize_canonicalizes_times() {
        let slots = normalize_slots(vec![draft(1, "09:00", "10:00:00")]).unwrap();
        assert_eq!(slots[0].start_time.to_string(), "09:00:00");
        assert_eq!(slots[0].end_time.to_string(), "10:00:00");
    }

    #[test]
    fn test_normalize_preserves_existing_ids() {
        let mut d = draft(1, "09:00", "10:00");
        d.id = Some("slot-a".to_string());
        let slots = normalize_slots(vec![d]).unwrap();
        assert_eq!(slots[0].id, "slot-a");
    }

    #[test]
    fn test_normalize_rejects_bad_time() {
        let mut d = draft(1, "09:00", "10:00");
        d.start_time = Some("later".to_string());
        assert!(normalize_slots(vec![d]).is_err());
    }

    #[test]
    fn test_slot_at_start_uses_canonical_equality() {
        let slots = normalize_slots(vec![draft(1, "09:00", "10:00")]).unwrap();
        let probe = TimeOfDay::parse("09:00:00").unwrap();
        assert!(slot_at_start(&slots, probe).is_some());
    }

    #[test]
    fn test_new_slot_ids_are_unique() {
        assert_ne!(new_slot_id(), new_slot_id());
    }
}
