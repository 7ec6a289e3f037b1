//! Data Transfer Objects for the HTTP API.
//!
//! These DTOs are used for request/response serialization in the REST API.
//! The engine's own read-model types already derive Serialize/Deserialize
//! and are re-exported here.

use serde::{Deserialize, Serialize};

// Re-export existing DTOs that are already serializable
pub use crate::api::{
    EventView, GridCell, GridView, OfferingLoad, PublishOutcome, Workspace,
};
pub use crate::models::{CourseOffering, PeriodTemplate, Slot, SlotDraft, TimetableVersion};

/// Request body for creating a new period template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTemplateRequest {
    /// Name for the template
    pub name: String,
}

/// Request body for cloning an existing template.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CloneTemplateRequest {
    /// Name for the copy; defaults to the source template's name
    #[serde(default)]
    pub name: Option<String>,
}

/// Request body for replacing a template's slot list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaceSlotsRequest {
    /// The full slot list; the previous list is discarded
    pub slots: Vec<SlotDraft>,
}

/// Template list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateListResponse {
    pub templates: Vec<PeriodTemplate>,
    pub total: usize,
}

/// Request body for the publish transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishRequest {
    /// The draft to promote
    pub draft_version_id: i64,
}

/// Request body for placing an offering into a cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceEventRequest {
    pub offering_id: i64,
    /// 0 = Monday .. 5 = Saturday
    pub day_of_week: i16,
    /// `HH:MM` or `HH:MM:SS`
    pub start_time: String,
    /// `HH:MM` or `HH:MM:SS`; the committed end always comes from the slot
    pub end_time: String,
    #[serde(default)]
    pub room_id: Option<i64>,
}

/// Request body for reassigning an event's room.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateEventRoomRequest {
    #[serde(default)]
    pub room_id: Option<i64>,
}

/// Resolved event list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventListResponse {
    pub events: Vec<EventView>,
    pub total: usize,
}

/// Offering list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferingListResponse {
    pub offerings: Vec<CourseOffering>,
    pub total: usize,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Database connection status
    pub database: String,
}
