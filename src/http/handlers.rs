//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the service
//! layer for business logic.

use axum::{
    extract::{Path, State},
    Json,
};

use super::dto::{
    CloneTemplateRequest, CreateTemplateRequest, EventListResponse, HealthResponse,
    OfferingListResponse, PlaceEventRequest, PublishRequest, ReplaceSlotsRequest,
    TemplateListResponse, UpdateEventRoomRequest,
};
use super::error::AppError;
use super::state::AppState;
use crate::api::{
    BatchId, EventId, OfferingId, PublishOutcome, RoomId, TemplateId, VersionId, Workspace,
};
use crate::db::repository::{ReferenceRepository, TemplateRepository};
use crate::models::{PeriodTemplate, Slot, TimetableEvent};
use crate::services::{grid, placement, templates, versions};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and the store is
/// accessible.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match state.repository.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Period Templates
// =============================================================================

/// GET /v1/templates
pub async fn list_templates(State(state): State<AppState>) -> HandlerResult<TemplateListResponse> {
    let templates = templates::list_templates(state.repository.as_ref()).await?;
    let total = templates.len();
    Ok(Json(TemplateListResponse { templates, total }))
}

/// POST /v1/templates
pub async fn create_template(
    State(state): State<AppState>,
    Json(request): Json<CreateTemplateRequest>,
) -> HandlerResult<PeriodTemplate> {
    if request.name.trim().is_empty() {
        return Err(AppError::BadRequest("template name is required".to_string()));
    }
    let template =
        templates::create_template(state.repository.as_ref(), request.name.trim()).await?;
    Ok(Json(template))
}

/// POST /v1/templates/{template_id}/clone
pub async fn clone_template(
    State(state): State<AppState>,
    Path(template_id): Path<i64>,
    Json(request): Json<CloneTemplateRequest>,
) -> HandlerResult<PeriodTemplate> {
    let template = templates::clone_template(
        state.repository.as_ref(),
        TemplateId::new(template_id),
        request.name.as_deref(),
    )
    .await?;
    Ok(Json(template))
}

/// POST /v1/templates/{template_id}/activate
pub async fn activate_template(
    State(state): State<AppState>,
    Path(template_id): Path<i64>,
) -> HandlerResult<PeriodTemplate> {
    let id = TemplateId::new(template_id);
    templates::set_active(state.repository.as_ref(), id).await?;
    let template = templates::get_template(state.repository.as_ref(), id).await?;
    Ok(Json(template))
}

/// PUT /v1/templates/{template_id}/slots
pub async fn replace_template_slots(
    State(state): State<AppState>,
    Path(template_id): Path<i64>,
    Json(request): Json<ReplaceSlotsRequest>,
) -> HandlerResult<Vec<Slot>> {
    let slots = templates::replace_slots(
        state.repository.as_ref(),
        TemplateId::new(template_id),
        request.slots,
    )
    .await?;
    Ok(Json(slots))
}

/// DELETE /v1/templates/{template_id}
pub async fn delete_template(
    State(state): State<AppState>,
    Path(template_id): Path<i64>,
) -> Result<axum::http::StatusCode, AppError> {
    templates::delete_template(state.repository.as_ref(), TemplateId::new(template_id)).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

// =============================================================================
// Batch Workspace & Publish
// =============================================================================

/// GET /v1/batches/{batch_id}/workspace
///
/// Returns the batch's draft (created lazily on first access) and its
/// published version, if any.
pub async fn get_workspace(
    State(state): State<AppState>,
    Path(batch_id): Path<i64>,
) -> HandlerResult<Workspace> {
    let workspace = versions::workspace(state.repository.as_ref(), BatchId::new(batch_id)).await?;
    Ok(Json(workspace))
}

/// POST /v1/batches/{batch_id}/publish
pub async fn publish_draft(
    State(state): State<AppState>,
    Path(batch_id): Path<i64>,
    Json(request): Json<PublishRequest>,
) -> HandlerResult<PublishOutcome> {
    let outcome = versions::publish(
        state.repository.as_ref(),
        BatchId::new(batch_id),
        VersionId::new(request.draft_version_id),
    )
    .await?;
    Ok(Json(outcome))
}

/// GET /v1/batches/{batch_id}/offerings
pub async fn list_offerings(
    State(state): State<AppState>,
    Path(batch_id): Path<i64>,
) -> HandlerResult<OfferingListResponse> {
    let offerings = state
        .repository
        .offerings_for_batch(BatchId::new(batch_id))
        .await?;
    let total = offerings.len();
    Ok(Json(OfferingListResponse { offerings, total }))
}

// =============================================================================
// Events
// =============================================================================

/// GET /v1/versions/{version_id}/events
pub async fn list_events(
    State(state): State<AppState>,
    Path(version_id): Path<i64>,
) -> HandlerResult<EventListResponse> {
    let events =
        grid::resolved_events(state.repository.as_ref(), VersionId::new(version_id)).await?;
    let total = events.len();
    Ok(Json(EventListResponse { events, total }))
}

/// GET /v1/versions/{version_id}/grid
pub async fn get_grid(
    State(state): State<AppState>,
    Path(version_id): Path<i64>,
) -> HandlerResult<crate::api::GridView> {
    let view = grid::grid_for_version(state.repository.as_ref(), VersionId::new(version_id)).await?;
    Ok(Json(view))
}

/// POST /v1/versions/{version_id}/events
///
/// Place an offering into a cell; replaces whatever occupied the cell.
pub async fn place_event(
    State(state): State<AppState>,
    Path(version_id): Path<i64>,
    Json(request): Json<PlaceEventRequest>,
) -> Result<(axum::http::StatusCode, Json<TimetableEvent>), AppError> {
    let event = placement::place_offering(
        state.repository.as_ref(),
        VersionId::new(version_id),
        OfferingId::new(request.offering_id),
        request.day_of_week,
        &request.start_time,
        &request.end_time,
        request.room_id.map(RoomId::new),
    )
    .await?;
    Ok((axum::http::StatusCode::CREATED, Json(event)))
}

/// DELETE /v1/versions/{version_id}/events/{event_id}
pub async fn delete_event(
    State(state): State<AppState>,
    Path((version_id, event_id)): Path<(i64, i64)>,
) -> Result<axum::http::StatusCode, AppError> {
    placement::delete_event(
        state.repository.as_ref(),
        VersionId::new(version_id),
        EventId::new(event_id),
    )
    .await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

/// PUT /v1/versions/{version_id}/events/{event_id}/room
pub async fn update_event_room(
    State(state): State<AppState>,
    Path((version_id, event_id)): Path<(i64, i64)>,
    Json(request): Json<UpdateEventRoomRequest>,
) -> Result<axum::http::StatusCode, AppError> {
    placement::update_event_room(
        state.repository.as_ref(),
        VersionId::new(version_id),
        EventId::new(event_id),
        request.room_id.map(RoomId::new),
    )
    .await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}
