//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - permissive for development, should be restricted
    // in production
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the API router with versioned endpoints
    let api_v1 = Router::new()
        // Period templates
        .route("/templates", get(handlers::list_templates))
        .route("/templates", post(handlers::create_template))
        .route("/templates/{template_id}", delete(handlers::delete_template))
        .route("/templates/{template_id}/slots", put(handlers::replace_template_slots))
        .route("/templates/{template_id}/activate", post(handlers::activate_template))
        .route("/templates/{template_id}/clone", post(handlers::clone_template))
        // Batch workspace
        .route("/batches/{batch_id}/workspace", get(handlers::get_workspace))
        .route("/batches/{batch_id}/publish", post(handlers::publish_draft))
        .route("/batches/{batch_id}/offerings", get(handlers::list_offerings))
        // Events
        .route("/versions/{version_id}/events", get(handlers::list_events))
        .route("/versions/{version_id}/events", post(handlers::place_event))
        .route("/versions/{version_id}/grid", get(handlers::get_grid))
        .route(
            "/versions/{version_id}/events/{event_id}",
            delete(handlers::delete_event),
        )
        .route(
            "/versions/{version_id}/events/{event_id}/room",
            put(handlers::update_event_room),
        );

    // Combine all routes
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
