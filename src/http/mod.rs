//! Axum-based HTTP server for the timetable engine.
//!
//! # Modules
//!
//! - [`dto`]: Request/response types
//! - [`error`]: Error-to-status mapping and the JSON error body
//! - [`handlers`]: One handler per endpoint, delegating to the services
//! - [`router`]: Route table and middleware stack
//! - [`state`]: Shared application state

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::{ApiError, AppError};
pub use router::create_router;
pub use state::AppState;
