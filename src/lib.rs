//! # Timegrid
//!
//! Timetable scheduling and versioning engine for institutional weekly
//! grids.
//!
//! This crate assigns course offerings (subject + faculty + room) into a
//! weekly grid of time slots per scheduling unit ("batch"), while keeping a
//! draft/published/archived version history and preventing double-booking
//! of rooms, faculty, and cells. The surrounding administrative layer
//! supplies reference data (offerings, rooms, faculty, subjects) and
//! consumes the scheduling results.
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`api`]: Identifier newtypes and read-model DTO types
//! - [`models`]: Period templates, versions, events, reference entities
//! - [`db`]: Repository pattern and persistence layer (in-memory and
//!   Postgres backends)
//! - [`services`]: Template store, version manager, conflict-checked
//!   placement engine, and grid read model
//! - [`http`]: Axum-based HTTP server and request handlers
//!
//! ## Invariants
//!
//! - At most one period template is active system-wide.
//! - Per batch: at most one draft and at most one published version.
//! - Per version: a `(day_of_week, start_time)` cell holds at most one
//!   event, and no two events in the same cell share a room or faculty.
//! - Event end times come from slot definitions, never from clients.

// Allow large error types - ScheduleError and RepositoryError carry rich
// context for actionable messages
#![allow(clippy::result_large_err)]

pub mod api;

pub mod db;
pub mod models;

pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
