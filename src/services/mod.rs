//! High-level business logic for the scheduling engine.
//!
//! These functions are repository-agnostic: they work with any
//! implementation of the repository traits and contain the sequencing logic
//! whose ordering the engine's invariants depend on (template activation,
//! the publish transition, delete-then-insert placement).

pub mod error;
pub mod grid;
pub mod placement;
pub mod templates;
pub mod versions;

pub use error::{ScheduleError, ScheduleResult};
