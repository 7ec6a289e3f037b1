//! Period template repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::TemplateId;
use crate::models::{PeriodTemplate, Slot};

/// Repository trait for period template storage.
///
/// Templates are mutated wholesale: a slot edit reads the current list,
/// applies one change, and rewrites the entire list. The "active" flag is
/// manipulated through the deactivate-all / activate-one pair so the service
/// layer controls the ordering of the two writes.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait TemplateRepository: Send + Sync {
    /// Check if the backing store is reachable and healthy.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// List all templates, newest first.
    async fn list_templates(&self) -> RepositoryResult<Vec<PeriodTemplate>>;

    /// Fetch a single template.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` if the template doesn't exist
    async fn get_template(&self, template_id: TemplateId) -> RepositoryResult<PeriodTemplate>;

    /// The single active template, if any.
    ///
    /// When concurrent writers have produced more than one active row, the
    /// most recently updated one wins.
    async fn get_active_template(&self) -> RepositoryResult<Option<PeriodTemplate>>;

    /// Create a template with the given name and slot list, inactive.
    async fn create_template(&self, name: &str, slots: &[Slot])
        -> RepositoryResult<PeriodTemplate>;

    /// Replace the full slot list of a template.
    async fn replace_template_slots(
        &self,
        template_id: TemplateId,
        slots: &[Slot],
    ) -> RepositoryResult<()>;

    /// Clear the active flag on every template.
    ///
    /// # Returns
    /// Number of rows that were active before the call.
    async fn deactivate_all_templates(&self) -> RepositoryResult<usize>;

    /// Set the active flag on one template.
    async fn activate_template(&self, template_id: TemplateId) -> RepositoryResult<()>;

    /// Delete a template row.
    ///
    /// The store performs no active-flag check; the service layer rejects
    /// deletion of the active template before calling this.
    ///
    /// # Returns
    /// Number of rows removed (0 or 1).
    async fn delete_template(&self, template_id: TemplateId) -> RepositoryResult<usize>;
}
