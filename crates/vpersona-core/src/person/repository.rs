//! Virtual person repository trait.
//!
//! Defines the persistence adapter used by the generation pipeline.

use super::model::VirtualPerson;
use crate::error::Result;

/// An abstract repository for virtual persons.
///
/// Decouples the pipeline from the concrete data-access service (a REST
/// service, local JSON files, or an in-memory fake in tests). The adapter is
/// the system of record once `create` returns.
#[async_trait::async_trait]
pub trait VirtualPersonRepository: Send + Sync {
    /// Finds the persons of `project_id` whose encoded name is in `encoded_names`.
    ///
    /// Returns every match without pagination.
    async fn find_by_encoded_names(
        &self,
        project_id: &str,
        encoded_names: &[String],
    ) -> Result<Vec<VirtualPerson>>;

    /// Stores a new person and returns it with its storage identifier set.
    async fn create(&self, person: &VirtualPerson) -> Result<VirtualPerson>;

    /// Replaces the stored fields of person `id` and returns the stored record.
    async fn patch(&self, id: &str, person: &VirtualPerson) -> Result<VirtualPerson>;
}
