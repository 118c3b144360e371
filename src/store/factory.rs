//! Document store backend factory

use std::sync::Arc;

use crate::config::StoreConfig;

use super::memory::MemoryDocumentStore;
use super::DocumentStore;

/// Create a document store backend based on configuration.
///
/// Only the in-process `"memory"` backend ships with this service; a hosted
/// document store is consumed through the same [`DocumentStore`] trait by
/// deployments that provide one. Unknown backend names fall back to memory
/// with a warning.
pub fn create_document_store(settings: &StoreConfig) -> Arc<dyn DocumentStore> {
    match settings.backend.as_str() {
        "memory" => {
            tracing::info!(
                backend = "memory",
                membership_query_cap = settings.membership_query_cap,
                "Creating in-memory document store"
            );
        }
        other => {
            tracing::warn!(
                backend = %other,
                "Unknown document store backend, falling back to memory"
            );
        }
    }

    Arc::new(MemoryDocumentStore::with_membership_cap(
        settings.membership_query_cap,
    ))
}
