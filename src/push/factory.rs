//! Push transport backend factory

use std::sync::Arc;

use crate::config::PushConfig;

use super::memory::MemoryPushTransport;
use super::PushTransport;

/// Create a push transport backend based on configuration.
///
/// Only the in-process `"memory"` backend ships with this service; a real
/// delivery transport is consumed through the same [`PushTransport`] trait
/// by deployments that provide one. Unknown backend names fall back to
/// memory with a warning.
pub fn create_push_transport(settings: &PushConfig) -> Arc<dyn PushTransport> {
    match settings.backend.as_str() {
        "memory" => {
            tracing::info!(backend = "memory", "Creating in-memory push transport");
        }
        other => {
            tracing::warn!(
                backend = %other,
                "Unknown push transport backend, falling back to memory"
            );
        }
    }

    Arc::new(MemoryPushTransport::new())
}
