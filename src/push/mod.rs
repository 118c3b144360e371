//! Push delivery transport boundary.
//!
//! The engine consumes the push transport as an opaque service with two
//! operations: a single-recipient send that can fail, and a best-effort
//! multicast that never fails the whole batch for a per-token error.
//! Timeouts and retries are the transport's concern; the engine performs
//! zero retries of its own.

mod factory;
mod memory;

pub use factory::create_push_transport;
pub use memory::{MemoryPushTransport, SentPush};

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by a single-recipient send.
#[derive(Debug, Error)]
pub enum PushError {
    /// The transport rejected the message (bad token, expired token, ...).
    #[error("push rejected: {0}")]
    Rejected(String),

    /// The transport could not be reached.
    #[error("push transport unavailable: {0}")]
    Unavailable(String),
}

/// Outcome of a multicast send. Per-token failures are counted, never
/// propagated as errors.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct MulticastReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Abstraction over the push delivery transport.
#[async_trait]
pub trait PushTransport: Send + Sync {
    /// Send one push message to a single destination token.
    async fn send(
        &self,
        token: &str,
        title: &str,
        body: &str,
        data: &HashMap<String, String>,
    ) -> Result<(), PushError>;

    /// Send one push message to many destination tokens. Best-effort per
    /// recipient: a failing token does not abort the batch.
    async fn send_multicast(
        &self,
        tokens: &[String],
        title: &str,
        body: &str,
        data: &HashMap<String, String>,
    ) -> MulticastReport;
}
