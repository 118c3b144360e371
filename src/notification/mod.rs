//! Targeted notification dispatch.
//!
//! One push message to one resolved destination, followed by durable
//! persistence of the notification event. Persistence is gated strictly
//! behind confirmed delivery: a stored event implies the transport
//! accepted the push.

mod dispatcher;
mod types;

pub use dispatcher::{DispatcherStats, DispatcherStatsSnapshot, NotificationDispatcher};
pub use types::{DispatchError, DispatchReceipt};
