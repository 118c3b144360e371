//! Emergency geo-broadcast.
//!
//! Resolves the requester's location, filters the donor population by
//! blood type and proximity, resolves push tokens in batches, and sends a
//! best-effort multicast. Fire-and-forget: no failure surfaces to the
//! caller; the pipeline instead returns a structured report for logging
//! and observability.

mod coordinator;

pub use coordinator::{BroadcastReport, EmergencyBroadcaster, SkipReason};
