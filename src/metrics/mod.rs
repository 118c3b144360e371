//! Prometheus metrics for the notification service.
//!
//! Counters cover the two delivery paths:
//! - targeted dispatch (sent, rejected, delivery failures, events persisted)
//! - emergency broadcast (runs, skips, per-recipient delivery outcomes)

use lazy_static::lazy_static;
use prometheus::{
    register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec,
    TextEncoder,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "bloodlink";

lazy_static! {
    /// Targeted notifications accepted by the push transport
    pub static ref DISPATCH_SENT_TOTAL: IntCounter = register_int_counter!(
        format!("{}_dispatch_sent_total", METRIC_PREFIX),
        "Targeted notifications accepted by the push transport"
    ).unwrap();

    /// Targeted dispatches rejected before any send, by error kind
    pub static ref DISPATCH_REJECTED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_dispatch_rejected_total", METRIC_PREFIX),
        "Targeted dispatches that failed, by error kind",
        &["kind"]
    ).unwrap();

    /// Notification events durably persisted
    pub static ref EVENTS_PERSISTED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_events_persisted_total", METRIC_PREFIX),
        "Notification events durably persisted"
    ).unwrap();

    /// Emergency broadcast runs
    pub static ref BROADCASTS_TOTAL: IntCounter = register_int_counter!(
        format!("{}_broadcasts_total", METRIC_PREFIX),
        "Emergency broadcast runs"
    ).unwrap();

    /// Emergency broadcasts that stopped before any send, by reason
    pub static ref BROADCASTS_SKIPPED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_broadcasts_skipped_total", METRIC_PREFIX),
        "Emergency broadcasts that stopped before any send, by reason",
        &["reason"]
    ).unwrap();

    /// Per-recipient multicast deliveries during emergency broadcasts
    pub static ref BROADCAST_DELIVERED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_broadcast_delivered_total", METRIC_PREFIX),
        "Per-recipient multicast deliveries during emergency broadcasts"
    ).unwrap();

    /// Per-recipient multicast failures during emergency broadcasts
    pub static ref BROADCAST_FAILED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_broadcast_failed_total", METRIC_PREFIX),
        "Per-recipient multicast failures during emergency broadcasts"
    ).unwrap();
}

/// Encode all registered metrics in the Prometheus text format.
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_metrics() {
        DISPATCH_SENT_TOTAL.inc();
        let output = encode_metrics().unwrap();
        assert!(output.contains("bloodlink_dispatch_sent_total"));
    }
}
