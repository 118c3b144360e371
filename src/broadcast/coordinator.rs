use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::config::BroadcastConfig;
use crate::directory::ParticipantDirectory;
use crate::geo;
use crate::metrics;
use crate::push::PushTransport;
use crate::store::{BloodType, DocumentStore};

const EMERGENCY_TITLE: &str = "Emergency Blood Request!";

/// Why a broadcast run stopped before any send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Only registered donors may originate emergency requests; the
    /// requester has no donor profile.
    RequesterNotDonor,
    /// The requester's donor profile has no usable coordinates.
    RequesterLocationUnknown,
    /// No available donor of the requested type is within the radius.
    NoEligibleDonors,
    /// Eligible donors exist but none has a registered push token.
    NoTokensResolved,
    /// A document store query failed mid-pipeline.
    StoreUnavailable,
}

impl SkipReason {
    fn as_str(&self) -> &'static str {
        match self {
            SkipReason::RequesterNotDonor => "requester_not_donor",
            SkipReason::RequesterLocationUnknown => "requester_location_unknown",
            SkipReason::NoEligibleDonors => "no_eligible_donors",
            SkipReason::NoTokensResolved => "no_tokens_resolved",
            SkipReason::StoreUnavailable => "store_unavailable",
        }
    }
}

/// Structured outcome of one broadcast run.
///
/// The HTTP caller never sees a failure; this report is what distinguishes
/// "no eligible donors" from "transport trouble" in logs and stats.
#[derive(Debug, Clone, Serialize)]
pub struct BroadcastReport {
    /// Donors matching blood type and availability, before distance filtering
    pub candidates: usize,
    /// Candidates with coordinates inside the radius
    pub eligible: usize,
    /// Push tokens resolved for eligible donors
    pub tokens_resolved: usize,
    /// Per-recipient multicast deliveries
    pub delivered: usize,
    /// Per-recipient multicast failures
    pub failed: usize,
    /// Set when the run stopped before the multicast
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<SkipReason>,
}

impl BroadcastReport {
    fn skipped(reason: SkipReason) -> Self {
        Self {
            candidates: 0,
            eligible: 0,
            tokens_resolved: 0,
            delivered: 0,
            failed: 0,
            skipped: Some(reason),
        }
    }
}

/// Orchestrates the emergency fan-out pipeline.
///
/// Broadcast sends are intentionally not recorded as notification events;
/// only targeted dispatches are persisted.
pub struct EmergencyBroadcaster {
    store: Arc<dyn DocumentStore>,
    directory: Arc<ParticipantDirectory>,
    transport: Arc<dyn PushTransport>,
    radius_meters: f64,
}

impl EmergencyBroadcaster {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        directory: Arc<ParticipantDirectory>,
        transport: Arc<dyn PushTransport>,
        config: &BroadcastConfig,
    ) -> Self {
        Self {
            store,
            directory,
            transport,
            radius_meters: config.radius_meters,
        }
    }

    /// Run one emergency broadcast.
    ///
    /// Never returns an error: every internal failure is logged and folded
    /// into the report. Once started, the run goes to completion; there is
    /// no cancellation and no retry.
    #[tracing::instrument(
        name = "broadcast.emergency",
        skip(self),
        fields(requester_id = %requester_id, blood_type = %blood_type)
    )]
    pub async fn broadcast_emergency(
        &self,
        requester_id: &str,
        blood_type: BloodType,
    ) -> BroadcastReport {
        metrics::BROADCASTS_TOTAL.inc();

        let report = self.run(requester_id, blood_type).await;

        if let Some(reason) = report.skipped {
            metrics::BROADCASTS_SKIPPED_TOTAL
                .with_label_values(&[reason.as_str()])
                .inc();
            tracing::info!(
                reason = reason.as_str(),
                candidates = report.candidates,
                eligible = report.eligible,
                "Emergency broadcast skipped"
            );
        } else {
            metrics::BROADCAST_DELIVERED_TOTAL.inc_by(report.delivered as u64);
            metrics::BROADCAST_FAILED_TOTAL.inc_by(report.failed as u64);
            tracing::info!(
                candidates = report.candidates,
                eligible = report.eligible,
                tokens_resolved = report.tokens_resolved,
                delivered = report.delivered,
                failed = report.failed,
                "Emergency broadcast completed"
            );
        }

        report
    }

    async fn run(&self, requester_id: &str, blood_type: BloodType) -> BroadcastReport {
        // Step 1: the requester's own donor profile provides the origin
        // coordinates. A requester without one cannot originate an
        // emergency request.
        let requester = match self.store.find_donor(requester_id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                tracing::warn!(requester_id = %requester_id, "Requester is not a registered donor");
                return BroadcastReport::skipped(SkipReason::RequesterNotDonor);
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load requester profile");
                return BroadcastReport::skipped(SkipReason::StoreUnavailable);
            }
        };

        let Some((origin_lat, origin_lon)) = requester.coordinates() else {
            tracing::warn!(requester_id = %requester_id, "Requester profile has no coordinates");
            return BroadcastReport::skipped(SkipReason::RequesterLocationUnknown);
        };

        // Step 2: candidate pool, filtered by blood type and availability
        // at the store.
        let candidates = match self.store.find_available_donors(blood_type).await {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::error!(error = %e, "Failed to query candidate donors");
                return BroadcastReport::skipped(SkipReason::StoreUnavailable);
            }
        };
        let candidate_count = candidates.len();

        // Step 3: distance filter. Candidates missing either coordinate
        // are excluded outright; a null or empty donor id is discarded.
        let eligible_ids: Vec<String> = candidates
            .into_iter()
            .filter_map(|donor| {
                let (lat, lon) = donor.coordinates()?;
                if !geo::within_radius(origin_lat, origin_lon, lat, lon, self.radius_meters) {
                    return None;
                }
                if donor.donor_id.is_empty() {
                    return None;
                }
                Some(donor.donor_id)
            })
            .collect();

        tracing::debug!(
            candidates = candidate_count,
            eligible = eligible_ids.len(),
            radius_meters = self.radius_meters,
            "Distance filter applied"
        );

        if eligible_ids.is_empty() {
            let mut report = BroadcastReport::skipped(SkipReason::NoEligibleDonors);
            report.candidates = candidate_count;
            return report;
        }

        // Step 4: batched token resolution. Tokenless accounts are logged
        // inside the directory, not failed.
        let tokens = match self.directory.resolve_tokens(&eligible_ids).await {
            Ok(tokens) => tokens,
            Err(e) => {
                tracing::error!(error = %e, "Failed to resolve push tokens");
                let mut report = BroadcastReport::skipped(SkipReason::StoreUnavailable);
                report.candidates = candidate_count;
                report.eligible = eligible_ids.len();
                return report;
            }
        };

        if tokens.is_empty() {
            let mut report = BroadcastReport::skipped(SkipReason::NoTokensResolved);
            report.candidates = candidate_count;
            report.eligible = eligible_ids.len();
            return report;
        }

        // Step 5: best-effort multicast. Per-token failures are counted by
        // the transport and never abort the batch. Broadcast sends are not
        // persisted as notification events.
        let body = format!("Urgent need for {} blood near your location.", blood_type);
        let data = HashMap::from([
            ("latitude".to_string(), origin_lat.to_string()),
            ("longitude".to_string(), origin_lon.to_string()),
            ("bloodType".to_string(), blood_type.to_string()),
            ("type".to_string(), "emergency".to_string()),
        ]);

        let multicast = self
            .transport
            .send_multicast(&tokens, EMERGENCY_TITLE, &body, &data)
            .await;

        BroadcastReport {
            candidates: candidate_count,
            eligible: eligible_ids.len(),
            tokens_resolved: tokens.len(),
            delivered: multicast.delivered,
            failed: multicast.failed,
            skipped: None,
        }
    }
}
