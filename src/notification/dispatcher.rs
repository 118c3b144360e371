use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::directory::{ParticipantDirectory, RecipientKind};
use crate::metrics;
use crate::push::PushTransport;
use crate::store::{DocumentStore, NewNotification, ParticipantKind};

use super::types::{default_body, default_title, DispatchError, DispatchReceipt};

/// Statistics for the notification dispatcher
#[derive(Debug, Default)]
pub struct DispatcherStats {
    /// Dispatches that completed send and persistence
    pub total_dispatched: AtomicU64,
    /// Dispatches that failed at any step
    pub total_rejected: AtomicU64,
    /// Subset of rejections caused by the push transport
    pub delivery_failures: AtomicU64,
}

impl DispatcherStats {
    pub fn snapshot(&self) -> DispatcherStatsSnapshot {
        DispatcherStatsSnapshot {
            total_dispatched: self.total_dispatched.load(Ordering::Relaxed),
            total_rejected: self.total_rejected.load(Ordering::Relaxed),
            delivery_failures: self.delivery_failures.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of dispatcher statistics
#[derive(Debug, Clone, Serialize)]
pub struct DispatcherStatsSnapshot {
    pub total_dispatched: u64,
    pub total_rejected: u64,
    pub delivery_failures: u64,
}

/// Sends one targeted push message and records the outcome as a durable
/// notification event.
///
/// The ordering invariant of this component: the event is appended only
/// after the transport has accepted the push, so a stored event always
/// implies an accepted delivery. There is no rollback in the other
/// direction; a crash between send and append leaves a delivered but
/// unrecorded notification, which is an accepted risk.
pub struct NotificationDispatcher {
    store: Arc<dyn DocumentStore>,
    directory: Arc<ParticipantDirectory>,
    transport: Arc<dyn PushTransport>,
    stats: DispatcherStats,
}

impl NotificationDispatcher {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        directory: Arc<ParticipantDirectory>,
        transport: Arc<dyn PushTransport>,
    ) -> Self {
        Self {
            store,
            directory,
            transport,
            stats: DispatcherStats::default(),
        }
    }

    /// Get dispatcher statistics
    pub fn stats(&self) -> DispatcherStatsSnapshot {
        self.stats.snapshot()
    }

    /// Dispatch a targeted notification.
    ///
    /// Steps run strictly in order with no rollback on partial failure:
    /// validate inputs, resolve recipient context, resolve the push token,
    /// send, and only then persist the notification event.
    #[tracing::instrument(
        name = "dispatcher.dispatch",
        skip(self, title, body),
        fields(recipient_id = %recipient_id, sender_id = %sender_id)
    )]
    pub async fn dispatch(
        &self,
        kind: RecipientKind,
        recipient_id: &str,
        sender_id: &str,
        title: &str,
        body: &str,
    ) -> Result<DispatchReceipt, DispatchError> {
        let result = self
            .dispatch_inner(kind, recipient_id, sender_id, title, body)
            .await;

        match &result {
            Ok(receipt) => {
                self.stats.total_dispatched.fetch_add(1, Ordering::Relaxed);
                metrics::DISPATCH_SENT_TOTAL.inc();
                metrics::EVENTS_PERSISTED_TOTAL.inc();
                tracing::info!(
                    notification_id = %receipt.notification_id,
                    recipient_id = %recipient_id,
                    "Notification sent and stored"
                );
            }
            Err(e) => {
                self.stats.total_rejected.fetch_add(1, Ordering::Relaxed);
                if matches!(e, DispatchError::DeliveryFailed(_)) {
                    self.stats.delivery_failures.fetch_add(1, Ordering::Relaxed);
                }
                metrics::DISPATCH_REJECTED_TOTAL
                    .with_label_values(&[e.kind()])
                    .inc();
                tracing::warn!(
                    recipient_id = %recipient_id,
                    error = %e,
                    kind = e.kind(),
                    "Dispatch failed"
                );
            }
        }

        result
    }

    async fn dispatch_inner(
        &self,
        kind: RecipientKind,
        recipient_id: &str,
        sender_id: &str,
        title: &str,
        body: &str,
    ) -> Result<DispatchReceipt, DispatchError> {
        // Step 1: all four string inputs must be non-empty.
        if recipient_id.is_empty() {
            return Err(DispatchError::InvalidInput("recipientId"));
        }
        if sender_id.is_empty() {
            return Err(DispatchError::InvalidInput("senderId"));
        }
        if title.is_empty() {
            return Err(DispatchError::InvalidInput("title"));
        }
        if body.is_empty() {
            return Err(DispatchError::InvalidInput("message"));
        }

        // Step 2: resolve recipient context. Donors only need an existing
        // profile; requesters additionally carry a participant kind that
        // must parse.
        let participant_kind = self.resolve_recipient_context(kind, recipient_id).await?;

        // Step 3: two-stage token resolution, failures propagated unchanged.
        let token = self.directory.resolve_token(kind, recipient_id).await?;

        self.deliver_and_record(
            kind,
            recipient_id,
            sender_id,
            participant_kind,
            &token,
            title,
            body,
        )
        .await
    }

    async fn resolve_recipient_context(
        &self,
        kind: RecipientKind,
        recipient_id: &str,
    ) -> Result<Option<ParticipantKind>, DispatchError> {
        match kind {
            RecipientKind::Donor => {
                self.store
                    .find_donor(recipient_id)
                    .await
                    .map_err(DispatchError::Store)?
                    .ok_or_else(|| DispatchError::ProfileNotFound(recipient_id.to_string()))?;
                Ok(None)
            }
            RecipientKind::Requester => {
                let request = self
                    .store
                    .find_request(recipient_id)
                    .await
                    .map_err(DispatchError::Store)?
                    .ok_or_else(|| DispatchError::ProfileNotFound(recipient_id.to_string()))?;

                let parsed = request
                    .participant_kind
                    .parse::<ParticipantKind>()
                    .map_err(|_| {
                        DispatchError::InvalidParticipantKind(request.participant_kind.clone())
                    })?;
                Ok(Some(parsed))
            }
        }
    }

    /// Send to a resolved token and persist the event on success.
    ///
    /// Internal entry point: empty title or body fall back to the default
    /// content for the recipient kind here, after public validation has
    /// already run.
    async fn deliver_and_record(
        &self,
        kind: RecipientKind,
        recipient_id: &str,
        sender_id: &str,
        participant_kind: Option<ParticipantKind>,
        token: &str,
        title: &str,
        body: &str,
    ) -> Result<DispatchReceipt, DispatchError> {
        let title = if title.is_empty() { default_title(kind) } else { title };
        let body = if body.is_empty() { default_body(kind) } else { body };

        let mut data = HashMap::new();
        match kind {
            RecipientKind::Donor => {
                data.insert("donorId".to_string(), recipient_id.to_string());
            }
            RecipientKind::Requester => {
                data.insert("requesterId".to_string(), recipient_id.to_string());
                if let Some(pk) = participant_kind {
                    data.insert("userType".to_string(), pk.to_string());
                }
            }
        }
        data.insert("senderId".to_string(), sender_id.to_string());

        // Step 4: send. On failure execution stops here; no event is
        // persisted for an undelivered notification.
        self.transport.send(token, title, body, &data).await?;

        // Step 5: persist only after the transport accepted the push.
        let event = self
            .store
            .append_notification(NewNotification {
                recipient_id: recipient_id.to_string(),
                sender_id: sender_id.to_string(),
                participant_kind,
                title: title.to_string(),
                body: body.to_string(),
            })
            .await
            .map_err(DispatchError::StoreWriteFailed)?;

        // Step 6: read-back sanity check. Absence is logged but does not
        // change the outcome.
        match self.store.get_notification(event.id).await {
            Ok(Some(_)) => {
                tracing::debug!(notification_id = %event.id, "Stored event confirmed");
            }
            Ok(None) => {
                tracing::warn!(
                    notification_id = %event.id,
                    "Notification event not found after append"
                );
            }
            Err(e) => {
                tracing::warn!(
                    notification_id = %event.id,
                    error = %e,
                    "Failed to read back stored event"
                );
            }
        }

        Ok(DispatchReceipt {
            notification_id: event.id,
            created_at: event.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::push::MemoryPushTransport;
    use crate::store::{
        AccountRecord, BloodType, DonorProfile, MemoryDocumentStore, NotificationStatus,
        RequestRecord,
    };

    struct Fixture {
        store: Arc<MemoryDocumentStore>,
        transport: Arc<MemoryPushTransport>,
        dispatcher: NotificationDispatcher,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryDocumentStore::new());
        let transport = Arc::new(MemoryPushTransport::new());

        store
            .upsert_donor(DonorProfile {
                donor_id: "donor-1".to_string(),
                blood_type: BloodType::ONegative,
                is_available: true,
                latitude: Some(0.0),
                longitude: Some(0.0),
            })
            .await
            .unwrap();
        store
            .upsert_account(AccountRecord {
                uid: "donor-1".to_string(),
                push_token: Some("tok-donor-1".to_string()),
            })
            .await
            .unwrap();
        store
            .upsert_request(RequestRecord {
                requester_id: "req-1".to_string(),
                participant_kind: "hospital".to_string(),
            })
            .await
            .unwrap();
        store
            .upsert_account(AccountRecord {
                uid: "req-1".to_string(),
                push_token: Some("tok-req-1".to_string()),
            })
            .await
            .unwrap();

        let directory = Arc::new(ParticipantDirectory::new(store.clone(), 10));
        let dispatcher = NotificationDispatcher::new(
            store.clone() as Arc<dyn DocumentStore>,
            directory,
            transport.clone() as Arc<dyn PushTransport>,
        );

        Fixture {
            store,
            transport,
            dispatcher,
        }
    }

    #[tokio::test]
    async fn test_dispatch_sends_and_persists_unread_event() {
        let fx = fixture().await;

        let receipt = fx
            .dispatcher
            .dispatch(
                RecipientKind::Donor,
                "donor-1",
                "req-1",
                "Need O- blood",
                "Please contact the hospital",
            )
            .await
            .unwrap();

        let event = fx
            .store
            .get_notification(receipt.notification_id)
            .await
            .unwrap()
            .expect("event persisted");
        assert_eq!(event.status, NotificationStatus::Unread);
        assert_eq!(event.recipient_id, "donor-1");
        assert_eq!(event.sender_id, "req-1");
        assert_eq!(event.title, "Need O- blood");
        assert_eq!(event.body, "Please contact the hospital");
        assert_eq!(fx.store.stats().await.notifications, 1);

        let sent = fx.transport.sent_to("tok-donor-1");
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].data.get("donorId").map(String::as_str), Some("donor-1"));
        assert_eq!(sent[0].data.get("senderId").map(String::as_str), Some("req-1"));
    }

    #[tokio::test]
    async fn test_dispatch_rejects_empty_inputs_without_persisting() {
        let fx = fixture().await;

        for (recipient, sender, title, body) in [
            ("", "s", "t", "b"),
            ("donor-1", "", "t", "b"),
            ("donor-1", "s", "", "b"),
            ("donor-1", "s", "t", ""),
        ] {
            let err = fx
                .dispatcher
                .dispatch(RecipientKind::Donor, recipient, sender, title, body)
                .await
                .unwrap_err();
            assert!(matches!(err, DispatchError::InvalidInput(_)));
        }

        assert_eq!(fx.store.stats().await.notifications, 0);
        assert!(fx.transport.sent().is_empty());
    }

    #[tokio::test]
    async fn test_delivery_failure_persists_nothing() {
        let fx = fixture().await;
        fx.transport.fail_token("tok-donor-1");

        let err = fx
            .dispatcher
            .dispatch(RecipientKind::Donor, "donor-1", "req-1", "t", "b")
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::DeliveryFailed(_)));
        assert_eq!(fx.store.stats().await.notifications, 0);

        let stats = fx.dispatcher.stats();
        assert_eq!(stats.total_rejected, 1);
        assert_eq!(stats.delivery_failures, 1);
    }

    #[tokio::test]
    async fn test_dispatch_to_unknown_donor() {
        let fx = fixture().await;

        let err = fx
            .dispatcher
            .dispatch(RecipientKind::Donor, "ghost", "req-1", "t", "b")
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::ProfileNotFound(_)));
    }

    #[tokio::test]
    async fn test_requester_dispatch_carries_participant_kind() {
        let fx = fixture().await;

        let receipt = fx
            .dispatcher
            .dispatch(RecipientKind::Requester, "req-1", "donor-1", "t", "b")
            .await
            .unwrap();

        let event = fx
            .store
            .get_notification(receipt.notification_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.participant_kind, Some(ParticipantKind::Hospital));

        let sent = fx.transport.sent_to("tok-req-1");
        assert_eq!(sent[0].data.get("userType").map(String::as_str), Some("hospital"));
    }

    #[tokio::test]
    async fn test_invalid_participant_kind_rejected() {
        let fx = fixture().await;
        fx.store
            .upsert_request(RequestRecord {
                requester_id: "req-2".to_string(),
                participant_kind: "clinic".to_string(),
            })
            .await
            .unwrap();
        fx.store
            .upsert_account(AccountRecord {
                uid: "req-2".to_string(),
                push_token: Some("tok-req-2".to_string()),
            })
            .await
            .unwrap();

        let err = fx
            .dispatcher
            .dispatch(RecipientKind::Requester, "req-2", "donor-1", "t", "b")
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::InvalidParticipantKind(k) if k == "clinic"));
        assert_eq!(fx.store.stats().await.notifications, 0);
    }

    #[tokio::test]
    async fn test_token_missing_propagated_from_directory() {
        let fx = fixture().await;
        fx.store
            .upsert_account(AccountRecord {
                uid: "donor-1".to_string(),
                push_token: None,
            })
            .await
            .unwrap();

        let err = fx
            .dispatcher
            .dispatch(RecipientKind::Donor, "donor-1", "req-1", "t", "b")
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::TokenMissing(_)));
    }
}
