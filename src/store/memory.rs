//! In-memory document store backend using DashMap.
//!
//! Documents are stored in memory and will be lost on service restart.
//! The backend enforces the same membership-query cardinality cap a hosted
//! document store would, so callers exercise their batching logic against
//! it the same way they would in production.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use super::types::{
    AccountRecord, BloodType, DonorProfile, NewNotification, NotificationEvent,
    NotificationStatus, RequestRecord,
};
use super::{DocumentStore, StoreError, StoreStats};

/// Default cardinality cap for membership queries, matching the historical
/// limit of hosted document stores.
pub const DEFAULT_MEMBERSHIP_QUERY_CAP: usize = 10;

/// In-memory document store backend.
///
/// Each logical collection is a `DashMap` keyed by the record's identity
/// field. Notification events are append-only.
pub struct MemoryDocumentStore {
    donors: DashMap<String, DonorProfile>,
    accounts: DashMap<String, AccountRecord>,
    requests: DashMap<String, RequestRecord>,
    notifications: DashMap<Uuid, NotificationEvent>,
    membership_query_cap: usize,
    membership_queries: AtomicU64,
}

impl MemoryDocumentStore {
    /// Create an empty store with the default membership-query cap.
    pub fn new() -> Self {
        Self::with_membership_cap(DEFAULT_MEMBERSHIP_QUERY_CAP)
    }

    /// Create an empty store with an explicit membership-query cap.
    pub fn with_membership_cap(cap: usize) -> Self {
        Self {
            donors: DashMap::new(),
            accounts: DashMap::new(),
            requests: DashMap::new(),
            notifications: DashMap::new(),
            membership_query_cap: cap,
            membership_queries: AtomicU64::new(0),
        }
    }

    /// The configured membership-query cardinality cap.
    pub fn membership_query_cap(&self) -> usize {
        self.membership_query_cap
    }
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn find_donor(&self, donor_id: &str) -> Result<Option<DonorProfile>, StoreError> {
        Ok(self.donors.get(donor_id).map(|r| r.clone()))
    }

    async fn find_available_donors(
        &self,
        blood_type: BloodType,
    ) -> Result<Vec<DonorProfile>, StoreError> {
        Ok(self
            .donors
            .iter()
            .filter(|r| r.blood_type == blood_type && r.is_available)
            .map(|r| r.clone())
            .collect())
    }

    async fn find_request(&self, requester_id: &str) -> Result<Option<RequestRecord>, StoreError> {
        Ok(self.requests.get(requester_id).map(|r| r.clone()))
    }

    async fn find_account(&self, uid: &str) -> Result<Option<AccountRecord>, StoreError> {
        Ok(self.accounts.get(uid).map(|r| r.clone()))
    }

    async fn find_accounts_by_uids(
        &self,
        uids: &[String],
    ) -> Result<Vec<AccountRecord>, StoreError> {
        if uids.len() > self.membership_query_cap {
            return Err(StoreError::QueryTooLarge {
                requested: uids.len(),
                cap: self.membership_query_cap,
            });
        }

        self.membership_queries.fetch_add(1, Ordering::Relaxed);

        Ok(uids
            .iter()
            .filter_map(|uid| self.accounts.get(uid).map(|r| r.clone()))
            .collect())
    }

    async fn append_notification(
        &self,
        new: NewNotification,
    ) -> Result<NotificationEvent, StoreError> {
        let event = NotificationEvent {
            id: Uuid::new_v4(),
            recipient_id: new.recipient_id,
            sender_id: new.sender_id,
            participant_kind: new.participant_kind,
            title: new.title,
            body: new.body,
            created_at: Utc::now(),
            status: NotificationStatus::Unread,
        };

        self.notifications.insert(event.id, event.clone());

        tracing::debug!(
            notification_id = %event.id,
            recipient_id = %event.recipient_id,
            "Notification event appended"
        );

        Ok(event)
    }

    async fn get_notification(&self, id: Uuid) -> Result<Option<NotificationEvent>, StoreError> {
        Ok(self.notifications.get(&id).map(|r| r.clone()))
    }

    async fn upsert_donor(&self, profile: DonorProfile) -> Result<(), StoreError> {
        self.donors.insert(profile.donor_id.clone(), profile);
        Ok(())
    }

    async fn upsert_account(&self, account: AccountRecord) -> Result<(), StoreError> {
        self.accounts.insert(account.uid.clone(), account);
        Ok(())
    }

    async fn upsert_request(&self, request: RequestRecord) -> Result<(), StoreError> {
        self.requests.insert(request.requester_id.clone(), request);
        Ok(())
    }

    async fn stats(&self) -> StoreStats {
        StoreStats {
            backend_type: "memory".to_string(),
            donors: self.donors.len(),
            accounts: self.accounts.len(),
            requests: self.requests.len(),
            notifications: self.notifications.len(),
            membership_queries: self.membership_queries.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn donor(id: &str, blood_type: BloodType, available: bool) -> DonorProfile {
        DonorProfile {
            donor_id: id.to_string(),
            blood_type,
            is_available: available,
            latitude: Some(0.0),
            longitude: Some(0.0),
        }
    }

    #[tokio::test]
    async fn test_find_donor() {
        let store = MemoryDocumentStore::new();
        store
            .upsert_donor(donor("d1", BloodType::ONegative, true))
            .await
            .unwrap();

        assert!(store.find_donor("d1").await.unwrap().is_some());
        assert!(store.find_donor("d2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_available_donors_filters_type_and_availability() {
        let store = MemoryDocumentStore::new();
        store
            .upsert_donor(donor("d1", BloodType::ONegative, true))
            .await
            .unwrap();
        store
            .upsert_donor(donor("d2", BloodType::ONegative, false))
            .await
            .unwrap();
        store
            .upsert_donor(donor("d3", BloodType::APositive, true))
            .await
            .unwrap();

        let matches = store
            .find_available_donors(BloodType::ONegative)
            .await
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].donor_id, "d1");
    }

    #[tokio::test]
    async fn test_membership_query_cap_enforced() {
        let store = MemoryDocumentStore::with_membership_cap(2);
        let uids: Vec<String> = (0..3).map(|i| format!("u{}", i)).collect();

        let err = store.find_accounts_by_uids(&uids).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::QueryTooLarge { requested: 3, cap: 2 }
        ));
    }

    #[tokio::test]
    async fn test_membership_query_counts_and_results() {
        let store = MemoryDocumentStore::new();
        for i in 0..3 {
            store
                .upsert_account(AccountRecord {
                    uid: format!("u{}", i),
                    push_token: Some(format!("tok-{}", i)),
                })
                .await
                .unwrap();
        }

        let uids = vec!["u0".to_string(), "u2".to_string(), "missing".to_string()];
        let accounts = store.find_accounts_by_uids(&uids).await.unwrap();
        assert_eq!(accounts.len(), 2);
        assert_eq!(store.stats().await.membership_queries, 1);
    }

    #[tokio::test]
    async fn test_append_assigns_id_timestamp_and_unread_status() {
        let store = MemoryDocumentStore::new();
        let event = store
            .append_notification(NewNotification {
                recipient_id: "d1".to_string(),
                sender_id: "r1".to_string(),
                participant_kind: None,
                title: "t".to_string(),
                body: "b".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(event.status, NotificationStatus::Unread);

        let read_back = store.get_notification(event.id).await.unwrap().unwrap();
        assert_eq!(read_back.recipient_id, "d1");
        assert_eq!(read_back.created_at, event.created_at);
    }
}
