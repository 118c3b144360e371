//! Document store boundary.
//!
//! The engine consumes the underlying document store as an opaque service:
//! equality lookups, an equality-on-field scan, a membership (`in`-style)
//! query with a cardinality cap, and append/read of notification events
//! with a server-assigned creation timestamp. The [`DocumentStore`] trait
//! captures exactly those shapes so that storage implementations can be
//! swapped without touching the resolution or broadcast pipelines.

mod factory;
mod memory;
mod types;

pub use factory::create_document_store;
pub use memory::MemoryDocumentStore;
pub use types::{
    AccountRecord, BloodType, DonorProfile, NewNotification, NotificationEvent,
    NotificationStatus, ParticipantKind, RequestRecord,
};

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by document store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached or refused the operation.
    #[error("document store unavailable: {0}")]
    Unavailable(String),

    /// A write was rejected or lost.
    #[error("document store write failed: {0}")]
    WriteFailed(String),

    /// A membership query exceeded the backend's cardinality cap.
    #[error("membership query of {requested} ids exceeds cap of {cap}")]
    QueryTooLarge { requested: usize, cap: usize },
}

/// Point-in-time counters for a store backend.
#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub backend_type: String,
    pub donors: usize,
    pub accounts: usize,
    pub requests: usize,
    pub notifications: usize,
    /// Membership (`in`-style) queries issued since startup.
    pub membership_queries: u64,
}

/// Abstraction over the persisted collections: `donors`, `users`,
/// `blood_requests` and `notifications`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Equality lookup of a donor profile by `donor_id`.
    async fn find_donor(&self, donor_id: &str) -> Result<Option<DonorProfile>, StoreError>;

    /// All donor profiles matching the blood type that are marked
    /// available. Full set, store-native order.
    async fn find_available_donors(
        &self,
        blood_type: BloodType,
    ) -> Result<Vec<DonorProfile>, StoreError>;

    /// Equality lookup of a blood request by `requester_id`.
    async fn find_request(&self, requester_id: &str) -> Result<Option<RequestRecord>, StoreError>;

    /// Equality lookup of an account record by `uid`.
    async fn find_account(&self, uid: &str) -> Result<Option<AccountRecord>, StoreError>;

    /// Membership query over account uids. Backends may enforce a
    /// cardinality cap; callers are expected to chunk accordingly.
    async fn find_accounts_by_uids(
        &self,
        uids: &[String],
    ) -> Result<Vec<AccountRecord>, StoreError>;

    /// Append a notification event. The store assigns the id, the creation
    /// timestamp and the initial `unread` status.
    async fn append_notification(
        &self,
        new: NewNotification,
    ) -> Result<NotificationEvent, StoreError>;

    /// Point read of a previously appended notification event.
    async fn get_notification(&self, id: Uuid) -> Result<Option<NotificationEvent>, StoreError>;

    /// Create or replace a donor profile.
    async fn upsert_donor(&self, profile: DonorProfile) -> Result<(), StoreError>;

    /// Create or replace an account record.
    async fn upsert_account(&self, account: AccountRecord) -> Result<(), StoreError>;

    /// Create or replace a blood request.
    async fn upsert_request(&self, request: RequestRecord) -> Result<(), StoreError>;

    /// Backend counters.
    async fn stats(&self) -> StoreStats;
}
