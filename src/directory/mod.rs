//! Participant directory.
//!
//! Resolves a domain identity (donor id or requester id) into a deliverable
//! push token by joining the participant's domain profile with their
//! account record. The two records live in independent collections and are
//! linked only by the convention that the profile's identity field equals
//! the account `uid`.
//!
//! The directory never caches: push tokens are refreshed out-of-band by
//! client devices, so every resolution re-queries both collections.

use std::sync::Arc;

use futures::future::join_all;
use thiserror::Error;

use crate::store::{DocumentStore, StoreError};

/// Which profile collection a domain identity is expected to live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipientKind {
    /// Donor profile, keyed by `donor_id`.
    Donor,
    /// Blood request, keyed by `requester_id`.
    Requester,
}

/// Failures of the two-stage token resolution.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Stage one: no donor profile or blood request matched the identity.
    #[error("no profile found for participant {0}")]
    ProfileNotFound(String),

    /// Stage two: no account record matched the identity.
    #[error("no account found for uid {0}")]
    AccountNotFound(String),

    /// The account exists but carries no push token.
    #[error("no push token registered for uid {0}")]
    TokenMissing(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Joins domain profiles with account records to resolve push tokens.
pub struct ParticipantDirectory {
    store: Arc<dyn DocumentStore>,
    /// Chunk size for batched membership queries against the account
    /// collection; kept at or below the store's cardinality cap.
    batch_size: usize,
}

impl ParticipantDirectory {
    pub fn new(store: Arc<dyn DocumentStore>, batch_size: usize) -> Self {
        Self { store, batch_size }
    }

    /// Resolve one domain identity into a push token.
    ///
    /// Stage one confirms the domain profile exists in the collection
    /// `kind` selects; stage two reads the account record with the same
    /// identity and returns its token.
    #[tracing::instrument(name = "directory.resolve_token", skip(self))]
    pub async fn resolve_token(
        &self,
        kind: RecipientKind,
        domain_id: &str,
    ) -> Result<String, DirectoryError> {
        let profile_exists = match kind {
            RecipientKind::Donor => self.store.find_donor(domain_id).await?.is_some(),
            RecipientKind::Requester => self.store.find_request(domain_id).await?.is_some(),
        };

        if !profile_exists {
            return Err(DirectoryError::ProfileNotFound(domain_id.to_string()));
        }

        let account = self
            .store
            .find_account(domain_id)
            .await?
            .ok_or_else(|| DirectoryError::AccountNotFound(domain_id.to_string()))?;

        match account.push_token {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(DirectoryError::TokenMissing(domain_id.to_string())),
        }
    }

    /// Resolve push tokens for many donor ids at once.
    ///
    /// Ids are chunked to the configured batch size and resolved through
    /// concurrent membership queries. Accounts without a token are logged
    /// and skipped, never treated as failures.
    #[tracing::instrument(name = "directory.resolve_tokens", skip(self, donor_ids), fields(id_count = donor_ids.len()))]
    pub async fn resolve_tokens(&self, donor_ids: &[String]) -> Result<Vec<String>, StoreError> {
        if donor_ids.is_empty() {
            return Ok(Vec::new());
        }

        let queries = donor_ids
            .chunks(self.batch_size)
            .map(|chunk| self.store.find_accounts_by_uids(chunk));

        let mut tokens = Vec::new();
        for result in join_all(queries).await {
            for account in result? {
                match account.push_token {
                    Some(token) if !token.is_empty() => tokens.push(token),
                    _ => {
                        tracing::debug!(uid = %account.uid, "Account has no push token, skipping");
                    }
                }
            }
        }

        tracing::debug!(
            resolved = tokens.len(),
            requested = donor_ids.len(),
            "Resolved push tokens in batches"
        );

        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{AccountRecord, BloodType, DonorProfile, MemoryDocumentStore, RequestRecord};

    async fn seeded_store() -> Arc<MemoryDocumentStore> {
        let store = Arc::new(MemoryDocumentStore::new());
        store
            .upsert_donor(DonorProfile {
                donor_id: "donor-1".to_string(),
                blood_type: BloodType::OPositive,
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
    }

    #[tokio::test]
    async fn test_resolve_token_success() {
        let store = seeded_store().await;
        let directory = ParticipantDirectory::new(store, 10);

        let token = directory
            .resolve_token(RecipientKind::Donor, "donor-1")
            .await
            .unwrap();
        assert_eq!(token, "tok-donor-1");
    }

    #[tokio::test]
    async fn test_resolve_token_profile_not_found() {
        let store = seeded_store().await;
        let directory = ParticipantDirectory::new(store, 10);

        let err = directory
            .resolve_token(RecipientKind::Donor, "ghost")
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::ProfileNotFound(_)));
    }

    #[tokio::test]
    async fn test_resolve_token_account_not_found() {
        let store = seeded_store().await;
        // Donor profile exists, account record does not.
        store
            .upsert_donor(DonorProfile {
                donor_id: "orphan".to_string(),
                blood_type: BloodType::ANegative,
                is_available: true,
                latitude: None,
                longitude: None,
            })
            .await
            .unwrap();
        let directory = ParticipantDirectory::new(store, 10);

        let err = directory
            .resolve_token(RecipientKind::Donor, "orphan")
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::AccountNotFound(_)));
    }

    #[tokio::test]
    async fn test_resolve_token_missing_token() {
        let store = seeded_store().await;
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
                push_token: None,
            })
            .await
            .unwrap();
        let directory = ParticipantDirectory::new(store, 10);

        let err = directory
            .resolve_token(RecipientKind::Requester, "req-1")
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::TokenMissing(_)));
    }

    #[tokio::test]
    async fn test_empty_string_token_is_missing() {
        let store = seeded_store().await;
        store
            .upsert_account(AccountRecord {
                uid: "donor-1".to_string(),
                push_token: Some(String::new()),
            })
            .await
            .unwrap();
        let directory = ParticipantDirectory::new(store, 10);

        let err = directory
            .resolve_token(RecipientKind::Donor, "donor-1")
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::TokenMissing(_)));
    }

    #[tokio::test]
    async fn test_batched_resolution_chunks_to_cap() {
        // Store cap of 30 so a single 25-id query would also be legal;
        // the directory still chunks to its own batch size of 10.
        let store = Arc::new(MemoryDocumentStore::with_membership_cap(30));
        let ids: Vec<String> = (0..25).map(|i| format!("donor-{}", i)).collect();
        for id in &ids {
            store
                .upsert_account(AccountRecord {
                    uid: id.clone(),
                    push_token: Some(format!("tok-{}", id)),
                })
                .await
                .unwrap();
        }

        let directory = ParticipantDirectory::new(store.clone(), 10);
        let batched = directory.resolve_tokens(&ids).await.unwrap();

        // 25 ids with a batch size of 10 issue exactly 3 membership queries.
        assert_eq!(store.stats().await.membership_queries, 3);

        // The union equals a single unchunked query over all 25 ids.
        let all_at_once: Vec<String> = store
            .find_accounts_by_uids(&ids)
            .await
            .unwrap()
            .into_iter()
            .filter_map(|a| a.push_token)
            .collect();

        let mut batched_sorted = batched.clone();
        batched_sorted.sort();
        let mut direct_sorted = all_at_once;
        direct_sorted.sort();
        assert_eq!(batched_sorted, direct_sorted);
        assert_eq!(batched.len(), 25);
    }

    #[tokio::test]
    async fn test_batched_resolution_skips_tokenless_accounts() {
        let store = Arc::new(MemoryDocumentStore::new());
        store
            .upsert_account(AccountRecord {
                uid: "a".to_string(),
                push_token: Some("tok-a".to_string()),
            })
            .await
            .unwrap();
        store
            .upsert_account(AccountRecord {
                uid: "b".to_string(),
                push_token: None,
            })
            .await
            .unwrap();

        let directory = ParticipantDirectory::new(store, 10);
        let ids = vec!["a".to_string(), "b".to_string(), "missing".to_string()];
        let tokens = directory.resolve_tokens(&ids).await.unwrap();

        assert_eq!(tokens, vec!["tok-a".to_string()]);
    }
}
