use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::directory::{DirectoryError, RecipientKind};
use crate::push::PushError;
use crate::store::StoreError;

/// Default content applied when title or body arrive empty from an
/// internal caller. The public dispatch entry point validates both as
/// non-empty before this point.
pub(crate) const DEFAULT_DONOR_TITLE: &str = "Blood Donation Request";
pub(crate) const DEFAULT_DONOR_BODY: &str = "A patient needs blood urgently. Can you donate?";
pub(crate) const DEFAULT_REQUESTER_TITLE: &str = "Blood Donation Response";
pub(crate) const DEFAULT_REQUESTER_BODY: &str = "A donor is ready to help! Contact them now.";

pub(crate) fn default_title(kind: RecipientKind) -> &'static str {
    match kind {
        RecipientKind::Donor => DEFAULT_DONOR_TITLE,
        RecipientKind::Requester => DEFAULT_REQUESTER_TITLE,
    }
}

pub(crate) fn default_body(kind: RecipientKind) -> &'static str {
    match kind {
        RecipientKind::Donor => DEFAULT_DONOR_BODY,
        RecipientKind::Requester => DEFAULT_REQUESTER_BODY,
    }
}

/// Failures of a targeted dispatch, surfaced to the HTTP boundary as a
/// structured error rather than thrown past it.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A required string input was missing or empty.
    #[error("missing required field: {0}")]
    InvalidInput(&'static str),

    /// No donor profile or blood request matched the recipient identity.
    #[error("no profile found for participant {0}")]
    ProfileNotFound(String),

    /// No account record matched the recipient identity.
    #[error("no account found for uid {0}")]
    AccountNotFound(String),

    /// The recipient's account carries no push token.
    #[error("no push token registered for uid {0}")]
    TokenMissing(String),

    /// The blood request names a participant kind that is neither
    /// `hospital` nor `requester`.
    #[error("invalid participant kind: {0}")]
    InvalidParticipantKind(String),

    /// The push transport refused the message. Nothing was persisted.
    #[error("push delivery failed: {0}")]
    DeliveryFailed(#[from] PushError),

    /// The event could not be persisted after a confirmed delivery.
    #[error("failed to persist notification event: {0}")]
    StoreWriteFailed(StoreError),

    /// A document store read failed before any send.
    #[error("document store error: {0}")]
    Store(StoreError),
}

impl DispatchError {
    /// Stable kind label for metrics and error responses.
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::InvalidInput(_) => "invalid_input",
            DispatchError::ProfileNotFound(_) => "profile_not_found",
            DispatchError::AccountNotFound(_) => "account_not_found",
            DispatchError::TokenMissing(_) => "token_missing",
            DispatchError::InvalidParticipantKind(_) => "invalid_participant_kind",
            DispatchError::DeliveryFailed(_) => "delivery_failed",
            DispatchError::StoreWriteFailed(_) => "store_write_failed",
            DispatchError::Store(_) => "store_error",
        }
    }
}

impl From<DirectoryError> for DispatchError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::ProfileNotFound(id) => DispatchError::ProfileNotFound(id),
            DirectoryError::AccountNotFound(id) => DispatchError::AccountNotFound(id),
            DirectoryError::TokenMissing(id) => DispatchError::TokenMissing(id),
            DirectoryError::Store(e) => DispatchError::Store(e),
        }
    }
}

/// Receipt returned for a dispatched and persisted notification.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchReceipt {
    pub notification_id: Uuid,
    pub created_at: DateTime<Utc>,
}
