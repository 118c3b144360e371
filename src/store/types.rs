use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// ABO/Rh blood type as it appears on the wire (`"A+"`, `"O-"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BloodType {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

impl BloodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BloodType::APositive => "A+",
            BloodType::ANegative => "A-",
            BloodType::BPositive => "B+",
            BloodType::BNegative => "B-",
            BloodType::AbPositive => "AB+",
            BloodType::AbNegative => "AB-",
            BloodType::OPositive => "O+",
            BloodType::ONegative => "O-",
        }
    }
}

impl fmt::Display for BloodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BloodType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A+" => Ok(BloodType::APositive),
            "A-" => Ok(BloodType::ANegative),
            "B+" => Ok(BloodType::BPositive),
            "B-" => Ok(BloodType::BNegative),
            "AB+" => Ok(BloodType::AbPositive),
            "AB-" => Ok(BloodType::AbNegative),
            "O+" => Ok(BloodType::OPositive),
            "O-" => Ok(BloodType::ONegative),
            other => Err(format!("unknown blood type: {}", other)),
        }
    }
}

/// Who filed a blood request. Stored as a raw string in `RequestRecord`
/// (the store enforces nothing) and validated at dispatch time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantKind {
    Hospital,
    Requester,
}

impl fmt::Display for ParticipantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParticipantKind::Hospital => f.write_str("hospital"),
            ParticipantKind::Requester => f.write_str("requester"),
        }
    }
}

impl FromStr for ParticipantKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hospital" => Ok(ParticipantKind::Hospital),
            "requester" => Ok(ParticipantKind::Requester),
            other => Err(format!("invalid participant kind: {}", other)),
        }
    }
}

/// Lifecycle status of a persisted notification event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    Unread,
    Read,
}

/// Account record owned by the account subsystem. The push token is
/// refreshed out-of-band whenever the participant's device token changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRecord {
    pub uid: String,
    /// Opaque push destination; `None` until the device registers one.
    pub push_token: Option<String>,
}

/// Donor profile created at registration. `donor_id` is expected to equal
/// some `AccountRecord.uid`; that is a convention, not a store constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonorProfile {
    pub donor_id: String,
    pub blood_type: BloodType,
    pub is_available: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl DonorProfile {
    /// Coordinates, if both are present. Profiles missing either coordinate
    /// are excluded from distance filtering rather than treated as origin.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

/// Blood request filed by a hospital or an individual requester.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestRecord {
    pub requester_id: String,
    /// Conventionally `"hospital"` or `"requester"`; parsed with
    /// [`ParticipantKind`] when a dispatch needs it.
    pub participant_kind: String,
}

/// A durable notification event. Append-only: created once after a
/// confirmed push delivery, never updated by this service apart from the
/// read/unread status owned by the client application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub id: Uuid,
    pub recipient_id: String,
    pub sender_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant_kind: Option<ParticipantKind>,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub status: NotificationStatus,
}

/// Payload for appending a notification event. The store assigns the id,
/// creation timestamp and initial `unread` status.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub recipient_id: String,
    pub sender_id: String,
    pub participant_kind: Option<ParticipantKind>,
    pub title: String,
    pub body: String,
}
