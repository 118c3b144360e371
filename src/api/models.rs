//! Request and response models for the notification HTTP API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::broadcast::BroadcastReport;
use crate::store::BloodType;

/// `POST /send-donor-notification`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendDonorNotificationRequest {
    pub donor_id: String,
    pub sender_id: String,
    pub title: String,
    pub message: String,
}

/// `POST /send-requester-notification`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRequesterNotificationRequest {
    pub requester_id: String,
    pub sender_id: String,
    pub title: String,
    pub message: String,
}

/// `POST /send-emergency-alert`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyAlertRequest {
    /// Requester uid; must belong to a registered donor
    pub uid: String,
    pub blood_type: BloodType,
}

/// Response for both targeted notification endpoints
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationResponse {
    pub success: bool,
    pub message: String,
    pub notification_id: Uuid,
    pub timestamp: DateTime<Utc>,
}

/// Response for the emergency alert endpoint. Always `success: true` on a
/// completed run; the report carries the counts that distinguish an empty
/// pool from transport trouble.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyAlertResponse {
    pub success: bool,
    pub message: String,
    pub report: BroadcastReport,
}
