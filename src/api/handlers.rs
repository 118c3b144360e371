//! HTTP notification handlers

use axum::{extract::State, Json};
use chrono::Utc;

use crate::directory::RecipientKind;
use crate::error::Result;
use crate::server::AppState;

use super::models::{
    EmergencyAlertRequest, EmergencyAlertResponse, SendDonorNotificationRequest,
    SendNotificationResponse, SendRequesterNotificationRequest,
};

/// Root route, kept as a plain liveness probe
pub async fn root() -> &'static str {
    "Blood Bank Notification Server is running"
}

/// Send a targeted notification to a donor
#[tracing::instrument(
    name = "http.send_donor_notification",
    skip(state, request),
    fields(donor_id = %request.donor_id, sender_id = %request.sender_id)
)]
pub async fn send_donor_notification(
    State(state): State<AppState>,
    Json(request): Json<SendDonorNotificationRequest>,
) -> Result<Json<SendNotificationResponse>> {
    let receipt = state
        .dispatcher
        .dispatch(
            RecipientKind::Donor,
            &request.donor_id,
            &request.sender_id,
            &request.title,
            &request.message,
        )
        .await?;

    Ok(Json(SendNotificationResponse {
        success: true,
        message: "Notification sent and stored successfully".to_string(),
        notification_id: receipt.notification_id,
        timestamp: Utc::now(),
    }))
}

/// Send a targeted notification to a requester (hospital or individual)
#[tracing::instrument(
    name = "http.send_requester_notification",
    skip(state, request),
    fields(requester_id = %request.requester_id, sender_id = %request.sender_id)
)]
pub async fn send_requester_notification(
    State(state): State<AppState>,
    Json(request): Json<SendRequesterNotificationRequest>,
) -> Result<Json<SendNotificationResponse>> {
    let receipt = state
        .dispatcher
        .dispatch(
            RecipientKind::Requester,
            &request.requester_id,
            &request.sender_id,
            &request.title,
            &request.message,
        )
        .await?;

    Ok(Json(SendNotificationResponse {
        success: true,
        message: "Notification sent and stored successfully".to_string(),
        notification_id: receipt.notification_id,
        timestamp: Utc::now(),
    }))
}

/// Fire an emergency broadcast to eligible donors near the requester.
///
/// Fire-and-forget contract: the run never surfaces a failure to the
/// caller. The response embeds the broadcast report so operators can see
/// what the run did.
#[tracing::instrument(
    name = "http.send_emergency_alert",
    skip(state, request),
    fields(uid = %request.uid, blood_type = %request.blood_type)
)]
pub async fn send_emergency_alert(
    State(state): State<AppState>,
    Json(request): Json<EmergencyAlertRequest>,
) -> Json<EmergencyAlertResponse> {
    let report = state
        .broadcaster
        .broadcast_emergency(&request.uid, request.blood_type)
        .await;

    Json(EmergencyAlertResponse {
        success: true,
        message: "Emergency alert processed".to_string(),
        report,
    })
}
