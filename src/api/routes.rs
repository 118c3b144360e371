use axum::{
    routing::{get, post},
    Router,
};

use crate::server::AppState;

use super::handlers::{
    root, send_donor_notification, send_emergency_alert, send_requester_notification,
};
use super::health::{health, stats};
use super::metrics::prometheus_metrics;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Liveness, health & stats
        .route("/", get(root))
        .route("/health", get(health))
        .route("/stats", get(stats))
        .route("/metrics", get(prometheus_metrics))
        // Notification endpoints
        .route("/send-donor-notification", post(send_donor_notification))
        .route(
            "/send-requester-notification",
            post(send_requester_notification),
        )
        .route("/send-emergency-alert", post(send_emergency_alert))
}
