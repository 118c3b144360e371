//! Health check and statistics endpoints.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::notification::DispatcherStatsSnapshot;
use crate::server::AppState;
use crate::store::StoreStats;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub store: StoreHealthResponse,
    pub push: PushHealthResponse,
}

#[derive(Debug, Serialize)]
pub struct StoreHealthResponse {
    pub backend: String,
    pub notifications: usize,
}

#[derive(Debug, Serialize)]
pub struct PushHealthResponse {
    pub backend: String,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub dispatcher: DispatcherStatsSnapshot,
    pub store: StoreStats,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let store_stats = state.store.stats().await;
    let uptime_seconds = state.start_time.elapsed().as_secs();

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds,
        store: StoreHealthResponse {
            backend: store_stats.backend_type.clone(),
            notifications: store_stats.notifications,
        },
        push: PushHealthResponse {
            backend: state.settings.push.backend.clone(),
        },
    })
}

pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        dispatcher: state.dispatcher.stats(),
        store: state.store.stats().await,
    })
}
