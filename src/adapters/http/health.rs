//! Liveness and relay statistics endpoints.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use super::AppState;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

/// Snapshot of registry occupancy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatsResponse {
    /// Rooms with at least one member.
    pub rooms: usize,
    /// Connection registrations across all rooms.
    pub connections: usize,
}

/// `GET /` - also serves every unmatched path.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "ws".to_string(),
    })
}

/// `GET /stats`
pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let registry = &state.relay.registry;
    Json(StatsResponse {
        rooms: registry.active_rooms().await.len(),
        connections: registry.total_client_count().await,
    })
}
