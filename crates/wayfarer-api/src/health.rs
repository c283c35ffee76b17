use axum::{Json, extract::State};

use wayfarer_types::api::HealthResponse;

use crate::state::AppState;

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        env: state.env.clone(),
        uptime: state.started_at.elapsed().as_secs_f64(),
    })
}
