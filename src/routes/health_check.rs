use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::relay::{response_headers, timestamp_now};
use crate::state::AppState;

pub(crate) async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    (
        response_headers(),
        Json(json!({
            "status": "Claude relay is running",
            "uptime": state.started_at.elapsed().as_secs_f64(),
            "timestamp": timestamp_now(),
        })),
    )
}
