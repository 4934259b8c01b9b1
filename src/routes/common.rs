//! Service endpoints outside the grid protocol: liveness, store readiness, build info.

use crate::entities::ALL_KINDS;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Serialize)]
struct Readiness {
    status: &'static str,
    store: &'static str,
    /// Kinds whose store did not answer.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failing: Vec<&'static str>,
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn ready(State(state): State<AppState>) -> (StatusCode, Json<Readiness>) {
    let mut failing = Vec::new();
    for (kind, result) in state.store_health().await {
        if let Err(e) = result {
            tracing::warn!(kind, error = %e, "settings store not ready");
            failing.push(kind);
        }
    }
    if failing.is_empty() {
        let body = Readiness { status: "ok", store: "ok", failing };
        return (StatusCode::OK, Json(body));
    }
    let body = Readiness { status: "degraded", store: "unavailable", failing };
    (StatusCode::SERVICE_UNAVAILABLE, Json(body))
}

/// Package name and version plus the settings kinds this build serves.
async fn version() -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "kinds": ALL_KINDS,
    }))
}

pub fn common_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/version", get(version))
        .with_state(state)
}
