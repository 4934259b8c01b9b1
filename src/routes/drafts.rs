//! Edit-session draft routes.

use crate::handlers::{discard_draft, load_draft, save_draft};
use crate::state::AppState;
use axum::{routing::get, Router};
use tower_http::limit::RequestBodyLimitLayer;

pub fn draft_routes(state: AppState, body_limit_bytes: usize) -> Router {
    Router::new()
        .route(
            "/drafts/:kind/:id",
            get(load_draft).post(save_draft).delete(discard_draft),
        )
        .layer(RequestBodyLimitLayer::new(body_limit_bytes))
        .with_state(state)
}
