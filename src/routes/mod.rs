//! Routers for the settings lists, drafts and service endpoints.

mod common;
mod drafts;
mod settings;

pub use common::common_routes;
pub use drafts::draft_routes;
pub use settings::settings_routes;

use crate::state::AppState;
use axum::Router;

/// Every route this service answers.
pub fn app(state: AppState, body_limit_bytes: usize) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .merge(settings_routes(state.clone(), body_limit_bytes))
        .merge(draft_routes(state, body_limit_bytes))
}
