//! Settings-list routes. Each list answers GET and POST on one path; the action
//! comes from the request parameters.

use crate::entities::{
    Glossary, PredefinedMetadata, PredefinedProperty, StaticRoute, TagConfig, ThumbnailConfig, VideoThumbnailConfig,
    WebsiteSetting,
};
use crate::handlers::{
    entity_list, predefined_metadata, tag_tree, thumbnail_downloadable, thumbnail_tree, video_thumbnail_tree,
};
use crate::state::AppState;
use axum::{routing::get, Router};
use tower_http::limit::RequestBodyLimitLayer;

pub fn settings_routes(state: AppState, body_limit_bytes: usize) -> Router {
    Router::new()
        .route(
            "/settings/staticroutes",
            get(entity_list::<StaticRoute>).post(entity_list::<StaticRoute>),
        )
        .route("/settings/glossary", get(entity_list::<Glossary>).post(entity_list::<Glossary>))
        .route(
            "/settings/metadata",
            get(entity_list::<PredefinedMetadata>).post(entity_list::<PredefinedMetadata>),
        )
        .route(
            "/settings/properties",
            get(entity_list::<PredefinedProperty>).post(entity_list::<PredefinedProperty>),
        )
        .route(
            "/settings/website-settings",
            get(entity_list::<WebsiteSetting>).post(entity_list::<WebsiteSetting>),
        )
        .route("/settings/tags", get(entity_list::<TagConfig>).post(entity_list::<TagConfig>))
        .route("/settings/tags/tree", get(tag_tree))
        .route(
            "/settings/thumbnails",
            get(entity_list::<ThumbnailConfig>).post(entity_list::<ThumbnailConfig>),
        )
        .route("/settings/thumbnails/tree", get(thumbnail_tree))
        .route("/settings/thumbnails/downloadable", get(thumbnail_downloadable))
        .route(
            "/settings/video-thumbnails",
            get(entity_list::<VideoThumbnailConfig>).post(entity_list::<VideoThumbnailConfig>),
        )
        .route("/settings/video-thumbnails/tree", get(video_thumbnail_tree))
        .route("/settings/predefined-metadata", get(predefined_metadata))
        .layer(RequestBodyLimitLayer::new(body_limit_bytes))
        .with_state(state)
}
