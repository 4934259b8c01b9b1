//! Read-only views the settings editors load alongside their lists.

use crate::entities::{
    tag, thumbnail, video_thumbnail, PredefinedMetadata, TagConfig, ThumbnailConfig, VideoThumbnailConfig,
};
use crate::entity::ListableEntity;
use crate::error::AppError;
use crate::extractors::AdminUser;
use crate::response::Envelope;
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

/// GET /settings/thumbnails/tree
pub async fn thumbnail_tree(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
) -> Result<Json<Vec<Value>>, AppError> {
    state.permissions.check(user.as_deref(), ThumbnailConfig::PERMISSION).await?;
    let configs = state.store::<ThumbnailConfig>().load_all().await?;
    Ok(Json(thumbnail::thumbnail_tree(&configs)))
}

/// GET /settings/thumbnails/downloadable
pub async fn thumbnail_downloadable(State(state): State<AppState>) -> Result<Json<Vec<Value>>, AppError> {
    let configs = state.store::<ThumbnailConfig>().load_all().await?;
    Ok(Json(thumbnail::downloadable(&configs)))
}

/// GET /settings/video-thumbnails/tree
pub async fn video_thumbnail_tree(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
) -> Result<Json<Vec<Value>>, AppError> {
    state.permissions.check(user.as_deref(), VideoThumbnailConfig::PERMISSION).await?;
    let configs = state.store::<VideoThumbnailConfig>().load_all().await?;
    Ok(Json(video_thumbnail::video_thumbnail_tree(&configs)))
}

/// GET /settings/tags/tree
pub async fn tag_tree(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
) -> Result<Json<Vec<Value>>, AppError> {
    state.permissions.check(user.as_deref(), TagConfig::PERMISSION).await?;
    let tags = state.store::<TagConfig>().load_all().await?;
    Ok(Json(tag::tag_tree(&tags)))
}

#[derive(Debug, Default, Deserialize)]
pub struct PredefinedMetadataQuery {
    #[serde(rename = "type")]
    pub type_: Option<String>,
    #[serde(rename = "subType")]
    pub sub_type: Option<String>,
}

/// GET /settings/predefined-metadata?type=&subType=
pub async fn predefined_metadata(
    State(state): State<AppState>,
    Query(query): Query<PredefinedMetadataQuery>,
) -> Result<Json<Envelope>, AppError> {
    let definitions = state.store::<PredefinedMetadata>().load_all().await?;
    let mut data = Vec::new();
    for definition in definitions
        .iter()
        .filter(|d| d.applies_to(query.type_.as_deref(), query.sub_type.as_deref()))
    {
        data.push(definition.present(state.elements.as_ref()).await?);
    }
    Ok(Json(Envelope::one(Value::Array(data))))
}
