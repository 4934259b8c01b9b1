//! Concrete settings lists bound to the generic controller.

pub mod glossary;
pub mod metadata;
pub mod property;
pub mod static_route;
pub mod tag;
pub mod thumbnail;
pub mod video_thumbnail;
pub mod website_setting;

pub use glossary::Glossary;
pub use metadata::PredefinedMetadata;
pub use property::PredefinedProperty;
pub use static_route::StaticRoute;
pub use tag::{TagConfig, TagParam};
pub use thumbnail::ThumbnailConfig;
pub use video_thumbnail::VideoThumbnailConfig;
pub use website_setting::WebsiteSetting;

use crate::collaborators::{ElementKind, ElementResolver};
use crate::entity::ListableEntity;
use crate::error::AppError;
use serde_json::Value;

/// Every entity kind, for table provisioning.
pub const ALL_KINDS: &[&str] = &[
    StaticRoute::KIND,
    Glossary::KIND,
    PredefinedMetadata::KIND,
    PredefinedProperty::KIND,
    WebsiteSetting::KIND,
    TagConfig::KIND,
    ThumbnailConfig::KIND,
    VideoThumbnailConfig::KIND,
];

const PERMISSIONS: &[(&str, &str)] = &[
    (StaticRoute::KIND, StaticRoute::PERMISSION),
    (Glossary::KIND, Glossary::PERMISSION),
    (PredefinedMetadata::KIND, PredefinedMetadata::PERMISSION),
    (PredefinedProperty::KIND, PredefinedProperty::PERMISSION),
    (WebsiteSetting::KIND, WebsiteSetting::PERMISSION),
    (TagConfig::KIND, TagConfig::PERMISSION),
    (ThumbnailConfig::KIND, ThumbnailConfig::PERMISSION),
    (VideoThumbnailConfig::KIND, VideoThumbnailConfig::PERMISSION),
];

/// Permission guarding entities of `kind`, None for unknown kinds.
pub fn permission_for(kind: &str) -> Option<&'static str> {
    PERMISSIONS.iter().find(|(k, _)| *k == kind).map(|(_, p)| *p)
}

/// Permissions for drafts of the element editors, which share the draft store.
const ELEMENT_PERMISSIONS: &[(ElementKind, &str)] = &[
    (ElementKind::Document, "documents"),
    (ElementKind::Asset, "assets"),
    (ElementKind::Object, "objects"),
];

/// Permission guarding drafts of `kind`: a settings kind or an element family.
pub fn draft_permission(kind: &str) -> Option<&'static str> {
    permission_for(kind).or_else(|| {
        let family = element_kind(kind)?;
        ELEMENT_PERMISSIONS.iter().find(|(k, _)| *k == family).map(|(_, p)| *p)
    })
}

/// Element family named by a settings `type` column, if it references one.
pub(crate) fn element_kind(type_name: &str) -> Option<ElementKind> {
    type_name.parse().ok()
}

/// Replace an element path in `data` with the element id. Unknown paths become null.
pub(crate) async fn element_path_to_id(
    kind: ElementKind,
    data: &Value,
    elements: &dyn ElementResolver,
) -> Result<Value, AppError> {
    match data {
        Value::String(path) if !path.is_empty() => Ok(elements
            .id_by_path(kind, path)
            .await?
            .map(Value::from)
            .unwrap_or(Value::Null)),
        Value::Number(_) => Ok(data.clone()),
        _ => Ok(Value::Null),
    }
}

/// Render a stored element id as its path. Unknown ids render as null.
pub(crate) async fn element_id_to_path(
    kind: ElementKind,
    data: &Value,
    elements: &dyn ElementResolver,
) -> Result<Value, AppError> {
    let id = match data {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    match id {
        Some(id) => Ok(elements.path_by_id(kind, id).await?.map(Value::from).unwrap_or(Value::Null)),
        None => Ok(Value::Null),
    }
}

pub(crate) fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}
