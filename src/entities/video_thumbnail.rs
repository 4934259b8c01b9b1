//! Video thumbnail (transcoding) configurations.

use super::thumbnail::grouped_tree;
use crate::entity::{value, EntityId, FieldSetter, ListableEntity};
use crate::field;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoThumbnailConfig {
    pub id: Option<EntityId>,
    pub name: String,
    pub description: String,
    pub group: String,
    /// Kilobits per second; None keeps the source rate.
    pub video_bitrate: Option<i64>,
    pub audio_bitrate: Option<i64>,
    pub items: Vec<Value>,
    pub medias: Value,
}

#[async_trait]
impl ListableEntity for VideoThumbnailConfig {
    const KIND: &'static str = "videothumbnail";
    const PERMISSION: &'static str = "thumbnails";
    const FIELDS: &'static [FieldSetter<Self>] = &[
        field!("name" => name, value::text),
        field!("description" => description, value::text),
        field!("group" => group, value::text),
        field!("videoBitrate" => video_bitrate, value::opt_int),
        field!("audioBitrate" => audio_bitrate, value::opt_int),
        field!("items" => items, value::list),
        field!("medias" => medias, value::json),
    ];
    const UNIQUE_KEY: &'static [&'static str] = &["name"];

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }
}

pub fn video_thumbnail_tree(configs: &[VideoThumbnailConfig]) -> Vec<Value> {
    grouped_tree(configs.iter().map(|c| (c.name.as_str(), c.group.as_str())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::apply_fields;
    use serde_json::json;

    #[test]
    fn bitrates_accept_grid_strings() {
        let mut config = VideoThumbnailConfig::default();
        let fields = json!({"name": "web-mp4", "videoBitrate": "800", "audioBitrate": ""})
            .as_object()
            .cloned()
            .unwrap();
        apply_fields(&mut config, &fields).unwrap();
        assert_eq!(config.video_bitrate, Some(800));
        assert_eq!(config.audio_bitrate, None);
    }

    #[test]
    fn tree_groups_like_image_thumbnails() {
        let configs = vec![
            VideoThumbnailConfig {
                name: "preview".into(),
                group: "web".into(),
                ..Default::default()
            },
            VideoThumbnailConfig {
                name: "raw".into(),
                ..Default::default()
            },
        ];
        let tree = video_thumbnail_tree(&configs);
        assert_eq!(tree[0]["id"], json!("raw"));
        assert_eq!(tree[1]["id"], json!("group_preview"));
        assert_eq!(tree[1]["children"][0]["text"], json!("preview"));
    }
}
