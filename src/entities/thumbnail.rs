//! Image thumbnail configurations and the grouped tree shared with video thumbnails.

use crate::entity::{value, EntityId, FieldSetter, ListableEntity};
use crate::field;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThumbnailConfig {
    pub id: Option<EntityId>,
    pub name: String,
    pub description: String,
    pub group: String,
    pub format: String,
    pub quality: Option<i64>,
    pub high_resolution: Option<f64>,
    pub downloadable: bool,
    /// Transformation pipeline steps, opaque to this crate.
    pub items: Vec<Value>,
    /// Per media-query pipelines.
    pub medias: Value,
}

#[async_trait]
impl ListableEntity for ThumbnailConfig {
    const KIND: &'static str = "thumbnail";
    const PERMISSION: &'static str = "thumbnails";
    const FIELDS: &'static [FieldSetter<Self>] = &[
        field!("name" => name, value::text),
        field!("description" => description, value::text),
        field!("group" => group, value::text),
        field!("format" => format, value::text),
        field!("quality" => quality, value::opt_int),
        field!("highResolution" => high_resolution, value::opt_float),
        field!("downloadable" => downloadable, value::flag),
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

fn leaf(name: &str) -> Value {
    json!({ "id": name, "text": name, "leaf": true })
}

/// Tree for the thumbnail editors from `(name, group)` pairs: ungrouped configs as
/// leaves, then one folder per group in order of first appearance.
pub fn grouped_tree<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Vec<Value> {
    let mut leaves = Vec::new();
    let mut groups: Vec<(&str, Value)> = Vec::new();
    for (name, group) in entries {
        if group.is_empty() {
            leaves.push(leaf(name));
            continue;
        }
        let pos = match groups.iter().position(|(g, _)| *g == group) {
            Some(pos) => pos,
            None => {
                groups.push((
                    group,
                    json!({
                        "id": format!("group_{}", name),
                        "text": group,
                        "expandable": true,
                        "leaf": false,
                        "allowChildren": true,
                        "group": group,
                        "children": [],
                    }),
                ));
                groups.len() - 1
            }
        };
        if let Some(Value::Array(children)) = groups[pos].1.get_mut("children") {
            children.push(leaf(name));
        }
    }
    leaves.extend(groups.into_iter().map(|(_, node)| node));
    leaves
}

pub fn thumbnail_tree(configs: &[ThumbnailConfig]) -> Vec<Value> {
    grouped_tree(configs.iter().map(|c| (c.name.as_str(), c.group.as_str())))
}

/// `[{id, text}]` for every downloadable thumbnail.
pub fn downloadable(configs: &[ThumbnailConfig]) -> Vec<Value> {
    configs
        .iter()
        .filter(|c| c.downloadable)
        .map(|c| json!({ "id": c.name, "text": c.name }))
        .collect()
}
