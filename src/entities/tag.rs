//! Tag (snippet) configurations injected into matching pages.

use crate::collaborators::ElementResolver;
use crate::entity::{value, EntityId, FieldSetter, ListableEntity};
use crate::error::AppError;
use crate::field;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Number of get/post parameter rows the tag form exposes.
const PARAM_ROWS: usize = 5;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagParam {
    pub name: Option<String>,
    pub value: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TagConfig {
    pub id: Option<EntityId>,
    pub name: String,
    pub description: String,
    pub http_method: String,
    pub url_pattern: String,
    pub text_pattern: String,
    pub items: Vec<Value>,
    pub params: Vec<TagParam>,
}

/// Combine the date part of `date` with the time part of `time` (both ISO `…T…`).
fn combine_date_time(date: &str, time: &str) -> Option<i64> {
    let day = date.split('T').next()?;
    let clock = time.split('T').nth(1)?;
    NaiveDateTime::parse_from_str(&format!("{}T{}", day, clock), "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|dt| dt.and_utc().timestamp())
}

/// Fold the tag form's flattened `item.<n>.<field>` and `params.name<i>` keys
/// into `items` and `params`.
fn fold_form_keys(fields: &mut Map<String, Value>) {
    let mut items: BTreeMap<usize, Map<String, Value>> = BTreeMap::new();
    for (key, v) in fields.iter() {
        let mut parts = key.splitn(3, '.');
        let (Some("item"), Some(index), Some(attr)) = (parts.next(), parts.next(), parts.next()) else {
            continue;
        };
        let Ok(index) = index.parse::<usize>() else {
            continue;
        };
        let value = match attr {
            "time" => continue,
            "date" => {
                let time = fields.get(&format!("item.{}.time", index)).and_then(Value::as_str);
                match (v.as_str(), time) {
                    (Some(date), Some(time)) if !date.is_empty() && !time.is_empty() => {
                        combine_date_time(date, time).map(Value::from).unwrap_or(Value::Null)
                    }
                    _ => Value::Null,
                }
            }
            _ => v.clone(),
        };
        items.entry(index).or_default().insert(attr.to_string(), value);
    }
    if !items.is_empty() {
        fields.retain(|k, _| !k.starts_with("item."));
        fields.insert("items".into(), Value::Array(items.into_values().map(Value::Object).collect()));
    }

    let has_params = (0..PARAM_ROWS).any(|i| fields.contains_key(&format!("params.name{}", i)));
    if has_params {
        let params: Vec<Value> = (0..PARAM_ROWS)
            .map(|i| {
                let name = fields.remove(&format!("params.name{}", i)).unwrap_or(Value::Null);
                let value = fields.remove(&format!("params.value{}", i)).unwrap_or(Value::Null);
                serde_json::json!({ "name": name, "value": value })
            })
            .collect();
        fields.insert("params".into(), Value::Array(params));
    }
}

#[async_trait]
impl ListableEntity for TagConfig {
    const KIND: &'static str = "tag";
    const PERMISSION: &'static str = "tag_snippet_management";
    const FIELDS: &'static [FieldSetter<Self>] = &[
        field!("name" => name, value::text),
        field!("description" => description, value::text),
        field!("httpMethod" => http_method, value::text),
        field!("urlPattern" => url_pattern, value::text),
        field!("textPattern" => text_pattern, value::text),
        field!("items" => items, value::list),
        field!("params" => params, value::typed),
    ];
    const UNIQUE_KEY: &'static [&'static str] = &["name"];

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }

    async fn normalize_input(
        fields: &mut Map<String, Value>,
        _current: Option<&Self>,
        _elements: &dyn ElementResolver,
    ) -> Result<(), AppError> {
        fold_form_keys(fields);
        Ok(())
    }
}

/// `[{id, text}]` node per tag config, for the tag editor tree.
pub fn tag_tree(tags: &[TagConfig]) -> Vec<Value> {
    tags.iter()
        .map(|t| serde_json::json!({ "id": t.name, "text": t.name }))
        .collect()
}
