//! Predefined asset metadata definitions.

use super::{element_id_to_path, element_kind, element_path_to_id};
use crate::collaborators::ElementResolver;
use crate::entity::{value, EntityId, FieldSetter, ListableEntity};
use crate::error::AppError;
use crate::field;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PredefinedMetadata {
    pub id: Option<EntityId>,
    pub name: String,
    pub description: String,
    pub language: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub data: Value,
    pub target_subtype: String,
    pub config: String,
    pub creation_date: i64,
    pub modification_date: i64,
}

impl PredefinedMetadata {
    /// Definitions offered for an element of `type_name` / `sub_type`. An empty target
    /// subtype applies to every subtype.
    pub fn applies_to(&self, type_name: Option<&str>, sub_type: Option<&str>) -> bool {
        let type_ok = type_name.map_or(true, |t| t.is_empty() || self.type_ == t);
        let sub_ok = self.target_subtype.is_empty() || sub_type.map_or(true, |s| s.is_empty() || self.target_subtype == s);
        type_ok && sub_ok
    }
}

#[async_trait]
impl ListableEntity for PredefinedMetadata {
    const KIND: &'static str = "metadata";
    const PERMISSION: &'static str = "asset_metadata";
    const FIELDS: &'static [FieldSetter<Self>] = &[
        field!("name" => name, value::text),
        field!("description" => description, value::text),
        field!("language" => language, value::text),
        field!("type" => type_, value::text),
        field!("data" => data, value::json),
        field!("targetSubtype" => target_subtype, value::text),
        field!("config" => config, value::text),
    ];
    const UNIQUE_KEY: &'static [&'static str] = &["name", "language", "targetSubtype"];

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }

    fn touch(&mut self, now: i64, created: bool) {
        if created {
            self.creation_date = now;
        }
        self.modification_date = now;
    }

    async fn normalize_input(
        fields: &mut Map<String, Value>,
        current: Option<&Self>,
        elements: &dyn ElementResolver,
    ) -> Result<(), AppError> {
        let type_name = match fields.get("type") {
            Some(Value::String(t)) => t.clone(),
            _ => current.map(|c| c.type_.clone()).unwrap_or_default(),
        };
        if let (Some(kind), Some(data)) = (element_kind(&type_name), fields.get("data").cloned()) {
            let id = element_path_to_id(kind, &data, elements).await?;
            fields.insert("data".into(), id);
        }
        Ok(())
    }

    async fn present(&self, elements: &dyn ElementResolver) -> Result<Value, AppError> {
        let mut out = self.field_values();
        if let Some(kind) = element_kind(&self.type_) {
            out.insert("data".into(), element_id_to_path(kind, &self.data, elements).await?);
        }
        Ok(Value::Object(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{ElementKind, StaticElementResolver};
    use serde_json::json;

    #[test]
    fn empty_subtype_applies_everywhere() {
        let m = PredefinedMetadata {
            type_: "input".into(),
            ..Default::default()
        };
        assert!(m.applies_to(Some("input"), Some("image")));
        assert!(!m.applies_to(Some("asset"), Some("image")));

        let images_only = PredefinedMetadata {
            type_: "input".into(),
            target_subtype: "image".into(),
            ..Default::default()
        };
        assert!(images_only.applies_to(Some("input"), Some("image")));
        assert!(!images_only.applies_to(Some("input"), Some("video")));
    }

    #[tokio::test]
    async fn asset_data_is_minimized_using_stored_type() {
        let elements = StaticElementResolver::new().with(ElementKind::Asset, 7, "/logo.png");
        let current = PredefinedMetadata {
            type_: "asset".into(),
            ..Default::default()
        };
        let mut fields = json!({"data": "/logo.png"}).as_object().cloned().unwrap();
        PredefinedMetadata::normalize_input(&mut fields, Some(&current), &elements).await.unwrap();
        assert_eq!(fields["data"], json!(7));

        let stored = PredefinedMetadata {
            data: json!(7),
            ..current
        };
        assert_eq!(stored.present(&elements).await.unwrap()["data"], json!("/logo.png"));
    }
}
