//! Website settings: typed key/value pairs per language and site.

use super::{element_id_to_path, element_kind, element_path_to_id};
use crate::collaborators::ElementResolver;
use crate::entity::{trim_strings, value, EntityId, FieldSetter, ListableEntity};
use crate::error::AppError;
use crate::field;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebsiteSetting {
    pub id: Option<EntityId>,
    pub name: String,
    pub language: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub data: Value,
    pub site_id: Option<i64>,
    pub creation_date: i64,
    pub modification_date: i64,
}

#[async_trait]
impl ListableEntity for WebsiteSetting {
    const KIND: &'static str = "websitesetting";
    const PERMISSION: &'static str = "website_settings";
    const FIELDS: &'static [FieldSetter<Self>] = &[
        field!("name" => name, value::text),
        field!("language" => language, value::text),
        field!("type" => type_, value::text),
        field!("data" => data, value::json),
        field!("siteId" => site_id, value::opt_int),
    ];
    const UNIQUE_KEY: &'static [&'static str] = &["name", "language"];

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
        trim_strings(fields);
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
