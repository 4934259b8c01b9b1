//! Predefined element properties.

use crate::collaborators::ElementResolver;
use crate::entity::{value, EntityId, FieldSetter, ListableEntity};
use crate::error::AppError;
use crate::field;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PredefinedProperty {
    pub id: Option<EntityId>,
    pub name: String,
    pub description: String,
    pub key: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub data: String,
    pub config: String,
    /// Comma-separated element types the property applies to.
    pub ctype: String,
    pub inheritable: bool,
    pub creation_date: i64,
    pub modification_date: i64,
}

#[async_trait]
impl ListableEntity for PredefinedProperty {
    const KIND: &'static str = "property";
    const PERMISSION: &'static str = "predefined_properties";
    const FIELDS: &'static [FieldSetter<Self>] = &[
        field!("name" => name, value::text),
        field!("description" => description, value::text),
        field!("key" => key, value::text),
        field!("type" => type_, value::text),
        field!("data" => data, value::text),
        field!("config" => config, value::text),
        field!("ctype" => ctype, value::text),
        field!("inheritable" => inheritable, value::flag),
    ];

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
        _current: Option<&Self>,
        _elements: &dyn ElementResolver,
    ) -> Result<(), AppError> {
        if let Some(Value::Array(types)) = fields.get("ctype") {
            let joined = types
                .iter()
                .filter_map(|t| t.as_str())
                .collect::<Vec<_>>()
                .join(",");
            fields.insert("ctype".into(), Value::String(joined));
        }
        Ok(())
    }
}
