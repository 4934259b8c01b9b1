//! Glossary entries. Links to documents are stored by document id and shown by path.

use crate::collaborators::{ElementKind, ElementResolver};
use crate::entity::{value, EntityId, FieldSetter, ListableEntity};
use crate::error::AppError;
use crate::field;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Glossary {
    pub id: Option<EntityId>,
    pub text: String,
    pub link: String,
    pub abbr: String,
    pub language: String,
    pub casesensitive: bool,
    pub exactmatch: bool,
    pub site: Option<i64>,
    pub creation_date: i64,
    pub modification_date: i64,
}

#[async_trait]
impl ListableEntity for Glossary {
    const KIND: &'static str = "glossary";
    const PERMISSION: &'static str = "glossary";
    const FIELDS: &'static [FieldSetter<Self>] = &[
        field!("text" => text, value::text),
        field!("link" => link, value::text),
        field!("abbr" => abbr, value::text),
        field!("language" => language, value::text),
        field!("casesensitive" => casesensitive, value::flag),
        field!("exactmatch" => exactmatch, value::flag),
        field!("site" => site, value::opt_int),
    ];
    const CACHE_TAGS: &'static [&'static str] = &["glossary"];

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
        elements: &dyn ElementResolver,
    ) -> Result<(), AppError> {
        let link = match fields.get("link") {
            Some(Value::String(link)) if !link.is_empty() => link.clone(),
            _ => return Ok(()),
        };
        if let Some(doc_id) = elements.id_by_path(ElementKind::Document, &link).await? {
            fields.insert("link".into(), Value::String(doc_id.to_string()));
        }
        Ok(())
    }

    async fn present(&self, elements: &dyn ElementResolver) -> Result<Value, AppError> {
        let mut out = self.field_values();
        if let Ok(doc_id) = self.link.trim().parse::<i64>() {
            if doc_id > 0 {
                if let Some(path) = elements.path_by_id(ElementKind::Document, doc_id).await? {
                    out.insert("link".into(), Value::String(path));
                }
            }
        }
        Ok(Value::Object(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::StaticElementResolver;
    use crate::entity::apply_fields;
    use serde_json::json;

    #[tokio::test]
    async fn document_links_round_trip_through_ids() {
        let elements = StaticElementResolver::new().with(ElementKind::Document, 42, "/about");
        let mut fields = json!({"text": "foo", "link": "/about"}).as_object().cloned().unwrap();
        Glossary::normalize_input(&mut fields, None, &elements).await.unwrap();

        let mut g = Glossary::default();
        apply_fields(&mut g, &fields).unwrap();
        assert_eq!(g.link, "42");
        assert_eq!(g.present(&elements).await.unwrap()["link"], json!("/about"));
    }

    #[tokio::test]
    async fn external_links_stay_verbatim() {
        let elements = StaticElementResolver::new();
        let mut fields = json!({"link": "https://example.org"}).as_object().cloned().unwrap();
        Glossary::normalize_input(&mut fields, None, &elements).await.unwrap();
        assert_eq!(fields["link"], json!("https://example.org"));
    }
}
