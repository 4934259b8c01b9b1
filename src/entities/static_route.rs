//! Static routes: URL pattern → controller/action mappings.

use crate::collaborators::ElementResolver;
use crate::entity::{trim_strings, value, EntityId, FieldSetter, ListableEntity};
use crate::error::AppError;
use crate::field;
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StaticRoute {
    pub id: Option<EntityId>,
    pub name: String,
    pub pattern: String,
    pub reverse: String,
    pub controller: String,
    pub action: String,
    pub variables: String,
    pub defaults: String,
    pub site_id: Vec<i64>,
    pub priority: i64,
    pub methods: String,
    pub creation_date: i64,
    pub modification_date: i64,
}

/// Strip PCRE-style delimiters and trailing flags: `/^\/news$/i` → `^\/news$`.
fn pattern_body(pattern: &str) -> &str {
    let mut chars = pattern.chars();
    let Some(delim) = chars.next() else {
        return pattern;
    };
    if delim.is_alphanumeric() || delim == '\\' || delim.is_whitespace() || delim == '^' || delim == '(' {
        return pattern;
    }
    match pattern.rfind(delim) {
        Some(end) if end > 0 && pattern[end + 1..].chars().all(|c| c.is_ascii_alphabetic()) => &pattern[1..end],
        _ => pattern,
    }
}

fn set_pattern(route: &mut StaticRoute, v: &Value) -> Result<(), AppError> {
    let pattern = value::text("pattern", v)?;
    if !pattern.is_empty() {
        Regex::new(pattern_body(&pattern))
            .map_err(|e| AppError::BadRequest(format!("pattern is not a valid regular expression: {}", e)))?;
    }
    route.pattern = pattern;
    Ok(())
}

#[async_trait]
impl ListableEntity for StaticRoute {
    const KIND: &'static str = "staticroute";
    const PERMISSION: &'static str = "routes";
    const FIELDS: &'static [FieldSetter<Self>] = &[
        field!("name" => name, value::text),
        FieldSetter {
            name: "pattern",
            apply: set_pattern,
        },
        field!("reverse" => reverse, value::text),
        field!("controller" => controller, value::text),
        field!("action" => action, value::text),
        field!("variables" => variables, value::text),
        field!("defaults" => defaults, value::text),
        field!("siteId" => site_id, value::int_list),
        field!("priority" => priority, value::int),
        field!("methods" => methods, value::text),
    ];
    const UNIQUE_KEY: &'static [&'static str] = &["name"];

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
        trim_strings(fields);
        Ok(())
    }

    async fn present(&self, _elements: &dyn ElementResolver) -> Result<Value, AppError> {
        let mut out = self.field_values();
        let sites: Vec<String> = self.site_id.iter().map(i64::to_string).collect();
        out.insert("siteId".into(), Value::String(sites.join(",")));
        Ok(Value::Object(out))
    }
}
