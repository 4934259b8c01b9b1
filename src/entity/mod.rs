//! The listable-entity contract shared by every settings list.

pub mod value;

use crate::collaborators::ElementResolver;
use crate::error::AppError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Storage-assigned identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub i64);

impl EntityId {
    /// Read an id the way the grids send it: a number or a numeric string.
    pub fn from_value(v: &Value) -> Option<EntityId> {
        match v {
            Value::Number(n) => n.as_i64().map(EntityId),
            Value::String(s) => s.trim().parse().ok().map(EntityId),
            _ => None,
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Typed setter registered for one wire field name.
pub struct FieldSetter<E> {
    pub name: &'static str,
    pub apply: fn(&mut E, &Value) -> Result<(), AppError>,
}

/// Build a `FieldSetter` that converts the wire value with one of the `value` helpers.
#[macro_export]
macro_rules! field {
    ($name:literal => $field:ident, $conv:path) => {
        $crate::entity::FieldSetter {
            name: $name,
            apply: |e, v| {
                e.$field = $conv($name, v)?;
                Ok(())
            },
        }
    };
}

/// A persisted settings record that the list controller can filter, sort, page and mutate.
#[async_trait]
pub trait ListableEntity: Clone + Default + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Storage kind, also the draft namespace.
    const KIND: &'static str;
    /// Permission required for mutations.
    const PERMISSION: &'static str;
    /// Writable fields. Keys missing here are ignored on input.
    const FIELDS: &'static [FieldSetter<Self>];
    /// Fields whose combined values must be distinct across the collection.
    const UNIQUE_KEY: &'static [&'static str] = &[];
    /// Cache tags invalidated after a successful mutation.
    const CACHE_TAGS: &'static [&'static str] = &[];

    fn id(&self) -> Option<EntityId>;

    fn set_id(&mut self, id: EntityId);

    /// Stamp creation/modification times (unix seconds). No-op for kinds without them.
    fn touch(&mut self, _now: i64, _created: bool) {}

    /// Flat projection used for filtering, sorting and uniqueness.
    fn field_values(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// Rewrite decoded input before it reaches the setters. `current` is the stored
    /// entity on update, None on create.
    async fn normalize_input(
        _fields: &mut Map<String, Value>,
        _current: Option<&Self>,
        _elements: &dyn ElementResolver,
    ) -> Result<(), AppError> {
        Ok(())
    }

    /// Wire representation of a stored entity.
    async fn present(&self, _elements: &dyn ElementResolver) -> Result<Value, AppError> {
        Ok(Value::Object(self.field_values()))
    }
}

/// Apply every known field from `fields` through the entity's setter table.
pub fn apply_fields<E: ListableEntity>(entity: &mut E, fields: &Map<String, Value>) -> Result<(), AppError> {
    for (name, v) in fields {
        if let Some(setter) = E::FIELDS.iter().find(|s| s.name == name) {
            (setter.apply)(entity, v)?;
        }
    }
    Ok(())
}

/// Values of the uniqueness key, or None when the kind declares none.
pub fn unique_key<E: ListableEntity>(entity: &E) -> Option<Vec<Value>> {
    if E::UNIQUE_KEY.is_empty() {
        return None;
    }
    let values = entity.field_values();
    Some(
        E::UNIQUE_KEY
            .iter()
            .map(|k| values.get(*k).cloned().unwrap_or(Value::Null))
            .collect(),
    )
}

/// Canonical single-string form of the uniqueness key (stored in a UNIQUE column).
pub fn unique_key_string<E: ListableEntity>(entity: &E) -> Option<String> {
    unique_key(entity).map(|parts| {
        parts
            .iter()
            .map(|v| match v {
                Value::Null => String::new(),
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join("\u{1f}")
    })
}

/// Trim every string value in place.
pub fn trim_strings(fields: &mut Map<String, Value>) {
    for v in fields.values_mut() {
        if let Value::String(s) = v {
            let trimmed = s.trim();
            if trimmed.len() != s.len() {
                *s = trimmed.to_string();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    struct Sample {
        id: Option<EntityId>,
        name: String,
        language: String,
        priority: i64,
    }

    impl ListableEntity for Sample {
        const KIND: &'static str = "sample";
        const PERMISSION: &'static str = "sample";
        const FIELDS: &'static [FieldSetter<Self>] = &[
            field!("name" => name, value::text),
            field!("language" => language, value::text),
            field!("priority" => priority, value::int),
        ];
        const UNIQUE_KEY: &'static [&'static str] = &["name", "language"];

        fn id(&self) -> Option<EntityId> {
            self.id
        }

        fn set_id(&mut self, id: EntityId) {
            self.id = Some(id);
        }
    }

    #[test]
    fn apply_ignores_unknown_and_id_fields() {
        let mut s = Sample::default();
        let fields = json!({"id": 9, "name": "a", "priority": "3", "bogus": true});
        apply_fields(&mut s, fields.as_object().unwrap()).unwrap();
        assert_eq!(s.id, None);
        assert_eq!(s.name, "a");
        assert_eq!(s.priority, 3);
    }

    #[test]
    fn bad_shape_is_rejected() {
        let mut s = Sample::default();
        let fields = json!({"priority": "high"});
        assert!(matches!(
            apply_fields(&mut s, fields.as_object().unwrap()),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn unique_key_joins_declared_fields() {
        let s = Sample {
            name: "logo".into(),
            language: "en".into(),
            ..Default::default()
        };
        assert_eq!(unique_key(&s), Some(vec![json!("logo"), json!("en")]));
        assert_eq!(unique_key_string(&s).as_deref(), Some("logo\u{1f}en"));
    }

    #[test]
    fn id_parses_from_string_or_number() {
        assert_eq!(EntityId::from_value(&json!("12")), Some(EntityId(12)));
        assert_eq!(EntityId::from_value(&json!(7)), Some(EntityId(7)));
        assert_eq!(EntityId::from_value(&json!("x")), None);
    }
}
