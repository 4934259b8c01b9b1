//! List query: free-text filter, stable single-key sort, offset/limit paging.

use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// "DESC" in any case is descending; everything else ascends.
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortSpec {
    pub key: String,
    pub direction: SortDirection,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub filter: Option<String>,
    pub sort: Option<SortSpec>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ListResult<T> {
    pub items: Vec<T>,
    /// Filtered count before paging.
    pub total: usize,
}

impl ListQuery {
    /// Build from merged request parameters: `filter`, `limit`, `start`, and the ExtJS sort params.
    pub fn from_params(params: &HashMap<String, Value>) -> Self {
        let filter = params
            .get("filter")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(String::from);
        ListQuery {
            filter,
            sort: extract_sorting(params),
            limit: params.get("limit").and_then(as_usize),
            offset: params.get("start").and_then(as_usize),
        }
    }

    /// Filter, sort and page `rows` (each paired with its field projection).
    pub fn apply<T>(&self, rows: Vec<(T, Map<String, Value>)>) -> ListResult<T> {
        let mut rows: Vec<(T, Map<String, Value>)> = match &self.filter {
            Some(needle) => rows.into_iter().filter(|(_, fields)| matches_filter(fields, needle)).collect(),
            None => rows,
        };

        if let Some(sort) = &self.sort {
            // sort_by is stable; reversing the comparison keeps ties in input order.
            rows.sort_by(|(_, a), (_, b)| {
                let ord = compare_values(
                    a.get(&sort.key).unwrap_or(&Value::Null),
                    b.get(&sort.key).unwrap_or(&Value::Null),
                );
                match sort.direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            });
        }

        let total = rows.len();
        let offset = self.offset.unwrap_or(0).min(total);
        let limit = self.limit.unwrap_or(total);
        let items = rows.into_iter().skip(offset).take(limit).map(|(item, _)| item).collect();
        ListResult { items, total }
    }
}

fn as_usize(v: &Value) -> Option<usize> {
    match v {
        Value::Number(n) => n.as_u64().map(|n| n as usize),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Sorting from `sort` as ExtJS JSON (`[{"property":"name","direction":"DESC"}]`)
/// or legacy `sort` + `dir`. Properties starting with `~` are grid-internal and ignored.
pub fn extract_sorting(params: &HashMap<String, Value>) -> Option<SortSpec> {
    let mut key: Option<String> = None;
    let mut direction = SortDirection::Asc;

    match params.get("sort") {
        Some(Value::String(raw)) => match serde_json::from_str::<Value>(raw) {
            Ok(parsed @ (Value::Array(_) | Value::Object(_))) => {
                (key, direction) = sorter_from_json(&parsed);
            }
            _ => {
                if !raw.is_empty() {
                    key = Some(raw.clone());
                }
            }
        },
        Some(parsed @ (Value::Array(_) | Value::Object(_))) => {
            (key, direction) = sorter_from_json(parsed);
        }
        _ => {}
    }

    if let Some(dir) = params.get("dir").and_then(Value::as_str) {
        direction = SortDirection::parse(dir);
    }

    key.filter(|k| !k.starts_with('~'))
        .map(|key| SortSpec { key, direction })
}

fn sorter_from_json(v: &Value) -> (Option<String>, SortDirection) {
    let first = match v {
        Value::Array(items) => items.first(),
        other => Some(other),
    };
    let Some(sorter) = first else {
        return (None, SortDirection::Asc);
    };
    let key = sorter.get("property").and_then(Value::as_str).map(String::from);
    let direction = sorter
        .get("direction")
        .and_then(Value::as_str)
        .map(SortDirection::parse)
        .unwrap_or_default();
    (key, direction)
}

/// True when any field's string form contains `needle` (case-sensitive).
pub fn matches_filter(fields: &Map<String, Value>, needle: &str) -> bool {
    fields.values().any(|v| value_contains(v, needle))
}

fn value_contains(v: &Value, needle: &str) -> bool {
    match v {
        Value::Array(items) => items.iter().any(|item| value_contains(item, needle)),
        other => scalar_string(other).map(|s| s.contains(needle)).unwrap_or(false),
    }
}

/// String form of a scalar; None for null, arrays and objects.
pub fn scalar_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(if *b { "1".into() } else { String::new() }),
        _ => None,
    }
}

/// Total order over field values: null first, then numbers, strings and booleans
/// within their own kind; mixed kinds compare by string form.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => display_form(a).cmp(&display_form(b)),
    }
}

fn display_form(v: &Value) -> String {
    scalar_string(v).unwrap_or_else(|| v.to_string())
}
