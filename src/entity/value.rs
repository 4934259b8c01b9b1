//! Lenient coercions from grid-submitted JSON values into typed fields.
//!
//! ExtJS stores post numbers as strings and booleans as "on"/"1" depending on the
//! editor, so every setter goes through these helpers.

use crate::error::AppError;
use serde::de::DeserializeOwned;
use serde_json::Value;

fn shape_error(field: &str, expected: &str, v: &Value) -> AppError {
    AppError::BadRequest(format!("{} must be {}, got {}", field, expected, v))
}

pub fn text(field: &str, v: &Value) -> Result<String, AppError> {
    match v {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(if *b { "1".into() } else { String::new() }),
        other => Err(shape_error(field, "a string", other)),
    }
}

pub fn opt_text(field: &str, v: &Value) -> Result<Option<String>, AppError> {
    let s = text(field, v)?;
    Ok(if s.is_empty() { None } else { Some(s) })
}

pub fn opt_int(field: &str, v: &Value) -> Result<Option<i64>, AppError> {
    match v {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().and_then(integral))
            .map(Some)
            .ok_or_else(|| shape_error(field, "an integer", v)),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| shape_error(field, "an integer", v)),
        Value::Bool(b) => Ok(Some(i64::from(*b))),
        other => Err(shape_error(field, "an integer", other)),
    }
}

/// `f` as i64 only when it has no fractional part and fits the range.
fn integral(f: f64) -> Option<i64> {
    const BOUND: f64 = 9_223_372_036_854_775_808.0;
    (f.fract() == 0.0 && (-BOUND..BOUND).contains(&f)).then_some(f as i64)
}

pub fn int(field: &str, v: &Value) -> Result<i64, AppError> {
    Ok(opt_int(field, v)?.unwrap_or(0))
}

pub fn opt_float(field: &str, v: &Value) -> Result<Option<f64>, AppError> {
    match v {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(n.as_f64()),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| shape_error(field, "a number", v)),
        other => Err(shape_error(field, "a number", other)),
    }
}

pub fn flag(field: &str, v: &Value) -> Result<bool, AppError> {
    match v {
        Value::Null => Ok(false),
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => Ok(n.as_f64().map(|f| f != 0.0).unwrap_or(false)),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "" | "0" | "false" | "off" | "no" => Ok(false),
            "1" | "true" | "on" | "yes" => Ok(true),
            _ => Err(shape_error(field, "a boolean", v)),
        },
        other => Err(shape_error(field, "a boolean", other)),
    }
}

/// Integer list from a JSON array or a comma-separated string ("1,3").
pub fn int_list(field: &str, v: &Value) -> Result<Vec<i64>, AppError> {
    match v {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| opt_int(field, item).transpose())
            .collect(),
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| part.parse::<i64>().map_err(|_| shape_error(field, "a list of integers", v)))
            .collect(),
        Value::Number(_) => Ok(opt_int(field, v)?.into_iter().collect()),
        other => Err(shape_error(field, "a list of integers", other)),
    }
}

pub fn list(field: &str, v: &Value) -> Result<Vec<Value>, AppError> {
    match v {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => Ok(items.clone()),
        other => Err(shape_error(field, "an array", other)),
    }
}

/// Structured value decoded with serde (nested grid records).
pub fn typed<T: DeserializeOwned>(field: &str, v: &Value) -> Result<T, AppError> {
    serde_json::from_value(v.clone()).map_err(|e| AppError::BadRequest(format!("{}: {}", field, e)))
}

/// Free-form JSON kept as-is; empty strings collapse to null.
pub fn json(_field: &str, v: &Value) -> Result<Value, AppError> {
    Ok(match v {
        Value::String(s) if s.is_empty() => Value::Null,
        other => other.clone(),
    })
}
