//! Standard ExtJS store envelope: `{ success, data, total?, message? }`.

use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Envelope {
    pub fn one(data: Value) -> Self {
        Envelope {
            success: true,
            data: Some(data),
            total: None,
            message: None,
        }
    }

    pub fn many(data: Vec<Value>, total: usize) -> Self {
        Envelope {
            success: true,
            data: Some(Value::Array(data)),
            total: Some(total),
            message: None,
        }
    }

    /// Successful answer with an empty data set (destroy).
    pub fn empty() -> Self {
        Envelope {
            success: true,
            data: Some(Value::Array(Vec::new())),
            total: None,
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Envelope {
            success: false,
            data: None,
            total: None,
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_envelope_carries_total() {
        let v = serde_json::to_value(Envelope::many(vec![json!({"id": 1})], 4)).unwrap();
        assert_eq!(v, json!({"success": true, "data": [{"id": 1}], "total": 4}));
    }

    #[test]
    fn failure_envelope_omits_data() {
        let v = serde_json::to_value(Envelope::failure("rule_violation")).unwrap();
        assert_eq!(v, json!({"success": false, "message": "rule_violation"}));
    }
}
