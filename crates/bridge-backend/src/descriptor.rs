//! Backend-native tool descriptors

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// One callable operation as listed by `GET /tools`.
///
/// Every field is optional on the wire; the translator decides what a
/// missing field means. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    /// HTTP method of the underlying REST operation (informational only)
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub parameters: Option<Vec<JsonValue>>,
}

impl ToolDescriptor {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: Some(id.into()), ..Default::default() }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_parameters(mut self, parameters: Vec<JsonValue>) -> Self {
        self.parameters = Some(parameters);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_sparse_descriptor() {
        let d: ToolDescriptor =
            serde_json::from_value(json!({"id": "getUser", "path": "/user/{id}"})).unwrap();
        assert_eq!(d.id.as_deref(), Some("getUser"));
        assert_eq!(d.path.as_deref(), Some("/user/{id}"));
        assert!(d.summary.is_none());
        assert!(d.parameters.is_none());
    }

    #[test]
    fn ignores_unknown_fields_and_keeps_parameters_verbatim() {
        let d: ToolDescriptor = serde_json::from_value(json!({
            "id": "addPet",
            "method": "POST",
            "extra": {"nested": true},
            "parameters": [{"name": "body", "inType": "body", "required": true, "x-custom": 1}]
        }))
        .unwrap();
        assert_eq!(d.method.as_deref(), Some("POST"));
        let params = d.parameters.unwrap();
        assert_eq!(params[0]["x-custom"], json!(1));
    }

    #[test]
    fn null_fields_decode_as_absent() {
        let d: ToolDescriptor =
            serde_json::from_value(json!({"id": null, "summary": null, "parameters": null}))
                .unwrap();
        assert!(d.id.is_none());
        assert!(d.summary.is_none());
        assert!(d.parameters.is_none());
    }
}
