//! Input schema derivation from backend parameter lists

use serde_json::{json, Map, Value};

pub type JsonObject = Map<String, Value>;

const BODY_PROPERTY: &str = "body";
const BODY_DESCRIPTION: &str = "JSON payload body (see API spec for fields)";

/// Typed view of one backend parameter. Each field is read on its own, so a
/// badly typed field never hides the others.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSpec {
    pub name: Option<String>,
    /// path, query, header or body
    pub in_type: Option<String>,
    pub required: bool,
    pub param_type: Option<String>,
    pub description: Option<String>,
}

impl ParameterSpec {
    /// `None` only when the parameter is not a JSON object
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let text = |key: &str| obj.get(key).and_then(Value::as_str).map(str::to_string);
        Some(Self {
            name: text("name"),
            in_type: text("inType"),
            required: obj.get("required").is_some_and(is_truthy),
            param_type: text("type"),
            description: text("description"),
        })
    }

    pub fn is_body(&self) -> bool {
        self.in_type.as_deref().is_some_and(|t| t.eq_ignore_ascii_case(BODY_PROPERTY))
    }

    pub fn is_required(&self) -> bool {
        self.required
    }
}

/// `true` and `"true"` (any case) count as set
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Map a backend type name to a JSON Schema primitive type
pub fn json_type_for(type_name: Option<&str>) -> &'static str {
    match type_name.map(str::to_ascii_lowercase).as_deref() {
        Some("integer" | "int" | "long") => "integer",
        Some("number" | "float" | "double") => "number",
        Some("boolean") => "boolean",
        Some("object") => "object",
        Some("array") => "array",
        _ => "string",
    }
}

/// Build the `inputSchema` object advertised for a tool.
///
/// Named parameters become properties; a body parameter anywhere in the
/// list guarantees a required `body` object property.
pub fn derive_input_schema(parameters: &[Value]) -> JsonObject {
    let mut properties = Map::new();
    let mut required: Vec<String> = Vec::new();
    let mut has_body = false;

    for spec in parameters.iter().filter_map(ParameterSpec::from_value) {
        has_body |= spec.is_body();
        let Some(name) = spec.name.as_deref().filter(|n| !n.is_empty()) else {
            continue;
        };

        let mut property = Map::new();
        property.insert("type".into(), json!(json_type_for(spec.param_type.as_deref())));
        if let Some(desc) = spec.description.as_deref().filter(|d| !d.is_empty()) {
            property.insert("description".into(), json!(desc));
        }
        properties.insert(name.to_string(), Value::Object(property));

        if spec.is_required() && !required.iter().any(|r| r == name) {
            required.push(name.to_string());
        }
    }

    if has_body {
        properties
            .entry(BODY_PROPERTY)
            .or_insert_with(|| json!({"type": "object", "description": BODY_DESCRIPTION}));
        if !required.iter().any(|r| r == BODY_PROPERTY) {
            required.push(BODY_PROPERTY.to_string());
        }
    }

    let mut schema = Map::new();
    schema.insert("type".into(), json!("object"));
    schema.insert("properties".into(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".into(), json!(required));
    }
    schema.insert("additionalProperties".into(), json!(false));
    schema
}
