use indexmap::IndexMap;
use serde_json::{json, Map, Value};

/// Closed declarative shape a generation call asserts its JSON output must
/// satisfy. Serializes into the endpoint's `responseSchema` wire form and
/// doubles as the validator applied to the decoded response.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Text {
        description: Option<String>,
    },
    Array {
        items: Box<SchemaNode>,
        description: Option<String>,
    },
    Object {
        properties: IndexMap<String, SchemaNode>,
        required: Vec<String>,
        description: Option<String>,
    },
}

impl SchemaNode {
    pub fn text() -> Self {
        Self::Text { description: None }
    }

    pub fn text_with(description: impl Into<String>) -> Self {
        Self::Text {
            description: Some(description.into()),
        }
    }

    pub fn array_of(items: SchemaNode) -> Self {
        Self::Array {
            items: Box::new(items),
            description: None,
        }
    }

    pub fn array_with(description: impl Into<String>, items: SchemaNode) -> Self {
        Self::Array {
            items: Box::new(items),
            description: Some(description.into()),
        }
    }

    pub fn object(fields: Vec<(&str, SchemaNode)>, required: &[&str]) -> Self {
        let mut properties = IndexMap::new();
        for (name, node) in fields {
            properties.insert(name.to_string(), node);
        }
        Self::Object {
            properties,
            required: required.iter().map(|name| (*name).to_string()).collect(),
            description: None,
        }
    }

    pub fn describe(mut self, text: impl Into<String>) -> Self {
        let slot = match &mut self {
            Self::Text { description } => description,
            Self::Array { description, .. } => description,
            Self::Object { description, .. } => description,
        };
        *slot = Some(text.into());
        self
    }

    /// Field names the root object marks as required. Empty for non-object
    /// roots.
    pub fn required_fields(&self) -> &[String] {
        match self {
            Self::Object { required, .. } => required.as_slice(),
            _ => &[],
        }
    }

    /// Renders the endpoint wire form (`{"type": "STRING" | "ARRAY" |
    /// "OBJECT", ...}`).
    pub fn to_value(&self) -> Value {
        match self {
            Self::Text { description } => {
                let mut node = Map::new();
                node.insert("type".to_string(), json!("STRING"));
                if let Some(description) = description {
                    node.insert("description".to_string(), json!(description));
                }
                Value::Object(node)
            }
            Self::Array { items, description } => {
                let mut node = Map::new();
                node.insert("type".to_string(), json!("ARRAY"));
                if let Some(description) = description {
                    node.insert("description".to_string(), json!(description));
                }
                node.insert("items".to_string(), items.to_value());
                Value::Object(node)
            }
            Self::Object {
                properties,
                required,
                description,
            } => {
                let mut node = Map::new();
                node.insert("type".to_string(), json!("OBJECT"));
                if let Some(description) = description {
                    node.insert("description".to_string(), json!(description));
                }
                let mut rendered = Map::new();
                for (name, child) in properties {
                    rendered.insert(name.clone(), child.to_value());
                }
                node.insert("properties".to_string(), Value::Object(rendered));
                if !required.is_empty() {
                    node.insert(
                        "required".to_string(),
                        Value::Array(required.iter().map(|name| json!(name)).collect()),
                    );
                }
                Value::Object(node)
            }
        }
    }

    /// Walks `payload` against this shape and reports every problem found:
    /// missing required fields and wrong-kind values, each as a dotted path.
    pub fn validate(&self, payload: &Value) -> Result<(), Vec<String>> {
        let mut problems = Vec::new();
        self.check(payload, "", &mut problems);
        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems)
        }
    }

    fn check(&self, payload: &Value, path: &str, problems: &mut Vec<String>) {
        match self {
            Self::Text { .. } => {
                if !payload.is_string() {
                    problems.push(format!("{}: expected string", display_path(path)));
                }
            }
            Self::Array { items, .. } => match payload.as_array() {
                Some(rows) => {
                    for (idx, row) in rows.iter().enumerate() {
                        let child_path = format!("{}[{idx}]", path);
                        items.check(row, &child_path, problems);
                    }
                }
                None => problems.push(format!("{}: expected array", display_path(path))),
            },
            Self::Object {
                properties,
                required,
                ..
            } => {
                let Some(object) = payload.as_object() else {
                    problems.push(format!("{}: expected object", display_path(path)));
                    return;
                };
                for name in required {
                    if !object.contains_key(name) {
                        problems.push(format!("missing required field {}", join_path(path, name)));
                    }
                }
                for (name, child) in properties {
                    if let Some(value) = object.get(name) {
                        child.check(value, &join_path(path, name), problems);
                    }
                }
            }
        }
    }
}

fn join_path(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "(root)"
    } else {
        path
    }
}
