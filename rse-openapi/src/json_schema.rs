use crate::source::{FieldDescriptor, FieldKind, SchemaSource};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;

/// A [`SchemaSource`] reading a JSON Schema document, as produced by
/// `schemars`.
///
/// Understands `properties`, `required`, `$ref` into `$defs` (or
/// `definitions`), nullable `anyOf` / `type` arrays, array `items`, string
/// formats, numeric and length bounds, `pattern` and `enum`.
#[derive(Debug, Clone)]
pub struct JsonSchemaSource {
    name: String,
    root: Value,
    defs: Arc<Map<String, Value>>,
}

impl JsonSchemaSource {
    /// Generates the JSON Schema of `T` with schemars.
    pub fn of<T: schemars::JsonSchema>() -> Self {
        let schema = schemars::schema_for!(T);
        let root = serde_json::to_value(&schema).unwrap_or_default();
        Self::from_value(T::schema_name(), root)
    }

    pub fn from_value(name: impl Into<String>, root: Value) -> Self {
        let defs = root
            .get("$defs")
            .or_else(|| root.get("definitions"))
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        Self {
            name: name.into(),
            root,
            defs: Arc::new(defs),
        }
    }

    fn definition(&self, name: &str) -> Option<JsonSchemaSource> {
        self.defs.get(name).map(|root| JsonSchemaSource {
            name: name.to_string(),
            root: root.clone(),
            defs: Arc::clone(&self.defs),
        })
    }

    fn describe(&self, property: &Value, required: bool) -> FieldDescriptor {
        let (inner, nullable) = strip_null(property);
        let mut field = self.field_for(inner);
        field.required = required && !nullable;

        if let Some(description) = lookup(property, inner, "description").and_then(Value::as_str) {
            field.description = Some(description.to_string());
        }
        if let Some(default) = lookup(property, inner, "default") {
            field.default = Some(default.clone());
        }
        field
    }

    fn field_for(&self, property: &Value) -> FieldDescriptor {
        if let Some(pointer) = property.get("$ref").and_then(Value::as_str) {
            return self.reference_field(pointer, false);
        }

        let mut field = match primary_type(property) {
            Some("array") => return self.array_field(property),
            Some("string") => {
                let kind = match property.get("format").and_then(Value::as_str) {
                    Some("date-time") => FieldKind::DateTime,
                    Some("date") => FieldKind::Date,
                    Some("time") => FieldKind::Time,
                    Some("uuid") => FieldKind::Uuid,
                    Some("email") => FieldKind::Email,
                    Some("uri") | Some("url") => FieldKind::Url,
                    _ => FieldKind::String,
                };
                let mut field = FieldDescriptor::new(kind);
                let (min, max) = (u64_of(property, "minLength"), u64_of(property, "maxLength"));
                if min.is_some() || max.is_some() {
                    field = field.length(min, max);
                }
                if let Some(pattern) = property.get("pattern").and_then(Value::as_str) {
                    field = field.pattern(pattern);
                }
                field
            }
            Some(kind @ ("integer" | "number")) => {
                let kind = if kind == "integer" {
                    FieldKind::Integer
                } else {
                    FieldKind::Number
                };
                let mut field = FieldDescriptor::new(kind);
                let (min, max) = (f64_of(property, "minimum"), f64_of(property, "maximum"));
                if min.is_some() || max.is_some() {
                    field = field.range(min, max);
                }
                field
            }
            Some("boolean") => FieldDescriptor::boolean(),
            Some("object") => FieldDescriptor::new(FieldKind::Dict),
            Some(other) => FieldDescriptor::new(FieldKind::Other(other.to_string())),
            None => FieldDescriptor::new(FieldKind::Other("any".to_string())),
        };

        if let Some(choices) = property.get("enum").and_then(Value::as_array) {
            field = field.one_of(choices.iter().cloned());
        } else if let Some(constant) = property.get("const") {
            field = field.one_of([constant.clone()]);
        }
        field
    }

    fn array_field(&self, property: &Value) -> FieldDescriptor {
        let mut field = match property.get("items") {
            Some(items) => match items.get("$ref").and_then(Value::as_str) {
                Some(pointer) => self.reference_field(pointer, true),
                None => FieldDescriptor::list(self.field_for(items).kind),
            },
            None => FieldDescriptor::list(FieldKind::Other("any".to_string())),
        };
        let (min, max) = (u64_of(property, "minItems"), u64_of(property, "maxItems"));
        if min.is_some() || max.is_some() {
            field = field.length(min, max);
        }
        field
    }

    fn reference_field(&self, pointer: &str, list: bool) -> FieldDescriptor {
        let target = definition_name(pointer);
        if pointer == "#" || target == Some(self.name.as_str()) {
            return if list {
                FieldDescriptor::list_of_enclosing()
            } else {
                FieldDescriptor::enclosing()
            };
        }

        let Some(definition) = target.and_then(|name| self.definition(name)) else {
            return FieldDescriptor::new(FieldKind::Other(pointer.to_string()));
        };

        // Enums and other non-object definitions are inlined.
        if definition.root.get("properties").is_none() {
            let field = definition.field_for(&definition.root);
            return if list {
                FieldDescriptor::list(field.kind)
            } else {
                field
            };
        }

        let shared: Arc<dyn SchemaSource + Send + Sync> = Arc::new(definition);
        if list {
            FieldDescriptor::list_of_shared(shared)
        } else {
            FieldDescriptor::nested_shared(shared)
        }
    }
}

impl SchemaSource for JsonSchemaSource {
    fn type_name(&self) -> String {
        self.name.clone()
    }

    fn fields(&self) -> Vec<(String, FieldDescriptor)> {
        let required: HashSet<&str> = self
            .root
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        self.root
            .get("properties")
            .and_then(Value::as_object)
            .map(|properties| {
                properties
                    .iter()
                    .map(|(name, property)| {
                        let field = self.describe(property, required.contains(name.as_str()));
                        (name.clone(), field)
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn description(&self) -> Option<String> {
        self.root
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

/// Unwraps `anyOf: [X, {"type": "null"}]`; reports whether null was allowed.
fn strip_null(property: &Value) -> (&Value, bool) {
    if let Some(branches) = property.get("anyOf").and_then(Value::as_array) {
        let (nulls, others): (Vec<&Value>, Vec<&Value>) = branches
            .iter()
            .partition(|branch| branch.get("type").and_then(Value::as_str) == Some("null"));
        if let ([single], false) = (others.as_slice(), nulls.is_empty()) {
            return (*single, true);
        }
    }
    let nullable = property
        .get("type")
        .and_then(Value::as_array)
        .is_some_and(|types| types.iter().any(|t| t.as_str() == Some("null")))
        || property.get("nullable").and_then(Value::as_bool) == Some(true);
    (property, nullable)
}

/// Reads `key` from the nullable wrapper first, then from the wrapped schema.
fn lookup<'v>(outer: &'v Value, inner: &'v Value, key: &str) -> Option<&'v Value> {
    outer.get(key).or_else(|| inner.get(key))
}

/// First non-null entry of `type`.
fn primary_type(property: &Value) -> Option<&str> {
    match property.get("type")? {
        Value::String(single) => Some(single.as_str()),
        Value::Array(types) => types
            .iter()
            .filter_map(Value::as_str)
            .find(|t| *t != "null"),
        _ => None,
    }
}

fn definition_name(pointer: &str) -> Option<&str> {
    pointer
        .strip_prefix("#/$defs/")
        .or_else(|| pointer.strip_prefix("#/definitions/"))
}

fn u64_of(property: &Value, key: &str) -> Option<u64> {
    property.get(key).and_then(Value::as_u64)
}

fn f64_of(property: &Value, key: &str) -> Option<f64> {
    property.get(key).and_then(Value::as_f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Validator;
    use serde_json::json;

    #[test]
    fn nullable_any_of_is_unwrapped() {
        let property = json!({"anyOf": [{"$ref": "#/$defs/Owner"}, {"type": "null"}]});
        let (inner, nullable) = strip_null(&property);
        assert!(nullable);
        assert_eq!(inner, &json!({"$ref": "#/$defs/Owner"}));
    }

    #[test]
    fn type_array_with_null() {
        let property = json!({"type": ["string", "null"], "maxLength": 5});
        let source = JsonSchemaSource::from_value("T", json!({}));
        let field = source.describe(&property, true);
        assert_eq!(field.kind, FieldKind::String);
        assert!(!field.required);
        assert_eq!(
            field.validators,
            vec![Validator::Length {
                min: None,
                max: Some(5)
            }]
        );
    }

    #[test]
    fn enum_definitions_are_inlined() {
        let root = json!({
            "type": "object",
            "properties": {"status": {"$ref": "#/$defs/Status"}},
            "$defs": {"Status": {"type": "string", "enum": ["open", "closed"]}}
        });
        let source = JsonSchemaSource::from_value("Ticket", root);
        let fields = source.fields();
        assert_eq!(fields[0].1.kind, FieldKind::String);
        assert!(fields[0].1.nested.is_none());
        assert_eq!(
            fields[0].1.validators,
            vec![Validator::OneOf(vec![json!("open"), json!("closed")])]
        );
    }
}
