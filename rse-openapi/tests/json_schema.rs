use rse_openapi::{
    FieldKind, HttpMethod, Info, JsonSchemaSource, OpenApiRegistry, Projection, ResponseDecl,
    RouteEntry, SchemaSource,
};
use schemars::JsonSchema;
use serde_json::{json, Value};
use std::collections::BTreeSet;

// ── Fixtures ────────────────────────────────────────────────────────────────

#[allow(dead_code)]
#[derive(JsonSchema)]
struct Owner {
    name: String,
    email: Option<String>,
}

#[allow(dead_code)]
#[derive(JsonSchema)]
enum Status {
    Available,
    Sold,
}

/// A pet in the store.
#[allow(dead_code)]
#[derive(JsonSchema)]
struct Pet {
    id: u64,
    /// Name shown in listings.
    name: String,
    tags: Vec<String>,
    owner: Option<Owner>,
    friends: Vec<Pet>,
    status: Status,
}

fn registry() -> OpenApiRegistry {
    OpenApiRegistry::new(Info::new("Pets", "1.0.0"))
}

fn required_of(value: &Value) -> BTreeSet<String> {
    value["required"]
        .as_array()
        .map(|names| {
            names
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

// ── Field introspection ─────────────────────────────────────────────────────

#[test]
fn reads_fields_of_derived_schema() {
    let source = JsonSchemaSource::of::<Pet>();
    assert_eq!(source.type_name(), "Pet");
    assert_eq!(source.description().as_deref(), Some("A pet in the store."));

    let fields: std::collections::HashMap<_, _> = source.fields().into_iter().collect();
    assert_eq!(fields["id"].kind, FieldKind::Integer);
    assert!(fields["id"].required);
    assert_eq!(fields["tags"].kind, FieldKind::list_of(FieldKind::String));
    assert_eq!(fields["owner"].kind, FieldKind::Nested);
    assert!(!fields["owner"].required);
    assert_eq!(fields["friends"].kind, FieldKind::list_of(FieldKind::Nested));
    assert_eq!(fields["status"].kind, FieldKind::String);
    assert_eq!(
        fields["name"].description.as_deref(),
        Some("Name shown in listings.")
    );
}

// ── Registration ────────────────────────────────────────────────────────────

#[test]
fn registers_nested_and_recursive_types() {
    let mut registry = registry();
    let (name, schema) = registry
        .add_schema(&JsonSchemaSource::of::<Pet>(), None)
        .unwrap();
    assert_eq!(name, "Pet");

    let value = schema.project();
    assert_eq!(
        value["properties"]["owner"],
        json!({"$ref": "#/components/schemas/Owner"})
    );
    assert_eq!(
        value["properties"]["friends"]["items"],
        json!({"$ref": "#/components/schemas/Pet"})
    );
    assert_eq!(
        value["properties"]["status"]["enum"],
        json!(["Available", "Sold"])
    );
    assert_eq!(value["properties"]["id"]["minimum"], 0);
    assert_eq!(
        required_of(&value),
        ["friends", "id", "name", "status", "tags"]
            .into_iter()
            .map(str::to_string)
            .collect()
    );

    let owner = registry.schema("Owner").unwrap().project();
    assert_eq!(
        required_of(&owner),
        BTreeSet::from(["name".to_string()])
    );
}

#[test]
fn hand_written_json_schema_with_definitions() {
    let root = json!({
        "title": "Order",
        "type": "object",
        "required": ["lines"],
        "properties": {
            "lines": {"type": "array", "items": {"$ref": "#/definitions/Line"}, "minItems": 1},
            "note": {"type": ["string", "null"], "maxLength": 140}
        },
        "definitions": {
            "Line": {
                "type": "object",
                "required": ["sku", "qty"],
                "properties": {
                    "sku": {"type": "string", "pattern": "^[A-Z0-9]+$"},
                    "qty": {"type": "integer", "minimum": 1}
                }
            }
        }
    });

    let mut registry = registry();
    let (name, schema) = registry
        .add_schema(&JsonSchemaSource::from_value("OrderSchema", root), None)
        .unwrap();
    assert_eq!(name, "Order");

    let value = schema.project();
    assert_eq!(
        value["properties"]["lines"],
        json!({"type": "array", "items": {"$ref": "#/components/schemas/Line"}, "minItems": 1})
    );
    assert_eq!(
        value["properties"]["note"],
        json!({"type": "string", "maxLength": 140})
    );
    assert_eq!(
        registry.schema("Line").unwrap().project()["properties"]["qty"],
        json!({"type": "integer", "minimum": 1})
    );
}

#[test]
fn derived_types_in_annotations() {
    let mut registry = registry();
    let pets = registry.register_handler("pets", ["/pets/<int:id>"]);
    registry
        .on(pets, HttpMethod::Get)
        .response(ResponseDecl::source(&JsonSchemaSource::of::<Pet>()))
        .unwrap();

    let routes = [RouteEntry::new("/pets/<int:id>", "pets", [HttpMethod::Get])];
    let doc = registry.render(&routes).unwrap();
    let value = doc.project();
    assert_eq!(
        value["paths"]["/pets/{id}"]["get"]["responses"]["200"]["description"],
        "Pet response"
    );
    assert!(value["components"]["schemas"]["Owner"].is_object());
}
