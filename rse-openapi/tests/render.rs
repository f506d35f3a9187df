use rse_openapi::{
    DataType, FieldDescriptor, HttpMethod, Info, ObjectSchema, OpenApiRegistry, OperationProps,
    Parameter, Reference, RequestDecl, Response, ResponseDecl, RouteEntry, Schema,
    SecurityRequirement, SecurityScheme, Server, SpecFormat, StatusKey, Tag,
};
use serde_json::{json, Value};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn registry() -> OpenApiRegistry {
    OpenApiRegistry::new(Info::new("Shop", "1.0.0"))
}

fn item_schema() -> ObjectSchema {
    ObjectSchema::new("ItemSchema")
        .field("id", FieldDescriptor::integer().required())
        .field("label", FieldDescriptor::string().required())
}

fn render_json(registry: &mut OpenApiRegistry, routes: &[RouteEntry]) -> Value {
    let text = registry.render_to_string(routes, SpecFormat::Json).unwrap();
    serde_json::from_str(&text).unwrap()
}

fn item_routes() -> Vec<RouteEntry> {
    vec![
        RouteEntry::new("/items", "items", [HttpMethod::Get, HttpMethod::Post]),
        RouteEntry::new(
            "/items/<int:id>",
            "items",
            [HttpMethod::Get, HttpMethod::Put, HttpMethod::Delete],
        ),
    ]
}

// ── Annotations to operations ──────────────────────────────────────────────

#[test]
fn annotated_get_becomes_an_operation() {
    let mut registry = registry();
    let items = registry.register_handler("items", ["/items/<int:id>"]);
    let schema = item_schema();
    registry
        .on(items, HttpMethod::Get)
        .response(ResponseDecl::source(&schema))
        .unwrap()
        .props(OperationProps::new().summary("Fetch an item").tag("items"));

    let spec = render_json(&mut registry, &item_routes());

    let op = &spec["paths"]["/items/{id}"]["get"];
    assert_eq!(op["summary"], "Fetch an item");
    assert_eq!(op["tags"], json!(["items"]));
    assert_eq!(
        op["responses"]["200"],
        json!({
            "description": "Item response",
            "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Item"}}}
        })
    );
    assert_eq!(
        op["parameters"],
        json!([{"name": "id", "in": "path", "required": true, "description": "id", "schema": {"type": "integer"}}])
    );
    assert_eq!(
        spec["components"]["schemas"]["Item"]["required"],
        json!(["id", "label"])
    );
}

#[test]
fn status_is_autodetected_from_method() {
    let mut registry = registry();
    let items = registry.register_handler("items", ["/items", "/items/<int:id>"]);
    let schema = item_schema();
    registry
        .on(items, HttpMethod::Post)
        .request(RequestDecl::source(&schema))
        .unwrap()
        .response(ResponseDecl::source(&schema))
        .unwrap();
    registry
        .on(items, HttpMethod::Put)
        .response(ResponseDecl::source(&schema))
        .unwrap();
    registry
        .on(items, HttpMethod::Delete)
        .response(ResponseDecl::ready(Response::new("Gone")))
        .unwrap();

    let spec = render_json(&mut registry, &item_routes());
    let post = &spec["paths"]["/items"]["post"];
    assert!(post["responses"].get("201").is_some());
    assert_eq!(
        post["requestBody"],
        json!({
            "description": "Item request",
            "required": true,
            "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Item"}}}
        })
    );
    assert!(spec["paths"]["/items/{id}"]["put"]["responses"]
        .get("200")
        .is_some());
    assert_eq!(
        spec["paths"]["/items/{id}"]["delete"]["responses"]["204"],
        json!({"description": "Gone"})
    );
}

#[test]
fn explicit_status_description_and_content_types() {
    let mut registry = registry();
    let items = registry.register_handler("items", ["/items"]);
    registry
        .on(items, HttpMethod::Get)
        .response(
            ResponseDecl::reference(Reference::schema("Item"))
                .status(StatusKey::Code(206))
                .description("A page of items")
                .content_type("application/json")
                .content_type("application/x-ndjson"),
        )
        .unwrap()
        .response(
            ResponseDecl::schema(Schema::of(DataType::String)).status(StatusKey::Default),
        )
        .unwrap();

    let spec = render_json(&mut registry, &item_routes());
    let responses = &spec["paths"]["/items"]["get"]["responses"];
    assert_eq!(responses["206"]["description"], "A page of items");
    assert_eq!(
        responses["206"]["content"]["application/x-ndjson"]["schema"]["$ref"],
        "#/components/schemas/Item"
    );
    assert_eq!(responses["default"]["description"], "Inline response");
}

#[test]
fn declared_parameters_come_before_path_parameters() {
    let mut registry = registry();
    let items = registry.register_handler("items", ["/items/<int:id>"]);
    registry
        .on(items, HttpMethod::Get)
        .response(ResponseDecl::ready(Response::new("ok")))
        .unwrap()
        .props(
            OperationProps::new()
                .parameter(Parameter::query("fields", Schema::of(DataType::String)))
                .parameter(
                    Parameter::path("id", Schema::of(DataType::Integer))
                        .with_description("Item id"),
                ),
        );

    let spec = render_json(&mut registry, &item_routes());
    let params = spec["paths"]["/items/{id}"]["get"]["parameters"]
        .as_array()
        .unwrap()
        .clone();
    assert_eq!(params.len(), 2);
    assert_eq!(params[0]["name"], "fields");
    assert_eq!(params[1]["description"], "Item id");
}

#[test]
fn annotation_without_responses_is_skipped() {
    let mut registry = registry();
    let items = registry.register_handler("items", ["/items"]);
    registry
        .on(items, HttpMethod::Get)
        .props(OperationProps::new().summary("No responses yet"));

    let spec = render_json(&mut registry, &item_routes());
    assert!(spec["paths"].get("/items").is_none());
}

// ── Default delete ─────────────────────────────────────────────────────────

#[test]
fn unannotated_delete_gets_a_default_operation() {
    let mut registry = registry();
    registry.register_handler("items", ["/items/<int:id>"]);

    let spec = render_json(&mut registry, &item_routes());
    let path = &spec["paths"]["/items/{id}"];

    assert_eq!(
        path["delete"],
        json!({
            "description": "Delete an item",
            "parameters": [{"name": "id", "in": "path", "required": true, "description": "id", "schema": {"type": "integer"}}],
            "responses": {"204": {"description": "Deleted an item"}}
        })
    );
    // Undocumented GET and PUT are skipped.
    assert!(path.get("get").is_none());
    assert!(path.get("put").is_none());
}

#[test]
fn default_delete_uses_item_name_and_declared_props() {
    let mut registry = registry();
    let users = registry.register_handler("users", ["/users/<uuid:user_id>"]);
    registry.set_item_name(users, "order");
    registry
        .on(users, HttpMethod::Delete)
        .props(OperationProps::new().summary("Remove").tag("admin"));

    let routes = [RouteEntry::new(
        "/users/<uuid:user_id>",
        "users",
        [HttpMethod::Delete],
    )];
    let spec = render_json(&mut registry, &routes);
    let delete = &spec["paths"]["/users/{user_id}"]["delete"];

    assert_eq!(delete["description"], "Delete an order");
    assert_eq!(delete["summary"], "Remove");
    assert_eq!(delete["tags"], json!(["admin"]));
    assert_eq!(delete["parameters"][0]["schema"]["format"], "uuid");
    assert!(delete.get("requestBody").is_none());
}

// ── Route matching ─────────────────────────────────────────────────────────

#[test]
fn two_handlers_on_one_url_share_a_path() {
    let mut registry = registry();
    let reader = registry.register_handler("a_reader", ["/a"]);
    let writer = registry.register_handler("a_writer", ["/a"]);
    registry
        .on(reader, HttpMethod::Get)
        .response(ResponseDecl::ready(Response::new("read")))
        .unwrap();
    registry
        .on(writer, HttpMethod::Post)
        .response(ResponseDecl::ready(Response::new("written")))
        .unwrap();

    let routes = [
        RouteEntry::new("/a", "a_reader", [HttpMethod::Get]),
        RouteEntry::new("/a", "a_writer", [HttpMethod::Post]),
    ];
    let doc = registry.render(&routes).unwrap();

    assert_eq!(doc.paths.len(), 1);
    let path = doc.paths.get("/a").unwrap();
    assert!(path.operation(HttpMethod::Get).is_some());
    assert!(path.operation(HttpMethod::Post).is_some());
    assert_eq!(registry.conflicts(), 0);
}

#[test]
fn default_delete_never_replaces_an_annotated_one() {
    let mut registry = registry();
    let reader = registry.register_handler("reader", ["/a"]);
    let writer = registry.register_handler("writer", ["/a"]);
    registry
        .on(reader, HttpMethod::Delete)
        .response(ResponseDecl::ready(Response::new("Removed")).status(StatusKey::Code(200)))
        .unwrap();
    registry
        .on(writer, HttpMethod::Post)
        .response(ResponseDecl::ready(Response::new("written")))
        .unwrap();

    let routes = [
        RouteEntry::new("/a", "reader", [HttpMethod::Delete]),
        RouteEntry::new("/a", "writer", [HttpMethod::Post]),
    ];
    let spec = render_json(&mut registry, &routes);
    let path = &spec["paths"]["/a"];

    assert_eq!(
        path["delete"]["responses"],
        json!({"200": {"description": "Removed"}})
    );
    assert_eq!(path["post"]["responses"]["201"]["description"], "written");
    assert_eq!(registry.conflicts(), 0);
}

#[test]
fn default_delete_belongs_to_the_route_endpoint() {
    let mut registry = registry();
    let reader = registry.register_handler("reader", ["/a"]);
    let writer = registry.register_handler("writer", ["/a"]);
    registry.set_item_name(reader, "record");
    registry.set_item_name(writer, "entry");

    let routes = [RouteEntry::new("/a", "writer", [HttpMethod::Delete])];
    let spec = render_json(&mut registry, &routes);

    assert_eq!(spec["paths"]["/a"]["delete"]["description"], "Delete an entry");
    assert_eq!(registry.conflicts(), 0);
}

#[test]
fn annotated_delete_wins_regardless_of_route_order() {
    let mut registry = registry();
    let reader = registry.register_handler("reader", ["/a"]);
    registry.register_handler("writer", ["/a"]);
    registry
        .on(reader, HttpMethod::Delete)
        .response(ResponseDecl::ready(Response::new("Removed")))
        .unwrap();

    let routes = [
        RouteEntry::new("/a", "writer", [HttpMethod::Delete]),
        RouteEntry::new("/a", "reader", [HttpMethod::Delete]),
    ];
    let spec = render_json(&mut registry, &routes);

    assert_eq!(
        spec["paths"]["/a"]["delete"]["responses"]["204"]["description"],
        "Removed"
    );
    assert_eq!(registry.conflicts(), 0);
}

#[test]
fn handler_without_urls_matches_by_endpoint() {
    let mut registry = registry();
    let health = registry.register_handler("health", Vec::<String>::new());
    registry
        .on(health, HttpMethod::Get)
        .response(ResponseDecl::ready(Response::new("Healthy")))
        .unwrap();

    let routes = [
        RouteEntry::new("/healthz", "health", [HttpMethod::Get]),
        RouteEntry::new("/other", "other", [HttpMethod::Get]),
    ];
    let spec = render_json(&mut registry, &routes);
    assert_eq!(
        spec["paths"]["/healthz"]["get"]["responses"]["200"]["description"],
        "Healthy"
    );
    assert!(spec["paths"].get("/other").is_none());
}

#[test]
fn duplicate_url_and_method_keeps_last_and_counts() {
    let mut registry = registry();
    let first = registry.register_handler("first", ["/dup"]);
    let second = registry.register_handler("second", ["/dup"]);
    for (handler, text) in [(first, "first"), (second, "second")] {
        registry
            .on(handler, HttpMethod::Get)
            .response(ResponseDecl::ready(Response::new(text)))
            .unwrap();
    }

    let routes = [RouteEntry::new("/dup", "first", [HttpMethod::Get])];
    let spec = render_json(&mut registry, &routes);
    assert_eq!(
        spec["paths"]["/dup"]["get"]["responses"]["200"]["description"],
        "second"
    );
    assert_eq!(registry.conflicts(), 1);
}

#[test]
fn stale_annotations_are_dropped() {
    let mut registry = registry();
    let live = registry.register_handler("live", ["/live"]);
    let gone = registry.register_handler("gone", ["/gone"]);
    for handler in [live, gone] {
        registry
            .on(handler, HttpMethod::Get)
            .response(ResponseDecl::ready(Response::new("ok")))
            .unwrap();
    }
    assert_eq!(registry.pending_count(), 2);

    let routes = [RouteEntry::new("/live", "live", [HttpMethod::Get])];
    registry.render(&routes).unwrap();
    assert_eq!(registry.pending_count(), 1);
}

#[test]
fn unknown_url_type_fails_render() {
    let mut registry = registry();
    registry.register_handler("odd", ["/odd/<color:c>"]);
    let routes = [RouteEntry::new("/odd/<color:c>", "odd", [HttpMethod::Get])];
    assert!(registry.render(&routes).is_err());
}

// ── Idempotence and document shape ─────────────────────────────────────────

#[test]
fn render_is_idempotent() {
    let mut registry = registry();
    let items = registry.register_handler("items", ["/items", "/items/<int:id>"]);
    let schema = item_schema();
    registry
        .on(items, HttpMethod::Get)
        .response(ResponseDecl::source(&schema))
        .unwrap();
    registry
        .on(items, HttpMethod::Post)
        .request(RequestDecl::source(&schema))
        .unwrap()
        .response(ResponseDecl::source(&schema))
        .unwrap();

    let routes = item_routes();
    let first = registry.render_to_string(&routes, SpecFormat::Json).unwrap();
    let second = registry.render_to_string(&routes, SpecFormat::Json).unwrap();
    assert_eq!(first, second);
    assert_eq!(registry.paths().len(), 2);
}

#[test]
fn document_carries_registry_metadata() {
    let mut registry = registry();
    registry.info_mut().description = Some("Shop API".into());
    registry.add_server(Server::new("https://api.example.com"));
    registry.add_tag(Tag::new("items").with_description("Catalogue"));
    registry.add_security_scheme("bearer", SecurityScheme::bearer("JWT"));
    registry.add_security(SecurityRequirement::new("bearer", Vec::<String>::new()));

    let spec = render_json(&mut registry, &[]);
    assert_eq!(spec["openapi"], "3.0.0");
    assert_eq!(spec["info"]["description"], "Shop API");
    assert_eq!(spec["paths"], json!({}));
    assert_eq!(spec["servers"], json!([{"url": "https://api.example.com"}]));
    assert_eq!(spec["tags"][0]["name"], "items");
    assert_eq!(
        spec["components"]["securitySchemes"]["bearer"]["scheme"],
        "bearer"
    );
    assert_eq!(spec["security"], json!([{"bearer": []}]));
}

#[test]
fn yaml_output() {
    let mut registry = registry();
    let items = registry.register_handler("items", ["/items"]);
    registry
        .on(items, HttpMethod::Get)
        .response(ResponseDecl::ready(Response::new("ok")))
        .unwrap();

    let yaml = registry
        .render_to_string(&item_routes(), SpecFormat::Yaml)
        .unwrap();
    let parsed: Value = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(
        parsed["paths"]["/items"]["get"]["responses"]["200"]["description"],
        "ok"
    );
}
