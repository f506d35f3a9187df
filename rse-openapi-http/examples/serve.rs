//! Serves the document of a small pet store at `http://localhost:3000/swagger.json`.
//!
//! Reads `openapi.yaml` from the working directory when present.

use rse_openapi::{
    FieldDescriptor, FieldKind, HttpMethod, Info, ObjectSchema, OpenApiRegistry, OperationProps,
    RequestDecl, ResponseDecl, RouteEntry, SecurityRequirement, SecurityScheme,
};
use rse_openapi_http::{init_tracing, openapi_routes, OpenApiConfig};
use std::sync::Arc;
use tokio::sync::Mutex;

fn pet_schema() -> ObjectSchema {
    ObjectSchema::new("PetSchema")
        .field("id", FieldDescriptor::integer().required())
        .field(
            "name",
            FieldDescriptor::string().required().length(Some(1), Some(64)),
        )
        .field("born", FieldDescriptor::new(FieldKind::Date))
        .field("friends", FieldDescriptor::list_of_enclosing())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let mut registry = OpenApiRegistry::new(
        Info::new("Pet Store", "1.0.0").with_description("Pets and their friends"),
    );
    registry.add_security_scheme("bearer", SecurityScheme::bearer("JWT"));
    registry.add_security(SecurityRequirement::new("bearer", Vec::<String>::new()));

    let pets = registry.register_handler("pets", ["/pets", "/pets/<int:id>"]);
    registry.set_item_name(pets, "pet");
    let schema = pet_schema();

    registry
        .on(pets, HttpMethod::Get)
        .response(ResponseDecl::source(&schema))?
        .props(OperationProps::new().summary("Fetch pets").tag("pets"));
    registry
        .on(pets, HttpMethod::Post)
        .request(RequestDecl::source(&schema).exclude(["id"]))?
        .response(ResponseDecl::source(&schema))?;

    let routes = vec![
        RouteEntry::new("/pets", "pets", [HttpMethod::Get, HttpMethod::Post]),
        RouteEntry::new("/pets/<int:id>", "pets", [HttpMethod::Get, HttpMethod::Delete]),
    ];

    let config = OpenApiConfig::load("openapi.yaml")?;
    let app: axum::Router = openapi_routes(Arc::new(Mutex::new(registry)), routes, config);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    tracing::info!("Listening on http://localhost:3000/swagger.json");
    axum::serve(listener, app).await?;
    Ok(())
}
