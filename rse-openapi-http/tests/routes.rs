use axum::body::Body;
use axum::Router;
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use rse_openapi::{
    FieldDescriptor, HttpMethod, Info, ObjectSchema, OpenApiRegistry, ResponseDecl, RouteEntry,
    SpecFormat, Tag,
};
use rse_openapi_http::{openapi_routes, OpenApiConfig, OpenApiEndpoint, SharedRegistry};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tower::ServiceExt;

// ── Helpers ─────────────────────────────────────────────────────────────────

fn pet_registry() -> SharedRegistry {
    let mut registry = OpenApiRegistry::new(Info::new("Pets", "1.0.0"));
    let pets = registry.register_handler("pets", ["/pets/<int:id>"]);
    let schema = ObjectSchema::new("PetSchema").field("name", FieldDescriptor::string().required());
    registry
        .on(pets, HttpMethod::Get)
        .response(ResponseDecl::source(&schema))
        .unwrap();
    Arc::new(Mutex::new(registry))
}

fn pet_routes() -> Vec<RouteEntry> {
    vec![RouteEntry::new(
        "/pets/<int:id>",
        "pets",
        [HttpMethod::Get, HttpMethod::Delete],
    )]
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, String, http::HeaderMap) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(body.to_vec()).unwrap(), headers)
}

async fn get(router: Router, path: &str) -> (StatusCode, String, http::HeaderMap) {
    let request = Request::builder().uri(path).body(Body::empty()).unwrap();
    send(router, request).await
}

// ── Document endpoint ───────────────────────────────────────────────────────

#[tokio::test]
async fn serves_rendered_document() {
    let router = openapi_routes::<()>(pet_registry(), pet_routes(), OpenApiConfig::new());

    let (status, body, headers) = get(router, "/swagger.json").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers.get("content-type").unwrap().to_str().unwrap(),
        "application/json"
    );

    let spec: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(spec["openapi"], "3.0.0");
    assert_eq!(spec["info"]["title"], "Pets");
    let path = &spec["paths"]["/pets/{id}"];
    assert_eq!(path["get"]["responses"]["200"]["description"], "Pet response");
    assert_eq!(path["delete"]["responses"]["204"]["description"], "Deleted an item");
    assert!(spec["components"]["schemas"]["Pet"].is_object());
}

#[tokio::test]
async fn custom_path() {
    let config = OpenApiConfig::new().with_path("/openapi.json");
    let router = openapi_routes::<()>(pet_registry(), pet_routes(), config);

    let (status, _, _) = get(router.clone(), "/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _, _) = get(router, "/swagger.json").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn yaml_format() {
    let config = OpenApiConfig::new().with_format(SpecFormat::Yaml);
    let router = openapi_routes::<()>(pet_registry(), pet_routes(), config);

    let (status, body, headers) = get(router, "/swagger.json").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get("content-type").unwrap(), "application/yaml");
    let spec: Value = serde_yaml::from_str(&body).unwrap();
    assert_eq!(spec["info"]["version"], "1.0.0");
}

#[tokio::test]
async fn render_failure_is_a_server_error() {
    let mut registry = OpenApiRegistry::new(Info::new("Odd", "1.0.0"));
    registry.register_handler("odd", ["/odd/<color:c>"]);
    let routes = vec![RouteEntry::new("/odd/<color:c>", "odd", [HttpMethod::Get])];
    let router = openapi_routes::<()>(
        Arc::new(Mutex::new(registry)),
        routes,
        OpenApiConfig::new(),
    );

    let (status, body, _) = get(router, "/swagger.json").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error: Value = serde_json::from_str(&body).unwrap();
    assert!(error["error"].as_str().unwrap().contains("color"));
}

// ── CORS ────────────────────────────────────────────────────────────────────

fn cross_origin_request() -> Request<Body> {
    Request::builder()
        .uri("/swagger.json")
        .header("origin", "https://docs.example.com")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn cors_headers_when_enabled() {
    let config = OpenApiConfig::new().with_cors(true);
    let router = openapi_routes::<()>(pet_registry(), pet_routes(), config);

    let (status, _, headers) = send(router, cross_origin_request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get("access-control-allow-origin").unwrap(), "*");
}

#[tokio::test]
async fn no_cors_headers_by_default() {
    let router = openapi_routes::<()>(pet_registry(), pet_routes(), OpenApiConfig::new());

    let (_, _, headers) = send(router, cross_origin_request()).await;
    assert!(headers.get("access-control-allow-origin").is_none());
}

// ── Caching ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn cached_body_is_served_within_ttl() {
    let registry = pet_registry();
    let endpoint = OpenApiEndpoint::new(
        registry.clone(),
        pet_routes(),
        OpenApiConfig::new().with_ttl(Duration::from_secs(300)),
    );
    let router: Router = endpoint.router();

    let (_, first, _) = get(router.clone(), "/swagger.json").await;
    registry.lock().await.add_tag(Tag::new("pets"));

    let (_, second, _) = get(router.clone(), "/swagger.json").await;
    assert_eq!(first, second);

    endpoint.invalidate().await;
    let (_, third, _) = get(router, "/swagger.json").await;
    let spec: Value = serde_json::from_str(&third).unwrap();
    assert_eq!(spec["tags"][0]["name"], "pets");
}

#[tokio::test]
async fn expired_body_is_rendered_again() {
    let registry = pet_registry();
    let config = OpenApiConfig::new().with_ttl(Duration::ZERO);
    let router = openapi_routes::<()>(registry.clone(), pet_routes(), config);

    get(router.clone(), "/swagger.json").await;
    registry.lock().await.add_tag(Tag::new("pets"));

    let (_, body, _) = get(router, "/swagger.json").await;
    let spec: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(spec["tags"][0]["name"], "pets");
}

#[tokio::test]
async fn render_is_stable_across_requests() {
    let config = OpenApiConfig::new().with_ttl(Duration::ZERO);
    let router = openapi_routes::<()>(pet_registry(), pet_routes(), config);

    let (_, first, _) = get(router.clone(), "/swagger.json").await;
    let (_, second, _) = get(router, "/swagger.json").await;
    assert_eq!(first, second);
}
