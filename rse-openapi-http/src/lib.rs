//! HTTP exposure of an [`rse_openapi`] registry.
//!
//! ```no_run
//! use rse_openapi::{HttpMethod, Info, OpenApiRegistry, RouteEntry};
//! use rse_openapi_http::{init_tracing, openapi_routes, OpenApiConfig};
//! use std::sync::Arc;
//! use tokio::sync::Mutex;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! init_tracing();
//! let registry = Arc::new(Mutex::new(OpenApiRegistry::new(Info::new("Pets", "1.0.0"))));
//! let routes = vec![RouteEntry::new("/pets", "pets", [HttpMethod::Get])];
//! let app: axum::Router = openapi_routes(registry, routes, OpenApiConfig::load("openapi.yaml")?);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

mod cache;
pub mod config;
mod handlers;
mod layers;

pub use cache::SpecCache;
pub use config::{ConfigError, ConfigValue, ConfigValues, FromConfigValue, OpenApiConfig};
pub use handlers::{openapi_routes, OpenApiEndpoint, SharedRegistry};
pub use layers::{default_cors, init_tracing};
