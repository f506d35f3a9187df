use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use bytes::Bytes;
use rse_openapi::{OpenApiError, OpenApiRegistry, RouteEntry, SpecFormat};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error};

use crate::cache::SpecCache;
use crate::config::OpenApiConfig;
use crate::layers::default_cors;

/// A registry shared between the endpoint and the code that annotates it.
pub type SharedRegistry = Arc<Mutex<OpenApiRegistry>>;

struct OpenApiState {
    registry: SharedRegistry,
    routes: Vec<RouteEntry>,
    cache: SpecCache,
    format: SpecFormat,
}

/// The document endpoint: a registry, the route table it is rendered
/// against, and the cached output.
#[derive(Clone)]
pub struct OpenApiEndpoint {
    state: Arc<OpenApiState>,
    config: OpenApiConfig,
}

impl OpenApiEndpoint {
    pub fn new(registry: SharedRegistry, routes: Vec<RouteEntry>, config: OpenApiConfig) -> Self {
        let state = OpenApiState {
            registry,
            routes,
            cache: SpecCache::new(config.ttl),
            format: config.format,
        };
        Self {
            state: Arc::new(state),
            config,
        }
    }

    /// The serialized document, rendered at most once per TTL window.
    pub async fn body(&self) -> Result<Bytes, OpenApiError> {
        let state = &self.state;
        state
            .cache
            .get_or_render(move || async move {
                let mut registry = state.registry.lock().await;
                let text = registry.render_to_string(&state.routes, state.format)?;
                debug!(
                    paths = registry.paths().len(),
                    conflicts = registry.conflicts(),
                    "Rendered OpenAPI document"
                );
                Ok::<_, OpenApiError>(Bytes::from(text))
            })
            .await
    }

    /// Drops the cached document; the next request renders again.
    pub async fn invalidate(&self) {
        self.state.cache.invalidate().await;
    }

    /// Build an `axum::Router` serving the document at the configured path.
    pub fn router<S: Clone + Send + Sync + 'static>(&self) -> Router<S> {
        let endpoint = self.clone();
        let mut router = Router::<S>::new().route(
            &self.config.path,
            get(move || {
                let endpoint = endpoint.clone();
                async move { endpoint.respond().await }
            }),
        );

        if self.config.cors {
            router = router.layer(default_cors());
        }
        router
    }

    async fn respond(&self) -> Response {
        match self.body().await {
            Ok(body) => ([(CONTENT_TYPE, self.config.content_type())], body).into_response(),
            Err(err) => {
                error!(error = %err, "Failed to render OpenAPI document");
                let body = serde_json::json!({ "error": err.to_string() });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

/// Build an `axum::Router` that serves the rendered document.
///
/// The returned router can be merged into the application router.
pub fn openapi_routes<S: Clone + Send + Sync + 'static>(
    registry: SharedRegistry,
    routes: Vec<RouteEntry>,
    config: OpenApiConfig,
) -> Router<S> {
    OpenApiEndpoint::new(registry, routes, config).router()
}
