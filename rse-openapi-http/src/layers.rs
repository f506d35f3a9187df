use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,rse_openapi=debug,tower_http=debug";

/// Installs a `fmt` subscriber so registry and render events reach stderr.
///
/// `RUST_LOG` takes precedence; without it the registry's synthesis and
/// render events are shown at `debug`. Panics if a global subscriber is
/// already set, so services that configure their own should skip this.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        )
        .init();
}

/// CORS layer put in front of the document route when `openapi.cors` is on.
/// Any origin may fetch the document.
pub fn default_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}
