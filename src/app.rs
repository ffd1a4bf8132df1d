use crate::config::environment::AppConfig;
use crate::infra::InfraClients;
use crate::module::portal::route::register_routes;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub infra: InfraClients,
}

impl AppState {
    pub fn new(config: AppConfig, infra: InfraClients) -> Self {
        Self { config, infra }
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(allowed_origins(&state.config.cors_allowed_origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    register_routes(state)
        .layer(body_limit)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn allowed_origins(configured: &[String]) -> AllowOrigin {
    if configured.is_empty() {
        return AllowOrigin::any();
    }
    let origins = configured
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(origin = %origin, error = %e, "ignoring invalid CORS origin");
                None
            }
        })
        .collect::<Vec<_>>();

    AllowOrigin::list(origins)
}
