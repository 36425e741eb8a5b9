mod finance;
mod health;
mod swagger;
use health::{health_checker_handler, root_handler};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::AppState;

use axum::{http::HeaderValue, routing::get, Router};
use std::error::Error;
use std::sync::Arc;

/// Only the configured front-end origins may call the API, with credentials.
fn cors_layer(origins: &[String]) -> Result<CorsLayer, Box<dyn Error>> {
    let origins = origins
        .iter()
        .map(|origin| HeaderValue::from_str(origin))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request()))
}

pub fn make_app(state: Arc<AppState>) -> Result<Router, Box<dyn Error>> {
    let cors = cors_layer(&state.config.cors_origins)?;
    info!(origins = ?state.config.cors_origins, "CORS allow-list configured");

    let ret = Router::new()
        .route("/", get(root_handler))
        .route("/api", get(health_checker_handler))
        .route("/api/health", get(health_checker_handler))
        .nest("/api/finance", finance::finance_routes())
        .merge(swagger::build_documentation())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    Ok(ret)
}
