pub mod api;
pub mod config;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;

use crate::config::ServiceConfig;
use crate::services::pipeline::RequestPipeline;
use axum::{Router, middleware::from_fn, routing::get};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::root::usage,
        api::handlers::filtered_image::filtered_image,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            api::error::ErrorResponse,
            api::handlers::root::UsageResponse,
            api::handlers::root::UsageParameters,
            api::handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "images", description = "Image filtering endpoints"),
        (name = "system", description = "Usage and health endpoints")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<RequestPipeline>,
    pub config: ServiceConfig,
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(api::handlers::root::usage))
        .route("/health", get(api::handlers::health::health_check))
        .route(
            "/filteredimage",
            get(api::handlers::filtered_image::filtered_image),
        )
        .route(
            "/filteredimage/",
            get(api::handlers::filtered_image::filtered_image),
        )
        .layer(from_fn(api::middleware::metrics::metrics_middleware))
        .layer(from_fn(api::middleware::security::security_headers))
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
                .expose_headers(Any),
        )
        .layer(CatchPanicLayer::custom(api::error::panic_response))
        .with_state(state)
}
