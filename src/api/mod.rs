pub mod handlers;
pub mod models;
pub mod openapi;

use axum::{Router, routing::get};
use handlers::{AppState, api_routes};
use openapi::ApiDoc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Full router: health check, `/api` routes and the Swagger UI.
pub fn app(service: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "OK" }))
        .nest("/api", api_routes(service))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
