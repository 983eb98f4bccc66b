//! REST API layer: route handlers, DTOs, origin gate and router composition.
//!
//! All resource endpoints are mounted under `/api/v1`.

pub mod dto;
pub mod handlers;
pub mod openapi;
pub mod origin;

use axum::Router;

use crate::app_state::AppState;
use origin::OriginPolicy;

/// Builds the complete API router with all REST endpoints, plus Swagger UI
/// at `/swagger-ui` when the `swagger-ui` feature is enabled.
pub fn build_router(origins: &OriginPolicy) -> Router<AppState> {
    let router = Router::new()
        .nest("/api/v1", handlers::routes(origins))
        .merge(handlers::system::routes());

    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
        )
    };

    router
}
