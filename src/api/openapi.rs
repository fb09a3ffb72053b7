//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, health, holders};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Library Desk API",
        version = "0.1.0",
        description = "Books, holders, checkout and return"
    ),
    servers(
        (url = "/api", description = "API")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::replace_book,
        books::update_book,
        books::delete_book,
        books::checkout_book,
        books::return_book,
        // Holders
        holders::list_holders,
        holders::get_holder,
        holders::create_holder,
        holders::update_holder,
        holders::delete_holder,
    ),
    components(
        schemas(
            crate::models::book::Book,
            crate::models::book::HeldBook,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::book::CheckoutRequest,
            crate::models::holder::Holder,
            crate::models::holder::HolderRef,
            crate::models::holder::CreateHolder,
            crate::models::holder::UpdateHolder,
            health::HealthResponse,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Book catalog and circulation"),
        (name = "holders", description = "Holder management")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
