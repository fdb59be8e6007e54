//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{authors, books, checkouts, genres, health, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Biblos API",
        version = "0.1.0",
        description = "Library Catalog and Checkout REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        books::checkout_book,
        // Checkouts
        checkouts::list_my_checkouts,
        checkouts::list_overdue,
        checkouts::get_checkout,
        checkouts::update_due_date,
        checkouts::return_book,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::create_author,
        authors::update_author,
        authors::delete_author,
        // Genres
        genres::list_genres,
        genres::create_genre,
        genres::delete_genre,
        // Users
        users::list_users,
    ),
    components(
        schemas(
            health::HealthResponse,
            crate::error::ErrorResponse,
            crate::models::book::Book,
            crate::models::book::BookRef,
            crate::models::book::BookAuthor,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::author::Author,
            crate::models::author::CreateAuthor,
            crate::models::author::UpdateAuthor,
            crate::models::genre::Genre,
            crate::models::genre::CreateGenre,
            crate::models::checkout::CheckoutDetails,
            crate::models::checkout::CheckoutUser,
            crate::models::checkout::UpdateDueDate,
            crate::models::user::DirectoryUser,
        )
    ),
    tags(
        (name = "health", description = "Service health"),
        (name = "books", description = "Book catalog"),
        (name = "checkouts", description = "Checkout ledger"),
        (name = "authors", description = "Author catalog"),
        (name = "genres", description = "Genre catalog"),
        (name = "users", description = "User directory")
    )
)]
pub struct ApiDoc;

/// Create the Swagger UI router
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
