//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, authors, books, copies, genres, health, index, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Local Library API",
        version = "1.0.0",
        description = "Library catalog and borrowing REST API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login_entry_point,
        auth::login,
        auth::me,
        // Home
        index::index,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::create_author,
        authors::update_author,
        authors::delete_author,
        // Genres & languages
        genres::list_genres,
        genres::create_genre,
        genres::list_languages,
        genres::create_language,
        // Copies
        copies::list_copies,
        copies::create_copy,
        copies::get_copy,
        copies::update_copy,
        copies::delete_copy,
        copies::renewal_form,
        copies::renew_copy,
        // Borrowing
        copies::my_borrowed,
        copies::all_borrowed,
        // Users
        users::create_user,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::UserInfo,
            auth::LoginEntryPoint,
            // Catalog
            crate::services::catalog::CatalogStats,
            crate::models::book::BookShort,
            crate::models::book::BookDetails,
            crate::models::book::BookForm,
            crate::models::author::Author,
            crate::models::author::AuthorShort,
            crate::models::author::AuthorDetails,
            crate::models::author::AuthorForm,
            crate::models::genre::Genre,
            crate::models::genre::CreateGenre,
            crate::models::language::Language,
            crate::models::language::CreateLanguage,
            // Copies
            crate::models::book_instance::LoanStatus,
            crate::models::book_instance::BookInstance,
            crate::models::book_instance::BookInstanceDetails,
            crate::models::book_instance::BookInstanceForm,
            crate::models::renewal::RenewBookForm,
            crate::models::renewal::RenewalFormState,
            crate::services::loans::RenewalForm,
            crate::models::pagination::PageQuery,
            // Users
            crate::models::user::User,
            crate::models::user::CreateUser,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "catalog", description = "Catalog home statistics"),
        (name = "books", description = "Book management"),
        (name = "authors", description = "Author management"),
        (name = "genres", description = "Genres and languages"),
        (name = "copies", description = "Copies and renewals"),
        (name = "borrowing", description = "Borrowed copies"),
        (name = "users", description = "User management")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
