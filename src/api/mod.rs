//! API handlers for the library REST endpoints

pub mod auth;
pub mod authors;
pub mod books;
pub mod copies;
pub mod genres;
pub mod health;
pub mod index;
pub mod openapi;
pub mod users;

use axum::{
    async_trait,
    extract::{rejection::QueryRejection, FromRequestParts, OriginalUri, Query},
    http::request::Parts,
    routing::get,
    Router,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    typed_header::TypedHeaderRejectionReason,
    TypedHeader,
};
use chrono::NaiveDate;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::{AppError, AppResult},
    models::{pagination::PageQuery, user::UserClaims},
    AppState,
};

/// Extractor for authenticated user from JWT token.
///
/// A request without an `Authorization` header is rejected with a redirect
/// to the login entry point; a malformed or expired token is a 401.
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state).await;

        let TypedHeader(authorization) = match header {
            Ok(header) => header,
            Err(rejection) => {
                return Err(match rejection.reason() {
                    TypedHeaderRejectionReason::Missing => AppError::LoginRequired {
                        next: original_path(parts),
                    },
                    _ => AppError::Authentication(
                        "Invalid authorization header format".to_string(),
                    ),
                });
            }
        };

        // Validate JWT token using the secret from configuration
        let claims = UserClaims::from_token(authorization.token(), &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}

/// Path and query of the request as the client sent it (before nesting)
fn original_path(parts: &Parts) -> String {
    let uri = parts
        .extensions
        .get::<OriginalUri>()
        .map(|original| &original.0)
        .unwrap_or(&parts.uri);

    uri.path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string())
}

/// Current local date, used for overdue and renewal checks
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// `?page=` value; a page number that does not parse names no page
pub fn requested_page(query: Result<Query<PageQuery>, QueryRejection>) -> AppResult<Option<i64>> {
    match query {
        Ok(Query(query)) => Ok(query.page),
        Err(_) => Err(AppError::NotFound("Invalid page number".to_string())),
    }
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authentication
        .route("/auth/login", get(auth::login_entry_point).post(auth::login))
        .route("/auth/me", get(auth::me))
        // Home
        .route("/catalog", get(index::index))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        .route(
            "/books/:id/copies",
            get(copies::list_copies).post(copies::create_copy),
        )
        // Authors
        .route("/authors", get(authors::list_authors).post(authors::create_author))
        .route(
            "/authors/:id",
            get(authors::get_author)
                .put(authors::update_author)
                .delete(authors::delete_author),
        )
        // Genres & languages
        .route("/genres", get(genres::list_genres).post(genres::create_genre))
        .route(
            "/languages",
            get(genres::list_languages).post(genres::create_language),
        )
        // Copies
        .route(
            "/copies/:id",
            get(copies::get_copy)
                .put(copies::update_copy)
                .delete(copies::delete_copy),
        )
        .route(
            "/copies/:id/renew",
            get(copies::renewal_form).post(copies::renew_copy),
        )
        // Borrowing
        .route("/mybooks", get(copies::my_borrowed))
        .route("/borrowed", get(copies::all_borrowed))
        // Users
        .route("/users", axum::routing::post(users::create_user))
        .with_state(state);

    // OpenAPI documentation
    let openapi = openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
