//! Book endpoints

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        book::{BookDetails, BookForm, BookShort},
        pagination::{PageQuery, PaginatedResponse},
        user::permissions,
    },
};

use super::{requested_page, today, AuthenticatedUser};

/// List books, ten per page
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(PageQuery),
    responses(
        (status = 200, description = "List of books", body = PaginatedResponse<BookShort>),
        (status = 404, description = "Page out of range")
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> AppResult<Json<PaginatedResponse<BookShort>>> {
    let page = requested_page(query)?;

    let books = state.services.catalog.list_books(page).await?;
    Ok(Json(books))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details with copies", body = BookDetails),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> AppResult<Json<BookDetails>> {
    let Path(id) = path?;

    let book = state.services.catalog.get_book(id, today()).await?;
    Ok(Json(book))
}

/// Create a new book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = BookForm,
    responses(
        (status = 201, description = "Book created", body = BookDetails),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Missing permission")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    form: Result<Json<BookForm>, JsonRejection>,
) -> AppResult<(StatusCode, Json<BookDetails>)> {
    claims.require_perm(permissions::ADD_BOOK)?;
    let Json(form) = form?;

    let book = state.services.catalog.create_book(form, today()).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Update a book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = BookForm,
    responses(
        (status = 200, description = "Book updated", body = BookDetails),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Missing permission"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    path: Result<Path<i32>, PathRejection>,
    form: Result<Json<BookForm>, JsonRejection>,
) -> AppResult<Json<BookDetails>> {
    claims.require_perm(permissions::CHANGE_BOOK)?;
    let Path(id) = path?;
    let Json(form) = form?;

    let book = state.services.catalog.update_book(id, form, today()).await?;
    Ok(Json(book))
}

/// Delete a book. Its copies stay, detached from any book.
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 403, description = "Missing permission"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    path: Result<Path<i32>, PathRejection>,
) -> AppResult<StatusCode> {
    claims.require_perm(permissions::DELETE_BOOK)?;
    let Path(id) = path?;

    state.services.catalog.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
