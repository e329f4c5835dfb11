//! Author endpoints

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
        author::{Author, AuthorDetails, AuthorForm},
        pagination::{PageQuery, PaginatedResponse},
        user::permissions,
    },
};

use super::{requested_page, AuthenticatedUser};

/// List authors, ten per page
#[utoipa::path(
    get,
    path = "/authors",
    tag = "authors",
    params(PageQuery),
    responses(
        (status = 200, description = "List of authors", body = PaginatedResponse<Author>),
        (status = 404, description = "Page out of range")
    )
)]
pub async fn list_authors(
    State(state): State<crate::AppState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> AppResult<Json<PaginatedResponse<Author>>> {
    let page = requested_page(query)?;

    let authors = state.services.catalog.list_authors(page).await?;
    Ok(Json(authors))
}

/// Get author details with their books
#[utoipa::path(
    get,
    path = "/authors/{id}",
    tag = "authors",
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Author details", body = AuthorDetails),
        (status = 404, description = "Author not found")
    )
)]
pub async fn get_author(
    State(state): State<crate::AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> AppResult<Json<AuthorDetails>> {
    let Path(id) = path?;

    let author = state.services.catalog.get_author(id).await?;
    Ok(Json(author))
}

/// Create a new author
#[utoipa::path(
    post,
    path = "/authors",
    tag = "authors",
    security(("bearer_auth" = [])),
    request_body = AuthorForm,
    responses(
        (status = 201, description = "Author created", body = Author),
        (status = 400, description = "Invalid input"),
        (status = 302, description = "Not logged in"),
        (status = 403, description = "Missing permission")
    )
)]
pub async fn create_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    form: Result<Json<AuthorForm>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Author>)> {
    claims.require_perm(permissions::ADD_AUTHOR)?;
    let Json(form) = form?;

    let author = state.services.catalog.create_author(form).await?;
    Ok((StatusCode::CREATED, Json(author)))
}

/// Update an author
#[utoipa::path(
    put,
    path = "/authors/{id}",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    request_body = AuthorForm,
    responses(
        (status = 200, description = "Author updated", body = Author),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Missing permission"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn update_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    path: Result<Path<i32>, PathRejection>,
    form: Result<Json<AuthorForm>, JsonRejection>,
) -> AppResult<Json<Author>> {
    claims.require_perm(permissions::CHANGE_AUTHOR)?;
    let Path(id) = path?;
    let Json(form) = form?;

    let author = state.services.catalog.update_author(id, form).await?;
    Ok(Json(author))
}

/// Delete an author. Their books are kept without an author.
#[utoipa::path(
    delete,
    path = "/authors/{id}",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 204, description = "Author deleted"),
        (status = 403, description = "Missing permission"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn delete_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    path: Result<Path<i32>, PathRejection>,
) -> AppResult<StatusCode> {
    claims.require_perm(permissions::DELETE_AUTHOR)?;
    let Path(id) = path?;

    state.services.catalog.delete_author(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
