//! Copy (book instance) endpoints: management, borrowing lists and renewal

use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Form, Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        book_instance::{BookInstanceDetails, BookInstanceForm},
        pagination::{PageQuery, PaginatedResponse},
        renewal::RenewBookForm,
        user::permissions,
    },
    services::loans::RenewalForm,
};

use super::{requested_page, today, AuthenticatedUser};

/// List the copies of a book
#[utoipa::path(
    get,
    path = "/books/{id}/copies",
    tag = "copies",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Copies of the book", body = Vec<BookInstanceDetails>),
        (status = 404, description = "Book not found")
    )
)]
pub async fn list_copies(
    State(state): State<crate::AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> AppResult<Json<Vec<BookInstanceDetails>>> {
    let Path(book_id) = path?;

    let copies = state.services.loans.list_copies(book_id, today()).await?;
    Ok(Json(copies))
}

/// Add a copy to a book
#[utoipa::path(
    post,
    path = "/books/{id}/copies",
    tag = "copies",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = BookInstanceForm,
    responses(
        (status = 201, description = "Copy created", body = BookInstanceDetails),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Missing permission"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn create_copy(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    path: Result<Path<i32>, PathRejection>,
    form: Result<Json<BookInstanceForm>, JsonRejection>,
) -> AppResult<(StatusCode, Json<BookInstanceDetails>)> {
    claims.require_perm(permissions::ADD_BOOKINSTANCE)?;
    let Path(book_id) = path?;
    let Json(form) = form?;

    let copy = state.services.loans.create_copy(book_id, form, today()).await?;
    Ok((StatusCode::CREATED, Json(copy)))
}

/// Get a copy by ID
#[utoipa::path(
    get,
    path = "/copies/{id}",
    tag = "copies",
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    responses(
        (status = 200, description = "Copy details", body = BookInstanceDetails),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn get_copy(
    State(state): State<crate::AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<BookInstanceDetails>> {
    let Path(id) = path?;

    let copy = state.services.loans.get_copy(id, today()).await?;
    Ok(Json(copy))
}

/// Update a copy
#[utoipa::path(
    put,
    path = "/copies/{id}",
    tag = "copies",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    request_body = BookInstanceForm,
    responses(
        (status = 200, description = "Copy updated", body = BookInstanceDetails),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Missing permission"),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn update_copy(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    path: Result<Path<Uuid>, PathRejection>,
    form: Result<Json<BookInstanceForm>, JsonRejection>,
) -> AppResult<Json<BookInstanceDetails>> {
    claims.require_perm(permissions::CHANGE_BOOKINSTANCE)?;
    let Path(id) = path?;
    let Json(form) = form?;

    let copy = state.services.loans.update_copy(id, form, today()).await?;
    Ok(Json(copy))
}

/// Delete a copy
#[utoipa::path(
    delete,
    path = "/copies/{id}",
    tag = "copies",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    responses(
        (status = 204, description = "Copy deleted"),
        (status = 403, description = "Missing permission"),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn delete_copy(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> AppResult<StatusCode> {
    claims.require_perm(permissions::DELETE_BOOKINSTANCE)?;
    let Path(id) = path?;

    state.services.loans.delete_copy(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Renewal form for a copy, with the proposed date
#[utoipa::path(
    get,
    path = "/copies/{id}/renew",
    tag = "copies",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    responses(
        (status = 200, description = "Renewal form", body = RenewalForm),
        (status = 302, description = "Not logged in"),
        (status = 403, description = "Missing permission"),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn renewal_form(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<RenewalForm>> {
    claims.require_perm(permissions::CAN_MARK_RETURNED)?;
    let Path(id) = path?;

    let form = state.services.loans.renewal_form(id, today()).await?;
    Ok(Json(form))
}

/// Renew a copy by moving its due-back date
#[utoipa::path(
    post,
    path = "/copies/{id}/renew",
    tag = "copies",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    request_body(content = RenewBookForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Copy renewed", body = BookInstanceDetails),
        (status = 302, description = "Not logged in"),
        (status = 400, description = "Invalid renewal date"),
        (status = 403, description = "Missing permission"),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn renew_copy(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    path: Result<Path<Uuid>, PathRejection>,
    form: Result<Form<RenewBookForm>, FormRejection>,
) -> AppResult<Json<BookInstanceDetails>> {
    claims.require_perm(permissions::CAN_MARK_RETURNED)?;
    let Path(id) = path?;
    let Form(form) = form?;

    let copy = state.services.loans.renew(id, &form, today()).await?;
    Ok(Json(copy))
}

/// Copies on loan to the current user
#[utoipa::path(
    get,
    path = "/mybooks",
    tag = "borrowing",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "Borrowed copies, soonest due first", body = PaginatedResponse<BookInstanceDetails>),
        (status = 302, description = "Not logged in"),
        (status = 404, description = "Page out of range")
    )
)]
pub async fn my_borrowed(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> AppResult<Json<PaginatedResponse<BookInstanceDetails>>> {
    let page = requested_page(query)?;

    let copies = state
        .services
        .loans
        .borrowed_by(claims.user_id, page, today())
        .await?;
    Ok(Json(copies))
}

/// All copies on loan
#[utoipa::path(
    get,
    path = "/borrowed",
    tag = "borrowing",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "Borrowed copies, soonest due first", body = PaginatedResponse<BookInstanceDetails>),
        (status = 302, description = "Not logged in"),
        (status = 403, description = "Missing permission"),
        (status = 404, description = "Page out of range")
    )
)]
pub async fn all_borrowed(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> AppResult<Json<PaginatedResponse<BookInstanceDetails>>> {
    claims.require_perm(permissions::CAN_MARK_RETURNED)?;
    let page = requested_page(query)?;

    let copies = state.services.loans.all_borrowed(page, today()).await?;
    Ok(Json(copies))
}
