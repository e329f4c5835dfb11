//! Genre and language endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        genre::{CreateGenre, Genre},
        language::{CreateLanguage, Language},
        user::permissions,
    },
};

use super::AuthenticatedUser;

/// List all genres
#[utoipa::path(
    get,
    path = "/genres",
    tag = "genres",
    responses(
        (status = 200, description = "List of genres", body = Vec<Genre>)
    )
)]
pub async fn list_genres(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Genre>>> {
    let genres = state.services.catalog.list_genres().await?;
    Ok(Json(genres))
}

/// Create a genre
#[utoipa::path(
    post,
    path = "/genres",
    tag = "genres",
    security(("bearer_auth" = [])),
    request_body = CreateGenre,
    responses(
        (status = 201, description = "Genre created", body = Genre),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Missing permission")
    )
)]
pub async fn create_genre(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    form: Result<Json<CreateGenre>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Genre>)> {
    claims.require_perm(permissions::ADD_GENRE)?;
    let Json(form) = form?;

    let genre = state.services.catalog.create_genre(form).await?;
    Ok((StatusCode::CREATED, Json(genre)))
}

/// List all languages
#[utoipa::path(
    get,
    path = "/languages",
    tag = "genres",
    responses(
        (status = 200, description = "List of languages", body = Vec<Language>)
    )
)]
pub async fn list_languages(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<Language>>> {
    let languages = state.services.catalog.list_languages().await?;
    Ok(Json(languages))
}

/// Create a language
#[utoipa::path(
    post,
    path = "/languages",
    tag = "genres",
    security(("bearer_auth" = [])),
    request_body = CreateLanguage,
    responses(
        (status = 201, description = "Language created", body = Language),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Missing permission")
    )
)]
pub async fn create_language(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    form: Result<Json<CreateLanguage>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Language>)> {
    claims.require_perm(permissions::ADD_LANGUAGE)?;
    let Json(form) = form?;

    let language = state.services.catalog.create_language(form).await?;
    Ok((StatusCode::CREATED, Json(language)))
}
