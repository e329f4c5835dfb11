//! Catalog home page counters

use axum::{extract::State, Json};

use crate::{error::AppResult, services::catalog::CatalogStats};

use super::AuthenticatedUser;

/// Visit counter key shared by callers without a token
const ANONYMOUS_VISITOR: &str = "anonymous";

/// Catalog counts and the caller's visit count
#[utoipa::path(
    get,
    path = "/catalog",
    tag = "catalog",
    responses(
        (status = 200, description = "Catalog statistics", body = CatalogStats)
    )
)]
pub async fn index(
    State(state): State<crate::AppState>,
    user: Option<AuthenticatedUser>,
) -> AppResult<Json<CatalogStats>> {
    let visitor = match user {
        Some(AuthenticatedUser(claims)) => format!("user:{}", claims.user_id),
        None => ANONYMOUS_VISITOR.to_string(),
    };

    let stats = state.services.catalog.stats(&visitor).await?;
    Ok(Json(stats))
}
