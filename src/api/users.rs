//! User directory endpoints

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::user::{DirectoryUser, UserQuery},
};

use super::{books::PaginatedResponse, AuthenticatedUser};

/// List directory users with role and active loan titles
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("page" = Option<i64>, Query, description = "Page number (default: 1)"),
        ("per_page" = Option<i64>, Query, description = "Items per page (default: 20)")
    ),
    responses(
        (status = 200, description = "Directory of users", body = PaginatedResponse<DirectoryUser>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Permission denied")
    )
)]
pub async fn list_users(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<PaginatedResponse<DirectoryUser>>> {
    let (items, total) = state.services.users.list_users(&principal, &query).await?;

    Ok(Json(PaginatedResponse {
        items,
        total,
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    }))
}
