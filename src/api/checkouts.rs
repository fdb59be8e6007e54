//! Checkout ledger endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::checkout::{CheckoutDetails, UpdateDueDate},
};

use super::AuthenticatedUser;

/// List the caller's active checkouts
#[utoipa::path(
    get,
    path = "/book-checkouts",
    tag = "checkouts",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The caller's active checkouts, in checkout order", body = Vec<CheckoutDetails>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Permission denied")
    )
)]
pub async fn list_my_checkouts(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> AppResult<Json<Vec<CheckoutDetails>>> {
    let checkouts = state.services.checkouts.list_mine(&principal).await?;
    Ok(Json(checkouts))
}

/// List all overdue checkouts (administrator only)
#[utoipa::path(
    get,
    path = "/book-checkouts/overdue",
    tag = "checkouts",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Overdue checkouts, by book id", body = Vec<CheckoutDetails>),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn list_overdue(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> AppResult<Json<Vec<CheckoutDetails>>> {
    let checkouts = state.services.checkouts.list_overdue(&principal).await?;
    Ok(Json(checkouts))
}

/// Get the active checkout for a book
#[utoipa::path(
    get,
    path = "/book-checkouts/{book_id}",
    tag = "checkouts",
    security(("bearer_auth" = [])),
    params(
        ("book_id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Active checkout entry", body = CheckoutDetails),
        (status = 403, description = "Caller is neither borrower nor administrator"),
        (status = 404, description = "Book is not checked out")
    )
)]
pub async fn get_checkout(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(book_id): Path<i32>,
) -> AppResult<Json<CheckoutDetails>> {
    let checkout = state
        .services
        .checkouts
        .get_checkout(&principal, book_id)
        .await?;
    Ok(Json(checkout))
}

/// Override the due date of an active checkout (administrator only)
#[utoipa::path(
    patch,
    path = "/book-checkouts/{book_id}",
    tag = "checkouts",
    security(("bearer_auth" = [])),
    params(
        ("book_id" = i32, Path, description = "Book ID")
    ),
    request_body = UpdateDueDate,
    responses(
        (status = 200, description = "Updated checkout entry", body = CheckoutDetails),
        (status = 400, description = "Book is not checked out"),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn update_due_date(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(book_id): Path<i32>,
    Json(request): Json<UpdateDueDate>,
) -> AppResult<Json<CheckoutDetails>> {
    let updated = state
        .services
        .checkouts
        .set_due_date(&principal, book_id, request.due_date)
        .await?;
    Ok(Json(updated))
}

/// Return a checked out book
#[utoipa::path(
    delete,
    path = "/book-checkouts/{book_id}",
    tag = "checkouts",
    security(("bearer_auth" = [])),
    params(
        ("book_id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Book returned"),
        (status = 400, description = "Book is not checked out"),
        (status = 403, description = "Caller is neither borrower nor administrator")
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(book_id): Path<i32>,
) -> AppResult<StatusCode> {
    state
        .services
        .checkouts
        .return_book(&principal, book_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
