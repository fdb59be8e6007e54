//! Author model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::book::BookRef;

/// Author row from database
#[derive(Debug, Clone, FromRow)]
pub struct AuthorRow {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
}

/// Author with the books they appear on
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Author {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub books: Vec<BookRef>,
}

/// Create author request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAuthor {
    #[validate(length(min = 1, max = 64, message = "first_name must be 1-64 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 64, message = "last_name must be 1-64 characters"))]
    pub last_name: String,
}

/// Update author request (partial)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateAuthor {
    #[validate(length(min = 1, max = 64, message = "first_name must be 1-64 characters"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 64, message = "last_name must be 1-64 characters"))]
    pub last_name: Option<String>,
}

/// Author query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct AuthorQuery {
    /// Search in first or last name
    pub name: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}
