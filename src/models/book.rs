//! Book model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::genre::Genre;

/// Short book reference for nesting in author and user payloads
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookRef {
    pub id: i32,
    pub title: String,
}

/// Internal row structure for book queries
#[derive(Debug, Clone, FromRow)]
pub struct BookRow {
    pub id: i32,
    pub title: String,
    pub publish_year: i32,
    pub genre_id: Option<i32>,
    pub genre_name: Option<String>,
}

/// Author reference nested in a book payload
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookAuthor {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
}

/// Book with genre and authors expanded
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub publish_year: i32,
    pub genre: Option<Genre>,
    pub authors: Vec<BookAuthor>,
}

impl Book {
    pub fn from_row(row: BookRow, authors: Vec<BookAuthor>) -> Self {
        let genre = match (row.genre_id, row.genre_name) {
            (Some(id), Some(name)) => Some(Genre { id, name }),
            _ => None,
        };
        Self {
            id: row.id,
            title: row.title,
            publish_year: row.publish_year,
            genre,
            authors,
        }
    }
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 128, message = "title must be 1-128 characters"))]
    pub title: String,
    #[validate(range(min = 0, message = "publish_year must be non-negative"))]
    pub publish_year: i32,
    pub genre_id: Option<i32>,
    #[serde(default)]
    pub author_ids: Vec<i32>,
}

/// Update book request (partial)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 128, message = "title must be 1-128 characters"))]
    pub title: Option<String>,
    #[validate(range(min = 0, message = "publish_year must be non-negative"))]
    pub publish_year: Option<i32>,
    pub genre_id: Option<i32>,
    pub author_ids: Option<Vec<i32>>,
}

/// Book query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    /// Search in title
    pub title: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}
