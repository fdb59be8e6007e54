//! Users repository for database operations
//!
//! The users table is a directory replica maintained by the identity
//! provider; the server only reads it.

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::BookRef,
        user::{DirectoryUser, UserQuery, UserRow},
    },
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<UserRow> {
        sqlx::query_as::<_, UserRow>(
            "SELECT id, first_name, last_name, role FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// List directory users with their active loan titles
    pub async fn search(&self, query: &UserQuery) -> AppResult<(Vec<DirectoryUser>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, first_name, last_name, role FROM users ORDER BY id LIMIT $1 OFFSET $2",
        )
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let mut users = Vec::with_capacity(rows.len());
        for row in rows {
            let books = self.active_loans_of(row.id).await?;
            users.push(DirectoryUser {
                id: row.id,
                first_name: row.first_name,
                last_name: row.last_name,
                role: row.role,
                books,
            });
        }

        Ok((users, total))
    }

    async fn active_loans_of(&self, user_id: i32) -> AppResult<Vec<BookRef>> {
        let books = sqlx::query_as::<_, BookRef>(
            r#"
            SELECT b.id, b.title
            FROM checkouts c
            JOIN books b ON c.book_id = b.id
            WHERE c.user_id = $1 AND c.return_time IS NULL
            ORDER BY c.checkout_time, c.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }
}
