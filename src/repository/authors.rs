//! Authors repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, AuthorQuery, AuthorRow, CreateAuthor, UpdateAuthor},
        book::BookRef,
    },
};

#[derive(Clone)]
pub struct AuthorsRepository {
    pool: Pool<Postgres>,
}

impl AuthorsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get author by ID with their books
    pub async fn get_by_id(&self, id: i32) -> AppResult<Author> {
        let row = sqlx::query_as::<_, AuthorRow>(
            "SELECT id, first_name, last_name FROM authors WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Author with id {} not found", id)))?;

        let books = self.books_of(id).await?;
        Ok(Author {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            books,
        })
    }

    /// Search authors with pagination
    pub async fn search(&self, query: &AuthorQuery) -> AppResult<(Vec<Author>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;
        let pattern = query.name.as_ref().map(|n| format!("%{}%", n.to_lowercase()));

        let total: i64 = match &pattern {
            Some(p) => sqlx::query_scalar(
                "SELECT COUNT(*) FROM authors WHERE LOWER(first_name) LIKE $1 OR LOWER(last_name) LIKE $1",
            )
            .bind(p)
            .fetch_one(&self.pool)
            .await?,
            None => {
                sqlx::query_scalar("SELECT COUNT(*) FROM authors")
                    .fetch_one(&self.pool)
                    .await?
            }
        };

        let rows: Vec<AuthorRow> = match &pattern {
            Some(p) => sqlx::query_as(
                r#"
                SELECT id, first_name, last_name FROM authors
                WHERE LOWER(first_name) LIKE $1 OR LOWER(last_name) LIKE $1
                ORDER BY id
                LIMIT $2 OFFSET $3
                "#,
            )
            .bind(p)
            .bind(per_page)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?,
            None => sqlx::query_as(
                "SELECT id, first_name, last_name FROM authors ORDER BY id LIMIT $1 OFFSET $2",
            )
            .bind(per_page)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?,
        };

        let mut authors = Vec::with_capacity(rows.len());
        for row in rows {
            let books = self.books_of(row.id).await?;
            authors.push(Author {
                id: row.id,
                first_name: row.first_name,
                last_name: row.last_name,
                books,
            });
        }

        Ok((authors, total))
    }

    /// Create a new author
    pub async fn create(&self, author: &CreateAuthor) -> AppResult<Author> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO authors (first_name, last_name) VALUES ($1, $2) RETURNING id",
        )
        .bind(&author.first_name)
        .bind(&author.last_name)
        .fetch_one(&self.pool)
        .await?;

        self.get_by_id(id).await
    }

    /// Update an author (partial)
    pub async fn update(&self, id: i32, update: &UpdateAuthor) -> AppResult<Author> {
        let existing = self.get_by_id(id).await?;

        let first_name = update.first_name.as_deref().unwrap_or(&existing.first_name);
        let last_name = update.last_name.as_deref().unwrap_or(&existing.last_name);

        sqlx::query("UPDATE authors SET first_name = $1, last_name = $2 WHERE id = $3")
            .bind(first_name)
            .bind(last_name)
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.get_by_id(id).await
    }

    /// Delete an author
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Author with id {} not found", id)));
        }
        Ok(())
    }

    async fn books_of(&self, author_id: i32) -> AppResult<Vec<BookRef>> {
        let books = sqlx::query_as::<_, BookRef>(
            r#"
            SELECT b.id, b.title
            FROM books b
            JOIN book_authors ba ON ba.book_id = b.id
            WHERE ba.author_id = $1
            ORDER BY b.id
            "#,
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }
}
