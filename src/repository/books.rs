//! Books repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookAuthor, BookQuery, BookRow, CreateBook, UpdateBook},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Check if a book exists
    pub async fn exists(&self, id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Get book by ID with genre and authors
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        let row = sqlx::query_as::<_, BookRow>(
            r#"
            SELECT b.id, b.title, b.publish_year, b.genre_id, g.name as genre_name
            FROM books b
            LEFT JOIN genres g ON b.genre_id = g.id
            WHERE b.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        let authors = self.authors_of(id).await?;
        Ok(Book::from_row(row, authors))
    }

    /// Search books with pagination
    pub async fn search(&self, query: &BookQuery) -> AppResult<(Vec<Book>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;
        let pattern = query.title.as_ref().map(|t| format!("%{}%", t.to_lowercase()));

        let total: i64 = match &pattern {
            Some(p) => {
                sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE LOWER(title) LIKE $1")
                    .bind(p)
                    .fetch_one(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_scalar("SELECT COUNT(*) FROM books")
                    .fetch_one(&self.pool)
                    .await?
            }
        };

        let rows: Vec<BookRow> = match &pattern {
            Some(p) => {
                sqlx::query_as(
                    r#"
                    SELECT b.id, b.title, b.publish_year, b.genre_id, g.name as genre_name
                    FROM books b
                    LEFT JOIN genres g ON b.genre_id = g.id
                    WHERE LOWER(b.title) LIKE $1
                    ORDER BY b.id
                    LIMIT $2 OFFSET $3
                    "#,
                )
                .bind(p)
                .bind(per_page)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(
                    r#"
                    SELECT b.id, b.title, b.publish_year, b.genre_id, g.name as genre_name
                    FROM books b
                    LEFT JOIN genres g ON b.genre_id = g.id
                    ORDER BY b.id
                    LIMIT $1 OFFSET $2
                    "#,
                )
                .bind(per_page)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
        };

        let mut books = Vec::with_capacity(rows.len());
        for row in rows {
            let authors = self.authors_of(row.id).await?;
            books.push(Book::from_row(row, authors));
        }

        Ok((books, total))
    }

    /// Create a new book with its author links
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        if let Some(genre_id) = book.genre_id {
            self.check_genre(genre_id).await?;
        }
        self.check_authors(&book.author_ids).await?;

        let mut tx = self.pool.begin().await?;

        let book_id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO books (title, publish_year, genre_id)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&book.title)
        .bind(book.publish_year)
        .bind(book.genre_id)
        .fetch_one(&mut *tx)
        .await?;

        for author_id in &book.author_ids {
            sqlx::query("INSERT INTO book_authors (book_id, author_id) VALUES ($1, $2)")
                .bind(book_id)
                .bind(author_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        self.get_by_id(book_id).await
    }

    /// Update a book (partial)
    pub async fn update(&self, id: i32, update: &UpdateBook) -> AppResult<Book> {
        let existing = sqlx::query_as::<_, BookRow>(
            r#"
            SELECT b.id, b.title, b.publish_year, b.genre_id, g.name as genre_name
            FROM books b
            LEFT JOIN genres g ON b.genre_id = g.id
            WHERE b.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        let title = update.title.as_deref().unwrap_or(&existing.title);
        let publish_year = update.publish_year.unwrap_or(existing.publish_year);
        let genre_id = match update.genre_id {
            Some(genre_id) => {
                self.check_genre(genre_id).await?;
                Some(genre_id)
            }
            None => existing.genre_id,
        };
        if let Some(ref author_ids) = update.author_ids {
            self.check_authors(author_ids).await?;
        }

        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE books SET title = $1, publish_year = $2, genre_id = $3 WHERE id = $4")
            .bind(title)
            .bind(publish_year)
            .bind(genre_id)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if let Some(ref author_ids) = update.author_ids {
            sqlx::query("DELETE FROM book_authors WHERE book_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            for author_id in author_ids {
                sqlx::query("INSERT INTO book_authors (book_id, author_id) VALUES ($1, $2)")
                    .bind(id)
                    .bind(author_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;

        self.get_by_id(id).await
    }

    /// Delete a book.
    ///
    /// Ledger entries referencing it survive with a nulled book reference.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }

    async fn authors_of(&self, book_id: i32) -> AppResult<Vec<BookAuthor>> {
        let authors = sqlx::query_as::<_, BookAuthor>(
            r#"
            SELECT a.id, a.first_name, a.last_name
            FROM authors a
            JOIN book_authors ba ON ba.author_id = a.id
            WHERE ba.book_id = $1
            ORDER BY a.id
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(authors)
    }

    async fn check_genre(&self, genre_id: i32) -> AppResult<()> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM genres WHERE id = $1)")
            .bind(genre_id)
            .fetch_one(&self.pool)
            .await?;
        if !exists {
            return Err(AppError::Validation(format!(
                "Genre with id {} does not exist",
                genre_id
            )));
        }
        Ok(())
    }

    async fn check_authors(&self, author_ids: &[i32]) -> AppResult<()> {
        if author_ids.is_empty() {
            return Ok(());
        }
        let found: i64 = sqlx::query_scalar("SELECT COUNT(DISTINCT id) FROM authors WHERE id = ANY($1)")
            .bind(author_ids)
            .fetch_one(&self.pool)
            .await?;

        let mut distinct = author_ids.to_vec();
        distinct.sort_unstable();
        distinct.dedup();
        if found != distinct.len() as i64 {
            return Err(AppError::Validation(
                "One or more author ids do not exist".to_string(),
            ));
        }
        Ok(())
    }
}
