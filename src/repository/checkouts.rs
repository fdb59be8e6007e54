//! Checkout ledger repository
//!
//! Single source of truth for loan state and history. The invariant that a
//! book has at most one outstanding entry lives in the database as a partial
//! unique index on `book_id WHERE return_time IS NULL`; the conditional
//! insert below makes the loser of a concurrent checkout race fail cleanly
//! instead of creating a second outstanding entry. Entries are closed, never
//! deleted.

use chrono::{NaiveDate, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::checkout::{default_due_date, CheckoutDetails, CheckoutDetailsRow, CheckoutEntry},
};

const DETAILS_COLUMNS: &str = r#"
    c.id as entry_id, b.id as book_id, b.title as book_title, c.due_date,
    u.id as borrower_id, u.first_name as borrower_first_name,
    u.last_name as borrower_last_name
"#;

#[derive(Clone)]
pub struct CheckoutsRepository {
    pool: Pool<Postgres>,
}

impl CheckoutsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// True iff no outstanding entry exists for the book
    pub async fn is_available(&self, book_id: i32) -> AppResult<bool> {
        let outstanding: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM checkouts WHERE book_id = $1 AND return_time IS NULL)",
        )
        .bind(book_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(!outstanding)
    }

    /// Create an outstanding entry for the book.
    ///
    /// The insert is conditional on the partial unique index: when another
    /// outstanding entry exists the statement inserts nothing and the caller
    /// gets `AlreadyCheckedOut`. Two concurrent checkouts therefore admit
    /// exactly one winner regardless of how many server instances share the
    /// store.
    pub async fn checkout(&self, book_id: i32, borrower_id: i32) -> AppResult<CheckoutEntry> {
        let now = Utc::now();
        let due_date = default_due_date(now);

        sqlx::query_as::<_, CheckoutEntry>(
            r#"
            INSERT INTO checkouts (book_id, user_id, checkout_time, due_date)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (book_id) WHERE return_time IS NULL DO NOTHING
            RETURNING *
            "#,
        )
        .bind(book_id)
        .bind(borrower_id)
        .bind(now)
        .bind(due_date)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::AlreadyCheckedOut)
    }

    /// Get the outstanding entry for a book, if any
    pub async fn find_outstanding(&self, book_id: i32) -> AppResult<Option<CheckoutEntry>> {
        let entry = sqlx::query_as::<_, CheckoutEntry>(
            "SELECT * FROM checkouts WHERE book_id = $1 AND return_time IS NULL",
        )
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    /// Close the outstanding entry for a book.
    ///
    /// Only the borrower or an administrator may return a book. The update
    /// re-checks `return_time IS NULL` so that of two racing returns exactly
    /// one closes the entry; the other observes `NotCheckedOut`.
    pub async fn return_book(
        &self,
        book_id: i32,
        actor_id: i32,
        actor_is_admin: bool,
    ) -> AppResult<CheckoutEntry> {
        let entry = self
            .find_outstanding(book_id)
            .await?
            .ok_or(AppError::NotCheckedOut)?;

        if !actor_is_admin && entry.user_id != Some(actor_id) {
            return Err(AppError::Forbidden(
                "Cannot return a book checked out by another user".to_string(),
            ));
        }

        sqlx::query_as::<_, CheckoutEntry>(
            r#"
            UPDATE checkouts SET return_time = $1
            WHERE id = $2 AND return_time IS NULL
            RETURNING *
            "#,
        )
        .bind(Utc::now())
        .bind(entry.id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotCheckedOut)
    }

    /// Overwrite the due date of the outstanding entry for a book.
    ///
    /// Administrator only. The new date is not validated against the
    /// checkout time or the current date.
    pub async fn set_due_date(
        &self,
        book_id: i32,
        new_date: NaiveDate,
        actor_is_admin: bool,
    ) -> AppResult<CheckoutDetails> {
        if !actor_is_admin {
            return Err(AppError::Forbidden(
                "Only an administrator can update a due_date".to_string(),
            ));
        }

        let entry = self
            .find_outstanding(book_id)
            .await?
            .ok_or(AppError::NotCheckedOut)?;

        let updated = sqlx::query_as::<_, CheckoutEntry>(
            r#"
            UPDATE checkouts SET due_date = $1
            WHERE id = $2 AND return_time IS NULL
            RETURNING *
            "#,
        )
        .bind(new_date)
        .bind(entry.id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotCheckedOut)?;

        self.details_for(updated.id).await
    }

    /// Full wire representation of a single entry
    pub async fn details_for(&self, entry_id: i32) -> AppResult<CheckoutDetails> {
        let row = sqlx::query_as::<_, CheckoutDetailsRow>(&format!(
            r#"
            SELECT {DETAILS_COLUMNS}
            FROM checkouts c
            JOIN books b ON c.book_id = b.id
            LEFT JOIN users u ON c.user_id = u.id
            WHERE c.id = $1
            "#
        ))
        .bind(entry_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Checkout entry {} not found", entry_id)))?;

        Ok(row.into())
    }

    /// Outstanding entries for a borrower, in checkout order
    pub async fn list_active_for(&self, user_id: i32) -> AppResult<Vec<CheckoutDetails>> {
        let rows = sqlx::query_as::<_, CheckoutDetailsRow>(&format!(
            r#"
            SELECT {DETAILS_COLUMNS}
            FROM checkouts c
            JOIN books b ON c.book_id = b.id
            LEFT JOIN users u ON c.user_id = u.id
            WHERE c.user_id = $1 AND c.return_time IS NULL
            ORDER BY c.checkout_time, c.id
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CheckoutDetails::from).collect())
    }

    /// Outstanding entries due strictly before `as_of`, by book id
    pub async fn list_overdue(&self, as_of: NaiveDate) -> AppResult<Vec<CheckoutDetails>> {
        let rows = sqlx::query_as::<_, CheckoutDetailsRow>(&format!(
            r#"
            SELECT {DETAILS_COLUMNS}
            FROM checkouts c
            JOIN books b ON c.book_id = b.id
            LEFT JOIN users u ON c.user_id = u.id
            WHERE c.return_time IS NULL AND c.due_date < $1
            ORDER BY c.book_id
            "#
        ))
        .bind(as_of)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CheckoutDetails::from).collect())
    }
}
