//! Checkout orchestration service
//!
//! Sequences the permission evaluator and the checkout ledger per use case.
//! The service gate is the coarse permission check; ownership and
//! administrator checks on individual entries happen in the ledger itself.

use chrono::{NaiveDate, Utc};

use crate::{
    error::{AppError, AppResult},
    models::{checkout::CheckoutDetails, user::Principal},
    permissions::{authorize, Action, Resource},
    repository::Repository,
};

#[derive(Clone)]
pub struct CheckoutsService {
    repository: Repository,
}

impl CheckoutsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Check out a book for the caller
    pub async fn checkout(&self, principal: &Principal, book_id: i32) -> AppResult<()> {
        authorize(principal, Action::Checkout, Resource::Book)?;

        if !self.repository.books.exists(book_id).await? {
            return Err(AppError::NotFound(format!(
                "Book with id {} not found",
                book_id
            )));
        }

        // Advisory fast path; the conditional insert below is what actually
        // decides a concurrent race.
        if !self.repository.checkouts.is_available(book_id).await? {
            return Err(AppError::AlreadyCheckedOut);
        }

        let entry = self.repository.checkouts.checkout(book_id, principal.id).await?;
        tracing::info!(
            book_id,
            user_id = principal.id,
            due_date = %entry.due_date,
            "book checked out"
        );
        Ok(())
    }

    /// Return a book; the ledger enforces borrower-or-admin
    pub async fn return_book(&self, principal: &Principal, book_id: i32) -> AppResult<()> {
        authorize(principal, Action::Return, Resource::CheckoutLedger)?;

        self.repository
            .checkouts
            .return_book(book_id, principal.id, principal.is_admin())
            .await?;
        tracing::info!(book_id, user_id = principal.id, "book returned");
        Ok(())
    }

    /// Override the due date of an outstanding entry (administrator only)
    pub async fn set_due_date(
        &self,
        principal: &Principal,
        book_id: i32,
        due_date: NaiveDate,
    ) -> AppResult<CheckoutDetails> {
        authorize(principal, Action::Update, Resource::CheckoutLedger)?;

        self.repository
            .checkouts
            .set_due_date(book_id, due_date, principal.is_admin())
            .await
    }

    /// The caller's own active loans, in checkout order
    pub async fn list_mine(&self, principal: &Principal) -> AppResult<Vec<CheckoutDetails>> {
        authorize(principal, Action::List, Resource::CheckoutLedger)?;

        self.repository.checkouts.list_active_for(principal.id).await
    }

    /// A single active entry, visible to its borrower or an administrator
    pub async fn get_checkout(
        &self,
        principal: &Principal,
        book_id: i32,
    ) -> AppResult<CheckoutDetails> {
        authorize(principal, Action::Retrieve, Resource::CheckoutLedger)?;

        let entry = self
            .repository
            .checkouts
            .find_outstanding(book_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Book {} is not currently checked out", book_id))
            })?;

        if !principal.is_admin() && entry.user_id != Some(principal.id) {
            return Err(AppError::Forbidden(
                "Checkout entries are visible to their borrower or an administrator".to_string(),
            ));
        }

        self.repository.checkouts.details_for(entry.id).await
    }

    /// All overdue entries as of today (administrator only)
    pub async fn list_overdue(&self, principal: &Principal) -> AppResult<Vec<CheckoutDetails>> {
        authorize(principal, Action::ViewOverdue, Resource::CheckoutLedger)?;

        if !principal.is_admin() {
            return Err(AppError::Forbidden(
                "Only an administrator can view overdue checkouts".to_string(),
            ));
        }

        self.repository
            .checkouts
            .list_overdue(Utc::now().date_naive())
            .await
    }
}
