//! Checkout ledger models
//!
//! A ledger entry records one checkout-to-return cycle for a book. The entry
//! with a null return time is the outstanding one; the book is checked out
//! exactly while such an entry exists. Book and user references are weak:
//! the entry outlives both as a historical record.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Loan period applied at checkout time
pub const LOAN_PERIOD_DAYS: i64 = 14;

/// Due date for a checkout happening at `now`.
///
/// Computed once and stored; never recomputed after the fact.
pub fn default_due_date(now: DateTime<Utc>) -> NaiveDate {
    (now + Duration::days(LOAN_PERIOD_DAYS)).date_naive()
}

/// Ledger entry from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CheckoutEntry {
    pub id: i32,
    pub book_id: Option<i32>,
    pub user_id: Option<i32>,
    pub checkout_time: DateTime<Utc>,
    pub due_date: NaiveDate,
    pub return_time: Option<DateTime<Utc>>,
}

impl CheckoutEntry {
    pub fn is_outstanding(&self) -> bool {
        self.return_time.is_none()
    }

    /// Overdue is a derived predicate, never a stored state
    pub fn is_overdue(&self, as_of: NaiveDate) -> bool {
        self.is_outstanding() && self.due_date < as_of
    }
}

/// Borrower identity nested in a checkout payload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckoutUser {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
}

/// Internal row structure for checkout detail queries
#[derive(Debug, Clone, FromRow)]
pub struct CheckoutDetailsRow {
    pub entry_id: i32,
    pub book_id: i32,
    pub book_title: String,
    pub due_date: NaiveDate,
    pub borrower_id: Option<i32>,
    pub borrower_first_name: Option<String>,
    pub borrower_last_name: Option<String>,
}

impl From<CheckoutDetailsRow> for CheckoutDetails {
    fn from(row: CheckoutDetailsRow) -> Self {
        let user = match (row.borrower_id, row.borrower_first_name, row.borrower_last_name) {
            (Some(id), Some(first_name), Some(last_name)) => Some(CheckoutUser {
                id,
                first_name,
                last_name,
            }),
            _ => None,
        };
        CheckoutDetails {
            book_id: row.book_id,
            book_title: row.book_title,
            due_date: row.due_date,
            user,
        }
    }
}

/// Checkout entry as presented on the wire
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckoutDetails {
    pub book_id: i32,
    pub book_title: String,
    pub due_date: NaiveDate,
    pub user: Option<CheckoutUser>,
}

/// Due-date override request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateDueDate {
    pub due_date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_default_due_date_is_two_weeks_out() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 15, 30, 0).unwrap();
        assert_eq!(
            default_due_date(now),
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
        );
    }

    #[test]
    fn test_default_due_date_crosses_month_boundary() {
        let now = Utc.with_ymd_and_hms(2024, 2, 20, 0, 0, 0).unwrap();
        assert_eq!(
            default_due_date(now),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
        );
    }

    #[test]
    fn test_overdue_is_strictly_before() {
        let entry = CheckoutEntry {
            id: 1,
            book_id: Some(1),
            user_id: Some(1),
            checkout_time: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            return_time: None,
        };
        assert!(!entry.is_overdue(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()));
        assert!(entry.is_overdue(NaiveDate::from_ymd_opt(2024, 3, 16).unwrap()));
    }

    #[test]
    fn test_returned_entry_is_never_overdue() {
        let entry = CheckoutEntry {
            id: 1,
            book_id: Some(1),
            user_id: Some(1),
            checkout_time: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            return_time: Some(Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()),
        };
        assert!(!entry.is_outstanding());
        assert!(!entry.is_overdue(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()));
    }
}
