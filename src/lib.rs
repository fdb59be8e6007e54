//! Biblos Library Catalog & Checkout Server
//!
//! A role-gated REST JSON API tracking authors, books, genres, and a ledger
//! of who currently holds which book. Authentication lives in an external
//! identity provider; this server consumes its bearer tokens.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod permissions;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
