//! Business logic services

pub mod catalog;
pub mod checkouts;
pub mod users;

use crate::repository::Repository;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub checkouts: checkouts::CheckoutsService,
    pub users: users::UsersService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository) -> Self {
        Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            checkouts: checkouts::CheckoutsService::new(repository.clone()),
            users: users::UsersService::new(repository),
        }
    }
}
