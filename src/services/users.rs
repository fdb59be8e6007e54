//! User directory service

use crate::{
    error::AppResult,
    models::user::{DirectoryUser, Principal, UserQuery},
    permissions::{authorize, Action, Resource},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List directory users with role and active loan titles
    pub async fn list_users(
        &self,
        principal: &Principal,
        query: &UserQuery,
    ) -> AppResult<(Vec<DirectoryUser>, i64)> {
        authorize(principal, Action::List, Resource::UserDirectory)?;
        self.repository.users.search(query).await
    }
}
