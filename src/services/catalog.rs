//! Catalog service for author, genre, and book management

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, AuthorQuery, CreateAuthor, UpdateAuthor},
        book::{Book, BookQuery, CreateBook, UpdateBook},
        genre::{CreateGenre, Genre},
        user::Principal,
    },
    permissions::{authorize, Action, Resource},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    // Books

    pub async fn list_books(
        &self,
        principal: &Principal,
        query: &BookQuery,
    ) -> AppResult<(Vec<Book>, i64)> {
        authorize(principal, Action::List, Resource::Book)?;
        self.repository.books.search(query).await
    }

    pub async fn get_book(&self, principal: &Principal, id: i32) -> AppResult<Book> {
        authorize(principal, Action::Retrieve, Resource::Book)?;
        self.repository.books.get_by_id(id).await
    }

    pub async fn create_book(&self, principal: &Principal, book: CreateBook) -> AppResult<Book> {
        authorize(principal, Action::Create, Resource::Book)?;
        book.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.books.create(&book).await
    }

    pub async fn update_book(
        &self,
        principal: &Principal,
        id: i32,
        update: UpdateBook,
    ) -> AppResult<Book> {
        authorize(principal, Action::Update, Resource::Book)?;
        update
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.books.update(id, &update).await
    }

    pub async fn delete_book(&self, principal: &Principal, id: i32) -> AppResult<()> {
        authorize(principal, Action::Destroy, Resource::Book)?;
        self.repository.books.delete(id).await
    }

    // Authors

    pub async fn list_authors(
        &self,
        principal: &Principal,
        query: &AuthorQuery,
    ) -> AppResult<(Vec<Author>, i64)> {
        authorize(principal, Action::List, Resource::Author)?;
        self.repository.authors.search(query).await
    }

    pub async fn get_author(&self, principal: &Principal, id: i32) -> AppResult<Author> {
        authorize(principal, Action::Retrieve, Resource::Author)?;
        self.repository.authors.get_by_id(id).await
    }

    pub async fn create_author(
        &self,
        principal: &Principal,
        author: CreateAuthor,
    ) -> AppResult<Author> {
        authorize(principal, Action::Create, Resource::Author)?;
        author
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.authors.create(&author).await
    }

    pub async fn update_author(
        &self,
        principal: &Principal,
        id: i32,
        update: UpdateAuthor,
    ) -> AppResult<Author> {
        authorize(principal, Action::Update, Resource::Author)?;
        update
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.authors.update(id, &update).await
    }

    pub async fn delete_author(&self, principal: &Principal, id: i32) -> AppResult<()> {
        authorize(principal, Action::Destroy, Resource::Author)?;
        self.repository.authors.delete(id).await
    }

    // Genres

    pub async fn list_genres(&self, principal: &Principal) -> AppResult<Vec<Genre>> {
        authorize(principal, Action::List, Resource::Genre)?;
        self.repository.genres.list().await
    }

    pub async fn create_genre(&self, principal: &Principal, genre: CreateGenre) -> AppResult<Genre> {
        authorize(principal, Action::Create, Resource::Genre)?;
        genre
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.genres.create(&genre).await
    }

    pub async fn delete_genre(&self, principal: &Principal, id: i32) -> AppResult<()> {
        authorize(principal, Action::Destroy, Resource::Genre)?;
        self.repository.genres.delete(id).await
    }
}
