//! Book catalog and circulation service

use chrono::{Datelike, Utc};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookId, CheckoutRequest, CreateBook, UpdateBook},
        holder::HolderId,
    },
    repository::Repository,
};

use super::circulation::{self, CirculationDesk};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
    circulation: CirculationDesk,
}

impl BooksService {
    pub fn new(repository: Repository, circulation: CirculationDesk) -> Self {
        Self {
            repository,
            circulation,
        }
    }

    pub async fn list(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list().await
    }

    pub async fn get_by_id(&self, id: BookId) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// Create a book, shelving it with the Library holder unless told otherwise
    pub async fn create(&self, data: CreateBook) -> AppResult<Book> {
        let data = CreateBook {
            title: required_text(&data.title, "Title")?,
            author: required_text(&data.author, "Author")?,
            published_year: checked_year(data.published_year)?,
            holder_id: data.holder_id,
        };

        let holder_id = circulation::shelve_target(&self.repository, data.holder_id).await?;

        let book = self.repository.books.create(&data, holder_id).await?;
        tracing::info!("Book created: id={} holder_id={}", book.id, holder_id);
        Ok(book)
    }

    /// Replace every field of a book
    pub async fn replace(&self, id: BookId, data: CreateBook) -> AppResult<Book> {
        self.update(id, UpdateBook::from(data)).await
    }

    /// Update the provided fields of a book
    pub async fn update(&self, id: BookId, data: UpdateBook) -> AppResult<Book> {
        let data = UpdateBook {
            title: data.title.as_deref().map(|t| required_text(t, "Title")).transpose()?,
            author: data.author.as_deref().map(|a| required_text(a, "Author")).transpose()?,
            published_year: data.published_year.map(checked_year).transpose()?,
            holder_id: data.holder_id,
        };

        if let Some(holder_id) = data.holder_id {
            self.repository.holders.get_by_id(holder_id).await?;
        }

        self.repository.books.update(id, &data).await
    }

    pub async fn delete(&self, id: BookId) -> AppResult<()> {
        self.repository.books.delete(id).await?;
        tracing::info!("Book deleted: id={}", id);
        Ok(())
    }

    /// Hand a book to a holder, through the circulation worker
    pub async fn checkout(&self, id: BookId, request: CheckoutRequest) -> AppResult<Book> {
        let holder_id = required_holder_id(request.holder_id)?;
        self.circulation.checkout(id, holder_id).await
    }

    /// Put a book back on the shelf, through the circulation worker
    pub async fn return_book(&self, id: BookId) -> AppResult<Book> {
        self.circulation.return_book(id).await
    }
}

/// A checkout needs a real holder id; zero counts as missing
pub(crate) fn required_holder_id(holder_id: Option<HolderId>) -> AppResult<HolderId> {
    holder_id
        .filter(|id| *id != 0)
        .ok_or_else(|| AppError::BadRequest("holder_id is required".to_string()))
}

/// Trim a required text field, rejecting blank values
pub(crate) fn required_text(value: &str, field: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(value.to_string())
}

/// Accept publication years between 0 and the current year
pub(crate) fn checked_year(year: i32) -> AppResult<i32> {
    let current = Utc::now().year();
    if !(0..=current).contains(&year) {
        return Err(AppError::Validation(format!(
            "Published year must be between 0 and {}",
            current
        )));
    }
    Ok(year)
}
