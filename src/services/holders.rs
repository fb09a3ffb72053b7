//! Holder management service

use std::collections::HashMap;

use crate::{
    error::AppResult,
    models::{
        book::HeldBook,
        holder::{CreateHolder, Holder, HolderId, UpdateHolder},
    },
    repository::Repository,
};

use super::books::required_text;

#[derive(Clone)]
pub struct HoldersService {
    repository: Repository,
}

impl HoldersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List holders, each with the books it holds
    pub async fn list(&self) -> AppResult<Vec<Holder>> {
        let rows = self.repository.holders.list().await?;

        let mut held: HashMap<HolderId, Vec<HeldBook>> = HashMap::new();
        for book in self.repository.books.list().await? {
            if let Some(holder_id) = book.current_holder_id() {
                held.entry(holder_id).or_default().push(book.into());
            }
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let books = held.remove(&row.id).unwrap_or_default();
                row.with_books(books)
            })
            .collect())
    }

    pub async fn get_by_id(&self, id: HolderId) -> AppResult<Holder> {
        let row = self.repository.holders.get_by_id(id).await?;
        let books = self.repository.books.list_by_holder(id).await?;
        Ok(row.with_books(books.into_iter().map(HeldBook::from).collect()))
    }

    pub async fn create(&self, data: CreateHolder) -> AppResult<Holder> {
        let name = required_text(&data.name, "Name")?;
        let row = self.repository.holders.create(&name).await?;
        tracing::info!("Holder created: id={} name={}", row.id, row.name);
        Ok(row.with_books(Vec::new()))
    }

    /// Rename a holder; an update without a name leaves it unchanged
    pub async fn update(&self, id: HolderId, data: UpdateHolder) -> AppResult<Holder> {
        if let Some(name) = data.name {
            let name = required_text(&name, "Name")?;
            self.repository.holders.rename(id, &name).await?;
        }
        self.get_by_id(id).await
    }

    /// Delete a holder together with the books it holds
    pub async fn delete(&self, id: HolderId) -> AppResult<()> {
        self.repository.holders.delete(id).await?;
        tracing::info!("Holder deleted: id={}", id);
        Ok(())
    }
}
