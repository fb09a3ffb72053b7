//! Business logic services

pub mod books;
pub mod circulation;
pub mod holders;
pub mod seed;

use std::sync::Arc;

use crate::{config::CirculationConfig, error::AppResult, repository::Repository};

use circulation::CirculationDesk;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub books: books::BooksService,
    pub holders: holders::HoldersService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository.
    /// Starts the circulation worker, so call it inside a tokio runtime.
    pub fn new(repository: Repository, circulation: &CirculationConfig) -> Self {
        let desk = CirculationDesk::spawn(Arc::new(repository.clone()), circulation);
        Self {
            books: books::BooksService::new(repository.clone(), desk),
            holders: holders::HoldersService::new(repository.clone()),
            repository,
        }
    }

    /// Check that the database answers
    pub async fn ready(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}
