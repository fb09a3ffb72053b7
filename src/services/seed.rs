//! Sample data loading

use crate::{
    error::AppResult,
    models::{book::CreateBook, holder::LIBRARY_HOLDER_NAME},
    repository::Repository,
};

const SAMPLE_HOLDERS: [&str; 2] = ["Alice", "Bob"];
const SAMPLE_TITLES: [&str; 3] = ["Book 1", "Book 2", "Book 3"];

/// Insert the Library holder, two readers and three shelved books.
/// Rows that already exist (by name or title) are left alone.
pub async fn load_sample_data(repository: &Repository) -> AppResult<()> {
    let library = match repository.holders.find_by_name(LIBRARY_HOLDER_NAME).await? {
        Some(library) => library,
        None => repository.holders.create(LIBRARY_HOLDER_NAME).await?,
    };

    for name in SAMPLE_HOLDERS {
        if repository.holders.find_by_name(name).await?.is_none() {
            repository.holders.create(name).await?;
        }
    }

    for title in SAMPLE_TITLES {
        if !repository.books.exists_by_title(title).await? {
            let book = CreateBook {
                title: title.to_string(),
                author: "Sample Author".to_string(),
                published_year: 2020,
                holder_id: Some(library.id),
            };
            repository.books.create(&book, library.id).await?;
        }
    }

    tracing::info!("Sample data loaded");
    Ok(())
}
