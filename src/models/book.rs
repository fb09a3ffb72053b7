//! Book model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::holder::{HolderId, HolderRef};

pub type BookId = i32;

/// Book with its current holder inlined
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub published_year: i32,
    #[serde(default)]
    pub holder_id: Option<HolderId>,
    /// Current holder; the "Library" holder means the book is on the shelf
    pub holder: HolderRef,
}

impl Book {
    /// Whether the book sits with the Library holder
    pub fn is_available(&self) -> bool {
        self.holder.is_library()
    }

    /// Id of the current holder, from either representation
    pub fn current_holder_id(&self) -> Option<HolderId> {
        self.holder_id.or(self.holder.id)
    }
}

/// Book row joined with its holder's name
#[derive(Debug, Clone, FromRow)]
pub struct BookRow {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub published_year: i32,
    pub holder_id: HolderId,
    pub holder_name: String,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            author: row.author,
            published_year: row.published_year,
            holder_id: Some(row.holder_id),
            holder: HolderRef {
                id: Some(row.holder_id),
                name: row.holder_name,
            },
        }
    }
}

/// Book as nested under its holder (no back-reference)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HeldBook {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub published_year: i32,
    #[serde(default)]
    pub holder_id: Option<HolderId>,
}

impl From<Book> for HeldBook {
    fn from(book: Book) -> Self {
        Self {
            holder_id: book.current_holder_id(),
            id: book.id,
            title: book.title,
            author: book.author,
            published_year: book.published_year,
        }
    }
}

/// Create (or fully replace) a book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CreateBook {
    pub title: String,
    pub author: String,
    pub published_year: i32,
    /// Defaults to the Library holder when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holder_id: Option<HolderId>,
}

/// Partial book update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UpdateBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub published_year: Option<i32>,
    pub holder_id: Option<HolderId>,
}

impl From<CreateBook> for UpdateBook {
    fn from(data: CreateBook) -> Self {
        Self {
            title: Some(data.title),
            author: Some(data.author),
            published_year: Some(data.published_year),
            holder_id: data.holder_id,
        }
    }
}

/// Checkout request body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub holder_id: Option<HolderId>,
}
