//! Holder model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::book::HeldBook;

pub type HolderId = i32;

/// Reserved holder name meaning "on the shelf"
pub const LIBRARY_HOLDER_NAME: &str = "Library";

/// Holder with the books it currently holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Holder {
    pub id: HolderId,
    pub name: String,
    #[serde(default)]
    pub books: Vec<HeldBook>,
}

impl Holder {
    pub fn is_library(&self) -> bool {
        self.name == LIBRARY_HOLDER_NAME
    }
}

/// Holder row from database
#[derive(Debug, Clone, FromRow)]
pub struct HolderRow {
    pub id: HolderId,
    pub name: String,
}

impl HolderRow {
    pub fn with_books(self, books: Vec<HeldBook>) -> Holder {
        Holder {
            id: self.id,
            name: self.name,
            books,
        }
    }
}

/// Holder as embedded in a book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HolderRef {
    #[serde(default)]
    pub id: Option<HolderId>,
    pub name: String,
}

impl HolderRef {
    pub fn is_library(&self) -> bool {
        self.name == LIBRARY_HOLDER_NAME
    }
}

/// Create holder request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CreateHolder {
    pub name: String,
}

/// Update holder request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UpdateHolder {
    pub name: Option<String>,
}
