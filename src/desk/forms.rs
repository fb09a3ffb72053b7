//! Form state and validation for desk mutations

use chrono::{Datelike, Utc};

use super::error::{DeskError, DeskResult, FieldErrors};
use crate::models::{BookId, CreateBook, CreateHolder, HolderId};

/// Add-book form as typed by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookForm {
    pub title: String,
    pub author: String,
    /// Raw text; parsed on submit
    pub published_year: String,
    pub errors: FieldErrors,
}

impl Default for BookForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            author: String::new(),
            published_year: current_year().to_string(),
            errors: FieldErrors::new(),
        }
    }
}

/// Book fields that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub published_year: i32,
}

impl BookDraft {
    pub fn into_request(self, holder_id: HolderId) -> CreateBook {
        CreateBook {
            title: self.title,
            author: self.author,
            published_year: self.published_year,
            holder_id: Some(holder_id),
        }
    }
}

impl BookForm {
    pub fn new(title: &str, author: &str, published_year: &str) -> Self {
        Self {
            title: title.to_string(),
            author: author.to_string(),
            published_year: published_year.to_string(),
            errors: FieldErrors::new(),
        }
    }

    /// Check every field, recording all problems on the form at once
    pub fn validate(&mut self) -> DeskResult<BookDraft> {
        let mut errors = FieldErrors::new();

        let title = self.title.trim();
        if title.is_empty() {
            errors.insert("title", "Title is required");
        }
        let author = self.author.trim();
        if author.is_empty() {
            errors.insert("author", "Author is required");
        }
        let published_year = match parse_year(&self.published_year) {
            Ok(year) => Some(year),
            Err(message) => {
                errors.insert("published_year", message);
                None
            }
        };

        self.errors = errors.clone();
        match published_year {
            Some(published_year) if errors.is_empty() => Ok(BookDraft {
                title: title.to_string(),
                author: author.to_string(),
                published_year,
            }),
            _ => Err(DeskError::Validation(errors)),
        }
    }

    /// Back to a blank form for the current year
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn parse_year(raw: &str) -> Result<i32, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("Year is required".to_string());
    }
    let year: i32 = raw
        .parse()
        .map_err(|_| "Year must be a whole number".to_string())?;
    let current = current_year();
    if !(0..=current).contains(&year) {
        return Err(format!("Year must be between 0 and {}", current));
    }
    Ok(year)
}

fn current_year() -> i32 {
    Utc::now().year()
}

/// Add-holder form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolderForm {
    pub name: String,
    pub errors: FieldErrors,
}

impl HolderForm {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            errors: FieldErrors::new(),
        }
    }

    pub fn validate(&mut self) -> DeskResult<CreateHolder> {
        let mut errors = FieldErrors::new();
        let name = self.name.trim();
        if name.is_empty() {
            errors.insert("name", "Name is required");
        }

        self.errors = errors.clone();
        if !errors.is_empty() {
            return Err(DeskError::Validation(errors));
        }
        Ok(CreateHolder {
            name: name.to_string(),
        })
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Book and holder picked on the checkout form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutSelection {
    pub book: Option<BookId>,
    pub holder: Option<HolderId>,
    /// Inline error shown under the form
    pub error: Option<String>,
}

impl CheckoutSelection {
    pub fn new(book: Option<BookId>, holder: Option<HolderId>) -> Self {
        Self {
            book,
            holder,
            error: None,
        }
    }

    pub fn select_book(&mut self, id: BookId) {
        self.book = Some(id);
    }

    pub fn select_holder(&mut self, id: HolderId) {
        self.holder = Some(id);
    }

    /// Both ids, or `IncompleteSelection` (also recorded inline)
    pub fn validate(&mut self) -> DeskResult<(BookId, HolderId)> {
        match (self.book, self.holder) {
            (Some(book), Some(holder)) => {
                self.error = None;
                Ok((book, holder))
            }
            _ => {
                let error = DeskError::IncompleteSelection;
                self.error = Some(error.to_string());
                Err(error)
            }
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Two-step confirmation: `open` requests an action on a target, the
/// coordinator performs it only while the dialog is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmDialog<T> {
    target: Option<T>,
}

impl<T> Default for ConfirmDialog<T> {
    fn default() -> Self {
        Self { target: None }
    }
}

impl<T: Copy> ConfirmDialog<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, target: T) {
        self.target = Some(target);
    }

    pub fn cancel(&mut self) {
        self.target = None;
    }

    pub fn target(&self) -> Option<T> {
        self.target
    }

    pub fn is_open(&self) -> bool {
        self.target.is_some()
    }

    pub(crate) fn close(&mut self) {
        self.target = None;
    }
}
