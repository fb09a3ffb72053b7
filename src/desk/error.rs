//! Desk error types

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use super::coordinator::Mutation;

/// Inline form errors keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.values().map(String::as_str).collect();
        f.write_str(&messages.join("; "))
    }
}

/// Errors surfaced by desk operations
#[derive(Error, Debug)]
pub enum DeskError {
    /// Required fields missing or invalid; nothing was sent
    #[error("{0}")]
    Validation(FieldErrors),

    /// No holder named "Library" to shelve a new book with
    #[error("Library holder not found")]
    LibraryHolderNotFound,

    #[error("Please select both a book and a holder.")]
    IncompleteSelection,

    /// Confirmation attempted while no dialog is open
    #[error("Nothing is awaiting confirmation")]
    NothingToConfirm,

    /// Non-success response from the remote store
    #[error("Remote store responded with status {status}")]
    Remote { status: u16, message: Option<String> },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl DeskError {
    /// Text to show the user after `action` failed: the server's own
    /// message when it sent one, else the action's generic fallback.
    pub fn user_message(&self, action: Mutation) -> String {
        match self {
            DeskError::Remote {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            DeskError::Remote { .. } | DeskError::Transport(_) | DeskError::Decode(_) => {
                action.failure_message().to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Result type alias for desk operations
pub type DeskResult<T> = Result<T, DeskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_message_is_shown_verbatim() {
        let error = DeskError::Remote {
            status: 404,
            message: Some("Holder 9 not found".into()),
        };
        assert_eq!(error.user_message(Mutation::Checkout), "Holder 9 not found");
    }

    #[test]
    fn remote_without_message_uses_fallback() {
        let error = DeskError::Remote {
            status: 500,
            message: None,
        };
        assert_eq!(error.user_message(Mutation::Checkout), "Checkout failed");
        assert_eq!(
            DeskError::Transport("connection refused".into()).user_message(Mutation::AddBook),
            "Failed to add book"
        );
    }

    #[test]
    fn local_errors_keep_their_text() {
        assert_eq!(
            DeskError::LibraryHolderNotFound.user_message(Mutation::AddBook),
            "Library holder not found"
        );
    }

    #[test]
    fn field_errors_display_all_messages() {
        let mut errors = FieldErrors::new();
        errors.insert("title", "Title is required");
        errors.insert("author", "Author is required");
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.to_string(), "Author is required; Title is required");
    }
}
