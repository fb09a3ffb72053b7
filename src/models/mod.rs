//! Data models shared by the server and the desk client

pub mod book;
pub mod holder;

// Re-export commonly used types
pub use book::{Book, BookId, CheckoutRequest, CreateBook, HeldBook, UpdateBook};
pub use holder::{CreateHolder, Holder, HolderId, HolderRef, UpdateHolder, LIBRARY_HOLDER_NAME};
