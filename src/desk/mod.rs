//! Desk client core
//!
//! Everything an administration front end needs besides rendering: the
//! [`RemoteStore`] contract and its HTTP implementation, a keyed
//! [`QueryCache`] with invalidate-then-refetch semantics, the availability
//! [`projection`], form validation, the [`MutationCoordinator`] and plain
//! page [`views`].

pub mod cache;
pub mod coordinator;
pub mod error;
pub mod forms;
pub mod projection;
pub mod remote;
pub mod views;

pub use cache::{CacheKey, QueryCache, QueryState};
pub use coordinator::{Mutation, MutationCoordinator, Notice, Severity};
pub use error::{DeskError, DeskResult, FieldErrors};
pub use forms::{BookForm, CheckoutSelection, ConfirmDialog, HolderForm};
pub use projection::{library_holder_id, partition, Partition};
pub use remote::{HttpRemoteStore, RemoteStore};
