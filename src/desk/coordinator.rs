//! Mutation coordinator
//!
//! Runs user-initiated writes against the remote store. A write that
//! succeeds updates the caller's form or dialog, publishes a notice and
//! then invalidates the affected cache keys; a write that fails leaves
//! the form, dialog and cache as they were and publishes the error.
//! Nothing is retried and nothing is inserted optimistically.

use std::sync::Arc;

use tokio::sync::broadcast;

use super::cache::{CacheKey, QueryCache};
use super::error::{DeskError, DeskResult};
use super::forms::{BookForm, CheckoutSelection, ConfirmDialog, HolderForm};
use super::projection::library_holder_id;
use super::remote::RemoteStore;
use crate::models::{Book, BookId, Holder, HolderId};

/// User-initiated writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    AddBook,
    RemoveBook,
    Checkout,
    Return,
    AddHolder,
    RemoveHolder,
}

impl Mutation {
    pub fn success_message(self) -> &'static str {
        match self {
            Mutation::AddBook => "Book added!",
            Mutation::RemoveBook => "Book removed!",
            Mutation::Checkout => "Book checked out successfully!",
            Mutation::Return => "Book returned successfully!",
            Mutation::AddHolder => "Holder added successfully",
            Mutation::RemoveHolder => "Holder removed",
        }
    }

    /// Shown when the server gives no reason of its own
    pub fn failure_message(self) -> &'static str {
        match self {
            Mutation::AddBook => "Failed to add book",
            Mutation::RemoveBook => "Failed to remove book",
            Mutation::Checkout => "Checkout failed",
            Mutation::Return => "Return failed",
            Mutation::AddHolder => "Failed to add holder",
            Mutation::RemoveHolder => "Failed to remove holder",
        }
    }

    /// Collections that change when this write succeeds
    pub fn invalidates(self) -> &'static [CacheKey] {
        match self {
            Mutation::AddBook | Mutation::RemoveBook | Mutation::Checkout | Mutation::Return => {
                &[CacheKey::Books]
            }
            Mutation::AddHolder => &[CacheKey::Holders],
            // Removing a holder also removes the books it held
            Mutation::RemoveHolder => &[CacheKey::Holders, CacheKey::Books],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

/// Transient user notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

const NOTICE_CAPACITY: usize = 16;

pub struct MutationCoordinator {
    store: Arc<dyn RemoteStore>,
    cache: QueryCache,
    notices: broadcast::Sender<Notice>,
}

impl MutationCoordinator {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self::with_cache(QueryCache::new(store))
    }

    /// Coordinate writes for readers already sharing `cache`
    pub fn with_cache(cache: QueryCache) -> Self {
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);
        Self {
            store: Arc::clone(cache.store()),
            cache,
            notices,
        }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn subscribe_notices(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    /// Create a book held by `holder_id`.
    ///
    /// Invalid fields are recorded on the form; a missing holder fails with
    /// `LibraryHolderNotFound`. Neither reaches the store. The form is reset
    /// only on success.
    pub async fn add_book(&self, form: &mut BookForm, holder_id: Option<HolderId>) -> DeskResult<Book> {
        let draft = form.validate()?;
        let holder_id =
            holder_id.ok_or_else(|| self.reject(Mutation::AddBook, DeskError::LibraryHolderNotFound))?;

        match self.store.create_book(&draft.into_request(holder_id)).await {
            Ok(book) => {
                form.reset();
                self.succeed(Mutation::AddBook);
                Ok(book)
            }
            Err(e) => Err(self.reject(Mutation::AddBook, e)),
        }
    }

    /// Create a book on the shelf, resolving the Library holder from the
    /// cached holders list
    pub async fn add_book_to_library(&self, form: &mut BookForm) -> DeskResult<Book> {
        form.validate()?;
        let holders = self
            .cache
            .holders()
            .await
            .map_err(|e| self.reject(Mutation::AddBook, e))?;
        let library = library_holder_id(&holders);
        self.add_book(form, library).await
    }

    /// Delete the book the dialog was opened for
    pub async fn remove_book(&self, dialog: &mut ConfirmDialog<BookId>) -> DeskResult<()> {
        let id = dialog.target().ok_or(DeskError::NothingToConfirm)?;

        match self.store.delete_book(id).await {
            Ok(()) => {
                dialog.close();
                self.succeed(Mutation::RemoveBook);
                Ok(())
            }
            Err(e) => Err(self.reject(Mutation::RemoveBook, e)),
        }
    }

    /// Check the selected book out to the selected holder.
    ///
    /// The selection is cleared on success and kept on failure. The updated
    /// book is returned when the server sent one.
    pub async fn checkout_book(&self, selection: &mut CheckoutSelection) -> DeskResult<Option<Book>> {
        let (book_id, holder_id) = selection.validate()?;

        match self.store.checkout_book(book_id, holder_id).await {
            Ok(book) => {
                selection.clear();
                self.succeed(Mutation::Checkout);
                Ok(book)
            }
            Err(e) => Err(self.reject(Mutation::Checkout, e)),
        }
    }

    /// Return the book the dialog was opened for
    pub async fn return_book(&self, dialog: &mut ConfirmDialog<BookId>) -> DeskResult<Option<Book>> {
        let id = dialog.target().ok_or(DeskError::NothingToConfirm)?;

        match self.store.return_book(id).await {
            Ok(book) => {
                dialog.close();
                self.succeed(Mutation::Return);
                Ok(book)
            }
            Err(e) => Err(self.reject(Mutation::Return, e)),
        }
    }

    pub async fn add_holder(&self, form: &mut HolderForm) -> DeskResult<Holder> {
        let request = form.validate()?;

        match self.store.create_holder(&request).await {
            Ok(holder) => {
                form.reset();
                self.succeed(Mutation::AddHolder);
                Ok(holder)
            }
            Err(e) => Err(self.reject(Mutation::AddHolder, e)),
        }
    }

    /// Delete the holder the dialog was opened for
    pub async fn remove_holder(&self, dialog: &mut ConfirmDialog<HolderId>) -> DeskResult<()> {
        let id = dialog.target().ok_or(DeskError::NothingToConfirm)?;

        match self.store.delete_holder(id).await {
            Ok(()) => {
                dialog.close();
                self.succeed(Mutation::RemoveHolder);
                Ok(())
            }
            Err(e) => Err(self.reject(Mutation::RemoveHolder, e)),
        }
    }

    fn succeed(&self, action: Mutation) {
        tracing::info!(?action, "Mutation succeeded");
        self.notify(Severity::Success, action.success_message().to_string());
        for key in action.invalidates() {
            self.cache.invalidate(*key);
        }
    }

    fn reject(&self, action: Mutation, error: DeskError) -> DeskError {
        let message = error.user_message(action);
        tracing::warn!(?action, "Mutation failed: {}", error);
        self.notify(Severity::Error, message);
        error
    }

    fn notify(&self, severity: Severity, message: String) {
        // Nobody listening is fine
        let _ = self.notices.send(Notice { severity, message });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desk::projection::partition;
    use crate::desk::remote::MockRemoteStore;
    use crate::models::HolderRef;
    use mockall::Sequence;

    fn book(id: BookId, holder_id: HolderId, holder: &str) -> Book {
        Book {
            id,
            title: format!("Book {}", id),
            author: "Author".into(),
            published_year: 2010,
            holder_id: Some(holder_id),
            holder: HolderRef {
                id: Some(holder_id),
                name: holder.into(),
            },
        }
    }

    fn holder(id: HolderId, name: &str) -> Holder {
        Holder {
            id,
            name: name.into(),
            books: Vec::new(),
        }
    }

    fn coordinator(store: MockRemoteStore) -> MutationCoordinator {
        MutationCoordinator::new(Arc::new(store))
    }

    fn remote_error(message: Option<&str>) -> DeskError {
        DeskError::Remote {
            status: 400,
            message: message.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn add_book_with_blank_fields_never_reaches_store() {
        let mut store = MockRemoteStore::new();
        store.expect_create_book().never();
        let desk = coordinator(store);
        let mut form = BookForm::new("", " ", "2020");

        let err = desk.add_book(&mut form, Some(1)).await.unwrap_err();

        assert!(matches!(err, DeskError::Validation(ref errors) if errors.len() == 2));
        assert_eq!(form.errors.get("title"), Some("Title is required"));
        assert_eq!(form.errors.get("author"), Some("Author is required"));
    }

    #[tokio::test]
    async fn add_book_without_library_holder_is_reported() {
        let mut store = MockRemoteStore::new();
        store.expect_create_book().never();
        let desk = coordinator(store);
        let mut notices = desk.subscribe_notices();
        let mut form = BookForm::new("T", "A", "2020");

        let err = desk.add_book(&mut form, None).await.unwrap_err();

        assert!(matches!(err, DeskError::LibraryHolderNotFound));
        let notice = notices.try_recv().unwrap();
        assert_eq!(notice.severity, Severity::Error);
        assert_eq!(notice.message, "Library holder not found");
        assert_eq!(form.title, "T");
    }

    #[tokio::test]
    async fn add_book_to_library_resolves_holder_from_cache() {
        let mut store = MockRemoteStore::new();
        store
            .expect_list_holders()
            .times(1)
            .returning(|| Ok(vec![holder(2, "Alice"), holder(1, "Library")]));
        store
            .expect_create_book()
            .withf(|request| request.holder_id == Some(1) && request.title == "T")
            .times(1)
            .returning(|_| Ok(book(10, 1, "Library")));
        store.expect_list_books().times(1).returning(|| Ok(vec![book(10, 1, "Library")]));
        let desk = coordinator(store);
        let mut notices = desk.subscribe_notices();
        let mut form = BookForm::new("T", "A", "2020");

        let created = desk.add_book_to_library(&mut form).await.unwrap();

        assert_eq!(created.id, 10);
        assert!(form.title.is_empty());
        assert_eq!(notices.try_recv().unwrap().message, "Book added!");
        let books = desk.cache().books().await.unwrap();
        assert_eq!(books[0].id, 10);
    }

    #[tokio::test]
    async fn add_book_to_library_without_library_never_creates() {
        let mut store = MockRemoteStore::new();
        store
            .expect_list_holders()
            .times(1)
            .returning(|| Ok(vec![holder(2, "Alice")]));
        store.expect_create_book().never();
        let desk = coordinator(store);
        let mut form = BookForm::new("T", "A", "2020");

        let err = desk.add_book_to_library(&mut form).await.unwrap_err();

        assert!(matches!(err, DeskError::LibraryHolderNotFound));
    }

    #[tokio::test]
    async fn add_book_failure_keeps_form_and_shows_server_reason() {
        let mut store = MockRemoteStore::new();
        store
            .expect_create_book()
            .times(1)
            .returning(|_| Err(remote_error(Some("Holder 1 not found"))));
        let desk = coordinator(store);
        let mut notices = desk.subscribe_notices();
        let mut form = BookForm::new("T", "A", "2020");

        assert!(desk.add_book(&mut form, Some(1)).await.is_err());

        assert_eq!(form.title, "T");
        assert_eq!(notices.try_recv().unwrap().message, "Holder 1 not found");
    }

    #[tokio::test]
    async fn remove_book_requires_confirmation() {
        let mut store = MockRemoteStore::new();
        store.expect_delete_book().never();
        let desk = coordinator(store);
        let mut dialog = ConfirmDialog::new();

        let err = desk.remove_book(&mut dialog).await.unwrap_err();

        assert!(matches!(err, DeskError::NothingToConfirm));
    }

    #[tokio::test]
    async fn removed_book_is_gone_from_next_read() {
        let mut store = MockRemoteStore::new();
        let mut seq = Sequence::new();
        store
            .expect_list_books()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(vec![book(1, 1, "Library"), book(2, 1, "Library")]));
        store
            .expect_delete_book()
            .withf(|id| *id == 1)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        store
            .expect_list_books()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(vec![book(2, 1, "Library")]));
        let desk = coordinator(store);

        assert_eq!(desk.cache().books().await.unwrap().len(), 2);
        let mut dialog = ConfirmDialog::new();
        dialog.open(1);
        desk.remove_book(&mut dialog).await.unwrap();

        assert!(!dialog.is_open());
        let books = desk.cache().books().await.unwrap();
        assert!(books.iter().all(|b| b.id != 1));
    }

    #[tokio::test]
    async fn failed_removal_keeps_dialog_and_cache() {
        let mut store = MockRemoteStore::new();
        store
            .expect_list_books()
            .times(1)
            .returning(|| Ok(vec![book(1, 1, "Library")]));
        store
            .expect_delete_book()
            .times(1)
            .returning(|_| Err(remote_error(None)));
        let desk = coordinator(store);
        let mut notices = desk.subscribe_notices();

        let before = desk.cache().books().await.unwrap();
        let mut dialog = ConfirmDialog::new();
        dialog.open(1);
        assert!(desk.remove_book(&mut dialog).await.is_err());

        assert_eq!(dialog.target(), Some(1));
        assert_eq!(notices.try_recv().unwrap().message, "Failed to remove book");
        let after = desk.cache().books().await.unwrap();
        assert!(Arc::ptr_eq(&before, &after));
    }

    #[tokio::test]
    async fn checkout_needs_a_complete_selection() {
        let mut store = MockRemoteStore::new();
        store.expect_checkout_book().never();
        let desk = coordinator(store);
        let mut selection = CheckoutSelection::new(None, Some(2));

        let err = desk.checkout_book(&mut selection).await.unwrap_err();

        assert!(matches!(err, DeskError::IncompleteSelection));
        assert_eq!(selection.holder, Some(2));
    }

    #[tokio::test]
    async fn checked_out_book_moves_out_of_available() {
        let mut store = MockRemoteStore::new();
        let mut seq = Sequence::new();
        store
            .expect_list_books()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(vec![book(1, 1, "Library")]));
        store
            .expect_checkout_book()
            .withf(|book_id, holder_id| *book_id == 1 && *holder_id == 2)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(Some(book(1, 2, "Alice"))));
        store
            .expect_list_books()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(vec![book(1, 2, "Alice")]));
        let desk = coordinator(store);

        let books = desk.cache().books().await.unwrap();
        assert_eq!(partition(&books).available.len(), 1);

        let mut selection = CheckoutSelection::new(Some(1), Some(2));
        desk.checkout_book(&mut selection).await.unwrap();
        assert_eq!(selection, CheckoutSelection::default());

        let books = desk.cache().books().await.unwrap();
        let split = partition(&books);
        assert!(split.available.is_empty());
        assert_eq!(split.checked_out[0].current_holder_id(), Some(2));
    }

    #[tokio::test]
    async fn failed_checkout_keeps_selection() {
        let mut store = MockRemoteStore::new();
        store
            .expect_checkout_book()
            .times(1)
            .returning(|_, _| Err(DeskError::Transport("timed out".into())));
        let desk = coordinator(store);
        let mut notices = desk.subscribe_notices();
        let mut selection = CheckoutSelection::new(Some(1), Some(2));

        assert!(desk.checkout_book(&mut selection).await.is_err());

        assert_eq!((selection.book, selection.holder), (Some(1), Some(2)));
        assert_eq!(notices.try_recv().unwrap().message, "Checkout failed");
    }

    #[tokio::test]
    async fn return_closes_dialog_on_success() {
        let mut store = MockRemoteStore::new();
        store
            .expect_return_book()
            .withf(|id| *id == 4)
            .times(1)
            .returning(|_| Ok(Some(book(4, 1, "Library"))));
        store
            .expect_list_books()
            .times(1)
            .returning(|| Ok(vec![book(4, 1, "Library")]));
        let desk = coordinator(store);
        let mut notices = desk.subscribe_notices();
        let mut dialog = ConfirmDialog::new();
        dialog.open(4);

        let returned = desk.return_book(&mut dialog).await.unwrap();

        assert!(returned.is_some_and(|book| book.is_available()));
        assert!(!dialog.is_open());
        assert_eq!(notices.try_recv().unwrap().message, "Book returned successfully!");
        desk.cache().books().await.unwrap();
    }

    #[tokio::test]
    async fn status_only_checkout_still_succeeds() {
        let mut store = MockRemoteStore::new();
        store
            .expect_checkout_book()
            .times(1)
            .returning(|_, _| Ok(None));
        store
            .expect_list_books()
            .times(1)
            .returning(|| Ok(vec![book(1, 2, "Alice")]));
        let desk = coordinator(store);
        let mut notices = desk.subscribe_notices();
        let mut selection = CheckoutSelection::new(Some(1), Some(2));

        assert_eq!(desk.checkout_book(&mut selection).await.unwrap(), None);

        assert_eq!(selection, CheckoutSelection::default());
        assert_eq!(notices.try_recv().unwrap().message, "Book checked out successfully!");
        let books = desk.cache().books().await.unwrap();
        assert_eq!(books[0].current_holder_id(), Some(2));
    }

    #[tokio::test]
    async fn return_failure_keeps_dialog_open() {
        let mut store = MockRemoteStore::new();
        store
            .expect_return_book()
            .times(1)
            .returning(|_| Err(remote_error(Some("Library holder not found"))));
        let desk = coordinator(store);
        let mut dialog = ConfirmDialog::new();
        dialog.open(4);

        let err = desk.return_book(&mut dialog).await.unwrap_err();

        assert_eq!(err.user_message(Mutation::Return), "Library holder not found");
        assert!(dialog.is_open());
    }

    #[tokio::test]
    async fn blank_holder_name_never_reaches_store() {
        let mut store = MockRemoteStore::new();
        store.expect_create_holder().never();
        let desk = coordinator(store);
        let mut form = HolderForm::new("  ");

        assert!(desk.add_holder(&mut form).await.is_err());
        assert_eq!(form.errors.get("name"), Some("Name is required"));
    }

    #[tokio::test]
    async fn add_holder_refreshes_holders() {
        let mut store = MockRemoteStore::new();
        store
            .expect_create_holder()
            .withf(|request| request.name == "Carol")
            .times(1)
            .returning(|request| Ok(holder(3, &request.name)));
        store
            .expect_list_holders()
            .times(1)
            .returning(|| Ok(vec![holder(3, "Carol")]));
        let desk = coordinator(store);
        let mut form = HolderForm::new("Carol");

        let created = desk.add_holder(&mut form).await.unwrap();

        assert_eq!(created.id, 3);
        assert!(form.name.is_empty());
        assert_eq!(desk.cache().holders().await.unwrap()[0].name, "Carol");
    }

    #[tokio::test]
    async fn remove_holder_refreshes_holders_and_books() {
        let mut store = MockRemoteStore::new();
        store
            .expect_delete_holder()
            .withf(|id| *id == 2)
            .times(1)
            .returning(|_| Ok(()));
        store.expect_list_holders().times(1).returning(|| Ok(vec![holder(1, "Library")]));
        store.expect_list_books().times(1).returning(|| Ok(Vec::new()));
        let desk = coordinator(store);
        let mut notices = desk.subscribe_notices();
        let mut dialog = ConfirmDialog::new();
        dialog.open(2);

        desk.remove_holder(&mut dialog).await.unwrap();

        assert_eq!(notices.try_recv().unwrap().message, "Holder removed");
        desk.cache().holders().await.unwrap();
        desk.cache().books().await.unwrap();
    }
}
