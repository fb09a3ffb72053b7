//! Text view models for the desk pages
//!
//! Each page reads cache state and turns it into rows or a single message.
//! Nothing here draws anything.

use std::fmt;

use super::cache::QueryState;
use super::projection::partition;
use crate::models::{Book, BookId, Holder, HolderId};

pub const NO_BOOKS: &str = "No books found.";
pub const NO_HOLDERS: &str = "No holders found.";
pub const NOTHING_CHECKED_OUT: &str = "No books are currently checked out.";
pub const NOTHING_AVAILABLE: &str = "All books are checked out.";

pub const BOOKS_LOAD_FAILED: &str = "Failed to load books.";
pub const HOLDERS_LOAD_FAILED: &str = "Failed to load holders.";
/// Books table fallback when the load error carries no message
pub const BOOKS_TABLE_LOAD_FAILED: &str = "Failed to load books";

/// What a list section shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing<R> {
    Loading,
    Failed(String),
    Empty(&'static str),
    Rows(Vec<R>),
}

impl<R: fmt::Display> Listing<R> {
    /// One line per row, or the single status line
    pub fn lines(&self) -> Vec<String> {
        match self {
            Listing::Loading => vec!["Loading...".to_string()],
            Listing::Failed(message) => vec![message.clone()],
            Listing::Empty(message) => vec![message.to_string()],
            Listing::Rows(rows) => rows.iter().map(ToString::to_string).collect(),
        }
    }
}

impl<R> Listing<R> {
    pub fn rows(&self) -> &[R] {
        match self {
            Listing::Rows(rows) => rows.as_slice(),
            _ => &[],
        }
    }
}

fn listing<T, R>(
    state: &QueryState<Vec<T>>,
    failed: impl Fn(&str) -> String,
    empty: &'static str,
    row: impl Fn(&T) -> R,
) -> Listing<R> {
    match state {
        QueryState::Idle | QueryState::Loading => Listing::Loading,
        QueryState::Failed(error) => Listing::Failed(failed(error)),
        QueryState::Ready(items) if items.is_empty() => Listing::Empty(empty),
        QueryState::Ready(items) => Listing::Rows(items.iter().map(row).collect()),
    }
}

/// Row of the books table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookRow {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub published_year: i32,
}

impl From<&Book> for BookRow {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
            author: book.author.clone(),
            published_year: book.published_year,
        }
    }
}

impl fmt::Display for BookRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {} / {}", self.title, self.author, self.published_year)
    }
}

/// Books table; a failed load shows the error's own message
pub fn books_table(state: &QueryState<Vec<Book>>) -> Listing<BookRow> {
    let failed = |error: &str| {
        let error = error.trim();
        if error.is_empty() {
            BOOKS_TABLE_LOAD_FAILED.to_string()
        } else {
            error.to_string()
        }
    };
    listing(state, failed, NO_BOOKS, |book: &Book| BookRow::from(book))
}

/// Row of the holders table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolderRow {
    pub id: HolderId,
    pub name: String,
}

impl fmt::Display for HolderRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

pub fn holders_table(state: &QueryState<Vec<Holder>>) -> Listing<HolderRow> {
    let failed = |_: &str| HOLDERS_LOAD_FAILED.to_string();
    listing(state, failed, NO_HOLDERS, |holder: &Holder| HolderRow {
        id: holder.id,
        name: holder.name.clone(),
    })
}

/// Entry of a select box
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption<V> {
    pub value: V,
    pub label: String,
}

/// Book that is out, with who has it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedOutRow {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub holder: String,
}

impl fmt::Display for CheckedOutRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} by {} (Holder: {})", self.title, self.author, self.holder)
    }
}

/// Book on the shelf
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailableRow {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub published_year: i32,
}

impl fmt::Display for AvailableRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} by {} ({})",
            self.title, self.author, self.published_year
        )
    }
}

/// Everything the checkout page shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutView {
    /// Available books only
    pub book_options: Vec<SelectOption<BookId>>,
    /// False while books load or when none are available
    pub book_select_enabled: bool,
    pub holder_options: Vec<SelectOption<HolderId>>,
    pub checked_out: Listing<CheckedOutRow>,
    pub available: Listing<AvailableRow>,
}

/// Build the checkout page
pub fn checkout_view(
    books: &QueryState<Vec<Book>>,
    holders: &QueryState<Vec<Holder>>,
) -> CheckoutView {
    let book_options: Vec<SelectOption<BookId>> = books
        .data()
        .map(|books| {
            partition(books)
                .available
                .into_iter()
                .map(|book| SelectOption {
                    value: book.id,
                    label: format!("{} by {}", book.title, book.author),
                })
                .collect()
        })
        .unwrap_or_default();
    let book_select_enabled = !book_options.is_empty();
    let holder_options = holders
        .data()
        .map(|holders| {
            holders
                .iter()
                .map(|holder| SelectOption {
                    value: holder.id,
                    label: holder.name.clone(),
                })
                .collect()
        })
        .unwrap_or_default();

    let (checked_out, available) = match books {
        QueryState::Idle | QueryState::Loading => (Listing::Loading, Listing::Loading),
        QueryState::Failed(_) => (
            Listing::Failed(BOOKS_LOAD_FAILED.to_string()),
            Listing::Failed(BOOKS_LOAD_FAILED.to_string()),
        ),
        QueryState::Ready(books) => {
            let split = partition(books);
            let checked_out: Vec<CheckedOutRow> = split
                .checked_out
                .iter()
                .map(|book| CheckedOutRow {
                    id: book.id,
                    title: book.title.clone(),
                    author: book.author.clone(),
                    holder: book.holder.name.clone(),
                })
                .collect();
            let available: Vec<AvailableRow> = split
                .available
                .iter()
                .map(|book| AvailableRow {
                    id: book.id,
                    title: book.title.clone(),
                    author: book.author.clone(),
                    published_year: book.published_year,
                })
                .collect();
            (
                non_empty(checked_out, NOTHING_CHECKED_OUT),
                non_empty(available, NOTHING_AVAILABLE),
            )
        }
    };

    CheckoutView {
        book_options,
        book_select_enabled,
        holder_options,
        checked_out,
        available,
    }
}

fn non_empty<R>(rows: Vec<R>, empty: &'static str) -> Listing<R> {
    if rows.is_empty() {
        Listing::Empty(empty)
    } else {
        Listing::Rows(rows)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::HolderRef;

    fn ready<T>(items: Vec<T>) -> QueryState<Vec<T>> {
        QueryState::Ready(Arc::new(items))
    }

    #[test]
    fn empty_collections_show_empty_messages() {
        let books = ready(Vec::<Book>::new());
        let holders = ready(Vec::<Holder>::new());

        assert_eq!(books_table(&books).lines(), vec![NO_BOOKS]);
        assert_eq!(holders_table(&holders).lines(), vec![NO_HOLDERS]);

        let view = checkout_view(&books, &holders);
        assert_eq!(view.checked_out, Listing::Empty(NOTHING_CHECKED_OUT));
        assert_eq!(view.available, Listing::Empty(NOTHING_AVAILABLE));
        assert!(view.book_options.is_empty());
        assert!(view.holder_options.is_empty());
    }

    #[test]
    fn single_shelved_book() {
        let books = ready(vec![Book {
            id: 1,
            title: "T".into(),
            author: "A".into(),
            published_year: 2020,
            holder_id: Some(1),
            holder: HolderRef {
                id: Some(1),
                name: "Library".into(),
            },
        }]);
        let holders = ready(vec![Holder {
            id: 1,
            name: "Library".into(),
            books: Vec::new(),
        }]);

        assert_eq!(books_table(&books).lines(), vec!["T / A / 2020"]);

        let view = checkout_view(&books, &holders);
        assert_eq!(view.available.rows().len(), 1);
        assert_eq!(view.available.rows()[0].id, 1);
        assert_eq!(view.checked_out.lines(), vec![NOTHING_CHECKED_OUT]);
        assert_eq!(view.book_options.len(), 1);
        assert_eq!(view.book_options[0].label, "T by A");
        assert!(view.book_select_enabled);
        assert_eq!(view.holder_options[0].label, "Library");
    }

    #[test]
    fn checked_out_row_names_the_holder() {
        let books = ready(vec![Book {
            id: 2,
            title: "Dune".into(),
            author: "Herbert".into(),
            published_year: 1965,
            holder_id: Some(2),
            holder: HolderRef {
                id: Some(2),
                name: "Alice".into(),
            },
        }]);

        let view = checkout_view(&books, &QueryState::Loading);
        assert_eq!(view.checked_out.lines(), vec!["Dune by Herbert (Holder: Alice)"]);
        assert_eq!(view.available, Listing::Empty(NOTHING_AVAILABLE));
        assert!(view.book_options.is_empty());
        assert!(!view.book_select_enabled);
        assert!(view.holder_options.is_empty());
    }

    #[test]
    fn only_shelved_books_are_offered_for_checkout() {
        let shelved = |id: BookId, holder: &str| Book {
            id,
            title: format!("Book {}", id),
            author: "A".into(),
            published_year: 2000,
            holder_id: None,
            holder: HolderRef {
                id: None,
                name: holder.into(),
            },
        };
        let books = ready(vec![shelved(1, "Alice"), shelved(2, "Library"), shelved(3, "Bob")]);

        let view = checkout_view(&books, &QueryState::Idle);

        let offered: Vec<BookId> = view.book_options.iter().map(|o| o.value).collect();
        assert_eq!(offered, vec![2]);
        assert_eq!(view.checked_out.rows().len(), 2);
    }

    #[test]
    fn book_select_disabled_while_loading() {
        let view = checkout_view(&QueryState::Loading, &QueryState::Loading);
        assert!(!view.book_select_enabled);
        assert_eq!(view.available, Listing::Loading);
    }

    #[test]
    fn load_states_map_to_status_lines() {
        assert_eq!(books_table(&QueryState::Idle), Listing::Loading);
        assert_eq!(
            books_table(&QueryState::Failed("Request failed: connection refused".into())).lines(),
            vec!["Request failed: connection refused"]
        );
        assert_eq!(
            books_table(&QueryState::Failed("  ".into())).lines(),
            vec![BOOKS_TABLE_LOAD_FAILED]
        );
        let view = checkout_view(&QueryState::Failed("boom".into()), &QueryState::Idle);
        assert_eq!(view.available.lines(), vec![BOOKS_LOAD_FAILED]);
        assert_eq!(
            holders_table(&QueryState::Failed("boom".into())).lines(),
            vec![HOLDERS_LOAD_FAILED]
        );
    }
}
