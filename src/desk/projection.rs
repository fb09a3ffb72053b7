//! Availability projection over fetched books and holders

use crate::models::{Book, Holder, HolderId};

pub use crate::models::LIBRARY_HOLDER_NAME;

/// Books split by whether they sit with the Library holder
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition<'a> {
    pub available: Vec<&'a Book>,
    pub checked_out: Vec<&'a Book>,
}

/// Split `books` into available and checked out, keeping input order
pub fn partition(books: &[Book]) -> Partition<'_> {
    let (available, checked_out): (Vec<&Book>, Vec<&Book>) =
        books.iter().partition(|book| book.is_available());
    Partition {
        available,
        checked_out,
    }
}

/// Id of the holder named exactly "Library", if there is one
pub fn library_holder_id(holders: &[Holder]) -> Option<HolderId> {
    holders
        .iter()
        .find(|holder| holder.is_library())
        .map(|holder| holder.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HolderRef;

    fn book(id: i32, holder: &str) -> Book {
        Book {
            id,
            title: format!("Book {}", id),
            author: "A".into(),
            published_year: 1999,
            holder_id: None,
            holder: HolderRef {
                id: None,
                name: holder.into(),
            },
        }
    }

    fn holder(id: i32, name: &str) -> Holder {
        Holder {
            id,
            name: name.into(),
            books: Vec::new(),
        }
    }

    #[test]
    fn partition_covers_every_book_exactly_once() {
        let books = vec![
            book(1, "Library"),
            book(2, "Alice"),
            book(3, "Library"),
            book(4, "Bob"),
            book(5, "library"),
        ];

        let split = partition(&books);
        let available: Vec<i32> = split.available.iter().map(|b| b.id).collect();
        let checked_out: Vec<i32> = split.checked_out.iter().map(|b| b.id).collect();

        assert_eq!(available, vec![1, 3]);
        assert_eq!(checked_out, vec![2, 4, 5]);
        assert_eq!(available.len() + checked_out.len(), books.len());
        assert!(available.iter().all(|id| !checked_out.contains(id)));
    }

    #[test]
    fn partition_of_nothing_is_empty() {
        let split = partition(&[]);
        assert!(split.available.is_empty());
        assert!(split.checked_out.is_empty());
    }

    #[test]
    fn library_holder_is_found_by_exact_name() {
        let holders = vec![holder(4, "Alice"), holder(7, "Library"), holder(9, "Bob")];
        assert_eq!(library_holder_id(&holders), Some(7));
    }

    #[test]
    fn missing_library_holder_resolves_to_none() {
        let holders = vec![holder(1, "Alice"), holder(2, "library shelf")];
        assert_eq!(library_holder_id(&holders), None);
        assert_eq!(library_holder_id(&[]), None);
    }
}
