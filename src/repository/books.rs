//! Books repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookId, BookRow, CreateBook, UpdateBook},
        holder::HolderId,
    },
};

/// Columns selected for every book read, joined with the holder name.
/// `b` is the books relation (table or CTE), `h` the holders table.
const BOOK_COLUMNS: &str =
    "b.id, b.title, b.author, b.published_year, b.holder_id, h.name AS holder_name";

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all books in insertion order
    pub async fn list(&self) -> AppResult<Vec<Book>> {
        let query = format!(
            "SELECT {} FROM books b JOIN holders h ON h.id = b.holder_id ORDER BY b.id",
            BOOK_COLUMNS
        );
        let rows = sqlx::query_as::<_, BookRow>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Book::from).collect())
    }

    /// List the books currently assigned to a holder
    pub async fn list_by_holder(&self, holder_id: HolderId) -> AppResult<Vec<Book>> {
        let query = format!(
            "SELECT {} FROM books b JOIN holders h ON h.id = b.holder_id WHERE b.holder_id = $1 ORDER BY b.id",
            BOOK_COLUMNS
        );
        let rows = sqlx::query_as::<_, BookRow>(&query)
            .bind(holder_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Book::from).collect())
    }

    /// Find book by ID
    pub async fn find_by_id(&self, id: BookId) -> AppResult<Option<Book>> {
        let query = format!(
            "SELECT {} FROM books b JOIN holders h ON h.id = b.holder_id WHERE b.id = $1",
            BOOK_COLUMNS
        );
        let row = sqlx::query_as::<_, BookRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Book::from))
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: BookId) -> AppResult<Book> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    /// Whether a book with this exact title exists
    pub async fn exists_by_title(&self, title: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE title = $1)")
            .bind(title)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Insert a book assigned to `holder_id`
    pub async fn create(&self, data: &CreateBook, holder_id: HolderId) -> AppResult<Book> {
        let query = format!(
            r#"
            WITH b AS (
                INSERT INTO books (title, author, published_year, holder_id)
                VALUES ($1, $2, $3, $4)
                RETURNING *
            )
            SELECT {} FROM b JOIN holders h ON h.id = b.holder_id
            "#,
            BOOK_COLUMNS
        );
        let row = sqlx::query_as::<_, BookRow>(&query)
            .bind(&data.title)
            .bind(&data.author)
            .bind(data.published_year)
            .bind(holder_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    /// Update the provided fields of a book
    pub async fn update(&self, id: BookId, data: &UpdateBook) -> AppResult<Book> {
        let query = format!(
            r#"
            WITH b AS (
                UPDATE books SET
                    title = COALESCE($2, title),
                    author = COALESCE($3, author),
                    published_year = COALESCE($4, published_year),
                    holder_id = COALESCE($5, holder_id)
                WHERE id = $1
                RETURNING *
            )
            SELECT {} FROM b JOIN holders h ON h.id = b.holder_id
            "#,
            BOOK_COLUMNS
        );
        sqlx::query_as::<_, BookRow>(&query)
            .bind(id)
            .bind(&data.title)
            .bind(&data.author)
            .bind(data.published_year)
            .bind(data.holder_id)
            .fetch_optional(&self.pool)
            .await?
            .map(Book::from)
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    /// Reassign a book to another holder
    pub async fn set_holder(&self, id: BookId, holder_id: HolderId) -> AppResult<Book> {
        self.update(
            id,
            &UpdateBook {
                holder_id: Some(holder_id),
                ..Default::default()
            },
        )
        .await
    }

    /// Delete a book
    pub async fn delete(&self, id: BookId) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book {} not found", id)));
        }
        Ok(())
    }
}
