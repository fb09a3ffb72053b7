//! Book endpoints, including checkout and return

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::book::{Book, BookId, CheckoutRequest, CreateBook, UpdateBook},
    AppState,
};

/// List all books
#[utoipa::path(
    get,
    path = "/books/",
    tag = "books",
    responses(
        (status = 200, description = "All books with their holder", body = Vec<Book>)
    )
)]
pub async fn list_books(State(state): State<AppState>) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.books.list().await?;
    Ok(Json(books))
}

/// Get book by ID
#[utoipa::path(
    get,
    path = "/books/{id}/",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<BookId>,
) -> AppResult<Json<Book>> {
    let book = state.services.books.get_by_id(id).await?;
    Ok(Json(book))
}

/// Create a book
#[utoipa::path(
    post,
    path = "/books/",
    tag = "books",
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid data or no Library holder", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    Json(data): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let book = state.services.books.create(data).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Replace a book
#[utoipa::path(
    put,
    path = "/books/{id}/",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    request_body = CreateBook,
    responses(
        (status = 200, description = "Book replaced", body = Book),
        (status = 404, description = "Book or holder not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn replace_book(
    State(state): State<AppState>,
    Path(id): Path<BookId>,
    Json(data): Json<CreateBook>,
) -> AppResult<Json<Book>> {
    let book = state.services.books.replace(id, data).await?;
    Ok(Json(book))
}

/// Update some fields of a book
#[utoipa::path(
    patch,
    path = "/books/{id}/",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 404, description = "Book or holder not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<BookId>,
    Json(data): Json<UpdateBook>,
) -> AppResult<Json<Book>> {
    let book = state.services.books.update(id, data).await?;
    Ok(Json(book))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}/",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<BookId>,
) -> AppResult<StatusCode> {
    state.services.books.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Check a book out to a holder
#[utoipa::path(
    post,
    path = "/books/{id}/checkout/",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Book checked out", body = Book),
        (status = 400, description = "Missing holder_id", body = crate::error::ErrorResponse),
        (status = 404, description = "Book or holder not found", body = crate::error::ErrorResponse),
        (status = 504, description = "Circulation worker did not answer in time", body = crate::error::ErrorResponse)
    )
)]
pub async fn checkout_book(
    State(state): State<AppState>,
    Path(id): Path<BookId>,
    Json(request): Json<CheckoutRequest>,
) -> AppResult<Json<Book>> {
    let book = state.services.books.checkout(id, request).await?;
    Ok(Json(book))
}

/// Return a book to the Library holder
#[utoipa::path(
    post,
    path = "/books/{id}/return/",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book returned", body = Book),
        (status = 400, description = "Library holder not found", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse),
        (status = 504, description = "Circulation worker did not answer in time", body = crate::error::ErrorResponse)
    )
)]
pub async fn return_book(
    State(state): State<AppState>,
    Path(id): Path<BookId>,
) -> AppResult<Json<Book>> {
    let book = state.services.books.return_book(id).await?;
    Ok(Json(book))
}
