//! HTTP handlers for `/books`.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::Value;
use shelf_http::AppError;

use super::models::{BookListResponse, BookResponse, MessageResponse};
use super::store::{BookStore, StoreError};
use super::validation::{self, ViolationList};
use crate::utils;

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        let message = err.to_string();
        match err {
            StoreError::NotFound(_) => AppError::not_found(message),
            StoreError::Conflict(_) => AppError::conflict(message),
            StoreError::Database(db_err) => {
                AppError::Internal(anyhow::Error::new(db_err).context("book store query failed"))
            }
        }
    }
}

impl From<ViolationList> for AppError {
    fn from(violations: ViolationList) -> Self {
        AppError::validation(violations.into_messages())
    }
}

/// Builds the books router over `store`.
pub fn router(store: BookStore) -> Router {
    let prefix = utils::log_prefix("books");
    tracing::debug!(target: "shelf.routes", %prefix, "registering books routes");

    Router::new()
        .route("/", get(list_books).post(create_book))
        .route(
            "/{isbn}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .with_state(store)
}

async fn list_books(State(store): State<BookStore>) -> Result<Json<BookListResponse>, AppError> {
    let books = store.list_books().await?;
    Ok(Json(BookListResponse { books }))
}

async fn get_book(
    State(store): State<BookStore>,
    Path(isbn): Path<String>,
) -> Result<Json<BookResponse>, AppError> {
    let book = store.get_book(&isbn).await?;
    Ok(Json(BookResponse { book }))
}

async fn create_book(
    State(store): State<BookStore>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<BookResponse>), AppError> {
    let Json(payload) = payload?;
    let book = validation::validate_create(&payload)?;

    let book = store.create_book(&book).await?;
    tracing::info!(isbn = %book.isbn, "book created");

    Ok((StatusCode::CREATED, Json(BookResponse { book })))
}

async fn update_book(
    State(store): State<BookStore>,
    Path(isbn): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<BookResponse>, AppError> {
    let Json(payload) = payload?;
    let details = validation::validate_update(&payload)?;

    let book = store.update_book(&isbn, &details).await?;
    tracing::info!(isbn = %book.isbn, "book updated");

    Ok(Json(BookResponse { book }))
}

async fn delete_book(
    State(store): State<BookStore>,
    Path(isbn): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    store.delete_book(&isbn).await?;
    tracing::info!(isbn = %isbn, "book deleted");

    Ok(Json(MessageResponse {
        message: "Book deleted".to_string(),
    }))
}
