//! Persistence for books: one SQL statement per operation against `books`.

use sqlx::SqlitePool;

use super::models::{Book, BookDetails};

/// DDL for the `books` table.
pub const BOOKS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS books (
        isbn       TEXT PRIMARY KEY NOT NULL,
        amazon_url TEXT NOT NULL,
        author     TEXT NOT NULL,
        language   TEXT NOT NULL,
        pages      INTEGER NOT NULL CHECK (pages > 0),
        publisher  TEXT NOT NULL,
        title      TEXT NOT NULL,
        year       INTEGER NOT NULL
    );
"#;

const BOOK_COLUMNS: &str = "isbn, amazon_url, author, language, pages, publisher, title, year";

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("No book with isbn '{0}'")]
    NotFound(String),

    #[error("A book with isbn '{0}' already exists")]
    Conflict(String),

    #[error("database failure: {0}")]
    Database(#[from] sqlx::Error),
}

/// CRUD over the `books` table, keyed by ISBN.
#[derive(Debug, Clone)]
pub struct BookStore {
    pool: SqlitePool,
}

impl BookStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new row; an existing ISBN yields [`StoreError::Conflict`].
    pub async fn create_book(&self, book: &Book) -> Result<Book, StoreError> {
        let query = format!(
            "INSERT INTO books ({BOOK_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING {BOOK_COLUMNS}"
        );
        let details = &book.details;

        let created = sqlx::query_as::<_, Book>(&query)
            .bind(&book.isbn)
            .bind(&details.amazon_url)
            .bind(&details.author)
            .bind(&details.language)
            .bind(details.pages)
            .bind(&details.publisher)
            .bind(&details.title)
            .bind(details.year)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| match err.as_database_error() {
                Some(db_err) if db_err.is_unique_violation() => {
                    StoreError::Conflict(book.isbn.clone())
                }
                _ => StoreError::Database(err),
            })?;

        tracing::debug!(isbn = %created.isbn, "book created");
        Ok(created)
    }

    pub async fn get_book(&self, isbn: &str) -> Result<Book, StoreError> {
        let query = format!("SELECT {BOOK_COLUMNS} FROM books WHERE isbn = ?");

        sqlx::query_as::<_, Book>(&query)
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(isbn.to_string()))
    }

    /// All books by title, ignoring ASCII case; equal titles keep insertion order.
    pub async fn list_books(&self) -> Result<Vec<Book>, StoreError> {
        let query = format!(
            "SELECT {BOOK_COLUMNS} FROM books ORDER BY title COLLATE NOCASE ASC, rowid ASC"
        );

        let books = sqlx::query_as::<_, Book>(&query)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(count = books.len(), "books listed");
        Ok(books)
    }

    /// Replace every non-key column of an existing book.
    pub async fn update_book(&self, isbn: &str, details: &BookDetails) -> Result<Book, StoreError> {
        let query = format!(
            "UPDATE books SET amazon_url = ?, author = ?, language = ?, pages = ?, \
             publisher = ?, title = ?, year = ? WHERE isbn = ? RETURNING {BOOK_COLUMNS}"
        );

        let updated = sqlx::query_as::<_, Book>(&query)
            .bind(&details.amazon_url)
            .bind(&details.author)
            .bind(&details.language)
            .bind(details.pages)
            .bind(&details.publisher)
            .bind(&details.title)
            .bind(details.year)
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(isbn.to_string()))?;

        tracing::debug!(isbn = %updated.isbn, "book updated");
        Ok(updated)
    }

    pub async fn delete_book(&self, isbn: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM books WHERE isbn = ?")
            .bind(isbn)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(isbn.to_string()));
        }

        tracing::debug!(isbn = %isbn, "book deleted");
        Ok(())
    }
}
