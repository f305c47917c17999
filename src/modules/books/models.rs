use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow, Row};

/// A catalogued book, keyed by ISBN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Primary key; fixed once the book exists
    pub isbn: String,
    #[serde(flatten)]
    pub details: BookDetails,
}

/// Every mutable column of a book.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDetails {
    /// Absolute URL of the Amazon listing
    pub amazon_url: String,
    pub author: String,
    pub language: String,
    pub pages: i64,
    pub publisher: String,
    pub title: String,
    /// Four digit publication year
    pub year: i64,
}

impl Book {
    pub fn new(isbn: impl Into<String>, details: BookDetails) -> Self {
        Self {
            isbn: isbn.into(),
            details,
        }
    }
}

impl<'r> FromRow<'r, SqliteRow> for Book {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            isbn: row.try_get("isbn")?,
            details: BookDetails {
                amazon_url: row.try_get("amazon_url")?,
                author: row.try_get("author")?,
                language: row.try_get("language")?,
                pages: row.try_get("pages")?,
                publisher: row.try_get("publisher")?,
                title: row.try_get("title")?,
                year: row.try_get("year")?,
            },
        })
    }
}

/// `{"book": {...}}` response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct BookResponse {
    pub book: Book,
}

/// `{"books": [...]}` response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct BookListResponse {
    pub books: Vec<Book>,
}

/// `{"message": "..."}` response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
