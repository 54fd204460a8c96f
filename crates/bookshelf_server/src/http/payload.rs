//! Request body and query schemas.
//!
//! Missing or non-string fields are rejected at extraction; blank checks
//! happen in `Book::new` before anything reaches the library.

use serde::Deserialize;

/// `POST /books`
#[derive(Debug, Clone, Deserialize)]
pub struct IsbnBody {
    pub isbn: String,
}

/// `POST /books/manual` and `PUT /books/{isbn}`
#[derive(Debug, Clone, Deserialize)]
pub struct ManualBookBody {
    pub title: String,
    pub author: String,
    pub isbn: String,
}

/// `GET /books?q=...`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}
