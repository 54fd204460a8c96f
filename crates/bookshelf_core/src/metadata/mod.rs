//! External ISBN metadata lookup boundary.
//!
//! # Responsibility
//! - Define the `MetadataFetcher` contract consumed by the service layer.
//! - Normalize ISBN input before it reaches any external catalog.
//!
//! # Invariants
//! - A fetch either yields a validated `Book` or a `LookupError`.
//! - Fetchers never touch the library or its file.

use crate::model::book::Book;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod open_library;

pub use open_library::OpenLibraryFetcher;

static LOOKUP_ISBN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[0-9]{9}[0-9X]|[0-9]{13})$").expect("valid isbn regex"));

pub type LookupResult<T> = Result<T, LookupError>;

/// Failure of an external metadata lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// Input is not a 10 or 13 character ISBN after normalization.
    InvalidIsbn(String),
    /// The catalog has no record for this ISBN.
    NotFound(String),
    /// Non-success HTTP status that is not worth retrying.
    Status(u16),
    /// Network failure or timeout after all attempts.
    Transport(String),
    /// The catalog answered but the document lacks usable fields.
    Malformed(String),
    /// Lookups are switched off by configuration.
    Disabled,
}

impl Display for LookupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidIsbn(isbn) => write!(f, "`{isbn}` is not a valid ISBN-10 or ISBN-13"),
            Self::NotFound(isbn) => write!(f, "no catalog record for isbn `{isbn}`"),
            Self::Status(code) => write!(f, "catalog responded with status {code}"),
            Self::Transport(message) => write!(f, "catalog request failed: {message}"),
            Self::Malformed(message) => write!(f, "catalog response unusable: {message}"),
            Self::Disabled => write!(f, "metadata lookup is disabled"),
        }
    }
}

impl Error for LookupError {}

/// Resolves an ISBN into book metadata from an external catalog.
#[async_trait]
pub trait MetadataFetcher: Send + Sync {
    async fn fetch(&self, isbn: &str) -> LookupResult<Book>;
}

/// Fetcher used when lookups are turned off; every call fails fast.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledFetcher;

#[async_trait]
impl MetadataFetcher for DisabledFetcher {
    async fn fetch(&self, _isbn: &str) -> LookupResult<Book> {
        Err(LookupError::Disabled)
    }
}

/// Strips hyphens and whitespace, upper-casing a trailing `x` check digit.
pub fn normalize_isbn(raw: &str) -> String {
    raw.chars()
        .filter(|ch| *ch != '-' && !ch.is_whitespace())
        .map(|ch| ch.to_ascii_uppercase())
        .collect()
}

/// Normalizes `raw` and checks it is shaped like an ISBN-10 or ISBN-13.
///
/// Check digits are not verified.
pub fn lookup_isbn(raw: &str) -> LookupResult<String> {
    let isbn = normalize_isbn(raw);
    if LOOKUP_ISBN_RE.is_match(&isbn) {
        Ok(isbn)
    } else {
        Err(LookupError::InvalidIsbn(raw.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{lookup_isbn, normalize_isbn, LookupError};

    #[test]
    fn normalize_strips_separators() {
        assert_eq!(normalize_isbn(" 978-0-452 28423-4 "), "9780452284234");
        assert_eq!(normalize_isbn("0-8044-2957-x"), "080442957X");
    }

    #[test]
    fn lookup_isbn_accepts_isbn10_and_isbn13_shapes() {
        assert_eq!(lookup_isbn("0-441-17271-7").expect("isbn-10"), "0441172717");
        assert_eq!(lookup_isbn("978-0-441-17271-9").expect("isbn-13"), "9780441172719");
    }

    #[test]
    fn lookup_isbn_rejects_paths_and_wrong_lengths() {
        assert!(matches!(lookup_isbn("12345"), Err(LookupError::InvalidIsbn(_))));
        assert!(matches!(lookup_isbn("../authors/OL1A"), Err(LookupError::InvalidIsbn(_))));
        assert!(matches!(lookup_isbn("97804411727X9"), Err(LookupError::InvalidIsbn(_))));
    }
}
