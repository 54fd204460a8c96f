//! Library use-case service.
//!
//! # Responsibility
//! - Own the process-wide `Library` and the configured `MetadataFetcher`.
//! - Give request handlers one call per use case.
//!
//! # Invariants
//! - add/update/remove run validate, mutate and persist under the write lock.
//! - Readers share the read lock and always see a fully applied mutation.
//! - Metadata lookups never run while the lock is held.

use crate::config::AppConfig;
use crate::metadata::{
    lookup_isbn, normalize_isbn, DisabledFetcher, LookupError, MetadataFetcher,
    OpenLibraryFetcher,
};
use crate::model::book::{Book, BookValidationError};
use crate::repo::library::{Library, LibraryError, LibraryStats};
use crate::storage::StorageError;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tokio::sync::RwLock;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Use-case level error; the only error type request handlers translate.
#[derive(Debug)]
pub enum ServiceError {
    Validation(BookValidationError),
    DuplicateIsbn(String),
    NotFound(String),
    Lookup(LookupError),
    Storage(StorageError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::DuplicateIsbn(isbn) => write!(f, "a book with isbn `{isbn}` already exists"),
            Self::NotFound(isbn) => write!(f, "no book with isbn `{isbn}`"),
            Self::Lookup(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Lookup(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::DuplicateIsbn(_) | Self::NotFound(_) => None,
        }
    }
}

impl From<LibraryError> for ServiceError {
    fn from(value: LibraryError) -> Self {
        match value {
            LibraryError::Validation(err) => Self::Validation(err),
            LibraryError::DuplicateIsbn(isbn) => Self::DuplicateIsbn(isbn),
            LibraryError::NotFound(isbn) => Self::NotFound(isbn),
            LibraryError::Storage(err) => Self::Storage(err),
        }
    }
}

impl From<LookupError> for ServiceError {
    fn from(value: LookupError) -> Self {
        Self::Lookup(value)
    }
}

impl From<BookValidationError> for ServiceError {
    fn from(value: BookValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Replacement fields for `LibraryService::update_book`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookUpdate {
    pub title: String,
    pub author: String,
    pub isbn: String,
}

/// Concurrency-safe facade over one `Library`.
pub struct LibraryService {
    library: RwLock<Library>,
    fetcher: Arc<dyn MetadataFetcher>,
}

impl LibraryService {
    pub fn new(library: Library, fetcher: Arc<dyn MetadataFetcher>) -> Self {
        Self {
            library: RwLock::new(library),
            fetcher,
        }
    }

    /// Loads the configured data file and builds the configured fetcher.
    ///
    /// # Errors
    /// - `Storage` when the data file is unreadable or corrupt.
    /// - `Lookup` when the HTTP client cannot be constructed.
    pub fn open(config: &AppConfig) -> ServiceResult<Self> {
        let library = Library::open(config.data_file.clone())?;
        let fetcher: Arc<dyn MetadataFetcher> = if config.lookup.enabled {
            Arc::new(OpenLibraryFetcher::new(&config.lookup)?)
        } else {
            Arc::new(DisabledFetcher)
        };
        info!(
            "event=service_open module=service status=ok lookup_enabled={}",
            config.lookup.enabled
        );
        Ok(Self::new(library, fetcher))
    }

    pub async fn list_books(&self) -> Vec<Book> {
        self.library.read().await.list_all()
    }

    pub async fn book_count(&self) -> usize {
        self.library.read().await.len()
    }

    pub async fn find_book(&self, isbn: &str) -> Option<Book> {
        self.library.read().await.find(isbn).cloned()
    }

    /// Like `find_book`, but absence is `ServiceError::NotFound`.
    pub async fn get_book(&self, isbn: &str) -> ServiceResult<Book> {
        self.find_book(isbn)
            .await
            .ok_or_else(|| ServiceError::NotFound(isbn.trim().to_string()))
    }

    pub async fn search(&self, query: &str) -> Vec<Book> {
        self.library.read().await.search(query)
    }

    pub async fn statistics(&self) -> LibraryStats {
        self.library.read().await.statistics()
    }

    /// Adds a book from user-supplied fields.
    pub async fn add_manual(
        &self,
        title: impl Into<String>,
        author: impl Into<String>,
        isbn: impl Into<String>,
    ) -> ServiceResult<Book> {
        let book = Book::new(title, author, isbn)?;
        Ok(self.library.write().await.add(book)?)
    }

    /// Looks up `isbn` in the external catalog and adds the result.
    ///
    /// The lookup runs without holding the library lock; the duplicate check
    /// is repeated under the write lock before the add.
    pub async fn add_by_isbn(&self, isbn: &str) -> ServiceResult<Book> {
        let isbn = lookup_isbn(isbn)?;
        if self.contains_normalized(&isbn).await {
            return Err(ServiceError::DuplicateIsbn(isbn));
        }

        let book = self.fetcher.fetch(&isbn).await?;

        let mut library = self.library.write().await;
        if holds_normalized(&library, book.isbn()) {
            return Err(ServiceError::DuplicateIsbn(book.isbn().to_string()));
        }
        Ok(library.add(book)?)
    }

    /// Replaces the book stored under `isbn`; the update's ISBN may differ.
    pub async fn update_book(&self, isbn: &str, update: BookUpdate) -> ServiceResult<Book> {
        let replacement = Book::new(update.title, update.author, update.isbn)?;
        Ok(self.library.write().await.update(isbn, replacement)?)
    }

    pub async fn remove_book(&self, isbn: &str) -> ServiceResult<Book> {
        Ok(self.library.write().await.remove(isbn)?)
    }

    /// Writes the current collection to disk; used on shutdown.
    pub async fn flush(&self) -> ServiceResult<()> {
        let library = self.library.write().await;
        library.save()?;
        info!(
            "event=service_flush module=service status=ok books={}",
            library.len()
        );
        Ok(())
    }

    async fn contains_normalized(&self, isbn: &str) -> bool {
        let library = self.library.read().await;
        holds_normalized(&library, isbn)
    }
}

/// True when any stored ISBN equals `isbn` once separators are stripped.
fn holds_normalized(library: &Library, isbn: &str) -> bool {
    let wanted = normalize_isbn(isbn);
    library
        .books()
        .iter()
        .any(|book| normalize_isbn(book.isbn()) == wanted)
}
