//! Library aggregate.
//!
//! # Responsibility
//! - Provide add/remove/find/search/update/list/statistics over books.
//! - Hydrate from and persist to the backing JSON file.
//!
//! # Invariants
//! - Insertion order is preserved and equals the file's array order.
//! - ISBNs are opaque; lookups compare the trimmed text exactly.

use crate::model::book::{Book, BookValidationError};
use crate::storage::{load_books, save_books, StorageError};
use log::{info, warn};
use serde::Serialize;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub type LibraryResult<T> = Result<T, LibraryError>;

/// Error for library operations.
#[derive(Debug)]
pub enum LibraryError {
    Validation(BookValidationError),
    DuplicateIsbn(String),
    NotFound(String),
    Storage(StorageError),
}

impl LibraryError {
    /// True when the backing file could not be parsed at load time.
    pub fn is_corrupt_storage(&self) -> bool {
        matches!(self, Self::Storage(err) if err.is_corrupt())
    }
}

impl Display for LibraryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::DuplicateIsbn(isbn) => write!(f, "a book with isbn `{isbn}` already exists"),
            Self::NotFound(isbn) => write!(f, "no book with isbn `{isbn}`"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LibraryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::DuplicateIsbn(_) | Self::NotFound(_) => None,
        }
    }
}

impl From<BookValidationError> for LibraryError {
    fn from(value: BookValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StorageError> for LibraryError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Book count for one author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorCount {
    pub author: String,
    pub books: usize,
}

/// Derived collection counts, computed on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LibraryStats {
    pub total_books: usize,
    pub unique_authors: usize,
    /// Sorted by `books` descending; ties keep first-appearance order.
    pub authors: Vec<AuthorCount>,
}

/// Ordered book collection backed by a JSON file.
#[derive(Debug)]
pub struct Library {
    path: PathBuf,
    books: Vec<Book>,
}

impl Library {
    /// Opens the library stored at `path`.
    ///
    /// A missing file starts an empty library; nothing is written until the
    /// first mutation.
    ///
    /// # Errors
    /// - `Storage` with a corrupt cause when the file cannot be parsed.
    pub fn open(path: impl Into<PathBuf>) -> LibraryResult<Self> {
        let path = path.into();
        let books = load_books(&path)?;
        info!(
            "event=library_open module=library status=ok books={}",
            books.len()
        );
        Ok(Self { path, books })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Borrowed view of the ordered collection.
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    /// Appends `book` and persists.
    ///
    /// # Errors
    /// - `DuplicateIsbn` when the ISBN is already present.
    /// - `Storage` when the save fails; the book is not kept.
    pub fn add(&mut self, book: Book) -> LibraryResult<Book> {
        if self.position(book.isbn()).is_some() {
            warn!("event=book_add module=library status=error error_code=duplicate_isbn isbn={}", book.isbn());
            return Err(LibraryError::DuplicateIsbn(book.isbn().to_string()));
        }

        self.books.push(book);
        if let Err(err) = self.save() {
            self.books.pop();
            return Err(err);
        }

        let added = self.books[self.books.len() - 1].clone();
        info!("event=book_add module=library status=ok isbn={}", added.isbn());
        Ok(added)
    }

    /// Removes the book with `isbn` and persists.
    ///
    /// # Errors
    /// - `NotFound` when no book has that ISBN.
    /// - `Storage` when the save fails; the book is restored in place.
    pub fn remove(&mut self, isbn: &str) -> LibraryResult<Book> {
        let index = self.require(isbn)?;
        let removed = self.books.remove(index);
        if let Err(err) = self.save() {
            self.books.insert(index, removed);
            return Err(err);
        }

        info!("event=book_remove module=library status=ok isbn={}", removed.isbn());
        Ok(removed)
    }

    /// Returns the book with `isbn`, if any.
    pub fn find(&self, isbn: &str) -> Option<&Book> {
        self.position(isbn).map(|index| &self.books[index])
    }

    /// Case-insensitive substring match on title, author or ISBN.
    ///
    /// Matches keep collection order. A blank query matches every book.
    pub fn search(&self, query: &str) -> Vec<Book> {
        if query.trim().is_empty() {
            return self.list_all();
        }
        let needle = query.to_lowercase();
        self.books
            .iter()
            .filter(|book| {
                book.title().to_lowercase().contains(&needle)
                    || book.author().to_lowercase().contains(&needle)
                    || book.isbn().to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    /// Replaces the book currently stored under `isbn` with `replacement`.
    ///
    /// The replacement keeps the original position. Its ISBN becomes the new
    /// identity, so an update may re-key the record.
    ///
    /// # Errors
    /// - `NotFound` when `isbn` is absent.
    /// - `DuplicateIsbn` when the new ISBN belongs to a different book.
    /// - `Storage` when the save fails; the previous book is restored.
    pub fn update(&mut self, isbn: &str, replacement: Book) -> LibraryResult<Book> {
        let index = self.require(isbn)?;
        if let Some(other) = self.position(replacement.isbn()) {
            if other != index {
                warn!(
                    "event=book_update module=library status=error error_code=duplicate_isbn isbn={} new_isbn={}",
                    isbn.trim(),
                    replacement.isbn()
                );
                return Err(LibraryError::DuplicateIsbn(replacement.isbn().to_string()));
            }
        }

        let previous = std::mem::replace(&mut self.books[index], replacement);
        if let Err(err) = self.save() {
            self.books[index] = previous;
            return Err(err);
        }

        let updated = self.books[index].clone();
        info!(
            "event=book_update module=library status=ok isbn={} new_isbn={}",
            previous.isbn(),
            updated.isbn()
        );
        Ok(updated)
    }

    /// Returns a copy of the full ordered collection.
    pub fn list_all(&self) -> Vec<Book> {
        self.books.clone()
    }

    pub fn statistics(&self) -> LibraryStats {
        let mut order: Vec<&str> = Vec::new();
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for book in &self.books {
            let count = counts.entry(book.author()).or_insert_with(|| {
                order.push(book.author());
                0
            });
            *count += 1;
        }

        let mut authors: Vec<AuthorCount> = order
            .into_iter()
            .map(|author| AuthorCount {
                author: author.to_string(),
                books: counts[author],
            })
            .collect();
        authors.sort_by(|a, b| b.books.cmp(&a.books));

        LibraryStats {
            total_books: self.books.len(),
            unique_authors: authors.len(),
            authors,
        }
    }

    /// Rewrites the backing file with the current collection.
    pub fn save(&self) -> LibraryResult<()> {
        save_books(&self.path, &self.books)?;
        Ok(())
    }

    /// Replaces memory with the file's current content.
    ///
    /// On error the in-memory collection is left untouched.
    pub fn reload(&mut self) -> LibraryResult<()> {
        self.books = load_books(&self.path)?;
        Ok(())
    }

    fn position(&self, isbn: &str) -> Option<usize> {
        let isbn = isbn.trim();
        self.books.iter().position(|book| book.isbn() == isbn)
    }

    fn require(&self, isbn: &str) -> LibraryResult<usize> {
        self.position(isbn).ok_or_else(|| {
            warn!("event=book_lookup module=library status=error error_code=not_found isbn={}", isbn.trim());
            LibraryError::NotFound(isbn.trim().to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{AuthorCount, Library};
    use crate::model::book::Book;

    fn book(title: &str, author: &str, isbn: &str) -> Book {
        Book::new(title, author, isbn).expect("valid book")
    }

    #[test]
    fn statistics_orders_authors_by_count_then_first_appearance() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut library = Library::open(dir.path().join("library.json")).expect("open");
        library.add(book("Emma", "Jane Austen", "1")).expect("add");
        library.add(book("Dune", "Frank Herbert", "2")).expect("add");
        library.add(book("Children of Dune", "Frank Herbert", "3")).expect("add");
        library.add(book("Ulysses", "James Joyce", "4")).expect("add");

        let stats = library.statistics();
        assert_eq!(stats.total_books, 4);
        assert_eq!(stats.unique_authors, 3);
        assert_eq!(
            stats.authors,
            vec![
                AuthorCount { author: "Frank Herbert".to_string(), books: 2 },
                AuthorCount { author: "Jane Austen".to_string(), books: 1 },
                AuthorCount { author: "James Joyce".to_string(), books: 1 },
            ]
        );
    }

    #[test]
    fn find_ignores_surrounding_whitespace() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut library = Library::open(dir.path().join("library.json")).expect("open");
        library.add(book("Dune", "Frank Herbert", "978-0-441-17271-9")).expect("add");

        assert!(library.find(" 978-0-441-17271-9 ").is_some());
        assert!(library.find("9780441172719").is_none());
    }
}
