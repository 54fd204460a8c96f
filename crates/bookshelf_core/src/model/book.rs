//! Book domain model.
//!
//! # Responsibility
//! - Validate book fields at construction time.
//! - Convert between `Book` and its plain key/value record.
//!
//! # Invariants
//! - Fields are trimmed and never blank.
//! - `from_record(to_record(b)) == b` for every valid book.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Plain key/value representation of a book (`title`, `author`, `isbn`).
pub type Record = Map<String, Value>;

/// Names the validated book fields in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookField {
    Title,
    Author,
    Isbn,
}

impl BookField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Author => "author",
            Self::Isbn => "isbn",
        }
    }
}

impl Display for BookField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation error for book construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookValidationError {
    EmptyField(BookField),
}

impl Display for BookValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "book {field} must not be empty"),
        }
    }
}

impl Error for BookValidationError {}

/// Error for records that cannot be turned back into a `Book`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    NotAnObject,
    MissingField(BookField),
    NonTextField(BookField),
    Invalid(BookValidationError),
}

impl Display for RecordError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnObject => write!(f, "book record must be a JSON object"),
            Self::MissingField(field) => write!(f, "book record is missing `{field}`"),
            Self::NonTextField(field) => write!(f, "book record field `{field}` must be a string"),
            Self::Invalid(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RecordError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BookValidationError> for RecordError {
    fn from(value: BookValidationError) -> Self {
        Self::Invalid(value)
    }
}

/// Wire shape used by serde; validated through `Book::new` on the way in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub title: String,
    pub author: String,
    pub isbn: String,
}

/// One book in the collection, identified by its ISBN.
///
/// The ISBN is an opaque identifier: only blankness is checked, never
/// ISBN-10/13 structure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "BookRecord", into = "BookRecord")]
pub struct Book {
    title: String,
    author: String,
    isbn: String,
}

impl Book {
    /// Creates a validated book from explicit fields.
    ///
    /// # Errors
    /// - Returns `BookValidationError::EmptyField` when any field is blank
    ///   after trimming.
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        isbn: impl Into<String>,
    ) -> Result<Self, BookValidationError> {
        let title = required(title.into(), BookField::Title)?;
        let author = required(author.into(), BookField::Author)?;
        let isbn = required(isbn.into(), BookField::Isbn)?;
        Ok(Self {
            title,
            author,
            isbn,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn isbn(&self) -> &str {
        &self.isbn
    }

    /// Returns the plain record with keys `title`, `author`, `isbn`.
    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.insert("title".to_string(), Value::String(self.title.clone()));
        record.insert("author".to_string(), Value::String(self.author.clone()));
        record.insert("isbn".to_string(), Value::String(self.isbn.clone()));
        record
    }

    /// Rebuilds a book from a plain record.
    ///
    /// # Errors
    /// - `MissingField` / `NonTextField` for absent or non-string values.
    /// - `Invalid` when a field is present but blank.
    pub fn from_record(record: &Record) -> Result<Self, RecordError> {
        let title = text_field(record, BookField::Title)?;
        let author = text_field(record, BookField::Author)?;
        let isbn = text_field(record, BookField::Isbn)?;
        Ok(Self::new(title, author, isbn)?)
    }

    /// Same as `from_record`, but accepts any JSON value.
    pub fn from_value(value: &Value) -> Result<Self, RecordError> {
        match value {
            Value::Object(record) => Self::from_record(record),
            _ => Err(RecordError::NotAnObject),
        }
    }
}

impl Display for Book {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} by {} (ISBN: {})", self.title, self.author, self.isbn)
    }
}

impl TryFrom<BookRecord> for Book {
    type Error = BookValidationError;

    fn try_from(value: BookRecord) -> Result<Self, Self::Error> {
        Self::new(value.title, value.author, value.isbn)
    }
}

impl From<Book> for BookRecord {
    fn from(value: Book) -> Self {
        Self {
            title: value.title,
            author: value.author,
            isbn: value.isbn,
        }
    }
}

fn text_field(record: &Record, field: BookField) -> Result<&str, RecordError> {
    match record.get(field.as_str()) {
        None => Err(RecordError::MissingField(field)),
        Some(Value::String(text)) => Ok(text.as_str()),
        Some(_) => Err(RecordError::NonTextField(field)),
    }
}

fn required(value: String, field: BookField) -> Result<String, BookValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BookValidationError::EmptyField(field));
    }
    if trimmed.len() == value.len() {
        return Ok(value);
    }
    Ok(trimmed.to_string())
}
