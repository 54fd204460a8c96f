//! JSON file persistence for the book collection.
//!
//! # Responsibility
//! - Load the ordered book list from a single JSON array file.
//! - Rewrite the whole file on every save.
//!
//! # Invariants
//! - A missing file is an empty collection, never an error.
//! - An unparsable file is `StorageError::Corrupt`; no partial recovery.
//! - Saves are atomic: readers see either the old or the new file.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod json_file;

pub use json_file::{load_books, save_books};

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug)]
pub enum StorageError {
    /// File could not be read or written.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// File exists but does not hold a valid book array.
    Corrupt { path: PathBuf, reason: String },
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Corrupt { .. })
    }
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "storage i/o failed for `{}`: {source}", path.display())
            }
            Self::Corrupt { path, reason } => {
                write!(f, "corrupt library file `{}`: {reason}", path.display())
            }
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Corrupt { .. } => None,
        }
    }
}
