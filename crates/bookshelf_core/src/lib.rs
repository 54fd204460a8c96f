//! Core domain logic for the bookshelf service.
//! This crate is the single source of truth for collection invariants.

pub mod config;
pub mod logging;
pub mod metadata;
pub mod model;
pub mod repo;
pub mod service;
pub mod storage;

pub use config::{AppConfig, ConfigError, LookupConfig, RetryPolicy};
pub use logging::{default_log_level, init_logging, logging_status};
pub use metadata::{
    lookup_isbn, normalize_isbn, DisabledFetcher, LookupError, LookupResult, MetadataFetcher,
    OpenLibraryFetcher,
};
pub use model::book::{Book, BookField, BookRecord, BookValidationError, Record, RecordError};
pub use repo::library::{AuthorCount, Library, LibraryError, LibraryResult, LibraryStats};
pub use service::library_service::{BookUpdate, LibraryService, ServiceError, ServiceResult};
pub use storage::{StorageError, StorageResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
