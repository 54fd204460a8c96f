//! HTTP front end for the bookshelf library.
//!
//! # Responsibility
//! - Map HTTP verbs and paths onto `LibraryService` calls.
//! - Translate service errors into status codes and JSON error bodies.

pub mod config;
pub mod http;

pub use config::ServerConfig;
pub use http::{build_router, AppState};
