//! Router assembly and shared handler state.

use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::Router;
use bookshelf_core::LibraryService;
use std::sync::Arc;

mod error;
mod handlers;
mod payload;
mod request_log;

pub use payload::{IsbnBody, ManualBookBody, SearchParams};

/// State handed to every handler; cloning shares the one service.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<LibraryService>,
}

impl AppState {
    pub fn new(service: Arc<LibraryService>) -> Self {
        Self { service }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/stats", get(handlers::statistics))
        .route("/books", get(handlers::list_books).post(handlers::add_by_isbn))
        .route("/books/manual", post(handlers::add_manual))
        .route(
            "/books/:isbn",
            get(handlers::get_book)
                .put(handlers::update_book)
                .delete(handlers::delete_book),
        )
        .layer(from_fn(request_log::log_request))
        .with_state(state)
}
