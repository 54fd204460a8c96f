//! Route handlers. Each parses input, makes one service call and renders
//! the result; business rules live in the core crate.

use super::error::ApiError;
use super::payload::{IsbnBody, ManualBookBody, SearchParams};
use super::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use bookshelf_core::{core_version, Book, BookUpdate, LibraryStats};
use serde_json::{json, Value};

type ApiResult<T> = Result<T, ApiError>;

pub(crate) async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "total_books": state.service.book_count().await,
        "version": core_version(),
    }))
}

pub(crate) async fn statistics(State(state): State<AppState>) -> Json<LibraryStats> {
    Json(state.service.statistics().await)
}

pub(crate) async fn list_books(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<Json<Vec<Book>>> {
    let Query(params) = params?;
    let books = match params.q.as_deref() {
        Some(query) => state.service.search(query).await,
        None => state.service.list_books().await,
    };
    Ok(Json(books))
}

pub(crate) async fn get_book(
    State(state): State<AppState>,
    isbn: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Book>> {
    let Path(isbn) = isbn?;
    Ok(Json(state.service.get_book(&isbn).await?))
}

pub(crate) async fn add_by_isbn(
    State(state): State<AppState>,
    body: Result<Json<IsbnBody>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Book>)> {
    let Json(body) = body?;
    if body.isbn.trim().is_empty() {
        return Err(ApiError::validation("book isbn must not be empty"));
    }
    let book = state.service.add_by_isbn(&body.isbn).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

pub(crate) async fn add_manual(
    State(state): State<AppState>,
    body: Result<Json<ManualBookBody>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Book>)> {
    let Json(body) = body?;
    let book = state
        .service
        .add_manual(body.title, body.author, body.isbn)
        .await?;
    Ok((StatusCode::CREATED, Json(book)))
}

pub(crate) async fn update_book(
    State(state): State<AppState>,
    isbn: Result<Path<String>, PathRejection>,
    body: Result<Json<ManualBookBody>, JsonRejection>,
) -> ApiResult<Json<Book>> {
    let Json(body) = body?;
    let Path(isbn) = isbn?;
    let update = BookUpdate {
        title: body.title,
        author: body.author,
        isbn: body.isbn,
    };
    Ok(Json(state.service.update_book(&isbn, update).await?))
}

pub(crate) async fn delete_book(
    State(state): State<AppState>,
    isbn: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Book>> {
    let Path(isbn) = isbn?;
    Ok(Json(state.service.remove_book(&isbn).await?))
}
