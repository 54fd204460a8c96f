use super::{StorageError, StorageResult};
use crate::model::book::Book;
use log::{error, info};
use serde_json::Value;
use std::collections::HashSet;
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::time::Instant;
use tempfile::NamedTempFile;

/// Reads the full book list from `path`.
///
/// A missing or whitespace-only file yields an empty list.
///
/// # Errors
/// - `Io` when the file exists but cannot be read.
/// - `Corrupt` for bytes that are not valid UTF-8 JSON, a non-array root,
///   a malformed record or a repeated ISBN.
pub fn load_books(path: &Path) -> StorageResult<Vec<Book>> {
    let started_at = Instant::now();
    let raw = match std::fs::read(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            info!("event=storage_load module=storage status=ok books=0 file_present=false");
            return Ok(Vec::new());
        }
        Err(err) if err.kind() == ErrorKind::InvalidData => {
            error!("event=storage_load module=storage status=error error_code=corrupt_file reason={err}");
            return Err(StorageError::corrupt(path, err.to_string()));
        }
        Err(err) => {
            error!("event=storage_load module=storage status=error error_code=read_failed error={err}");
            return Err(StorageError::io(path, err));
        }
    };

    let books = match parse_books(&raw) {
        Ok(books) => books,
        Err(reason) => {
            error!(
                "event=storage_load module=storage status=error error_code=corrupt_file reason={reason}"
            );
            return Err(StorageError::corrupt(path, reason));
        }
    };

    info!(
        "event=storage_load module=storage status=ok books={} file_present=true duration_ms={}",
        books.len(),
        started_at.elapsed().as_millis()
    );
    Ok(books)
}

/// Atomically replaces the file at `path` with `books`.
///
/// Writes into a temporary sibling file, syncs it and renames it over the
/// target. The parent directory is created when missing.
pub fn save_books(path: &Path, books: &[Book]) -> StorageResult<()> {
    let started_at = Instant::now();
    let result = write_atomically(path, books);
    match &result {
        Ok(()) => info!(
            "event=storage_save module=storage status=ok books={} duration_ms={}",
            books.len(),
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=storage_save module=storage status=error error_code=write_failed duration_ms={} error={err}",
            started_at.elapsed().as_millis()
        ),
    }
    result
}

fn parse_books(raw: &[u8]) -> Result<Vec<Book>, String> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let root: Value = serde_json::from_slice(raw).map_err(|err| format!("invalid json: {err}"))?;
    let Value::Array(items) = root else {
        return Err("root value must be an array of books".to_string());
    };

    let mut seen = HashSet::with_capacity(items.len());
    let mut books = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let book = Book::from_value(item).map_err(|err| format!("record {index}: {err}"))?;
        if !seen.insert(book.isbn().to_string()) {
            return Err(format!("record {index}: duplicate isbn `{}`", book.isbn()));
        }
        books.push(book);
    }
    Ok(books)
}

fn write_atomically(path: &Path, books: &[Book]) -> StorageResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|err| StorageError::io(dir, err))?;

    let records: Vec<Value> = books
        .iter()
        .map(|book| Value::Object(book.to_record()))
        .collect();
    let mut payload = serde_json::to_vec_pretty(&records)
        .map_err(|err| StorageError::io(path, std::io::Error::new(ErrorKind::InvalidData, err)))?;
    payload.push(b'\n');

    let mut staged = NamedTempFile::new_in(dir).map_err(|err| StorageError::io(dir, err))?;
    staged
        .write_all(&payload)
        .and_then(|()| staged.as_file().sync_all())
        .map_err(|err| StorageError::io(staged.path(), err))?;
    staged
        .persist(path)
        .map_err(|err| StorageError::io(path, err.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::parse_books;

    #[test]
    fn whitespace_only_file_is_empty_collection() {
        assert!(parse_books(b"  \n").expect("blank file parses").is_empty());
    }

    #[test]
    fn non_array_root_is_rejected() {
        let err = parse_books(br#"{"title":"Dune"}"#).expect_err("object root must fail");
        assert!(err.contains("array"));
    }

    #[test]
    fn malformed_record_reports_its_index() {
        let raw = br#"[
            {"title":"Dune","author":"Frank Herbert","isbn":"1"},
            {"title":"1984","isbn":"2"}
        ]"#;
        let err = parse_books(raw).expect_err("missing author must fail");
        assert!(err.starts_with("record 1:"), "unexpected error: {err}");
        assert!(err.contains("author"));
    }

    #[test]
    fn repeated_isbn_is_rejected() {
        let raw = br#"[
            {"title":"Dune","author":"Frank Herbert","isbn":"1"},
            {"title":"Dune Messiah","author":"Frank Herbert","isbn":"1"}
        ]"#;
        let err = parse_books(raw).expect_err("duplicate isbn must fail");
        assert!(err.contains("duplicate isbn"));
    }
}
