//! Interactive console menu over `LibraryService`.
//!
//! # Responsibility
//! - Read one menu choice at a time, prompt for its fields and render the
//!   outcome as text.
//! - Leave every business rule to the service.
//!
//! # Invariants
//! - Blank required inputs are rejected before any service call.
//! - End of input behaves like choosing `0`.

use bookshelf_core::{Book, BookUpdate, LibraryService, ServiceError};
use log::info;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

const TOP_AUTHORS: usize = 5;

const MENU: &str = "\
=== Bookshelf ===
1. Add book by ISBN
2. Add book manually
3. List books
4. Find book by ISBN
5. Delete book
6. Statistics
7. Search by keyword
8. Update book
0. Exit";

pub struct Console<R, W> {
    service: Arc<LibraryService>,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(service: Arc<LibraryService>, input: R, output: W) -> Self {
        Self {
            service,
            input,
            output,
        }
    }

    /// Runs the menu loop until `0` or end of input.
    pub async fn run(&mut self) -> io::Result<()> {
        loop {
            writeln!(self.output, "\n{MENU}")?;
            let Some(choice) = self.prompt("Choose an option: ")? else {
                break;
            };
            match choice.as_str() {
                "1" => self.add_by_isbn().await?,
                "2" => self.add_manual().await?,
                "3" => self.list_books().await?,
                "4" => self.find_book().await?,
                "5" => self.delete_book().await?,
                "6" => self.statistics().await?,
                "7" => self.search().await?,
                "8" => self.update_book().await?,
                "0" => break,
                other => writeln!(self.output, "Unknown option `{other}`.")?,
            }
        }
        writeln!(self.output, "Goodbye.")?;
        info!("event=console_exit module=console status=ok");
        Ok(())
    }

    async fn add_by_isbn(&mut self) -> io::Result<()> {
        let Some(isbn) = self.required("ISBN: ")? else {
            return Ok(());
        };
        writeln!(self.output, "Looking up {isbn}...")?;
        let outcome = self.service.add_by_isbn(&isbn).await;
        self.report_added(outcome)
    }

    async fn add_manual(&mut self) -> io::Result<()> {
        let Some((title, author, isbn)) = self.book_fields()? else {
            return Ok(());
        };
        let outcome = self.service.add_manual(title, author, isbn).await;
        self.report_added(outcome)
    }

    async fn list_books(&mut self) -> io::Result<()> {
        let books = self.service.list_books().await;
        if books.is_empty() {
            return writeln!(self.output, "The library is empty.");
        }
        self.write_books(&books)
    }

    async fn find_book(&mut self) -> io::Result<()> {
        let Some(isbn) = self.required("ISBN: ")? else {
            return Ok(());
        };
        match self.service.find_book(&isbn).await {
            Some(book) => writeln!(self.output, "{book}"),
            None => writeln!(self.output, "No book with ISBN {isbn}."),
        }
    }

    async fn delete_book(&mut self) -> io::Result<()> {
        let Some(isbn) = self.required("ISBN of the book to delete: ")? else {
            return Ok(());
        };
        let Some(book) = self.service.find_book(&isbn).await else {
            return writeln!(self.output, "No book with ISBN {isbn}.");
        };
        writeln!(self.output, "{book}")?;
        let answer = self.prompt("Delete this book? (y/N): ")?.unwrap_or_default();
        if !answer.eq_ignore_ascii_case("y") {
            return writeln!(self.output, "Deletion cancelled.");
        }
        match self.service.remove_book(&isbn).await {
            Ok(removed) => writeln!(self.output, "Deleted: {removed}"),
            Err(err) => self.report_error(&err),
        }
    }

    async fn statistics(&mut self) -> io::Result<()> {
        let stats = self.service.statistics().await;
        writeln!(self.output, "Total books: {}", stats.total_books)?;
        writeln!(self.output, "Unique authors: {}", stats.unique_authors)?;
        if stats.authors.is_empty() {
            return Ok(());
        }
        writeln!(self.output, "Top authors:")?;
        for entry in stats.authors.iter().take(TOP_AUTHORS) {
            writeln!(self.output, "  {}: {}", entry.author, entry.books)?;
        }
        Ok(())
    }

    async fn search(&mut self) -> io::Result<()> {
        let Some(query) = self.required("Keyword: ")? else {
            return Ok(());
        };
        let hits = self.service.search(&query).await;
        if hits.is_empty() {
            return writeln!(self.output, "No books match `{query}`.");
        }
        writeln!(self.output, "Found {} book(s):", hits.len())?;
        self.write_books(&hits)
    }

    async fn update_book(&mut self) -> io::Result<()> {
        let Some(isbn) = self.required("ISBN of the book to update: ")? else {
            return Ok(());
        };
        let Some(current) = self.service.find_book(&isbn).await else {
            return writeln!(self.output, "No book with ISBN {isbn}.");
        };
        writeln!(self.output, "Current: {current}")?;
        writeln!(self.output, "Press Enter to keep a value.")?;
        let title = self.or_keep("Title", current.title())?;
        let author = self.or_keep("Author", current.author())?;
        let new_isbn = self.or_keep("ISBN", current.isbn())?;
        let update = BookUpdate {
            title,
            author,
            isbn: new_isbn,
        };
        match self.service.update_book(&isbn, update).await {
            Ok(book) => writeln!(self.output, "Updated: {book}"),
            Err(err) => self.report_error(&err),
        }
    }

    fn book_fields(&mut self) -> io::Result<Option<(String, String, String)>> {
        let Some(title) = self.required("Title: ")? else {
            return Ok(None);
        };
        let Some(author) = self.required("Author: ")? else {
            return Ok(None);
        };
        let Some(isbn) = self.required("ISBN: ")? else {
            return Ok(None);
        };
        Ok(Some((title, author, isbn)))
    }

    fn or_keep(&mut self, label: &str, current: &str) -> io::Result<String> {
        let entered = self
            .prompt(&format!("{label} [{current}]: "))?
            .unwrap_or_default();
        Ok(if entered.is_empty() {
            current.to_string()
        } else {
            entered
        })
    }

    /// Prompts once; a blank answer prints a notice and yields `None`.
    fn required(&mut self, label: &str) -> io::Result<Option<String>> {
        match self.prompt(label)? {
            Some(value) if !value.is_empty() => Ok(Some(value)),
            _ => {
                writeln!(self.output, "A value is required.")?;
                Ok(None)
            }
        }
    }

    /// Writes `label` and reads one trimmed line; `None` at end of input.
    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn write_books(&mut self, books: &[Book]) -> io::Result<()> {
        for (index, book) in books.iter().enumerate() {
            writeln!(self.output, "{}. {book}", index + 1)?;
        }
        Ok(())
    }

    fn report_added(&mut self, outcome: Result<Book, ServiceError>) -> io::Result<()> {
        match outcome {
            Ok(book) => writeln!(self.output, "Added: {book}"),
            Err(err) => self.report_error(&err),
        }
    }

    fn report_error(&mut self, err: &ServiceError) -> io::Result<()> {
        writeln!(self.output, "Error: {err}")
    }
}

#[cfg(test)]
mod tests {
    use super::Console;
    use async_trait::async_trait;
    use bookshelf_core::{
        Book, Library, LibraryService, LookupError, LookupResult, MetadataFetcher,
    };
    use std::io::Cursor;
    use std::path::Path;
    use std::sync::Arc;

    struct CatalogStub;

    #[async_trait]
    impl MetadataFetcher for CatalogStub {
        async fn fetch(&self, isbn: &str) -> LookupResult<Book> {
            if isbn == "9780441172719" {
                Ok(Book::new("Dune", "Frank Herbert", isbn).expect("valid book"))
            } else {
                Err(LookupError::NotFound(isbn.to_string()))
            }
        }
    }

    fn service_at(path: &Path) -> Arc<LibraryService> {
        let library = Library::open(path).expect("open library");
        Arc::new(LibraryService::new(library, Arc::new(CatalogStub)))
    }

    async fn run_script(service: Arc<LibraryService>, script: &str) -> String {
        let mut output = Vec::new();
        Console::new(service, Cursor::new(script.to_string()), &mut output)
            .run()
            .await
            .expect("console run");
        String::from_utf8(output).expect("utf8 output")
    }

    #[tokio::test]
    async fn manual_add_then_list_persists() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("library.json");
        let service = service_at(&path);

        let out = run_script(service, "2\n1984\nGeorge Orwell\n978-0-452-28423-4\n3\n0\n").await;

        assert!(out.contains("Added: 1984 by George Orwell (ISBN: 978-0-452-28423-4)"));
        assert!(out.contains("1. 1984 by George Orwell"));
        assert!(out.contains("Goodbye."));
        assert_eq!(Library::open(&path).expect("reopen").len(), 1);
    }

    #[tokio::test]
    async fn add_by_isbn_reports_lookup_outcomes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let service = service_at(&dir.path().join("library.json"));

        let out = run_script(service.clone(), "1\n978-0-441-17271-9\n1\n0000000000\n").await;

        assert!(out.contains("Added: Dune by Frank Herbert (ISBN: 9780441172719)"));
        assert!(out.contains("Error: "));
        assert_eq!(service.book_count().await, 1);
    }

    #[tokio::test]
    async fn blank_fields_never_reach_the_library() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("library.json");
        let service = service_at(&path);

        let out = run_script(service.clone(), "2\n\n1\n\n0\n").await;

        assert_eq!(out.matches("A value is required.").count(), 2);
        assert_eq!(service.book_count().await, 0);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn delete_requires_confirmation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let service = service_at(&dir.path().join("library.json"));
        service
            .add_manual("Dune", "Frank Herbert", "1")
            .await
            .expect("seed book");

        let out = run_script(service.clone(), "5\n1\nn\n").await;
        assert!(out.contains("Deletion cancelled."));
        assert_eq!(service.book_count().await, 1);

        let out = run_script(service.clone(), "5\n1\nY\n0\n").await;
        assert!(out.contains("Deleted: Dune by Frank Herbert (ISBN: 1)"));
        assert_eq!(service.book_count().await, 0);
    }

    #[tokio::test]
    async fn update_keeps_fields_left_blank() {
        let dir = tempfile::tempdir().expect("tempdir");
        let service = service_at(&dir.path().join("library.json"));
        service
            .add_manual("Dune", "Frank Herbert", "1")
            .await
            .expect("seed book");

        let out = run_script(service.clone(), "8\n1\nDune Messiah\n\n2\n0\n").await;

        assert!(out.contains("Updated: Dune Messiah by Frank Herbert (ISBN: 2)"));
        assert!(service.find_book("1").await.is_none());
        assert!(service.find_book("2").await.is_some());
    }

    #[tokio::test]
    async fn search_stats_and_unknown_options() {
        let dir = tempfile::tempdir().expect("tempdir");
        let service = service_at(&dir.path().join("library.json"));
        for (title, author, isbn) in [
            ("Dune", "Frank Herbert", "1"),
            ("Children of Dune", "Frank Herbert", "2"),
            ("1984", "George Orwell", "3"),
        ] {
            service
                .add_manual(title, author, isbn)
                .await
                .expect("seed book");
        }

        let out = run_script(service, "7\ndune\n6\n9\n4\n42\n0\n").await;

        assert!(out.contains("Found 2 book(s):"));
        assert!(out.contains("Total books: 3"));
        assert!(out.contains("Unique authors: 2"));
        assert!(out.contains("  Frank Herbert: 2"));
        assert!(out.contains("Unknown option `9`."));
        assert!(out.contains("No book with ISBN 42."));
    }
}
