use async_trait::async_trait;
use bookshelf_core::{
    Book, BookUpdate, Library, LibraryService, LookupError, LookupResult, MetadataFetcher,
    ServiceError,
};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

struct CatalogStub {
    calls: AtomicUsize,
}

impl CatalogStub {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl MetadataFetcher for CatalogStub {
    async fn fetch(&self, isbn: &str) -> LookupResult<Book> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match isbn {
            "9780441172719" => Ok(Book::new("Dune", "Frank Herbert", isbn).unwrap()),
            _ => Err(LookupError::NotFound(isbn.to_string())),
        }
    }
}

/// Blocks every lookup until `release` is notified.
struct GatedCatalog {
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl MetadataFetcher for GatedCatalog {
    async fn fetch(&self, isbn: &str) -> LookupResult<Book> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(Book::new("Slow Title", "Slow Author", isbn).unwrap())
    }
}

fn service_at(path: &Path, fetcher: Arc<dyn MetadataFetcher>) -> LibraryService {
    LibraryService::new(Library::open(path).unwrap(), fetcher)
}

#[tokio::test]
async fn add_by_isbn_stores_normalized_lookup_result() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("library.json");
    let service = service_at(&path, CatalogStub::new());

    let book = service.add_by_isbn("978-0-441-17271-9").await.unwrap();
    assert_eq!(book.title(), "Dune");
    assert_eq!(book.isbn(), "9780441172719");

    let reopened = Library::open(&path).unwrap();
    assert_eq!(reopened.find("9780441172719"), Some(&book));
}

#[tokio::test]
async fn add_by_isbn_skips_lookup_for_known_isbn() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = CatalogStub::new();
    let service = service_at(&dir.path().join("library.json"), catalog.clone());
    service
        .add_manual("Dune", "Frank Herbert", "978-0-441-17271-9")
        .await
        .unwrap();

    let err = service.add_by_isbn("9780441172719").await.unwrap_err();
    assert!(matches!(err, ServiceError::DuplicateIsbn(_)));
    assert_eq!(catalog.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn lookup_failures_surface_as_lookup_errors() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_at(&dir.path().join("library.json"), CatalogStub::new());

    let err = service.add_by_isbn("0-00-000000-0").await.unwrap_err();
    assert!(matches!(err, ServiceError::Lookup(LookupError::NotFound(_))));

    let err = service.add_by_isbn("not an isbn").await.unwrap_err();
    assert!(matches!(err, ServiceError::Lookup(LookupError::InvalidIsbn(_))));
    assert_eq!(service.book_count().await, 0);
}

#[tokio::test]
async fn add_manual_validates_before_touching_the_library() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("library.json");
    let service = service_at(&path, CatalogStub::new());

    let err = service.add_manual("Dune", " ", "1").await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    assert!(!path.exists());
}

#[tokio::test]
async fn update_and_remove_map_library_errors() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_at(&dir.path().join("library.json"), CatalogStub::new());
    service.add_manual("1984", "George Orwell", "1").await.unwrap();
    service.add_manual("Dune", "Frank Herbert", "2").await.unwrap();

    let collision = BookUpdate {
        title: "1984".to_string(),
        author: "George Orwell".to_string(),
        isbn: "2".to_string(),
    };
    assert!(matches!(
        service.update_book("1", collision).await.unwrap_err(),
        ServiceError::DuplicateIsbn(_)
    ));

    let rename = BookUpdate {
        title: "Nineteen Eighty-Four".to_string(),
        author: "George Orwell".to_string(),
        isbn: "1".to_string(),
    };
    let updated = service.update_book("1", rename).await.unwrap();
    assert_eq!(updated.title(), "Nineteen Eighty-Four");

    assert!(matches!(
        service.remove_book("3").await.unwrap_err(),
        ServiceError::NotFound(_)
    ));
    assert!(matches!(
        service.get_book("3").await.unwrap_err(),
        ServiceError::NotFound(_)
    ));
    assert_eq!(service.remove_book("2").await.unwrap().title(), "Dune");
    assert_eq!(service.book_count().await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_adds_are_not_lost() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("library.json");
    let service = Arc::new(service_at(&path, CatalogStub::new()));

    let mut handles = Vec::new();
    for i in 0..16 {
        let service = Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            service
                .add_manual(format!("Book {i}"), "Author", format!("isbn-{i}"))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(service.book_count().await, 16);
    let reopened = Library::open(&path).unwrap();
    assert_eq!(reopened.len(), 16);
    for i in 0..16 {
        assert!(reopened.find(&format!("isbn-{i}")).is_some());
    }
}

#[tokio::test]
async fn pending_lookup_does_not_block_other_operations() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = Arc::new(GatedCatalog {
        entered: Notify::new(),
        release: Notify::new(),
    });
    let service = Arc::new(service_at(
        &dir.path().join("library.json"),
        catalog.clone(),
    ));

    let pending = {
        let service = Arc::clone(&service);
        tokio::spawn(async move { service.add_by_isbn("9780452284234").await })
    };
    catalog.entered.notified().await;

    service
        .add_manual("Dune", "Frank Herbert", "978-0-441-17271-9")
        .await
        .unwrap();
    assert_eq!(service.list_books().await.len(), 1);

    catalog.release.notify_one();
    let slow = pending.await.unwrap().unwrap();
    assert_eq!(slow.isbn(), "9780452284234");
    assert_eq!(service.book_count().await, 2);
}

#[tokio::test]
async fn flush_writes_current_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("library.json");
    let service = service_at(&path, CatalogStub::new());

    service.flush().await.unwrap();
    assert!(path.exists());
    assert!(Library::open(&path).unwrap().is_empty());
}
