//! Open Library catalog client.
//!
//! Edition lookup by ISBN first, search endpoint as fallback when the
//! edition is unknown. Author references are resolved one request each.

use super::{lookup_isbn, LookupError, LookupResult, MetadataFetcher};
use crate::config::{LookupConfig, RetryPolicy};
use crate::model::book::Book;
use async_trait::async_trait;
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Instant;

static AUTHOR_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/authors/[A-Za-z0-9]+$").expect("valid author key regex"));

#[derive(Debug, Deserialize)]
struct EditionDoc {
    title: Option<String>,
    #[serde(default)]
    authors: Vec<AuthorRef>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AuthorRef {
    Key { key: String },
    Name { name: String },
    Plain(String),
    Other(serde_json::Value),
}

#[derive(Debug, Deserialize)]
struct AuthorDoc {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchDoc {
    #[serde(default)]
    docs: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: Option<String>,
    title_suggest: Option<String>,
    #[serde(default)]
    author_name: Vec<String>,
}

/// `MetadataFetcher` backed by the Open Library JSON API.
#[derive(Debug, Clone)]
pub struct OpenLibraryFetcher {
    client: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl OpenLibraryFetcher {
    /// Builds a client with the configured timeout and retry policy.
    ///
    /// # Errors
    /// - `Transport` when the HTTP client cannot be constructed.
    pub fn new(config: &LookupConfig) -> LookupResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("bookshelf/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| LookupError::Transport(format!("http client setup failed: {err}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retry: config.retry.clone(),
        })
    }

    async fn lookup(&self, isbn: &str) -> LookupResult<Book> {
        let edition_url = format!("{}/isbn/{isbn}.json", self.base_url);
        if let Some(edition) = self.get_json::<EditionDoc>(&edition_url).await? {
            let authors = self.resolve_authors(edition.authors).await?;
            return book_from_parts(edition.title, authors, isbn);
        }

        let search_url = format!("{}/search.json?isbn={isbn}", self.base_url);
        let hit = self
            .get_json::<SearchDoc>(&search_url)
            .await?
            .and_then(|search| search.docs.into_iter().next())
            .ok_or_else(|| LookupError::NotFound(isbn.to_string()))?;
        book_from_parts(hit.title.or(hit.title_suggest), hit.author_name, isbn)
    }

    async fn resolve_authors(&self, refs: Vec<AuthorRef>) -> LookupResult<Vec<String>> {
        let mut names = Vec::with_capacity(refs.len());
        for author in refs {
            match author {
                AuthorRef::Key { key } => {
                    if !AUTHOR_KEY_RE.is_match(&key) {
                        warn!("event=lookup_author module=metadata status=skipped reason=unexpected_key");
                        continue;
                    }
                    let url = format!("{}{key}.json", self.base_url);
                    if let Some(AuthorDoc { name: Some(name) }) = self.get_json::<AuthorDoc>(&url).await? {
                        names.push(name);
                    }
                }
                AuthorRef::Name { name } | AuthorRef::Plain(name) => names.push(name),
                AuthorRef::Other(_) => {}
            }
        }
        Ok(names)
    }

    /// GETs `url` and decodes JSON; `Ok(None)` means the catalog said 404.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> LookupResult<Option<T>> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.client.get(url).send().await {
                Ok(resp) if resp.status().is_success() => {
                    return resp
                        .json::<T>()
                        .await
                        .map(Some)
                        .map_err(|err| LookupError::Malformed(err.to_string()));
                }
                Ok(resp) if resp.status() == StatusCode::NOT_FOUND => return Ok(None),
                Ok(resp) => {
                    let status = resp.status();
                    if !is_transient(status) || attempt >= self.retry.max_attempts {
                        return Err(LookupError::Status(status.as_u16()));
                    }
                    warn!(
                        "event=lookup_retry module=metadata status=retry attempt={attempt} http_status={}",
                        status.as_u16()
                    );
                }
                Err(err) => {
                    if attempt >= self.retry.max_attempts {
                        return Err(LookupError::Transport(err.to_string()));
                    }
                    warn!("event=lookup_retry module=metadata status=retry attempt={attempt} error={err}");
                }
            }
            tokio::time::sleep(self.retry.backoff(attempt)).await;
        }
    }
}

#[async_trait]
impl MetadataFetcher for OpenLibraryFetcher {
    async fn fetch(&self, isbn: &str) -> LookupResult<Book> {
        let isbn = lookup_isbn(isbn)?;
        let started_at = Instant::now();
        info!("event=lookup module=metadata status=start isbn={isbn}");

        let result = self.lookup(&isbn).await;
        match &result {
            Ok(_) => info!(
                "event=lookup module=metadata status=ok isbn={isbn} duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event=lookup module=metadata status=error isbn={isbn} duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            ),
        }
        result
    }
}

fn is_transient(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

/// Single place where loosely shaped catalog fields become a `Book`.
fn book_from_parts(title: Option<String>, authors: Vec<String>, isbn: &str) -> LookupResult<Book> {
    let title = title
        .filter(|title| !title.trim().is_empty())
        .ok_or_else(|| LookupError::Malformed("missing title".to_string()))?;
    let authors: Vec<String> = authors
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();
    if authors.is_empty() {
        return Err(LookupError::Malformed("missing author".to_string()));
    }
    Book::new(title, authors.join(", "), isbn).map_err(|err| LookupError::Malformed(err.to_string()))
}
