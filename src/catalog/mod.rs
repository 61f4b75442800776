use std::error::Error;
use std::fmt;
use std::time::Duration;

use tracing::{debug, info, warn};

mod dir;
mod http;
mod record;

pub use dir::DirCatalog;
pub use http::{HttpCatalog, DEFAULT_API_BASE};
pub use record::{decode_page, EpisodeRecord};

pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Failures while reading one catalog page. All of them are transient: the
/// fetch loop retries the same page after a fixed delay.
#[derive(Debug)]
pub enum CatalogError {
    Transport(String),
    Status(u16),
    Malformed(String),
    Io(std::io::Error),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Transport(message) => write!(f, "catalog transport error: {}", message),
            CatalogError::Status(code) => write!(f, "catalog returned HTTP {}", code),
            CatalogError::Malformed(message) => {
                write!(f, "malformed catalog response: {}", message)
            }
            CatalogError::Io(err) => write!(f, "catalog I/O error: {}", err),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CatalogError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(value: std::io::Error) -> Self {
        CatalogError::Io(value)
    }
}

/// Raw access to one page of a catalog entry's episode listing.
pub trait PageSource {
    fn fetch_page(&self, catalog_id: &str, page: u32) -> Result<String, CatalogError>;
}

/// Full, normalized episode listing for one catalog entry.
pub trait CatalogSource {
    fn episodes(&self, catalog_id: &str) -> Vec<EpisodeRecord>;
}

pub struct CatalogClient<S> {
    pages: S,
    retry_delay: Duration,
}

impl<S: PageSource> CatalogClient<S> {
    pub fn new(pages: S, retry_delay: Duration) -> Self {
        Self { pages, retry_delay }
    }

    /// Walks every page in order. A failed page is retried indefinitely with a
    /// fixed delay; there is no attempt limit and no backoff growth.
    pub fn fetch_all(&self, catalog_id: &str) -> Vec<EpisodeRecord> {
        let mut records = Vec::new();
        let mut last_page: Option<u32> = None;
        let mut page = 1;
        let mut attempt: u64 = 0;
        loop {
            attempt += 1;
            let decoded = self
                .pages
                .fetch_page(catalog_id, page)
                .and_then(|body| decode_page(&body, records.len()))
                .and_then(|decoded| match last_page.or(decoded.last_page) {
                    Some(last) => Ok((decoded, last)),
                    None => Err(CatalogError::Malformed(
                        "first page has no pagination block".to_string(),
                    )),
                });
            match decoded {
                Ok((decoded, last)) => {
                    debug!(catalog_id, page, count = decoded.records.len(), "fetched catalog page");
                    last_page = Some(last);
                    records.extend(decoded.records);
                    attempt = 0;
                    if page >= last {
                        break;
                    }
                    page += 1;
                }
                Err(err) => {
                    warn!(catalog_id, page, attempt, error = %err, "catalog fetch failed; retrying");
                    std::thread::sleep(self.retry_delay);
                }
            }
        }
        info!(catalog_id, episodes = records.len(), "catalog fetch complete");
        records
    }
}

impl<S: PageSource> CatalogSource for CatalogClient<S> {
    fn episodes(&self, catalog_id: &str) -> Vec<EpisodeRecord> {
        self.fetch_all(catalog_id)
    }
}
