//! Linear-scan lookup over paginated listings.
//!
//! Some APIs can list records page by page but cannot fetch one by ID.
//! [`Scan::find`] walks the listing from offset 0 until a record matches,
//! or until a short page signals the end of the data.
//!
//! The scan assumes the remote listing order is stable between page
//! requests. If it is not, a record can be skipped or seen twice.

use async_trait::async_trait;
use tracing::debug;

use crate::{Error, Result};

/// Default number of records requested per page.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// A listing that can be fetched by offset and limit.
#[async_trait]
pub trait Paginated: Send + Sync {
    type Item: Send;

    /// Fetch up to `limit` records starting at `offset`.
    async fn page(&self, offset: usize, limit: usize) -> Result<Vec<Self::Item>>;
}

/// Scan settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scan {
    page_size: usize,
    max_pages: Option<usize>,
}

impl Default for Scan {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: None,
        }
    }
}

impl Scan {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            max_pages: None,
        }
    }

    /// Give up after this many full pages.
    pub fn max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = Some(max_pages.max(1));
        self
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Return the first record matching `predicate`.
    ///
    /// `what` and `id` only feed the not-found error. Errors from
    /// `source` abort the scan immediately.
    pub async fn find<P, F>(&self, source: &P, predicate: F, what: &str, id: &str) -> Result<P::Item>
    where
        P: Paginated + ?Sized,
        F: Fn(&P::Item) -> bool + Send,
    {
        let mut offset = 0;
        let mut pages = 0;

        loop {
            let records = source.page(offset, self.page_size).await?;
            pages += 1;
            let count = records.len();

            debug!(what, id, offset, count, "Scanned page");

            if let Some(found) = records.into_iter().find(|r| predicate(r)) {
                return Ok(found);
            }

            let exhausted = count < self.page_size;
            let capped = self.max_pages.is_some_and(|max| pages >= max);
            if exhausted || capped {
                return Err(Error::ScanExhausted {
                    what: what.to_string(),
                    id: id.to_string(),
                    pages,
                });
            }

            offset += self.page_size;
        }
    }
}
