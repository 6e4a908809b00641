//! Lazy pagination over search APIs.
//!
//! A [`Paginator`] performs one HTTP round trip per exhausted page and hands
//! back records one at a time, each annotated with the query's total hit count
//! and its 1-based position in the full result set. Memory use is bounded by a
//! single page.
//!
//! Two strategies are supported:
//!
//! - [`Pagination::Offset`]: the iterator owns a record offset that it writes
//!   into a query parameter and advances by `page_size` after every page. The
//!   total is learned from the first response and bounds the remaining trips.
//! - [`Pagination::Cursor`]: every response may carry a continuation URL,
//!   which is fetched as-is for the next page. A page without one ends the
//!   iteration even when fewer than `total` records were seen. EuropePMC
//!   behaves this way and callers rely on it.

use crate::client::HttpClient;
use crate::error::{EtlError, Result};
use crate::types::{Hit, Page};
use futures_util::stream::{self, Stream};
use serde_json::Value;
use std::collections::VecDeque;

/// Decodes one response body into a [`Page`].
pub type PageDecoder = fn(&str) -> Result<Page>;

/// How the next page is located.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pagination {
    /// Record offset sent in the named query parameter.
    Offset { param: String },
    /// Continuation URL returned by each page.
    Cursor,
}

/// Lazy, finite, non-restartable sequence of [`Hit`]s.
#[derive(Debug)]
pub struct Paginator {
    http: HttpClient,
    endpoint: String,
    params: Vec<(String, String)>,
    strategy: Pagination,
    decode: PageDecoder,
    json_accept: bool,
    page_size: u64,
    start_page: u64,

    buffer: VecDeque<Value>,
    total: Option<u64>,
    offset: u64,
    next_url: Option<String>,
    next_index: u64,
    pages_fetched: u64,
    exhausted: bool,
}

impl Paginator {
    /// Build a paginator over `endpoint`.
    ///
    /// `start_page` is a page index: numbering of yielded records begins at
    /// `start_page * page_size + 1`, and for offset pagination the first
    /// request starts at record `start_page * page_size`.
    pub fn new(
        http: HttpClient,
        endpoint: impl Into<String>,
        params: Vec<(String, String)>,
        page_size: u32,
        start_page: u32,
        strategy: Pagination,
        decode: PageDecoder,
    ) -> Result<Self> {
        if page_size == 0 {
            return Err(EtlError::Config("page size must be greater than zero".to_string()));
        }
        let page_size = u64::from(page_size);
        let start_page = u64::from(start_page);
        tracing::debug!(initial_curr_page = start_page, "starting paginated query");

        Ok(Self {
            http,
            endpoint: endpoint.into(),
            params,
            strategy,
            decode,
            json_accept: false,
            page_size,
            start_page,
            buffer: VecDeque::new(),
            total: None,
            offset: start_page * page_size,
            next_url: None,
            next_index: start_page * page_size + 1,
            pages_fetched: 0,
            exhausted: false,
        })
    }

    /// Send `Accept: application/json` on parameterised requests.
    pub fn with_json_accept(mut self) -> Self {
        self.json_accept = true;
        self
    }

    /// Total hit count, known once the first page has been fetched.
    pub fn total(&self) -> Option<u64> {
        self.total
    }

    /// Number of HTTP round trips performed so far.
    pub fn pages_fetched(&self) -> u64 {
        self.pages_fetched
    }

    /// Records requested per round trip.
    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Advance to the next record, fetching a new page if the current one is spent.
    pub async fn next(&mut self) -> Result<Option<Hit>> {
        loop {
            if let Some(record) = self.buffer.pop_front() {
                let index = self.next_index;
                self.next_index += 1;
                return Ok(Some(Hit {
                    record,
                    total: self.total.unwrap_or_default(),
                    index,
                }));
            }
            if self.exhausted {
                return Ok(None);
            }
            self.fetch_page().await?;
        }
    }

    /// Adapt the paginator into a [`Stream`] of hits.
    ///
    /// The stream ends after the first error.
    pub fn into_stream(self) -> impl Stream<Item = Result<Hit>> {
        stream::try_unfold(self, |mut pager| async move {
            let hit = pager.next().await?;
            Ok::<_, EtlError>(hit.map(|hit| (hit, pager)))
        })
    }

    async fn fetch_page(&mut self) -> Result<()> {
        let body = match (&self.strategy, self.next_url.take()) {
            (Pagination::Cursor, Some(url)) => self.http.get_url(&url).await?,
            _ => {
                let mut params = self.params.clone();
                if let Pagination::Offset { param } = &self.strategy {
                    params.push((param.clone(), self.offset.to_string()));
                }
                if self.json_accept {
                    self.http.get_json(&self.endpoint, &params).await?
                } else {
                    self.http.get(&self.endpoint, &params).await?
                }
            }
        };
        self.pages_fetched += 1;

        let page = match (self.decode)(&body) {
            Ok(page) => page,
            Err(e) => {
                tracing::debug!(body = %body, "undecodable page");
                return Err(e);
            }
        };

        self.total = Some(page.total);
        let total_pages = page.total.div_ceil(self.page_size);
        if self.start_page + self.pages_fetched >= total_pages {
            self.exhausted = true;
        }

        if let Pagination::Offset { .. } = self.strategy {
            self.offset += self.page_size;
            tracing::debug!(offset = self.offset, "advanced offset");
        }

        if let Pagination::Cursor = self.strategy {
            tracing::debug!(next_page_url = ?page.next_url, "cursor");
            match page.next_url {
                Some(url) => self.next_url = Some(url),
                None => self.exhausted = true,
            }
        }

        match page.records {
            Some(_) if page.total == 0 => self.exhausted = true,
            Some(records) if !records.is_empty() => self.buffer.extend(records),
            Some(_) => self.exhausted = true,
            None => {
                tracing::warn!(body = %body, "response has no record list, stopping");
                self.exhausted = true;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn never_decode(_: &str) -> Result<Page> {
        Ok(Page::default())
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let http = HttpClient::new().unwrap();
        let err = Paginator::new(
            http,
            "http://localhost",
            vec![],
            0,
            0,
            Pagination::Cursor,
            never_decode,
        )
        .unwrap_err();
        assert!(matches!(err, EtlError::Config(_)));
    }

    #[test]
    fn test_start_page_shifts_numbering_and_offset() {
        let http = HttpClient::new().unwrap();
        let pager = Paginator::new(
            http,
            "http://localhost",
            vec![],
            10,
            3,
            Pagination::Offset {
                param: "start".to_string(),
            },
            never_decode,
        )
        .unwrap();
        assert_eq!(pager.next_index, 31);
        assert_eq!(pager.offset, 30);
        assert_eq!(pager.total(), None);
        assert_eq!(pager.pages_fetched(), 0);
    }
}
