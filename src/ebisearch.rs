//! EBI Search domain queries (offset pagination).

use crate::client::HttpClient;
use crate::error::Result;
use crate::pager::{Pagination, Paginator};
use crate::parse::parse_ebisearch_page;

/// Default EBI Search REST root. Domains are appended to it.
pub const DEFAULT_ENDPOINT: &str = "https://www.ebi.ac.uk/ebisearch/ws/rest/";

/// Default search domain.
pub const DEFAULT_DOMAIN: &str = "sra-sample";

/// Default records per page for library callers.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Client for one EBI Search domain.
#[derive(Debug, Clone)]
pub struct EbiSearch {
    pub(crate) http: HttpClient,
    pub(crate) endpoint: String,
    pub(crate) domain: String,
    pub(crate) page_size: u32,
}

impl EbiSearch {
    /// Create a client for the default `sra-sample` domain.
    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            domain: DEFAULT_DOMAIN.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Override the REST root (useful for testing).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Query a different domain, e.g. `emblrelease_standard`.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Override the number of records per page.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Full URL of the configured domain.
    pub fn domain_url(&self) -> String {
        if self.endpoint.ends_with('/') {
            format!("{}{}", self.endpoint, self.domain)
        } else {
            format!("{}/{}", self.endpoint, self.domain)
        }
    }

    /// Start a lazy query beginning at page `start_page`.
    pub fn query(&self, query: &str, start_page: u32) -> Result<Paginator> {
        let params = vec![
            ("query".to_string(), query.to_string()),
            ("size".to_string(), self.page_size.to_string()),
            ("format".to_string(), "json".to_string()),
        ];
        tracing::debug!(domain = %self.domain, query, "EBI Search query");

        Ok(Paginator::new(
            self.http.clone(),
            self.domain_url(),
            params,
            self.page_size,
            start_page,
            Pagination::Offset {
                param: "start".to_string(),
            },
            parse_ebisearch_page,
        )?
        .with_json_accept())
    }
}
