//! EuropePMC article search.
//!
//! Pagination follows the `nextPageUrl` cursor returned with each page.

use crate::client::HttpClient;
use crate::error::Result;
use crate::pager::{Pagination, Paginator};
use crate::parse::parse_europepmc_page;
use crate::types::ResultType;

/// Default EuropePMC search endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://www.ebi.ac.uk/europepmc/webservices/rest/search";

/// Default sort directive used by the CLI.
pub const DEFAULT_SORT: &str = "P_PDATE_D ASC";

/// Paging and verbosity options for a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// Records per page.
    pub page_size: u32,
    /// Result verbosity.
    pub result_type: ResultType,
    /// Sort directive, e.g. `P_PDATE_D ASC`.
    pub sort: Option<String>,
    /// Starting page index.
    pub offset: Option<u32>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            page_size: 25,
            result_type: ResultType::Core,
            sort: Some(DEFAULT_SORT.to_string()),
            offset: None,
        }
    }
}

impl SearchOptions {
    /// Query parameters for the first request.
    pub(crate) fn to_params(&self, query: &str) -> Vec<(String, String)> {
        let mut params = vec![
            ("query".to_string(), query.to_string()),
            ("pageSize".to_string(), self.page_size.to_string()),
            ("resulttype".to_string(), self.result_type.as_api_str().to_string()),
            ("format".to_string(), "json".to_string()),
        ];
        if let Some(sort) = self.sort.as_deref().filter(|s| !s.is_empty()) {
            params.push(("sort".to_string(), sort.to_string()));
        }
        if let Some(offset) = self.offset.filter(|o| *o > 0) {
            params.push(("offSet".to_string(), offset.to_string()));
        }
        params
    }
}

/// Client for the EuropePMC REST search API.
#[derive(Debug, Clone)]
pub struct EuropePmc {
    pub(crate) http: HttpClient,
    pub(crate) endpoint: String,
}

impl EuropePmc {
    /// Create a client against the public endpoint.
    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    /// Override the endpoint (useful for testing).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Start a lazy search. No request is made until the paginator is advanced.
    pub fn search(&self, query: &str, options: &SearchOptions) -> Result<Paginator> {
        Paginator::new(
            self.http.clone(),
            self.endpoint.clone(),
            options.to_params(query),
            options.page_size,
            options.offset.unwrap_or(0),
            Pagination::Cursor,
            parse_europepmc_page,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_default_params() {
        let params = SearchOptions::default().to_params("malaria");
        assert_eq!(param(&params, "query"), Some("malaria"));
        assert_eq!(param(&params, "pageSize"), Some("25"));
        assert_eq!(param(&params, "resulttype"), Some("core"));
        assert_eq!(param(&params, "format"), Some("json"));
        assert_eq!(param(&params, "sort"), Some(DEFAULT_SORT));
        assert_eq!(param(&params, "offSet"), None);
    }

    #[test]
    fn test_offset_and_no_sort() {
        let options = SearchOptions {
            page_size: 10,
            result_type: ResultType::Lite,
            sort: None,
            offset: Some(4),
        };
        let params = options.to_params("q");
        assert_eq!(param(&params, "offSet"), Some("4"));
        assert_eq!(param(&params, "sort"), None);
        assert_eq!(param(&params, "resulttype"), Some("lite"));
    }
}
