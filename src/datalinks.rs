//! EuropePMC data-links lookup.
//!
//! Returns the datasets and database records EuropePMC associates with one
//! article, grouped into categories (`GEO`, `Nucleotide Sequences`, ...).
//! Each category is the input document of [`crate::extractor`].

use crate::client::HttpClient;
use crate::error::{EtlError, Result};
use crate::parse::parse_datalinks_response;
use serde_json::Value;
use url::Url;

/// Default EuropePMC REST root.
pub const DEFAULT_ENDPOINT: &str = "https://www.ebi.ac.uk/europepmc/webservices/rest";

/// Default article source.
pub const DEFAULT_SOURCE: &str = "MED";

/// Client for `/{source}/{id}/datalinks`.
#[derive(Debug, Clone)]
pub struct DataLinks {
    pub(crate) http: HttpClient,
    pub(crate) endpoint: String,
}

impl DataLinks {
    /// Create a client against the public endpoint.
    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    /// Override the REST root (useful for testing).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// URL of the data-links resource for one article.
    pub fn datalinks_url(&self, source: &str, id: &str) -> Result<Url> {
        let mut url = Url::parse(&self.endpoint)
            .map_err(|e| EtlError::Config(format!("invalid endpoint {:?}: {e}", self.endpoint)))?;
        url.path_segments_mut()
            .map_err(|_| EtlError::Config(format!("endpoint cannot carry a path: {}", self.endpoint)))?
            .pop_if_empty()
            .push(source)
            .push(id)
            .push("datalinks");
        url.query_pairs_mut().append_pair("format", "json");
        Ok(url)
    }

    /// Fetch the data-link categories of one article.
    pub async fn categories(&self, source: &str, id: &str) -> Result<Vec<Value>> {
        let url = self.datalinks_url(source, id)?;
        let body = self.http.get_url(url.as_str()).await?;
        parse_datalinks_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datalinks_url() {
        let api = DataLinks::new(HttpClient::new().unwrap());
        let url = api.datalinks_url(DEFAULT_SOURCE, "PMC3257301").unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.ebi.ac.uk/europepmc/webservices/rest/MED/PMC3257301/datalinks?format=json"
        );
    }

    #[test]
    fn test_datalinks_url_trailing_slash() {
        let api = DataLinks::new(HttpClient::new().unwrap()).with_endpoint("http://127.0.0.1:9/rest/");
        let url = api.datalinks_url("PMC", "123").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9/rest/PMC/123/datalinks?format=json");
    }

    #[test]
    fn test_datalinks_url_invalid_endpoint() {
        let api = DataLinks::new(HttpClient::new().unwrap()).with_endpoint("not a url");
        assert!(matches!(
            api.datalinks_url("MED", "1"),
            Err(EtlError::Config(_))
        ));
    }
}
