//! Scopus search by PubMed id.

use crate::client::HttpClient;
use crate::error::{EtlError, Result};
use serde_json::Value;

/// Default Scopus search endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.elsevier.com/content/search/scopus";

/// Client for the Elsevier Scopus search API.
#[derive(Debug, Clone)]
pub struct Scopus {
    pub(crate) http: HttpClient,
    pub(crate) api_key: String,
    pub(crate) endpoint: String,
}

impl Scopus {
    /// Create a client with the given API key.
    pub fn new(http: HttpClient, api_key: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    /// Create a client from the `SCOPUS_API_KEY` environment variable.
    pub fn from_env(http: HttpClient) -> Result<Self> {
        let key = std::env::var("SCOPUS_API_KEY").map_err(|_| EtlError::AuthRequired)?;
        if key.trim().is_empty() {
            return Err(EtlError::AuthRequired);
        }
        Ok(Self::new(http, key))
    }

    /// Override the endpoint (useful for testing).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Look up the Scopus record of a PubMed article, complete view.
    pub async fn by_pmid(&self, pmid: &str) -> Result<Value> {
        let params = vec![
            ("query".to_string(), format!("PMID({pmid})")),
            ("apiKey".to_string(), self.api_key.clone()),
            ("view".to_string(), "COMPLETE".to_string()),
        ];
        let body = self.http.get_json(&self.endpoint, &params).await?;
        serde_json::from_str(&body)
            .map_err(|e| EtlError::Parse(format!("Invalid Scopus response: {e}")))
    }
}
