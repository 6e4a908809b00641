//! HTTP fetch capability shared by every API client.

use crate::error::{EtlError, Result};
use reqwest::Client;
use std::time::Duration;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("sndg-etl/", env!("CARGO_PKG_VERSION"));

/// Thin async wrapper around [`reqwest::Client`].
///
/// Every call is a single GET. Non-success statuses become [`EtlError::Api`]
/// carrying the endpoint, the query parameters and the response body; nothing
/// is retried.
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: Client,
    timeout: Duration,
}

impl HttpClient {
    /// Create a client with the default timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a client with an explicit request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { http, timeout })
    }

    /// Create a client whose timeout comes from `SNDG_ETL_TIMEOUT_SECS`, if set.
    pub fn from_env() -> Result<Self> {
        match std::env::var("SNDG_ETL_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|_| {
                    EtlError::Config(format!("SNDG_ETL_TIMEOUT_SECS is not a number: {raw:?}"))
                })?;
                Self::with_timeout(Duration::from_secs(secs))
            }
            Err(_) => Self::new(),
        }
    }

    /// The configured request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// GET `url` with query parameters and return the body.
    pub async fn get(&self, url: &str, params: &[(String, String)]) -> Result<String> {
        tracing::debug!(url, params = ?redact(params), "GET");
        let response = self.http.get(url).query(params).send().await?;
        handle_response(url, params, response).await
    }

    /// GET `url` with query parameters, asking for a JSON representation.
    pub async fn get_json(&self, url: &str, params: &[(String, String)]) -> Result<String> {
        tracing::debug!(url, params = ?redact(params), "GET (json)");
        let response = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(params)
            .send()
            .await?;
        handle_response(url, params, response).await
    }

    /// GET a pre-built URL (continuation links, templated endpoints).
    pub async fn get_url(&self, url: &str) -> Result<String> {
        self.get(url, &[]).await
    }
}

/// Map the response status to either its body or an [`EtlError::Api`].
async fn handle_response(
    endpoint: &str,
    params: &[(String, String)],
    response: reqwest::Response,
) -> Result<String> {
    let status = response.status().as_u16();

    match status {
        200..=299 => Ok(response.text().await?),
        _ => {
            let body = response.text().await.unwrap_or_default();
            let err = EtlError::Api {
                endpoint: endpoint.to_string(),
                params: redact(params),
                status,
                body,
            };
            tracing::error!(error = %err, "error executing page handler");
            Err(err)
        }
    }
}

/// Copy of `params` with credentials masked, safe to log.
fn redact(params: &[(String, String)]) -> Vec<(String, String)> {
    params
        .iter()
        .map(|(k, v)| {
            if k.eq_ignore_ascii_case("apikey") {
                (k.clone(), "***".to_string())
            } else {
                (k.clone(), v.clone())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_api_key() {
        let params = vec![
            ("query".to_string(), "PMID(1)".to_string()),
            ("apiKey".to_string(), "secret".to_string()),
        ];
        let redacted = redact(&params);
        assert_eq!(redacted[0].1, "PMID(1)");
        assert_eq!(redacted[1].1, "***");
    }

    #[test]
    fn test_with_timeout_is_kept() {
        let client = HttpClient::with_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(client.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_default_timeout() {
        let client = HttpClient::new().unwrap();
        assert_eq!(client.timeout(), DEFAULT_TIMEOUT);
    }
}
