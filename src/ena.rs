//! ENA browser sample lookup.

use crate::client::HttpClient;
use crate::error::{EtlError, Result};
use crate::xml::xml_to_json;
use serde_json::Value;

/// Default ENA browser XML endpoint. Accessions are appended comma-separated.
pub const DEFAULT_ENDPOINT: &str = "https://www.ebi.ac.uk/ena/browser/api/xml/";

/// Client for ENA sample records.
#[derive(Debug, Clone)]
pub struct Ena {
    pub(crate) http: HttpClient,
    pub(crate) endpoint: String,
}

impl Ena {
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

    /// Fetch the samples behind `accessions` as JSON objects.
    pub async fn samples<S: AsRef<str>>(&self, accessions: &[S]) -> Result<Vec<Value>> {
        if accessions.is_empty() {
            return Ok(Vec::new());
        }
        let joined = accessions
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(",");
        let url = if self.endpoint.ends_with('/') {
            format!("{}{}", self.endpoint, joined)
        } else {
            format!("{}/{}", self.endpoint, joined)
        };

        let body = self.http.get_url(&url).await?;
        parse_sample_set(&body)
    }
}

/// Pull every sample out of a `SAMPLE_SET` document.
///
/// Attribute entries on the set are skipped; a lone sample is returned as a
/// one-element list.
pub fn parse_sample_set(xml: &str) -> Result<Vec<Value>> {
    let doc = xml_to_json(xml)?;
    let set = match doc.get("SAMPLE_SET") {
        Some(Value::Object(set)) => set,
        Some(Value::Null) => return Ok(Vec::new()),
        _ => {
            tracing::debug!(body = %xml, "unexpected ENA payload");
            return Err(EtlError::Parse("ENA response has no SAMPLE_SET".to_string()));
        }
    };

    let mut samples = Vec::new();
    for (key, value) in set {
        if key.starts_with('@') || key == "#text" {
            continue;
        }
        match value {
            Value::Array(items) => samples.extend(items.iter().cloned()),
            other => samples.push(other.clone()),
        }
    }
    Ok(samples)
}
