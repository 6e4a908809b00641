//! Error types for the ETL clients and the accession extractor.

/// Errors that can occur when talking to the EBI/Elsevier APIs or extracting accessions.
#[derive(Debug, thiserror::Error)]
pub enum EtlError {
    /// HTTP request failed (network, timeout, etc.)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream API returned a non-success status code.
    #[error("API error (HTTP {status}) from {endpoint} with params {params:?}: {body}")]
    Api {
        endpoint: String,
        params: Vec<(String, String)>,
        status: u16,
        body: String,
    },

    /// No API key provided.
    #[error("Authentication required: set SCOPUS_API_KEY or pass the key explicitly")]
    AuthRequired,

    /// Failed to parse API response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// An accession document is missing a key the extractor needs.
    #[error("Malformed document ({message}):\n{document}")]
    Structure { message: String, document: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error on an output sink or input file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// XML parsing error.
    #[error("XML error: {0}")]
    Xml(String),
}

/// Convenience alias for Results using [`EtlError`].
pub type Result<T> = std::result::Result<T, EtlError>;
