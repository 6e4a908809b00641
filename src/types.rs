//! Public types shared by the clients.

use crate::error::{EtlError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// One record yielded by a [`crate::pager::Paginator`].
///
/// `record` is passed through exactly as the upstream API returned it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// Raw record payload.
    pub record: Value,
    /// Total hit count reported by the API for the whole query.
    pub total: u64,
    /// 1-based position of this record in the full result set.
    pub index: u64,
}

/// One decoded page of results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    /// Total hit count across the whole query.
    pub total: u64,
    /// Records on this page. `None` when the payload had no record list.
    pub records: Option<Vec<Value>>,
    /// Continuation URL for cursor-based APIs.
    pub next_url: Option<String>,
}

/// EuropePMC result verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ResultType {
    /// Identifiers only.
    Idlist,
    /// Key metadata.
    Lite,
    /// Full metadata, including abstracts and data-link flags.
    #[default]
    Core,
}

impl ResultType {
    /// Value sent in the `resulttype` query parameter.
    pub fn as_api_str(&self) -> &'static str {
        match self {
            ResultType::Idlist => "idlist",
            ResultType::Lite => "lite",
            ResultType::Core => "core",
        }
    }
}

impl fmt::Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_api_str())
    }
}

/// Read a hit count that upstream may send as a number or a numeric string.
pub(crate) fn parse_hit_count(value: Option<&Value>) -> Result<u64> {
    match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .ok_or_else(|| EtlError::Parse(format!("hitCount is not a non-negative integer: {n}"))),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map_err(|_| EtlError::Parse(format!("hitCount is not numeric: {s:?}"))),
        Some(other) => Err(EtlError::Parse(format!("unexpected hitCount: {other}"))),
        None => Err(EtlError::Parse("missing hitCount".to_string())),
    }
}
