//! Query-string builders for EuropePMC and EBI Search.
//!
//! # Example
//!
//! ```
//! use sndg_etl::QueryBuilder;
//!
//! let query = QueryBuilder::new()
//!     .field("AFF", "Buenos Aires")
//!     .and()
//!     .field("HAS_XREFS", "y")
//!     .build();
//! assert_eq!(query, "AFF:Buenos Aires AND HAS_XREFS:y");
//! ```

use chrono::{Datelike, Local, NaiveDate};

/// Builder for Lucene-style `FIELD:value` query strings.
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    parts: Vec<String>,
}

impl QueryBuilder {
    /// Create a new empty query builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `field:value` term. The value is not quoted.
    pub fn field(mut self, field: &str, value: &str) -> Self {
        self.parts.push(format!("{}:{}", field, value));
        self
    }

    /// Add an inclusive date range on `field`, formatted `YYYY-MM-DD`.
    pub fn date_range(mut self, field: &str, from: NaiveDate, to: NaiveDate) -> Self {
        self.parts.push(format!(
            "{}:[{} TO {}]",
            field,
            from.format("%Y-%m-%d"),
            to.format("%Y-%m-%d")
        ));
        self
    }

    /// Add an AND operator.
    pub fn and(mut self) -> Self {
        self.parts.push("AND".to_string());
        self
    }

    /// Add a raw query fragment (no escaping).
    pub fn raw(mut self, query: &str) -> Self {
        self.parts.push(query.to_string());
        self
    }

    /// Build the final query string.
    pub fn build(self) -> String {
        self.parts.join(" ")
    }
}

impl std::fmt::Display for QueryBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.parts.join(" "))
    }
}

/// Open-ended upper bound for date filters: December 31st, three years out.
///
/// EuropePMC rejects some arbitrary end dates, a far year end is accepted.
pub fn open_end_date(today: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(today.year() + 3, 12, 31).unwrap_or(NaiveDate::MAX)
}

/// EuropePMC articles by affiliation, with or without data cross-references.
pub fn affiliation_query(affiliation: &str, with_refs: bool, from_date: Option<NaiveDate>) -> String {
    affiliation_query_at(affiliation, with_refs, from_date, Local::now().date_naive())
}

fn affiliation_query_at(
    affiliation: &str,
    with_refs: bool,
    from_date: Option<NaiveDate>,
    today: NaiveDate,
) -> String {
    let mut qb = QueryBuilder::new()
        .field("AFF", affiliation)
        .and()
        .field("HAS_XREFS", if with_refs { "y" } else { "n" })
        .and()
        .field("sort_date", "y");
    if let Some(from) = from_date {
        qb = qb.and().date_range("FIRST_PDATE", from, open_end_date(today));
    }
    qb.build()
}

/// EBI Search `sra-sample` query by sample country.
pub fn country_query(country: &str, from_date: Option<NaiveDate>) -> String {
    country_query_at(country, from_date, Local::now().date_naive())
}

fn country_query_at(country: &str, from_date: Option<NaiveDate>, today: NaiveDate) -> String {
    let mut qb = QueryBuilder::new().field("country", country.trim());
    if let Some(from) = from_date {
        qb = qb.and().date_range("first_public_date", from, open_end_date(today));
    }
    qb.build()
}
