//! # sndg-etl
//!
//! Thin clients for biomedical literature and sequence-database REST APIs,
//! plus an extractor that turns EuropePMC data-links into per-category CSV
//! files of accessions.
//!
//! Provides:
//! - **Library**: async clients for EuropePMC search and data-links, EBI Search,
//!   the ENA browser and Scopus, a lazy [`Paginator`], and the
//!   [`extractor`] session
//! - **CLI**: `sndg-etl` binary (feature `cli`) printing newline-delimited JSON
//!
//! ## Quick Start
//!
//! ```no_run
//! # async fn example() -> sndg_etl::error::Result<()> {
//! use sndg_etl::{EuropePmc, HttpClient, SearchOptions};
//!
//! let api = EuropePmc::new(HttpClient::new()?);
//! let mut pager = api.search("AFF:Buenos Aires AND HAS_XREFS:y", &SearchOptions::default())?;
//! while let Some(hit) = pager.next().await? {
//!     println!("{}/{} {}", hit.index, hit.total, hit.record["id"]);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod datalinks;
pub mod ebisearch;
pub mod ena;
pub mod error;
pub mod europepmc;
pub mod extractor;
pub mod logging;
pub mod pager;
pub mod parse;
pub mod query;
pub mod scopus;
pub mod types;
pub mod xml;

// Re-export key types at the crate root.
pub use client::HttpClient;
pub use datalinks::DataLinks;
pub use ebisearch::EbiSearch;
pub use ena::Ena;
pub use error::EtlError;
pub use europepmc::{EuropePmc, SearchOptions};
pub use extractor::{Category, ExtractionSession, ExtractorConfig};
pub use pager::{Pagination, Paginator};
pub use query::QueryBuilder;
pub use scopus::Scopus;
pub use types::*;
