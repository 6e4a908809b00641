//! CLI binary for the EBI/EuropePMC/Scopus clients and the accession extractor.
//!
//! Usage: sndg-etl europepmc affiliation "Buenos Aires" --fromdate 2020-01-01 > papers.jsonl

#[cfg(feature = "cli")]
mod cli {
    use chrono::NaiveDate;
    use clap::builder::FalseyValueParser;
    use clap::{Parser, Subcommand};
    use indicatif::{ProgressBar, ProgressStyle};
    use sndg_etl::error::Result;
    use sndg_etl::extractor::{with_session, ExtractorConfig};
    use sndg_etl::query::{affiliation_query, country_query};
    use sndg_etl::{
        datalinks, ebisearch, ena, europepmc, scopus, DataLinks, EbiSearch, Ena, EuropePmc,
        HttpClient, Paginator, ResultType, Scopus, SearchOptions,
    };
    use std::fs::File;
    use std::io::BufReader;
    use std::path::PathBuf;
    use std::time::Duration;

    #[derive(Parser)]
    #[command(name = "sndg-etl", about = "EuropePMC, EBI Search, ENA and Scopus clients", version)]
    struct Cli {
        /// Debug logging (also enabled by the VERBOSE env var)
        #[arg(short, long, global = true, env = "VERBOSE", value_parser = FalseyValueParser::new())]
        verbose: bool,

        /// Disable logging entirely
        #[arg(short, long, global = true)]
        silent: bool,

        /// HTTP timeout in seconds (overrides SNDG_ETL_TIMEOUT_SECS)
        #[arg(long, global = true)]
        timeout: Option<u64>,

        #[command(subcommand)]
        command: Commands,
    }

    #[derive(Subcommand)]
    enum Commands {
        /// Search EuropePMC articles
        Europepmc {
            #[arg(long, env = "EBIPMC_ENDPOINT", default_value = europepmc::DEFAULT_ENDPOINT)]
            endpoint: String,
            #[arg(long, default_value = "25")]
            page_size: u32,
            #[arg(long, value_enum, default_value_t = ResultType::Core)]
            result_type: ResultType,
            /// Starting page
            #[arg(long)]
            offset: Option<u32>,
            #[arg(long, default_value = europepmc::DEFAULT_SORT)]
            sort: String,
            #[command(subcommand)]
            mode: EuropePmcMode,
        },
        /// Search an EBI Search domain
        Ebisearch {
            #[arg(long, env = "EBISEARCH_ENDPOINT", default_value = ebisearch::DEFAULT_ENDPOINT)]
            endpoint: String,
            #[arg(long, default_value = "500")]
            page_size: u32,
            /// Starting page
            #[arg(long)]
            offset: Option<u32>,
            #[command(subcommand)]
            mode: EbiSearchMode,
        },
        /// Data-link categories of one EuropePMC article, one per line
        Datalinks {
            /// Article id (PMID or PMCID)
            id: String,
            /// Article source
            #[arg(long, default_value = datalinks::DEFAULT_SOURCE)]
            source: String,
            #[arg(long, env = "EBIPMC_LINKS_ENDPOINT", default_value = datalinks::DEFAULT_ENDPOINT)]
            endpoint: String,
        },
        /// ENA sample records for the given accessions
        Ena {
            #[arg(required = true)]
            accessions: Vec<String>,
            #[arg(long, env = "ENA_ENDPOINT", default_value = ena::DEFAULT_ENDPOINT)]
            endpoint: String,
        },
        /// Scopus record of a PubMed article
        Scopus {
            pmid: String,
            #[arg(long, env = "SCOPUS_API_KEY", hide_env_values = true)]
            api_key: String,
            #[arg(long, default_value = scopus::DEFAULT_ENDPOINT)]
            endpoint: String,
        },
        /// Split data-link categories (JSON lines) into per-category CSV files
        Extract {
            /// JSON lines produced by the datalinks command
            json_load: PathBuf,
            /// Directory for the CSV files, created if missing
            workdir: PathBuf,
        },
    }

    #[derive(Subcommand)]
    enum EuropePmcMode {
        /// Raw EuropePMC query
        Query { query: String },
        /// Articles by affiliation
        Affiliation {
            affiliation: String,
            /// First publication date, YYYY-MM-DD
            #[arg(long)]
            fromdate: Option<NaiveDate>,
            /// Articles without data cross-references
            #[arg(long)]
            no_refs: bool,
        },
    }

    #[derive(Subcommand)]
    enum EbiSearchMode {
        /// Raw query against a domain
        Query { domain: String, query: String },
        /// sra-sample records by country
        Country {
            country: String,
            /// First public date, YYYY-MM-DD
            #[arg(long)]
            fromdate: Option<NaiveDate>,
        },
    }

    fn make_http(timeout: Option<u64>) -> Result<HttpClient> {
        match timeout {
            Some(secs) => HttpClient::with_timeout(Duration::from_secs(secs)),
            None => HttpClient::from_env(),
        }
    }

    /// Print every hit as one JSON line, with a progress bar on stderr.
    async fn print_hits(mut pager: Paginator, silent: bool) -> Result<u64> {
        let bar = if silent {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(0)
        };
        bar.set_style(
            ProgressStyle::with_template("{bar:40} {pos}/{len} [{elapsed_precise}<{eta_precise}]")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let mut printed = 0;
        while let Some(hit) = pager.next().await? {
            if printed == 0 {
                bar.set_length(hit.total);
                bar.set_position(hit.index.saturating_sub(1));
            }
            println!("{}", serde_json::to_string(&hit.record)?);
            bar.inc(1);
            printed += 1;
        }
        bar.finish_and_clear();
        tracing::debug!(printed, round_trips = pager.pages_fetched(), "done");
        Ok(printed)
    }

    pub async fn run() -> Result<()> {
        let cli = Cli::parse();
        sndg_etl::logging::init(cli.verbose, cli.silent);
        let http = make_http(cli.timeout)?;

        match cli.command {
            Commands::Europepmc {
                endpoint,
                page_size,
                result_type,
                offset,
                sort,
                mode,
            } => {
                let query = match mode {
                    EuropePmcMode::Query { query } => query,
                    EuropePmcMode::Affiliation {
                        affiliation,
                        fromdate,
                        no_refs,
                    } => affiliation_query(&affiliation, !no_refs, fromdate),
                };
                tracing::debug!(%query, "EuropePMC query");

                let options = SearchOptions {
                    page_size,
                    result_type,
                    sort: Some(sort),
                    offset,
                };
                let api = EuropePmc::new(http).with_endpoint(endpoint);
                print_hits(api.search(&query, &options)?, cli.silent).await?;
            }

            Commands::Ebisearch {
                endpoint,
                page_size,
                offset,
                mode,
            } => {
                let (domain, query) = match mode {
                    EbiSearchMode::Query { domain, query } => (domain, query),
                    EbiSearchMode::Country { country, fromdate } => (
                        ebisearch::DEFAULT_DOMAIN.to_string(),
                        country_query(&country, fromdate),
                    ),
                };
                tracing::debug!("{}?{}", domain, query);

                let api = EbiSearch::new(http)
                    .with_endpoint(endpoint)
                    .with_domain(domain)
                    .with_page_size(page_size);
                print_hits(api.query(&query, offset.unwrap_or(0))?, cli.silent).await?;
            }

            Commands::Datalinks {
                id,
                source,
                endpoint,
            } => {
                let api = DataLinks::new(http).with_endpoint(endpoint);
                for category in api.categories(&source, &id).await? {
                    println!("{}", serde_json::to_string(&category)?);
                }
            }

            Commands::Ena {
                accessions,
                endpoint,
            } => {
                let api = Ena::new(http).with_endpoint(endpoint);
                for sample in api.samples(&accessions).await? {
                    println!("{}", serde_json::to_string(&sample)?);
                }
            }

            Commands::Scopus {
                pmid,
                api_key,
                endpoint,
            } => {
                let api = Scopus::new(http, api_key).with_endpoint(endpoint);
                println!("{}", serde_json::to_string(&api.by_pmid(&pmid).await?)?);
            }

            Commands::Extract {
                json_load,
                workdir,
            } => {
                let input = BufReader::new(File::open(&json_load)?);
                let rows = with_session(ExtractorConfig::new(workdir), |session| {
                    session.extract_lines(input)
                })?;
                tracing::info!(rows, input = %json_load.display(), "extraction finished");
            }
        }

        Ok(())
    }
}

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        tracing::error!(error = %e, "command failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("This binary requires the 'cli' feature. Build with: cargo build --features cli");
    std::process::exit(1);
}
