//! Accession extraction from EuropePMC data-links categories.
//!
//! Every Link of a recognised category produces two CSV rows: the source
//! publication goes to the `literature` sink, the linked record goes to the
//! sink of the category itself. Rows are written as `scheme,id,"title"` with
//! no header and no escaping of the title.
//!
//! ```no_run
//! # fn example() -> sndg_etl::error::Result<()> {
//! use sndg_etl::extractor::{with_session, ExtractorConfig};
//! use std::io::BufReader;
//!
//! let input = BufReader::new(std::fs::File::open("links.jsonl")?);
//! let rows = with_session(ExtractorConfig::new("accessions"), |session| {
//!     session.extract_lines(input)
//! })?;
//! println!("{rows} rows written");
//! # Ok(())
//! # }
//! ```

use crate::error::{EtlError, Result};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Data-link categories the extractor can route, plus the publication sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    NucleotideSequences,
    RefSeq,
    GenesProteins,
    BioProject,
    Chembl,
    Snps,
    ProteinStructures,
    Geo,
    /// Publications the links were found in.
    Literature,
}

impl Category {
    /// Every category, in default configuration order.
    pub const ALL: [Category; 9] = [
        Category::NucleotideSequences,
        Category::RefSeq,
        Category::GenesProteins,
        Category::BioProject,
        Category::Chembl,
        Category::Snps,
        Category::ProteinStructures,
        Category::Geo,
        Category::Literature,
    ];

    /// The `Name` EuropePMC uses for this category.
    pub fn name(&self) -> &'static str {
        match self {
            Category::NucleotideSequences => "Nucleotide Sequences",
            Category::RefSeq => "RefSeq",
            Category::GenesProteins => "Genes & Proteins",
            Category::BioProject => "BioProject",
            Category::Chembl => "Chembl",
            Category::Snps => "SNPs",
            Category::ProteinStructures => "Protein Structures",
            Category::Geo => "GEO",
            Category::Literature => "literature",
        }
    }

    /// File name used when the configuration does not override it.
    pub fn default_file(&self) -> &'static str {
        match self {
            Category::NucleotideSequences => "seqs.csv",
            Category::RefSeq => "assemblies.csv",
            Category::GenesProteins => "genes.csv",
            Category::BioProject => "projects.csv",
            Category::Chembl => "chembl.csv",
            Category::Snps => "snps.csv",
            Category::ProteinStructures => "pdb.csv",
            Category::Geo => "geos.csv",
            Category::Literature => "literature.csv",
        }
    }

    /// Look up a category by its upstream `Name`.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One classified accession.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessionRow {
    pub category: Category,
    pub scheme: String,
    pub id: String,
    pub title: String,
}

impl AccessionRow {
    /// Truncated accession ranges (`AB000001..AB000009`) show up in nucleotide
    /// links and are not usable ids.
    pub fn is_suppressed(&self) -> bool {
        self.category == Category::NucleotideSequences && self.id.contains("..")
    }

    /// `scheme,id,"title"` plus a newline. The title is not escaped.
    pub fn to_csv_line(&self) -> String {
        format!("{},{},\"{}\"\n", self.scheme, self.id, self.title)
    }
}

#[derive(Debug, Deserialize)]
struct AccessionDocument {
    #[serde(rename = "Section")]
    sections: Vec<Section>,
}

#[derive(Debug, Deserialize)]
struct Section {
    #[serde(rename = "Linklist")]
    link_list: LinkList,
}

#[derive(Debug, Deserialize)]
struct LinkList {
    #[serde(rename = "Link")]
    links: Vec<Link>,
}

#[derive(Debug, Deserialize)]
struct Link {
    #[serde(rename = "Source")]
    source: LinkSource,
    #[serde(rename = "Target")]
    target: LinkTarget,
}

#[derive(Debug, Deserialize)]
struct LinkSource {
    #[serde(rename = "Identifier")]
    identifier: Identifier,
}

#[derive(Debug, Deserialize)]
struct LinkTarget {
    #[serde(rename = "Identifier")]
    identifier: Identifier,
    #[serde(rename = "Title", deserialize_with = "null_as_empty")]
    title: String,
}

#[derive(Debug, Deserialize)]
struct Identifier {
    #[serde(rename = "IDScheme")]
    scheme: String,
    #[serde(rename = "ID")]
    id: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn structure_error(message: impl Into<String>, doc: &Value) -> EtlError {
    EtlError::Structure {
        message: message.into(),
        document: serde_json::to_string_pretty(doc).unwrap_or_else(|_| doc.to_string()),
    }
}

/// Classify the links of one document into rows.
///
/// Documents whose `Name` is not in `categories` produce no rows. Suppression
/// is not applied here, see [`AccessionRow::is_suppressed`].
pub fn links_entry(doc: &Value, categories: &HashSet<Category>) -> Result<Vec<AccessionRow>> {
    let name = doc
        .get("Name")
        .ok_or_else(|| structure_error("missing field `Name`", doc))?;

    let category = match name
        .as_str()
        .and_then(Category::from_name)
        .filter(|c| categories.contains(c))
    {
        Some(category) => category,
        None => return Ok(Vec::new()),
    };

    let parsed = AccessionDocument::deserialize(doc).map_err(|e| structure_error(e.to_string(), doc))?;

    let mut rows = Vec::new();
    for section in parsed.sections {
        for link in section.link_list.links {
            rows.push(AccessionRow {
                category: Category::Literature,
                scheme: link.source.identifier.scheme,
                id: link.source.identifier.id,
                title: String::new(),
            });
            rows.push(AccessionRow {
                category,
                scheme: link.target.identifier.scheme,
                id: link.target.identifier.id,
                title: link.target.title,
            });
        }
    }
    Ok(rows)
}

/// Which categories to extract and where their files go.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    workdir: PathBuf,
    files: Vec<(Category, String)>,
}

impl ExtractorConfig {
    /// Every known category with its default file name, inside `workdir`.
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            files: Category::ALL
                .iter()
                .map(|c| (*c, c.default_file().to_string()))
                .collect(),
        }
    }

    /// Start from an explicit category map instead of the defaults.
    pub fn with_files(mut self, files: Vec<(Category, String)>) -> Self {
        self.files = files;
        self
    }

    /// Route `category` to `file`, adding it if absent.
    pub fn with_file(mut self, category: Category, file: impl Into<String>) -> Self {
        let file = file.into();
        match self.files.iter_mut().find(|(c, _)| *c == category) {
            Some(entry) => entry.1 = file,
            None => self.files.push((category, file)),
        }
        self
    }

    /// Output directory.
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Configured categories.
    pub fn categories(&self) -> HashSet<Category> {
        self.files.iter().map(|(c, _)| *c).collect()
    }

    /// Check the map before any file is touched.
    pub fn validate(&self) -> Result<()> {
        let mut seen_categories = HashSet::new();
        let mut seen_files = HashSet::new();
        for (category, file) in &self.files {
            if file.trim().is_empty() {
                return Err(EtlError::Config(format!("empty file name for {category}")));
            }
            if !seen_categories.insert(*category) {
                return Err(EtlError::Config(format!("{category} is configured twice")));
            }
            if !seen_files.insert(file.as_str()) {
                return Err(EtlError::Config(format!("{file} is used by more than one category")));
            }
        }
        if !seen_categories.contains(&Category::Literature) {
            return Err(EtlError::Config(
                "the literature sink is required, every link writes to it".to_string(),
            ));
        }
        Ok(())
    }
}

/// An open extraction: one write handle per configured category.
///
/// Handles are released by [`ExtractionSession::close`] or, on any other exit
/// path, when the session is dropped.
#[derive(Debug)]
pub struct ExtractionSession {
    sinks: HashMap<Category, BufWriter<File>>,
    categories: HashSet<Category>,
    rows_written: u64,
}

impl ExtractionSession {
    /// Validate `config`, create the workdir if needed and open every sink.
    ///
    /// Existing files are truncated.
    pub fn open(config: &ExtractorConfig) -> Result<Self> {
        config.validate()?;

        let workdir = config.workdir();
        std::fs::create_dir_all(workdir).map_err(|e| {
            EtlError::Config(format!("'{}' could not be created: {e}", workdir.display()))
        })?;

        let mut sinks = HashMap::new();
        for (category, file) in &config.files {
            let path = workdir.join(file);
            tracing::debug!(%category, path = %path.display(), "opening sink");
            sinks.insert(*category, BufWriter::new(File::create(&path)?));
        }
        tracing::info!(workdir = %workdir.display(), sinks = sinks.len(), "extraction session opened");

        Ok(Self {
            sinks,
            categories: config.categories(),
            rows_written: 0,
        })
    }

    /// Rows written so far.
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Classify one document and write its rows. Returns the number written.
    ///
    /// A structural error leaves every sink untouched for that document.
    pub fn save_data(&mut self, doc: &Value) -> Result<usize> {
        let rows = links_entry(doc, &self.categories)?;
        if rows.is_empty() {
            tracing::debug!(name = ?doc.get("Name"), "no rows for document");
        }

        let mut written = 0;
        for row in rows.iter().filter(|row| !row.is_suppressed()) {
            let sink = self.sinks.get_mut(&row.category).ok_or_else(|| {
                EtlError::Config(format!("no sink open for {}", row.category))
            })?;
            sink.write_all(row.to_csv_line().as_bytes())?;
            written += 1;
        }
        self.rows_written += written as u64;
        Ok(written)
    }

    /// Feed a JSON-lines stream through [`Self::save_data`].
    ///
    /// Blank lines are skipped. The first bad line aborts with its error,
    /// after logging the offending document.
    pub fn extract_lines<R: BufRead>(&mut self, input: R) -> Result<u64> {
        let mut rows = 0;
        for (lineno, line) in input.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let doc: Value = serde_json::from_str(&line).map_err(|e| {
                tracing::error!(line = lineno + 1, error = %e, raw = %line, "invalid JSON line");
                e
            })?;
            match self.save_data(&doc) {
                Ok(n) => rows += n as u64,
                Err(e) => {
                    tracing::error!(line = lineno + 1, error = %e, "extraction failed");
                    return Err(e);
                }
            }
        }
        Ok(rows)
    }

    /// Flush and release every sink. All sinks are flushed even if one fails;
    /// the first failure is returned.
    pub fn close(mut self) -> Result<()> {
        let mut first_err = None;
        for (category, mut sink) in self.sinks.drain() {
            if let Err(e) = sink.flush() {
                tracing::error!(%category, error = %e, "failed to flush sink");
                first_err.get_or_insert(e);
            }
        }
        tracing::info!(rows = self.rows_written, "extraction session closed");
        match first_err {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}

/// Open a session, run `f`, and close the session whatever `f` returned.
///
/// An error from `f` takes precedence over an error from closing.
pub fn with_session<T, F>(config: ExtractorConfig, f: F) -> Result<T>
where
    F: FnOnce(&mut ExtractionSession) -> Result<T>,
{
    let mut session = ExtractionSession::open(&config)?;
    let result = f(&mut session);
    let closed = session.close();
    let value = result?;
    closed?;
    Ok(value)
}
