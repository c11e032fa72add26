//! Fetch request and outcome models.

use serde::{Deserialize, Serialize};

use super::RawPaper;

/// Default bound on the esearch id list
pub const DEFAULT_MAX_RESULTS: usize = 100;

/// Fetch query parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchQuery {
    /// Search expression in PubMed query syntax
    pub query: String,

    /// Maximum number of record identifiers to resolve (no pagination past this)
    pub max_results: usize,
}

impl FetchQuery {
    /// Create a new fetch query with the default result bound
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    /// Set maximum results
    pub fn max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }
}

/// A required element that a record did not carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissingField {
    /// No `PMID` element
    PubmedId,
    /// No `ArticleTitle` element
    Title,
}

impl MissingField {
    /// XML element name of the missing field
    pub fn element(&self) -> &'static str {
        match self {
            MissingField::PubmedId => "PMID",
            MissingField::Title => "ArticleTitle",
        }
    }
}

impl std::fmt::Display for MissingField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.element())
    }
}

/// A record that was dropped during parsing instead of aborting the fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRecord {
    /// Zero-based position of the `PubmedArticle` in the efetch payload
    pub index: usize,

    /// PMID, when the record had one
    pub pubmed_id: Option<String>,

    /// First required field found missing
    pub reason: MissingField,
}

impl std::fmt::Display for SkippedRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.pubmed_id {
            Some(pmid) => write!(
                f,
                "record #{} (PMID {}) skipped: missing field {}",
                self.index, pmid, self.reason
            ),
            None => write!(
                f,
                "record #{} skipped: missing field {}",
                self.index, self.reason
            ),
        }
    }
}

/// Result of one fetch: the parsed papers plus the records that were skipped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchOutcome {
    /// Successfully parsed papers, in payload order
    pub papers: Vec<RawPaper>,

    /// Records dropped for missing required fields
    pub skipped: Vec<SkippedRecord>,
}

impl FetchOutcome {
    /// Create an outcome with no skipped records
    pub fn new(papers: Vec<RawPaper>) -> Self {
        Self {
            papers,
            skipped: Vec::new(),
        }
    }

    /// Create an empty outcome
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of parsed papers
    pub fn len(&self) -> usize {
        self.papers.len()
    }

    /// Whether no papers were parsed
    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }
}
