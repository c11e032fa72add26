//! Literature sources behind a small trait seam.
//!
//! The pipeline only needs one operation from a source: resolve a query to a
//! bounded set of records and return them parsed. [`PubMedSource`] talks to
//! NCBI E-utilities; [`MockSource`] returns canned papers for tests.

pub mod mock;
mod pubmed;

pub use mock::MockSource;
pub use pubmed::{
    parse_fetch_response, parse_search_response, scan_email, PubMedSource, PUBMED_EFETCH_URL,
    PUBMED_ESEARCH_URL,
};

use crate::models::{FetchOutcome, FetchQuery};
use async_trait::async_trait;

/// The Source trait defines the interface for literature sources.
///
/// A source performs one search call and one bulk detail call per fetch. It
/// does not retry, cache or paginate.
#[async_trait]
pub trait Source: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this source (e.g., "pubmed")
    fn id(&self) -> &str;

    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// Fetch and parse up to `query.max_results` records matching the query
    async fn fetch(&self, query: &FetchQuery) -> Result<FetchOutcome, SourceError>;
}

/// Errors that can occur when interacting with a source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(String),

    /// Parsing error (XML)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// API error from the source (non-success status or error payload)
    #[error("API error: {0}")]
    Api(String),

    /// Other error
    #[error("Error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Network(err.to_string())
    }
}

impl From<quick_xml::DeError> for SourceError {
    fn from(err: quick_xml::DeError) -> Self {
        SourceError::Parse(format!("XML: {}", err))
    }
}

impl From<quick_xml::Error> for SourceError {
    fn from(err: quick_xml::Error) -> Self {
        SourceError::Parse(format!("XML: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_error_messages() {
        let err = SourceError::Api("PubMed API returned status: 500".to_string());
        assert_eq!(err.to_string(), "API error: PubMed API returned status: 500");

        let err = SourceError::Parse("bad xml".to_string());
        assert!(err.to_string().starts_with("Parse error"));
    }
}
