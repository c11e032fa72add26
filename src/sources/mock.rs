//! Mock source for testing purposes.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::models::{FetchOutcome, FetchQuery, RawPaper, RawPaperBuilder};
use crate::sources::{Source, SourceError};

/// A mock source for testing that returns predefined outcomes.
///
/// Without a configured outcome it returns nothing. `max_results` is honoured
/// by truncating the configured paper list.
#[derive(Debug, Default)]
pub struct MockSource {
    outcome: Mutex<Option<FetchOutcome>>,
    fail_with: Mutex<Option<String>>,
}

impl MockSource {
    /// Create a new mock source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock source that returns the given papers.
    pub fn with_papers(papers: Vec<RawPaper>) -> Self {
        let source = Self::new();
        source.set_outcome(FetchOutcome::new(papers));
        source
    }

    /// Set the outcome to return.
    pub fn set_outcome(&self, outcome: FetchOutcome) {
        if let Ok(mut guard) = self.outcome.lock() {
            *guard = Some(outcome);
        }
    }

    /// Make every fetch fail with a network error carrying `message`.
    pub fn set_failure(&self, message: impl Into<String>) {
        if let Ok(mut guard) = self.fail_with.lock() {
            *guard = Some(message.into());
        }
    }

    /// Clear the configured outcome and failure.
    pub fn clear(&self) {
        if let Ok(mut guard) = self.outcome.lock() {
            *guard = None;
        }
        if let Ok(mut guard) = self.fail_with.lock() {
            *guard = None;
        }
    }
}

#[async_trait]
impl Source for MockSource {
    fn id(&self) -> &str {
        "mock"
    }

    fn name(&self) -> &str {
        "Mock Source"
    }

    async fn fetch(&self, query: &FetchQuery) -> Result<FetchOutcome, SourceError> {
        let failure = self
            .fail_with
            .lock()
            .map_err(|e| SourceError::Other(e.to_string()))?
            .clone();
        if let Some(message) = failure {
            return Err(SourceError::Network(message));
        }

        let guard = self
            .outcome
            .lock()
            .map_err(|e| SourceError::Other(e.to_string()))?;
        let mut outcome = guard.clone().unwrap_or_default();
        outcome.papers.truncate(query.max_results);
        Ok(outcome)
    }
}

/// Helper function to create a mock paper for testing.
pub fn make_paper(pubmed_id: &str, authors: &[&str], affiliations: &[&str]) -> RawPaper {
    RawPaperBuilder::new(pubmed_id, format!("Paper {}", pubmed_id))
        .publication_date("2024")
        .authors(authors.iter().copied())
        .affiliations(affiliations.iter().copied())
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_returns_configured_papers() {
        let source = MockSource::with_papers(vec![
            make_paper("1", &["Doe, Jane"], &["Acme Pharma"]),
            make_paper("2", &[], &[]),
        ]);

        let outcome = source.fetch(&FetchQuery::new("x")).await.unwrap();
        assert_eq!(outcome.papers.len(), 2);

        let outcome = source
            .fetch(&FetchQuery::new("x").max_results(1))
            .await
            .unwrap();
        assert_eq!(outcome.papers.len(), 1);
        assert_eq!(outcome.papers[0].pubmed_id, "1");
    }

    #[test]
    fn test_mock_failure_and_clear() {
        let source = MockSource::new();
        source.set_failure("connection refused");
        let result = tokio_test::block_on(source.fetch(&FetchQuery::new("x")));
        assert!(matches!(result, Err(SourceError::Network(_))));

        source.clear();
        let outcome = tokio_test::block_on(source.fetch(&FetchQuery::new("x"))).unwrap();
        assert!(outcome.is_empty());
    }
}
