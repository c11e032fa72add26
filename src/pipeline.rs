//! Fetch → classify composition.
//!
//! The sink is left to the caller so the same report can go to a file, the
//! console, or a test assertion.

use serde::Serialize;

use crate::classify::{classify, KeywordSet};
use crate::models::{ClassifiedPaper, FetchQuery, SkippedRecord};
use crate::sources::{Source, SourceError};

/// What one pipeline run produced
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    /// Papers parsed from the source
    pub fetched: usize,

    /// Records the source could not parse, reported as warnings
    pub skipped: Vec<SkippedRecord>,

    /// Papers with at least one commercial affiliation, in fetch order
    pub classified: Vec<ClassifiedPaper>,
}

/// Fetch papers for `query` from `source` and keep those with a commercial affiliation
pub async fn run(
    source: &dyn Source,
    query: &FetchQuery,
    keywords: &KeywordSet,
) -> Result<PipelineReport, SourceError> {
    tracing::info!(
        source = source.id(),
        query = %query.query,
        max_results = query.max_results,
        "Fetching papers from {}",
        source.name()
    );

    let outcome = source.fetch(query).await?;
    tracing::debug!("Fetched {} papers", outcome.papers.len());

    for skipped in &outcome.skipped {
        tracing::warn!(source = source.id(), "{}", skipped);
    }

    let classified = classify(&outcome.papers, keywords);
    tracing::debug!("Filtered {} papers", classified.len());

    Ok(PipelineReport {
        fetched: outcome.papers.len(),
        skipped: outcome.skipped,
        classified,
    })
}
