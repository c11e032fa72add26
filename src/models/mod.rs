//! Core data models for fetched and classified papers.

mod paper;
mod search;

pub use paper::{
    ClassifiedPaper, RawPaper, RawPaperBuilder, NO_EMAIL, UNKNOWN_AUTHOR, UNKNOWN_DATE,
};
pub use search::{FetchOutcome, FetchQuery, MissingField, SkippedRecord, DEFAULT_MAX_RESULTS};
