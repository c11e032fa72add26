//! # Pharma Papers
//!
//! Fetch PubMed papers for a query and list those with at least one author
//! affiliated with a pharmaceutical or biotech company.
//!
//! ## Architecture
//!
//! The run is a one-way pipeline: fetch, classify, write.
//!
//! - [`sources`]: the [`Source`] trait and the PubMed E-utilities implementation
//! - [`classify`]: keyword-based commercial-affiliation classifier
//! - [`output`]: CSV and console sinks
//! - [`pipeline`]: composes fetch and classify into one call
//! - [`models`]: raw and classified paper records
//! - [`config`]: configuration management
//! - [`utils`]: HTTP client

pub mod classify;
pub mod config;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod sources;
pub mod utils;

// Re-export commonly used types
pub use classify::{classify, KeywordSet};
pub use models::{ClassifiedPaper, FetchQuery, RawPaper};
pub use output::write_papers;
pub use sources::{PubMedSource, Source, SourceError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
