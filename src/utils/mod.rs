//! Utility modules supporting the fetch pipeline.
//!
//! - [`HttpClient`]: shared reqwest client with a user agent and timeouts
//!
//! # HTTP Client
//!
//! ```rust,no_run
//! use pharma_papers::utils::HttpClient;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new()?;
//! let response = client.get("https://eutils.ncbi.nlm.nih.gov/").send().await?;
//! # Ok(())
//! # }
//! ```

mod http;

pub use http::{HttpClient, DEFAULT_TIMEOUT_SECS};
