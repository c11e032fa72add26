//! PubMed research source implementation using E-utilities API.

mod fields;
mod parse;

use async_trait::async_trait;
use quick_xml::de::from_str;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::config::PubMedConfig;
use crate::models::{FetchOutcome, FetchQuery};
use crate::sources::{Source, SourceError};
use crate::utils::HttpClient;

pub use fields::scan_email;
pub use parse::parse_fetch_response;

/// PubMed E-utilities API base URLs
pub const PUBMED_ESEARCH_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/esearch.fcgi";
pub const PUBMED_EFETCH_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/efetch.fcgi";

/// PubMed research source
///
/// Uses NCBI E-utilities: one esearch call for the id list, then one efetch
/// call for all records.
#[derive(Debug, Clone)]
pub struct PubMedSource {
    client: Arc<HttpClient>,
    esearch_url: String,
    efetch_url: String,
    tool: String,
    email: Option<String>,
    api_key: Option<String>,
}

impl PubMedSource {
    /// Create a new PubMed source with default settings
    pub fn new() -> Result<Self, SourceError> {
        Self::from_config(&PubMedConfig::default())
    }

    /// Create a PubMed source from configuration
    pub fn from_config(config: &PubMedConfig) -> Result<Self, SourceError> {
        let client = HttpClient::with_timeout(Duration::from_secs(config.timeout_secs))?;
        Ok(Self {
            client: Arc::new(client),
            esearch_url: config.esearch_url.clone(),
            efetch_url: config.efetch_url.clone(),
            tool: config.tool.clone(),
            email: config.email.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Point both endpoints at another host (used against mock servers)
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        self.esearch_url = format!("{}/esearch.fcgi", base);
        self.efetch_url = format!("{}/efetch.fcgi", base);
        self
    }

    /// NCBI identification parameters shared by both calls
    fn identity_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("tool".to_string(), self.tool.clone())];
        if let Some(email) = &self.email {
            params.push(("email".to_string(), email.clone()));
        }
        if let Some(key) = &self.api_key {
            params.push(("api_key".to_string(), key.clone()));
        }
        params
    }

    fn encode(params: &[(String, String)]) -> String {
        params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Build E-utilities search query string
    fn build_search_url(&self, query: &FetchQuery) -> String {
        let mut params = vec![
            ("db".to_string(), "pubmed".to_string()),
            ("term".to_string(), query.query.clone()),
            ("retmax".to_string(), query.max_results.to_string()),
            ("retmode".to_string(), "xml".to_string()),
        ];
        params.extend(self.identity_params());

        format!("{}?{}", self.esearch_url, Self::encode(&params))
    }

    /// Build E-utilities fetch URL for specific PubMed IDs
    fn build_fetch_url(&self, ids: &[String]) -> String {
        let mut params = vec![
            ("db".to_string(), "pubmed".to_string()),
            ("id".to_string(), ids.join(",")),
            ("rettype".to_string(), "xml".to_string()),
            ("retmode".to_string(), "xml".to_string()),
        ];
        params.extend(self.identity_params());

        format!("{}?{}", self.efetch_url, Self::encode(&params))
    }

    /// GET a URL and return the body, failing on any non-success status
    async fn get_text(&self, url: &str, what: &str) -> Result<String, SourceError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to {}: {}", what, e)))?;

        if !response.status().is_success() {
            return Err(SourceError::Api(format!(
                "PubMed API returned status: {}",
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to read response: {}", e)))
    }

    /// Resolve a query to an ordered list of PMIDs
    pub async fn search_ids(&self, query: &FetchQuery) -> Result<Vec<String>, SourceError> {
        let url = self.build_search_url(query);
        tracing::debug!(%url, "PubMed esearch");

        let xml = self.get_text(&url, "search PubMed").await?;
        let ids = parse_search_response(&xml)?;

        tracing::debug!(count = ids.len(), "PubMed esearch returned PMIDs");
        Ok(ids)
    }

    /// Fetch full records for a list of PMIDs in a single request
    pub async fn fetch_records(&self, ids: &[String]) -> Result<FetchOutcome, SourceError> {
        if ids.is_empty() {
            return Ok(FetchOutcome::empty());
        }

        let url = self.build_fetch_url(ids);
        tracing::debug!(count = ids.len(), "PubMed efetch");

        let xml = self.get_text(&url, "fetch PubMed details").await?;
        parse_fetch_response(&xml)
    }
}

/// Parse E-utilities search response XML
pub fn parse_search_response(xml: &str) -> Result<Vec<String>, SourceError> {
    #[derive(Debug, Deserialize)]
    #[allow(non_snake_case)]
    struct ESearchResult {
        #[serde(default)]
        IdList: Option<IdList>,
        #[serde(rename = "ERROR", default)]
        error: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    #[allow(non_snake_case)]
    struct IdList {
        #[serde(rename = "Id", default)]
        ids: Vec<String>,
    }

    let result: ESearchResult = from_str(xml)
        .map_err(|e| SourceError::Parse(format!("Failed to parse PubMed search XML: {}", e)))?;

    if let Some(error) = result.error {
        return Err(SourceError::Api(format!("PubMed search error: {}", error)));
    }

    Ok(result.IdList.map(|list| list.ids).unwrap_or_default())
}

#[async_trait]
impl Source for PubMedSource {
    fn id(&self) -> &str {
        "pubmed"
    }

    fn name(&self) -> &str {
        "PubMed"
    }

    async fn fetch(&self, query: &FetchQuery) -> Result<FetchOutcome, SourceError> {
        if query.query.trim().is_empty() {
            return Err(SourceError::InvalidRequest(
                "search query must not be empty".to_string(),
            ));
        }

        let ids = self.search_ids(query).await?;
        if ids.is_empty() {
            tracing::info!(query = %query.query, "PubMed search returned no records");
            return Ok(FetchOutcome::empty());
        }

        let outcome = self.fetch_records(&ids).await?;
        tracing::info!(
            requested = ids.len(),
            parsed = outcome.papers.len(),
            skipped = outcome.skipped.len(),
            "Fetched PubMed records"
        );

        Ok(outcome)
    }
}
