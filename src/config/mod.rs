//! Configuration management.
//!
//! Every setting has a default, so a config file is optional. A TOML file
//! looks like:
//!
//! ```toml
//! [pubmed]
//! email = "you@example.org"
//! api_key = "ncbi-key"
//! max_results = 50
//! timeout_secs = 60
//!
//! [classifier]
//! keywords = ["pharma", "biotech", "gmbh"]
//!
//! [output]
//! format = "table"
//! ```
//!
//! Environment variables prefixed `PHARMA_PAPERS_` override file values, with
//! `__` between section and key (e.g. `PHARMA_PAPERS_PUBMED__EMAIL`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::classify::KeywordSet;
use crate::models::DEFAULT_MAX_RESULTS;
use crate::output::ConsoleFormat;
use crate::sources::{PUBMED_EFETCH_URL, PUBMED_ESEARCH_URL};
use crate::utils::DEFAULT_TIMEOUT_SECS;

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "PHARMA_PAPERS";

/// File name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "pharma-papers.toml";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// PubMed E-utilities settings
    #[serde(default)]
    pub pubmed: PubMedConfig,

    /// Commercial-affiliation classifier settings
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Console output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// PubMed E-utilities configuration
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct PubMedConfig {
    #[serde(default = "default_esearch_url")]
    pub esearch_url: String,

    #[serde(default = "default_efetch_url")]
    pub efetch_url: String,

    /// Tool name reported to NCBI
    #[serde(default = "default_tool")]
    pub tool: String,

    /// Contact email reported to NCBI
    #[serde(default = "default_email")]
    pub email: Option<String>,

    /// NCBI API key (optional, for higher rate limits)
    #[serde(default = "default_api_key")]
    pub api_key: Option<String>,

    /// Upper bound on the esearch id list
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for PubMedConfig {
    fn default() -> Self {
        Self {
            esearch_url: default_esearch_url(),
            efetch_url: default_efetch_url(),
            tool: default_tool(),
            email: default_email(),
            api_key: default_api_key(),
            max_results: default_max_results(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl fmt::Debug for PubMedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PubMedConfig")
            .field("esearch_url", &self.esearch_url)
            .field("efetch_url", &self.efetch_url)
            .field("tool", &self.tool)
            .field("email", &self.email)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("max_results", &self.max_results)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn default_esearch_url() -> String {
    PUBMED_ESEARCH_URL.to_string()
}

fn default_efetch_url() -> String {
    PUBMED_EFETCH_URL.to_string()
}

fn default_tool() -> String {
    env!("CARGO_PKG_NAME").to_string()
}

fn default_email() -> Option<String> {
    std::env::var("NCBI_EMAIL").ok()
}

fn default_api_key() -> Option<String> {
    std::env::var("NCBI_API_KEY").ok()
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Classifier configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Commercial keywords; replaces the built-in list when set
    #[serde(default)]
    pub keywords: KeywordSet,
}

/// Console output configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: ConsoleFormat,
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("classifier.keywords")
        .try_parsing(true)
}

fn build(file: Option<&Path>, env: config::Environment) -> Result<Config, config::ConfigError> {
    let mut builder = config::Config::builder();
    if let Some(path) = file {
        builder = builder.add_source(config::File::from(path));
    }

    builder.add_source(env).build()?.try_deserialize()
}

/// Load configuration from a file, with environment overrides
pub fn load_config(path: &Path) -> Result<Config, config::ConfigError> {
    build(Some(path), environment())
}

/// Load configuration from defaults and environment overrides only
pub fn load_env_config() -> Result<Config, config::ConfigError> {
    build(None, environment())
}

/// Find a config file in the working directory or the user config directory
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("pharma-papers").join("config.toml"))
        .filter(|path| path.is_file())
}
