use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use pharma_papers::classify::KeywordSet;
use pharma_papers::config::{find_config_file, load_config, load_env_config, Config};
use pharma_papers::models::FetchQuery;
use pharma_papers::output::{write_papers, ConsoleFormat};
use pharma_papers::pipeline;
use pharma_papers::sources::PubMedSource;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Fetch PubMed papers with at least one pharmaceutical or biotech company affiliation
#[derive(Parser, Debug)]
#[command(name = "get-papers-list")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Fetch PubMed papers with authors from pharmaceutical or biotech companies", long_about = None)]
struct Cli {
    /// PubMed search query (full PubMed query syntax)
    query: String,

    /// Write results to this CSV file instead of the console
    #[arg(long, short)]
    file: Option<PathBuf>,

    /// Print debug information during execution
    #[arg(long, short)]
    debug: bool,

    /// Enable verbose logging (can be used multiple times: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,

    /// Maximum number of PubMed ids to fetch
    #[arg(long, short = 'n')]
    max_results: Option<usize>,

    /// Commercial keyword (repeatable; replaces the default list)
    #[arg(long = "keyword", short)]
    keywords: Vec<String>,

    /// Console output format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Contact email sent to NCBI
    #[arg(long)]
    email: Option<String>,

    /// NCBI API key
    #[arg(long)]
    api_key: Option<String>,

    /// Configuration file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
}

/// Console output format
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// One block of `Field: value` lines per paper
    Plain,
    /// Table format (human-readable)
    Table,
    /// JSON format (machine-readable)
    Json,
}

impl From<OutputFormat> for ConsoleFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Plain => ConsoleFormat::Plain,
            OutputFormat::Table => ConsoleFormat::Table,
            OutputFormat::Json => ConsoleFormat::Json,
        }
    }
}

impl Cli {
    fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose.saturating_add(u8::from(self.debug)) {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    /// Default log filter for both the library and this binary
    fn log_filter(&self) -> String {
        let level = self.log_level();
        format!("pharma_papers={level},get_papers_list={level}")
    }

    /// Apply command-line overrides on top of file and environment settings
    fn apply_to(&self, config: &mut Config) {
        if let Some(n) = self.max_results {
            config.pubmed.max_results = n;
        }
        if let Some(secs) = self.timeout {
            config.pubmed.timeout_secs = secs;
        }
        if let Some(email) = &self.email {
            config.pubmed.email = Some(email.clone());
        }
        if let Some(key) = &self.api_key {
            config.pubmed.api_key = Some(key.clone());
        }
        if !self.keywords.is_empty() {
            config.classifier.keywords = KeywordSet::new(self.keywords.iter().cloned());
        }
        if let Some(format) = self.format {
            config.output.format = format.into();
        }
    }
}

fn load_settings(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(path) = &cli.config {
        load_config(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?
    } else if let Some(path) = find_config_file() {
        tracing::info!("Using config file: {}", path.display());
        load_config(&path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?
    } else {
        load_env_config().context("Failed to read configuration from environment")?
    };

    cli.apply_to(&mut config);
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| cli.log_filter()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = load_settings(&cli)?;
    tracing::debug!(?config, "Resolved configuration");

    if config.classifier.keywords.is_empty() {
        anyhow::bail!("No commercial keywords configured");
    }

    let source =
        PubMedSource::from_config(&config.pubmed).context("Failed to create PubMed client")?;
    let query = FetchQuery::new(&cli.query).max_results(config.pubmed.max_results);

    let report = pipeline::run(&source, &query, &config.classifier.keywords)
        .await
        .with_context(|| format!("Failed to fetch papers for query {:?}", cli.query))?;

    tracing::info!(
        fetched = report.fetched,
        skipped = report.skipped.len(),
        matched = report.classified.len(),
        "Run complete"
    );

    write_papers(&report.classified, cli.file.as_deref(), config.output.format)
        .context("Failed to write results")?;

    if let Some(path) = &cli.file {
        if !cli.quiet {
            eprintln!("Results saved to {}", path.display());
        }
    }

    Ok(())
}
