//! Paper models: the raw record parsed from PubMed and the narrower classified view.

use serde::{Deserialize, Serialize};

/// Publication date used when a record has no `PubDate` element
pub const UNKNOWN_DATE: &str = "Unknown";

/// Author entry used when either name part is missing
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// Email value used when neither extraction strategy finds an address
pub const NO_EMAIL: &str = "N/A";

/// A paper as parsed from one `PubmedArticle` record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPaper {
    /// PubMed identifier (PMID)
    pub pubmed_id: String,

    /// Article title
    pub title: String,

    /// `Y-M-D`, a bare year, a MedlineDate range, or `Unknown`
    pub publication_date: String,

    /// Authors formatted `LastName, ForeName`, in record order
    pub authors: Vec<String>,

    /// Raw affiliation strings, in record order
    pub affiliations: Vec<String>,

    /// Corresponding author email, or `N/A`
    pub corresponding_email: String,
}

impl RawPaper {
    /// Create a paper with the required fields and sentinel defaults for the rest
    pub fn new(pubmed_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            pubmed_id: pubmed_id.into(),
            title: title.into(),
            publication_date: UNKNOWN_DATE.to_string(),
            authors: Vec::new(),
            affiliations: Vec::new(),
            corresponding_email: NO_EMAIL.to_string(),
        }
    }
}

/// Builder for constructing RawPaper objects
#[derive(Debug, Clone)]
pub struct RawPaperBuilder {
    paper: RawPaper,
}

impl RawPaperBuilder {
    /// Create a new builder with required fields
    pub fn new(pubmed_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            paper: RawPaper::new(pubmed_id, title),
        }
    }

    /// Set publication date
    pub fn publication_date(mut self, date: impl Into<String>) -> Self {
        self.paper.publication_date = date.into();
        self
    }

    /// Append one author
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.paper.authors.push(author.into());
        self
    }

    /// Replace the author list
    pub fn authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.paper.authors = authors.into_iter().map(Into::into).collect();
        self
    }

    /// Append one affiliation
    pub fn affiliation(mut self, affiliation: impl Into<String>) -> Self {
        self.paper.affiliations.push(affiliation.into());
        self
    }

    /// Replace the affiliation list
    pub fn affiliations<I, S>(mut self, affiliations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.paper.affiliations = affiliations.into_iter().map(Into::into).collect();
        self
    }

    /// Set corresponding author email
    pub fn corresponding_email(mut self, email: impl Into<String>) -> Self {
        self.paper.corresponding_email = email.into();
        self
    }

    /// Build the RawPaper
    pub fn build(self) -> RawPaper {
        self.paper
    }
}

/// A paper with at least one commercial affiliation, shaped for output.
///
/// Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedPaper {
    #[serde(rename = "PubmedID")]
    pub pubmed_id: String,

    #[serde(rename = "Title")]
    pub title: String,

    #[serde(rename = "Publication Date")]
    pub publication_date: String,

    /// Every author of the paper, comma-joined.
    ///
    /// Authors are not filtered by their own affiliation; the column lists the
    /// whole author list of any paper that has a commercial affiliation.
    #[serde(rename = "Non-academic Author(s)")]
    pub non_academic_authors: String,

    /// Matching affiliations, comma-joined, once per keyword hit
    #[serde(rename = "Company Affiliation(s)")]
    pub company_affiliations: String,

    #[serde(rename = "Corresponding Author Email")]
    pub corresponding_email: String,
}

impl ClassifiedPaper {
    /// CSV header, in column order
    pub const HEADERS: [&'static str; 6] = [
        "PubmedID",
        "Title",
        "Publication Date",
        "Non-academic Author(s)",
        "Company Affiliation(s)",
        "Corresponding Author Email",
    ];
}
