//! Commercial-affiliation classifier.
//!
//! A paper is kept when at least one of its affiliations contains one of the
//! configured keywords, compared case-insensitively. Kept papers are reshaped
//! into [`ClassifiedPaper`]s in input order.

use serde::{Deserialize, Serialize};

use crate::models::{ClassifiedPaper, RawPaper};

/// Keywords that mark an affiliation as a pharmaceutical or biotech company
pub const DEFAULT_KEYWORDS: [&str; 6] = [
    "pharma",
    "biotech",
    "biotechnology",
    "corporation",
    "biopharma",
    "drug",
];

/// An ordered set of lowercase commercial keywords
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct KeywordSet {
    keywords: Vec<String>,
}

impl KeywordSet {
    /// Build a keyword set; keywords are lowercased, blanks dropped, order kept
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for keyword in keywords {
            let keyword = keyword.as_ref().trim().to_lowercase();
            if !keyword.is_empty() && !normalized.contains(&keyword) {
                normalized.push(keyword);
            }
        }
        Self {
            keywords: normalized,
        }
    }

    /// The keywords, in match order
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// Number of keywords contained in `affiliation`
    pub fn match_count(&self, affiliation: &str) -> usize {
        let haystack = affiliation.to_lowercase();
        self.keywords
            .iter()
            .filter(|keyword| haystack.contains(keyword.as_str()))
            .count()
    }
}

impl Default for KeywordSet {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORDS)
    }
}

impl From<Vec<String>> for KeywordSet {
    fn from(keywords: Vec<String>) -> Self {
        Self::new(keywords)
    }
}

impl From<KeywordSet> for Vec<String> {
    fn from(set: KeywordSet) -> Self {
        set.keywords
    }
}

/// Affiliations of `paper` that match, repeated once per matching keyword.
///
/// "Acme Biotechnology" matches both `biotech` and `biotechnology` and so
/// appears twice.
pub fn matching_affiliations<'a>(paper: &'a RawPaper, keywords: &KeywordSet) -> Vec<&'a str> {
    paper
        .affiliations
        .iter()
        .flat_map(|affiliation| {
            std::iter::repeat(affiliation.as_str()).take(keywords.match_count(affiliation))
        })
        .collect()
}

/// Reshape one paper, or `None` if no affiliation matches
pub fn classify_paper(paper: &RawPaper, keywords: &KeywordSet) -> Option<ClassifiedPaper> {
    let company_affiliations = matching_affiliations(paper, keywords);
    if company_affiliations.is_empty() {
        return None;
    }

    Some(ClassifiedPaper {
        pubmed_id: paper.pubmed_id.clone(),
        title: paper.title.clone(),
        publication_date: paper.publication_date.clone(),
        non_academic_authors: paper.authors.join(", "),
        company_affiliations: company_affiliations.join(", "),
        corresponding_email: paper.corresponding_email.clone(),
    })
}

/// Keep papers with a commercial affiliation, preserving input order
pub fn classify(papers: &[RawPaper], keywords: &KeywordSet) -> Vec<ClassifiedPaper> {
    let classified: Vec<ClassifiedPaper> = papers
        .iter()
        .filter_map(|paper| classify_paper(paper, keywords))
        .collect();

    tracing::debug!(
        input = papers.len(),
        classified = classified.len(),
        "Classified papers by affiliation"
    );

    classified
}
