//! Field-extraction policy for PubMed records.
//!
//! Soft-missing fields degrade to sentinel values here and never fail.

use regex::Regex;
use std::sync::OnceLock;

use crate::models::{NO_EMAIL, UNKNOWN_AUTHOR, UNKNOWN_DATE};

/// Sub-elements of the first `PubDate` of a record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct PubDateParts {
    pub year: Option<String>,
    pub month: Option<String>,
    pub day: Option<String>,
    pub medline_date: Option<String>,
}

/// Name parts of one `Author` element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct AuthorName {
    pub last_name: Option<String>,
    pub fore_name: Option<String>,
}

/// Format a publication date.
///
/// All three parts give `Y-M-D`, a year alone gives the year. A `PubDate`
/// without a year falls back to its `MedlineDate` text; no `PubDate` at all
/// is `Unknown`.
pub(crate) fn format_pub_date(pub_date: Option<&PubDateParts>) -> String {
    let Some(parts) = pub_date else {
        return UNKNOWN_DATE.to_string();
    };

    match (&parts.year, &parts.month, &parts.day) {
        (Some(year), Some(month), Some(day)) => format!("{}-{}-{}", year, month, day),
        (Some(year), _, _) => year.clone(),
        (None, _, _) => parts
            .medline_date
            .clone()
            .unwrap_or_else(|| UNKNOWN_DATE.to_string()),
    }
}

/// Format an author as `LastName, ForeName`, or `Unknown Author` if either part is missing
pub(crate) fn format_author(author: &AuthorName) -> String {
    match (&author.last_name, &author.fore_name) {
        (Some(last), Some(fore)) => format!("{}, {}", last, fore),
        _ => UNKNOWN_AUTHOR.to_string(),
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}")
            .expect("email pattern is valid")
    })
}

/// First email address found in free text
pub fn scan_email(text: &str) -> Option<String> {
    email_regex().find(text).map(|m| m.as_str().to_string())
}

/// Resolve the corresponding email.
///
/// The structured `CorrespondingAuthor/Email` value wins. Otherwise the
/// affiliation text is scanned, and `N/A` is used when that finds nothing.
pub(crate) fn resolve_email(structured: Option<&str>, affiliations: &[String]) -> String {
    if let Some(email) = structured {
        return email.to_string();
    }

    let text = affiliations.join(" ");
    tracing::debug!(affiliation_text = %text, "No structured email, scanning affiliations");

    scan_email(&text).unwrap_or_else(|| NO_EMAIL.to_string())
}
