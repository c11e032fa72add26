//! Streaming parser for efetch `PubmedArticleSet` payloads.
//!
//! Each `PubmedArticle` is read with descendant lookups: single-valued fields
//! take the first matching element in document order, list fields take every
//! matching element. Records without a `PMID` or `ArticleTitle` are reported
//! as skipped instead of failing the whole payload.

use quick_xml::events::Event;
use quick_xml::Reader;

use super::fields::{format_author, format_pub_date, resolve_email, AuthorName, PubDateParts};
use crate::models::{FetchOutcome, MissingField, RawPaper, SkippedRecord};
use crate::sources::SourceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Pmid,
    Title,
    Year,
    Month,
    Day,
    MedlineDate,
    LastName,
    ForeName,
    Affiliation,
    Email,
}

/// Text being collected for one element, including any nested markup
#[derive(Debug)]
struct Capture {
    field: Field,
    depth: usize,
    text: String,
}

/// Everything gathered for one `PubmedArticle` before the policy is applied
#[derive(Debug, Default)]
struct ArticleRecord {
    pmid: Option<String>,
    title: Option<String>,
    pub_date: Option<PubDateParts>,
    in_pub_date: bool,
    authors: Vec<AuthorName>,
    affiliations: Vec<String>,
    structured_email: Option<String>,
}

impl ArticleRecord {
    /// Handle an opening tag; returns the field to capture, if any
    fn open(&mut self, name: &[u8], parent: Option<&[u8]>) -> Option<Field> {
        match name {
            b"PMID" if self.pmid.is_none() => Some(Field::Pmid),
            b"ArticleTitle" if self.title.is_none() => Some(Field::Title),
            b"PubDate" => {
                if self.pub_date.is_none() {
                    self.pub_date = Some(PubDateParts::default());
                    self.in_pub_date = true;
                }
                None
            }
            b"Year" | b"Month" | b"Day" | b"MedlineDate"
                if self.in_pub_date && parent == Some(b"PubDate".as_slice()) =>
            {
                match name {
                    b"Year" => Some(Field::Year),
                    b"Month" => Some(Field::Month),
                    b"Day" => Some(Field::Day),
                    _ => Some(Field::MedlineDate),
                }
            }
            b"Author" => {
                self.authors.push(AuthorName::default());
                None
            }
            b"LastName" if parent == Some(b"Author".as_slice()) => Some(Field::LastName),
            b"ForeName" if parent == Some(b"Author".as_slice()) => Some(Field::ForeName),
            b"Affiliation" => Some(Field::Affiliation),
            b"Email"
                if parent == Some(b"CorrespondingAuthor".as_slice())
                    && self.structured_email.is_none() =>
            {
                Some(Field::Email)
            }
            _ => None,
        }
    }

    /// Handle a self-closing tag, which has no text to capture
    fn open_empty(&mut self, name: &[u8]) {
        match name {
            b"Author" => self.authors.push(AuthorName::default()),
            b"PubDate" if self.pub_date.is_none() => {
                self.pub_date = Some(PubDateParts::default());
            }
            b"ArticleTitle" if self.title.is_none() => self.title = Some(String::new()),
            _ => {}
        }
    }

    fn close(&mut self, name: &[u8]) {
        if name == b"PubDate" {
            self.in_pub_date = false;
        }
    }

    fn store(&mut self, field: Field, raw: String) {
        let text = raw.trim().to_string();
        let non_empty = (!text.is_empty()).then(|| text.clone());

        match field {
            Field::Pmid => self.pmid = non_empty,
            // Title and affiliations keep their text as written
            Field::Title => self.title = Some(raw),
            Field::Year | Field::Month | Field::Day | Field::MedlineDate => {
                if let Some(parts) = self.pub_date.as_mut() {
                    let slot = match field {
                        Field::Year => &mut parts.year,
                        Field::Month => &mut parts.month,
                        Field::Day => &mut parts.day,
                        _ => &mut parts.medline_date,
                    };
                    *slot = non_empty;
                }
            }
            Field::LastName => {
                if let Some(author) = self.authors.last_mut() {
                    author.last_name = non_empty;
                }
            }
            Field::ForeName => {
                if let Some(author) = self.authors.last_mut() {
                    author.fore_name = non_empty;
                }
            }
            Field::Affiliation => {
                if !text.is_empty() {
                    self.affiliations.push(raw);
                }
            }
            Field::Email => self.structured_email = non_empty,
        }
    }

    /// Apply the field policy, or report the first missing required field
    fn finish(self, index: usize) -> Result<RawPaper, SkippedRecord> {
        let Some(pubmed_id) = self.pmid else {
            return Err(SkippedRecord {
                index,
                pubmed_id: None,
                reason: MissingField::PubmedId,
            });
        };
        let Some(title) = self.title else {
            return Err(SkippedRecord {
                index,
                pubmed_id: Some(pubmed_id),
                reason: MissingField::Title,
            });
        };

        let _span = tracing::debug_span!("record", pmid = %pubmed_id).entered();

        let corresponding_email =
            resolve_email(self.structured_email.as_deref(), &self.affiliations);

        Ok(RawPaper {
            pubmed_id,
            title,
            publication_date: format_pub_date(self.pub_date.as_ref()),
            authors: self.authors.iter().map(format_author).collect(),
            affiliations: self.affiliations,
            corresponding_email,
        })
    }
}

/// Parse an efetch XML payload into papers and skipped records
pub fn parse_fetch_response(xml: &str) -> Result<FetchOutcome, SourceError> {
    let mut reader = Reader::from_str(xml);
    let mut outcome = FetchOutcome::empty();

    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut article: Option<ArticleRecord> = None;
    let mut capture: Option<Capture> = None;
    let mut index = 0;

    loop {
        let event = reader.read_event().map_err(|e| {
            SourceError::Parse(format!(
                "Failed to parse PubMed fetch XML at byte {}: {}",
                reader.buffer_position(),
                e
            ))
        })?;

        match event {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                if name == b"PubmedArticle" {
                    article = Some(ArticleRecord::default());
                    capture = None;
                } else if let Some(record) = article.as_mut() {
                    if capture.is_none() {
                        let parent = stack.last().map(Vec::as_slice);
                        if let Some(field) = record.open(&name, parent) {
                            capture = Some(Capture {
                                field,
                                depth: stack.len(),
                                text: String::new(),
                            });
                        }
                    }
                }
                stack.push(name);
            }
            Event::Empty(e) => {
                if capture.is_none() {
                    if let Some(record) = article.as_mut() {
                        record.open_empty(e.local_name().as_ref());
                    }
                }
            }
            Event::Text(e) => {
                if let Some(current) = capture.as_mut() {
                    let text = e
                        .unescape()
                        .map_err(|err| SourceError::Parse(format!("Invalid XML text: {}", err)))?;
                    current.text.push_str(&text);
                }
            }
            Event::CData(e) => {
                if let Some(current) = capture.as_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::End(e) => {
                stack.pop();
                let name = e.local_name();

                if capture.as_ref().is_some_and(|c| c.depth == stack.len()) {
                    if let (Some(done), Some(record)) = (capture.take(), article.as_mut()) {
                        record.store(done.field, done.text);
                    }
                }

                if name.as_ref() == b"PubmedArticle" {
                    if let Some(record) = article.take() {
                        match record.finish(index) {
                            Ok(paper) => outcome.papers.push(paper),
                            Err(skipped) => {
                                tracing::debug!("{}", skipped);
                                outcome.skipped.push(skipped);
                            }
                        }
                        index += 1;
                    }
                } else if let Some(record) = article.as_mut() {
                    record.close(name.as_ref());
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if article.is_some() {
        return Err(SourceError::Parse(
            "PubMed fetch XML ended inside a PubmedArticle".to_string(),
        ));
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article_set(articles: &str) -> String {
        format!(
            r#"<?xml version="1.0" ?>
<!DOCTYPE PubmedArticleSet PUBLIC "-//NLM//DTD PubMedArticle, 1st January 2024//EN" "https://dtd.nlm.nih.gov/ncbi/pubmed/out/pubmed_240101.dtd">
<PubmedArticleSet>{}</PubmedArticleSet>"#,
            articles
        )
    }

    const FULL_ARTICLE: &str = r#"
  <PubmedArticle>
    <MedlineCitation Status="MEDLINE" Owner="NLM">
      <PMID Version="1">38000001</PMID>
      <Article PubModel="Print">
        <Journal>
          <JournalIssue CitedMedium="Internet">
            <PubDate><Year>2023</Year><Month>Nov</Month><Day>14</Day></PubDate>
          </JournalIssue>
        </Journal>
        <ArticleTitle>Selective <i>KRAS</i> inhibitors &amp; resistance.</ArticleTitle>
        <AuthorList CompleteYN="Y">
          <Author ValidYN="Y">
            <LastName>Doe</LastName><ForeName>Jane</ForeName><Initials>J</Initials>
            <AffiliationInfo><Affiliation>Acme Pharma Inc, Basel, Switzerland.</Affiliation></AffiliationInfo>
          </Author>
          <Author ValidYN="Y">
            <LastName>Roe</LastName>
            <AffiliationInfo><Affiliation>Dept of Biology, MIT. roe@mit.edu</Affiliation></AffiliationInfo>
          </Author>
          <Author ValidYN="Y"><CollectiveName>KRAS Consortium</CollectiveName></Author>
        </AuthorList>
      </Article>
    </MedlineCitation>
    <PubmedData>
      <ArticleIdList><ArticleId IdType="pubmed">38000001</ArticleId></ArticleIdList>
    </PubmedData>
  </PubmedArticle>"#;

    #[test]
    fn test_parse_full_article() {
        let outcome = parse_fetch_response(&article_set(FULL_ARTICLE)).unwrap();
        assert!(outcome.skipped.is_empty());
        assert_eq!(outcome.papers.len(), 1);

        let paper = &outcome.papers[0];
        assert_eq!(paper.pubmed_id, "38000001");
        assert_eq!(paper.title, "Selective KRAS inhibitors & resistance.");
        assert_eq!(paper.publication_date, "2023-Nov-14");
        assert_eq!(
            paper.authors,
            vec!["Doe, Jane", "Unknown Author", "Unknown Author"]
        );
        assert_eq!(
            paper.affiliations,
            vec![
                "Acme Pharma Inc, Basel, Switzerland.",
                "Dept of Biology, MIT. roe@mit.edu"
            ]
        );
        assert_eq!(paper.corresponding_email, "roe@mit.edu");
    }

    #[test]
    fn test_structured_email_wins_over_affiliation_scan() {
        let xml = article_set(
            r#"<PubmedArticle><MedlineCitation><PMID>1</PMID><Article>
                <ArticleTitle>T</ArticleTitle>
                <AuthorList><Author><LastName>A</LastName><ForeName>B</ForeName>
                  <AffiliationInfo><Affiliation>Lab x@lab.org</Affiliation></AffiliationInfo>
                </Author></AuthorList>
                <CorrespondingAuthor><Email>lead@corp.com</Email></CorrespondingAuthor>
            </Article></MedlineCitation></PubmedArticle>"#,
        );
        let outcome = parse_fetch_response(&xml).unwrap();
        assert_eq!(outcome.papers[0].corresponding_email, "lead@corp.com");
    }

    #[test]
    fn test_missing_date_and_email() {
        let xml = article_set(
            r#"<PubmedArticle><MedlineCitation><PMID>2</PMID><Article>
                <ArticleTitle>No date</ArticleTitle>
            </Article></MedlineCitation></PubmedArticle>"#,
        );
        let outcome = parse_fetch_response(&xml).unwrap();
        let paper = &outcome.papers[0];
        assert_eq!(paper.publication_date, "Unknown");
        assert_eq!(paper.corresponding_email, "N/A");
        assert!(paper.authors.is_empty());
        assert!(paper.affiliations.is_empty());
    }

    #[test]
    fn test_year_only_and_medline_date() {
        let xml = article_set(
            r#"<PubmedArticle><MedlineCitation><PMID>3</PMID><Article>
                <Journal><JournalIssue><PubDate><Year>2019</Year><Season>Spring</Season></PubDate></JournalIssue></Journal>
                <ArticleTitle>Year only</ArticleTitle>
            </Article></MedlineCitation></PubmedArticle>
            <PubmedArticle><MedlineCitation><PMID>4</PMID><Article>
                <Journal><JournalIssue><PubDate><MedlineDate>1998 Dec-1999 Jan</MedlineDate></PubDate></JournalIssue></Journal>
                <ArticleTitle>Medline date</ArticleTitle>
            </Article></MedlineCitation></PubmedArticle>"#,
        );
        let outcome = parse_fetch_response(&xml).unwrap();
        assert_eq!(outcome.papers[0].publication_date, "2019");
        assert_eq!(outcome.papers[1].publication_date, "1998 Dec-1999 Jan");
    }

    #[test]
    fn test_only_first_pub_date_is_used() {
        let xml = article_set(
            r#"<PubmedArticle><MedlineCitation><PMID>5</PMID><Article>
                <Journal><JournalIssue><PubDate><Year>2020</Year></PubDate></JournalIssue></Journal>
                <ArticleTitle>T</ArticleTitle>
            </Article></MedlineCitation>
            <PubmedData><History><PubDate><Year>2021</Year><Month>1</Month><Day>2</Day></PubDate></History></PubmedData>
            </PubmedArticle>"#,
        );
        let outcome = parse_fetch_response(&xml).unwrap();
        assert_eq!(outcome.papers[0].publication_date, "2020");
    }

    #[test]
    fn test_records_missing_required_fields_are_skipped() {
        let xml = article_set(
            r#"<PubmedArticle><MedlineCitation><Article>
                <ArticleTitle>No PMID</ArticleTitle>
            </Article></MedlineCitation></PubmedArticle>
            <PubmedArticle><MedlineCitation><PMID>7</PMID><Article>
            </Article></MedlineCitation></PubmedArticle>
            <PubmedArticle><MedlineCitation><PMID>8</PMID><Article>
                <ArticleTitle>Kept</ArticleTitle>
            </Article></MedlineCitation></PubmedArticle>"#,
        );
        let outcome = parse_fetch_response(&xml).unwrap();

        assert_eq!(outcome.papers.len(), 1);
        assert_eq!(outcome.papers[0].pubmed_id, "8");

        assert_eq!(
            outcome.skipped,
            vec![
                SkippedRecord {
                    index: 0,
                    pubmed_id: None,
                    reason: MissingField::PubmedId,
                },
                SkippedRecord {
                    index: 1,
                    pubmed_id: Some("7".to_string()),
                    reason: MissingField::Title,
                },
            ]
        );
    }

    #[test]
    fn test_first_pmid_wins() {
        let xml = article_set(
            r#"<PubmedArticle><MedlineCitation><PMID>9</PMID><Article>
                <ArticleTitle>T</ArticleTitle>
            </Article>
            <CommentsCorrectionsList><CommentsCorrections><PMID>111</PMID></CommentsCorrections></CommentsCorrectionsList>
            </MedlineCitation></PubmedArticle>"#,
        );
        let outcome = parse_fetch_response(&xml).unwrap();
        assert_eq!(outcome.papers[0].pubmed_id, "9");
    }

    #[test]
    fn test_empty_elements() {
        let xml = article_set(
            r#"<PubmedArticle><MedlineCitation><PMID>10</PMID><Article>
                <ArticleTitle/>
                <AuthorList><Author/><Author><LastName>Lee</LastName><ForeName></ForeName></Author></AuthorList>
                <AffiliationInfo><Affiliation></Affiliation></AffiliationInfo>
            </Article></MedlineCitation></PubmedArticle>"#,
        );
        let outcome = parse_fetch_response(&xml).unwrap();
        let paper = &outcome.papers[0];
        assert_eq!(paper.title, "");
        assert_eq!(paper.authors, vec!["Unknown Author", "Unknown Author"]);
        assert!(paper.affiliations.is_empty());
    }

    #[test]
    fn test_title_and_affiliation_text_is_not_trimmed() {
        let xml = article_set(
            r#"<PubmedArticle><MedlineCitation><PMID> 11 </PMID><Article>
                <ArticleTitle>  Spaced  title </ArticleTitle>
                <AuthorList><Author><LastName> Lee </LastName><ForeName>Ann</ForeName>
                <AffiliationInfo><Affiliation> Acme Pharma </Affiliation></AffiliationInfo>
                <AffiliationInfo><Affiliation>   </Affiliation></AffiliationInfo>
                </Author></AuthorList>
            </Article></MedlineCitation></PubmedArticle>"#,
        );
        let outcome = parse_fetch_response(&xml).unwrap();
        let paper = &outcome.papers[0];
        assert_eq!(paper.pubmed_id, "11");
        assert_eq!(paper.title, "  Spaced  title ");
        assert_eq!(paper.authors, vec!["Lee, Ann"]);
        assert_eq!(paper.affiliations, vec![" Acme Pharma "]);
    }

    #[test]
    fn test_empty_article_set() {
        let outcome = parse_fetch_response(&article_set("")).unwrap();
        assert!(outcome.papers.is_empty());
        assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn test_malformed_xml_is_parse_error() {
        let result = parse_fetch_response("<PubmedArticleSet><PubmedArticle></Wrong>");
        assert!(matches!(result, Err(SourceError::Parse(_))));
    }

    #[test]
    fn test_truncated_article_is_parse_error() {
        let result = parse_fetch_response("<PubmedArticleSet><PubmedArticle><PMID>1</PMID>");
        assert!(matches!(result, Err(SourceError::Parse(_))));
    }
}
