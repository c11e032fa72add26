//! Output sink for classified papers: a CSV file, or the console.

use comfy_table::{Attribute, Cell, Table};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use crate::models::ClassifiedPaper;

/// How papers are printed when no output file is given
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleFormat {
    /// One block of `Field: value` lines per paper
    #[default]
    Plain,
    /// A single table
    Table,
    /// A pretty-printed JSON array
    Json,
}

/// Errors that can occur while writing or reading output
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Write papers to `destination` as CSV, or to stdout in `format` when no destination is given
pub fn write_papers(
    papers: &[ClassifiedPaper],
    destination: Option<&Path>,
    format: ConsoleFormat,
) -> Result<(), OutputError> {
    match destination {
        Some(path) => write_csv(papers, path),
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            print_papers(papers, format, &mut handle)
        }
    }
}

/// Write papers as CSV to `path`, replacing any existing file
pub fn write_csv(papers: &[ClassifiedPaper], path: &Path) -> Result<(), OutputError> {
    let file = File::create(path)?;
    write_csv_to(papers, file)?;
    tracing::info!(path = %path.display(), rows = papers.len(), "Wrote CSV");
    Ok(())
}

/// Write papers as CSV to any writer; the header row is written even for no papers
pub fn write_csv_to<W: Write>(papers: &[ClassifiedPaper], writer: W) -> Result<(), OutputError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(ClassifiedPaper::HEADERS)?;
    for paper in papers {
        csv_writer.serialize(paper)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Read papers back from a CSV file written by [`write_csv`]
pub fn read_csv(path: &Path) -> Result<Vec<ClassifiedPaper>, OutputError> {
    read_csv_from(File::open(path)?)
}

/// Read papers from CSV with a header row
pub fn read_csv_from<R: Read>(reader: R) -> Result<Vec<ClassifiedPaper>, OutputError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut papers: Vec<ClassifiedPaper> = Vec::new();
    for record in csv_reader.deserialize::<ClassifiedPaper>() {
        papers.push(record?);
    }
    Ok(papers)
}

/// Print papers to `out` in the given console format
pub fn print_papers<W: Write>(
    papers: &[ClassifiedPaper],
    format: ConsoleFormat,
    out: &mut W,
) -> Result<(), OutputError> {
    match format {
        ConsoleFormat::Plain => {
            for paper in papers {
                writeln!(out, "{}: {}", ClassifiedPaper::HEADERS[0], paper.pubmed_id)?;
                writeln!(out, "{}: {}", ClassifiedPaper::HEADERS[1], paper.title)?;
                writeln!(out, "{}: {}", ClassifiedPaper::HEADERS[2], paper.publication_date)?;
                writeln!(
                    out,
                    "{}: {}",
                    ClassifiedPaper::HEADERS[3],
                    paper.non_academic_authors
                )?;
                writeln!(
                    out,
                    "{}: {}",
                    ClassifiedPaper::HEADERS[4],
                    paper.company_affiliations
                )?;
                writeln!(
                    out,
                    "{}: {}",
                    ClassifiedPaper::HEADERS[5],
                    paper.corresponding_email
                )?;
                writeln!(out)?;
            }
        }
        ConsoleFormat::Table => {
            let mut table = Table::new();
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.set_header(ClassifiedPaper::HEADERS.to_vec());

            for paper in papers {
                table.add_row(vec![
                    Cell::new(&paper.pubmed_id),
                    Cell::new(&paper.title).add_attribute(Attribute::Bold),
                    Cell::new(&paper.publication_date),
                    Cell::new(&paper.non_academic_authors),
                    Cell::new(&paper.company_affiliations),
                    Cell::new(&paper.corresponding_email),
                ]);
            }
            writeln!(out, "{table}")?;
        }
        ConsoleFormat::Json => {
            writeln!(out, "{}", serde_json::to_string_pretty(papers)?)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<ClassifiedPaper> {
        vec![
            ClassifiedPaper {
                pubmed_id: "38000001".into(),
                title: "Kinase inhibitors, a review".into(),
                publication_date: "2023-Nov-14".into(),
                non_academic_authors: "Doe, Jane, Roe, Rick".into(),
                company_affiliations: "Acme Pharma Inc, Basel".into(),
                corresponding_email: "jane@acme.com".into(),
            },
            ClassifiedPaper {
                pubmed_id: "38000002".into(),
                title: "Quoted \"title\"".into(),
                publication_date: "Unknown".into(),
                non_academic_authors: "Unknown Author".into(),
                company_affiliations: "Zeta Biotech".into(),
                corresponding_email: "N/A".into(),
            },
        ]
    }

    #[test]
    fn test_csv_header_and_rows() {
        let mut buf = Vec::new();
        write_csv_to(&sample(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next().unwrap(),
            "PubmedID,Title,Publication Date,Non-academic Author(s),Company Affiliation(s),Corresponding Author Email"
        );
        assert_eq!(
            lines.next().unwrap(),
            "38000001,\"Kinase inhibitors, a review\",2023-Nov-14,\"Doe, Jane, Roe, Rick\",\"Acme Pharma Inc, Basel\",jane@acme.com"
        );
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_csv_header_written_for_no_papers() {
        let mut buf = Vec::new();
        write_csv_to(&[], &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("PubmedID,"));
    }

    #[test]
    fn test_csv_round_trip_in_memory() {
        let papers = sample();
        let mut buf = Vec::new();
        write_csv_to(&papers, &mut buf).unwrap();

        let read = read_csv_from(buf.as_slice()).unwrap();
        assert_eq!(read, papers);
    }

    #[test]
    fn test_plain_output_lists_every_field() {
        let mut buf = Vec::new();
        print_papers(&sample()[..1], ConsoleFormat::Plain, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("PubmedID: 38000001"));
        assert!(text.contains("Title: Kinase inhibitors, a review"));
        assert!(text.contains("Publication Date: 2023-Nov-14"));
        assert!(text.contains("Non-academic Author(s): Doe, Jane, Roe, Rick"));
        assert!(text.contains("Company Affiliation(s): Acme Pharma Inc, Basel"));
        assert!(text.contains("Corresponding Author Email: jane@acme.com"));
    }

    #[test]
    fn test_json_output_uses_column_names() {
        let mut buf = Vec::new();
        print_papers(&sample(), ConsoleFormat::Json, &mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(value.as_array().unwrap().len(), 2);
        assert_eq!(value[0]["PubmedID"], "38000001");
        assert_eq!(value[1]["Corresponding Author Email"], "N/A");
    }

    #[test]
    fn test_table_output_contains_rows() {
        let mut buf = Vec::new();
        print_papers(&sample(), ConsoleFormat::Table, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("PubmedID"));
        assert!(text.contains("38000002"));
    }
}
