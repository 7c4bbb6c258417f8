//! CSV export of analysis results.
//!
//! Emits one row per analyzed document with the same column frame recruiters
//! saw in the original spreadsheet export. Quoting follows RFC 4180: fields
//! containing commas, quotes, or newlines are wrapped and inner quotes
//! doubled.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::models::AnalyzedDocument;

const COLUMNS: [&str; 16] = [
    "File Name",
    "Name",
    "Email",
    "Phone",
    "Location",
    "Experience (Years)",
    "Skills",
    "Education",
    "Work History",
    "Languages",
    "Certifications",
    "LinkedIn",
    "GitHub",
    "Match Score",
    "Match Reasons",
    "Gap Analysis",
];

/// Renders the results as CSV text, header row included.
pub fn to_csv(docs: &[AnalyzedDocument]) -> String {
    let mut out = String::new();
    write_row(&mut out, COLUMNS.iter().map(|s| s.to_string()));

    for doc in docs {
        let p = &doc.profile;
        write_row(
            &mut out,
            [
                doc.source.file_name.clone(),
                p.name.clone(),
                p.email.clone(),
                p.phone.clone(),
                p.location.clone(),
                p.experience_years.to_string(),
                p.skills_summary(),
                p.education_summary(),
                p.work_history_summary(),
                p.languages_summary(),
                p.certifications.join(", "),
                p.linkedin.clone(),
                p.github.clone(),
                p.match_score.map(|s| s.to_string()).unwrap_or_default(),
                p.match_reasons.join("; "),
                p.gap_analysis.join("; "),
            ]
            .into_iter(),
        );
    }
    out
}

/// Writes the CSV to disk.
pub fn save_csv(docs: &[AnalyzedDocument], path: &Path) -> Result<()> {
    std::fs::write(path, to_csv(docs))
        .with_context(|| format!("failed to write CSV to {}", path.display()))?;
    info!(rows = docs.len(), path = %path.display(), "exported results");
    Ok(())
}

fn write_row(out: &mut String, fields: impl Iterator<Item = String>) {
    let mut first = true;
    for field in fields {
        if !first {
            out.push(',');
        }
        first = false;
        out.push_str(&quote(&field));
    }
    out.push_str("\r\n");
}

fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::models::{CandidateProfile, DocumentRef};

    fn doc(name: &str, skills: &[&str]) -> AnalyzedDocument {
        AnalyzedDocument {
            source: DocumentRef::new(Path::new("Jane_Doe.pdf")),
            profile: CandidateProfile {
                name: name.to_string(),
                skills: skills.iter().map(|s| s.to_string()).collect(),
                experience_years: 7,
                match_score: Some(85),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_header_row_matches_the_export_frame() {
        let csv = to_csv(&[]);
        let header = csv.lines().next().unwrap();
        assert!(header.starts_with("File Name,Name,Email"));
        assert!(header.ends_with("Match Score,Match Reasons,Gap Analysis"));
    }

    #[test]
    fn test_rows_carry_profile_fields() {
        let csv = to_csv(&[doc("Jane Doe", &["Rust", "Tokio"])]);
        let row = csv.lines().nth(1).unwrap();
        assert!(row.contains("Jane_Doe.pdf"));
        assert!(row.contains("Jane Doe"));
        assert!(row.contains("\"Rust, Tokio\""));
        assert!(row.contains(",85,"));
    }

    #[test]
    fn test_quoting_escapes_embedded_quotes_and_commas() {
        assert_eq!(quote("plain"), "plain");
        assert_eq!(quote("a,b"), "\"a,b\"");
        assert_eq!(quote("said \"hi\""), "\"said \"\"hi\"\"\"");
        assert_eq!(quote("line\nbreak"), "\"line\nbreak\"");
    }

    #[test]
    fn test_missing_match_score_renders_empty() {
        let mut d = doc("Jane Doe", &[]);
        d.profile.match_score = None;
        let csv = to_csv(&[d]);
        let row = csv.lines().nth(1).unwrap();
        assert!(row.contains(",,"), "empty score column expected: {row}");
    }

    #[test]
    fn test_save_csv_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        save_csv(&[doc("Jane Doe", &["Rust"])], &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, to_csv(&[doc("Jane Doe", &["Rust"])]));
    }
}
