//! Resume text preprocessing.
//!
//! Normalizes the noisy text that comes out of PDF extraction so the model
//! sees consistent formatting: collapsed whitespace, plain `- ` bullets, and
//! canonical `## HEADER` section markers.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

const SECTION_HEADERS: [&str; 9] = [
    "EDUCATION",
    "EXPERIENCE",
    "SKILLS",
    "PROJECTS",
    "ACHIEVEMENTS",
    "CERTIFICATIONS",
    "LANGUAGES",
    "PUBLICATIONS",
    "INTERESTS",
];

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[ \t]+").unwrap())
}

fn emphasis_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*{1,2}([^*]+)\*{1,2}").unwrap())
}

fn bullet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[•○●■□◆◇►▶★☆✓✔✗✘]\s*").unwrap())
}

fn blank_lines_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").unwrap())
}

fn header_res() -> &'static Vec<(Regex, String)> {
    static RES: OnceLock<Vec<(Regex, String)>> = OnceLock::new();
    RES.get_or_init(|| {
        SECTION_HEADERS
            .iter()
            .map(|header| {
                // Match "education", "Education:", "EDUCATION" at word level.
                let re = Regex::new(&format!(r"(?i)\b{header}\b\s*:?")).unwrap();
                (re, format!("## {header} "))
            })
            .collect()
    })
}

/// Normalizes raw extracted resume text. Very short inputs are returned
/// untouched: there is nothing to normalize and the caller will reject them
/// anyway.
pub fn preprocess_resume_text(text: &str) -> String {
    if text.len() < 50 {
        return text.to_string();
    }

    let mut out = whitespace_re().replace_all(text, " ").into_owned();
    out = emphasis_re().replace_all(&out, "$1").into_owned();
    out = bullet_re().replace_all(&out, "- ").into_owned();

    for (re, replacement) in header_res() {
        out = re.replace_all(&out, replacement.as_str()).into_owned();
    }

    blank_lines_re().replace_all(&out, "\n\n").into_owned()
}

/// Guesses the candidate's name from the file stem: 2-3 capitalized
/// alphabetic words once `_` and `-` become spaces (e.g. `Jane_Doe.pdf`).
pub fn name_hint_from_path(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_string_lossy();
    let cleaned = stem.replace(['_', '-'], " ");
    let words: Vec<&str> = cleaned.split_whitespace().collect();

    if !(2..=3).contains(&words.len()) {
        return None;
    }
    let plausible = words
        .iter()
        .all(|w| w.chars().all(|c| c.is_alphabetic()) && w.chars().next().is_some());
    if plausible {
        Some(words.join(" "))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Long enough to clear the 50-char minimum.
    const PAD: &str = " Lorem ipsum dolor sit amet consectetur adipiscing elit.";

    #[test]
    fn test_whitespace_runs_collapse() {
        let input = format!("Jane    Doe\t\tEngineer{PAD}");
        let out = preprocess_resume_text(&input);
        assert!(out.contains("Jane Doe Engineer"));
    }

    #[test]
    fn test_bullets_normalize_to_dashes() {
        let input = format!("• Built pipelines\n● Led team{PAD}");
        let out = preprocess_resume_text(&input);
        assert!(out.contains("- Built pipelines"));
        assert!(out.contains("- Led team"));
    }

    #[test]
    fn test_markdown_emphasis_is_stripped() {
        let input = format!("**Jane Doe** is a *senior* engineer{PAD}");
        let out = preprocess_resume_text(&input);
        assert!(out.contains("Jane Doe is a senior engineer"));
    }

    #[test]
    fn test_section_headers_are_canonicalized() {
        let input = format!("education: MIT\nSkills: Rust{PAD}");
        let out = preprocess_resume_text(&input);
        assert!(out.contains("## EDUCATION MIT"));
        assert!(out.contains("## SKILLS Rust"));
    }

    #[test]
    fn test_short_text_is_left_alone() {
        assert_eq!(preprocess_resume_text("too   short"), "too   short");
    }

    #[test]
    fn test_name_hint_from_two_word_stem() {
        assert_eq!(
            name_hint_from_path(Path::new("/tmp/Jane_Doe.pdf")).as_deref(),
            Some("Jane Doe")
        );
        assert_eq!(
            name_hint_from_path(Path::new("Mary-Jane-Watson.docx")).as_deref(),
            Some("Mary Jane Watson")
        );
    }

    #[test]
    fn test_name_hint_rejects_non_name_stems() {
        assert!(name_hint_from_path(Path::new("resume_2024_final.pdf")).is_none());
        assert!(name_hint_from_path(Path::new("cv.pdf")).is_none());
        assert!(name_hint_from_path(Path::new("a_b_c_d.pdf")).is_none());
    }
}
