//! Candidate data model: the typed record produced by the analyzer.
//!
//! The model reply carries a fixed required-field set; anything
//! provider-specific lands in the open `extra` map so round-trip
//! serialization stays well-defined. Missing fields deserialize to empty
//! defaults, and numeric fields tolerate the string/float shapes models
//! sometimes emit.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};

/// One position in the candidate's work history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkEntry {
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub dates: String,
    #[serde(default)]
    pub responsibilities: Vec<String>,
}

/// One degree or program.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EducationEntry {
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub field: String,
}

/// A spoken or programming language with proficiency.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LanguageSkill {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub proficiency: String,
}

/// Structured information extracted from one resume.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location: String,

    /// Total years of experience. Models occasionally reply with a float or
    /// a quoted number; both coerce here, anything else becomes 0.
    #[serde(default, rename = "experience", deserialize_with = "de_years")]
    pub experience_years: u32,

    #[serde(default)]
    pub work_history: Vec<WorkEntry>,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub linkedin: String,
    #[serde(default)]
    pub github: String,
    #[serde(default)]
    pub languages: Vec<LanguageSkill>,
    #[serde(default)]
    pub certifications: Vec<String>,

    /// 0–100, present only for criteria-aware analysis.
    #[serde(default, deserialize_with = "de_score")]
    pub match_score: Option<u32>,
    #[serde(default)]
    pub match_reasons: Vec<String>,
    #[serde(default)]
    pub gap_analysis: Vec<String>,

    /// Provider-specific fields the fixed schema doesn't know about.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CandidateProfile {
    pub fn skills_summary(&self) -> String {
        self.skills.join(", ")
    }

    pub fn education_summary(&self) -> String {
        self.education
            .iter()
            .map(|e| {
                let mut s = String::new();
                if !e.degree.is_empty() {
                    s.push_str(&e.degree);
                }
                if !e.institution.is_empty() {
                    if !s.is_empty() {
                        s.push_str(" from ");
                    }
                    s.push_str(&e.institution);
                }
                if !e.year.is_empty() {
                    s.push_str(&format!(" ({})", e.year));
                }
                if !e.field.is_empty() {
                    s.push_str(&format!(", {}", e.field));
                }
                s
            })
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn work_history_summary(&self) -> String {
        self.work_history
            .iter()
            .map(|j| {
                let mut s = String::new();
                if !j.position.is_empty() {
                    s.push_str(&j.position);
                }
                if !j.company.is_empty() {
                    if !s.is_empty() {
                        s.push_str(" at ");
                    }
                    s.push_str(&j.company);
                }
                if !j.dates.is_empty() {
                    s.push_str(&format!(" ({})", j.dates));
                }
                s
            })
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn languages_summary(&self) -> String {
        self.languages
            .iter()
            .map(|l| {
                if l.proficiency.is_empty() {
                    l.name.clone()
                } else {
                    format!("{} ({})", l.name, l.proficiency)
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Resolves a named field to its textual value, for custom filters.
    /// Unknown names fall through to the open extras map.
    pub fn field_text(&self, field: &str) -> Option<String> {
        match field {
            "name" => Some(self.name.clone()),
            "email" => Some(self.email.clone()),
            "phone" => Some(self.phone.clone()),
            "location" => Some(self.location.clone()),
            "experience" => Some(self.experience_years.to_string()),
            "skills" => Some(self.skills_summary()),
            "education" => Some(self.education_summary()),
            "work_history" => Some(self.work_history_summary()),
            "languages" => Some(self.languages_summary()),
            "certifications" => Some(self.certifications.join(", ")),
            "linkedin" => Some(self.linkedin.clone()),
            "github" => Some(self.github.clone()),
            other => self.extra.get(other).map(|v| match v {
                serde_json::Value::String(s) => s.clone(),
                v => v.to_string(),
            }),
        }
    }
}

/// Identifies the document a result came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub file_name: String,
    pub path: PathBuf,
}

impl DocumentRef {
    pub fn new(path: &Path) -> Self {
        Self {
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            path: path.to_path_buf(),
        }
    }
}

/// A completed analysis: the extracted profile plus an unambiguous reference
/// to the source document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzedDocument {
    pub source: DocumentRef,
    pub profile: CandidateProfile,
}

fn de_years<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(coerce_u32(serde_json::Value::deserialize(deserializer)?).unwrap_or(0))
}

fn de_score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(coerce_u32(value).map(|n| n.min(100)))
}

pub(crate) fn coerce_u32(value: serde_json::Value) -> Option<u32> {
    match value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .map(|v| v as u32)
            .or_else(|| n.as_f64().map(|f| f.max(0.0).round() as u32)),
        serde_json::Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .map(|f| f.max(0.0).round() as u32),
        _ => None,
    }
}
