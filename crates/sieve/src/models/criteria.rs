//! Recruiter-specified matching criteria.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Minimum education requirement, ranked so "or higher" comparisons are
/// explicit instead of string games.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EducationLevel {
    #[default]
    Any,
    HighSchool,
    Associate,
    Bachelors,
    Masters,
    Doctorate,
}

impl EducationLevel {
    pub fn rank(self) -> u8 {
        match self {
            EducationLevel::Any => 0,
            EducationLevel::HighSchool => 1,
            EducationLevel::Associate => 2,
            EducationLevel::Bachelors => 3,
            EducationLevel::Masters => 4,
            EducationLevel::Doctorate => 5,
        }
    }

    /// Lenient parse of the level names the model (or a human) writes.
    pub fn parse(label: &str) -> Self {
        let label = label.to_lowercase();
        if label.contains("phd") || label.contains("doctor") {
            EducationLevel::Doctorate
        } else if label.contains("master") {
            EducationLevel::Masters
        } else if label.contains("bachelor") {
            EducationLevel::Bachelors
        } else if label.contains("associate") {
            EducationLevel::Associate
        } else if label.contains("high school") {
            EducationLevel::HighSchool
        } else {
            EducationLevel::Any
        }
    }
}

impl fmt::Display for EducationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EducationLevel::Any => "Any",
            EducationLevel::HighSchool => "High School",
            EducationLevel::Associate => "Associate",
            EducationLevel::Bachelors => "Bachelor's",
            EducationLevel::Masters => "Master's",
            EducationLevel::Doctorate => "PhD",
        };
        f.write_str(label)
    }
}

/// Structured filter a recruiter applies to candidates. Also handed to the
/// analyzer so the model can score the match directly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchCriteria {
    pub skills: Vec<String>,
    pub min_experience: u32,
    pub education_level: EducationLevel,
    pub location: String,
    /// field name -> required substring, resolved against profile fields.
    pub custom: BTreeMap<String, String>,
    /// Requirements that fit none of the structured slots.
    pub notes: Vec<String>,
}

impl MatchCriteria {
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
            && self.min_experience == 0
            && self.education_level == EducationLevel::Any
            && self.location.trim().is_empty()
            && self.custom.is_empty()
            && self.notes.is_empty()
    }

    /// Human-readable description, shown to recruiters before screening.
    pub fn describe(&self) -> String {
        let mut out = String::from("Looking for candidates with:\n");
        if !self.skills.is_empty() {
            out.push_str(&format!("- Skills: {}\n", self.skills.join(", ")));
        }
        if self.min_experience > 0 {
            out.push_str(&format!("- Experience: {}+ years\n", self.min_experience));
        }
        if self.education_level != EducationLevel::Any {
            out.push_str(&format!("- Education: {} degree\n", self.education_level));
        }
        if !self.location.trim().is_empty() {
            out.push_str(&format!("- Location: {}\n", self.location));
        }
        for (field, value) in &self.custom {
            out.push_str(&format!("- {field}: {value}\n"));
        }
        if !self.notes.is_empty() {
            out.push_str(&format!("- Other requirements: {}\n", self.notes.join(", ")));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_education_ranks_are_ordered() {
        assert!(EducationLevel::Doctorate.rank() > EducationLevel::Masters.rank());
        assert!(EducationLevel::Masters.rank() > EducationLevel::Bachelors.rank());
        assert!(EducationLevel::Bachelors.rank() > EducationLevel::Any.rank());
    }

    #[test]
    fn test_parse_accepts_loose_labels() {
        assert_eq!(EducationLevel::parse("Bachelor's"), EducationLevel::Bachelors);
        assert_eq!(EducationLevel::parse("bachelors degree"), EducationLevel::Bachelors);
        assert_eq!(EducationLevel::parse("Master's or higher"), EducationLevel::Masters);
    }

    #[test]
    fn test_parse_phd_and_doctorate() {
        assert_eq!(EducationLevel::parse("PhD"), EducationLevel::Doctorate);
        assert_eq!(EducationLevel::parse("Doctorate"), EducationLevel::Doctorate);
        assert_eq!(EducationLevel::parse("unknown"), EducationLevel::Any);
    }

    #[test]
    fn test_default_criteria_is_empty() {
        assert!(MatchCriteria::default().is_empty());
        let with_skill = MatchCriteria {
            skills: vec!["Rust".to_string()],
            ..Default::default()
        };
        assert!(!with_skill.is_empty());
    }

    #[test]
    fn test_describe_lists_only_set_fields() {
        let criteria = MatchCriteria {
            skills: vec!["Rust".to_string(), "Tokio".to_string()],
            min_experience: 3,
            education_level: EducationLevel::Bachelors,
            location: "Berlin".to_string(),
            ..Default::default()
        };
        let text = criteria.describe();
        assert!(text.contains("Skills: Rust, Tokio"));
        assert!(text.contains("Experience: 3+ years"));
        assert!(text.contains("Bachelor's degree"));
        assert!(text.contains("Location: Berlin"));
        assert!(!text.contains("Other requirements"));
    }
}
