//! Deterministic post-analysis filtering.
//!
//! Screening happens twice: the model scores candidates against criteria
//! during analysis, and this module applies the hard structured requirements
//! afterwards. `notes` (free-form requirements) are left to the model's
//! score; everything structured is checked here.

use crate::models::{AnalyzedDocument, CandidateProfile, EducationLevel, MatchCriteria};

/// Keeps only the candidates that meet every structured requirement.
pub fn filter_candidates(
    docs: &[AnalyzedDocument],
    criteria: &MatchCriteria,
) -> Vec<AnalyzedDocument> {
    docs.iter()
        .filter(|doc| matches_criteria(&doc.profile, criteria))
        .cloned()
        .collect()
}

/// True when the profile satisfies all structured criteria. Empty criteria
/// match everyone.
pub fn matches_criteria(profile: &CandidateProfile, criteria: &MatchCriteria) -> bool {
    let skills_haystack = profile.skills_summary().to_lowercase();
    if !criteria
        .skills
        .iter()
        .all(|skill| skills_haystack.contains(&skill.to_lowercase()))
    {
        return false;
    }

    if profile.experience_years < criteria.min_experience {
        return false;
    }

    if criteria.education_level != EducationLevel::Any
        && highest_education(profile).rank() < criteria.education_level.rank()
    {
        return false;
    }

    if !criteria.location.trim().is_empty()
        && !profile
            .location
            .to_lowercase()
            .contains(&criteria.location.to_lowercase())
    {
        return false;
    }

    for (field, required) in &criteria.custom {
        let matched = profile
            .field_text(field)
            .map(|value| value.to_lowercase().contains(&required.to_lowercase()))
            .unwrap_or(false);
        if !matched {
            return false;
        }
    }

    true
}

/// Highest degree level claimed anywhere in the education section. Degree
/// strings are messy ("B.S.", "MSc", "Bachelor of Arts"), so full keywords
/// match as substrings and short abbreviations match whole tokens only.
pub fn highest_education(profile: &CandidateProfile) -> EducationLevel {
    profile
        .education
        .iter()
        .map(|entry| degree_level(&entry.degree))
        .max_by_key(|level| level.rank())
        .unwrap_or(EducationLevel::Any)
}

fn degree_level(degree: &str) -> EducationLevel {
    let lower = degree.to_lowercase();

    const DOCTORATE_WORDS: [&str; 3] = ["phd", "ph.d", "doctor"];
    const MASTERS_WORDS: [&str; 2] = ["master", "mba"];
    const MASTERS_ABBREVS: [&str; 5] = ["ms", "m.s", "ma", "m.a", "msc"];
    const BACHELORS_WORDS: [&str; 1] = ["bachelor"];
    const BACHELORS_ABBREVS: [&str; 5] = ["bs", "b.s", "ba", "b.a", "bsc"];

    let has_token = |abbrevs: &[&str]| {
        lower
            .split(|c: char| c.is_whitespace() || c == ',' || c == '(' || c == ')')
            .map(|t| t.trim_end_matches('.'))
            .any(|token| abbrevs.contains(&token))
    };

    if DOCTORATE_WORDS.iter().any(|w| lower.contains(w)) {
        EducationLevel::Doctorate
    } else if MASTERS_WORDS.iter().any(|w| lower.contains(w)) || has_token(&MASTERS_ABBREVS) {
        EducationLevel::Masters
    } else if BACHELORS_WORDS.iter().any(|w| lower.contains(w)) || has_token(&BACHELORS_ABBREVS) {
        EducationLevel::Bachelors
    } else if lower.contains("associate") {
        EducationLevel::Associate
    } else if lower.contains("high school") || lower.contains("diploma") {
        EducationLevel::HighSchool
    } else {
        EducationLevel::Any
    }
}
