pub mod candidate;
pub mod criteria;

pub use candidate::{
    AnalyzedDocument, CandidateProfile, DocumentRef, EducationEntry, LanguageSkill, WorkEntry,
};
pub use criteria::{EducationLevel, MatchCriteria};

pub(crate) use candidate::coerce_u32;
