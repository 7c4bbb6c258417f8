// All LLM prompt constants for the engine. Placeholders in `{braces}` are
// filled by the caller before sending.

/// System prompt for resume extraction; enforces JSON-only output.
pub const EXTRACTION_SYSTEM: &str =
    "You are an expert resume parser with extensive experience in HR and \
    technical recruiting. You extract structured information from resume text. \
    You MUST respond with a single valid JSON object and nothing else. \
    Do NOT use markdown code fences. Do NOT include explanations.";

/// Resume extraction prompt. Replace `{name_hint}` and `{resume_text}`.
pub const EXTRACTION_PROMPT_TEMPLATE: &str = r#"Extract precise information from this resume.{name_hint}

EXTRACTION GUIDELINES:
1. Extract the full name, complete email address, phone number, and location (city, state/province, country).
2. Calculate total years of experience as a whole number; internships count as valid experience.
3. Extract the full work history: company, position, dates, key responsibilities.
4. Extract all education: degree, institution, graduation year, field of study.
5. Extract ALL technical skills mentioned anywhere in the resume, including inside project descriptions.
6. Extract human and programming languages with proficiency levels, professional certifications, and LinkedIn/GitHub URLs.

Return a JSON object with this EXACT schema:
{
  "name": "string",
  "email": "string",
  "phone": "string",
  "location": "string",
  "experience": 0,
  "work_history": [{"company": "string", "position": "string", "dates": "string", "responsibilities": ["string"]}],
  "education": [{"degree": "string", "institution": "string", "year": "string", "field": "string"}],
  "skills": ["string"],
  "linkedin": "string",
  "github": "string",
  "languages": [{"name": "string", "proficiency": "string"}],
  "certifications": ["string"]
}

Use an empty string or empty array for anything the resume does not state.

RESUME TEXT:
{resume_text}
"#;

/// Extraction prompt variant that also scores the candidate against
/// recruiter criteria. Replace `{criteria}`, `{name_hint}`, `{resume_text}`.
pub const EXTRACTION_WITH_CRITERIA_TEMPLATE: &str = r#"Extract precise information from this resume and evaluate how well the candidate matches the job requirements.{name_hint}

JOB REQUIREMENTS (IMPORTANT):
{criteria}
Pay special attention to these requirements throughout your analysis.

EXTRACTION GUIDELINES:
1. Extract all personal information accurately (name, email, phone, location).
2. Calculate total years of experience as a whole number; internships count.
3. Extract the full work history, education, ALL technical skills, languages, certifications, and online profiles.

EVALUATION GUIDELINES:
1. Give a precise match score from 0 to 100 based on how well the candidate meets the requirements.
2. Give 3-5 specific reasons why the candidate is a good match, with concrete evidence from the resume.
3. Identify gaps between the candidate's qualifications and the requirements.
4. Be objective and evidence-based.

Return a JSON object with this EXACT schema:
{
  "name": "string",
  "email": "string",
  "phone": "string",
  "location": "string",
  "experience": 0,
  "work_history": [{"company": "string", "position": "string", "dates": "string", "responsibilities": ["string"]}],
  "education": [{"degree": "string", "institution": "string", "year": "string", "field": "string"}],
  "skills": ["string"],
  "linkedin": "string",
  "github": "string",
  "languages": [{"name": "string", "proficiency": "string"}],
  "certifications": ["string"],
  "match_score": 0,
  "match_reasons": ["string"],
  "gap_analysis": ["string"]
}

RESUME TEXT:
{resume_text}
"#;

/// System prompt for turning recruiter free text into structured criteria.
pub const CRITERIA_PARSE_SYSTEM: &str =
    "You are an expert at converting job requirements into structured criteria \
    for resume filtering. You MUST respond with a single valid JSON object.";

/// Criteria parsing prompt. Replace `{criteria_text}`.
pub const CRITERIA_PARSE_TEMPLATE: &str = r#"Convert this job requirement into structured criteria:

{criteria_text}

Return a JSON object with these fields:
- "required_skills": array of ALL technical skills mentioned
- "min_experience": number of years, 0 if not specified
- "education_level": one of "Any", "High School", "Associate", "Bachelor's", "Master's", "PhD" ("Any" if not specified)
- "location": location requirement, empty string if not specified
- "other_requirements": array of requirements that fit none of the above
"#;
