// Prompt constants for the tailoring pipeline.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::{GROUNDING_INSTRUCTION, JSON_ONLY_SYSTEM, NO_PLACEHOLDER_INSTRUCTION};
use crate::tailoring::scoring::extract_keywords;

/// System prompt for structured extraction. The JSON-only rules come from
/// `JSON_ONLY_SYSTEM`; this prefix sets the role.
pub const EXTRACTION_ROLE: &str = "You are an expert resume writer and ATS specialist. \
    You extract resume content into a fixed JSON structure, emphasising the experience \
    most relevant to the target job.";

/// Extraction prompt template. Replace `{job_title}`, `{company_name}`,
/// `{priority_keywords}`, `{job_posting}` and `{master_resume}` before sending.
///
/// CRITICAL: the field names below are the serde names of `tailoring::content`.
/// Renaming one here without renaming it there silently drops that field.
pub const EXTRACTION_PROMPT_TEMPLATE: &str = r#"Extract the resume below into JSON, tailored to the target job.

TARGET JOB (use it to prioritise and order relevant content):
Job Title: {job_title}
Company: {company_name}
Priority Keywords: {priority_keywords}
Job Description:
{job_posting}

RESUME TEXT:
{master_resume}

Return ONLY a JSON object with this EXACT structure:
{
  "name": "Full Name",
  "phone": "(123) 456-7890",
  "email": "email@example.com",
  "linkedin": "linkedin.com/in/username",
  "linkedinUrl": "https://linkedin.com/in/username",
  "github": "github.com/username",
  "githubUrl": "https://github.com/username",
  "website": "username.dev",
  "websiteUrl": "https://username.dev",
  "education": [
    {
      "school": "University Name",
      "location": "City, State",
      "degree": "Bachelor of Science in Computer Science",
      "dates": "Aug 2018 - May 2022",
      "highlights": ["GPA: 3.8", "Dean's List"]
    }
  ],
  "experience": [
    {
      "title": "Job Title",
      "dates": "Jun 2022 - Present",
      "company": "Company Name",
      "location": "City, State",
      "bullets": ["Achievement with quantified impact"]
    }
  ],
  "projects": [
    {
      "name": "Project Name",
      "techStack": "Rust, PostgreSQL, Docker",
      "dates": "2023 or a link",
      "bullets": ["What was built and its impact"]
    }
  ],
  "skills": {
    "languages": "Rust, Python, SQL",
    "frameworks": "Axum, React",
    "developerTools": "Git, Docker, AWS",
    "databases": "PostgreSQL, Redis",
    "libraries": "Tokio, pandas",
    "other": ""
  }
}

Rules:
- Education and experience: most recent first.
- Keep every metric and number exactly as written in the resume.
- Reword bullets to use the job description's vocabulary where the resume supports it.
- Skills are comma-separated strings; put anything that fits no bucket in "other".
- Plain text only in every value: no LaTeX, no markdown."#;

/// System prompt for the free-form path, used when structured extraction fails.
pub const FREEFORM_SYSTEM: &str = "You are an expert resume writer who produces complete \
    LaTeX documents using Jake's resume template macros: \\resumeSubheading, \\resumeItem, \
    \\resumeProjectHeading, \\resumeSubHeadingListStart/End and \\resumeItemListStart/End. \
    You output LaTeX only, with no commentary.";

/// Free-form prompt template. Same placeholders as `EXTRACTION_PROMPT_TEMPLATE`.
pub const FREEFORM_PROMPT_TEMPLATE: &str = r#"Write a complete, compilable LaTeX resume tailored to the target job.

TARGET JOB:
Job Title: {job_title}
Company: {company_name}
Priority Keywords: {priority_keywords}
Job Description:
{job_posting}

RESUME TEXT:
{master_resume}

Requirements:
- Start with \documentclass and end with \end{document}.
- Sections in this order: Education, Experience, Projects, Technical Skills.
- Wrap every \resumeItem in \resumeItemListStart / \resumeItemListEnd.
- The Technical Skills section uses a plain itemize with \item, not \resumeItem.
- Escape &, %, $, #, _ in text.

Use the EXACT sentinel format, with no other text before or after:

%__BEGIN_LATEX__
[complete LaTeX document]
%__END_LATEX__"#;

/// System prompt for job-posting analysis.
pub const ANALYSIS_ROLE: &str = "You are an expert job market analyst and ATS specialist. \
    You analyse job postings to extract the requirements and keywords a resume must cover.";

/// Analysis prompt template. Replace `{job_title}`, `{company_name}` and
/// `{job_posting}` before sending.
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyse this job posting.

Job Title: {job_title}
Company: {company_name}
Job Posting:
{job_posting}

Return ONLY a JSON object with this EXACT structure:
{
  "required_skills": ["skills the posting explicitly requires"],
  "preferred_skills": ["nice-to-have skills and qualifications"],
  "primary_keywords": ["must-have ATS keywords, most important first"],
  "secondary_keywords": ["supporting ATS keywords"],
  "experience_level": "ENTRY | MID | SENIOR | EXECUTIVE",
  "optimization_tips": ["concrete advice for tailoring a resume to this posting"]
}

Rules:
- Use the posting's own wording for skills and keywords.
- At most 15 items per list."#;

/// Full analysis system prompt.
pub fn analysis_system() -> String {
    format!("{ANALYSIS_ROLE} {JSON_ONLY_SYSTEM}")
}

/// Fills `ANALYSIS_PROMPT_TEMPLATE`.
pub fn render_analysis_prompt(
    job_posting: &str,
    job_title: Option<&str>,
    company_name: Option<&str>,
) -> String {
    fill_placeholders(
        ANALYSIS_PROMPT_TEMPLATE,
        &[
            ("{job_title}", job_title.unwrap_or("Not provided")),
            ("{company_name}", company_name.unwrap_or("Not provided")),
            ("{job_posting}", job_posting),
        ],
    )
}

/// Full extraction system prompt.
pub fn extraction_system() -> String {
    format!("{EXTRACTION_ROLE} {JSON_ONLY_SYSTEM}\n\n{GROUNDING_INSTRUCTION}\n\n{NO_PLACEHOLDER_INSTRUCTION}")
}

/// Full free-form system prompt.
pub fn freeform_system() -> String {
    format!("{FREEFORM_SYSTEM}\n\n{GROUNDING_INSTRUCTION}")
}

/// Fills a prompt template in a single left-to-right pass, so placeholder text
/// inside any substituted value is never expanded. Priority keywords are the
/// posting's most frequent terms.
pub fn render_prompt(
    template: &str,
    master_resume: &str,
    job_posting: &str,
    job_title: Option<&str>,
    company_name: Option<&str>,
) -> String {
    let keywords = extract_keywords(job_posting).join(", ");
    let keywords = if keywords.is_empty() { "Not provided" } else { keywords.as_str() };

    fill_placeholders(
        template,
        &[
            ("{job_title}", job_title.unwrap_or("Not provided")),
            ("{company_name}", company_name.unwrap_or("Not provided")),
            ("{priority_keywords}", keywords),
            ("{job_posting}", job_posting),
            ("{master_resume}", master_resume),
        ],
    )
}

/// Replaces each `key` occurrence in `template` with its value. Values are
/// copied verbatim and never rescanned.
pub fn fill_placeholders(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find('{') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match values.iter().find(|(key, _)| rest.starts_with(key)) {
            Some((key, value)) => {
                out.push_str(value);
                rest = &rest[key.len()..];
            }
            None => {
                out.push('{');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
