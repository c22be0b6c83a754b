//! Extraction Adapter: asks the generator for resume JSON and turns the reply
//! into a `ResumeContent`, or `None`.
//!
//! Every failure here is recoverable: the orchestrator moves to the free-form
//! path on `None`, so nothing is propagated as an error.

use tracing::{debug, info, warn};

use crate::llm_client::{strip_json_fences, TextGenerator};
use crate::tailoring::content::ResumeContent;
use crate::tailoring::orchestrator::TailorRequest;
use crate::tailoring::prompts::{extraction_system, render_prompt, EXTRACTION_PROMPT_TEMPLATE};

/// Calls the generator for structured content. Fast-fails to `None` on any
/// generator error, unparseable reply or content-free result.
pub async fn extract_content(
    generator: &dyn TextGenerator,
    request: &TailorRequest,
) -> Option<ResumeContent> {
    let prompt = render_prompt(
        EXTRACTION_PROMPT_TEMPLATE,
        &request.master_resume,
        &request.job_posting,
        request.job_title.as_deref(),
        request.company_name.as_deref(),
    );

    let raw = match generator.generate(&extraction_system(), &prompt).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(
                "Extraction generator call failed: {e} (resume_len={}, posting_len={})",
                request.master_resume.len(),
                request.job_posting.len()
            );
            return None;
        }
    };

    let content = parse_content(&raw)?;
    info!(
        "Extracted structured content: {} education, {} experience, {} projects",
        content.education.len(),
        content.experience.len(),
        content.projects.len()
    );
    Some(content)
}

/// Cleans and parses a generator reply. `None` when it does not parse or
/// carries nothing renderable.
pub fn parse_content(raw: &str) -> Option<ResumeContent> {
    let cleaned = clean_json_response(raw);
    debug!("Parsing extraction reply: raw_len={} cleaned_len={}", raw.len(), cleaned.len());

    let content: ResumeContent = match serde_json::from_str(cleaned) {
        Ok(content) => content,
        Err(e) => {
            warn!("Extraction reply is not valid content JSON: {e} (raw_len={})", raw.len());
            return None;
        }
    };

    if content.is_effectively_empty() {
        warn!("Extraction reply parsed but carries no name and no sections");
        return None;
    }
    Some(content)
}

/// Strips code fences, then slices from the first `{` to the last `}` so any
/// prose around the object is discarded. Text without an ordered brace pair is
/// returned fence-stripped only.
pub fn clean_json_response(raw: &str) -> &str {
    let text = strip_json_fences(raw);
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    }
}
