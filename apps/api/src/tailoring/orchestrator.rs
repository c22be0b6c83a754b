//! Pipeline Orchestrator: sequences the tailoring paths for one request.
//!
//! Flow: Structured (extract → build) → Freeform (generate → recover) → Fallback.
//!
//! Every path ends in a document; nothing is retried here (retries belong to
//! the generator client) and no error escapes to the caller.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::latex::{build, fallback_document, recover};
use crate::llm_client::TextGenerator;
use crate::tailoring::content::ResumeContent;
use crate::tailoring::extraction::extract_content;
use crate::tailoring::prompts::{freeform_system, render_prompt, FREEFORM_PROMPT_TEMPLATE};
use crate::tailoring::scoring::{score_content, ContentScore};

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Request body for tailoring.
#[derive(Debug, Clone, Deserialize)]
pub struct TailorRequest {
    pub master_resume: String,
    pub job_posting: String,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
}

impl TailorRequest {
    /// Rejects blank required inputs and normalises blank optional ones to `None`.
    pub fn validated(mut self) -> Result<Self, AppError> {
        if self.master_resume.trim().is_empty() {
            return Err(AppError::Validation("master_resume cannot be empty".to_string()));
        }
        if self.job_posting.trim().is_empty() {
            return Err(AppError::Validation("job_posting cannot be empty".to_string()));
        }
        self.job_title = self.job_title.filter(|t| !t.trim().is_empty());
        self.company_name = self.company_name.filter(|c| !c.trim().is_empty());
        Ok(self)
    }
}

/// Which path produced the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelinePath {
    Structured,
    Freeform,
    Fallback,
}

impl PipelinePath {
    pub fn as_str(self) -> &'static str {
        match self {
            PipelinePath::Structured => "structured",
            PipelinePath::Freeform => "freeform",
            PipelinePath::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TailoredDocument {
    pub latex: String,
    pub path: PipelinePath,
    /// Present only on the structured path.
    pub content: Option<ResumeContent>,
    pub score: ContentScore,
}

// ────────────────────────────────────────────────────────────────────────────
// Orchestration
// ────────────────────────────────────────────────────────────────────────────

/// Produces a document for `request`. Never fails.
pub async fn tailor(generator: &dyn TextGenerator, request: &TailorRequest) -> TailoredDocument {
    info!(
        "Tailoring started: resume_len={}, posting_len={}",
        request.master_resume.len(),
        request.job_posting.len()
    );

    let (latex, path, content) = match extract_content(generator, request).await {
        Some(content) => {
            info!("Structured path succeeded, building document");
            (build(Some(&content)), PipelinePath::Structured, Some(content))
        }
        None => {
            warn!("Structured path yielded no content, entering free-form path");
            match freeform(generator, request).await {
                Some(latex) => (latex, PipelinePath::Freeform, None),
                None => {
                    warn!("Free-form path failed, substituting fallback document");
                    (fallback_document(), PipelinePath::Fallback, None)
                }
            }
        }
    };

    let score = score_content(&request.master_resume, &request.job_posting, &latex);
    info!(
        "Tailoring finished: path={}, latex_len={}, score={:.2}",
        path.as_str(),
        latex.len(),
        score.overall
    );

    TailoredDocument {
        latex,
        path,
        content,
        score,
    }
}

/// Asks the generator for a sentinel-wrapped document and recovers it.
async fn freeform(generator: &dyn TextGenerator, request: &TailorRequest) -> Option<String> {
    let prompt = render_prompt(
        FREEFORM_PROMPT_TEMPLATE,
        &request.master_resume,
        &request.job_posting,
        request.job_title.as_deref(),
        request.company_name.as_deref(),
    );

    let raw = match generator.generate(&freeform_system(), &prompt).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Free-form generator call failed: {e}");
            return None;
        }
    };

    match recover(&raw) {
        Ok(latex) => {
            info!(
                "Free-form recovery succeeded: raw_len={}, latex_len={}",
                raw.len(),
                latex.len()
            );
            Some(latex)
        }
        Err(e) => {
            warn!("Free-form recovery failed: {e} (raw_len={})", raw.len());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::latex::template::{
        BEGIN_DOCUMENT, BEGIN_SENTINEL, DOCUMENT_CLASS, END_DOCUMENT, END_SENTINEL,
        FALLBACK_NOTICE,
    };
    use crate::llm_client::LlmError;

    /// Replays canned replies in order; `None` is a generator failure.
    struct ScriptedGenerator {
        replies: Mutex<VecDeque<Option<String>>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn new(replies: Vec<Option<&str>>) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().map(|r| r.map(String::from)).collect()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, system: &str, _prompt: &str) -> Result<String, LlmError> {
            self.calls.lock().unwrap().push(system.to_string());
            match self.replies.lock().unwrap().pop_front().flatten() {
                Some(reply) => Ok(reply),
                None => Err(LlmError::Api {
                    status: 503,
                    message: "scripted failure".to_string(),
                }),
            }
        }
    }

    fn request() -> TailorRequest {
        TailorRequest {
            master_resume: "Ada Lovelace\nEngineer at Acme, shipped X".to_string(),
            job_posting: "Acme is hiring an engineer to ship things.".to_string(),
            job_title: Some("Engineer".to_string()),
            company_name: Some("Acme".to_string()),
        }
    }

    fn assert_complete(doc: &str) {
        assert!(doc.contains(DOCUMENT_CLASS));
        assert!(doc.contains(BEGIN_DOCUMENT));
        assert!(doc.trim_end().ends_with(END_DOCUMENT));
    }

    #[tokio::test]
    async fn test_structured_path() {
        let json = r#"{"name": "Ada Lovelace", "experience": [{"title": "Engineer", "company": "Acme", "bullets": ["Shipped X"]}]}"#;
        let generator = ScriptedGenerator::new(vec![Some(json)]);

        let doc = tailor(&generator, &request()).await;

        assert_eq!(doc.path, PipelinePath::Structured);
        assert_eq!(generator.call_count(), 1, "free-form path must not run");
        assert!(doc.latex.contains("Ada Lovelace"));
        assert!(doc.latex.contains("\\resumeItem{Shipped X}"));
        assert_eq!(doc.content.unwrap().contact.name, "Ada Lovelace");
        assert_complete(&doc.latex);
    }

    #[tokio::test]
    async fn test_malformed_json_falls_through_to_freeform() {
        let freeform = format!(
            "Here is your resume:\n{BEGIN_SENTINEL}\n\\documentclass{{article}}\n\\begin{{document}}\n\\section{{Experience}}\n\\resumeItem{{Shipped X}}\n\\end{{document}}\n{END_SENTINEL}"
        );
        let generator = ScriptedGenerator::new(vec![Some("{\"name\": "), Some(freeform.as_str())]);

        let doc = tailor(&generator, &request()).await;

        assert_eq!(doc.path, PipelinePath::Freeform);
        assert_eq!(generator.call_count(), 2);
        assert!(doc.content.is_none());
        assert!(doc.latex.contains("\\begin{itemize}\n\\resumeItem{Shipped X}\n\\end{itemize}"));
        assert_complete(&doc.latex);
    }

    #[tokio::test]
    async fn test_extraction_error_then_freeform_success() {
        let freeform = "\\section{Experience}\nEngineer at Acme, shipped X to production.";
        let generator = ScriptedGenerator::new(vec![None, Some(freeform)]);

        let doc = tailor(&generator, &request()).await;

        assert_eq!(doc.path, PipelinePath::Freeform);
        assert!(doc.latex.contains("shipped X to production."));
    }

    #[tokio::test]
    async fn test_total_generator_failure_yields_fallback() {
        let generator = ScriptedGenerator::new(vec![None, None]);

        let doc = tailor(&generator, &request()).await;

        assert_eq!(doc.path, PipelinePath::Fallback);
        assert_eq!(generator.call_count(), 2, "no state is retried");
        assert!(doc.latex.contains(FALLBACK_NOTICE));
        assert_complete(&doc.latex);
    }

    #[tokio::test]
    async fn test_unrecoverable_freeform_yields_fallback() {
        let generator = ScriptedGenerator::new(vec![Some("nope"), Some("```latex\n```")]);

        let doc = tailor(&generator, &request()).await;

        assert_eq!(doc.path, PipelinePath::Fallback);
        assert_eq!(doc.latex, fallback_document());
    }

    #[tokio::test]
    async fn test_score_is_attached() {
        let generator = ScriptedGenerator::new(vec![None, None]);
        let doc = tailor(&generator, &request()).await;
        assert!((0.0..=1.0).contains(&doc.score.overall));
    }

    #[test]
    fn test_blank_inputs_rejected() {
        let mut req = request();
        req.job_posting = "   ".to_string();
        assert!(matches!(req.validated(), Err(AppError::Validation(_))));

        let mut req = request();
        req.master_resume = String::new();
        assert!(matches!(req.validated(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_blank_optional_fields_become_none() {
        let mut req = request();
        req.company_name = Some("  ".to_string());
        let req = req.validated().unwrap();
        assert_eq!(req.company_name, None);
        assert_eq!(req.job_title.as_deref(), Some("Engineer"));
    }
}
