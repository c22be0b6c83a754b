//! Job Analysis: the requirements, keywords and seniority of a job posting.
//!
//! Asks the generator first. Any generator or parse failure degrades to a
//! keyword-frequency analysis of the posting itself, so the call never fails.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::TextGenerator;
use crate::tailoring::extraction::clean_json_response;
use crate::tailoring::prompts::{analysis_system, render_analysis_prompt};
use crate::tailoring::scoring::extract_keywords;

/// Keywords split between the primary and secondary lists in the heuristic analysis.
const PRIMARY_KEYWORDS: usize = 10;
const MAX_LIST_ITEMS: usize = 15;

/// Skills recognised by the heuristic analysis. Matched as whole words, case-insensitively.
const KNOWN_SKILLS: &[&str] = &[
    "rust", "go", "python", "java", "kotlin", "scala", "javascript", "typescript", "c++", "c#",
    "ruby", "php", "swift", "sql", "react", "angular", "vue", "node.js", "django", "flask",
    "spring", "axum", "tokio", "postgresql", "mysql", "mongodb", "redis", "kafka", "docker",
    "kubernetes", "terraform", "aws", "gcp", "azure", "linux", "git", "graphql", "grpc",
    "machine learning", "distributed systems", "microservices", "ci/cd",
];

const PREFERRED_MARKERS: &[&str] = &["preferred", "nice to have", "a plus", "bonus"];

const HEURISTIC_TIPS: &[&str] = &[
    "Mirror the posting's primary keywords where your experience supports them",
    "Quantify achievements with numbers, percentages or scale",
    "Lead bullets with strong action verbs",
];

static RE_YEARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{1,2})\s*\+?\s*(?:years?|yrs?)").expect("years regex")
});

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Request body for job analysis.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeJobRequest {
    pub job_posting: String,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
}

impl AnalyzeJobRequest {
    pub fn validated(mut self) -> Result<Self, AppError> {
        if self.job_posting.trim().is_empty() {
            return Err(AppError::Validation("job_posting cannot be empty".to_string()));
        }
        self.job_title = self.job_title.filter(|t| !t.trim().is_empty());
        self.company_name = self.company_name.filter(|c| !c.trim().is_empty());
        Ok(self)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExperienceLevel {
    Entry,
    #[default]
    Mid,
    Senior,
    Executive,
}

impl ExperienceLevel {
    /// Lenient label match: "Senior / Lead" → `Senior`. Unknown labels are `Mid`.
    pub fn from_label(label: &str) -> Self {
        let label = label.to_lowercase();
        let mentions = |words: &[&str]| words.iter().any(|w| contains_word(&label, w));
        if mentions(&["executive", "director", "vp", "chief"]) {
            ExperienceLevel::Executive
        } else if mentions(&["senior", "lead", "staff", "principal"]) {
            ExperienceLevel::Senior
        } else if mentions(&["entry", "junior", "intern", "graduate"]) {
            ExperienceLevel::Entry
        } else {
            ExperienceLevel::Mid
        }
    }

    fn from_years(years: u32) -> Self {
        match years {
            0..=1 => ExperienceLevel::Entry,
            2..=4 => ExperienceLevel::Mid,
            5..=9 => ExperienceLevel::Senior,
            _ => ExperienceLevel::Executive,
        }
    }
}

/// Where an analysis came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisSource {
    Generator,
    #[default]
    Heuristic,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobAnalysis {
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub preferred_skills: Vec<String>,
    #[serde(default)]
    pub primary_keywords: Vec<String>,
    #[serde(default)]
    pub secondary_keywords: Vec<String>,
    #[serde(default, deserialize_with = "lenient_level")]
    pub experience_level: ExperienceLevel,
    #[serde(default)]
    pub optimization_tips: Vec<String>,
    #[serde(skip_deserializing)]
    pub source: AnalysisSource,
}

// ────────────────────────────────────────────────────────────────────────────
// Analysis
// ────────────────────────────────────────────────────────────────────────────

/// Analyses `request.job_posting`. Never fails.
pub async fn analyze_job(
    generator: &dyn TextGenerator,
    request: &AnalyzeJobRequest,
) -> JobAnalysis {
    let prompt = render_analysis_prompt(
        &request.job_posting,
        request.job_title.as_deref(),
        request.company_name.as_deref(),
    );

    let parsed = match generator.generate(&analysis_system(), &prompt).await {
        Ok(raw) => parse_analysis(&raw),
        Err(e) => {
            warn!("Job analysis generator call failed: {e} (posting_len={})", request.job_posting.len());
            None
        }
    };

    let mut analysis = match parsed {
        Some(analysis) => analysis,
        None => {
            warn!("Falling back to heuristic job analysis");
            heuristic_analysis(&request.job_posting)
        }
    };

    analysis.job_title = request.job_title.clone();
    analysis.company_name = request.company_name.clone();
    info!(
        "Job analysis finished: source={:?}, required={}, primary_keywords={}",
        analysis.source,
        analysis.required_skills.len(),
        analysis.primary_keywords.len()
    );
    analysis
}

/// Parses a generator reply. `None` when it does not parse or names no skills
/// and no keywords.
pub fn parse_analysis(raw: &str) -> Option<JobAnalysis> {
    let mut analysis: JobAnalysis = match serde_json::from_str(clean_json_response(raw)) {
        Ok(analysis) => analysis,
        Err(e) => {
            warn!("Job analysis reply is not valid JSON: {e} (raw_len={})", raw.len());
            return None;
        }
    };

    for list in [
        &mut analysis.required_skills,
        &mut analysis.preferred_skills,
        &mut analysis.primary_keywords,
        &mut analysis.secondary_keywords,
        &mut analysis.optimization_tips,
    ] {
        tidy_list(list);
    }

    if analysis.required_skills.is_empty() && analysis.primary_keywords.is_empty() {
        return None;
    }
    analysis.source = AnalysisSource::Generator;
    Some(analysis)
}

/// Keyword-frequency analysis of the posting alone.
pub fn heuristic_analysis(job_posting: &str) -> JobAnalysis {
    let lowered = job_posting.to_lowercase();
    let (preferred_part, required_part) = split_preferred(&lowered);

    let mut required_skills = matched_skills(required_part);
    let preferred_skills: Vec<String> = matched_skills(preferred_part)
        .into_iter()
        .filter(|s| !required_skills.contains(s))
        .collect();
    required_skills.truncate(MAX_LIST_ITEMS);

    let mut keywords = extract_keywords(job_posting);
    let secondary_keywords = keywords.split_off(keywords.len().min(PRIMARY_KEYWORDS));

    JobAnalysis {
        required_skills,
        preferred_skills,
        primary_keywords: keywords,
        secondary_keywords,
        experience_level: estimate_level(job_posting),
        optimization_tips: HEURISTIC_TIPS.iter().map(|t| t.to_string()).collect(),
        source: AnalysisSource::Heuristic,
        ..JobAnalysis::default()
    }
}

/// Largest "N years" figure in the posting, else seniority words, else `Mid`.
fn estimate_level(job_posting: &str) -> ExperienceLevel {
    let years = RE_YEARS
        .captures_iter(job_posting)
        .filter_map(|c| c[1].parse::<u32>().ok())
        .max();
    match years {
        Some(years) => ExperienceLevel::from_years(years),
        None => ExperienceLevel::from_label(job_posting),
    }
}

/// Splits at the first preferred-qualifications marker: (preferred tail, required head).
fn split_preferred(lowered: &str) -> (&str, &str) {
    match PREFERRED_MARKERS.iter().filter_map(|m| lowered.find(m)).min() {
        Some(pos) => (&lowered[pos..], &lowered[..pos]),
        None => ("", lowered),
    }
}

fn matched_skills(text: &str) -> Vec<String> {
    KNOWN_SKILLS
        .iter()
        .filter(|skill| contains_word(text, skill))
        .map(|skill| skill.to_string())
        .collect()
}

/// `needle` occurs in `haystack` with no alphanumeric character on either side.
fn contains_word(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(pos, _)| {
        let before = haystack[..pos].chars().next_back();
        let after = haystack[pos + needle.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// Trims, drops blanks and duplicates, caps the length.
fn tidy_list(list: &mut Vec<String>) {
    let mut seen: Vec<String> = Vec::new();
    list.retain_mut(|item| {
        *item = item.trim().to_string();
        let key = item.to_lowercase();
        if item.is_empty() || seen.contains(&key) {
            return false;
        }
        seen.push(key);
        true
    });
    list.truncate(MAX_LIST_ITEMS);
}

fn lenient_level<'de, D>(deserializer: D) -> Result<ExperienceLevel, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .map(|label| ExperienceLevel::from_label(&label))
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::llm_client::LlmError;

    const POSTING: &str = "Senior Backend Engineer. We need 6+ years of Rust and PostgreSQL. \
        You will run services on Kubernetes and AWS. Nice to have: Kafka, Go.";

    struct FixedGenerator(Option<&'static str>);

    #[async_trait]
    impl TextGenerator for FixedGenerator {
        async fn generate(&self, _system: &str, _prompt: &str) -> Result<String, LlmError> {
            self.0.map(str::to_string).ok_or(LlmError::NotConfigured)
        }
    }

    fn request() -> AnalyzeJobRequest {
        AnalyzeJobRequest {
            job_posting: POSTING.to_string(),
            job_title: Some("Backend Engineer".to_string()),
            company_name: None,
        }
    }

    #[test]
    fn test_heuristic_splits_required_and_preferred() {
        let analysis = heuristic_analysis(POSTING);
        for skill in ["rust", "postgresql", "kubernetes", "aws"] {
            assert!(analysis.required_skills.contains(&skill.to_string()), "missing {skill}");
        }
        assert_eq!(analysis.preferred_skills, vec!["go", "kafka"]);
        assert_eq!(analysis.experience_level, ExperienceLevel::Senior);
        assert_eq!(analysis.source, AnalysisSource::Heuristic);
    }

    #[test]
    fn test_heuristic_keywords_follow_posting_frequency() {
        let analysis = heuristic_analysis("Rust rust RUST. Tokio tokio. Axum.");
        assert_eq!(analysis.primary_keywords[0], "rust");
        assert_eq!(analysis.primary_keywords[1], "tokio");
        assert!(analysis.secondary_keywords.is_empty());
    }

    #[test]
    fn test_skill_matching_needs_word_boundaries() {
        assert!(!contains_word("we use django daily", "go"));
        assert!(contains_word("go, rust", "go"));
        assert!(contains_word("strong c++ skills", "c++"));
    }

    #[test]
    fn test_level_from_years_and_labels() {
        assert_eq!(estimate_level("1 year of experience"), ExperienceLevel::Entry);
        assert_eq!(estimate_level("3+ yrs"), ExperienceLevel::Mid);
        assert_eq!(estimate_level("Principal engineer"), ExperienceLevel::Senior);
        assert_eq!(estimate_level("a role"), ExperienceLevel::Mid);
        assert_eq!(ExperienceLevel::from_label("Junior"), ExperienceLevel::Entry);
        assert_eq!(estimate_level("Build internal tools"), ExperienceLevel::Mid);
    }

    #[test]
    fn test_parse_analysis_accepts_fenced_json() {
        let raw = "```json\n{\"required_skills\": [\"Rust\", \" rust \", \"\"], \"experience_level\": \"Senior/Lead\"}\n```";
        let analysis = parse_analysis(raw).unwrap();
        assert_eq!(analysis.required_skills, vec!["Rust"]);
        assert_eq!(analysis.experience_level, ExperienceLevel::Senior);
        assert_eq!(analysis.source, AnalysisSource::Generator);
    }

    #[test]
    fn test_parse_analysis_rejects_empty_and_malformed() {
        assert!(parse_analysis("{\"optimization_tips\": [\"x\"]}").is_none());
        assert!(parse_analysis("not json").is_none());
    }

    #[tokio::test]
    async fn test_generator_failure_falls_back_to_heuristic() {
        let analysis = analyze_job(&FixedGenerator(None), &request()).await;
        assert_eq!(analysis.source, AnalysisSource::Heuristic);
        assert_eq!(analysis.job_title.as_deref(), Some("Backend Engineer"));
        assert!(!analysis.primary_keywords.is_empty());
    }

    #[tokio::test]
    async fn test_generator_analysis_is_used() {
        let generator = FixedGenerator(Some(r#"{"required_skills": ["Rust"], "primary_keywords": ["backend"]}"#));
        let analysis = analyze_job(&generator, &request()).await;
        assert_eq!(analysis.source, AnalysisSource::Generator);
        assert_eq!(analysis.primary_keywords, vec!["backend"]);
    }

    #[test]
    fn test_blank_posting_rejected() {
        let req = AnalyzeJobRequest {
            job_posting: " ".to_string(),
            job_title: None,
            company_name: None,
        };
        assert!(matches!(req.validated(), Err(AppError::Validation(_))));
    }
}
