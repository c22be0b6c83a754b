//! Content Scoring: how well a tailored document covers a job posting.
//!
//! Pure-Rust, deterministic, no generator call. Two signals:
//! - keyword coverage: share of the posting's top keywords present in the document
//! - quantification: density of measurable achievements (percentages, money, team sizes, ...)
//!
//! overall = 0.85 × coverage + 0.15 × quantification, clamped to [0, 1].

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::latex::template::BEGIN_DOCUMENT;

/// Number of posting keywords the coverage is measured against.
const MAX_KEYWORDS: usize = 20;
const COVERAGE_WEIGHT: f64 = 0.85;
const QUANTIFICATION_WEIGHT: f64 = 0.15;
/// A well-quantified resume carries roughly this many metrics.
const QUANTIFICATION_TARGET: f64 = 7.0;

const STOPWORDS: &[&str] = &[
    "about", "above", "across", "after", "all", "also", "and", "any", "are", "as", "at", "be",
    "been", "being", "both", "but", "by", "can", "candidate", "candidates", "company", "do",
    "each", "etc", "experience", "for", "from", "has", "have", "help", "how", "ideal", "in",
    "including", "into", "is", "it", "its", "job", "join", "looking", "may", "more", "must",
    "new", "not", "of", "on", "or", "other", "our", "over", "plus", "preferred", "required",
    "requirements", "responsibilities", "role", "should", "such", "team", "than", "that", "the",
    "their", "them", "they", "this", "through", "to", "understanding", "using", "we", "well",
    "what", "who", "will", "with", "within", "work", "working", "would", "years", "you", "your",
];

static RE_QUANTIFIERS: LazyLock<[Regex; 5]> = LazyLock::new(|| {
    [
        r"\d+%",
        r"\$\d+[kmb]?",
        r"\d+\s*(?:years?|months?)",
        r"\d+\s*(?:people|members|employees|clients|engineers|users)",
        r"(?:increased|decreased|improved|reduced)\s+by\s+\d+",
    ]
    .map(|p| Regex::new(p).expect("quantifier regex"))
});

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ContentScore {
    /// 0.0 – 1.0
    pub overall: f64,
    pub keyword_coverage: f64,
    /// Coverage of the untailored master resume, for comparison.
    pub baseline_coverage: f64,
    pub quantification: f64,
    pub matched_keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
}

/// Scores `document` (LaTeX or plain text) against `job_posting`.
pub fn score_content(master_resume: &str, job_posting: &str, document: &str) -> ContentScore {
    let keywords = extract_keywords(job_posting);
    let text = document_text(document).to_lowercase();
    let baseline = master_resume.to_lowercase();

    let (matched_keywords, missing_keywords): (Vec<String>, Vec<String>) =
        keywords.into_iter().partition(|k| contains_keyword(&text, k));

    let total = matched_keywords.len() + missing_keywords.len();
    let keyword_coverage = ratio(matched_keywords.len(), total);
    let baseline_coverage = ratio(
        matched_keywords
            .iter()
            .chain(missing_keywords.iter())
            .filter(|k| contains_keyword(&baseline, k))
            .count(),
        total,
    );
    let quantification = quantification_score(&text);

    let overall = (COVERAGE_WEIGHT * keyword_coverage + QUANTIFICATION_WEIGHT * quantification)
        .clamp(0.0, 1.0);

    ContentScore {
        overall,
        keyword_coverage,
        baseline_coverage,
        quantification,
        matched_keywords,
        missing_keywords,
    }
}

/// Most frequent non-stopword tokens of the posting, ties broken alphabetically.
pub fn extract_keywords(job_posting: &str) -> Vec<String> {
    let mut counts: HashMap<String, u32> = HashMap::new();
    for token in tokenize(job_posting) {
        *counts.entry(token).or_insert(0) += 1;
    }

    let mut ranked: Vec<(String, u32)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
        .into_iter()
        .take(MAX_KEYWORDS)
        .map(|(keyword, _)| keyword)
        .collect()
}

/// Counts quantified achievements, normalised so `QUANTIFICATION_TARGET` scores 1.0.
pub fn quantification_score(text: &str) -> f64 {
    let lowered = text.to_lowercase();
    let count: usize = RE_QUANTIFIERS
        .iter()
        .map(|re| re.find_iter(&lowered).count())
        .sum();
    (count as f64 / QUANTIFICATION_TARGET).min(1.0)
}

/// Lowercased tokens. `+`, `#` and inner `.` stay attached so `c++`, `c#` and
/// `node.js` survive as single keywords.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || matches!(c, '+' | '#' | '.')))
        .map(|t| t.trim_matches('.').to_lowercase())
        .filter(|t| {
            let has_symbol = t.contains(['+', '#']);
            (t.chars().count() >= 3 || has_symbol)
                && !t.chars().all(|c| c.is_ascii_digit())
                && !STOPWORDS.contains(&t.as_str())
        })
}

fn contains_keyword(haystack: &str, keyword: &str) -> bool {
    haystack.contains(keyword)
}

/// Document body with escape backslashes removed, so `40\%` reads as `40%`.
fn document_text(document: &str) -> String {
    let body = document
        .find(BEGIN_DOCUMENT)
        .map(|i| &document[i + BEGIN_DOCUMENT.len()..])
        .unwrap_or(document);
    body.replace('\\', "")
}

fn ratio(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}
