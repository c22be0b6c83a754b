//! Free-form Recovery Pipeline: turns generator text that claims to be a document
//! into a structurally valid one.
//!
//! Stages, in order:
//! 1. `strip_narration`   : drop code fences and chatty lead-in lines (idempotent)
//! 2. `extract_boundaries`: sentinel span → document span → body span → markup → plain text
//! 3. `normalize_unicode` : typographic substitutions only, no reserved-char escaping
//! 4. `complete_structure`: close an unterminated document
//! 5. `repair_orphan_items`
//! 6. `validate`          : the only stage that can fail
//!
//! Stages 1–5 are total. A `RecoveryError` means the caller substitutes the
//! static fallback document.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::latex::escape::{escape, normalize_unicode};
use crate::latex::orphans::repair_orphan_items;
use crate::latex::template::{
    wrap, BEGIN_DOCUMENT, BEGIN_SENTINEL, DOCUMENT_CLASS, END_DOCUMENT, END_SENTINEL,
};

/// Documents shorter than this (after trimming) are rejected.
pub const MIN_DOCUMENT_LEN: usize = 50;

/// Sentinel pairs accepted by boundary extraction, most specific first.
const SENTINEL_PAIRS: &[(&str, &str)] = &[
    (BEGIN_SENTINEL, END_SENTINEL),
    ("%__BEGIN__", "%__END__"),
];

// ── Regex patterns ──────────────────────────────────────────────────────

static RE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*```+\s*[A-Za-z]*\s*$").expect("fence regex"));

static RE_NARRATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:here\s+is|here's|here’s|below\s+is|following\s+is|the\s+latex|this\s+latex)\b",
    )
    .expect("narration regex")
});

/// "Sure, here you go:" style lines. Only dropped when they end with a colon.
static RE_COURTESY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:sure|certainly|of\s+course|absolutely)\b.*:\s*$")
        .expect("courtesy regex")
});

static RE_MARKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\\(?:section|subsection|resumeItem|resumeSubItem|resumeSubheading|resumeProjectHeading|resumeSubHeadingListStart|resumeItemListStart|item|begin\{|textbf|textit|emph|href|vspace|hfill)",
    )
    .expect("markup regex")
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecoveryError {
    #[error("generator text is empty after narration stripping")]
    Empty,

    #[error("document is missing {0}")]
    MissingMarker(&'static str),

    #[error("document too short to be valid ({len} chars, minimum {min})", min = MIN_DOCUMENT_LEN)]
    TooShort { len: usize },
}

/// Which boundary-extraction rule matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryStrategy {
    /// Text strictly between a sentinel pair.
    Sentinel,
    /// `\documentclass` through the last `\end{document}`.
    DocumentSpan,
    /// Body between `\begin{document}` and `\end{document}`, re-wrapped.
    BodySpan,
    /// Whole text wrapped as a body because it contains markup commands.
    MarkupBody,
    /// Whole text escaped as prose and wrapped.
    PlainText,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub text: String,
    pub strategy: BoundaryStrategy,
}

/// A validated document plus the boundary rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recovered {
    pub latex: String,
    pub strategy: BoundaryStrategy,
}

/// Runs all stages and returns the document text.
pub fn recover(raw: &str) -> Result<String, RecoveryError> {
    recover_with_strategy(raw).map(|r| r.latex)
}

/// Runs all stages, also reporting which boundary rule matched.
pub fn recover_with_strategy(raw: &str) -> Result<Recovered, RecoveryError> {
    let stripped = strip_narration(raw);
    if stripped.is_empty() {
        warn!("Recovery rejected input: empty after narration stripping (raw_len={})", raw.len());
        return Err(RecoveryError::Empty);
    }

    let Extracted { text, strategy } = extract_boundaries(&stripped);
    debug!(
        "Boundary extraction: strategy={:?} raw_len={} extracted_len={}",
        strategy,
        raw.len(),
        text.len()
    );

    let text = normalize_unicode(&text);
    let text = complete_structure(&text);
    let text = repair_orphan_items(&text);

    if let Err(e) = validate(&text) {
        warn!(
            "Recovery validation failed: {e} (strategy={:?}, raw_len={}, final_len={})",
            strategy,
            raw.len(),
            text.len()
        );
        return Err(e);
    }

    Ok(Recovered {
        latex: text,
        strategy,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Stage 1: narration stripping
// ────────────────────────────────────────────────────────────────────────────

/// Removes code-fence lines and narrative lead-in lines, then trims.
pub fn strip_narration(text: &str) -> String {
    text.lines()
        .filter(|line| {
            !RE_FENCE.is_match(line) && !RE_NARRATION.is_match(line) && !RE_COURTESY.is_match(line)
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

// ────────────────────────────────────────────────────────────────────────────
// Stage 2: boundary extraction
// ────────────────────────────────────────────────────────────────────────────

/// Picks the document out of `text` using the first rule that applies.
pub fn extract_boundaries(text: &str) -> Extracted {
    if let Some(inner) = sentinel_span(text) {
        return Extracted {
            text: inner.to_string(),
            strategy: BoundaryStrategy::Sentinel,
        };
    }

    if let Some(start) = text.find(DOCUMENT_CLASS) {
        // Without a closing command the span runs to the end of the text and
        // structural completion (or validation) deals with the rest.
        let end = text
            .rfind(END_DOCUMENT)
            .filter(|&end| end > start)
            .map(|end| end + END_DOCUMENT.len())
            .unwrap_or(text.len());
        return Extracted {
            text: text[start..end].trim().to_string(),
            strategy: BoundaryStrategy::DocumentSpan,
        };
    }

    if let Some(body) = body_span(text) {
        return Extracted {
            text: wrap(body),
            strategy: BoundaryStrategy::BodySpan,
        };
    }

    if RE_MARKUP.is_match(text) {
        return Extracted {
            text: wrap(text),
            strategy: BoundaryStrategy::MarkupBody,
        };
    }

    Extracted {
        text: wrap(&escape(text)),
        strategy: BoundaryStrategy::PlainText,
    }
}

/// Text strictly between the first sentinel pair present in order, trimmed.
fn sentinel_span(text: &str) -> Option<&str> {
    SENTINEL_PAIRS.iter().find_map(|(begin, end)| {
        let start = text.find(begin)? + begin.len();
        let len = text[start..].find(end)?;
        let inner = text[start..start + len].trim();
        (!inner.is_empty()).then_some(inner)
    })
}

/// Body after `\begin{document}`, up to the last `\end{document}` or the end of the text.
fn body_span(text: &str) -> Option<&str> {
    let start = text.find(BEGIN_DOCUMENT)? + BEGIN_DOCUMENT.len();
    let end = text
        .rfind(END_DOCUMENT)
        .filter(|&end| end >= start)
        .unwrap_or(text.len());
    Some(&text[start..end])
}

// ────────────────────────────────────────────────────────────────────────────
// Stage 4: structural completion
// ────────────────────────────────────────────────────────────────────────────

/// Re-wraps a body that lacks a document class, appends a missing
/// `\end{document}`, and wraps text that has neither a document class nor a
/// body opening. Anything else passes through unchanged.
pub fn complete_structure(text: &str) -> String {
    let has_class = text.contains(DOCUMENT_CLASS);
    let has_begin = text.contains(BEGIN_DOCUMENT);
    let has_end = text.contains(END_DOCUMENT);

    if !has_class {
        if let Some(body) = body_span(text) {
            debug!("Re-wrapping body that has no {DOCUMENT_CLASS}");
            return wrap(body);
        }
    }
    if has_begin && !has_end {
        debug!("Appending missing {END_DOCUMENT}");
        return format!("{}\n{END_DOCUMENT}", text.trim_end());
    }
    if !has_class && !has_begin {
        return wrap(text);
    }
    text.to_string()
}

// ────────────────────────────────────────────────────────────────────────────
// Stage 6: validation
// ────────────────────────────────────────────────────────────────────────────

pub fn validate(text: &str) -> Result<(), RecoveryError> {
    for marker in [DOCUMENT_CLASS, BEGIN_DOCUMENT, END_DOCUMENT] {
        if !text.contains(marker) {
            return Err(RecoveryError::MissingMarker(marker));
        }
    }

    let len = text.trim().chars().count();
    if len < MIN_DOCUMENT_LEN {
        return Err(RecoveryError::TooShort { len });
    }
    Ok(())
}
