//! The one escaping function for user text, plus the placeholder and Unicode
//! normalization it is built from.
//!
//! HAZARD: `escape` is NOT idempotent. `escape("\\")` yields `\textbackslash{}`,
//! and escaping that again yields `\textbackslash{}textbackslash\{\}`. Every
//! free-text field must pass through it exactly once, at the point where it is
//! placed into a macro argument.

/// Generator output that means "no value". Compared trimmed and lowercased.
const PLACEHOLDERS: &[&str] = &[
    "",
    "n/a",
    "na",
    "none",
    "null",
    "nil",
    "undefined",
    "unknown",
    "not specified",
    "not applicable",
    "not available",
    "not provided",
    "tbd",
    "to be determined",
    "-",
    "--",
    "\u{2014}",
];

/// True when `text` is empty or one of the generator's placeholder values.
pub fn is_placeholder(text: &str) -> bool {
    let lowered = text.trim().to_lowercase();
    PLACEHOLDERS.contains(&lowered.as_str())
}

/// Placeholder values become empty; everything else is trimmed.
pub fn normalize_placeholder(text: &str) -> &str {
    if is_placeholder(text) {
        ""
    } else {
        text.trim()
    }
}

/// Escapes `text` for direct insertion into the document.
///
/// Placeholder normalization runs first, then a single char-by-char pass.
/// Because each input char is mapped once, no replacement can be re-escaped by
/// a later rule (the `\` → `\textbackslash{}` braces are never touched).
pub fn escape(text: &str) -> String {
    let text = normalize_placeholder(text);
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            '&' => out.push_str("\\&"),
            '%' => out.push_str("\\%"),
            '$' => out.push_str("\\$"),
            '#' => out.push_str("\\#"),
            '_' => out.push_str("\\_"),
            '{' => out.push_str("\\{"),
            '}' => out.push_str("\\}"),
            '^' => out.push_str("\\textasciicircum{}"),
            '~' => out.push_str("\\textasciitilde{}"),
            _ => push_unicode(&mut out, c),
        }
    }
    out
}

/// Optional-field convenience: `None` escapes to the empty string.
pub fn escape_opt(text: Option<&str>) -> String {
    text.map(escape).unwrap_or_default()
}

/// Applies only the typographic Unicode substitutions. Used on generator LaTeX,
/// where reserved characters are already markup and must not be escaped.
pub fn normalize_unicode(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        push_unicode(&mut out, c);
    }
    out
}

fn push_unicode(out: &mut String, c: char) {
    match c {
        '\u{201C}' => out.push_str("``"),
        '\u{201D}' => out.push_str("''"),
        '\u{2018}' => out.push('`'),
        '\u{2019}' => out.push('\''),
        '\u{2013}' => out.push_str("--"),
        '\u{2014}' => out.push_str("---"),
        '\u{2026}' => out.push_str("..."),
        '\u{00A0}' => out.push('~'),
        '\u{2022}' => out.push_str("\\textbullet{}"),
        _ => out.push(c),
    }
}

/// Prepares a URL for the first argument of `\href`. hyperref reads that
/// argument mostly verbatim, so only the characters that still break it are
/// escaped. This is not a text escape and never replaces `escape`.
pub fn escape_url(url: &str) -> String {
    let url = normalize_placeholder(url);
    let mut out = String::with_capacity(url.len());
    for c in url.chars() {
        match c {
            '%' => out.push_str("\\%"),
            '#' => out.push_str("\\#"),
            '\\' => out.push_str("%5C"),
            '{' => out.push_str("%7B"),
            '}' => out.push_str("%7D"),
            ' ' => out.push_str("%20"),
            _ => out.push(c),
        }
    }
    out
}
