//! Orphan list-item repair: a line-scanning state machine that wraps item
//! commands appearing outside any open list in a synthesized `itemize`.
//!
//! Only the document body is scanned. Preamble lines (macro definitions mention
//! list environments) pass through untouched. Input without orphans is returned
//! byte-identical.

use std::borrow::Cow;

use tracing::debug;

use crate::latex::template::BEGIN_DOCUMENT;

/// Commands that are only legal inside a list environment.
const ITEM_COMMANDS: &[&str] = &[
    "\\item",
    "\\resumeItem",
    "\\resumeSubItem",
    "\\resumeSubheading",
    "\\resumeSubSubheading",
    "\\resumeProjectHeading",
    "\\resumeSkillItem",
];

const LIST_OPENS: &[&str] = &[
    "\\begin{itemize}",
    "\\begin{enumerate}",
    "\\begin{description}",
    "\\resumeSubHeadingListStart",
    "\\resumeItemListStart",
];

const LIST_CLOSES: &[&str] = &[
    "\\end{itemize}",
    "\\end{enumerate}",
    "\\end{description}",
    "\\resumeSubHeadingListEnd",
    "\\resumeItemListEnd",
];

/// Heading macros whose `{..}` arguments may sit on the lines after the command.
const HEADING_COMMANDS: &[&str] = &[
    "\\resumeSubheading",
    "\\resumeSubSubheading",
    "\\resumeProjectHeading",
];

/// Item macros rewritten to a plain `\item` inside a skills section.
const SKILLS_REWRITES: &[&str] = &["\\resumeItem", "\\resumeSubItem"];

const SYNTH_OPEN: &str = "\\begin{itemize}";
const SYNTH_CLOSE: &str = "\\end{itemize}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    OutsideList,
    /// Nesting depth, always >= 1.
    InsideList(usize),
    /// Collecting a run of orphan items (plus blank/comment lines between them).
    BufferingOrphans,
}

struct Scanner<'a> {
    state: ScanState,
    in_skills: bool,
    run: Vec<RunLine<'a>>,
    out: Vec<Cow<'a, str>>,
    wrapped_runs: usize,
    /// Braces left open by the current buffered item.
    open_braces: usize,
    /// The current buffered item is a heading macro; lines starting with `{`
    /// are its arguments.
    heading_args: bool,
}

struct RunLine<'a> {
    text: Cow<'a, str>,
    is_item: bool,
}

/// Wraps every run of orphan items in `\begin{itemize}` / `\end{itemize}`.
///
/// The open is inserted immediately before the first item of a run and the
/// close immediately after its last item; blank and comment lines trailing the
/// last item stay outside the synthesized list.
pub fn repair_orphan_items(text: &str) -> String {
    let scan_from_start = !text.contains(BEGIN_DOCUMENT);
    let mut in_body = scan_from_start;

    let mut scanner = Scanner {
        state: ScanState::OutsideList,
        in_skills: false,
        run: Vec::new(),
        out: Vec::new(),
        wrapped_runs: 0,
        open_braces: 0,
        heading_args: false,
    };

    for line in text.split('\n') {
        if !in_body {
            in_body = line.contains(BEGIN_DOCUMENT);
            scanner.out.push(line.into());
            continue;
        }
        scanner.feed(line);
    }
    scanner.flush();

    if scanner.wrapped_runs == 0 {
        return text.to_string();
    }

    debug!("Wrapped {} orphan item run(s)", scanner.wrapped_runs);
    scanner.out.join("\n")
}

impl<'a> Scanner<'a> {
    fn feed(&mut self, line: &'a str) {
        let trimmed = line.trim();

        if self.state == ScanState::BufferingOrphans && self.continues_item(trimmed) {
            self.open_braces = add_brace_delta(self.open_braces, trimmed);
            self.run.push(RunLine {
                text: line.into(),
                is_item: true,
            });
            return;
        }
        self.heading_args = false;

        if trimmed.is_empty() || trimmed.starts_with('%') {
            match self.state {
                ScanState::BufferingOrphans => self.run.push(RunLine {
                    text: line.into(),
                    is_item: false,
                }),
                _ => self.out.push(line.into()),
            }
            return;
        }

        if trimmed.starts_with("\\section") {
            self.flush();
            self.in_skills = trimmed.to_lowercase().contains("skill");
        }

        let depth = self.depth();
        if let (0, Some(cmd)) = (depth, item_command(trimmed)) {
            let text = if self.in_skills {
                rewrite_skills_item(line)
                    .map(Cow::Owned)
                    .unwrap_or_else(|| line.into())
            } else {
                line.into()
            };
            self.state = ScanState::BufferingOrphans;
            self.open_braces = add_brace_delta(0, trimmed);
            self.heading_args = HEADING_COMMANDS.contains(&cmd);
            self.run.push(RunLine {
                text,
                is_item: true,
            });
            return;
        }

        self.flush();
        self.out.push(line.into());

        let delta =
            count_tokens(trimmed, LIST_OPENS) as isize - count_tokens(trimmed, LIST_CLOSES) as isize;
        let depth = (depth as isize + delta).max(0) as usize;
        self.state = if depth == 0 {
            ScanState::OutsideList
        } else {
            ScanState::InsideList(depth)
        };
    }

    /// A line belongs to the buffered item while its braces are still open, or
    /// when it is an argument line of a heading macro.
    fn continues_item(&self, trimmed: &str) -> bool {
        self.open_braces > 0 || (self.heading_args && trimmed.starts_with('{'))
    }

    fn depth(&self) -> usize {
        match self.state {
            ScanState::InsideList(depth) => depth,
            ScanState::OutsideList | ScanState::BufferingOrphans => 0,
        }
    }

    /// Emits the buffered run, wrapped around its items.
    fn flush(&mut self) {
        if self.state != ScanState::BufferingOrphans {
            return;
        }
        self.state = ScanState::OutsideList;
        self.open_braces = 0;
        self.heading_args = false;

        let run = std::mem::take(&mut self.run);
        let Some(last_item) = run.iter().rposition(|l| l.is_item) else {
            self.out.extend(run.into_iter().map(|l| l.text));
            return;
        };

        let indent = leading_whitespace(&run[0].text).to_string();
        self.out.push(format!("{indent}{SYNTH_OPEN}").into());
        let mut lines = run.into_iter();
        for line in lines.by_ref().take(last_item + 1) {
            self.out.push(line.text);
        }
        self.out.push(format!("{indent}{SYNTH_CLOSE}").into());
        self.out.extend(lines.map(|l| l.text));
        self.wrapped_runs += 1;
    }
}

/// The item command `trimmed` starts with, if any. `\itemsep` and
/// `\resumeItemListStart` are not items.
fn item_command(trimmed: &str) -> Option<&'static str> {
    ITEM_COMMANDS.iter().copied().find(|cmd| {
        trimmed
            .strip_prefix(cmd)
            .is_some_and(|rest| !rest.starts_with(|c: char| c.is_ascii_alphabetic()))
    })
}

/// Applies the line's unescaped `{` / `}` balance to `open`, never below zero.
fn add_brace_delta(open: usize, line: &str) -> usize {
    let mut open = open;
    let mut escaped = false;
    for c in line.chars() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '{' => open += 1,
            '}' => open = open.saturating_sub(1),
            _ => {}
        }
    }
    open
}

fn count_tokens(line: &str, tokens: &[&str]) -> usize {
    tokens.iter().map(|t| line.matches(t).count()).sum()
}

fn leading_whitespace(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

/// `\resumeItem{Rust, Go}` → `\item Rust, Go`, keeping indentation and any text
/// after the closing brace. `None` when the line is not a rewritable call or
/// its braces are unbalanced.
fn rewrite_skills_item(line: &str) -> Option<String> {
    let indent = leading_whitespace(line);
    let trimmed = line.trim_start();
    let cmd = SKILLS_REWRITES
        .iter()
        .find(|cmd| item_command(trimmed) == Some(**cmd))?;

    let rest = trimmed[cmd.len()..].trim_start();
    let inner = rest.strip_prefix('{')?;
    let close = matching_brace(inner)?;
    let arg = inner[..close].trim();
    let tail = &inner[close + 1..];

    Some(format!("{indent}\\item {arg}{tail}"))
}

/// Byte offset of the `}` closing an argument whose `{` was just consumed.
fn matching_brace(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '{' => depth += 1,
            '}' if depth == 0 => return Some(i),
            '}' => depth -= 1,
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_orphans_is_identity() {
        let input = "\\section{Experience}\n\\begin{itemize}\n  \\item one\n  \\item two\n\\end{itemize}\nTrailing text\n";
        assert_eq!(repair_orphan_items(input), input);
    }

    #[test]
    fn test_identity_preserves_crlf_and_trailing_newline() {
        let input = "\\begin{itemize}\r\n\\item a\r\n\\end{itemize}\r\n";
        assert_eq!(repair_orphan_items(input), input);
    }

    #[test]
    fn test_run_of_orphans_wrapped_once() {
        let input = "\\section{Experience}\n\\item one\n\\item two\n\\item three\nSome paragraph";
        let out = repair_orphan_items(input);
        assert_eq!(
            out,
            "\\section{Experience}\n\\begin{itemize}\n\\item one\n\\item two\n\\item three\n\\end{itemize}\nSome paragraph"
        );
        assert_eq!(out.matches(SYNTH_OPEN).count(), 1);
        assert_eq!(out.matches(SYNTH_CLOSE).count(), 1);
    }

    #[test]
    fn test_open_and_close_hug_the_items() {
        let input = "intro\n    \\resumeItem{a}\n    \\resumeItem{b}\n\n% note\noutro";
        let lines: Vec<String> = repair_orphan_items(input)
            .split('\n')
            .map(String::from)
            .collect();
        assert_eq!(lines[1], "    \\begin{itemize}");
        assert_eq!(lines[2], "    \\resumeItem{a}");
        assert_eq!(lines[3], "    \\resumeItem{b}");
        assert_eq!(lines[4], "    \\end{itemize}");
        assert_eq!(lines[5], "");
        assert_eq!(lines[6], "% note");
    }

    #[test]
    fn test_blank_lines_inside_run_stay_in_run() {
        let input = "\\item a\n\n\\item b\ntext";
        assert_eq!(
            repair_orphan_items(input),
            "\\begin{itemize}\n\\item a\n\n\\item b\n\\end{itemize}\ntext"
        );
    }

    #[test]
    fn test_run_at_end_of_input_is_closed() {
        let input = "heading\n\\item a\n\\item b";
        assert_eq!(
            repair_orphan_items(input),
            "heading\n\\begin{itemize}\n\\item a\n\\item b\n\\end{itemize}"
        );
    }

    #[test]
    fn test_separate_runs_each_wrapped() {
        let input = "\\item a\nparagraph\n\\item b";
        let out = repair_orphan_items(input);
        assert_eq!(out.matches(SYNTH_OPEN).count(), 2);
        assert_eq!(out.matches(SYNTH_CLOSE).count(), 2);
    }

    #[test]
    fn test_items_inside_resume_lists_are_not_orphans() {
        let input = "\\resumeSubHeadingListStart\n  \\resumeSubheading\n    {A}{B}\n    {C}{D}\n  \\resumeItemListStart\n    \\resumeItem{x}\n  \\resumeItemListEnd\n\\resumeSubHeadingListEnd";
        assert_eq!(repair_orphan_items(input), input);
    }

    #[test]
    fn test_nested_lists_track_depth() {
        let input = "\\begin{itemize}\n\\item a\n\\begin{itemize}\n\\item b\n\\end{itemize}\n\\item c\n\\end{itemize}\n\\item orphan";
        let out = repair_orphan_items(input);
        assert!(out.ends_with("\\begin{itemize}\n\\item orphan\n\\end{itemize}"));
        assert_eq!(out.matches(SYNTH_OPEN).count(), 3);
    }

    #[test]
    fn test_stray_close_does_not_underflow() {
        let input = "\\end{itemize}\n\\item a";
        assert_eq!(
            repair_orphan_items(input),
            "\\end{itemize}\n\\begin{itemize}\n\\item a\n\\end{itemize}"
        );
    }

    #[test]
    fn test_itemsep_is_not_an_item() {
        let input = "\\setlength{\\itemsep}{0pt}\n\\itemsep 2pt";
        assert_eq!(repair_orphan_items(input), input);
    }

    #[test]
    fn test_skills_section_items_rewritten_to_plain_items() {
        let input = "\\section{Technical Skills}\n  \\resumeItem{Rust, Go}\n  \\resumeSubItem{Docker}\n\\section{Projects}";
        assert_eq!(
            repair_orphan_items(input),
            "\\section{Technical Skills}\n  \\begin{itemize}\n  \\item Rust, Go\n  \\item Docker\n  \\end{itemize}\n\\section{Projects}"
        );
    }

    #[test]
    fn test_skills_context_ends_at_next_section() {
        let input = "\\section{Skills}\n\\resumeItem{A}\n\\section{Experience}\n\\resumeItem{B}";
        let out = repair_orphan_items(input);
        assert!(out.contains("\\item A"));
        assert!(out.contains("\\resumeItem{B}"));
    }

    #[test]
    fn test_skills_rewrite_keeps_nested_braces() {
        assert_eq!(
            rewrite_skills_item("\\resumeItem{\\textbf{Languages}: Rust} \\\\").as_deref(),
            Some("\\item \\textbf{Languages}: Rust \\\\")
        );
        assert_eq!(rewrite_skills_item("\\resumeItem{unbalanced"), None);
    }

    #[test]
    fn test_heading_argument_lines_stay_inside_synthesized_list() {
        let input = "\\section{Experience}\n  \\resumeSubheading\n    {Engineer}{2020}\n    {Acme}{NYC}\nParagraph";
        assert_eq!(
            repair_orphan_items(input),
            "\\section{Experience}\n  \\begin{itemize}\n  \\resumeSubheading\n    {Engineer}{2020}\n    {Acme}{NYC}\n  \\end{itemize}\nParagraph"
        );
    }

    #[test]
    fn test_heading_followed_by_items_is_one_run() {
        let input = "  \\resumeProjectHeading\n    {\\textbf{Tailor}}{2024}\n  \\resumeItem{Shipped it}\ntext";
        let out = repair_orphan_items(input);
        assert_eq!(out.matches(SYNTH_OPEN).count(), 1);
        assert!(out.contains("  \\resumeItem{Shipped it}\n  \\end{itemize}\ntext"));
    }

    #[test]
    fn test_wrapped_item_argument_is_not_split() {
        let input = "\\resumeItem{Built a service that\n  handled 1M requests}\nAfter";
        assert_eq!(
            repair_orphan_items(input),
            "\\begin{itemize}\n\\resumeItem{Built a service that\n  handled 1M requests}\n\\end{itemize}\nAfter"
        );
    }

    #[test]
    fn test_brace_lines_after_plain_item_end_the_run() {
        let input = "\\item a\n{group}";
        assert_eq!(
            repair_orphan_items(input),
            "\\begin{itemize}\n\\item a\n\\end{itemize}\n{group}"
        );
    }

    #[test]
    fn test_escaped_braces_do_not_open_arguments() {
        assert_eq!(add_brace_delta(0, "\\resumeItem{a \\{ b}"), 0);
        assert_eq!(add_brace_delta(1, "tail}"), 0);
        assert_eq!(add_brace_delta(0, "}}"), 0);
    }

    #[test]
    fn test_preamble_is_not_scanned() {
        let input = "\\documentclass{article}\n\\newcommand{\\resumeItemListStart}{\\begin{itemize}}\n\\begin{document}\n\\item a\n\\end{document}";
        let out = repair_orphan_items(input);
        assert!(out.contains("\\begin{document}\n\\begin{itemize}\n\\item a\n\\end{itemize}\n\\end{document}"));
    }
}
