//! Deterministic Document Builder: renders a `ResumeContent` into a complete document.
//!
//! Pure and total: no I/O, no panics, same input gives byte-identical output.
//! Every free-text field goes through `escape` exactly once, at the point where it
//! is placed into a macro argument. Section order is fixed:
//! Header → Education → Experience → Projects → Skills.

use std::fmt::Write;

use crate::latex::escape::{escape, escape_opt, escape_url};
use crate::latex::template::{fallback_document, skeleton_halves};
use crate::tailoring::content::{
    Contact, EducationEntry, ExperienceEntry, ProjectEntry, ResumeContent, SkillCategories,
};

/// Header title used when the name is empty after placeholder normalization.
const UNTITLED_HEADER: &str = "Resume";

/// Builds the document for `content`. `None` yields the static placeholder document.
pub fn build(content: Option<&ResumeContent>) -> String {
    let Some(content) = content else {
        return fallback_document();
    };

    let (head, tail) = skeleton_halves();
    let mut doc = String::with_capacity(head.len() + tail.len() + 4096);
    doc.push_str(head);

    push_header(&mut doc, &content.contact);
    push_education(&mut doc, &content.education);
    push_experience(&mut doc, &content.experience);
    push_projects(&mut doc, &content.projects);
    push_skills(&mut doc, &content.skills);

    doc.push_str(tail);
    doc
}

// ────────────────────────────────────────────────────────────────────────────
// Header
// ────────────────────────────────────────────────────────────────────────────

fn push_header(doc: &mut String, contact: &Contact) {
    let name = escape(&contact.name);
    let name = if name.is_empty() {
        UNTITLED_HEADER.to_string()
    } else {
        name
    };

    let mut items: Vec<String> = Vec::new();

    let phone = escape_opt(contact.phone.as_deref());
    if !phone.is_empty() {
        items.push(phone);
    }

    let email = escape_opt(contact.email.as_deref());
    if !email.is_empty() {
        let target = escape_url(contact.email.as_deref().unwrap_or_default());
        items.push(format!("\\href{{mailto:{target}}}{{\\underline{{{email}}}}}"));
    }

    for link in contact.profile_links() {
        let label = escape(&link.label);
        let target = escape_url(link.url.as_deref().unwrap_or_default());
        if label.is_empty() || target.is_empty() {
            continue;
        }
        items.push(format!("\\href{{{target}}}{{\\underline{{{label}}}}}"));
    }

    doc.push_str("\\begin{center}\n");
    if items.is_empty() {
        let _ = writeln!(doc, "    \\textbf{{\\Huge \\scshape {name}}}");
    } else {
        let _ = writeln!(doc, "    \\textbf{{\\Huge \\scshape {name}}} \\\\ \\vspace{{1pt}}");
        let _ = writeln!(doc, "    \\small {}", items.join(" $|$ "));
    }
    doc.push_str("\\end{center}\n");
}

// ────────────────────────────────────────────────────────────────────────────
// Sections
// ────────────────────────────────────────────────────────────────────────────

fn push_education(doc: &mut String, entries: &[EducationEntry]) {
    let rendered: Vec<String> = entries
        .iter()
        .filter_map(|entry| {
            let school = escape_opt(entry.school.as_deref());
            let degree = escape_opt(entry.degree.as_deref());
            if school.is_empty() || degree.is_empty() {
                return None;
            }
            let location = escape_opt(entry.location.as_deref());
            let dates = escape_opt(entry.dates.as_deref());

            let mut out = subheading(&school, &location, &degree, &dates);
            push_item_list(&mut out, &entry.highlights);
            Some(out)
        })
        .collect();

    push_subheading_section(doc, "Education", &rendered);
}

fn push_experience(doc: &mut String, entries: &[ExperienceEntry]) {
    let rendered: Vec<String> = entries
        .iter()
        .filter_map(|entry| {
            let title = escape_opt(entry.title.as_deref());
            let company = escape_opt(entry.company.as_deref());
            if title.is_empty() && company.is_empty() {
                return None;
            }
            let dates = escape_opt(entry.dates.as_deref());
            let location = escape_opt(entry.location.as_deref());

            // Jake's layout: title and dates on the first row, company and location below.
            let mut out = subheading(&title, &dates, &company, &location);
            push_item_list(&mut out, &entry.bullets);
            Some(out)
        })
        .collect();

    push_subheading_section(doc, "Experience", &rendered);
}

fn push_projects(doc: &mut String, entries: &[ProjectEntry]) {
    let rendered: Vec<String> = entries
        .iter()
        .filter_map(|entry| {
            let name = escape_opt(entry.name.as_deref());
            if name.is_empty() {
                return None;
            }
            let stack = escape_opt(entry.tech_stack.as_deref());
            let dates = escape_opt(entry.dates.as_deref());

            let title = if stack.is_empty() {
                format!("\\textbf{{{name}}}")
            } else {
                format!("\\textbf{{{name}}} $|$ \\emph{{{stack}}}")
            };

            let mut out = format!("    \\resumeProjectHeading\n      {{{title}}}{{{dates}}}\n");
            push_item_list(&mut out, &entry.bullets);
            Some(out)
        })
        .collect();

    push_subheading_section(doc, "Projects", &rendered);
}

/// Skills use the plain `\item` convention, never `\resumeItem`.
fn push_skills(doc: &mut String, skills: &SkillCategories) {
    let lines: Vec<String> = skills
        .buckets()
        .iter()
        .filter_map(|(label, value)| {
            let value = escape_opt(*value);
            (!value.is_empty()).then(|| format!("     \\textbf{{{label}}}{{: {value}}}"))
        })
        .collect();

    if lines.is_empty() {
        return;
    }

    doc.push_str("\n\\section{Technical Skills}\n");
    doc.push_str(" \\begin{itemize}[leftmargin=0.15in, label={}]\n");
    doc.push_str("    \\small{\\item{\n");
    doc.push_str(&lines.join(" \\\\\n"));
    doc.push_str("\n    }}\n");
    doc.push_str(" \\end{itemize}\n");
}

// ────────────────────────────────────────────────────────────────────────────
// Shared fragments
// ────────────────────────────────────────────────────────────────────────────

/// Arguments must already be escaped.
fn subheading(a: &str, b: &str, c: &str, d: &str) -> String {
    format!("    \\resumeSubheading\n      {{{a}}}{{{b}}}\n      {{{c}}}{{{d}}}\n")
}

/// Appends a `\resumeItem` list. Bullets that normalize to empty are dropped;
/// if none remain, nothing is appended and the entry renders heading-only.
fn push_item_list(out: &mut String, bullets: &[String]) {
    let items: Vec<String> = bullets
        .iter()
        .map(|b| escape(b))
        .filter(|b| !b.is_empty())
        .collect();

    if items.is_empty() {
        return;
    }

    out.push_str("      \\resumeItemListStart\n");
    for item in items {
        let _ = writeln!(out, "        \\resumeItem{{{item}}}");
    }
    out.push_str("      \\resumeItemListEnd\n");
}

fn push_subheading_section(doc: &mut String, title: &str, entries: &[String]) {
    if entries.is_empty() {
        return;
    }

    let _ = writeln!(doc, "\n\\section{{{title}}}");
    doc.push_str("  \\resumeSubHeadingListStart\n");
    for entry in entries {
        doc.push_str(entry);
    }
    doc.push_str("  \\resumeSubHeadingListEnd\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::latex::template::{
        BEGIN_DOCUMENT, BODY_PLACEHOLDER, DOCUMENT_CLASS, END_DOCUMENT, FALLBACK_NOTICE,
    };
    use crate::tailoring::content::ProfileLink;

    fn text(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    fn ada() -> ResumeContent {
        ResumeContent {
            contact: Contact {
                name: "Ada Lovelace".to_string(),
                ..Default::default()
            },
            experience: vec![ExperienceEntry {
                title: text("Engineer"),
                company: text("Acme"),
                bullets: vec!["Shipped X".to_string()],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn full_fixture() -> ResumeContent {
        ResumeContent {
            contact: Contact {
                name: "Grace Hopper".to_string(),
                phone: text("555-0100"),
                email: text("grace_h@navy.mil"),
                linkedin: text("linkedin.com/in/grace"),
                github: text("N/A"),
                links: vec![ProfileLink {
                    label: "grace.dev".to_string(),
                    url: None,
                }],
                ..Default::default()
            },
            education: vec![
                EducationEntry {
                    school: text("Yale University"),
                    location: text("New Haven, CT"),
                    degree: text("PhD, Mathematics"),
                    dates: text("1930 -- 1934"),
                    highlights: vec!["GPA: 4.0".to_string(), "N/A".to_string()],
                },
                EducationEntry {
                    school: text("Unnamed College"),
                    degree: text("TBD"),
                    ..Default::default()
                },
            ],
            experience: vec![
                ExperienceEntry {
                    title: text("Rear Admiral"),
                    company: text("US Navy"),
                    location: text("Arlington, VA"),
                    dates: text("1943 -- 1986"),
                    bullets: vec!["Cut R&D cost by 40% on COBOL".to_string()],
                },
                ExperienceEntry {
                    title: text("N/A"),
                    company: text(""),
                    bullets: vec!["orphaned bullet".to_string()],
                    ..Default::default()
                },
            ],
            projects: vec![ProjectEntry {
                name: text("FLOW-MATIC"),
                tech_stack: text("UNIVAC I, Assembly"),
                dates: text("1955"),
                bullets: vec!["First English-like data processing language".to_string()],
            }],
            skills: SkillCategories {
                languages: text("COBOL, C#"),
                frameworks: text("N/A"),
                developer_tools: text("Compilers"),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_build_is_deterministic() {
        let content = full_fixture();
        assert_eq!(build(Some(&content)), build(Some(&content)));
    }

    #[test]
    fn test_build_none_is_placeholder_document() {
        let doc = build(None);
        assert!(!doc.is_empty());
        assert!(doc.starts_with(DOCUMENT_CLASS));
        assert!(doc.contains(BEGIN_DOCUMENT));
        assert!(doc.trim_end().ends_with(END_DOCUMENT));
        assert!(doc.contains(FALLBACK_NOTICE));
    }

    #[test]
    fn test_build_default_content_is_complete_document() {
        let doc = build(Some(&ResumeContent::default()));
        assert!(doc.starts_with(DOCUMENT_CLASS));
        assert!(doc.trim_end().ends_with(END_DOCUMENT));
        assert!(doc.contains("\\scshape Resume}"));
        assert!(!doc.contains("\\section{"));
        assert!(!doc.contains(BODY_PLACEHOLDER));
    }

    #[test]
    fn test_structured_happy_path() {
        let doc = build(Some(&ada()));

        let center_start = doc.find("\\begin{center}").unwrap();
        let center_end = doc.find("\\end{center}").unwrap();
        let name = doc.find("Ada Lovelace").unwrap();
        assert!(center_start < name && name < center_end, "name must sit in the header block");

        let body = &doc[doc.find(BEGIN_DOCUMENT).unwrap()..];
        assert_eq!(body.matches("\\resumeSubheading\n").count(), 1);
        assert_eq!(body.matches("\\resumeItem{").count(), 1);
        assert!(body.contains("\\resumeItem{Shipped X}"));
        assert!(body.contains("{Engineer}{}\n      {Acme}{}"));
    }

    #[test]
    fn test_section_order_is_fixed() {
        let doc = build(Some(&full_fixture()));
        let positions: Vec<usize> = [
            "\\begin{center}",
            "\\section{Education}",
            "\\section{Experience}",
            "\\section{Projects}",
            "\\section{Technical Skills}",
        ]
        .iter()
        .map(|marker| doc.find(marker).unwrap_or_else(|| panic!("missing {marker}")))
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "sections out of order");
    }

    #[test]
    fn test_user_text_is_escaped_exactly_once() {
        let doc = build(Some(&full_fixture()));
        assert!(doc.contains("Cut R\\&D cost by 40\\% on COBOL"));
        assert!(!doc.contains("\\\\&"), "double-escaped ampersand");
        assert!(doc.contains("COBOL, C\\#"));
        assert!(doc.contains("\\underline{grace\\_h@navy.mil}"));
    }

    #[test]
    fn test_header_contact_items() {
        let doc = build(Some(&full_fixture()));
        assert!(doc.contains("\\small 555-0100 $|$ \\href{mailto:grace_h@navy.mil}"));
        assert!(doc.contains("\\href{https://linkedin.com/in/grace}{\\underline{linkedin.com/in/grace}}"));
        assert!(doc.contains("\\href{https://grace.dev}{\\underline{grace.dev}}"));
        assert!(!doc.contains("github"), "placeholder github label must be dropped");
    }

    #[test]
    fn test_incomplete_entries_are_skipped() {
        let doc = build(Some(&full_fixture()));
        assert!(!doc.contains("Unnamed College"), "education without degree is skipped");
        assert!(!doc.contains("orphaned bullet"), "experience without title/company is skipped");
        assert_eq!(doc.matches("\\resumeSubheading\n").count(), 2);
    }

    #[test]
    fn test_placeholder_bullets_are_dropped() {
        let doc = build(Some(&full_fixture()));
        assert!(doc.contains("\\resumeItem{GPA: 4.0}"));
        assert!(!doc.contains("\\resumeItem{}"));
    }

    #[test]
    fn test_entry_without_bullets_is_heading_only() {
        let mut content = ada();
        content.experience[0].bullets.clear();
        let doc = build(Some(&content));
        assert!(doc.contains("\\resumeSubheading"));
        assert!(!doc.contains("\\resumeItemListStart"));
    }

    #[test]
    fn test_project_heading_with_and_without_stack() {
        let doc = build(Some(&full_fixture()));
        assert!(doc.contains(
            "{\\textbf{FLOW-MATIC} $|$ \\emph{UNIVAC I, Assembly}}{1955}"
        ));

        let mut content = full_fixture();
        content.projects[0].tech_stack = None;
        let doc = build(Some(&content));
        assert!(doc.contains("{\\textbf{FLOW-MATIC}}{1955}"));
    }

    #[test]
    fn test_skills_use_plain_items_and_skip_empty_buckets() {
        let doc = build(Some(&full_fixture()));
        let skills = &doc[doc.find("\\section{Technical Skills}").unwrap()..];
        assert!(skills.contains("\\small{\\item{"));
        assert!(skills.contains("\\textbf{Languages}{: COBOL, C\\#} \\\\\n"));
        assert!(skills.contains("\\textbf{Developer Tools}{: Compilers}\n"));
        assert!(!skills.contains("Frameworks"));
        assert!(!skills.contains("\\resumeItem"));
    }

    #[test]
    fn test_empty_skills_section_is_omitted() {
        let doc = build(Some(&ada()));
        assert!(!doc.contains("Technical Skills"));
        assert!(!doc.contains("\\section{Education}"));
        assert!(!doc.contains("\\section{Projects}"));
    }

    #[test]
    fn test_list_environments_are_balanced() {
        let doc = build(Some(&full_fixture()));
        assert_eq!(
            doc.matches("\\resumeSubHeadingListStart\n").count(),
            doc.matches("\\resumeSubHeadingListEnd\n").count()
        );
        assert_eq!(
            doc.matches("\\resumeItemListStart\n").count(),
            doc.matches("\\resumeItemListEnd\n").count()
        );
    }
}
