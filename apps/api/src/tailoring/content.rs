//! Structured Content Model: the typed resume the generator is asked to emit as JSON
//! and the deterministic builder consumes.
//!
//! Field names follow the extraction prompt's JSON schema. Optional text is
//! `Option<String>`; lists treat both a missing key and an explicit `null` as empty.
//! Placeholder strings ("N/A", "TBD", ...) are kept as-is here and normalized
//! away by `latex::escape` when rendered.

use serde::{Deserialize, Deserializer, Serialize};

use crate::latex::escape::is_placeholder;

/// Full resume content. Constructed once per request, immutable afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeContent {
    #[serde(flatten)]
    pub contact: Contact,
    #[serde(default, deserialize_with = "null_as_default")]
    pub education: Vec<EducationEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub projects: Vec<ProjectEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub skills: SkillCategories,
}

/// Header contact block. `name` is the only required key; `null` reads as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub github: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub website_url: Option<String>,
    /// Any further profile links, rendered after linkedin/github/website.
    #[serde(default, deserialize_with = "null_as_default")]
    pub links: Vec<ProfileLink>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileLink {
    pub label: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    #[serde(default)]
    pub school: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(default)]
    pub dates: Option<String>,
    /// GPA, honors, coursework.
    #[serde(default, deserialize_with = "null_as_default")]
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub dates: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tech_stack: Option<String>,
    /// Date range or a link, rendered right-aligned.
    #[serde(default)]
    pub dates: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bullets: Vec<String>,
}

/// Named skill buckets, rendered in declaration order. Empty buckets are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillCategories {
    #[serde(default)]
    pub languages: Option<String>,
    #[serde(default)]
    pub frameworks: Option<String>,
    #[serde(default)]
    pub developer_tools: Option<String>,
    #[serde(default)]
    pub databases: Option<String>,
    #[serde(default)]
    pub libraries: Option<String>,
    #[serde(default)]
    pub other: Option<String>,
}

impl Contact {
    /// Ordered (label, url) pairs: linkedin, github, website, then `links`.
    /// Pairs whose label is a placeholder are dropped; a missing url is derived
    /// from the label.
    pub fn profile_links(&self) -> Vec<ProfileLink> {
        let fixed = [
            (&self.linkedin, &self.linkedin_url),
            (&self.github, &self.github_url),
            (&self.website, &self.website_url),
        ];

        fixed
            .into_iter()
            .filter_map(|(label, url)| {
                label.as_ref().map(|label| ProfileLink {
                    label: label.clone(),
                    url: url.clone(),
                })
            })
            .chain(self.links.iter().cloned())
            .filter(|link| !is_placeholder(&link.label))
            .map(|link| {
                let url = match link.url.as_deref() {
                    Some(u) if !is_placeholder(u) => u.trim().to_string(),
                    _ => derive_url(&link.label),
                };
                ProfileLink {
                    label: link.label,
                    url: Some(url),
                }
            })
            .collect()
    }
}

impl SkillCategories {
    /// Buckets in their fixed render order.
    pub fn buckets(&self) -> [(&'static str, Option<&str>); 6] {
        [
            ("Languages", self.languages.as_deref()),
            ("Frameworks", self.frameworks.as_deref()),
            ("Developer Tools", self.developer_tools.as_deref()),
            ("Databases", self.databases.as_deref()),
            ("Libraries", self.libraries.as_deref()),
            ("Other", self.other.as_deref()),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.buckets()
            .iter()
            .all(|(_, value)| value.map_or(true, is_placeholder))
    }
}

impl ResumeContent {
    /// True when nothing renderable would come out of the builder beyond a
    /// generic header: no name and every section empty.
    pub fn is_effectively_empty(&self) -> bool {
        is_placeholder(&self.contact.name)
            && self.education.is_empty()
            && self.experience.is_empty()
            && self.projects.is_empty()
            && self.skills.is_empty()
    }
}

/// `linkedin.com/in/ada` → `https://linkedin.com/in/ada`.
fn derive_url(label: &str) -> String {
    let label = label.trim();
    if label.contains("://") || label.starts_with("mailto:") {
        label.to_string()
    } else {
        format!("https://{label}")
    }
}

/// Treats an explicit JSON `null` the same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
