//! Section templates - the expected heading structure of a document

use crate::{Result, TemplateError};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};

/// One expected section in a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedSection {
    /// Stable key linking headings to this section
    pub key: String,
    /// Heading depth the section should sit at
    pub expected_level: u8,
    /// Human-readable section name
    pub display_name: String,
    /// Whether the section must be present
    pub required: bool,
}

impl ExpectedSection {
    /// Create a required section.
    pub fn required(key: impl Into<String>, expected_level: u8, display_name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            expected_level,
            display_name: display_name.into(),
            required: true,
        }
    }

    /// Create an optional section.
    pub fn optional(key: impl Into<String>, expected_level: u8, display_name: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::required(key, expected_level, display_name)
        }
    }
}

/// An ordered list of expected sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionTemplate {
    /// Template name (the uploaded file stem)
    pub name: String,
    /// Expected sections in template order
    pub sections: Vec<ExpectedSection>,
}

impl SectionTemplate {
    /// Create a template from an explicit section list.
    pub fn new(name: impl Into<String>, sections: Vec<ExpectedSection>) -> Self {
        Self {
            name: name.into(),
            sections,
        }
    }

    /// Build a template from a template document's markdown: every
    /// heading becomes a required section at its own depth, keyed by the
    /// slugified heading title.
    pub fn from_markdown(name: impl Into<String>, markdown: &str) -> Result<Self> {
        let name = name.into();
        let mut sections = Vec::new();
        for line in markdown.lines() {
            let trimmed = line.trim_end();
            let hashes = trimmed.chars().take_while(|c| *c == '#').count();
            if !(1..=6).contains(&hashes) || !trimmed[hashes..].starts_with(' ') {
                continue;
            }
            let title = trimmed[hashes..].trim();
            if title.is_empty() {
                continue;
            }
            sections.push(ExpectedSection::required(
                slugify(title),
                hashes as u8,
                title,
            ));
        }
        if sections.is_empty() {
            return Err(TemplateError::NoSections(name));
        }
        Ok(Self { name, sections })
    }

    /// Template position of a section key.
    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.key == key)
    }

    /// Look up a section by key.
    pub fn section(&self, key: &str) -> Option<&ExpectedSection> {
        self.sections.iter().find(|s| s.key == key)
    }
}

/// Slugify a heading title into a stable section key: lowercase, with
/// alphanumeric runs joined by single dashes.
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    if let Ok(re) = Regex::new(r"[^a-z0-9]+") {
        re.replace_all(&lowered, "-").trim_matches('-').to_string()
    } else {
        lowered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_punctuation() {
        assert_eq!(slugify("Scope & Purpose"), "scope-purpose");
        assert_eq!(slugify("  1. Introduction "), "1-introduction");
        assert_eq!(slugify("RISK Assessment"), "risk-assessment");
    }

    #[test]
    fn template_parses_from_markdown_headings() {
        let md = "# Policy\n\nintro text\n\n## Scope\n\nbody\n\n## Risk Assessment\n";
        let template = SectionTemplate::from_markdown("policy", md).unwrap();

        assert_eq!(template.sections.len(), 3);
        assert_eq!(template.sections[0].key, "policy");
        assert_eq!(template.sections[0].expected_level, 1);
        assert_eq!(template.sections[2].key, "risk-assessment");
        assert_eq!(template.sections[2].expected_level, 2);
        assert!(template.sections.iter().all(|s| s.required));
        assert_eq!(template.index_of("scope"), Some(1));
    }

    #[test]
    fn template_without_headings_is_an_error() {
        assert!(matches!(
            SectionTemplate::from_markdown("empty", "just prose\n"),
            Err(TemplateError::NoSections(_))
        ));
    }
}
