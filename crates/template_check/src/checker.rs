//! The structure check - a pure function over the current heading list

use crate::{slugify, SectionTemplate};
use doc_model::{DocBlock, DocState};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A heading as seen by the checker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingInfo {
    /// Heading depth, 1-6
    pub level: u8,
    /// Heading text
    pub text: String,
    /// Section key; falls back to the slugified text when the block
    /// carries none
    pub section_key: Option<String>,
}

/// Extract the document's headings in order.
pub fn headings_of(doc: &DocState) -> Vec<HeadingInfo> {
    doc.blocks
        .iter()
        .filter_map(|block| match &block.body {
            DocBlock::Heading { level, .. } => {
                let text = block.plain_text();
                let section_key = block
                    .section_key
                    .clone()
                    .or_else(|| Some(slugify(&text)).filter(|s| !s.is_empty()));
                Some(HeadingInfo {
                    level: *level,
                    text,
                    section_key,
                })
            }
            _ => None,
        })
        .collect()
}

/// A structure violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Violation {
    /// A required section is absent
    Missing { section_key: String },
    /// The section is present but at an unexpected heading depth
    WrongLevel {
        section_key: String,
        expected: u8,
        actual: u8,
    },
    /// The section appears before a template-earlier section that has
    /// not appeared yet
    OutOfOrder { section_key: String },
    /// Present but unrecognized. Reserved: the checker never emits this
    /// today.
    Extra { section_key: String },
}

/// Check headings against the template and collect violations.
///
/// Ordering uses a single forward scan: a heading is out of order when
/// some template-earlier section exists in the document but has not yet
/// appeared at that point of the scan. No edit-distance alignment.
pub fn check(template: &SectionTemplate, headings: &[HeadingInfo]) -> Vec<Violation> {
    let mut violations = Vec::new();

    let known: Vec<(usize, &HeadingInfo)> = headings
        .iter()
        .filter_map(|h| {
            let key = h.section_key.as_deref()?;
            Some((template.index_of(key)?, h))
        })
        .collect();
    let present: HashSet<usize> = known.iter().map(|(idx, _)| *idx).collect();

    // missing required sections, in template order
    for (idx, section) in template.sections.iter().enumerate() {
        if section.required && !present.contains(&idx) {
            violations.push(Violation::Missing {
                section_key: section.key.clone(),
            });
        }
    }

    // wrong level: first occurrence of each known section
    let mut level_checked: HashSet<usize> = HashSet::new();
    for (idx, heading) in &known {
        if !level_checked.insert(*idx) {
            continue;
        }
        let section = &template.sections[*idx];
        if heading.level != section.expected_level {
            violations.push(Violation::WrongLevel {
                section_key: section.key.clone(),
                expected: section.expected_level,
                actual: heading.level,
            });
        }
    }

    // out of order: forward scan over the known headings
    let mut seen: HashSet<usize> = HashSet::new();
    for (idx, _) in &known {
        let earlier_unseen = present
            .iter()
            .any(|p| p < idx && !seen.contains(p));
        if earlier_unseen && !seen.contains(idx) {
            violations.push(Violation::OutOfOrder {
                section_key: template.sections[*idx].key.clone(),
            });
        }
        seen.insert(*idx);
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExpectedSection;
    use doc_model::{Block, TextRun};

    fn template() -> SectionTemplate {
        SectionTemplate::new(
            "policy",
            vec![
                ExpectedSection::required("purpose", 1, "Purpose"),
                ExpectedSection::required("scope", 2, "Scope"),
                ExpectedSection::optional("references", 2, "References"),
            ],
        )
    }

    fn heading(level: u8, text: &str) -> HeadingInfo {
        HeadingInfo {
            level,
            text: text.to_string(),
            section_key: Some(slugify(text)),
        }
    }

    #[test]
    fn missing_required_section_is_reported_once() {
        let headings = vec![heading(1, "Purpose")];
        let violations = check(&template(), &headings);
        assert_eq!(
            violations,
            vec![Violation::Missing {
                section_key: "scope".into()
            }]
        );
    }

    #[test]
    fn optional_sections_never_go_missing() {
        let headings = vec![heading(1, "Purpose"), heading(2, "Scope")];
        assert!(check(&template(), &headings).is_empty());
    }

    #[test]
    fn wrong_level_reports_expected_and_actual() {
        let headings = vec![heading(1, "Purpose"), heading(4, "Scope")];
        let violations = check(&template(), &headings);
        assert_eq!(
            violations,
            vec![Violation::WrongLevel {
                section_key: "scope".into(),
                expected: 2,
                actual: 4
            }]
        );
    }

    #[test]
    fn section_before_an_unseen_earlier_one_is_out_of_order() {
        let headings = vec![heading(2, "Scope"), heading(1, "Purpose")];
        let violations = check(&template(), &headings);
        assert_eq!(
            violations,
            vec![Violation::OutOfOrder {
                section_key: "scope".into()
            }]
        );
    }

    #[test]
    fn unknown_headings_are_ignored() {
        // "extra" is reserved; unrecognized sections produce nothing
        let headings = vec![
            heading(1, "Purpose"),
            heading(3, "Appendix Z"),
            heading(2, "Scope"),
        ];
        assert!(check(&template(), &headings).is_empty());
    }

    #[test]
    fn headings_of_extracts_keys_and_levels() {
        let mut doc = DocState::new("doc-1");
        doc.blocks.push(
            Block::heading(1, vec![TextRun::plain("Purpose")]).with_section_key("purpose"),
        );
        doc.blocks
            .push(Block::heading(2, vec![TextRun::plain("Risk Assessment")]));
        doc.blocks
            .push(Block::paragraph(vec![TextRun::plain("body")]));

        let headings = headings_of(&doc);
        assert_eq!(headings.len(), 2);
        assert_eq!(headings[0].section_key.as_deref(), Some("purpose"));
        // falls back to the slugified text
        assert_eq!(headings[1].section_key.as_deref(), Some("risk-assessment"));
    }
}
