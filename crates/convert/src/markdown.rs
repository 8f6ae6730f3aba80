//! Markdown rendering for the save payload
//!
//! The save API persists the whole document as markdown alongside the
//! block metadata. Decoration state (comment membership, AI marks) never
//! leaks into the rendered markdown.

use doc_model::{DocBlock, DocState, ListItem, ListStyle, TextRun};

/// Render the document to markdown.
pub fn doc_state_to_markdown(doc: &DocState) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(doc.blocks.len());
    for block in &doc.blocks {
        match &block.body {
            DocBlock::Heading { level, text } => {
                parts.push(format!(
                    "{} {}",
                    "#".repeat(*level as usize),
                    runs_to_markdown(text)
                ));
            }
            DocBlock::Paragraph { text } => parts.push(runs_to_markdown(text)),
            DocBlock::List { style, items } => {
                let mut lines = Vec::new();
                render_items(items, *style, 0, &mut lines);
                parts.push(lines.join("\n"));
            }
            DocBlock::Table { columns, rows } => {
                let mut lines = vec![
                    format!("| {} |", columns.join(" | ")),
                    format!("| {} |", vec!["---"; columns.len()].join(" | ")),
                ];
                lines.extend(rows.iter().map(|r| format!("| {} |", r.join(" | "))));
                parts.push(lines.join("\n"));
            }
            DocBlock::Divider => parts.push("---".to_string()),
            DocBlock::Note { text } => parts.push(format!("> {}", runs_to_markdown(text))),
            DocBlock::Image { src, description } => parts.push(format!(
                "![{}]({})",
                description.as_deref().unwrap_or(""),
                src
            )),
            DocBlock::Preformatted { text, language } => parts.push(format!(
                "```{}\n{}\n```",
                language.as_deref().unwrap_or(""),
                text
            )),
        }
    }
    let mut markdown = parts.join("\n\n");
    markdown.push('\n');
    markdown
}

/// Render a run sequence with inline markdown marks; underline has no
/// markdown form and renders as the `<u>` tag.
pub fn runs_to_markdown(runs: &[TextRun]) -> String {
    let mut out = String::new();
    for run in runs {
        if run.text.is_empty() {
            continue;
        }
        let mut piece = run.text.clone();
        if run.format.code {
            piece = format!("`{piece}`");
        }
        if run.format.bold {
            piece = format!("**{piece}**");
        }
        if run.format.italic {
            piece = format!("*{piece}*");
        }
        if run.format.underline {
            piece = format!("<u>{piece}</u>");
        }
        out.push_str(&piece);
    }
    out
}

fn render_items(items: &[ListItem], style: ListStyle, depth: usize, lines: &mut Vec<String>) {
    for (i, item) in items.iter().enumerate() {
        let marker = match style {
            ListStyle::Bullet => "-".to_string(),
            ListStyle::Number => format!("{}.", i + 1),
        };
        lines.push(format!(
            "{}{} {}",
            "  ".repeat(depth),
            marker,
            runs_to_markdown(&item.text)
        ));
        render_items(&item.children, style, depth + 1, lines);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_model::{Block, BlockId, RunFormat};

    #[test]
    fn renders_headings_paragraphs_and_lists() {
        let mut doc = DocState::new("doc-1");
        doc.blocks
            .push(Block::heading(2, vec![TextRun::plain("Scope")]));
        doc.blocks
            .push(Block::paragraph(vec![TextRun::plain("Body text.")]));
        doc.blocks.push(Block::new(
            BlockId::new("l1"),
            DocBlock::List {
                style: ListStyle::Number,
                items: vec![
                    ListItem::new(vec![TextRun::plain("first")]),
                    ListItem::new(vec![TextRun::plain("second")]),
                ],
            },
        ));

        let md = doc_state_to_markdown(&doc);
        assert_eq!(md, "## Scope\n\nBody text.\n\n1. first\n2. second\n");
    }

    #[test]
    fn inline_marks_render_as_markdown() {
        let runs = vec![
            TextRun::plain("a "),
            TextRun::formatted("b", RunFormat::default().with_bold(true)),
            TextRun::formatted(" c", RunFormat::default().with_italic(true)),
            TextRun::formatted("d", RunFormat::default().with_code(true)),
        ];
        assert_eq!(runs_to_markdown(&runs), "a **b*** c*`d`");
    }

    #[test]
    fn decoration_marks_never_leak() {
        let mut run = TextRun::plain("noted");
        run.comment_ids.insert(doc_model::CommentId::new("c1"));
        let mut doc = DocState::new("doc-1");
        doc.blocks.push(Block::paragraph(vec![run]));
        assert_eq!(doc_state_to_markdown(&doc), "noted\n");
    }

    #[test]
    fn tables_and_fences_render() {
        let mut doc = DocState::new("doc-1");
        doc.blocks.push(Block::new(
            BlockId::new("t1"),
            DocBlock::Table {
                columns: vec!["k".into(), "v".into()],
                rows: vec![vec!["a".into(), "1".into()]],
            },
        ));
        doc.blocks.push(Block::new(
            BlockId::new("p1"),
            DocBlock::Preformatted {
                text: "let x = 1;".into(),
                language: Some("rust".into()),
            },
        ));
        let md = doc_state_to_markdown(&doc);
        assert!(md.contains("| k | v |\n| --- | --- |\n| a | 1 |"));
        assert!(md.contains("```rust\nlet x = 1;\n```"));
    }
}
