//! Conversion between persisted block metadata and the in-memory tree
//!
//! Textual content round-trips losslessly in both directions; formatting
//! round-trips through inline HTML when content arrives as a string and
//! through segments when already structured. Legacy type aliases
//! (`heading1`, `bulleted_list`, ...) normalize to the canonical union
//! without losing content.

use crate::{
    has_inline_markup, parse_inline_html, render_inline_html, strip_tags, BlockContent,
    BlockMetadata, InlineSegment, MetadataListItem,
};
use doc_model::{
    runs_text, Block, BlockId, BlockProvenance, DocBlock, DocState, ListItem, ListStyle, RunFormat,
    TextRun,
};

/// Build the editor's document state from persisted metadata records.
pub fn block_metadata_to_doc_state(doc_id: &str, metadata: &[BlockMetadata]) -> DocState {
    let mut doc = DocState::new(doc_id);
    for (index, record) in metadata.iter().enumerate() {
        let mut block = convert_record(record);
        block.order = Some(index as u32);
        doc.blocks.push(block);
    }
    doc
}

/// Serialize the document state back to persisted metadata records.
pub fn doc_state_to_block_metadata(doc: &DocState) -> Vec<BlockMetadata> {
    doc.blocks.iter().map(convert_block).collect()
}

fn convert_record(record: &BlockMetadata) -> Block {
    let body = match canonical_type(&record.block_type) {
        CanonicalType::Heading(alias_level) => DocBlock::Heading {
            level: record.level.or(alias_level).unwrap_or(1).clamp(1, 6),
            text: content_runs(record),
        },
        CanonicalType::Paragraph => DocBlock::Paragraph {
            text: content_runs(record),
        },
        CanonicalType::List(alias_style) => DocBlock::List {
            style: record
                .list_type
                .as_deref()
                .map(list_style_from_name)
                .unwrap_or(alias_style),
            items: record
                .items
                .as_deref()
                .map(|items| convert_items(&record.id, items))
                .unwrap_or_default(),
        },
        CanonicalType::Table => DocBlock::Table {
            columns: record.columns.clone().unwrap_or_default(),
            rows: record.rows.clone().unwrap_or_default(),
        },
        CanonicalType::Divider => DocBlock::Divider,
        CanonicalType::Note => DocBlock::Note {
            text: content_runs(record),
        },
        CanonicalType::Image => DocBlock::Image {
            src: record
                .src
                .clone()
                .unwrap_or_else(|| record.content.raw_text()),
            description: record.description.clone(),
        },
        CanonicalType::Preformatted => DocBlock::Preformatted {
            text: record.content.raw_text(),
            language: record.language.clone(),
        },
    };

    let mut block = Block::new(BlockId::new(record.id.clone()), body);
    block.section_key = record.section_key.clone();
    block.meta = BlockProvenance {
        page: record.page,
        block_num: record.block_num,
        start_line: record.start_line,
        end_line: record.end_line,
    };
    block
}

fn convert_block(block: &Block) -> BlockMetadata {
    let mut record = BlockMetadata::text_block(block.id.as_str(), block.body.type_name(), "");
    record.page = block.meta.page;
    record.block_num = block.meta.block_num;
    record.start_line = block.meta.start_line;
    record.end_line = block.meta.end_line;
    record.section_key = block.section_key.clone();

    match &block.body {
        DocBlock::Heading { level, text } => {
            record.level = Some(*level);
            record.content = runs_content(text);
        }
        DocBlock::Paragraph { text } | DocBlock::Note { text } => {
            record.content = runs_content(text);
        }
        DocBlock::List { style, items } => {
            record.list_type = Some(
                match style {
                    ListStyle::Bullet => "bullet",
                    ListStyle::Number => "number",
                }
                .to_string(),
            );
            record.items = Some(items.iter().map(render_item).collect());
        }
        DocBlock::Table { columns, rows } => {
            record.columns = Some(columns.clone());
            record.rows = Some(rows.clone());
        }
        DocBlock::Divider => {}
        DocBlock::Image { src, description } => {
            record.src = Some(src.clone());
            record.description = description.clone();
        }
        DocBlock::Preformatted { text, language } => {
            record.content = BlockContent::Text(text.clone());
            record.language = language.clone();
        }
    }
    record
}

/// Flatten a rich block to paragraph-shaped metadata.
///
/// Known lossy fallback for the legacy persistence path, which cannot
/// represent list/table structure: items join as lines, table rows join
/// with pipes. The structured path above is the primary one.
pub fn legacy_flatten_block(block: &Block) -> BlockMetadata {
    let content = match &block.body {
        DocBlock::List { items, .. } => items
            .iter()
            .map(|i| format!("- {}", runs_text(&i.text)))
            .collect::<Vec<_>>()
            .join("\n"),
        DocBlock::Table { columns, rows } => {
            let mut lines = vec![columns.join(" | ")];
            lines.extend(rows.iter().map(|r| r.join(" | ")));
            lines.join("\n")
        }
        _ => block.plain_text(),
    };
    let mut record = BlockMetadata::text_block(block.id.as_str(), "paragraph", content);
    record.page = block.meta.page;
    record.block_num = block.meta.block_num;
    record.start_line = block.meta.start_line;
    record.end_line = block.meta.end_line;
    record.section_key = block.section_key.clone();
    record
}

enum CanonicalType {
    Heading(Option<u8>),
    Paragraph,
    List(ListStyle),
    Table,
    Divider,
    Note,
    Image,
    Preformatted,
}

fn canonical_type(raw: &str) -> CanonicalType {
    match raw.to_ascii_lowercase().as_str() {
        "heading" => CanonicalType::Heading(None),
        "heading1" | "h1" => CanonicalType::Heading(Some(1)),
        "heading2" | "h2" => CanonicalType::Heading(Some(2)),
        "heading3" | "h3" => CanonicalType::Heading(Some(3)),
        "heading4" | "h4" => CanonicalType::Heading(Some(4)),
        "heading5" | "h5" => CanonicalType::Heading(Some(5)),
        "heading6" | "h6" => CanonicalType::Heading(Some(6)),
        "list" | "bulleted_list" | "bullet_list" => CanonicalType::List(ListStyle::Bullet),
        "numbered_list" | "ordered_list" => CanonicalType::List(ListStyle::Number),
        "table" => CanonicalType::Table,
        "divider" | "hr" | "rule" => CanonicalType::Divider,
        "note" | "callout" => CanonicalType::Note,
        "image" => CanonicalType::Image,
        "code" | "preformatted" => CanonicalType::Preformatted,
        // "paragraph", "text", and anything unrecognized: content survives
        // as a paragraph
        _ => CanonicalType::Paragraph,
    }
}

fn list_style_from_name(name: &str) -> ListStyle {
    match name.to_ascii_lowercase().as_str() {
        "number" | "numbered" | "ordered" => ListStyle::Number,
        _ => ListStyle::Bullet,
    }
}

/// Convert record content into runs, recovering from malformed markup by
/// falling back to a single unformatted run of the stripped text.
fn content_runs(record: &BlockMetadata) -> Vec<TextRun> {
    match &record.content {
        BlockContent::Segments(segments) => segments_to_runs(segments),
        BlockContent::Text(text) if has_inline_markup(text) => match parse_inline_html(text) {
            Ok(runs) => runs,
            Err(err) => {
                tracing::warn!(block_id = %record.id, %err, "falling back to stripped text");
                vec![TextRun::plain(strip_tags(text))]
            }
        },
        BlockContent::Text(text) => vec![TextRun::plain(text.clone())],
    }
}

fn segments_to_runs(segments: &[InlineSegment]) -> Vec<TextRun> {
    if segments.is_empty() {
        return vec![TextRun::empty()];
    }
    segments
        .iter()
        .map(|seg| {
            TextRun::formatted(
                seg.text.clone(),
                RunFormat {
                    bold: seg.bold,
                    italic: seg.italic,
                    underline: seg.underline,
                    code: seg.code,
                },
            )
        })
        .collect()
}

/// Render runs to persisted content: a plain string when nothing is
/// formatted, inline HTML otherwise.
fn runs_content(runs: &[TextRun]) -> BlockContent {
    if runs.iter().all(|r| r.format.is_plain()) {
        BlockContent::Text(runs_text(runs))
    } else {
        BlockContent::Text(render_inline_html(runs))
    }
}

fn convert_items(block_id: &str, items: &[MetadataListItem]) -> Vec<ListItem> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let runs = if has_inline_markup(item.text()) {
                parse_inline_html(item.text())
                    .unwrap_or_else(|_| vec![TextRun::plain(strip_tags(item.text()))])
            } else {
                vec![TextRun::plain(item.text())]
            };
            let mut converted =
                ListItem::with_id(BlockId::new(format!("{block_id}_item_{i}")), runs);
            converted.children = convert_items(&format!("{block_id}_item_{i}"), item.children());
            converted
        })
        .collect()
}

fn render_item(item: &ListItem) -> MetadataListItem {
    let text = match runs_content(&item.text) {
        BlockContent::Text(t) => t,
        BlockContent::Segments(segs) => segs.into_iter().map(|s| s.text).collect(),
    };
    MetadataListItem::Item {
        text,
        children: item.children.iter().map(render_item).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraph_metadata_becomes_single_run_block() {
        let meta = vec![BlockMetadata::text_block("b1", "paragraph", "Hello world")];
        let doc = block_metadata_to_doc_state("doc-1", &meta);

        assert_eq!(doc.blocks.len(), 1);
        assert_eq!(doc.blocks[0].id, BlockId::new("b1"));
        match &doc.blocks[0].body {
            DocBlock::Paragraph { text } => {
                assert_eq!(text, &vec![TextRun::plain("Hello world")]);
            }
            other => panic!("expected paragraph, got {}", other.type_name()),
        }
    }

    #[test]
    fn legacy_type_names_normalize() {
        let meta = vec![
            BlockMetadata::text_block("h", "heading2", "Scope"),
            BlockMetadata::text_block("l", "bulleted_list", ""),
            BlockMetadata::text_block("n", "callout", "careful"),
            BlockMetadata::text_block("x", "mystery_type", "kept text"),
        ];
        let doc = block_metadata_to_doc_state("doc-1", &meta);

        assert!(matches!(
            doc.blocks[0].body,
            DocBlock::Heading { level: 2, .. }
        ));
        assert!(matches!(
            doc.blocks[1].body,
            DocBlock::List {
                style: ListStyle::Bullet,
                ..
            }
        ));
        assert!(matches!(doc.blocks[2].body, DocBlock::Note { .. }));
        // unknown types keep their content as a paragraph
        assert_eq!(doc.blocks[3].plain_text(), "kept text");
    }

    #[test]
    fn html_content_parses_into_formatted_runs() {
        let meta = vec![BlockMetadata::text_block(
            "b1",
            "paragraph",
            "see <strong>bold</strong> text",
        )];
        let doc = block_metadata_to_doc_state("doc-1", &meta);
        let runs = doc.blocks[0].run_groups()[0];
        assert_eq!(runs.len(), 3);
        assert!(runs[1].format.bold);
    }

    #[test]
    fn malformed_html_falls_back_to_stripped_text() {
        let meta = vec![BlockMetadata::text_block(
            "b1",
            "paragraph",
            "bad <strong>markup</em> here",
        )];
        let doc = block_metadata_to_doc_state("doc-1", &meta);
        assert_eq!(doc.blocks[0].plain_text(), "bad markup here");
    }

    #[test]
    fn segment_content_maps_one_to_one() {
        let mut meta = BlockMetadata::text_block("b1", "paragraph", "");
        meta.content = BlockContent::Segments(vec![
            InlineSegment::plain("Hello "),
            InlineSegment {
                text: "world".into(),
                bold: true,
                ..Default::default()
            },
        ]);
        let doc = block_metadata_to_doc_state("doc-1", &[meta]);
        let runs = doc.blocks[0].run_groups()[0];
        assert_eq!(runs[0].text, "Hello ");
        assert!(runs[1].format.bold);
    }

    #[test]
    fn empty_content_becomes_single_empty_run() {
        let meta = vec![BlockMetadata::text_block("b1", "paragraph", "")];
        let doc = block_metadata_to_doc_state("doc-1", &meta);
        let runs = doc.blocks[0].run_groups()[0];
        assert_eq!(runs, &vec![TextRun::empty()]);
    }

    #[test]
    fn plain_blocks_round_trip_exactly() {
        let mut m1 = BlockMetadata::text_block("b1", "paragraph", "Hello world");
        m1.page = 3;
        m1.block_num = 2;
        m1.start_line = 10;
        m1.end_line = 12;
        m1.section_key = Some("scope".into());
        let mut m2 = BlockMetadata::text_block("b2", "heading", "Scope");
        m2.level = Some(2);
        let meta = vec![m1, m2];

        let doc = block_metadata_to_doc_state("doc-1", &meta);
        let back = doc_state_to_block_metadata(&doc);
        assert_eq!(back, meta);
    }

    #[test]
    fn formatted_blocks_round_trip_modulo_tag_canonicalization() {
        let meta = vec![BlockMetadata::text_block(
            "b1",
            "paragraph",
            "a <b>bold</b> word",
        )];
        let doc = block_metadata_to_doc_state("doc-1", &meta);
        let back = doc_state_to_block_metadata(&doc);
        // <b> canonicalizes to <strong>
        assert_eq!(
            back[0].content,
            BlockContent::Text("a <strong>bold</strong> word".into())
        );
        // and a second round trip is stable
        let doc2 = block_metadata_to_doc_state("doc-1", &back);
        assert_eq!(doc_state_to_block_metadata(&doc2), back);
    }

    #[test]
    fn list_round_trip_keeps_structure() {
        let mut meta = BlockMetadata::text_block("l1", "list", "");
        meta.list_type = Some("number".into());
        meta.items = Some(vec![
            MetadataListItem::Text("first".into()),
            MetadataListItem::Item {
                text: "second".into(),
                children: vec![MetadataListItem::Text("nested".into())],
            },
        ]);
        let doc = block_metadata_to_doc_state("doc-1", &[meta]);
        match &doc.blocks[0].body {
            DocBlock::List { style, items } => {
                assert_eq!(*style, ListStyle::Number);
                assert_eq!(items.len(), 2);
                assert_eq!(runs_text(&items[1].children[0].text), "nested");
            }
            _ => panic!("expected list"),
        }
        let back = doc_state_to_block_metadata(&doc);
        assert_eq!(back[0].items.as_ref().unwrap()[0].text(), "first");
        assert_eq!(back[0].items.as_ref().unwrap()[1].children()[0].text(), "nested");
    }

    #[test]
    fn legacy_flatten_degrades_lists_to_paragraph_text() {
        let doc = block_metadata_to_doc_state(
            "doc-1",
            &[{
                let mut m = BlockMetadata::text_block("l1", "list", "");
                m.items = Some(vec![
                    MetadataListItem::Text("one".into()),
                    MetadataListItem::Text("two".into()),
                ]);
                m
            }],
        );
        let flat = legacy_flatten_block(&doc.blocks[0]);
        assert_eq!(flat.block_type, "paragraph");
        assert_eq!(flat.content, BlockContent::Text("- one\n- two".into()));
    }
}
