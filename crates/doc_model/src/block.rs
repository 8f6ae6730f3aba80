//! Block nodes - top-level structural units of a document
//!
//! Blocks carry a stable ID that survives edits and conversions; the same
//! key correlates persisted metadata, comments, and AI suggestions to the
//! in-memory block.

use crate::{merge_text_runs, runs_text, BlockId, TextRun};
use serde::{Deserialize, Serialize};

/// Page/line provenance recorded at ingestion time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockProvenance {
    /// 1-based page number in the source document
    pub page: u32,
    /// Ordinal of the block within its page
    pub block_num: u32,
    /// First line of the block in the source markdown
    pub start_line: u32,
    /// Last line of the block in the source markdown
    pub end_line: u32,
}

/// List rendering style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListStyle {
    /// Unordered bullet list
    Bullet,
    /// Ordered numbered list
    Number,
}

/// A list item; items nest recursively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    /// Stable item ID
    pub id: BlockId,
    /// Item text runs
    pub text: Vec<TextRun>,
    /// Nested child items
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ListItem>,
}

impl ListItem {
    /// Create an item with a generated ID.
    pub fn new(text: Vec<TextRun>) -> Self {
        Self::with_id(BlockId::generate(), text)
    }

    /// Create an item with a specific ID.
    pub fn with_id(id: BlockId, text: Vec<TextRun>) -> Self {
        Self {
            id,
            text: non_empty(text),
            children: Vec::new(),
        }
    }
}

/// The block content union.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DocBlock {
    /// Section heading, level 1-6
    Heading { level: u8, text: Vec<TextRun> },
    /// Body paragraph
    Paragraph { text: Vec<TextRun> },
    /// Bullet or numbered list
    List { style: ListStyle, items: Vec<ListItem> },
    /// Simple grid table; cells are plain strings
    Table {
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    /// Horizontal rule
    Divider,
    /// Callout/note box
    Note { text: Vec<TextRun> },
    /// Embedded image reference
    Image {
        src: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    /// Preformatted/code block; content is opaque text
    Preformatted {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
    },
}

impl DocBlock {
    /// The wire name of this block type.
    pub fn type_name(&self) -> &'static str {
        match self {
            DocBlock::Heading { .. } => "heading",
            DocBlock::Paragraph { .. } => "paragraph",
            DocBlock::List { .. } => "list",
            DocBlock::Table { .. } => "table",
            DocBlock::Divider => "divider",
            DocBlock::Note { .. } => "note",
            DocBlock::Image { .. } => "image",
            DocBlock::Preformatted { .. } => "preformatted",
        }
    }
}

/// A block with its stable identity and provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Stable ID; survives edits and conversions
    pub id: BlockId,
    /// Template section this block belongs to, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_key: Option<String>,
    /// Explicit ordering hint from the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
    /// Page/line provenance
    #[serde(default)]
    pub meta: BlockProvenance,
    /// The block content
    #[serde(flatten)]
    pub body: DocBlock,
}

impl Block {
    /// Create a block around existing content.
    pub fn new(id: BlockId, body: DocBlock) -> Self {
        Self {
            id,
            section_key: None,
            order: None,
            meta: BlockProvenance::default(),
            body,
        }
    }

    /// Create a heading block with a generated ID. Levels clamp to 1-6.
    pub fn heading(level: u8, text: Vec<TextRun>) -> Self {
        Self::new(
            BlockId::generate(),
            DocBlock::Heading {
                level: level.clamp(1, 6),
                text: non_empty(text),
            },
        )
    }

    /// Create a paragraph block with a generated ID.
    pub fn paragraph(text: Vec<TextRun>) -> Self {
        Self::new(
            BlockId::generate(),
            DocBlock::Paragraph {
                text: non_empty(text),
            },
        )
    }

    /// Set the section key.
    pub fn with_section_key(mut self, key: impl Into<String>) -> Self {
        self.section_key = Some(key.into());
        self
    }

    /// Set the provenance metadata.
    pub fn with_meta(mut self, meta: BlockProvenance) -> Self {
        self.meta = meta;
        self
    }

    /// The text-bearing run groups of this block, in document order.
    ///
    /// Heading, paragraph, and note blocks contribute their own run
    /// vector; lists contribute one group per item, depth-first. Tables,
    /// images, dividers, and preformatted blocks carry no decorable runs.
    pub fn run_groups(&self) -> Vec<&Vec<TextRun>> {
        let mut groups = Vec::new();
        match &self.body {
            DocBlock::Heading { text, .. }
            | DocBlock::Paragraph { text }
            | DocBlock::Note { text } => groups.push(text),
            DocBlock::List { items, .. } => collect_item_groups(items, &mut groups),
            _ => {}
        }
        groups
    }

    /// Mutable variant of [`Block::run_groups`].
    pub fn run_groups_mut(&mut self) -> Vec<&mut Vec<TextRun>> {
        let mut groups = Vec::new();
        match &mut self.body {
            DocBlock::Heading { text, .. }
            | DocBlock::Paragraph { text }
            | DocBlock::Note { text } => groups.push(text),
            DocBlock::List { items, .. } => collect_item_groups_mut(items, &mut groups),
            _ => {}
        }
        groups
    }

    /// Concatenated text of all text-bearing leaf runs, in document order.
    pub fn plain_text(&self) -> String {
        self.run_groups()
            .into_iter()
            .map(|g| runs_text(g))
            .collect()
    }

    /// Character length of [`Block::plain_text`].
    pub fn char_len(&self) -> usize {
        self.run_groups()
            .into_iter()
            .flat_map(|g| g.iter())
            .map(TextRun::char_len)
            .sum()
    }

    /// Merge adjacent runs with identical decoration state in every run
    /// group. Idempotent.
    pub fn normalize_runs(&mut self) {
        for group in self.run_groups_mut() {
            let merged = merge_text_runs(std::mem::take(group));
            *group = merged;
        }
    }
}

fn collect_item_groups<'a>(items: &'a [ListItem], groups: &mut Vec<&'a Vec<TextRun>>) {
    for item in items {
        groups.push(&item.text);
        collect_item_groups(&item.children, groups);
    }
}

fn collect_item_groups_mut<'a>(items: &'a mut [ListItem], groups: &mut Vec<&'a mut Vec<TextRun>>) {
    for item in items {
        groups.push(&mut item.text);
        collect_item_groups_mut(&mut item.children, groups);
    }
}

fn non_empty(text: Vec<TextRun>) -> Vec<TextRun> {
    if text.is_empty() {
        vec![TextRun::empty()]
    } else {
        text
    }
}
