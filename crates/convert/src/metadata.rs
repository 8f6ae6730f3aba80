//! Persisted block metadata - the flat record format the backend stores
//!
//! Each record carries the stable block ID, page/line provenance from PDF
//! ingestion, and content in one of the legacy shapes: a plain string, a
//! string with inline HTML tags, or an already-structured segment list.

use serde::{Deserialize, Serialize};

/// One formatted span in pre-structured content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InlineSegment {
    /// Span text
    pub text: String,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub underline: bool,
    #[serde(default)]
    pub code: bool,
}

impl InlineSegment {
    /// Create a plain segment.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// Block content as persisted: either a (possibly HTML-bearing) string or
/// a structured segment list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockContent {
    /// Plain or inline-HTML-bearing string
    Text(String),
    /// Pre-structured formatted segments
    Segments(Vec<InlineSegment>),
}

impl Default for BlockContent {
    fn default() -> Self {
        BlockContent::Text(String::new())
    }
}

impl BlockContent {
    /// The raw text of the content, tags included for the string form.
    pub fn raw_text(&self) -> String {
        match self {
            BlockContent::Text(s) => s.clone(),
            BlockContent::Segments(segs) => segs.iter().map(|s| s.text.as_str()).collect(),
        }
    }
}

/// A persisted list item: legacy records store bare strings, newer ones
/// store objects with optional nested children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataListItem {
    /// Bare string item
    Text(String),
    /// Structured item with optional nesting
    Item {
        text: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<MetadataListItem>,
    },
}

impl MetadataListItem {
    /// Item text regardless of shape.
    pub fn text(&self) -> &str {
        match self {
            MetadataListItem::Text(t) => t,
            MetadataListItem::Item { text, .. } => text,
        }
    }

    /// Nested children (empty for bare strings).
    pub fn children(&self) -> &[MetadataListItem] {
        match self {
            MetadataListItem::Text(_) => &[],
            MetadataListItem::Item { children, .. } => children,
        }
    }
}

/// One persisted block record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockMetadata {
    /// Stable block ID; the correlation key for comments and suggestions
    pub id: String,
    /// 1-based source page
    #[serde(default)]
    pub page: u32,
    /// Ordinal within the page
    #[serde(default)]
    pub block_num: u32,
    /// First markdown line of the block
    #[serde(default)]
    pub start_line: u32,
    /// Last markdown line of the block
    #[serde(default)]
    pub end_line: u32,
    /// Block content
    #[serde(default)]
    pub content: BlockContent,
    /// Block type name; legacy aliases are normalized on conversion
    #[serde(rename = "type")]
    pub block_type: String,
    /// Heading level for heading blocks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    /// Template section key, if assigned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_key: Option<String>,
    /// List style name for list blocks ("bullet"/"number")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_type: Option<String>,
    /// List items for list blocks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<MetadataListItem>>,
    /// Table column headers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
    /// Table body rows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<Vec<String>>>,
    /// Language hint for preformatted blocks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Image source for image blocks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    /// Image description for image blocks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl BlockMetadata {
    /// Create a minimal record with string content.
    pub fn text_block(
        id: impl Into<String>,
        block_type: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            page: 0,
            block_num: 0,
            start_line: 0,
            end_line: 0,
            content: BlockContent::Text(content.into()),
            block_type: block_type.into(),
            level: None,
            section_key: None,
            list_type: None,
            items: None,
            columns: None,
            rows: None,
            language: None,
            src: None,
            description: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_deserializes_both_shapes() {
        let text: BlockContent = serde_json::from_str("\"Hello\"").unwrap();
        assert_eq!(text, BlockContent::Text("Hello".into()));

        let segs: BlockContent =
            serde_json::from_str(r#"[{"text":"Hi","bold":true}]"#).unwrap();
        match segs {
            BlockContent::Segments(s) => {
                assert_eq!(s.len(), 1);
                assert!(s[0].bold);
            }
            _ => panic!("expected segments"),
        }
    }

    #[test]
    fn list_items_accept_bare_strings() {
        let items: Vec<MetadataListItem> =
            serde_json::from_str(r#"["plain", {"text":"rich","children":["sub"]}]"#).unwrap();
        assert_eq!(items[0].text(), "plain");
        assert_eq!(items[1].text(), "rich");
        assert_eq!(items[1].children()[0].text(), "sub");
    }

    #[test]
    fn metadata_round_trips_through_json() {
        let meta = BlockMetadata::text_block("b1", "paragraph", "Hello world");
        let json = serde_json::to_string(&meta).unwrap();
        let back: BlockMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back, meta);
    }
}
