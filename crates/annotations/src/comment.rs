//! Comment model - annotations and discussions on block text
//!
//! Comments anchor to a block by ID, optionally narrowed to a text range
//! by character offsets recorded at creation time. They support threaded
//! replies and a resolved flag; resolved comments stop being highlighted
//! but stay in the store.

use crate::{AnnotationError, Result};
use chrono::{DateTime, Utc};
use doc_model::{BlockId, CommentId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Unique identifier for a comment reply.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReplyId(String);

impl ReplyId {
    /// Wrap an existing backend-minted ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a fresh UUID-backed ID.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ReplyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A reply in a comment thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentReply {
    /// Unique reply ID
    pub id: ReplyId,
    /// Reply author
    pub author: String,
    /// When the reply was created
    pub timestamp: DateTime<Utc>,
    /// Reply text
    pub content: String,
}

impl CommentReply {
    /// Create a new reply.
    pub fn new(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: ReplyId::generate(),
            author: author.into(),
            timestamp: Utc::now(),
            content: content.into(),
        }
    }
}

/// A comment on a block, optionally anchored to a text range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Unique comment ID
    pub id: CommentId,
    /// The block this comment belongs to
    pub block_id: BlockId,
    /// Title/preview of the block at creation time
    #[serde(default)]
    pub block_title: String,
    /// The selected text the comment refers to, if range-anchored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection_text: Option<String>,
    /// Character offset where the selection starts in the block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_offset: Option<usize>,
    /// Character offset where the selection ends (exclusive)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_offset: Option<usize>,
    /// Comment text
    pub content: String,
    /// Comment author
    pub author: String,
    /// When the comment was created
    pub timestamp: DateTime<Utc>,
    /// When the comment was last edited
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Whether the thread is resolved
    #[serde(default)]
    pub resolved: bool,
    /// Threaded replies
    #[serde(default)]
    pub replies: Vec<CommentReply>,
}

impl Comment {
    /// Create a block-level comment (no text range).
    pub fn new(
        block_id: BlockId,
        author: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Self> {
        let author = author.into();
        let content = content.into();
        validate_author(&author)?;
        validate_content(&content)?;
        Ok(Self {
            id: CommentId::generate(),
            block_id,
            block_title: String::new(),
            selection_text: None,
            start_offset: None,
            end_offset: None,
            content,
            author,
            timestamp: Utc::now(),
            updated_at: None,
            resolved: false,
            replies: Vec::new(),
        })
    }

    /// Create a range-anchored comment from a resolved selection.
    pub fn for_selection(
        block_id: BlockId,
        selection_text: impl Into<String>,
        start_offset: usize,
        end_offset: usize,
        author: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Self> {
        let mut comment = Self::new(block_id, author, content)?;
        comment.selection_text = Some(selection_text.into());
        // normalize direction so start <= end
        comment.start_offset = Some(start_offset.min(end_offset));
        comment.end_offset = Some(start_offset.max(end_offset));
        Ok(comment)
    }

    /// Set the block title preview.
    pub fn with_block_title(mut self, title: impl Into<String>) -> Self {
        self.block_title = title.into();
        self
    }

    /// The anchored range, when both offsets are recorded.
    pub fn anchor(&self) -> Option<(usize, usize)> {
        match (self.start_offset, self.end_offset) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }

    /// Add a reply to the thread.
    pub fn add_reply(&mut self, reply: CommentReply) {
        self.replies.push(reply);
    }
}

fn validate_content(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(AnnotationError::EmptyContent);
    }
    Ok(())
}

fn validate_author(author: &str) -> Result<()> {
    if author.trim().is_empty() {
        return Err(AnnotationError::EmptyAuthor);
    }
    Ok(())
}

/// Ordered store for a document's comments.
///
/// Keeps backend insertion order so the panel lists threads the way the
/// API returned them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentStore {
    comments: Vec<Comment>,
}

impl CommentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a comment, replacing any existing one with the same ID.
    pub fn insert(&mut self, comment: Comment) -> CommentId {
        let id = comment.id.clone();
        match self.comments.iter_mut().find(|c| c.id == id) {
            Some(existing) => *existing = comment,
            None => self.comments.push(comment),
        }
        id
    }

    /// Remove a comment by ID.
    pub fn remove(&mut self, id: &CommentId) -> Option<Comment> {
        let index = self.comments.iter().position(|c| &c.id == id)?;
        Some(self.comments.remove(index))
    }

    /// Get a comment by ID.
    pub fn get(&self, id: &CommentId) -> Option<&Comment> {
        self.comments.iter().find(|c| &c.id == id)
    }

    /// Get a mutable comment by ID.
    pub fn get_mut(&mut self, id: &CommentId) -> Option<&mut Comment> {
        self.comments.iter_mut().find(|c| &c.id == id)
    }

    /// All comments, in insertion order.
    pub fn all(&self) -> impl Iterator<Item = &Comment> {
        self.comments.iter()
    }

    /// Number of comments.
    pub fn len(&self) -> usize {
        self.comments.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    /// Drop every comment.
    pub fn clear(&mut self) {
        self.comments.clear();
    }

    /// Comments on a specific block.
    pub fn for_block(&self, block_id: &BlockId) -> Vec<&Comment> {
        self.comments
            .iter()
            .filter(|c| &c.block_id == block_id)
            .collect()
    }

    /// Unresolved comments, in order.
    pub fn unresolved(&self) -> Vec<&Comment> {
        self.comments.iter().filter(|c| !c.resolved).collect()
    }

    /// Unresolved-comment count per block, for the panel badges.
    pub fn unresolved_count_by_block(&self) -> HashMap<BlockId, usize> {
        let mut counts = HashMap::new();
        for comment in self.comments.iter().filter(|c| !c.resolved) {
            *counts.entry(comment.block_id.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Toggle a comment's resolved flag; returns the new value.
    pub fn toggle_resolved(&mut self, id: &CommentId) -> Result<bool> {
        let comment = self
            .get_mut(id)
            .ok_or_else(|| AnnotationError::CommentNotFound(id.to_string()))?;
        comment.resolved = !comment.resolved;
        Ok(comment.resolved)
    }

    /// Append a reply to a comment thread.
    pub fn add_reply(&mut self, id: &CommentId, reply: CommentReply) -> Result<&Comment> {
        let comment = self
            .get_mut(id)
            .ok_or_else(|| AnnotationError::CommentNotFound(id.to_string()))?;
        comment.add_reply(reply);
        Ok(&*comment)
    }

    /// Update a comment's content, stamping `updated_at`.
    pub fn update_content(&mut self, id: &CommentId, content: impl Into<String>) -> Result<()> {
        let content = content.into();
        validate_content(&content)?;
        let comment = self
            .get_mut(id)
            .ok_or_else(|| AnnotationError::CommentNotFound(id.to_string()))?;
        comment.content = content;
        comment.updated_at = Some(Utc::now());
        Ok(())
    }
}
