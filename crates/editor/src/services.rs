//! Backend service contracts consumed by the page controllers
//!
//! Comments, suggestions, and the AI text-improvement call are owned by
//! the backend; the editor core only sees these traits. Network failures
//! surface as errors at the call site and leave local state untouched -
//! no automatic retry, matching the save pipeline's policy.

use annotations::{AiSuggestion, Comment, CommentReply, SuggestionStatus};
use async_trait::async_trait;
use doc_model::{CommentId, SuggestionId};
use serde::{Deserialize, Serialize};

/// Errors from backend service calls.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("not found: {0}")]
    NotFound(String),
}

/// Result of an AI improvement call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Improvement {
    /// The text that was sent
    pub original: String,
    /// The AI's replacement text
    pub improved: String,
    /// Why the change was proposed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Comment CRUD against the backend.
#[async_trait]
pub trait CommentService: Send + Sync {
    /// List a document's comments.
    async fn list(&self, document_id: &str) -> Result<Vec<Comment>, ServiceError>;

    /// Create a comment; returns the stored copy (backend-minted ID).
    async fn create(&self, document_id: &str, comment: &Comment) -> Result<Comment, ServiceError>;

    /// Reply to a comment thread; returns the updated thread.
    async fn reply(
        &self,
        document_id: &str,
        comment_id: &CommentId,
        reply: &CommentReply,
    ) -> Result<Comment, ServiceError>;

    /// Set a comment's resolved flag.
    async fn set_resolved(
        &self,
        document_id: &str,
        comment_id: &CommentId,
        resolved: bool,
    ) -> Result<(), ServiceError>;

    /// Delete a comment and its replies.
    async fn delete(&self, document_id: &str, comment_id: &CommentId)
        -> Result<(), ServiceError>;
}

/// AI-suggestion CRUD against the backend.
#[async_trait]
pub trait SuggestionService: Send + Sync {
    /// List a document's suggestions.
    async fn list(&self, document_id: &str) -> Result<Vec<AiSuggestion>, ServiceError>;

    /// Create a suggestion; returns the stored copy.
    async fn create(
        &self,
        document_id: &str,
        suggestion: &AiSuggestion,
    ) -> Result<AiSuggestion, ServiceError>;

    /// Update only the lifecycle status.
    async fn update_status(
        &self,
        document_id: &str,
        suggestion_id: &SuggestionId,
        status: SuggestionStatus,
    ) -> Result<AiSuggestion, ServiceError>;

    /// Delete a suggestion.
    async fn delete(
        &self,
        document_id: &str,
        suggestion_id: &SuggestionId,
    ) -> Result<(), ServiceError>;
}

/// The opaque AI text-improvement call.
#[async_trait]
pub trait ImproveService: Send + Sync {
    /// Ask the AI for improved wording, optionally steered by an
    /// instruction.
    async fn improve_text(
        &self,
        text: &str,
        instruction: Option<&str>,
    ) -> Result<Improvement, ServiceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoImprover;

    #[async_trait]
    impl ImproveService for EchoImprover {
        async fn improve_text(
            &self,
            text: &str,
            instruction: Option<&str>,
        ) -> Result<Improvement, ServiceError> {
            Ok(Improvement {
                original: text.to_string(),
                improved: text.to_uppercase(),
                reason: instruction.map(str::to_string),
            })
        }
    }

    #[tokio::test]
    async fn improve_service_round_trips() {
        let service: Box<dyn ImproveService> = Box::new(EchoImprover);
        let improvement = service
            .improve_text("hello", Some("shout"))
            .await
            .unwrap();
        assert_eq!(improvement.improved, "HELLO");
        assert_eq!(improvement.reason.as_deref(), Some("shout"));
    }
}
