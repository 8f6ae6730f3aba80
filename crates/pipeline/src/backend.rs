//! Backend edge - the document fetch/save contract and the save driver
//!
//! The surrounding application owns the HTTP client; the pipeline only
//! sees this trait. Saves must not block the editor, so the driver is
//! async and reports its outcome back into the deterministic core.

use crate::{Result, SaveOutcome, SavePayload, SavePipeline};
use async_trait::async_trait;
use convert::BlockMetadata;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// A fetched document: the persisted records plus rendered markdown.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentPayload {
    /// Backend file ID
    pub file_id: String,
    /// Display title, when the backend has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Persisted block records
    #[serde(default)]
    pub block_metadata: Vec<BlockMetadata>,
    /// Full document markdown as last persisted
    #[serde(default)]
    pub markdown: String,
}

/// The document fetch/save API consumed by the editor core.
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Fetch a document by ID.
    async fn fetch_document(&self, document_id: &str) -> Result<DocumentPayload>;

    /// Persist the document.
    async fn save_document(&self, document_id: &str, payload: SavePayload) -> Result<()>;
}

/// Run one save round-trip and record its outcome in the pipeline.
///
/// Failures are logged and left for the caller to surface; the pipeline
/// returns to idle and does not retry on its own.
pub async fn perform_save(
    backend: &dyn DocumentBackend,
    document_id: &str,
    payload: SavePayload,
    pipeline: &mut SavePipeline,
) -> Result<()> {
    let result = backend.save_document(document_id, payload).await;
    match result {
        Ok(()) => {
            pipeline.complete(SaveOutcome::Success, Instant::now());
            Ok(())
        }
        Err(err) => {
            tracing::warn!(%document_id, %err, "document save failed");
            pipeline.complete(SaveOutcome::Failure(err.to_string()), Instant::now());
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PipelineConfig, PipelineError, SaveState};
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct MockBackend {
        saved: Mutex<Vec<SavePayload>>,
        fail: bool,
    }

    #[async_trait]
    impl DocumentBackend for MockBackend {
        async fn fetch_document(&self, document_id: &str) -> Result<DocumentPayload> {
            Err(PipelineError::DocumentNotFound(document_id.to_string()))
        }

        async fn save_document(&self, _document_id: &str, payload: SavePayload) -> Result<()> {
            if self.fail {
                return Err(PipelineError::SaveFailed("network down".into()));
            }
            self.saved.lock().unwrap().push(payload);
            Ok(())
        }
    }

    fn payload(markdown: &str) -> SavePayload {
        SavePayload {
            markdown: markdown.to_string(),
            block_metadata: Vec::new(),
            accepted_suggestions: Vec::new(),
            rejected_suggestions: Vec::new(),
        }
    }

    #[tokio::test]
    async fn successful_save_reaches_saved_state() {
        let backend = MockBackend::default();
        let mut pipeline = SavePipeline::new(PipelineConfig::default());
        let start = Instant::now();
        pipeline.request_manual_save(start);
        assert!(pipeline.poll(start).is_some());

        perform_save(&backend, "doc-1", payload("# Doc\n"), &mut pipeline)
            .await
            .unwrap();

        assert_eq!(pipeline.state(), SaveState::Saved);
        assert_eq!(backend.saved.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_save_surfaces_error_and_returns_to_idle() {
        let backend = MockBackend {
            fail: true,
            ..Default::default()
        };
        let mut pipeline = SavePipeline::new(
            PipelineConfig::default().with_debounce(Duration::from_millis(10)),
        );
        let start = Instant::now();
        pipeline.note_mutation(start);
        assert!(pipeline.poll(start + Duration::from_millis(10)).is_some());

        let err = perform_save(&backend, "doc-1", payload("x\n"), &mut pipeline)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::SaveFailed(_)));
        assert_eq!(pipeline.state(), SaveState::Idle);
        assert!(pipeline.status().last_error.is_some());
    }
}
