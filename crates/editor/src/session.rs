//! The editor session - owner of the document and review state
//!
//! One session per open document. All mutation funnels through the
//! session so the overlay throttle, save pipeline, template checker, and
//! event bus stay consistent: every committed mutation schedules a
//! highlight re-apply, resets the save debounce, re-runs the structure
//! check, and notifies subscribers.

use crate::{
    resolve_selection, ActivityFeed, ActivityKind, EditorError, EditorEvent, EventBus, Improvement,
    Result,
};
use annotations::{
    AiSuggestion, Comment, CommentReply, CommentStore, SuggestionStatus, SuggestionStore,
};
use convert::block_metadata_to_doc_state;
use doc_model::{BlockId, CommentId, DocState, LeafPoint, SelectionData, SuggestionId};
use overlay::{
    apply_ai_suggestion_highlight, apply_comment_highlight, comment_ids_at, reapply_highlights,
    remove_ai_suggestion_highlight, remove_comment_highlight, replace_text_by_suggestion_id,
    ReapplyThrottle, ThrottleConfig,
};
use pipeline::{
    build_save_payload, DocumentPayload, PipelineConfig, SaveOutcome, SavePayload, SavePipeline,
    SaveReason, SaveState, SaveStatus,
};
use std::time::Instant;
use template_check::{check, headings_of, SectionTemplate, Violation};

/// Session construction options.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Save pipeline timing
    pub pipeline: PipelineConfig,
    /// Highlight re-apply throttle timing
    pub throttle: ThrottleConfig,
    /// Structure template; `None` disables the checker
    pub template: Option<SectionTemplate>,
}

/// Work that became due on a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    /// A highlight re-apply pass ran
    pub reapplied: bool,
    /// A save became due; the caller builds the payload and drives the
    /// backend, then reports back via `complete_save`
    pub save_due: Option<SaveReason>,
}

/// The single-document editor session.
pub struct EditorSession {
    doc: DocState,
    comments: CommentStore,
    suggestions: SuggestionStore,
    throttle: ReapplyThrottle,
    pipeline: SavePipeline,
    bus: EventBus,
    activity: ActivityFeed,
    template: Option<SectionTemplate>,
    violations: Vec<Violation>,
    last_save_state: SaveState,
}

impl EditorSession {
    /// Open a session over a fetched document.
    pub fn load(payload: &DocumentPayload, config: SessionConfig) -> Self {
        let mut doc = block_metadata_to_doc_state(&payload.file_id, &payload.block_metadata);
        doc.title = payload.title.clone();

        let mut session = Self {
            doc,
            comments: CommentStore::new(),
            suggestions: SuggestionStore::new(),
            throttle: ReapplyThrottle::new(config.throttle),
            pipeline: SavePipeline::new(config.pipeline),
            bus: EventBus::new(),
            activity: ActivityFeed::new(),
            template: config.template,
            violations: Vec::new(),
            last_save_state: SaveState::Idle,
        };
        session.run_template_check();
        session
    }

    /// The current document.
    pub fn doc(&self) -> &DocState {
        &self.doc
    }

    /// The comment store.
    pub fn comments(&self) -> &CommentStore {
        &self.comments
    }

    /// The suggestion store.
    pub fn suggestions(&self) -> &SuggestionStore {
        &self.suggestions
    }

    /// Current structure violations (empty when no template is set).
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// The event bus, for subscribing page controllers.
    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    /// The activity feed.
    pub fn activity(&self) -> &ActivityFeed {
        &self.activity
    }

    /// The activity feed, for subscribing panels.
    pub fn activity_mut(&mut self) -> &mut ActivityFeed {
        &mut self.activity
    }

    /// Save pipeline status snapshot.
    pub fn save_status(&self) -> SaveStatus {
        self.pipeline.status()
    }

    /// Replace the annotation sets with the backend's lists and apply
    /// their highlights.
    pub fn set_annotations(&mut self, comments: Vec<Comment>, suggestions: Vec<AiSuggestion>) {
        self.comments = CommentStore::new();
        for comment in comments {
            self.comments.insert(comment);
        }
        self.suggestions = SuggestionStore::new();
        for suggestion in suggestions {
            self.suggestions.insert(suggestion);
        }
        reapply_highlights(&mut self.doc, &self.comments, &self.suggestions);
    }

    /// Run an edit against the document and record it as a committed
    /// mutation: bumps the version, schedules the highlight re-apply,
    /// resets the save debounce, re-checks structure, and notifies
    /// subscribers.
    pub fn commit_mutation(&mut self, now: Instant, edit: impl FnOnce(&mut DocState)) {
        edit(&mut self.doc);
        let version = self.doc.bump_version();
        self.throttle.note_mutation(now);
        self.pipeline.note_mutation(now);
        self.run_template_check();
        self.bus.publish(&EditorEvent::DocumentMutated { version });
    }

    /// Forward a selection change to subscribers.
    pub fn notify_selection(&self, selection: Option<SelectionData>) {
        self.bus.publish(&EditorEvent::SelectionChanged { selection });
    }

    /// Forward a key press to subscribers.
    pub fn notify_key(&self, key: impl Into<String>) {
        self.bus.publish(&EditorEvent::KeyPressed { key: key.into() });
    }

    /// Drive the timers. Runs the coalesced highlight re-apply when due
    /// and reports when a save should start.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        let reapplied = self.throttle.poll(now);
        if reapplied {
            reapply_highlights(&mut self.doc, &self.comments, &self.suggestions);
        }
        let save_due = self.pipeline.poll(now);
        self.sync_save_state();
        TickOutcome {
            reapplied,
            save_due,
        }
    }

    /// Build the save request body from the current state.
    pub fn save_payload(&self) -> SavePayload {
        build_save_payload(&self.doc, &self.suggestions)
    }

    /// Ask for an explicit save on the next tick.
    pub fn request_manual_save(&mut self, now: Instant) {
        self.pipeline.request_manual_save(now);
    }

    /// Report the outcome of a save the caller drove.
    pub fn complete_save(&mut self, outcome: SaveOutcome, now: Instant) {
        let message = match &outcome {
            SaveOutcome::Success => "document saved".to_string(),
            SaveOutcome::Failure(err) => format!("save failed: {err}"),
        };
        self.pipeline.complete(outcome, now);
        self.sync_save_state();
        self.activity.log(ActivityKind::Save, message);
    }

    /// Resolve a live selection to block offsets
    /// (the `getSelectionOffsets` contract).
    pub fn selection_offsets(&self, anchor: &LeafPoint, focus: &LeafPoint) -> Option<SelectionData> {
        let block = self.doc.block(&anchor.block_id)?;
        resolve_selection(block, anchor, focus)
    }

    /// Text-search fallback for selections whose leaf identity is gone.
    pub fn selection_offsets_by_text(
        &self,
        block_id: &BlockId,
        selected_text: &str,
        hint: usize,
    ) -> Option<SelectionData> {
        let block = self.doc.block(block_id)?;
        crate::resolve_by_text(block, selected_text, hint)
    }

    /// Comment IDs covering a clicked position, for the panel.
    pub fn comment_ids_at(&self, block_id: &BlockId, offset: usize) -> Vec<CommentId> {
        comment_ids_at(&self.doc, block_id, offset)
    }

    /// Record a comment (already persisted by the backend) and highlight
    /// its range.
    pub fn add_comment(&mut self, mut comment: Comment) -> CommentId {
        if comment.block_title.is_empty() {
            if let Some(text) = self.doc.plain_text_of(&comment.block_id) {
                comment.block_title = text.chars().take(60).collect();
            }
        }
        self.activity.log(
            ActivityKind::Comment,
            format!("{} commented on {}", comment.author, comment.block_id),
        );
        if let (Some(text), Some((start, end))) =
            (comment.selection_text.clone(), comment.anchor())
        {
            if let Err(err) = apply_comment_highlight(
                &mut self.doc,
                &comment.id,
                &comment.block_id,
                &text,
                start,
                end,
                None,
            ) {
                tracing::warn!(comment_id = %comment.id, %err, "could not highlight new comment");
            }
        }
        self.comments.insert(comment)
    }

    /// Append a reply to a comment thread.
    pub fn reply_to_comment(&mut self, id: &CommentId, reply: CommentReply) -> Result<()> {
        self.comments.add_reply(id, reply)?;
        Ok(())
    }

    /// Toggle a comment's resolved flag; resolved comments lose their
    /// highlight on the spot.
    pub fn toggle_comment_resolved(&mut self, id: &CommentId) -> Result<bool> {
        let resolved = self.comments.toggle_resolved(id)?;
        reapply_highlights(&mut self.doc, &self.comments, &self.suggestions);
        Ok(resolved)
    }

    /// Delete a comment and clear its highlight.
    pub fn delete_comment(&mut self, id: &CommentId) -> Result<()> {
        self.comments
            .remove(id)
            .ok_or_else(|| EditorError::UnknownComment(id.to_string()))?;
        remove_comment_highlight(&mut self.doc, id);
        Ok(())
    }

    /// Record a suggestion (already persisted) and highlight its range
    /// as pending.
    pub fn add_suggestion(&mut self, suggestion: AiSuggestion) -> SuggestionId {
        self.activity.log(
            ActivityKind::Suggestion,
            format!("AI suggested a change on {}", suggestion.block_id),
        );
        if let Err(err) = apply_ai_suggestion_highlight(
            &mut self.doc,
            &suggestion.id,
            &suggestion.block_id,
            &suggestion.selection_text,
            suggestion.status.as_mark(),
            suggestion.start_offset,
            suggestion.end_offset,
        ) {
            tracing::warn!(suggestion_id = %suggestion.id, %err, "could not highlight suggestion");
        }
        self.suggestions.insert(suggestion)
    }

    /// Build and record a suggestion from an AI improvement of the
    /// current selection.
    pub fn record_improvement(
        &mut self,
        selection: &SelectionData,
        improvement: &Improvement,
    ) -> SuggestionId {
        let mut suggestion = AiSuggestion::new(
            selection.block_id.clone(),
            improvement.original.clone(),
            improvement.improved.clone(),
        )
        .with_offsets(selection.start_offset, selection.end_offset);
        if let Some(reason) = &improvement.reason {
            suggestion = suggestion.with_reason(reason.clone());
        }
        self.add_suggestion(suggestion)
    }

    /// Accept a suggestion: perform the real text replacement, keep the
    /// applied mark as the historical record, and schedule save/re-apply.
    pub fn accept_suggestion(&mut self, id: &SuggestionId, now: Instant) -> Result<()> {
        let suggestion = self
            .suggestions
            .get(id)
            .cloned()
            .ok_or_else(|| EditorError::UnknownSuggestion(id.to_string()))?;
        replace_text_by_suggestion_id(
            &mut self.doc,
            &suggestion.id,
            &suggestion.block_id,
            &suggestion.selection_text,
            &suggestion.improved_text,
            suggestion.start_offset,
            suggestion.end_offset,
        )?;
        self.suggestions
            .update_status(id, SuggestionStatus::Accepted)?;

        self.throttle.note_mutation(now);
        self.pipeline.note_mutation(now);
        self.run_template_check();
        self.bus.publish(&EditorEvent::DocumentMutated {
            version: self.doc.version,
        });
        self.activity.log(
            ActivityKind::Suggestion,
            format!("accepted AI suggestion on {}", suggestion.block_id),
        );
        Ok(())
    }

    /// Reject a suggestion: clear its highlight and queue the decision
    /// for the next save.
    pub fn reject_suggestion(&mut self, id: &SuggestionId, now: Instant) -> Result<()> {
        self.suggestions
            .update_status(id, SuggestionStatus::Rejected)?;
        remove_ai_suggestion_highlight(&mut self.doc, id);
        self.pipeline.note_mutation(now);
        self.activity
            .log(ActivityKind::Suggestion, format!("rejected suggestion {id}"));
        Ok(())
    }

    fn run_template_check(&mut self) {
        let violations = match &self.template {
            Some(template) => check(template, &headings_of(&self.doc)),
            None => Vec::new(),
        };
        if violations != self.violations && !violations.is_empty() {
            self.activity.log(
                ActivityKind::Template,
                format!("structure check: {} violation(s)", violations.len()),
            );
        }
        self.violations = violations;
    }

    fn sync_save_state(&mut self) {
        let state = self.pipeline.state();
        if state != self.last_save_state {
            self.last_save_state = state;
            self.bus
                .publish(&EditorEvent::SaveStateChanged { state });
        }
    }
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("doc", &self.doc.id)
            .field("version", &self.doc.version)
            .field("comments", &self.comments.len())
            .field("suggestions", &self.suggestions.len())
            .finish()
    }
}
