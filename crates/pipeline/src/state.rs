//! The save state machine with debouncing and single-flight saves

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Pipeline display state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveState {
    /// No save in flight or recently finished
    Idle,
    /// A save request is in flight
    Saving,
    /// Last save succeeded; reverts to idle after the display window
    Saved,
}

/// Why a save became due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveReason {
    /// The debounce window elapsed after the last mutation
    Debounced,
    /// The user asked for an explicit save
    Manual,
    /// A mutation landed during the previous save; this carries the
    /// latest state
    FollowUp,
}

/// Outcome of a completed save round-trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Success,
    Failure(String),
}

/// Pipeline configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Delay from the last mutation before an auto-save fires
    pub debounce: Duration,
    /// How long the `Saved` state stays visible before reverting to idle
    pub saved_display: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(1500),
            saved_display: Duration::from_secs(2),
        }
    }
}

impl PipelineConfig {
    /// Set the auto-save debounce window.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Set the saved-state display window.
    pub fn with_saved_display(mut self, saved_display: Duration) -> Self {
        self.saved_display = saved_display;
        self
    }
}

/// Snapshot of the pipeline for status displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveStatus {
    /// Current display state
    pub state: SaveState,
    /// Whether unsaved changes exist
    pub dirty: bool,
    /// Error message from the last failed save, if any
    pub last_error: Option<String>,
}

/// The deterministic save-pipeline core.
///
/// Every mutation resets the debounce timer; `poll` reports when a save
/// is due and flips the machine to `Saving`; `complete` records the
/// outcome. Failures return to `Idle` without automatic retry - the next
/// edit or manual save re-attempts with the latest state.
#[derive(Debug)]
pub struct SavePipeline {
    config: PipelineConfig,
    state: SaveState,
    dirty: bool,
    dirty_during_save: bool,
    follow_up_due: bool,
    manual_requested: bool,
    last_mutation: Option<Instant>,
    saved_at: Option<Instant>,
    last_error: Option<String>,
}

impl SavePipeline {
    /// Create a pipeline with the given config.
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            state: SaveState::Idle,
            dirty: false,
            dirty_during_save: false,
            follow_up_due: false,
            manual_requested: false,
            last_mutation: None,
            saved_at: None,
            last_error: None,
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Record a committed document mutation. Resets the debounce timer.
    pub fn note_mutation(&mut self, now: Instant) {
        self.dirty = true;
        self.last_mutation = Some(now);
        if self.state == SaveState::Saving {
            self.dirty_during_save = true;
        }
    }

    /// Request an explicit save; fires on the next poll even when
    /// nothing is dirty, unless a save is already in flight.
    pub fn request_manual_save(&mut self, _now: Instant) {
        self.manual_requested = true;
    }

    /// Poll for due work. Returns the reason a save should start now;
    /// the machine transitions to `Saving` when it does. While `Saving`,
    /// always returns `None` (single-flight).
    pub fn poll(&mut self, now: Instant) -> Option<SaveReason> {
        if self.state == SaveState::Saved {
            let expired = self
                .saved_at
                .map_or(true, |at| now.duration_since(at) >= self.config.saved_display);
            if expired {
                self.state = SaveState::Idle;
            }
        }
        if self.state == SaveState::Saving {
            return None;
        }
        let reason = if self.manual_requested {
            SaveReason::Manual
        } else if self.follow_up_due {
            SaveReason::FollowUp
        } else if self.dirty
            && self
                .last_mutation
                .map_or(false, |at| now.duration_since(at) >= self.config.debounce)
        {
            SaveReason::Debounced
        } else {
            return None;
        };

        self.state = SaveState::Saving;
        self.dirty = false;
        self.dirty_during_save = false;
        self.follow_up_due = false;
        self.manual_requested = false;
        Some(reason)
    }

    /// Record the outcome of the in-flight save.
    pub fn complete(&mut self, outcome: SaveOutcome, now: Instant) {
        match outcome {
            SaveOutcome::Success => {
                self.state = SaveState::Saved;
                self.saved_at = Some(now);
                self.last_error = None;
                if self.dirty_during_save {
                    // a mutation landed mid-save: due again immediately,
                    // carrying the latest state
                    self.dirty = true;
                    self.follow_up_due = true;
                }
            }
            SaveOutcome::Failure(message) => {
                // back to idle, never to saved; no automatic retry
                self.state = SaveState::Idle;
                self.last_error = Some(message);
                if self.dirty_during_save {
                    // the mid-save edit re-attempts on its own debounce
                    self.dirty = true;
                }
            }
        }
        self.dirty_during_save = false;
    }

    /// Current status snapshot.
    pub fn status(&self) -> SaveStatus {
        SaveStatus {
            state: self.state,
            dirty: self.dirty,
            last_error: self.last_error.clone(),
        }
    }

    /// Current display state.
    pub fn state(&self) -> SaveState {
        self.state
    }

    /// Whether unsaved changes exist.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

impl Default for SavePipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline() -> SavePipeline {
        SavePipeline::new(
            PipelineConfig::default()
                .with_debounce(Duration::from_millis(1500))
                .with_saved_display(Duration::from_secs(2)),
        )
    }

    #[test]
    fn burst_of_mutations_triggers_one_save() {
        let start = Instant::now();
        let mut p = pipeline();

        // five mutations inside the debounce window
        for ms in [0u64, 100, 200, 300, 400] {
            p.note_mutation(start + Duration::from_millis(ms));
            assert_eq!(p.poll(start + Duration::from_millis(ms)), None);
        }
        // debounce counts from the fifth mutation
        assert_eq!(p.poll(start + Duration::from_millis(1800)), None);
        assert_eq!(
            p.poll(start + Duration::from_millis(1901)),
            Some(SaveReason::Debounced)
        );
        // single save: nothing further is due
        assert_eq!(p.poll(start + Duration::from_millis(4000)), None);
    }

    #[test]
    fn saved_state_expires_back_to_idle() {
        let start = Instant::now();
        let mut p = pipeline();
        p.note_mutation(start);
        assert!(p.poll(start + Duration::from_millis(1500)).is_some());
        p.complete(SaveOutcome::Success, start + Duration::from_millis(1600));

        assert_eq!(p.state(), SaveState::Saved);
        p.poll(start + Duration::from_millis(1700));
        assert_eq!(p.state(), SaveState::Saved);
        p.poll(start + Duration::from_millis(3700));
        assert_eq!(p.state(), SaveState::Idle);
        assert!(!p.is_dirty());
    }

    #[test]
    fn failure_returns_to_idle_without_retry() {
        let start = Instant::now();
        let mut p = pipeline();
        p.note_mutation(start);
        assert!(p.poll(start + Duration::from_millis(1500)).is_some());
        p.complete(
            SaveOutcome::Failure("boom".into()),
            start + Duration::from_millis(1600),
        );

        assert_eq!(p.state(), SaveState::Idle);
        assert_eq!(p.status().last_error.as_deref(), Some("boom"));
        // no automatic retry, no matter how long we wait
        assert_eq!(p.poll(start + Duration::from_secs(60)), None);

        // a manual save re-attempts with the latest state
        p.request_manual_save(start + Duration::from_secs(61));
        assert_eq!(
            p.poll(start + Duration::from_secs(61)),
            Some(SaveReason::Manual)
        );
    }

    #[test]
    fn mutation_during_save_causes_one_follow_up() {
        let start = Instant::now();
        let mut p = pipeline();
        p.note_mutation(start);
        assert!(p.poll(start + Duration::from_millis(1500)).is_some());

        // the editor stays mutable while the save is in flight
        p.note_mutation(start + Duration::from_millis(1550));
        // single-flight: nothing new starts while saving
        assert_eq!(p.poll(start + Duration::from_secs(30)), None);

        p.complete(SaveOutcome::Success, start + Duration::from_millis(1700));
        // immediately due again with the latest state
        assert_eq!(
            p.poll(start + Duration::from_millis(1701)),
            Some(SaveReason::FollowUp)
        );
        p.complete(SaveOutcome::Success, start + Duration::from_millis(1800));
        assert_eq!(p.poll(start + Duration::from_millis(1801)), None);
    }

    #[test]
    fn manual_save_fires_even_when_clean() {
        let start = Instant::now();
        let mut p = pipeline();
        p.request_manual_save(start);
        assert_eq!(p.poll(start), Some(SaveReason::Manual));
    }
}
