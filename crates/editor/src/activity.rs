//! Activity feed - an injectable, explicitly scoped log of review events
//!
//! The hosting view subscribes on mount and unsubscribes on unmount;
//! nothing here is a module-global. The feed keeps a bounded ring of
//! recent entries so a freshly mounted panel can backfill.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Kind of activity entry, for panel filtering and icons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Edit,
    Comment,
    Suggestion,
    Save,
    Template,
}

/// One activity entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    /// When it happened
    pub at: DateTime<Utc>,
    /// What kind of event it was
    pub kind: ActivityKind,
    /// Human-readable description
    pub message: String,
}

/// Handle returned by [`ActivityFeed::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriberId(u64);

type Subscriber = Box<dyn Fn(&ActivityEntry)>;

/// Bounded activity log with an explicit subscribe/unsubscribe
/// lifecycle.
pub struct ActivityFeed {
    capacity: usize,
    entries: VecDeque<ActivityEntry>,
    subscribers: Vec<(SubscriberId, Subscriber)>,
    next_id: u64,
}

impl ActivityFeed {
    /// Create a feed with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(200)
    }

    /// Create a feed keeping at most `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: VecDeque::new(),
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    /// Subscribe a live listener; called for every entry logged after
    /// this point.
    pub fn subscribe(&mut self, listener: impl Fn(&ActivityEntry) + 'static) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(listener)));
        id
    }

    /// Drop a listener. Returns whether it was subscribed.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Append an entry and notify listeners.
    pub fn log(&mut self, kind: ActivityKind, message: impl Into<String>) {
        let entry = ActivityEntry {
            at: Utc::now(),
            kind,
            message: message.into(),
        };
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry.clone());
        for (_, listener) in &self.subscribers {
            listener(&entry);
        }
    }

    /// Recent entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.entries.iter()
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the feed is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ActivityFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ActivityFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityFeed")
            .field("capacity", &self.capacity)
            .field("entries", &self.entries.len())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
