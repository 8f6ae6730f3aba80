//! Editor event bus - explicit observer registration
//!
//! What the source editor framework did with plugin command listeners is
//! done here with named handlers subscribed to a small event vocabulary.
//! Dispatch is synchronous, in subscription order; handlers communicate
//! by message, not inheritance.

use doc_model::SelectionData;
use pipeline::SaveState;

/// Events published by the editor session.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// A mutation was committed; carries the new document version
    DocumentMutated { version: u64 },
    /// The user's selection changed (`None` = selection left the editor)
    SelectionChanged { selection: Option<SelectionData> },
    /// A key was pressed in the editor view
    KeyPressed { key: String },
    /// The save pipeline changed display state
    SaveStateChanged { state: SaveState },
}

/// Handle returned by [`EventBus::subscribe`]; used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerId(u64);

type Handler = Box<dyn Fn(&EditorEvent)>;

/// Observer registry for editor events.
///
/// Handlers are named so diagnostics can say which one is subscribed;
/// the name carries no dispatch semantics.
#[derive(Default)]
pub struct EventBus {
    handlers: Vec<(HandlerId, String, Handler)>,
    next_id: u64,
}

impl EventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named handler; returns its ID for unsubscribing.
    pub fn subscribe(
        &mut self,
        name: impl Into<String>,
        handler: impl Fn(&EditorEvent) + 'static,
    ) -> HandlerId {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, name.into(), Box::new(handler)));
        id
    }

    /// Remove a handler. Returns whether it was subscribed.
    pub fn unsubscribe(&mut self, id: HandlerId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(hid, _, _)| *hid != id);
        self.handlers.len() != before
    }

    /// Number of live handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Dispatch an event to every handler, in subscription order.
    pub fn publish(&self, event: &EditorEvent) {
        for (_, _, handler) in &self.handlers {
            handler(event);
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.handlers.iter().map(|(_, n, _)| n.as_str()).collect();
        f.debug_struct("EventBus").field("handlers", &names).finish()
    }
}
