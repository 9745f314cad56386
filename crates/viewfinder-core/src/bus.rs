//! Synchronous in-process pub/sub with single-slot replay per topic.
//!
//! The bus decouples the pipeline from its embedder: the pipeline emits
//! lifecycle events, the embedder registers handlers. Everything is
//! synchronous and single-threaded — handlers run to completion inside
//! `emit` before it returns, in registration order.
//!
//! A handler that fails does not interrupt dispatch to its siblings; the
//! fault is reported on the dedicated [`Topic::Error`] channel.

use std::collections::HashMap;

use tracing::warn;

use crate::errors::{AcquireError, HandlerFault};

// ── Topics and events ─────────────────────────────────────────────────────────

/// Event channels emitted by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Acquisition begun successfully.
    StreamLoad,
    /// Acquisition failed; payload carries the failure kind.
    StreamLoadError,
    /// Render path committed and running.
    InitDone,
    /// Any other captured fault.
    Error,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StreamLoad => "streamLoad",
            Self::StreamLoadError => "streamLoadError",
            Self::InitDone => "initdone",
            Self::Error => "error",
        }
    }
}

/// An event value. Each variant belongs to exactly one topic.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    StreamLoad,
    StreamLoadError { error: AcquireError },
    InitDone,
    Error { message: String },
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Self::StreamLoad => Topic::StreamLoad,
            Self::StreamLoadError { .. } => Topic::StreamLoadError,
            Self::InitDone => Topic::InitDone,
            Self::Error { .. } => Topic::Error,
        }
    }
}

// ── EventBus ──────────────────────────────────────────────────────────────────

type Handler = Box<dyn FnMut(&Event) -> Result<(), HandlerFault>>;

/// Synchronous publish/subscribe channel with last-value replay.
///
/// Not `Send` — the bus lives on the pipeline's single thread of control,
/// like the rest of the pipeline's mutable state.
#[derive(Default)]
pub struct EventBus {
    handlers: HashMap<Topic, Vec<Handler>>,
    /// Single-slot replay cache: the most recent value emitted per topic.
    replay: HashMap<Topic, Event>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a topic. Handlers fire in registration order;
    /// duplicates are allowed. If a value was previously emitted on the topic
    /// and `skip_replay` is false, the new handler is invoked immediately and
    /// synchronously with the cached value, before `on` returns.
    pub fn on<F>(&mut self, topic: Topic, handler: F, skip_replay: bool)
    where
        F: FnMut(&Event) -> Result<(), HandlerFault> + 'static,
    {
        let mut handler: Handler = Box::new(handler);
        if !skip_replay {
            if let Some(cached) = self.replay.get(&topic).cloned() {
                if let Err(fault) = handler(&cached) {
                    self.report_fault(topic, fault);
                }
            }
        }
        self.handlers.entry(topic).or_default().push(handler);
    }

    /// Invoke every registered handler for the event's topic, in registration
    /// order, then overwrite the topic's replay slot with the new value.
    pub fn emit(&mut self, event: Event) {
        let topic = event.topic();
        let mut faults = Vec::new();
        if let Some(handlers) = self.handlers.get_mut(&topic) {
            for handler in handlers.iter_mut() {
                if let Err(fault) = handler(&event) {
                    faults.push(fault);
                }
            }
        }
        self.replay.insert(topic, event);
        for fault in faults {
            self.report_fault(topic, fault);
        }
    }

    /// Clear all handlers for a topic. Subsequent `emit`/`on` on the topic
    /// are ordinary operations, not failures; the replay cache survives.
    pub fn off(&mut self, topic: Topic) {
        self.handlers.remove(&topic);
    }

    /// Number of handlers currently registered for a topic.
    pub fn handler_count(&self, topic: Topic) -> usize {
        self.handlers.get(&topic).map_or(0, Vec::len)
    }

    /// The most recent value emitted on a topic, if any.
    pub fn replay_value(&self, topic: Topic) -> Option<&Event> {
        self.replay.get(&topic)
    }

    /// A faulting handler never takes down dispatch: the fault is logged and,
    /// unless it originated on the error channel itself, re-dispatched there.
    fn report_fault(&mut self, origin: Topic, fault: HandlerFault) {
        warn!(topic = origin.as_str(), "{fault}");
        if origin != Topic::Error {
            self.emit(Event::Error { message: fault.to_string() });
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("topics", &self.handlers.keys().collect::<Vec<_>>())
            .field("replay", &self.replay.keys().collect::<Vec<_>>())
            .finish()
    }
}
