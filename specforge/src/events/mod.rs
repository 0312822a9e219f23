//! Event sink for pipeline observability.
//!
//! Executors and stages emit structured lifecycle events through an
//! [`EventSink`] passed in explicitly at construction time. Silent
//! degradations (extraction falling back to defaults) surface here and
//! nowhere else.

use std::fmt::Debug;

/// Receives structured pipeline events.
///
/// Implementations must never panic; emission is fire-and-forget from the
/// executor's point of view.
pub trait EventSink: Send + Sync + Debug {
    /// Emits an event with an optional JSON payload.
    fn try_emit(&self, event: &str, payload: Option<serde_json::Value>);
}

/// An event sink that logs through `tracing` at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingEventSink;

impl EventSink for LoggingEventSink {
    fn try_emit(&self, event: &str, payload: Option<serde_json::Value>) {
        match payload {
            Some(payload) => tracing::debug!(event, %payload, "pipeline event"),
            None => tracing::debug!(event, "pipeline event"),
        }
    }
}

/// An event sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

impl EventSink for NoOpEventSink {
    fn try_emit(&self, _event: &str, _payload: Option<serde_json::Value>) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_sink_accepts_any_event() {
        let sink = NoOpEventSink;
        sink.try_emit("stage.started", None);
        sink.try_emit("stage.completed", Some(serde_json::json!({"stage": "x"})));
    }

    #[test]
    fn logging_sink_does_not_panic() {
        let sink = LoggingEventSink;
        sink.try_emit("extraction.recovered", Some(serde_json::json!({"stage": "intent"})));
    }
}
