//! Delivery boundary for matched events.
//!
//! The router calls an [`EventSink`] once per (rule, event) match. Sinks own
//! their delivery semantics; the router neither retries nor buffers.

use crate::engine::RuleMatch;
use serde_json::Value;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;
use tracing::info;

/// A sink refused or failed to accept an event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("delivery to '{sink}' failed: {message}")]
pub struct SinkError {
    pub sink: String,
    pub message: String,
}

impl SinkError {
    pub fn new(sink: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            sink: sink.into(),
            message: message.into(),
        }
    }
}

/// Receiver of events that matched a rule.
pub trait EventSink: Send + Sync {
    fn deliver(&self, rule_match: &RuleMatch, event: &Value) -> Result<(), SinkError>;
}

/// One recorded delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub rule: String,
    pub event: Value,
}

/// Sink that keeps every delivery in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    deliveries: Mutex<Vec<Delivery>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Remove and return everything delivered so far.
    pub fn drain(&self) -> Vec<Delivery> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Delivery>> {
        self.deliveries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl EventSink for MemorySink {
    fn deliver(&self, rule_match: &RuleMatch, event: &Value) -> Result<(), SinkError> {
        self.lock().push(Delivery {
            rule: rule_match.rule.clone(),
            event: event.clone(),
        });
        Ok(())
    }
}

/// Sink that writes each matched event to a named log destination through
/// `tracing`.
#[derive(Debug, Clone)]
pub struct LogSink {
    destination: String,
}

impl LogSink {
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
        }
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }
}

impl EventSink for LogSink {
    fn deliver(&self, rule_match: &RuleMatch, event: &Value) -> Result<(), SinkError> {
        let branches: Vec<String> = rule_match.branches.iter().map(ToString::to_string).collect();
        info!(
            destination = %self.destination,
            rule = %rule_match.rule,
            branches = ?branches,
            event = %event,
            "matched event"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rule_match(rule: &str) -> RuleMatch {
        RuleMatch {
            rule: rule.to_string(),
            branches: Vec::new(),
        }
    }

    #[test]
    fn test_memory_sink_records_and_drains() {
        let sink = MemorySink::new();
        assert!(sink.is_empty());

        sink.deliver(&rule_match("a"), &json!({"id": 1})).unwrap();
        sink.deliver(&rule_match("b"), &json!({"id": 2})).unwrap();
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.deliveries()[1].event, json!({"id": 2}));

        let drained = sink.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].rule, "a");
        assert!(sink.is_empty());
    }

    #[test]
    fn test_log_sink_accepts_events() {
        let sink = LogSink::new("/aws/events/ecs/errored-tasks");
        assert_eq!(sink.destination(), "/aws/events/ecs/errored-tasks");
        assert!(sink.deliver(&rule_match("a"), &json!({})).is_ok());
    }

    #[test]
    fn test_sink_error_display() {
        let error = SinkError::new("queue", "full");
        assert_eq!(error.to_string(), "delivery to 'queue' failed: full");
    }

    #[test]
    fn test_sinks_are_object_safe() {
        let sinks: Vec<Box<dyn EventSink>> =
            vec![Box::new(MemorySink::new()), Box::new(LogSink::new("logs"))];
        for sink in &sinks {
            assert!(sink.deliver(&rule_match("a"), &json!(null)).is_ok());
        }
    }
}
