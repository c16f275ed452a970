//! Field path resolution with existential array semantics.
//!
//! Paths are resolved segment by segment from the event root. When an array
//! is met with segments still remaining, each element becomes the root for
//! the rest of the path and the field matches if any element does. A
//! terminal array is treated the same way: the value matchers are applied to
//! each element. Missing keys, scalars in the middle of a path and empty
//! arrays all resolve to nothing, and nothing matches nothing.

use crate::ir::{FieldPattern, ValueMatcher};
use crate::matcher::values::any_matches;
use serde_json::Value;

/// Evaluate a field pattern against an event.
pub fn field_matches(field: &FieldPattern, event: &Value) -> bool {
    resolve_and_match(event, field.path.segments(), &field.matchers)
}

fn resolve_and_match(value: &Value, segments: &[String], matchers: &[ValueMatcher]) -> bool {
    match segments.split_first() {
        None => terminal_matches(value, matchers),
        Some((head, rest)) => match value {
            Value::Object(map) => map
                .get(head.as_str())
                .is_some_and(|child| resolve_and_match(child, rest, matchers)),
            Value::Array(items) => items
                .iter()
                .any(|item| resolve_and_match(item, segments, matchers)),
            _ => false,
        },
    }
}

fn terminal_matches(value: &Value, matchers: &[ValueMatcher]) -> bool {
    match value {
        Value::Array(items) => items.iter().any(|item| terminal_matches(item, matchers)),
        _ => any_matches(matchers, value),
    }
}

/// Collect every value the path resolves to, fanning out across arrays.
///
/// Used for diagnostics. Terminal arrays are flattened into their elements.
pub fn resolve_values<'a>(event: &'a Value, segments: &[String]) -> Vec<&'a Value> {
    let mut found = Vec::new();
    collect(event, segments, &mut found);
    found
}

fn collect<'a>(value: &'a Value, segments: &[String], found: &mut Vec<&'a Value>) {
    match (segments.split_first(), value) {
        (None, Value::Array(items)) => {
            for item in items {
                collect(item, segments, found);
            }
        }
        (None, _) => found.push(value),
        (Some((head, rest)), Value::Object(map)) => {
            if let Some(child) = map.get(head.as_str()) {
                collect(child, rest, found);
            }
        }
        (Some(_), Value::Array(items)) => {
            for item in items {
                collect(item, segments, found);
            }
        }
        (Some(_), _) => {}
    }
}
