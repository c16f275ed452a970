//! Event matcher for compiled patterns.
//!
//! Matching walks the compiled [`Pattern`] tree top-down against one event:
//!
//! - **And** evaluates children and stops at the first failure.
//! - **Or** evaluates alternatives in declared order and stops at the first
//!   success. The index of the winning alternative is recorded in the
//!   [`MatchVerdict`].
//! - **Field** resolves its path (see [`fields`]) and applies its value
//!   matchers with OR semantics (see [`values`]).
//!
//! Evaluation allocates only call-local state and never fails: every
//! compiled pattern is valid and every JSON value is a well-formed event.
//!
//! ## Example Usage
//!
//! ```rust
//! use event_pattern::{compile, matches};
//! use serde_json::json;
//!
//! let pattern = compile(&json!({"detail": {"lastStatus": ["STOPPED"]}}))?;
//! assert!(matches(&pattern, &json!({"detail": {"lastStatus": "STOPPED"}})));
//! assert!(!matches(&pattern, &json!({"detail": {}})));
//! # Ok::<(), event_pattern::CompileError>(())
//! ```

pub mod fields;
pub mod values;
pub mod wildcard;

pub use fields::{field_matches, resolve_values};
pub use values::{value_matches, values_equal};
pub use wildcard::WildcardPattern;

use crate::ir::{FieldPath, Pattern, PatternNode};
use serde_json::Value;
use std::fmt;

/// The `$or` alternative that satisfied its group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchHit {
    /// Object level at which the `$or` key was declared.
    pub group: FieldPath,
    /// Zero-based index of the first satisfied alternative.
    pub index: usize,
}

impl fmt::Display for BranchHit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_root() {
            write!(f, "$or[{}]", self.index)
        } else {
            write!(f, "{}.$or[{}]", self.group, self.index)
        }
    }
}

/// Outcome of evaluating one pattern against one event.
///
/// `branches` lists, outermost first, the `$or` alternatives that satisfied
/// their groups on the successful evaluation path. It is empty when the
/// pattern did not match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchVerdict {
    pub matched: bool,
    pub branches: Vec<BranchHit>,
}

impl MatchVerdict {
    pub fn no_match() -> Self {
        Self::default()
    }
}

/// Evaluate `pattern` against `event`.
pub fn matches(pattern: &Pattern, event: &Value) -> bool {
    node_matches(pattern.root(), event, None)
}

/// Evaluate `pattern` against `event`, recording which `$or` branches won.
pub fn evaluate(pattern: &Pattern, event: &Value) -> MatchVerdict {
    let mut branches = Vec::new();
    if node_matches(pattern.root(), event, Some(&mut branches)) {
        MatchVerdict {
            matched: true,
            branches,
        }
    } else {
        MatchVerdict::no_match()
    }
}

fn node_matches(node: &PatternNode, event: &Value, mut trace: Option<&mut Vec<BranchHit>>) -> bool {
    match node {
        PatternNode::Field(field) => field_matches(field, event),
        PatternNode::And(children) => {
            let mark = trace.as_deref().map_or(0, Vec::len);
            for child in children {
                if !node_matches(child, event, trace.as_deref_mut()) {
                    if let Some(hits) = trace.as_deref_mut() {
                        hits.truncate(mark);
                    }
                    return false;
                }
            }
            true
        }
        PatternNode::Or(group) => {
            let mark = trace.as_deref().map_or(0, Vec::len);
            for (index, alternative) in group.alternatives.iter().enumerate() {
                if node_matches(alternative, event, trace.as_deref_mut()) {
                    if let Some(hits) = trace.as_deref_mut() {
                        hits.insert(
                            mark,
                            BranchHit {
                                group: group.path.clone(),
                                index,
                            },
                        );
                    }
                    return true;
                }
                if let Some(hits) = trace.as_deref_mut() {
                    hits.truncate(mark);
                }
            }
            false
        }
    }
}

impl Pattern {
    /// Shorthand for [`matches`].
    pub fn matches(&self, event: &Value) -> bool {
        matches(self, event)
    }

    /// Shorthand for [`evaluate`].
    pub fn evaluate(&self, event: &Value) -> MatchVerdict {
        evaluate(self, event)
    }
}
