//! Intermediate Representation (IR) for compiled event patterns.
//!
//! This module defines the immutable matcher tree produced by the compiler
//! and walked by the matcher. Field-level alternation (a list of value
//! matchers on one field) and group-level alternation (`$or`) are separate
//! node kinds.

use crate::matcher::wildcard::WildcardPattern;
use serde_json::Value;
use std::fmt;

/// Ordered sequence of key segments locating a value inside an event.
///
/// Segments are stored individually, so keys that themselves contain `.` are
/// preserved exactly. [`fmt::Display`] joins them with `.` for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// The empty path, naming the document root.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a dotted path such as `detail.containers.exitCode`.
    pub fn parse(dotted: &str) -> Self {
        if dotted.is_empty() {
            return Self::root();
        }
        Self::from_segments(dotted.split('.'))
    }

    /// A new path with `segment` appended.
    pub fn child(&self, segment: &str) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend(self.segments.iter().cloned());
        segments.push(segment.to_string());
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

/// Leaf-level operator applied to a single resolved value.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueMatcher {
    /// Deep equality with a scalar.
    Exact(Value),
    /// Any present value not deep-equal to the operand.
    AnythingBut(Value),
    /// String glob over `*`.
    Wildcard(WildcardPattern),
    /// String starting with the operand.
    Prefix(String),
    /// String ending with the operand.
    Suffix(String),
    /// Any present value.
    Exists,
}

impl ValueMatcher {
    /// Operator name as written in pattern documents.
    pub fn operator_name(&self) -> &'static str {
        match self {
            ValueMatcher::Exact(_) => "exact",
            ValueMatcher::AnythingBut(_) => "anything-but",
            ValueMatcher::Wildcard(_) => "wildcard",
            ValueMatcher::Prefix(_) => "prefix",
            ValueMatcher::Suffix(_) => "suffix",
            ValueMatcher::Exists => "exists",
        }
    }
}

/// A field path with its acceptable value matchers (OR among them).
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPattern {
    pub path: FieldPath,
    pub matchers: Vec<ValueMatcher>,
}

impl FieldPattern {
    pub fn new(path: FieldPath, matchers: Vec<ValueMatcher>) -> Self {
        Self { path, matchers }
    }
}

/// A `$or` group. `path` is the object level at which the group was declared.
#[derive(Debug, Clone, PartialEq)]
pub struct OrGroup {
    pub path: FieldPath,
    pub alternatives: Vec<PatternNode>,
}

/// Node of the compiled matcher tree.
#[derive(Debug, Clone, PartialEq)]
pub enum PatternNode {
    Field(FieldPattern),
    And(Vec<PatternNode>),
    Or(OrGroup),
}

impl PatternNode {
    /// Number of field patterns under this node.
    pub fn field_count(&self) -> usize {
        match self {
            PatternNode::Field(_) => 1,
            PatternNode::And(children) => children.iter().map(PatternNode::field_count).sum(),
            PatternNode::Or(group) => group
                .alternatives
                .iter()
                .map(PatternNode::field_count)
                .sum(),
        }
    }

    /// Number of `$or` groups under this node, including itself.
    pub fn or_group_count(&self) -> usize {
        match self {
            PatternNode::Field(_) => 0,
            PatternNode::And(children) => children.iter().map(PatternNode::or_group_count).sum(),
            PatternNode::Or(group) => {
                1 + group
                    .alternatives
                    .iter()
                    .map(PatternNode::or_group_count)
                    .sum::<usize>()
            }
        }
    }

    /// Height of the tree rooted at this node.
    pub fn depth(&self) -> usize {
        match self {
            PatternNode::Field(_) => 1,
            PatternNode::And(children) => {
                1 + children.iter().map(PatternNode::depth).max().unwrap_or(0)
            }
            PatternNode::Or(group) => {
                1 + group
                    .alternatives
                    .iter()
                    .map(PatternNode::depth)
                    .max()
                    .unwrap_or(0)
            }
        }
    }
}

/// A compiled, immutable event pattern.
///
/// Patterns are only produced by the compiler, so every `Pattern` in
/// existence is well formed. They hold no interior mutability and can be
/// shared across threads behind an `Arc` without synchronization.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    root: PatternNode,
}

impl Pattern {
    pub(crate) fn new(root: PatternNode) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &PatternNode {
        &self.root
    }

    pub fn field_count(&self) -> usize {
        self.root.field_count()
    }

    pub fn or_group_count(&self) -> usize {
        self.root.or_group_count()
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }
}
