//! Pattern compiler.
//!
//! This module turns a declarative pattern document into an immutable
//! [`Pattern`] tree. All validation happens here, so a compiled pattern can
//! always be evaluated without error.
//!
//! Document shape:
//! - nested mappings build field paths (`{"detail": {"lastStatus": ..}}` is
//!   the path `detail.lastStatus`);
//! - sibling keys at one level are combined with AND;
//! - a leaf is a scalar, a single-key operator object or a list of those
//!   (field-level OR), see [`parser`];
//! - the `$or` key holds a list of sub-documents evaluated relative to the
//!   level it appears at (group-level OR).
//!
//! Compilation is all-or-nothing: either the whole document is valid or a
//! [`CompileError`] naming the offending path is returned.
//!
//! # Examples
//!
//! ```rust
//! use event_pattern::Compiler;
//! use serde_json::json;
//!
//! let compiler = Compiler::new();
//! let pattern = compiler.compile(&json!({
//!     "source": ["aws.ecs"],
//!     "detail": {
//!         "lastStatus": ["STOPPED"],
//!         "$or": [
//!             {"stopCode": ["TaskFailedToStart"]},
//!             {"stoppedReason": [{"wildcard": "*Error:*"}]}
//!         ]
//!     }
//! }))?;
//! assert_eq!(pattern.field_count(), 4);
//! assert_eq!(pattern.or_group_count(), 1);
//! # Ok::<(), event_pattern::CompileError>(())
//! ```

pub mod parser;

use crate::config::CompilerConfig;
use crate::error::{CompileError, CompileErrorKind};
use crate::ir::{FieldPath, FieldPattern, OrGroup, Pattern, PatternNode};
use parser::{has_operator_key, parse_leaf, OR_KEY};
use serde_json::{Map, Value};
use tracing::debug;

/// The pattern compiler.
///
/// Holds only configuration. Compiling is a pure function of the document,
/// so one compiler can be shared freely and compiling the same document
/// twice yields equal patterns.
///
/// # Examples
///
/// ```rust
/// use event_pattern::{Compiler, CompilerConfig};
///
/// let compiler = Compiler::with_config(CompilerConfig::strict());
/// assert!(!compiler.config().allow_multi_wildcard);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    config: CompilerConfig,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CompilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile a pattern document.
    ///
    /// # Errors
    /// Returns a [`CompileError`] if:
    /// - the document or an `$or` alternative is not a non-empty mapping
    /// - an operator is unknown, has extra keys or a mistyped operand
    /// - a value list or `$or` group is empty
    /// - nesting exceeds [`CompilerConfig::max_depth`]
    pub fn compile(&self, document: &Value) -> Result<Pattern, CompileError> {
        let map = document
            .as_object()
            .ok_or_else(|| CompileError::new(CompileErrorKind::NotAnObject, FieldPath::root()))?;

        let children = self.compile_object(map, &FieldPath::root(), 1)?;
        let pattern = Pattern::new(PatternNode::And(children));

        debug!(
            fields = pattern.field_count(),
            or_groups = pattern.or_group_count(),
            depth = pattern.depth(),
            "compiled pattern"
        );
        Ok(pattern)
    }

    /// Parse `text` as JSON and compile it.
    pub fn compile_str(&self, text: &str) -> crate::Result<Pattern> {
        let document: Value = serde_json::from_str(text)?;
        Ok(self.compile(&document)?)
    }

    /// Parse `text` as YAML and compile it.
    pub fn compile_yaml(&self, text: &str) -> crate::Result<Pattern> {
        let document: Value = serde_yaml::from_str(text)?;
        Ok(self.compile(&document)?)
    }

    fn compile_object(
        &self,
        map: &Map<String, Value>,
        prefix: &FieldPath,
        depth: usize,
    ) -> Result<Vec<PatternNode>, CompileError> {
        if depth > self.config.max_depth {
            return Err(CompileError::new(
                CompileErrorKind::TooDeep(self.config.max_depth),
                prefix.clone(),
            ));
        }
        if map.is_empty() {
            return Err(CompileError::new(
                CompileErrorKind::EmptyObject,
                prefix.clone(),
            ));
        }

        let mut nodes = Vec::with_capacity(map.len());
        for (key, value) in map {
            if key == OR_KEY {
                nodes.push(self.compile_or_group(value, prefix, depth)?);
                continue;
            }

            let path = prefix.child(key);
            match value {
                Value::Object(inner) if !has_operator_key(inner) => {
                    nodes.extend(self.compile_object(inner, &path, depth + 1)?);
                }
                leaf => {
                    let matchers = parse_leaf(leaf, &path, &self.config)?;
                    nodes.push(PatternNode::Field(FieldPattern::new(path, matchers)));
                }
            }
        }
        Ok(nodes)
    }

    fn compile_or_group(
        &self,
        value: &Value,
        prefix: &FieldPath,
        depth: usize,
    ) -> Result<PatternNode, CompileError> {
        let group_path = prefix.child(OR_KEY);
        let alternatives = value.as_array().ok_or_else(|| {
            CompileError::new(CompileErrorKind::InvalidOrGroup, group_path.clone())
        })?;
        if alternatives.is_empty() {
            return Err(CompileError::new(
                CompileErrorKind::EmptyOrGroup,
                group_path,
            ));
        }

        let mut compiled = Vec::with_capacity(alternatives.len());
        for alternative in alternatives {
            let map = alternative.as_object().ok_or_else(|| {
                CompileError::new(CompileErrorKind::NotAnObject, group_path.clone())
            })?;
            let mut children = self.compile_object(map, prefix, depth + 1)?;
            compiled.push(if children.len() == 1 {
                children.remove(0)
            } else {
                PatternNode::And(children)
            });
        }

        Ok(PatternNode::Or(OrGroup {
            path: prefix.clone(),
            alternatives: compiled,
        }))
    }
}

/// Compile a pattern document with the default configuration.
pub fn compile(document: &Value) -> Result<Pattern, CompileError> {
    Compiler::new().compile(document)
}
