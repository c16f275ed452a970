//! Error types for the event pattern crate.
//!
//! Compilation is the only fallible step of the engine: [`CompileError`]
//! describes why a pattern document was rejected and where. Matching a
//! compiled pattern never fails. [`EngineError`] covers the surrounding rule
//! management layer (document parsing, rule files, registry lookups).

use crate::ir::FieldPath;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

/// The specific constraint a pattern document violated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileErrorKind {
    #[error("expected a mapping")]
    NotAnObject,
    #[error("mapping has no field constraints")]
    EmptyObject,
    #[error("'$or' must be a sequence of sub-documents")]
    InvalidOrGroup,
    #[error("'$or' group has no alternatives")]
    EmptyOrGroup,
    #[error("value list is empty")]
    EmptyValueList,
    #[error("value lists cannot be nested")]
    NestedValueList,
    #[error("unknown operator '{0}'")]
    UnknownOperator(String),
    #[error("operator object must have exactly one key, found {0}")]
    OperatorArity(usize),
    #[error("operator '{operator}' expects {expected}")]
    InvalidOperand {
        operator: &'static str,
        expected: &'static str,
    },
    #[error("wildcard operand has {0} '*' characters, at most one is allowed")]
    TooManyWildcards(usize),
    #[error("wildcard operand contains consecutive '*' characters")]
    ConsecutiveWildcards,
    #[error("pattern nesting exceeds maximum depth of {0}")]
    TooDeep(usize),
}

/// A rejected pattern document.
///
/// `path` is the dotted field path at which the violation was found. It is
/// empty when the problem is the document root itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at '{path}'")]
pub struct CompileError {
    pub kind: CompileErrorKind,
    pub path: FieldPath,
}

impl CompileError {
    pub fn new(kind: CompileErrorKind, path: FieldPath) -> Self {
        Self { kind, path }
    }
}

/// Errors raised by the rule registry, router and document loaders.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("rule '{rule}' has an invalid pattern: {source}")]
    Compile {
        rule: String,
        #[source]
        source: CompileError,
    },
    #[error("invalid pattern: {0}")]
    Pattern(#[from] CompileError),
    #[error("invalid document: {0}")]
    InvalidDocument(String),
    #[error("rule '{0}' not found")]
    RuleNotFound(String),
    #[error("rule '{0}' already exists")]
    DuplicateRule(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::InvalidDocument(format!("JSON: {err}"))
    }
}

impl From<serde_yaml::Error> for EngineError {
    fn from(err: serde_yaml::Error) -> Self {
        EngineError::InvalidDocument(format!("YAML: {err}"))
    }
}
