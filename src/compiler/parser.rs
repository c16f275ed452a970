//! Leaf parsing for pattern documents.
//!
//! A leaf is a scalar (implicit exact match), a single-key operator object,
//! or a sequence of those (field-level OR). This module turns a leaf into the
//! list of [`ValueMatcher`]s attached to one field path and validates
//! operator names and operand types.

use crate::config::CompilerConfig;
use crate::error::{CompileError, CompileErrorKind};
use crate::ir::{FieldPath, ValueMatcher};
use crate::matcher::wildcard::WildcardPattern;
use serde_json::{Map, Value};

/// Key introducing a group-level OR of sibling sub-documents.
pub const OR_KEY: &str = "$or";

pub const ANYTHING_BUT: &str = "anything-but";
pub const WILDCARD: &str = "wildcard";
pub const PREFIX: &str = "prefix";
pub const SUFFIX: &str = "suffix";
pub const EXISTS: &str = "exists";

/// Every operator key accepted inside a leaf.
pub const OPERATORS: [&str; 5] = [ANYTHING_BUT, WILDCARD, PREFIX, SUFFIX, EXISTS];

/// True for a mapping that uses any operator key.
///
/// Outside of value lists this is what distinguishes
/// `{"stoppedReason": {"wildcard": "*Error:*"}}` from a nested field. A
/// mapping mixing an operator with other keys is still an operator leaf, so
/// [`parse_operator`] rejects it instead of it compiling as nested fields.
pub fn has_operator_key(map: &Map<String, Value>) -> bool {
    map.keys().any(|key| OPERATORS.contains(&key.as_str()))
}

/// Parse the leaf found at `path` into its value matchers.
pub fn parse_leaf(
    value: &Value,
    path: &FieldPath,
    config: &CompilerConfig,
) -> Result<Vec<ValueMatcher>, CompileError> {
    match value {
        Value::Array(items) => {
            if items.is_empty() {
                return Err(CompileError::new(
                    CompileErrorKind::EmptyValueList,
                    path.clone(),
                ));
            }
            items
                .iter()
                .map(|item| parse_alternative(item, path, config))
                .collect()
        }
        _ => Ok(vec![parse_alternative(value, path, config)?]),
    }
}

fn parse_alternative(
    value: &Value,
    path: &FieldPath,
    config: &CompilerConfig,
) -> Result<ValueMatcher, CompileError> {
    match value {
        Value::Array(_) => Err(CompileError::new(
            CompileErrorKind::NestedValueList,
            path.clone(),
        )),
        Value::Object(map) => parse_operator(map, path, config),
        scalar => Ok(ValueMatcher::Exact(scalar.clone())),
    }
}

/// Parse a single-key operator object such as `{"anything-but": 0}`.
pub fn parse_operator(
    map: &Map<String, Value>,
    path: &FieldPath,
    config: &CompilerConfig,
) -> Result<ValueMatcher, CompileError> {
    let fail = |kind| CompileError::new(kind, path.clone());

    if map.len() != 1 {
        return Err(fail(CompileErrorKind::OperatorArity(map.len())));
    }
    let Some((name, operand)) = map.iter().next() else {
        return Err(fail(CompileErrorKind::OperatorArity(0)));
    };

    let invalid = |operator, expected| {
        fail(CompileErrorKind::InvalidOperand { operator, expected })
    };

    match name.as_str() {
        ANYTHING_BUT if is_scalar(operand) => Ok(ValueMatcher::AnythingBut(operand.clone())),
        ANYTHING_BUT => Err(invalid(ANYTHING_BUT, "a scalar")),
        WILDCARD => match operand {
            Value::String(raw) => WildcardPattern::parse(raw, config.allow_multi_wildcard)
                .map(ValueMatcher::Wildcard)
                .map_err(fail),
            _ => Err(invalid(WILDCARD, "a string")),
        },
        PREFIX => match operand {
            Value::String(prefix) => Ok(ValueMatcher::Prefix(prefix.clone())),
            _ => Err(invalid(PREFIX, "a string")),
        },
        SUFFIX => match operand {
            Value::String(suffix) => Ok(ValueMatcher::Suffix(suffix.clone())),
            _ => Err(invalid(SUFFIX, "a string")),
        },
        EXISTS => match operand {
            Value::Bool(true) => Ok(ValueMatcher::Exists),
            _ => Err(invalid(EXISTS, "true")),
        },
        unknown => Err(fail(CompileErrorKind::UnknownOperator(unknown.to_string()))),
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}
