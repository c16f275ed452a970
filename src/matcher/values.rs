//! Leaf operator semantics.
//!
//! Each [`ValueMatcher`] is applied to one value that is known to be present
//! in the event. Absence is handled by path resolution before any operator
//! runs, so nothing here can ever match a missing field.

use crate::ir::ValueMatcher;
use serde_json::{Number, Value};

/// Apply a single leaf operator to a present value.
pub fn value_matches(matcher: &ValueMatcher, value: &Value) -> bool {
    match matcher {
        ValueMatcher::Exact(expected) => values_equal(expected, value),
        ValueMatcher::AnythingBut(excluded) => !values_equal(excluded, value),
        ValueMatcher::Wildcard(pattern) => value.as_str().is_some_and(|s| pattern.matches(s)),
        ValueMatcher::Prefix(prefix) => value
            .as_str()
            .is_some_and(|s| s.starts_with(prefix.as_str())),
        ValueMatcher::Suffix(suffix) => value
            .as_str()
            .is_some_and(|s| s.ends_with(suffix.as_str())),
        ValueMatcher::Exists => true,
    }
}

/// Field-level alternation: true if any matcher accepts the value.
pub fn any_matches(matchers: &[ValueMatcher], value: &Value) -> bool {
    matchers.iter().any(|matcher| value_matches(matcher, value))
}

/// Deep structural equality with exact numeric comparison.
///
/// Unlike `Value`'s `PartialEq`, integers and floats with the same
/// mathematical value compare equal (`1 == 1.0`). There is no tolerance.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(key, x)| ys.get(key).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

fn numbers_equal(x: &Number, y: &Number) -> bool {
    match (x.as_f64(), y.as_f64()) {
        (Some(a), Some(b)) if x.is_f64() && y.is_f64() => a == b,
        (Some(a), _) if x.is_f64() => integer_equals_float(y, a),
        (_, Some(b)) if y.is_f64() => integer_equals_float(x, b),
        _ => match (x.as_i64(), y.as_i64()) {
            (Some(a), Some(b)) => a == b,
            // A negative i64 never equals a u64 above i64::MAX.
            _ => matches!((x.as_u64(), y.as_u64()), (Some(a), Some(b)) if a == b),
        },
    }
}

/// Compares an integer with a float without rounding the integer through
/// `f64`. The float must be integral and inside the integer's range.
fn integer_equals_float(integer: &Number, float: f64) -> bool {
    // 2^63 and 2^64; both are exact in f64.
    const I64_END: f64 = 9_223_372_036_854_775_808.0;
    const U64_END: f64 = 18_446_744_073_709_551_616.0;

    if !float.is_finite() || float.fract() != 0.0 {
        return false;
    }
    if let Some(value) = integer.as_i64() {
        (-I64_END..I64_END).contains(&float) && float as i64 == value
    } else if let Some(value) = integer.as_u64() {
        (0.0..U64_END).contains(&float) && float as u64 == value
    } else {
        false
    }
}
