//! Glob matching for `wildcard` operands.
//!
//! A wildcard operand is split on `*` into literal segments at compile time.
//! The first segment must be a prefix of the value and the last a suffix, and
//! the two may not overlap. Any segments in between must appear in order in
//! the remaining middle part. A wildcarded gap may be empty.

use crate::error::CompileErrorKind;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WildcardPattern {
    raw: String,
    /// Literal text between stars; always `star_count + 1` entries.
    segments: Vec<String>,
}

impl WildcardPattern {
    /// Split `raw` into literal segments.
    ///
    /// Consecutive stars are always rejected. More than one star is rejected
    /// unless `allow_multi` is set.
    pub fn parse(raw: &str, allow_multi: bool) -> Result<Self, CompileErrorKind> {
        if raw.contains("**") {
            return Err(CompileErrorKind::ConsecutiveWildcards);
        }

        let stars = raw.matches('*').count();
        if stars > 1 && !allow_multi {
            return Err(CompileErrorKind::TooManyWildcards(stars));
        }

        Ok(Self {
            raw: raw.to_string(),
            segments: raw.split('*').map(str::to_string).collect(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn star_count(&self) -> usize {
        self.segments.len() - 1
    }

    /// True when the operand has no `*` and matching is plain equality.
    pub fn is_literal(&self) -> bool {
        self.segments.len() == 1
    }

    pub fn matches(&self, text: &str) -> bool {
        let [first, middle @ .., last] = self.segments.as_slice() else {
            return text == self.raw;
        };
        if text.len() < first.len() + last.len()
            || !text.starts_with(first.as_str())
            || !text.ends_with(last.as_str())
        {
            return false;
        }

        let mut rest = &text[first.len()..text.len() - last.len()];
        for segment in middle {
            match rest.find(segment.as_str()) {
                Some(pos) => rest = &rest[pos + segment.len()..],
                None => return false,
            }
        }
        true
    }
}

impl fmt::Display for WildcardPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
