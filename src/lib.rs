//! # Event Pattern Engine
//!
//! A Rust library for compiling declarative JSON event patterns and matching
//! them against structured events, for routing lifecycle notifications (such
//! as container task state changes) to downstream sinks.
//!
//! The core is two pure functions:
//!
//! - [`compile`] validates a pattern document and builds an immutable
//!   [`Pattern`] tree;
//! - [`matches`] evaluates a compiled pattern against one event and always
//!   returns a boolean.
//!
//! Around it, [`RuleRegistry`] and [`EventRouter`] manage named rules and
//! hand matching events to an [`EventSink`].
//!
//! ## Quick Start
//!
//! ```rust
//! use event_pattern::{compile, matches};
//! use serde_json::json;
//!
//! let pattern = compile(&json!({
//!     "detail": {
//!         "lastStatus": ["STOPPED"],
//!         "$or": [
//!             {"stopCode": ["TaskFailedToStart"]},
//!             {"stoppedReason": [{"wildcard": "*Error:*"}]}
//!         ]
//!     }
//! }))?;
//!
//! let failed = json!({"detail": {"lastStatus": "STOPPED", "stopCode": "TaskFailedToStart"}});
//! let running = json!({"detail": {"lastStatus": "RUNNING", "stopCode": "TaskFailedToStart"}});
//! assert!(matches(&pattern, &failed));
//! assert!(!matches(&pattern, &running));
//! # Ok::<(), event_pattern::CompileError>(())
//! ```
//!
//! ## Pattern Dialect
//!
//! | Form | Meaning |
//! |------|---------|
//! | `"field": "v"` | exact match |
//! | `"field": ["a", "b"]` | matches any listed alternative |
//! | `{"anything-but": v}` | present and not equal to `v` |
//! | `{"wildcard": "*Error:*"}` | string glob over `*` |
//! | `{"prefix": "s"}` / `{"suffix": "s"}` | string prefix / suffix |
//! | `{"exists": true}` | field is present |
//! | `"$or": [{..}, {..}]` | any sub-document matches |
//!
//! A field path that crosses an array in the event matches if any element
//! matches. An absent field never matches, whatever the operator.
//!
//! ## Diagnosable Verdicts
//!
//! ```rust
//! use event_pattern::compile;
//! use serde_json::json;
//!
//! let pattern = compile(&json!({
//!     "$or": [{"stopCode": ["EssentialContainerExited"]}, {"stopCode": ["TaskFailedToStart"]}]
//! }))?;
//! let verdict = pattern.evaluate(&json!({"stopCode": "TaskFailedToStart"}));
//! assert!(verdict.matched);
//! assert_eq!(verdict.branches[0].to_string(), "$or[1]");
//! # Ok::<(), event_pattern::CompileError>(())
//! ```

pub mod compiler;
pub mod config;
pub mod engine;
pub mod error;
pub mod ir;
pub mod matcher;
pub mod sink;

// Compile and match
pub use compiler::{compile, Compiler};
pub use matcher::{evaluate, matches, BranchHit, MatchVerdict};

// Configuration
pub use config::{CompilerConfig, EngineConfig, ParallelConfig};

// Core types and errors
pub use error::{CompileError, CompileErrorKind, EngineError, Result};
pub use ir::{FieldPath, FieldPattern, OrGroup, Pattern, PatternNode, ValueMatcher};

// Rule management and delivery
pub use engine::{
    read_rule_file, DispatchReport, EventRouter, Rule, RuleDefinition, RuleMatch, RuleRegistry,
};
pub use sink::{Delivery, EventSink, LogSink, MemorySink, SinkError};
