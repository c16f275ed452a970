//! Integration tests for the pattern compiler.
//!
//! These tests verify that real rule files compile into the expected tree
//! and that malformed documents are rejected with the offending path.

use event_pattern::{
    compile, read_rule_file, CompileErrorKind, Compiler, CompilerConfig, PatternNode,
    ValueMatcher,
};
use serde_json::json;
use std::path::Path;

#[test]
fn test_compile_errored_tasks_rule() {
    let definition = read_rule_file(Path::new("tests/rules/ecs_errored_tasks.json"))
        .expect("Failed to read ecs_errored_tasks.json");
    assert_eq!(definition.name, "ecs-errored-tasks");
    assert!(definition.enabled);

    let pattern = compile(&definition.pattern);
    assert!(
        pattern.is_ok(),
        "Failed to compile errored tasks rule: {:?}",
        pattern.err()
    );
    let pattern = pattern.unwrap();

    // source, detail-type, desiredStatus, lastStatus, plus four fields in $or
    assert_eq!(pattern.field_count(), 8);
    assert_eq!(pattern.or_group_count(), 1);

    let PatternNode::And(children) = pattern.root() else {
        panic!("Expected And root");
    };
    let group = children
        .iter()
        .find_map(|child| match child {
            PatternNode::Or(group) => Some(group),
            _ => None,
        })
        .expect("Expected an $or group");
    assert_eq!(group.path.to_string(), "detail");
    assert_eq!(group.alternatives.len(), 3);
}

#[test]
fn test_compile_yaml_rule() {
    let definition = read_rule_file(Path::new("tests/rules/ecs_deprovisioning.yml"))
        .expect("Failed to read ecs_deprovisioning.yml");
    let pattern = compile(&definition.pattern).expect("Failed to compile YAML rule");

    let PatternNode::And(children) = pattern.root() else {
        panic!("Expected And root");
    };
    let operators: Vec<&str> = children
        .iter()
        .filter_map(|child| match child {
            PatternNode::Field(field) => Some(field.matchers[0].operator_name()),
            _ => None,
        })
        .collect();
    assert!(operators.contains(&"prefix"));
    assert!(operators.contains(&"suffix"));
    assert!(operators.contains(&"exact"));
}

#[test]
fn test_value_list_compiles_to_field_level_alternation() {
    let pattern = compile(&json!({"detail": {"lastStatus": ["STOPPED", "DEPROVISIONING"]}})).unwrap();
    let PatternNode::And(children) = pattern.root() else {
        panic!("Expected And root");
    };
    match children.as_slice() {
        [PatternNode::Field(field)] => assert_eq!(
            field.matchers,
            vec![
                ValueMatcher::Exact(json!("STOPPED")),
                ValueMatcher::Exact(json!("DEPROVISIONING")),
            ]
        ),
        other => panic!("Expected a single field, got {other:?}"),
    }
    assert_eq!(pattern.or_group_count(), 0);
}

#[test]
fn test_empty_or_group_yields_no_pattern() {
    let result = compile(&json!({"detail": {"lastStatus": ["STOPPED"], "$or": []}}));
    let error = result.expect_err("Empty $or must not compile");
    assert_eq!(error.kind, CompileErrorKind::EmptyOrGroup);
    assert_eq!(error.path.to_string(), "detail.$or");
}

#[test]
fn test_rejections_name_the_field() {
    let cases = [
        (
            json!({"detail": {"exitCode": [{"anything-but": [0]}]}}),
            "detail.exitCode",
        ),
        (json!({"detail": {"reason": [{"wildcard": 1}]}}), "detail.reason"),
        (json!({"detail": {"reason": [{"regex": ".*"}]}}), "detail.reason"),
        (json!({"detail": {"reason": []}}), "detail.reason"),
        (
            json!({"detail": {"reason": [{"prefix": "a", "suffix": "b"}]}}),
            "detail.reason",
        ),
    ];
    for (document, path) in cases {
        let error = compile(&document).expect_err("Document should be rejected");
        assert_eq!(error.path.to_string(), path, "for {document}");
    }
}

#[test]
fn test_strict_config_limits_wildcards() {
    let document = json!({"detail": {"stoppedReason": [{"wildcard": "*Error:*"}]}});
    assert!(compile(&document).is_ok());

    let strict = Compiler::with_config(CompilerConfig::strict());
    let error = strict.compile(&document).unwrap_err();
    assert_eq!(error.kind, CompileErrorKind::TooManyWildcards(2));
    assert!(strict
        .compile(&json!({"detail": {"stoppedReason": [{"wildcard": "Cannot*"}]}}))
        .is_ok());
}

#[test]
fn test_compile_twice_gives_identical_verdicts() {
    let definition = read_rule_file(Path::new("tests/rules/ecs_errored_tasks.json")).unwrap();
    let first = compile(&definition.pattern).unwrap();
    let second = compile(&definition.pattern).unwrap();
    assert_eq!(first, second);

    for name in [
        "task_failed_to_start",
        "essential_container_exited",
        "clean_shutdown",
        "scaling_stop",
    ] {
        let text = std::fs::read_to_string(format!("tests/events/{name}.json")).unwrap();
        let event: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(first.evaluate(&event), second.evaluate(&event), "event {name}");
    }
}
