//! End-to-end tests: rule files through the registry and router to a sink.

use event_pattern::{
    compile, matches, EngineError, EventRouter, LogSink, MemorySink, RuleDefinition,
    RuleRegistry,
};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

fn load_event(name: &str) -> Value {
    let text = fs::read_to_string(format!("tests/events/{name}.json"))
        .unwrap_or_else(|e| panic!("Failed to read event {name}: {e}"));
    serde_json::from_str(&text).expect("event fixture should be valid JSON")
}

fn errored_tasks_router() -> EventRouter {
    let mut router = EventRouter::new();
    router
        .registry_mut()
        .load_dir("tests/rules")
        .expect("fixture rules should load");
    router
}

#[test]
fn test_concrete_scenario() {
    let pattern = compile(&json!({
        "detail": {
            "lastStatus": ["STOPPED"],
            "$or": [
                {"stopCode": ["TaskFailedToStart"]},
                {"stoppedReason": [{"wildcard": "*Error:*"}]}
            ]
        }
    }))
    .unwrap();

    assert!(matches(
        &pattern,
        &json!({"detail": {"lastStatus": "STOPPED", "stopCode": "TaskFailedToStart"}})
    ));
    assert!(!matches(
        &pattern,
        &json!({"detail": {"lastStatus": "RUNNING", "stopCode": "TaskFailedToStart"}})
    ));
}

#[test]
fn test_fixture_rules_load_in_name_order() {
    let router = errored_tasks_router();
    assert_eq!(
        router.registry().rule_names(),
        vec!["ecs-deprovisioning", "ecs-errored-tasks"]
    );
    assert_eq!(
        router.registry().get("ecs-errored-tasks").unwrap().description(),
        Some("Triggered when an ECS Task stops because of an error")
    );
}

#[test]
fn test_errored_task_events() {
    let router = errored_tasks_router();

    let failed = router.evaluate(&load_event("task_failed_to_start"));
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].rule, "ecs-errored-tasks");
    assert_eq!(failed[0].branches[0].to_string(), "detail.$or[1]");

    let exited = router.evaluate(&load_event("essential_container_exited"));
    assert_eq!(exited.len(), 1);
    assert_eq!(exited[0].branches[0].to_string(), "detail.$or[0]");

    assert!(router.evaluate(&load_event("clean_shutdown")).is_empty());
    assert!(router.evaluate(&load_event("scaling_stop")).is_empty());
}

#[test]
fn test_stopped_reason_branch() {
    let router = errored_tasks_router();
    let mut event = load_event("scaling_stop");
    event["detail"]["stoppedReason"] = json!("ResourceInitializationError: unable to pull secrets");

    let matched = router.evaluate(&event);
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].branches[0].to_string(), "detail.$or[2]");
}

#[test]
fn test_source_constraint_applies() {
    let router = errored_tasks_router();
    let mut event = load_event("task_failed_to_start");
    event["source"] = json!("aws.batch");
    assert!(router.evaluate(&event).is_empty());
}

#[test]
fn test_yaml_rule_matches() {
    let router = errored_tasks_router();
    let event = json!({
        "source": "aws.ecs",
        "detail": {
            "lastStatus": "DEPROVISIONING",
            "clusterArn": "arn:aws:ecs:us-west-2:111122223333:cluster/main",
            "group": "service:production"
        }
    });
    let matched = router.evaluate(&event);
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].rule, "ecs-deprovisioning");
    assert!(matched[0].branches.is_empty());
}

#[test]
fn test_dispatch_to_sinks() {
    let router = errored_tasks_router();
    let memory = MemorySink::new();

    let events = [
        load_event("task_failed_to_start"),
        load_event("essential_container_exited"),
        load_event("clean_shutdown"),
    ];
    for event in &events {
        router.dispatch(event, &memory);
    }

    let deliveries = memory.deliveries();
    assert_eq!(deliveries.len(), 2);
    assert!(deliveries.iter().all(|d| d.rule == "ecs-errored-tasks"));
    assert_eq!(deliveries[0].event, events[0]);

    let logs = LogSink::new("/aws/events/ecs/errored-tasks");
    let report = router.dispatch(&events[0], &logs);
    assert_eq!(report.delivered, 1);
    assert!(report.is_clean());
}

#[test]
fn test_load_dir_is_all_or_nothing() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("good.json"),
        r#"{"name": "good", "pattern": {"detail": {"lastStatus": ["STOPPED"]}}}"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("bad.yml"),
        "name: bad\npattern:\n  detail:\n    $or: []\n",
    )
    .unwrap();
    fs::write(dir.path().join("notes.txt"), "not a rule").unwrap();

    let mut registry = RuleRegistry::new();
    let err = registry.load_dir(dir.path()).unwrap_err();
    assert!(matches!(err, EngineError::Compile { ref rule, .. } if rule == "bad"));
    assert!(registry.is_empty());

    fs::remove_file(dir.path().join("bad.yml")).unwrap();
    let loaded = registry.load_dir(dir.path()).unwrap();
    assert_eq!(loaded, vec!["good"]);
}

#[test]
fn test_load_dir_skips_dotfiles_and_rejects_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    let rule = r#"{"name": "dup", "pattern": {"a": [1]}}"#;
    fs::write(dir.path().join(".hidden.json"), "{broken").unwrap();
    fs::write(dir.path().join("one.json"), rule).unwrap();

    let mut registry = RuleRegistry::new();
    assert_eq!(registry.load_dir(dir.path()).unwrap(), vec!["dup"]);

    fs::write(dir.path().join("two.json"), rule).unwrap();
    let mut fresh = RuleRegistry::new();
    assert!(matches!(
        fresh.load_dir(dir.path()),
        Err(EngineError::DuplicateRule(name)) if name == "dup"
    ));
}

#[test]
fn test_load_dir_reports_bad_documents() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("broken.json"), "{not json").unwrap();

    let mut registry = RuleRegistry::new();
    assert!(matches!(
        registry.load_dir(dir.path()),
        Err(EngineError::InvalidDocument(_))
    ));
    assert!(matches!(
        registry.load_dir(Path::new("tests/does-not-exist")),
        Err(EngineError::Io(_))
    ));
}

#[test]
fn test_update_rejection_keeps_active_pattern() {
    let mut router = errored_tasks_router();
    let event = load_event("task_failed_to_start");
    assert_eq!(router.evaluate(&event).len(), 1);

    let broken = RuleDefinition::new(
        "ecs-errored-tasks",
        json!({"detail": {"stoppedReason": [{"wildcard": "a**b"}]}}),
    );
    assert!(router.registry_mut().put_rule(broken).is_err());
    assert_eq!(router.evaluate(&event).len(), 1);
}
