//! End-to-end benchmarks for the event pattern engine.
//!
//! These benchmarks measure the pipeline from JSON parsing through pattern
//! evaluation, using task state change events shaped like real ones.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use event_pattern::{compile, EngineConfig, EventRouter, RuleDefinition};
use serde_json::{json, Value};

fn errored_tasks_pattern() -> Value {
    json!({
        "source": ["aws.ecs"],
        "detail-type": ["ECS Task State Change"],
        "detail": {
            "desiredStatus": ["STOPPED"],
            "lastStatus": ["STOPPED"],
            "$or": [
                {"stopCode": ["EssentialContainerExited"], "containers": {"exitCode": [{"anything-but": 0}]}},
                {"stopCode": ["TaskFailedToStart"]},
                {"stoppedReason": [{"wildcard": "*Error:*"}]}
            ]
        }
    })
}

fn task_event(i: usize) -> Value {
    let stop_code = match i % 3 {
        0 => "EssentialContainerExited",
        1 => "TaskFailedToStart",
        _ => "ServiceSchedulerInitiated",
    };
    let containers: Vec<Value> = (0..4)
        .map(|c| json!({"name": format!("container-{c}"), "exitCode": (i + c) % 2}))
        .collect();
    json!({
        "source": "aws.ecs",
        "detail-type": "ECS Task State Change",
        "detail": {
            "desiredStatus": "STOPPED",
            "lastStatus": "STOPPED",
            "stopCode": stop_code,
            "stoppedReason": "CannotPullContainerError: pull access denied",
            "containers": containers
        }
    })
}

fn bench_single_event(c: &mut Criterion) {
    let pattern = compile(&errored_tasks_pattern()).expect("pattern should compile");
    let event = task_event(2);

    c.bench_function("match_single_event", |b| {
        b.iter(|| black_box(pattern.matches(black_box(&event))))
    });

    c.bench_function("evaluate_single_event_with_trace", |b| {
        b.iter(|| black_box(pattern.evaluate(black_box(&event))))
    });

    let text = event.to_string();
    c.bench_function("parse_and_match", |b| {
        b.iter(|| {
            let parsed: Value = serde_json::from_str(black_box(&text)).unwrap();
            black_box(pattern.matches(&parsed))
        })
    });
}

fn bench_compile(c: &mut Criterion) {
    let document = errored_tasks_pattern();
    c.bench_function("compile_pattern", |b| {
        b.iter(|| black_box(compile(black_box(&document)).unwrap()))
    });
}

fn bench_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("router_batch");
    for &batch_size in &[10usize, 100, 1000] {
        let events: Vec<Value> = (0..batch_size).map(task_event).collect();
        for (label, config) in [
            ("sequential", EngineConfig::default()),
            ("parallel", EngineConfig::high_throughput()),
        ] {
            let mut router = EventRouter::with_config(config);
            router
                .registry_mut()
                .put_rule(RuleDefinition::new("errored", errored_tasks_pattern()))
                .unwrap();
            group.bench_with_input(BenchmarkId::new(label, batch_size), &events, |b, events| {
                b.iter(|| black_box(router.evaluate_batch(events)))
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_single_event, bench_compile, bench_batch);
criterion_main!(benches);
