//! Pattern validation harness.
//!
//! Compiles a pattern file and optionally evaluates event files against it.
//!
//! ```text
//! validate-pattern <pattern.json|pattern.yml> [event.json ...]
//! ```
//!
//! A pattern file may hold either a bare pattern document or a full rule
//! definition with a `pattern` key. Exits with status 1 if the pattern does
//! not compile.

use anyhow::{bail, Context};
use event_pattern::{Compiler, Pattern};
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let Some(pattern_path) = args.next() else {
        bail!("usage: validate-pattern <pattern-file> [event-file ...]");
    };

    let pattern = load_pattern(Path::new(&pattern_path))?;
    println!(
        "OK {pattern_path}: {} fields, {} $or groups, depth {}",
        pattern.field_count(),
        pattern.or_group_count(),
        pattern.depth()
    );

    for event_path in args {
        let event = read_document(Path::new(&event_path))?;
        let verdict = pattern.evaluate(&event);
        if verdict.matched {
            let branches: Vec<String> = verdict.branches.iter().map(ToString::to_string).collect();
            if branches.is_empty() {
                println!("MATCH    {event_path}");
            } else {
                println!("MATCH    {event_path} via {}", branches.join(", "));
            }
        } else {
            println!("NO MATCH {event_path}");
        }
    }
    Ok(())
}

fn load_pattern(path: &Path) -> anyhow::Result<Pattern> {
    let document = read_document(path)?;
    let pattern_document = match document.get("pattern") {
        Some(inner) if document.get("name").is_some() => inner,
        _ => &document,
    };
    Compiler::new()
        .compile(pattern_document)
        .with_context(|| format!("failed to compile {}", path.display()))
}

fn read_document(path: &Path) -> anyhow::Result<Value> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let document: Value = match path.extension().and_then(|ext| ext.to_str()) {
        Some("yml") | Some("yaml") => serde_yaml::from_str(&contents)
            .with_context(|| format!("invalid YAML in {}", path.display()))?,
        _ => serde_json::from_str(&contents)
            .with_context(|| format!("invalid JSON in {}", path.display()))?,
    };
    Ok(document)
}
