//! Rule registry and event router.
//!
//! This is the rule-management layer around the pure compile/match core.
//! A [`RuleRegistry`] owns named rules, each holding an `Arc`-shared
//! compiled pattern. Updates compile first and swap the rule only on
//! success, so a rejected update never disturbs the rule already in force.
//! An [`EventRouter`] evaluates events against every enabled rule and hands
//! matches to an [`EventSink`].
//!
//! # Examples
//!
//! ```rust
//! use event_pattern::{EventRouter, MemorySink, RuleDefinition};
//! use serde_json::json;
//!
//! let mut router = EventRouter::new();
//! router.registry_mut().put_rule(RuleDefinition::new(
//!     "ecs-task-failed",
//!     json!({"detail": {"stopCode": ["TaskFailedToStart"]}}),
//! ))?;
//!
//! let sink = MemorySink::new();
//! let report = router.dispatch(&json!({"detail": {"stopCode": "TaskFailedToStart"}}), &sink);
//! assert_eq!(report.delivered, 1);
//! assert_eq!(sink.deliveries()[0].rule, "ecs-task-failed");
//! # Ok::<(), event_pattern::EngineError>(())
//! ```

use crate::compiler::Compiler;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::ir::Pattern;
use crate::matcher::{BranchHit, MatchVerdict};
use crate::sink::{EventSink, SinkError};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, trace, warn};

/// Source form of a rule, as stored in rule files.
///
/// ```yaml
/// name: ecs-errored-tasks
/// description: Triggered when an ECS Task stops because of an error
/// pattern:
///   detail:
///     lastStatus: [STOPPED]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub pattern: Value,
}

fn default_enabled() -> bool {
    true
}

impl RuleDefinition {
    pub fn new(name: impl Into<String>, pattern: Value) -> Self {
        Self {
            name: name.into(),
            description: None,
            enabled: true,
            pattern,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// A rule whose pattern has been compiled.
#[derive(Debug, Clone)]
pub struct Rule {
    definition: RuleDefinition,
    pattern: Arc<Pattern>,
}

impl Rule {
    /// Compile `definition` into a rule.
    ///
    /// # Errors
    /// [`EngineError::Compile`] naming the rule if the pattern is invalid.
    pub fn compile(definition: RuleDefinition, compiler: &Compiler) -> Result<Self> {
        let pattern = compiler
            .compile(&definition.pattern)
            .map_err(|source| EngineError::Compile {
                rule: definition.name.clone(),
                source,
            })?;
        Ok(Self {
            definition,
            pattern: Arc::new(pattern),
        })
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn description(&self) -> Option<&str> {
        self.definition.description.as_deref()
    }

    pub fn is_enabled(&self) -> bool {
        self.definition.enabled
    }

    pub fn definition(&self) -> &RuleDefinition {
        &self.definition
    }

    /// Shared handle to the compiled pattern.
    pub fn pattern(&self) -> &Arc<Pattern> {
        &self.pattern
    }

    pub fn evaluate(&self, event: &Value) -> MatchVerdict {
        self.pattern.evaluate(event)
    }
}

/// Named rules keyed and iterated in name order.
#[derive(Debug, Default)]
pub struct RuleRegistry {
    compiler: Compiler,
    rules: BTreeMap<String, Arc<Rule>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_compiler(compiler: Compiler) -> Self {
        Self {
            compiler,
            rules: BTreeMap::new(),
        }
    }

    pub fn compiler(&self) -> &Compiler {
        &self.compiler
    }

    /// Create or replace a rule.
    ///
    /// The pattern is compiled before anything changes. On error the previous
    /// rule with this name, if any, stays active. Returns the replaced rule.
    pub fn put_rule(&mut self, definition: RuleDefinition) -> Result<Option<Arc<Rule>>> {
        let name = definition.name.clone();
        let rule = match Rule::compile(definition, &self.compiler) {
            Ok(rule) => rule,
            Err(err) => {
                warn!(rule = %name, error = %err, "rejected rule update");
                return Err(err);
            }
        };

        let previous = self.rules.insert(name.clone(), Arc::new(rule));
        if previous.is_some() {
            info!(rule = %name, "replaced rule");
        } else {
            info!(rule = %name, "registered rule");
        }
        Ok(previous)
    }

    /// Add a rule that must not already exist.
    pub fn insert_rule(&mut self, definition: RuleDefinition) -> Result<()> {
        if self.rules.contains_key(&definition.name) {
            return Err(EngineError::DuplicateRule(definition.name));
        }
        self.put_rule(definition).map(|_| ())
    }

    pub fn remove_rule(&mut self, name: &str) -> Result<Arc<Rule>> {
        let removed = self
            .rules
            .remove(name)
            .ok_or_else(|| EngineError::RuleNotFound(name.to_string()))?;
        info!(rule = %name, "removed rule");
        Ok(removed)
    }

    /// Enable or disable a rule without recompiling its pattern.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> Result<()> {
        let current = self
            .rules
            .get_mut(name)
            .ok_or_else(|| EngineError::RuleNotFound(name.to_string()))?;
        if current.is_enabled() != enabled {
            let mut updated = (**current).clone();
            updated.definition.enabled = enabled;
            *current = Arc::new(updated);
            info!(rule = %name, enabled, "changed rule state");
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<Rule>> {
        self.rules.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.keys().map(String::as_str).collect()
    }

    pub fn rules(&self) -> impl Iterator<Item = &Arc<Rule>> {
        self.rules.values()
    }

    /// Load every `*.json`, `*.yml` and `*.yaml` rule file in `dir`.
    ///
    /// Each file holds one [`RuleDefinition`]. Dotfiles, subdirectories and
    /// other extensions are skipped. Every file is parsed and compiled before
    /// any rule is installed, so a single bad file leaves the registry
    /// untouched. Returns the names of the loaded rules.
    pub fn load_dir(&mut self, dir: impl AsRef<Path>) -> Result<Vec<String>> {
        let dir = dir.as_ref();
        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() || is_dotfile(&path) || rule_file_format(&path).is_none() {
                debug!(path = %path.display(), "skipping non-rule file");
                continue;
            }
            paths.push(path);
        }
        paths.sort();

        let mut staged: BTreeMap<String, Rule> = BTreeMap::new();
        for path in &paths {
            let definition = read_rule_file(path)?;
            if staged.contains_key(&definition.name) {
                return Err(EngineError::DuplicateRule(definition.name));
            }
            let rule = Rule::compile(definition, &self.compiler).map_err(|err| {
                warn!(path = %path.display(), error = %err, "failed to load rule file");
                err
            })?;
            staged.insert(rule.name().to_string(), rule);
        }

        let names: Vec<String> = staged.keys().cloned().collect();
        for (name, rule) in staged {
            if self.rules.insert(name.clone(), Arc::new(rule)).is_some() {
                info!(rule = %name, "replaced rule");
            }
        }
        info!(dir = %dir.display(), count = names.len(), "loaded rules");
        Ok(names)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuleFileFormat {
    Json,
    Yaml,
}

fn rule_file_format(path: &Path) -> Option<RuleFileFormat> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Some(RuleFileFormat::Json),
        Some("yml") | Some("yaml") => Some(RuleFileFormat::Yaml),
        _ => None,
    }
}

fn is_dotfile(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}

/// Read one rule definition from a JSON or YAML file.
pub fn read_rule_file(path: &Path) -> Result<RuleDefinition> {
    let contents = fs::read_to_string(path)?;
    match rule_file_format(path) {
        Some(RuleFileFormat::Json) => Ok(serde_json::from_str(&contents)?),
        _ => Ok(serde_yaml::from_str(&contents)?),
    }
}

/// A rule that matched an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch {
    pub rule: String,
    pub branches: Vec<BranchHit>,
}

/// Outcome of dispatching one event.
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Names of the rules that matched, in rule-name order.
    pub matched: Vec<String>,
    /// Deliveries the sink accepted.
    pub delivered: usize,
    /// Deliveries the sink rejected. They are not retried.
    pub failures: Vec<(String, SinkError)>,
}

impl DispatchReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Evaluates events against every enabled rule in a registry.
///
/// Evaluation takes `&self` and touches no shared mutable state, so a router
/// behind an `Arc` can serve many threads. Rule changes go through
/// [`EventRouter::registry_mut`].
///
/// Parallel batches run on a router-owned rayon pool sized by
/// [`ParallelConfig::num_threads`](crate::config::ParallelConfig::num_threads).
/// The pool is built on the first parallel batch.
#[derive(Debug, Default)]
pub struct EventRouter {
    registry: RuleRegistry,
    config: EngineConfig,
    pool: OnceLock<Option<rayon::ThreadPool>>,
}

impl EventRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            registry: RuleRegistry::with_compiler(Compiler::with_config(config.compiler.clone())),
            config,
            pool: OnceLock::new(),
        }
    }

    /// Wrap an existing registry. Its compiler is kept as is.
    pub fn from_registry(registry: RuleRegistry, config: EngineConfig) -> Self {
        Self {
            registry,
            config,
            pool: OnceLock::new(),
        }
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut RuleRegistry {
        &mut self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Enabled rules matching `event`, in rule-name order.
    pub fn evaluate(&self, event: &Value) -> Vec<RuleMatch> {
        let matches: Vec<RuleMatch> = self
            .registry
            .rules()
            .filter(|rule| rule.is_enabled())
            .filter_map(|rule| {
                let verdict = rule.evaluate(event);
                verdict.matched.then(|| RuleMatch {
                    rule: rule.name().to_string(),
                    branches: verdict.branches,
                })
            })
            .collect();
        trace!(matched = matches.len(), "evaluated event");
        matches
    }

    /// Evaluate a batch, preserving input order.
    ///
    /// Runs on the router's thread pool when parallel processing is enabled
    /// and the batch reaches the configured minimum size.
    pub fn evaluate_batch(&self, events: &[Value]) -> Vec<Vec<RuleMatch>> {
        if !self.config.use_parallel_for(events.len()) {
            return events.iter().map(|event| self.evaluate(event)).collect();
        }

        debug!(
            events = events.len(),
            threads = self.batch_threads(),
            "evaluating batch in parallel"
        );
        let run = || {
            events
                .par_iter()
                .map(|event| self.evaluate(event))
                .collect()
        };
        match self.thread_pool() {
            Some(pool) => pool.install(run),
            None => run(),
        }
    }

    /// Number of worker threads parallel batches run on.
    pub fn batch_threads(&self) -> usize {
        self.thread_pool()
            .map_or_else(rayon::current_num_threads, rayon::ThreadPool::current_num_threads)
    }

    /// The router-owned pool, or `None` to fall back to the global pool.
    fn thread_pool(&self) -> Option<&rayon::ThreadPool> {
        self.pool
            .get_or_init(|| {
                rayon::ThreadPoolBuilder::new()
                    .num_threads(self.config.parallel.num_threads)
                    .thread_name(|index| format!("event-router-{index}"))
                    .build()
                    .map_err(|err| {
                        warn!(error = %err, "failed to build router thread pool, using global pool");
                    })
                    .ok()
            })
            .as_ref()
    }

    /// Evaluate `event` and deliver it to `sink` once per matching rule.
    pub fn dispatch(&self, event: &Value, sink: &dyn EventSink) -> DispatchReport {
        let mut report = DispatchReport::default();
        for rule_match in self.evaluate(event) {
            match sink.deliver(&rule_match, event) {
                Ok(()) => report.delivered += 1,
                Err(err) => {
                    warn!(rule = %rule_match.rule, error = %err, "sink delivery failed");
                    report.failures.push((rule_match.rule.clone(), err));
                }
            }
            report.matched.push(rule_match.rule);
        }
        report
    }
}
