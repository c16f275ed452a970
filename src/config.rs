//! Configuration for pattern compilation and event routing.
//!
//! Compilation limits live in [`CompilerConfig`]. Batch parallelism for the
//! router lives in [`ParallelConfig`]. [`EngineConfig`] bundles both and
//! offers presets for common deployments.

/// Limits and extensions applied while compiling pattern documents.
///
/// # Examples
///
/// ```rust
/// use event_pattern::CompilerConfig;
///
/// // Only accept wildcard operands with at most one `*`
/// let config = CompilerConfig {
///     allow_multi_wildcard: false,
///     ..CompilerConfig::default()
/// };
/// assert_eq!(config.max_depth, 32);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerConfig {
    /// Maximum nesting depth of a pattern document.
    ///
    /// Every nested mapping and every `$or` alternative counts as one level.
    /// Documents nested deeper are rejected with
    /// [`CompileErrorKind::TooDeep`](crate::error::CompileErrorKind::TooDeep).
    ///
    /// **Default**: 32
    pub max_depth: usize,

    /// Accept wildcard operands containing more than one `*`.
    ///
    /// When disabled, a wildcard operand may contain zero or one `*` and the
    /// matcher checks the literal prefix and suffix around it. When enabled,
    /// the literal segments between stars must appear in order.
    ///
    /// **Default**: true
    pub allow_multi_wildcard: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            max_depth: 32,
            allow_multi_wildcard: true,
        }
    }
}

impl CompilerConfig {
    /// Single-`*` wildcards and a shallow nesting limit.
    pub fn strict() -> Self {
        Self {
            max_depth: 16,
            allow_multi_wildcard: false,
        }
    }
}

/// Configuration for parallel batch evaluation in the router.
#[derive(Debug, Clone, PartialEq)]
pub struct ParallelConfig {
    /// Worker threads in the router's batch pool. Zero lets rayon choose.
    pub num_threads: usize,
    /// Enable parallel processing of events within batches.
    pub enable_event_parallelism: bool,
    /// Minimum batch size to enable parallel processing.
    pub min_batch_size_for_parallelism: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            num_threads: rayon::current_num_threads(),
            enable_event_parallelism: true,
            min_batch_size_for_parallelism: 100,
        }
    }
}

/// Engine configuration.
///
/// # Example
/// ```rust
/// use event_pattern::EngineConfig;
///
/// let config = EngineConfig::new()
///     .with_parallel_processing(true)
///     .with_min_batch_size(64)
///     .with_max_depth(8);
/// assert!(config.enable_parallel_processing);
/// assert_eq!(config.parallel.min_batch_size_for_parallelism, 64);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Pattern compilation configuration
    pub compiler: CompilerConfig,
    /// Enable parallel processing for batch evaluation
    pub enable_parallel_processing: bool,
    /// Parallel processing configuration
    pub parallel: ParallelConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            compiler: CompilerConfig::default(),
            enable_parallel_processing: false,
            parallel: ParallelConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Create a new engine configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration optimized for high-throughput batch routing.
    pub fn high_throughput() -> Self {
        Self {
            compiler: CompilerConfig::default(),
            enable_parallel_processing: true,
            parallel: ParallelConfig {
                num_threads: rayon::current_num_threads(),
                enable_event_parallelism: true,
                min_batch_size_for_parallelism: 32,
            },
        }
    }

    /// Create a configuration with strict pattern validation and sequential
    /// evaluation.
    pub fn strict() -> Self {
        Self {
            compiler: CompilerConfig::strict(),
            enable_parallel_processing: false,
            parallel: ParallelConfig {
                enable_event_parallelism: false,
                ..ParallelConfig::default()
            },
        }
    }

    pub fn with_parallel_processing(mut self, enabled: bool) -> Self {
        self.enable_parallel_processing = enabled;
        self
    }

    pub fn with_min_batch_size(mut self, size: usize) -> Self {
        self.parallel.min_batch_size_for_parallelism = size;
        self
    }

    pub fn with_num_threads(mut self, threads: usize) -> Self {
        self.parallel.num_threads = threads;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.compiler.max_depth = depth;
        self
    }

    pub fn with_multi_wildcard(mut self, allowed: bool) -> Self {
        self.compiler.allow_multi_wildcard = allowed;
        self
    }

    /// Whether a batch of `batch_len` events should be evaluated in parallel.
    pub fn use_parallel_for(&self, batch_len: usize) -> bool {
        self.enable_parallel_processing
            && self.parallel.enable_event_parallelism
            && batch_len >= self.parallel.min_batch_size_for_parallelism
    }
}
