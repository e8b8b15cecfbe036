//! Configuration types for the distribution engine and artifact store

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default multiplier applied to the budget when deciding on full enumeration
pub const DEFAULT_EXACT_PREFERENCE: u64 = 10;

/// Default seed for the Monte-Carlo sampler
pub const DEFAULT_SEED: u64 = 1;

/// Default iteration budget
pub const DEFAULT_BUDGET: u64 = 10_000;

/// Execution strategy for independent units of work
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStrategy {
    /// Process items sequentially
    Sequential,
    /// Process items in parallel
    Parallel,
    /// Parallel when the `parallel` feature is compiled in
    Auto,
}

impl Default for ExecutionStrategy {
    fn default() -> Self {
        Self::Auto
    }
}

/// Engine parameters shared by the exact and Monte-Carlo paths
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Iteration budget; also the `k` of approximate artifacts
    pub budget: u64,
    /// Enumerate exactly when `n! <= exact_preference * budget`
    pub exact_preference: u64,
    /// Base seed for the Monte-Carlo shards
    pub seed: u64,
    /// How shards and requests are scheduled
    pub execution: ExecutionStrategy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            budget: DEFAULT_BUDGET,
            exact_preference: DEFAULT_EXACT_PREFERENCE,
            seed: DEFAULT_SEED,
            execution: ExecutionStrategy::default(),
        }
    }
}

impl EngineConfig {
    /// Create a config with the given budget and default everything else
    pub fn new(budget: u64) -> Self {
        Self {
            budget,
            ..Self::default()
        }
    }

    /// Set the iteration budget
    pub fn with_budget(mut self, budget: u64) -> Self {
        self.budget = budget;
        self
    }

    /// Set the exact-enumeration preference multiplier
    pub fn with_exact_preference(mut self, exact_preference: u64) -> Self {
        self.exact_preference = exact_preference;
        self
    }

    /// Set the Monte-Carlo base seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the execution strategy
    pub fn with_execution(mut self, execution: ExecutionStrategy) -> Self {
        self.execution = execution;
        self
    }

    /// Largest `n!` that is still enumerated exactly
    pub fn exact_threshold(&self) -> u64 {
        self.exact_preference.saturating_mul(self.budget)
    }

    /// Check parameter ranges
    pub fn validate(&self) -> Result<()> {
        if self.budget == 0 {
            return Err(Error::InvalidParameter(
                "iteration budget must be positive".to_string(),
            ));
        }
        if self.exact_preference == 0 {
            return Err(Error::InvalidParameter(
                "exact preference must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Directory layout of the artifact store
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Root data directory
    pub root: PathBuf,
    /// Subdirectory holding canonical requests
    pub input_dir: String,
    /// Subdirectory holding artifacts
    pub output_dir: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("type-ratio-data"),
            input_dir: "in".to_string(),
            output_dir: "out".to_string(),
        }
    }
}

impl StoreConfig {
    /// Store rooted at `root` with the default subdirectories
    pub fn at(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    pub fn input_path(&self) -> PathBuf {
        self.root.join(&self.input_dir)
    }

    pub fn output_path(&self) -> PathBuf {
        self.root.join(&self.output_dir)
    }
}

/// One slice of the pending work when several processes share a run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkPartition {
    part: usize,
    parts: usize,
}

impl Default for WorkPartition {
    fn default() -> Self {
        Self { part: 0, parts: 1 }
    }
}

impl WorkPartition {
    /// Create a partition; both `0..parts` and `1..=parts` numbering are accepted
    pub fn new(part: usize, parts: usize) -> Result<Self> {
        let part = if part == parts { 0 } else { part };
        if parts == 0 || part >= parts {
            return Err(Error::InvalidParameter(format!(
                "invalid work partition {part} of {parts}"
            )));
        }
        Ok(Self { part, parts })
    }

    pub fn part(&self) -> usize {
        self.part
    }

    pub fn parts(&self) -> usize {
        self.parts
    }

    /// Whether the item at `index` of the sorted work list belongs to this part
    pub fn contains(&self, index: usize) -> bool {
        index % self.parts == self.part
    }
}
