//! Approximate joint histogram from uniformly random orderings
//!
//! Iterations are cut into fixed-size shards. Shard `s` draws from its own
//! generator seeded with `seed + s`, so the result depends only on the
//! seed and the iteration count, never on how shards are scheduled.

use crate::walker::PrefixWalker;
use rand::prelude::*;
use ratio_core::{
    config::DEFAULT_SEED, execute_reduce, CanonicalRequest, ExecutionStrategy, JointHistogram,
};
use tracing::{debug, instrument};

/// Iterations handled by one shard
pub const DEFAULT_SHARD_SIZE: u64 = 1024;

/// Monte-Carlo estimator over random sample orderings
#[derive(Debug, Clone)]
pub struct MonteCarloSampler {
    iterations: u64,
    seed: u64,
    shard_size: u64,
    execution: ExecutionStrategy,
}

impl MonteCarloSampler {
    /// Create a sampler drawing `iterations` random orderings
    pub fn new(iterations: u64) -> Self {
        Self {
            iterations,
            seed: DEFAULT_SEED,
            shard_size: DEFAULT_SHARD_SIZE,
            execution: ExecutionStrategy::default(),
        }
    }

    /// Set the base seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the number of iterations per shard
    pub fn with_shard_size(mut self, shard_size: u64) -> Self {
        assert!(shard_size > 0, "Shard size must be positive");
        self.shard_size = shard_size;
        self
    }

    /// Set how shards are scheduled
    pub fn with_execution(mut self, execution: ExecutionStrategy) -> Self {
        self.execution = execution;
        self
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    fn shard_count(&self) -> usize {
        self.iterations.div_ceil(self.shard_size) as usize
    }

    /// Estimate the histogram; the table sums to `n * iterations`
    #[instrument(
        skip(self, request),
        fields(n = request.dimensions().n, iterations = self.iterations)
    )]
    pub fn sample(&self, request: &CanonicalRequest) -> JointHistogram {
        let dims = request.dimensions();
        let lists = request.token_lists();
        let shards = self.shard_count();
        debug!("Running {} shards of up to {} orderings", shards, self.shard_size);

        let shard = |s: usize| {
            let start = s as u64 * self.shard_size;
            let count = self.shard_size.min(self.iterations - start);
            let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(s as u64));
            let mut histogram = JointHistogram::for_dimensions(dims);
            let mut walker = PrefixWalker::new(&lists, dims.xx(), dims.yy);
            let mut order: Vec<usize> = (0..dims.n).collect();
            for _ in 0..count {
                order.shuffle(&mut rng);
                walker.walk(&order, &mut histogram);
            }
            histogram
        };

        execute_reduce(
            self.execution,
            shards,
            JointHistogram::for_dimensions(dims),
            shard,
            |mut acc, part| {
                acc += &part;
                acc
            },
        )
    }
}
