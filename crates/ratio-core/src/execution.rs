//! Batch execution over independent work items
//!
//! Shards of one computation and whole requests are independent, so they
//! are mapped over Rayon's pool when the `parallel` feature is compiled in
//! and the strategy allows it, and sequentially otherwise.

use crate::ExecutionStrategy;

/// Whether this build can run batches in parallel
pub const fn parallel_available() -> bool {
    cfg!(feature = "parallel")
}

/// Whether `strategy` results in parallel execution in this build
pub fn runs_parallel(strategy: ExecutionStrategy) -> bool {
    parallel_available() && !matches!(strategy, ExecutionStrategy::Sequential)
}

/// Map `f` over `0..count`, preserving index order in the output
pub fn execute_batch<F, R>(strategy: ExecutionStrategy, count: usize, f: F) -> Vec<R>
where
    F: Fn(usize) -> R + Sync + Send,
    R: Send,
{
    #[cfg(feature = "parallel")]
    if runs_parallel(strategy) {
        use rayon::prelude::*;
        return (0..count).into_par_iter().map(f).collect();
    }
    #[cfg(not(feature = "parallel"))]
    let _ = strategy;

    (0..count).map(f).collect()
}

/// Map over `0..count` and fold the results with `reduce`
pub fn execute_reduce<F, R, G>(
    strategy: ExecutionStrategy,
    count: usize,
    identity: R,
    f: F,
    reduce: G,
) -> R
where
    F: Fn(usize) -> R + Sync + Send,
    G: Fn(R, R) -> R,
    R: Send,
{
    execute_batch(strategy, count, f)
        .into_iter()
        .fold(identity, reduce)
}
