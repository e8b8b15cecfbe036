//! Joint histogram computation for type-accumulation analysis
//!
//! Given a canonical request, this crate computes how often each pair
//! (distinct tokens seen, distinct universe-0 tokens seen) occurs across
//! the prefixes of orderings of the request's samples.
//!
//! Two methods are available:
//!
//! - [`ExactEnumerator`] counts over every ordering. Feasible for small
//!   requests only, since there are `n!` orderings.
//! - [`MonteCarloSampler`] counts over a fixed number of uniformly random
//!   orderings drawn from a seeded generator.
//!
//! [`DistributionEngine`] picks one of them per request from an
//! [`EngineConfig`](ratio_core::EngineConfig) and tags the result with
//! its quality.
//!
//! # Example
//!
//! ```rust
//! use ratio_core::{canonicalize, EngineConfig, Quality, Request, Sample};
//! use ratio_histogram::DistributionEngine;
//!
//! let request = canonicalize(
//!     &Request::new(vec![
//!         Sample::new(["walked"], ["went"]),
//!         Sample::new(["talked"], []),
//!     ])
//!     .unwrap(),
//! );
//!
//! let engine = DistributionEngine::new(EngineConfig::new(1000)).unwrap();
//! let artifact = engine.compute(&request).unwrap();
//! assert_eq!(artifact.quality, Quality::Exact);
//! assert_eq!(artifact.histogram.total(), 2 * 2);
//! ```

pub mod engine;
pub mod exact;
pub mod monte_carlo;
pub mod walker;

pub use engine::{DistributionEngine, Method};
pub use exact::{exact_feasible, factorials, ExactEnumerator};
pub use monte_carlo::{MonteCarloSampler, DEFAULT_SHARD_SIZE};
pub use walker::PrefixWalker;
