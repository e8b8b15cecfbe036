//! Type-accumulation ratio analysis
//!
//! Given samples that each contribute tokens to two disjoint universes,
//! this crate estimates how the number of distinct universe-0 tokens grows
//! with the total number of distinct tokens when the samples are taken in
//! a uniformly random order. The result is a joint histogram per request,
//! from which confidence bands around the observed curve are read.
//!
//! The workspace is split by concern:
//!
//! - [`ratio_core`]: requests, canonical form and digests, histograms and
//!   their text codec, configuration and errors
//! - [`ratio_histogram`]: exact enumeration and Monte-Carlo sampling
//! - [`ratio_cumulative`]: cumulative rows and quantile statistics
//! - [`ratio_cache`]: the content-addressed artifact store and result cache
//!
//! This crate re-exports the commonly used items and adds [`Pipeline`],
//! which ties them together.

pub mod pipeline;

pub use pipeline::{Pipeline, PipelineConfig, RunReport};

pub use ratio_cache::{ArtifactStore, CacheReport, MalformedEntry, ResultCache};
pub use ratio_core::{
    canonicalize, Artifact, ArtifactName, CanonicalRequest, Digest, Dimensions, EngineConfig,
    Error, ExecutionStrategy, JointHistogram, Quality, Request, Result, Sample, StoreConfig,
    Universe, WorkPartition,
};
pub use ratio_cumulative::{CumulativeTable, Level, TailFractions};
pub use ratio_histogram::{DistributionEngine, ExactEnumerator, Method, MonteCarloSampler};

pub use ratio_cache;
pub use ratio_core;
pub use ratio_cumulative;
pub use ratio_histogram;
