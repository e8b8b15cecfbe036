//! End-to-end driver: submit requests, compute what is missing, reconcile

use ratio_cache::{select_pending, ArtifactStore, CacheReport, ResultCache};
use ratio_core::{
    canonicalize, execute_batch, ArtifactName, Digest, EngineConfig, Error, Request, Result,
    StoreConfig, WorkPartition,
};
use ratio_cumulative::CumulativeTable;
use ratio_histogram::DistributionEngine;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::{info, instrument};

/// Everything a [`Pipeline`] needs to know
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub engine: EngineConfig,
    pub store: StoreConfig,
    pub partition: WorkPartition,
}

impl PipelineConfig {
    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_store(mut self, store: StoreConfig) -> Self {
        self.store = store;
        self
    }

    pub fn with_partition(mut self, partition: WorkPartition) -> Self {
        self.partition = partition;
        self
    }
}

/// Outcome of [`Pipeline::run`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Artifacts published by this run
    pub computed: Vec<ArtifactName>,
    /// Reconciliation after publishing
    pub reconcile: CacheReport,
}

/// Compute, publish, reconcile
///
/// ```rust,no_run
/// use type_ratio::{Pipeline, PipelineConfig, Request, Sample, Level};
///
/// let mut pipeline = Pipeline::new(PipelineConfig::default())?;
/// let digest = pipeline.submit(&Request::new(vec![
///     Sample::new(["walked"], ["went"]),
///     Sample::new(["talked"], []),
/// ])?)?;
/// pipeline.run()?;
///
/// let curve = pipeline.curve(&digest)?.expect("computed above");
/// println!("median at x = 2: {:?}", curve.median_pct(2));
/// println!("95% band: {:?}..{:?}",
///     curve.low_pct(2, Level::central(0.95)?),
///     curve.up_pct(2, Level::central(0.95)?));
/// # Ok::<(), type_ratio::Error>(())
/// ```
#[derive(Debug)]
pub struct Pipeline {
    engine: DistributionEngine,
    cache: ResultCache,
    partition: WorkPartition,
}

impl Pipeline {
    /// Validate the configuration, open the store and index what it holds
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let engine = DistributionEngine::new(config.engine)?;
        let mut cache = ResultCache::new(ArtifactStore::open(config.store)?);
        cache.reconcile()?;
        Ok(Self {
            engine,
            cache,
            partition: config.partition,
        })
    }

    pub fn store(&self) -> &ArtifactStore {
        self.cache.store()
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Canonicalize and store a request, returning its digest
    pub fn submit<T: Ord + Clone + Debug>(&self, request: &Request<T>) -> Result<Digest> {
        self.store().write_request(&canonicalize(request))
    }

    /// Compute every pending request in this process's share, then
    /// reconcile the store
    ///
    /// Requests run concurrently. Existing artifacts that are malformed do
    /// not count as satisfying a request, so those requests are computed
    /// again.
    #[instrument(skip(self), fields(budget = self.engine.config().budget))]
    pub fn run(&mut self) -> Result<RunReport> {
        self.cache.reconcile()?;
        let store = self.cache.store();
        let available: Vec<ArtifactName> = self.cache.best().copied().collect();
        let pending = select_pending(
            &store.requests()?.entries,
            &available,
            self.engine.config().budget,
            self.partition,
        );
        info!("{} requests pending", pending.len());

        let engine = &self.engine;
        let computed = execute_batch(engine.config().execution, pending.len(), |i| {
            let digest = pending[i];
            let request = store.read_request(&digest)?.ok_or_else(|| {
                Error::InvalidRequest(format!("request {digest} disappeared from the store"))
            })?;
            let artifact = engine.compute_with_digest(&request, digest)?;
            store.publish(&artifact)
        })
        .into_iter()
        .collect::<Result<Vec<_>>>()?;

        let reconcile = self.cache.reconcile()?;
        Ok(RunReport {
            computed,
            reconcile,
        })
    }

    /// Cumulative statistics of the best artifact for `digest`
    ///
    /// Never computes anything; `None` until a run has produced an artifact.
    pub fn curve(&self, digest: &Digest) -> Result<Option<CumulativeTable>> {
        Ok(self
            .cache
            .load(digest)?
            .map(|artifact| CumulativeTable::from(&artifact)))
    }
}
