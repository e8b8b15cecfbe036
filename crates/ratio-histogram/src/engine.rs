//! Choosing between exact enumeration and Monte-Carlo sampling

use crate::exact::{exact_feasible, ExactEnumerator};
use crate::monte_carlo::MonteCarloSampler;
use ratio_core::{Artifact, CanonicalRequest, Digest, EngineConfig, Quality, Result};
use std::fmt;
use tracing::{info, instrument};

/// How a request's histogram is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Enumerate every ordering
    Exact,
    /// Sample this many random orderings
    MonteCarlo { iterations: u64 },
}

impl Method {
    /// Pick the method for `n` samples; decided once, never blended
    pub fn select(n: usize, config: &EngineConfig) -> Self {
        if exact_feasible(n, config.exact_threshold()) {
            Method::Exact
        } else {
            Method::MonteCarlo {
                iterations: config.budget,
            }
        }
    }

    /// Quality tag of artifacts produced by this method
    pub fn quality(&self) -> Quality {
        match self {
            Method::Exact => Quality::Exact,
            Method::MonteCarlo { iterations } => Quality::Approximate(*iterations),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Exact => write!(f, "exact"),
            Method::MonteCarlo { iterations } => write!(f, "monte-carlo({iterations})"),
        }
    }
}

/// Computes artifacts for canonical requests
#[derive(Debug, Clone)]
pub struct DistributionEngine {
    config: EngineConfig,
}

impl DistributionEngine {
    /// Create an engine, validating the configuration
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Method this engine uses for `request`
    pub fn method_for(&self, request: &CanonicalRequest) -> Method {
        Method::select(request.dimensions().n, &self.config)
    }

    /// Compute the artifact for a request whose digest is already known
    #[instrument(skip(self, request), fields(digest = %digest))]
    pub fn compute_with_digest(
        &self,
        request: &CanonicalRequest,
        digest: Digest,
    ) -> Result<Artifact> {
        let dims = request.dimensions();
        let method = self.method_for(request);
        info!("+ {} {} [{}]", digest, dims, method);

        let histogram = match method {
            Method::Exact => ExactEnumerator::new()
                .with_execution(self.config.execution)
                .enumerate(request)?,
            Method::MonteCarlo { iterations } => MonteCarloSampler::new(iterations)
                .with_seed(self.config.seed)
                .with_execution(self.config.execution)
                .sample(request),
        };

        info!("- {} {} [{}]", digest, dims, method);
        Ok(Artifact::new(digest, method.quality(), histogram))
    }

    /// Compute the artifact for a request
    pub fn compute(&self, request: &CanonicalRequest) -> Result<Artifact> {
        self.compute_with_digest(request, request.digest())
    }
}
