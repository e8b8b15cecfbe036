//! Core types for type-accumulation distribution analysis
//!
//! This crate holds the data model shared by the rest of the workspace:
//!
//! - **Requests**: samples of tokens drawn from two disjoint universes
//! - **Canonical form**: an order-independent encoding and its SHA-256 digest
//! - **Joint histograms**: counts of (total distinct, universe-0 distinct)
//!   pairs, with the sparse text codec used to persist them
//! - **Configuration and errors** used by the engine and the artifact store
//!
//! # Example
//!
//! ```rust
//! use ratio_core::{canonicalize, Request, Sample};
//!
//! let request = Request::new(vec![
//!     Sample::new(["walked", "talked"], ["went"]),
//!     Sample::new(["walked"], ["ran", "went"]),
//! ])
//! .unwrap();
//!
//! let canonical = canonicalize(&request);
//! assert_eq!(canonical.dimensions().xx(), 4);
//! println!("digest: {}", canonical.digest());
//! ```

pub mod canonical;
pub mod codec;
pub mod config;
pub mod digest;
pub mod error;
pub mod execution;
pub mod histogram;
pub mod types;

// Re-export core types
pub use canonical::{canonicalize, CanonicalRequest, CanonicalSample};
pub use codec::{decode_row, encode_row, read_histogram, write_histogram, EncodedRow};
pub use config::{EngineConfig, ExecutionStrategy, StoreConfig, WorkPartition};
pub use digest::{ArtifactName, Digest};
pub use error::{Error, Result};
pub use execution::{execute_batch, execute_reduce};
pub use histogram::JointHistogram;
pub use types::{Dimensions, Quality, Request, Sample, Universe};

/// A computed histogram together with its identity and quality
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub digest: Digest,
    pub quality: Quality,
    pub histogram: JointHistogram,
}

impl Artifact {
    pub fn new(digest: Digest, quality: Quality, histogram: JointHistogram) -> Self {
        Self {
            digest,
            quality,
            histogram,
        }
    }

    /// Storage name of this artifact
    pub fn name(&self) -> ArtifactName {
        ArtifactName::new(self.digest, self.quality)
    }
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
