//! Content-addressed storage and reconciliation of computed histograms
//!
//! [`ArtifactStore`] owns the directory layout: canonical requests under
//! their digest, artifacts under `<digest>` or `<digest>.<k>`, and
//! atomic publishing. [`ResultCache`] scans the artifacts, keeps the best
//! one per digest and deletes the rest.

pub mod cache;
pub mod store;

pub use cache::{CacheReport, MalformedEntry, ResultCache};
pub use store::{select_pending, ArtifactStore, Listing};
