//! Reconciliation of stored artifacts to the best one per digest

use crate::store::ArtifactStore;
use ratio_core::{Artifact, ArtifactName, Digest, Result};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

/// An artifact that failed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedEntry {
    pub name: ArtifactName,
    pub reason: String,
}

/// Outcome of one reconciliation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheReport {
    /// Best valid artifact of each digest
    pub kept: Vec<ArtifactName>,
    /// Valid artifacts removed because a better one exists
    pub deleted: Vec<ArtifactName>,
    /// Artifacts skipped as unreadable; left on disk
    pub malformed: Vec<MalformedEntry>,
    /// Unexpected files in the output directory
    pub unrecognized: Vec<String>,
}

impl CacheReport {
    pub fn is_clean(&self) -> bool {
        self.malformed.is_empty() && self.unrecognized.is_empty()
    }
}

/// Index of the best artifact per digest
///
/// Approximate artifacts are never merged: a higher iteration count
/// replaces a lower one, and an exact artifact replaces them all.
#[derive(Debug, Clone)]
pub struct ResultCache {
    store: ArtifactStore,
    best: BTreeMap<Digest, ArtifactName>,
}

impl ResultCache {
    /// An empty index over `store`; call [`reconcile`](Self::reconcile) to fill it
    pub fn new(store: ArtifactStore) -> Self {
        Self {
            store,
            best: BTreeMap::new(),
        }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Scan the store, keep the best valid artifact of each digest and
    /// delete the inferior valid ones
    ///
    /// Malformed artifacts are reported and otherwise ignored. Running it
    /// again on an unchanged store deletes nothing.
    #[instrument(skip(self))]
    pub fn reconcile(&mut self) -> Result<CacheReport> {
        let listing = self.store.artifacts()?;
        let mut report = CacheReport {
            unrecognized: listing.unrecognized,
            ..CacheReport::default()
        };

        let mut groups: BTreeMap<Digest, Vec<ArtifactName>> = BTreeMap::new();
        for name in listing.entries {
            groups.entry(name.digest).or_default().push(name);
        }
        debug!("Reconciling {} digests", groups.len());

        self.best.clear();
        for (digest, mut candidates) in groups {
            candidates.sort_by(|a, b| b.quality.cmp(&a.quality));
            let shape = self.store.request_shape(&digest);

            let mut best = None;
            for name in candidates {
                match self.store.read_artifact(&name, shape) {
                    Ok(_) => {}
                    Err(e) if e.is_not_found() => {
                        debug!("{} vanished before it could be read", name);
                        continue;
                    }
                    Err(e) if e.is_malformed() => {
                        warn!("{}", e);
                        report.malformed.push(MalformedEntry {
                            name,
                            reason: e.to_string(),
                        });
                        continue;
                    }
                    Err(e) => return Err(e),
                }
                if let Some(better) = best {
                    info!("Removing {} superseded by {}", name, better);
                    self.store.delete(&name)?;
                    report.deleted.push(name);
                } else {
                    best = Some(name);
                }
            }

            if let Some(name) = best {
                self.best.insert(digest, name);
                report.kept.push(name);
            }
        }

        info!(
            "Kept {}, deleted {}, malformed {}",
            report.kept.len(),
            report.deleted.len(),
            report.malformed.len()
        );
        Ok(report)
    }

    /// Name of the best known artifact for `digest`
    pub fn find_best(&self, digest: &Digest) -> Option<ArtifactName> {
        self.best.get(digest).copied()
    }

    /// Read the best known artifact for `digest`
    pub fn load(&self, digest: &Digest) -> Result<Option<Artifact>> {
        match self.best.get(digest) {
            Some(name) => self
                .store
                .read_artifact(name, self.store.request_shape(digest))
                .map(Some),
            None => Ok(None),
        }
    }

    /// Best artifact names, sorted by digest
    pub fn best(&self) -> impl Iterator<Item = &ArtifactName> {
        self.best.values()
    }

    pub fn len(&self) -> usize {
        self.best.len()
    }

    pub fn is_empty(&self) -> bool {
        self.best.is_empty()
    }
}
