//! On-disk layout of canonical requests and computed artifacts
//!
//! ```text
//! <root>/in/<digest>          canonical request text
//! <root>/out/<digest>         exact artifact
//! <root>/out/<digest>.<k>     approximate artifact from k iterations
//! <root>/out/.<name>.tmp      artifact being written
//! ```
//!
//! Files are written under a dot-prefixed temporary name and renamed into
//! place once complete, so readers never observe a partial file.

use ratio_core::{
    read_histogram, write_histogram, Artifact, ArtifactName, CanonicalRequest, Digest, Error,
    Result, StoreConfig, WorkPartition,
};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Entries found in one of the store directories
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing<T> {
    /// Recognized entries, sorted
    pub entries: Vec<T>,
    /// Names that are neither temporaries nor recognized entries
    pub unrecognized: Vec<String>,
}

/// Content-addressed store of requests and artifacts
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    config: StoreConfig,
}

impl ArtifactStore {
    /// Open a store, creating its directories if needed
    pub fn open(config: StoreConfig) -> Result<Self> {
        fs::create_dir_all(config.input_path())?;
        fs::create_dir_all(config.output_path())?;
        debug!("Opened artifact store at {}", config.root.display());
        Ok(Self { config })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn request_path(&self, digest: &Digest) -> PathBuf {
        self.config.input_path().join(digest.to_hex())
    }

    pub fn artifact_path(&self, name: &ArtifactName) -> PathBuf {
        self.config.output_path().join(name.to_string())
    }

    /// Persist a canonical request under its digest
    ///
    /// Identical requests share a file, so an existing one is left alone.
    pub fn write_request(&self, request: &CanonicalRequest) -> Result<Digest> {
        let bytes = request.to_bytes();
        let digest = Digest::of(&bytes);
        let path = self.request_path(&digest);
        if !path.exists() {
            write_atomic(&path, |out| out.write_all(&bytes))?;
            debug!("Stored request {} ({})", digest, request.dimensions());
        }
        Ok(digest)
    }

    /// Read a stored request, `None` when there is none for `digest`
    ///
    /// The content must hash back to `digest`.
    pub fn read_request(&self, digest: &Digest) -> Result<Option<CanonicalRequest>> {
        let text = match fs::read_to_string(self.request_path(digest)) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                return Err(Error::InvalidRequest(format!(
                    "request {digest} is not valid UTF-8"
                )))
            }
            Err(e) => return Err(e.into()),
        };
        let actual = Digest::of(text.as_bytes());
        if actual != *digest {
            return Err(Error::InvalidRequest(format!(
                "request {digest} has content digest {actual}"
            )));
        }
        CanonicalRequest::parse(&text).map(Some)
    }

    /// Digests of all stored requests
    pub fn requests(&self) -> Result<Listing<Digest>> {
        list_dir(&self.config.input_path(), |name| name.parse().ok())
    }

    /// Names of all stored artifacts
    pub fn artifacts(&self) -> Result<Listing<ArtifactName>> {
        list_dir(&self.config.output_path(), |name| name.parse().ok())
    }

    /// Write an artifact and move it into place under its final name
    #[instrument(skip(self, artifact), fields(name = %artifact.name()))]
    pub fn publish(&self, artifact: &Artifact) -> Result<ArtifactName> {
        let name = artifact.name();
        write_atomic(&self.artifact_path(&name), |out| {
            write_histogram(&artifact.histogram, out)
        })?;
        info!("Published {}", name);
        Ok(name)
    }

    /// Read an artifact, checking it against `shape = (xx, yy)` when given
    pub fn read_artifact(
        &self,
        name: &ArtifactName,
        shape: Option<(usize, usize)>,
    ) -> Result<Artifact> {
        let file = File::open(self.artifact_path(name))?;
        let histogram = read_histogram(BufReader::new(file), &name.to_string(), shape)?;
        Ok(Artifact::new(name.digest, name.quality, histogram))
    }

    /// Remove an artifact; returns false if it was already gone
    pub fn delete(&self, name: &ArtifactName) -> Result<bool> {
        match fs::remove_file(self.artifact_path(name)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// `(xx, yy)` of the stored request, if it can be read
    pub fn request_shape(&self, digest: &Digest) -> Option<(usize, usize)> {
        match self.read_request(digest) {
            Ok(request) => request.map(|r| {
                let dims = r.dimensions();
                (dims.xx(), dims.yy)
            }),
            Err(e) => {
                warn!("Validating artifacts of {} without their request: {}", digest, e);
                None
            }
        }
    }

    /// Requests still needing a run with `budget` iterations, in this
    /// process's share of the work
    ///
    /// Only artifacts that read back cleanly count; a malformed or vanished
    /// one leaves its request pending.
    pub fn pending(&self, budget: u64, partition: WorkPartition) -> Result<Vec<Digest>> {
        let mut valid = Vec::new();
        for name in self.artifacts()?.entries {
            if !name.quality.satisfies(budget) {
                continue;
            }
            match self.read_artifact(&name, self.request_shape(&name.digest)) {
                Ok(_) => valid.push(name),
                Err(e) if e.is_malformed() || e.is_not_found() => {
                    debug!("Not counting {}: {}", name, e);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(select_pending(
            &self.requests()?.entries,
            &valid,
            budget,
            partition,
        ))
    }
}

/// Requests not yet satisfied by any of `artifacts`, sorted by digest
/// and restricted to `partition`
///
/// A request is satisfied by an exact artifact or by an approximate one
/// with at least `budget` iterations.
pub fn select_pending(
    requests: &[Digest],
    artifacts: &[ArtifactName],
    budget: u64,
    partition: WorkPartition,
) -> Vec<Digest> {
    let mut done: BTreeMap<Digest, bool> = BTreeMap::new();
    for name in artifacts {
        *done.entry(name.digest).or_default() |= name.quality.satisfies(budget);
    }

    let mut todo: Vec<Digest> = requests
        .iter()
        .filter(|d| !done.get(d).copied().unwrap_or(false))
        .copied()
        .collect();
    todo.sort();
    todo.dedup();

    todo.into_iter()
        .enumerate()
        .filter(|(i, _)| partition.contains(*i))
        .map(|(_, d)| d)
        .collect()
}

/// List a directory, skipping dot-prefixed temporaries
fn list_dir<T: Ord>(dir: &Path, parse: impl Fn(&str) -> Option<T>) -> Result<Listing<T>> {
    let mut listing = Listing {
        entries: Vec::new(),
        unrecognized: Vec::new(),
    };
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(listing),
        Err(e) => return Err(e.into()),
    };
    for entry in entries {
        let file_name = entry?.file_name();
        let name = file_name.to_string_lossy();
        if name.starts_with('.') {
            continue;
        }
        match parse(&name) {
            Some(item) => listing.entries.push(item),
            None => {
                warn!("Unexpected file {:?} in {}", name, dir.display());
                listing.unrecognized.push(name.into_owned());
            }
        }
    }
    listing.entries.sort();
    listing.unrecognized.sort();
    Ok(listing)
}

/// Write through `.<file>.tmp` in the same directory, then rename
fn write_atomic(
    path: &Path,
    write: impl FnOnce(&mut BufWriter<File>) -> io::Result<()>,
) -> Result<()> {
    let (dir, file_name) = match (path.parent(), path.file_name()) {
        (Some(dir), Some(file_name)) => (dir, file_name.to_string_lossy()),
        _ => {
            return Err(Error::InvalidParameter(format!(
                "cannot write to {}",
                path.display()
            )))
        }
    };
    let tmp = dir.join(format!(".{file_name}.tmp"));

    let result = (|| -> io::Result<()> {
        let mut out = BufWriter::new(File::create(&tmp)?);
        write(&mut out)?;
        out.into_inner().map_err(|e| e.into_error())?.sync_all()?;
        fs::rename(&tmp, path)
    })();
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    Ok(result?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratio_core::{canonicalize, JointHistogram, Quality, Request, Sample};
    use tempfile::tempdir;

    fn digest(i: u8) -> Digest {
        Digest::of(&[i])
    }

    fn request() -> CanonicalRequest {
        canonicalize(
            &Request::new(vec![Sample::new(["a"], ["A"]), Sample::new(["b"], [])]).unwrap(),
        )
    }

    #[test]
    fn test_request_roundtrip() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::open(StoreConfig::at(dir.path())).unwrap();
        let r = request();
        let d = store.write_request(&r).unwrap();
        assert_eq!(d, r.digest());
        assert_eq!(store.read_request(&d).unwrap(), Some(r.clone()));
        // rewriting is a no-op
        assert_eq!(store.write_request(&r).unwrap(), d);
        assert_eq!(store.requests().unwrap().entries, vec![d]);
        assert_eq!(store.read_request(&digest(0)).unwrap(), None);
    }

    #[test]
    fn test_read_request_checks_digest() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::open(StoreConfig::at(dir.path())).unwrap();
        let d = digest(1);
        fs::write(store.request_path(&d), "0 0 0\n").unwrap();
        assert!(matches!(
            store.read_request(&d),
            Err(Error::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_publish_and_read() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::open(StoreConfig::at(dir.path())).unwrap();
        let h = JointHistogram::from_rows(1, 1, vec![vec![0, 0], vec![2, 3]]).unwrap();
        let artifact = Artifact::new(digest(2), Quality::Approximate(5), h);

        let name = store.publish(&artifact).unwrap();
        assert_eq!(name.to_string(), format!("{}.5", digest(2)));
        assert_eq!(
            fs::read_to_string(store.artifact_path(&name)).unwrap(),
            "0 0\n0 2 2 3\n"
        );
        assert_eq!(store.read_artifact(&name, Some((1, 1))).unwrap(), artifact);
        assert_eq!(store.read_artifact(&name, None).unwrap(), artifact);
        assert!(store.read_artifact(&name, Some((2, 1))).unwrap_err().is_malformed());

        // no temporary is left behind
        let names: Vec<_> = fs::read_dir(store.config().output_path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 1);
    }

    #[test]
    fn test_listing_skips_temporaries() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::open(StoreConfig::at(dir.path())).unwrap();
        let out = store.config().output_path();
        let exact = ArtifactName::new(digest(3), Quality::Exact);
        fs::write(out.join(exact.to_string()), "0 0\n").unwrap();
        fs::write(out.join(format!(".{exact}.5.tmp")), "").unwrap();
        fs::write(out.join("notes.txt"), "").unwrap();

        let listing = store.artifacts().unwrap();
        assert_eq!(listing.entries, vec![exact]);
        assert_eq!(listing.unrecognized, vec!["notes.txt".to_string()]);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::open(StoreConfig::at(dir.path())).unwrap();
        let artifact = Artifact::new(digest(4), Quality::Exact, JointHistogram::zeros(0, 0));
        let name = store.publish(&artifact).unwrap();
        assert!(store.delete(&name).unwrap());
        assert!(!store.delete(&name).unwrap());
    }

    #[test]
    fn test_select_pending() {
        let (a, b, c) = (digest(5), digest(6), digest(7));
        let artifacts = [
            ArtifactName::new(a, Quality::Exact),
            ArtifactName::new(b, Quality::Approximate(100)),
        ];
        let all = WorkPartition::default();

        let pending = select_pending(&[a, b, c], &artifacts, 100, all);
        assert_eq!(pending, vec![c]);

        let mut expected = vec![b, c];
        expected.sort();
        assert_eq!(select_pending(&[c, b, a], &artifacts, 1000, all), expected);
    }

    #[test]
    fn test_select_pending_partitions() {
        let mut requests: Vec<Digest> = (10..15).map(digest).collect();
        requests.sort();
        let share = |part| select_pending(&requests, &[], 1, WorkPartition::new(part, 2).unwrap());

        assert_eq!(share(0), vec![requests[0], requests[2], requests[4]]);
        assert_eq!(share(1), vec![requests[1], requests[3]]);
        // part == parts is the same share as part 0
        assert_eq!(share(2), share(0));
    }

    #[test]
    fn test_pending_ignores_unreadable_artifacts() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::open(StoreConfig::at(dir.path())).unwrap();
        let d = store
            .write_request(&canonicalize(
                &Request::new(vec![Sample::new(["a"], ["A"])]).unwrap(),
            ))
            .unwrap();
        let all = WorkPartition::default();

        let exact = ArtifactName::new(d, Quality::Exact);
        fs::write(store.artifact_path(&exact), "garbage\n").unwrap();
        assert_eq!(store.pending(100, all).unwrap(), vec![d]);

        // right layout, wrong shape for this request
        fs::write(store.artifact_path(&exact), "0 0\n").unwrap();
        assert_eq!(store.pending(100, all).unwrap(), vec![d]);

        fs::write(store.artifact_path(&exact), "0 0\n0 0\n1 2 1\n").unwrap();
        assert!(store.pending(100, all).unwrap().is_empty());
    }
}
