//! Content digests and artifact names

use crate::{Error, Quality, Result};
use sha2::{Digest as _, Sha256};
use std::fmt;
use std::str::FromStr;

/// Number of hex characters in a rendered digest
pub const DIGEST_HEX_LEN: usize = 64;

/// SHA-256 content hash of a canonical request
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest([u8; 32]);

impl Digest {
    /// Hash the given canonical bytes
    pub fn of(bytes: &[u8]) -> Self {
        let digest = Sha256::digest(bytes);
        let mut output = [0u8; 32];
        output.copy_from_slice(&digest);
        Self(output)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex rendering, used as the file name
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

impl FromStr for Digest {
    type Err = Error;

    /// Only the lowercase form written by [`Digest::to_hex`] is accepted
    fn from_str(s: &str) -> Result<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != DIGEST_HEX_LEN {
            return Err(Error::InvalidParameter(format!(
                "digest must be {DIGEST_HEX_LEN} hex characters, got {}",
                bytes.len()
            )));
        }
        if bytes.iter().any(u8::is_ascii_uppercase) {
            return Err(Error::InvalidParameter(format!(
                "digest {s:?} is not lowercase hex"
            )));
        }
        let mut output = [0u8; 32];
        hex::decode_to_slice(bytes, &mut output)
            .map_err(|e| Error::InvalidParameter(format!("digest {s:?}: {e}")))?;
        Ok(Self(output))
    }
}

/// Storage name of an artifact: `<digest>` or `<digest>.<k>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArtifactName {
    pub digest: Digest,
    pub quality: Quality,
}

impl ArtifactName {
    pub fn new(digest: Digest, quality: Quality) -> Self {
        Self { digest, quality }
    }
}

impl fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.quality {
            Quality::Exact => write!(f, "{}", self.digest),
            Quality::Approximate(k) => write!(f, "{}.{}", self.digest, k),
        }
    }
}

impl FromStr for ArtifactName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (digest, quality) = match s.split_once('.') {
            None => (s, Quality::Exact),
            Some((digest, suffix)) => {
                // `<digest>.0100` would not map back to its own file name
                let padded = suffix.len() > 1 && suffix.starts_with('0');
                if suffix.is_empty() || padded || !suffix.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(Error::InvalidParameter(format!(
                        "unexpected artifact name {s:?}"
                    )));
                }
                let k = suffix.parse::<u64>().map_err(|e| {
                    Error::InvalidParameter(format!("unexpected artifact name {s:?}: {e}"))
                })?;
                (digest, Quality::Approximate(k))
            }
        };
        Ok(Self::new(digest.parse()?, quality))
    }
}
