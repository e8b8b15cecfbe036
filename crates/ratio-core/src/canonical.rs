//! Canonical, order-independent encoding of requests
//!
//! Every token is replaced by its rank in the sorted vocabulary of its
//! universe, each sample's rank lists are sorted, and the samples
//! themselves are sorted. The resulting text is hashed to obtain the
//! request digest, so two requests holding the same multiset of samples
//! share a digest no matter how the samples were ordered or labelled.

use crate::{Digest, Dimensions, Error, Request, Result, Universe};
use std::collections::BTreeMap;
use std::fmt::{self, Debug, Write as _};

/// Terminator of each universe's index list in the text form
const LIST_END: i64 = -1;

/// One sample with tokens replaced by per-universe ranks
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanonicalSample {
    /// Ascending ranks in the universe-0 vocabulary
    pub universe0: Vec<u32>,
    /// Ascending ranks in the universe-1 vocabulary
    pub universe1: Vec<u32>,
}

impl CanonicalSample {
    /// Ranks of both universes in one index space, universe 1 shifted by `yy`
    pub fn combined(&self, yy: usize) -> Vec<usize> {
        self.universe0
            .iter()
            .map(|&i| i as usize)
            .chain(self.universe1.iter().map(|&i| i as usize + yy))
            .collect()
    }
}

/// A request in canonical form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRequest {
    dims: Dimensions,
    samples: Vec<CanonicalSample>,
}

/// Canonicalize a request
pub fn canonicalize<T: Ord + Clone + Debug>(request: &Request<T>) -> CanonicalRequest {
    CanonicalRequest::from_request(request)
}

impl CanonicalRequest {
    pub fn from_request<T: Ord + Clone + Debug>(request: &Request<T>) -> Self {
        let vocab = request.vocabulary();
        let ranks: Vec<BTreeMap<&T, u32>> = vocab
            .iter()
            .map(|set| set.iter().enumerate().map(|(i, t)| (t, i as u32)).collect())
            .collect();

        let mut samples: Vec<CanonicalSample> = request
            .samples()
            .iter()
            .map(|sample| {
                let rank_of = |universe: Universe| -> Vec<u32> {
                    let map = &ranks[universe.index()];
                    // BTreeSet iteration is sorted and ranks preserve order
                    sample.tokens(universe).iter().map(|t| map[t]).collect()
                };
                CanonicalSample {
                    universe0: rank_of(Universe::Zero),
                    universe1: rank_of(Universe::One),
                }
            })
            .collect();
        samples.sort();

        Self {
            dims: Dimensions::new(samples.len(), vocab[0].len(), vocab[1].len()),
            samples,
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    pub fn samples(&self) -> &[CanonicalSample] {
        &self.samples
    }

    /// Token lists in the combined index space `0..xx`
    pub fn token_lists(&self) -> Vec<Vec<usize>> {
        self.samples
            .iter()
            .map(|s| s.combined(self.dims.yy))
            .collect()
    }

    /// The canonical text as bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }

    /// SHA-256 of the canonical text
    pub fn digest(&self) -> Digest {
        Digest::of(&self.to_bytes())
    }

    /// Parse the canonical text form
    ///
    /// Like a stream reader, any ASCII whitespace separates values; line
    /// structure is not significant.
    pub fn parse(text: &str) -> Result<Self> {
        let mut values = text.split_ascii_whitespace().map(|tok| {
            tok.parse::<i64>()
                .map_err(|e| Error::InvalidRequest(format!("bad integer {tok:?}: {e}")))
        });
        let mut header = || -> Result<usize> {
            let v = values
                .next()
                .ok_or_else(|| Error::InvalidRequest("truncated header".to_string()))??;
            usize::try_from(v)
                .map_err(|_| Error::InvalidRequest(format!("negative header value {v}")))
        };
        let n = header()?;
        let yy = header()?;
        let dim1 = header()?;

        let mut read_list = |range: usize| -> Result<Vec<u32>> {
            let mut list = Vec::new();
            loop {
                let v = values
                    .next()
                    .ok_or_else(|| Error::InvalidRequest("truncated sample list".to_string()))??;
                if v == LIST_END {
                    return Ok(list);
                }
                if v < 0 || v as usize >= range {
                    return Err(Error::InvalidRequest(format!(
                        "index {v} outside universe of size {range}"
                    )));
                }
                list.push(v as u32);
            }
        };

        let mut samples = Vec::with_capacity(n);
        for _ in 0..n {
            let universe0 = read_list(yy)?;
            let universe1 = read_list(dim1)?;
            samples.push(CanonicalSample {
                universe0,
                universe1,
            });
        }
        if values.next().is_some() {
            return Err(Error::InvalidRequest(
                "trailing data after last sample".to_string(),
            ));
        }

        Ok(Self {
            dims: Dimensions::new(n, yy, dim1),
            samples,
        })
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, list: &[u32]) -> fmt::Result {
    for i in list {
        write!(f, "{i} ")?;
    }
    write!(f, "{LIST_END}")
}

impl fmt::Display for CanonicalRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {} {}", self.dims.n, self.dims.yy, self.dims.dim1)?;
        for sample in &self.samples {
            write_list(f, &sample.universe0)?;
            f.write_char(' ')?;
            write_list(f, &sample.universe1)?;
            f.write_char('\n')?;
        }
        Ok(())
    }
}
