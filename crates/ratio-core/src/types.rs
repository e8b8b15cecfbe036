//! Core data model: samples, requests and artifact quality

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// One of the two disjoint token namespaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Universe {
    Zero,
    One,
}

impl Universe {
    pub fn index(self) -> usize {
        match self {
            Universe::Zero => 0,
            Universe::One => 1,
        }
    }
}

/// An unordered pair of token sets, one per universe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample<T: Ord> {
    tokens: [BTreeSet<T>; 2],
}

impl<T: Ord> Default for Sample<T> {
    fn default() -> Self {
        Self {
            tokens: [BTreeSet::new(), BTreeSet::new()],
        }
    }
}

impl<T: Ord> Sample<T> {
    /// Create a sample from the tokens of each universe
    pub fn new<A, B>(universe0: A, universe1: B) -> Self
    where
        A: IntoIterator<Item = T>,
        B: IntoIterator<Item = T>,
    {
        Self {
            tokens: [
                universe0.into_iter().collect(),
                universe1.into_iter().collect(),
            ],
        }
    }

    /// Record one more token occurrence; repeats collapse
    pub fn feed(&mut self, universe: Universe, token: T) {
        self.tokens[universe.index()].insert(token);
    }

    pub fn tokens(&self, universe: Universe) -> &BTreeSet<T> {
        &self.tokens[universe.index()]
    }

    /// True when the sample has no token in either universe
    pub fn is_empty(&self) -> bool {
        self.tokens[0].is_empty() && self.tokens[1].is_empty()
    }
}

/// Distinct-token counts of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Dimensions {
    /// Number of samples
    pub n: usize,
    /// Distinct universe-0 tokens
    pub yy: usize,
    /// Distinct universe-1 tokens
    pub dim1: usize,
}

impl Dimensions {
    pub fn new(n: usize, yy: usize, dim1: usize) -> Self {
        Self { n, yy, dim1 }
    }

    /// Total distinct tokens over both universes
    pub fn xx(&self) -> usize {
        self.yy + self.dim1
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}+{}", self.n, self.yy, self.dim1)
    }
}

/// A sequence of samples whose universes are guaranteed disjoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request<T: Ord> {
    samples: Vec<Sample<T>>,
}

impl<T: Ord + Clone + fmt::Debug> Request<T> {
    /// Create a request, rejecting any token shared between the universes
    pub fn new(samples: Vec<Sample<T>>) -> Result<Self> {
        let request = Self { samples };
        let [zero, one] = request.vocabulary();
        if let Some(token) = zero.intersection(&one).next() {
            return Err(Error::overlap(token));
        }
        Ok(request)
    }

    /// Additionally reject samples without any token
    pub fn require_non_empty(self) -> Result<Self> {
        if let Some(pos) = self.samples.iter().position(Sample::is_empty) {
            return Err(Error::InvalidRequest(format!(
                "sample {pos} has no tokens in either universe"
            )));
        }
        Ok(self)
    }

    pub fn samples(&self) -> &[Sample<T>] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sorted distinct tokens of each universe
    pub fn vocabulary(&self) -> [BTreeSet<T>; 2] {
        let mut vocab = [BTreeSet::new(), BTreeSet::new()];
        for sample in &self.samples {
            for (set, tokens) in vocab.iter_mut().zip(sample.tokens.iter()) {
                set.extend(tokens.iter().cloned());
            }
        }
        vocab
    }

    pub fn dimensions(&self) -> Dimensions {
        let [zero, one] = self.vocabulary();
        Dimensions::new(self.samples.len(), zero.len(), one.len())
    }
}

/// Statistical quality of an artifact
///
/// The derived order ranks every approximation below `Exact`, and
/// approximations by their iteration count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Quality {
    /// Monte-Carlo estimate with the given number of iterations
    Approximate(u64),
    /// Full enumeration of all orderings
    Exact,
}

impl Quality {
    pub fn is_exact(&self) -> bool {
        matches!(self, Quality::Exact)
    }

    /// Whether an artifact of this quality makes a run with `budget` unnecessary
    pub fn satisfies(&self, budget: u64) -> bool {
        match self {
            Quality::Exact => true,
            Quality::Approximate(k) => *k >= budget,
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quality::Exact => write!(f, "exact"),
            Quality::Approximate(k) => write!(f, "approximate({k})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_feed_collapses_repeats() {
        let mut s = Sample::default();
        s.feed(Universe::Zero, "a");
        s.feed(Universe::Zero, "a");
        s.feed(Universe::One, "B");
        assert_eq!(s.tokens(Universe::Zero).len(), 1);
        assert_eq!(s.tokens(Universe::One).len(), 1);
        assert!(!s.is_empty());
    }

    #[test]
    fn test_request_dimensions() {
        let request = Request::new(vec![
            Sample::new(["a", "b"], ["A"]),
            Sample::new(["b", "c"], ["B", "C"]),
        ])
        .unwrap();
        let dims = request.dimensions();
        assert_eq!(dims, Dimensions::new(2, 3, 3));
        assert_eq!(dims.xx(), 6);
    }

    #[test]
    fn test_request_rejects_overlap_across_samples() {
        let err = Request::new(vec![Sample::new(["x"], []), Sample::new([], ["x"])]).unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));

        let err = Request::new(vec![Sample::new(["x"], ["x"])]).unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[test]
    fn test_require_non_empty() {
        let request = Request::new(vec![Sample::new(["a"], []), Sample::default()]).unwrap();
        assert!(request.clone().require_non_empty().is_err());

        let request = Request::new(vec![Sample::new(["a"], [])]).unwrap();
        assert!(request.require_non_empty().is_ok());
    }

    #[test]
    fn test_quality_order() {
        assert!(Quality::Exact > Quality::Approximate(u64::MAX));
        assert!(Quality::Approximate(1000) > Quality::Approximate(500));
        assert!(Quality::Exact.satisfies(1_000_000));
        assert!(Quality::Approximate(1000).satisfies(1000));
        assert!(!Quality::Approximate(999).satisfies(1000));
    }
}
