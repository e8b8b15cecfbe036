//! Exact joint histogram by enumerating every ordering of the samples
//!
//! Rather than walking all `n!` orderings one by one, the enumerator walks
//! the tree of ordered prefixes depth-first. A prefix of length `m` is
//! shared by `(n - m)!` orderings, so it is recorded once with that
//! weight. Identical samples are merged into groups: choosing a group with
//! `c` remaining members stands for `c` distinct choices of a literal
//! sample, which multiplies the weight of everything below it by `c`.
//! The resulting counts are exactly those of literal enumeration, where
//! the full table sums to `n * n!`.

use crate::walker::PrefixWalker;
use ratio_core::{
    execute_reduce, CanonicalRequest, Error, ExecutionStrategy, JointHistogram, Result,
};
use tracing::{debug, instrument};

/// `0!, 1!, ..., n!`, or `None` when `n!` does not fit in a `u64`
pub fn factorials(n: usize) -> Option<Vec<u64>> {
    let mut out = Vec::with_capacity(n + 1);
    let mut acc = 1u64;
    out.push(acc);
    for i in 1..=n {
        acc = acc.checked_mul(i as u64)?;
        out.push(acc);
    }
    Some(out)
}

/// Whether `n` samples can be enumerated within `threshold` orderings
///
/// Also requires the table total `n * n!` to be representable.
pub fn exact_feasible(n: usize, threshold: u64) -> bool {
    let mut perm = 1u64;
    for i in 1..=n {
        perm = match perm.checked_mul(i as u64) {
            Some(p) if p <= threshold => p,
            _ => return false,
        };
    }
    perm.checked_mul(n as u64).is_some()
}

/// Full enumeration of sample orderings
#[derive(Debug, Clone, Default)]
pub struct ExactEnumerator {
    execution: ExecutionStrategy,
}

impl ExactEnumerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how first-sample shards are scheduled
    pub fn with_execution(mut self, execution: ExecutionStrategy) -> Self {
        self.execution = execution;
        self
    }

    /// Compute the exact histogram
    #[instrument(skip(self, request), fields(n = request.dimensions().n))]
    pub fn enumerate(&self, request: &CanonicalRequest) -> Result<JointHistogram> {
        let dims = request.dimensions();
        let n = dims.n;
        let fact = factorials(n)
            .filter(|f| f[n].checked_mul(n as u64).is_some())
            .ok_or_else(|| {
                Error::InvalidParameter(format!(
                    "exact enumeration of {n} samples overflows the histogram counters"
                ))
            })?;

        let (lists, counts) = group_identical(request.token_lists());
        debug!(
            "Enumerating {} orderings over {} distinct samples",
            fact[n],
            lists.len()
        );

        let shard = |first: usize| {
            let mut histogram = JointHistogram::for_dimensions(dims);
            let mut walker = PrefixWalker::new(&lists, dims.xx(), dims.yy);
            let mut remaining = counts.clone();
            let weight = remaining[first] as u64;
            remaining[first] -= 1;
            let (x, y) = walker.push(first);
            histogram.add(x, y, weight * fact[n - 1]);
            let mut search = Search {
                walker,
                remaining,
                fact: &fact,
                n,
                histogram,
            };
            search.descend(1, weight);
            search.histogram
        };

        Ok(execute_reduce(
            self.execution,
            lists.len(),
            JointHistogram::for_dimensions(dims),
            shard,
            |mut acc, part| {
                acc += &part;
                acc
            },
        ))
    }
}

/// Collapse identical token lists, keeping first-seen order
fn group_identical(lists: Vec<Vec<usize>>) -> (Vec<Vec<usize>>, Vec<usize>) {
    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut counts: Vec<usize> = Vec::new();
    for list in lists {
        match groups.iter().position(|g| *g == list) {
            Some(i) => counts[i] += 1,
            None => {
                groups.push(list);
                counts.push(1);
            }
        }
    }
    (groups, counts)
}

struct Search<'a> {
    walker: PrefixWalker<'a>,
    remaining: Vec<usize>,
    fact: &'a [u64],
    n: usize,
    histogram: JointHistogram,
}

impl Search<'_> {
    /// Extend a prefix of length `depth` reached by `mult` literal prefixes
    fn descend(&mut self, depth: usize, mult: u64) {
        if depth == self.n {
            return;
        }
        for g in 0..self.remaining.len() {
            let c = self.remaining[g];
            if c == 0 {
                continue;
            }
            let m = mult * c as u64;
            self.remaining[g] -= 1;
            let (x, y) = self.walker.push(g);
            self.histogram.add(x, y, m * self.fact[self.n - depth - 1]);
            self.descend(depth + 1, m);
            self.walker.pop(g);
            self.remaining[g] += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratio_core::{canonicalize, Request, Sample};

    fn canonical(samples: Vec<Sample<&'static str>>) -> CanonicalRequest {
        canonicalize(&Request::new(samples).unwrap())
    }

    #[test]
    fn test_factorials() {
        assert_eq!(factorials(5).unwrap(), vec![1, 1, 2, 6, 24, 120]);
        assert!(factorials(20).is_some());
        assert!(factorials(21).is_none());
    }

    #[test]
    fn test_exact_feasible() {
        assert!(exact_feasible(0, 1));
        assert!(exact_feasible(4, 24));
        assert!(!exact_feasible(4, 23));
        assert!(exact_feasible(7, 100_000));
        assert!(!exact_feasible(9, 100_000));
        // 20! fits but 20 * 20! does not
        assert!(!exact_feasible(20, u64::MAX));
    }

    #[test]
    fn test_single_sample() {
        let h = ExactEnumerator::new()
            .enumerate(&canonical(vec![Sample::new(["a"], ["A"])]))
            .unwrap();
        assert_eq!((h.xx(), h.yy()), (2, 1));
        assert_eq!(h.get(2, 1), 1);
        assert_eq!(h.total(), 1);
        assert_eq!(h.row_total(0), 0);
        assert_eq!(h.row_total(1), 0);
    }

    #[test]
    fn test_two_disjoint_samples() {
        // ({a},{}) and ({},{A}): after one sample x = 1, y is 1 or 0
        let h = ExactEnumerator::new()
            .enumerate(&canonical(vec![Sample::new(["a"], []), Sample::new([], ["A"])]))
            .unwrap();
        assert_eq!(h.row(1), &[1, 1]);
        assert_eq!(h.row(2), &[0, 2]);
        assert_eq!(h.total(), 4);
    }

    #[test]
    fn test_identical_samples_counted_literally() {
        let h = ExactEnumerator::new()
            .enumerate(&canonical(vec![
                Sample::new(["a"], []),
                Sample::new(["a"], []),
                Sample::new(["a"], []),
            ]))
            .unwrap();
        // 3! orderings, 3 prefixes each, all at (1, 1)
        assert_eq!(h.get(1, 1), 18);
        assert_eq!(h.total(), 18);
    }

    #[test]
    fn test_empty_request() {
        let h = ExactEnumerator::new().enumerate(&canonical(vec![])).unwrap();
        assert_eq!((h.xx(), h.yy()), (0, 0));
        assert_eq!(h.total(), 0);
    }

    #[test]
    fn test_group_identical() {
        let (groups, counts) = group_identical(vec![vec![0], vec![1], vec![0]]);
        assert_eq!(groups, vec![vec![0], vec![1]]);
        assert_eq!(counts, vec![2, 1]);
    }
}
