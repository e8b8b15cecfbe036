//! Naive reference computation of the exact joint histogram
//!
//! Walks every one of the `n!` orderings literally, rebuilding the set of
//! seen tokens from scratch for each prefix. Only useful for verifying the
//! optimized enumerator on small requests.
//!
//! DO NOT USE IN PRODUCTION - this is for testing only!

use std::collections::HashSet;

/// Brute-force exact histogram over all orderings
pub struct NaiveEnumerator;

impl NaiveEnumerator {
    /// Compute `counts[x][y]` for `samples` given as token lists, where
    /// tokens below `yy` belong to universe 0
    pub fn histogram(samples: &[Vec<usize>], xx: usize, yy: usize) -> Vec<Vec<u64>> {
        let n = samples.len();
        let mut counts = vec![vec![0u64; yy + 1]; xx + 1];
        let mut order: Vec<usize> = (0..n).collect();
        loop {
            let mut seen = HashSet::new();
            for &i in &order {
                seen.extend(samples[i].iter().copied());
                let y = seen.iter().filter(|&&t| t < yy).count();
                counts[seen.len()][y] += 1;
            }
            if !next_permutation(&mut order) {
                break;
            }
        }
        counts
    }
}

/// Advance to the next lexicographic permutation, returning false after the last
fn next_permutation(v: &mut [usize]) -> bool {
    if v.len() < 2 {
        return false;
    }
    let mut i = v.len() - 1;
    while i > 0 && v[i - 1] >= v[i] {
        i -= 1;
    }
    if i == 0 {
        return false;
    }
    let mut j = v.len() - 1;
    while v[j] <= v[i - 1] {
        j -= 1;
    }
    v.swap(i - 1, j);
    v[i..].reverse();
    true
}
