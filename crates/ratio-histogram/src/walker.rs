//! Incremental union of token sets along an ordering of samples

use ratio_core::JointHistogram;

/// Tracks how many distinct tokens, and how many of universe 0, the
/// samples pushed so far cover
///
/// Tokens are indices into `0..xx` with universe 0 occupying `0..yy`.
/// A per-token multiplicity makes `pop` the exact inverse of `push`, so
/// depth-first enumeration can backtrack without rebuilding the sets.
#[derive(Debug, Clone)]
pub struct PrefixWalker<'a> {
    samples: &'a [Vec<usize>],
    yy: usize,
    seen: Vec<u32>,
    x: usize,
    y: usize,
}

impl<'a> PrefixWalker<'a> {
    pub fn new(samples: &'a [Vec<usize>], xx: usize, yy: usize) -> Self {
        Self {
            samples,
            yy,
            seen: vec![0; xx],
            x: 0,
            y: 0,
        }
    }

    /// Current (total distinct, universe-0 distinct) counts
    #[inline]
    pub fn counts(&self) -> (usize, usize) {
        (self.x, self.y)
    }

    /// Add sample `i` to the prefix
    #[inline]
    pub fn push(&mut self, i: usize) -> (usize, usize) {
        for &t in &self.samples[i] {
            if self.seen[t] == 0 {
                self.x += 1;
                if t < self.yy {
                    self.y += 1;
                }
            }
            self.seen[t] += 1;
        }
        (self.x, self.y)
    }

    /// Remove sample `i`, which must be the most recent push not yet popped
    #[inline]
    pub fn pop(&mut self, i: usize) {
        for &t in &self.samples[i] {
            self.seen[t] -= 1;
            if self.seen[t] == 0 {
                self.x -= 1;
                if t < self.yy {
                    self.y -= 1;
                }
            }
        }
    }

    /// Record every prefix of `order` with unit weight, leaving the walker empty
    pub fn walk(&mut self, order: &[usize], histogram: &mut JointHistogram) {
        for &i in order {
            let (x, y) = self.push(i);
            histogram.increment(x, y);
        }
        for &i in order.iter().rev() {
            self.pop(i);
        }
    }
}
