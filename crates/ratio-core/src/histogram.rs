//! Joint histogram of (total distinct, universe-0 distinct) counts

use crate::{Dimensions, Error, Result};
use std::fmt;
use std::ops::AddAssign;

/// Rectangular table of counts indexed by `x` in `0..=xx` and `y` in `0..=yy`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JointHistogram {
    xx: usize,
    yy: usize,
    /// Row-major, `xx + 1` rows of `yy + 1` counts
    counts: Vec<u64>,
}

impl JointHistogram {
    /// Create an all-zero histogram
    pub fn zeros(xx: usize, yy: usize) -> Self {
        Self {
            xx,
            yy,
            counts: vec![0; (xx + 1) * (yy + 1)],
        }
    }

    /// All-zero histogram shaped for a request
    pub fn for_dimensions(dims: Dimensions) -> Self {
        Self::zeros(dims.xx(), dims.yy)
    }

    /// Build from decoded rows, checking the shape
    pub fn from_rows(xx: usize, yy: usize, rows: Vec<Vec<u64>>) -> Result<Self> {
        if rows.len() != xx + 1 {
            return Err(Error::size_mismatch(xx + 1, rows.len(), "histogram rows"));
        }
        let mut counts = Vec::with_capacity((xx + 1) * (yy + 1));
        for row in rows {
            if row.len() != yy + 1 {
                return Err(Error::size_mismatch(yy + 1, row.len(), "histogram row"));
            }
            counts.extend(row);
        }
        Ok(Self { xx, yy, counts })
    }

    pub fn xx(&self) -> usize {
        self.xx
    }

    pub fn yy(&self) -> usize {
        self.yy
    }

    /// Width of each row (`yy + 1`)
    pub fn width(&self) -> usize {
        self.yy + 1
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u64 {
        self.counts[x * self.width() + y]
    }

    #[inline]
    pub fn add(&mut self, x: usize, y: usize, weight: u64) {
        let w = self.width();
        self.counts[x * w + y] += weight;
    }

    #[inline]
    pub fn increment(&mut self, x: usize, y: usize) {
        self.add(x, y, 1);
    }

    pub fn row(&self, x: usize) -> &[u64] {
        let w = self.width();
        &self.counts[x * w..(x + 1) * w]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u64]> {
        self.counts.chunks_exact(self.width())
    }

    pub fn row_total(&self, x: usize) -> u64 {
        self.row(x).iter().sum()
    }

    /// Sum over the whole table
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Row divided by its total; all-zero rows stay zero
    pub fn normalized_row(&self, x: usize) -> Vec<f64> {
        let row = self.row(x);
        let total = self.row_total(x);
        if total == 0 {
            return vec![0.0; row.len()];
        }
        row.iter().map(|&v| v as f64 / total as f64).collect()
    }

    /// Accumulate another histogram of the same shape
    pub fn merge(&mut self, other: &JointHistogram) -> Result<()> {
        if self.xx != other.xx || self.yy != other.yy {
            return Err(Error::InvalidParameter(format!(
                "cannot merge {}x{} histogram into {}x{}",
                other.xx, other.yy, self.xx, self.yy
            )));
        }
        for (a, b) in self.counts.iter_mut().zip(&other.counts) {
            *a += b;
        }
        Ok(())
    }
}

impl AddAssign<&JointHistogram> for JointHistogram {
    /// Shapes must match; shard reductions always combine like histograms
    fn add_assign(&mut self, other: &JointHistogram) {
        debug_assert_eq!((self.xx, self.yy), (other.xx, other.yy));
        for (a, b) in self.counts.iter_mut().zip(&other.counts) {
            *a += b;
        }
    }
}

impl fmt::Display for JointHistogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "JointHistogram(xx={}, yy={}, total={})",
            self.xx,
            self.yy,
            self.total()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_and_access() {
        let mut h = JointHistogram::zeros(2, 1);
        assert_eq!(h.rows().count(), 3);
        h.increment(2, 1);
        h.add(1, 0, 4);
        assert_eq!(h.get(2, 1), 1);
        assert_eq!(h.row(1), &[4, 0]);
        assert_eq!(h.row_total(1), 4);
        assert_eq!(h.total(), 5);
        assert_eq!(h.normalized_row(1), vec![1.0, 0.0]);
        assert_eq!(h.normalized_row(0), vec![0.0, 0.0]);
    }

    #[test]
    fn test_from_rows_checks_shape() {
        assert!(JointHistogram::from_rows(1, 1, vec![vec![0, 1], vec![2, 3]]).is_ok());
        assert!(JointHistogram::from_rows(1, 1, vec![vec![0, 1]]).is_err());
        assert!(JointHistogram::from_rows(1, 1, vec![vec![0], vec![2, 3]]).is_err());
    }

    #[test]
    fn test_merge() {
        let mut a = JointHistogram::zeros(1, 1);
        let mut b = JointHistogram::zeros(1, 1);
        a.increment(0, 0);
        b.increment(0, 0);
        b.increment(1, 1);
        a.merge(&b).unwrap();
        assert_eq!(a.get(0, 0), 2);
        assert_eq!(a.get(1, 1), 1);

        let c = JointHistogram::zeros(2, 1);
        assert!(a.merge(&c).is_err());

        a += &b;
        assert_eq!(a.total(), 5);
    }
}
