//! Point indices on the fault surface.

use std::fmt;

use crate::error::{FaultError, Result};

/// Grid point index `(i, j)` on the fault surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointIndex {
    /// Index along the first fault axis
    pub i: usize,
    /// Index along the second fault axis
    pub j: usize,
}

impl PointIndex {
    /// Create a new point index.
    #[inline]
    pub const fn new(i: usize, j: usize) -> Self {
        Self { i, j }
    }

    /// Recover `(i, j)` from a flat row-major index.
    #[inline]
    pub const fn from_flat(k: usize, n2: usize) -> Self {
        Self { i: k / n2, j: k % n2 }
    }

    /// Flat row-major index for a grid with `n2` points along the second axis.
    ///
    /// The point is not checked against the grid; see [`PointIndex::checked_flat`].
    #[inline]
    pub const fn flat(self, n2: usize) -> usize {
        self.i * n2 + self.j
    }

    /// Flat index on an `n1 × n2` grid.
    ///
    /// # Errors
    /// `PointOutOfRange` if `i >= n1` or `j >= n2`.
    #[inline]
    pub fn checked_flat(self, n1: usize, n2: usize) -> Result<usize> {
        if self.i >= n1 || self.j >= n2 {
            return Err(FaultError::PointOutOfRange {
                i: self.i,
                j: self.j,
                n1,
                n2,
            });
        }
        Ok(self.flat(n2))
    }
}

impl fmt::Display for PointIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.i, self.j)
    }
}

impl From<(usize, usize)> for PointIndex {
    #[inline]
    fn from((i, j): (usize, usize)) -> Self {
        Self { i, j }
    }
}
