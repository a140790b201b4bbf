//! Fault-surface grid shape and coordinates.

use crate::error::{FaultError, Result};

use super::PointIndex;

/// Shape and in-plane coordinates of the fault surface owned by this process.
///
/// The coordinate system itself belongs to the bulk solver; the interface only
/// needs the position of each point to evaluate loads and parameter patches.
/// A 2D problem is a fault with `n2 == 1`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FaultGrid {
    /// Number of points along the first axis
    pub n1: usize,
    /// Number of points along the second axis
    pub n2: usize,
    /// First in-plane coordinate of each point (flat)
    x1: Vec<f64>,
    /// Second in-plane coordinate of each point (flat)
    x2: Vec<f64>,
}

impl FaultGrid {
    /// Uniformly spaced grid starting at `origin`.
    pub fn uniform(n1: usize, n2: usize, origin: (f64, f64), spacing: (f64, f64)) -> Self {
        let n = n1 * n2;
        let mut x1 = Vec::with_capacity(n);
        let mut x2 = Vec::with_capacity(n);
        for i in 0..n1 {
            for j in 0..n2 {
                x1.push(origin.0 + i as f64 * spacing.0);
                x2.push(origin.1 + j as f64 * spacing.1);
            }
        }
        Self { n1, n2, x1, x2 }
    }

    /// Grid with explicit per-point coordinates, as handed over by the bulk solver.
    ///
    /// # Errors
    /// `ShapeMismatch` if either coordinate array is not `n1 * n2` long.
    pub fn from_coords(n1: usize, n2: usize, x1: Vec<f64>, x2: Vec<f64>) -> Result<Self> {
        let n = n1 * n2;
        if x1.len() != n {
            return Err(FaultError::shape_mismatch("grid x1", n, x1.len()));
        }
        if x2.len() != n {
            return Err(FaultError::shape_mismatch("grid x2", n, x2.len()));
        }
        Ok(Self { n1, n2, x1, x2 })
    }

    /// Total number of points.
    #[inline]
    pub fn n_points(&self) -> usize {
        self.n1 * self.n2
    }

    /// Flat index of a point.
    ///
    /// # Errors
    /// `PointOutOfRange` if the point is not on the grid.
    #[inline]
    pub fn flat(&self, p: PointIndex) -> Result<usize> {
        p.checked_flat(self.n1, self.n2)
    }

    /// Point index of a flat position.
    #[inline]
    pub fn point(&self, k: usize) -> PointIndex {
        PointIndex::from_flat(k, self.n2)
    }

    /// Coordinates of a point.
    #[inline]
    pub fn coords(&self, p: PointIndex) -> Result<(f64, f64)> {
        let k = self.flat(p)?;
        Ok((self.x1[k], self.x2[k]))
    }

    /// Coordinates by flat index.
    #[inline]
    pub fn coords_flat(&self, k: usize) -> (f64, f64) {
        (self.x1[k], self.x2[k])
    }

    /// Check that an array has one entry per point.
    pub fn check_len(&self, what: &'static str, len: usize) -> Result<()> {
        if len != self.n_points() {
            return Err(FaultError::shape_mismatch(what, self.n_points(), len));
        }
        Ok(())
    }
}
