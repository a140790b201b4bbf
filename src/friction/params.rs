//! Spatially varying friction parameters.
//!
//! A parameter is a uniform base value plus any number of shaped patches,
//! e.g. a low-`μs` nucleation patch or a velocity-strengthening barrier. Fields
//! are evaluated once at construction into one value per fault point.

use crate::load::{Footprint, Shape};
use crate::types::FaultGrid;

/// Additive patch on a parameter field.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Patch {
    pub footprint: Footprint,
    pub amplitude: f64,
}

/// Base value plus shaped patches.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParameterField {
    pub base: f64,
    pub patches: Vec<Patch>,
}

impl ParameterField {
    /// Uniform value everywhere.
    pub fn uniform(base: f64) -> Self {
        Self {
            base,
            patches: Vec::new(),
        }
    }

    /// Add a patch of `amplitude` (added to the base) with the given footprint.
    pub fn with_patch(
        mut self,
        shape: Shape,
        center: (f64, f64),
        length: (f64, f64),
        amplitude: f64,
    ) -> Self {
        self.patches.push(Patch {
            footprint: Footprint::new(shape, center, length),
            amplitude,
        });
        self
    }

    /// Value at fault coordinates.
    pub fn value_at(&self, x1: f64, x2: f64) -> f64 {
        self.patches.iter().fold(self.base, |acc, p| {
            acc + p.amplitude * p.footprint.weight(x1, x2)
        })
    }

    /// Evaluate at every grid point.
    pub fn evaluate(&self, grid: &FaultGrid) -> Vec<f64> {
        (0..grid.n_points())
            .map(|k| {
                let (x1, x2) = grid.coords_flat(k);
                self.value_at(x1, x2)
            })
            .collect()
    }
}

impl From<f64> for ParameterField {
    fn from(base: f64) -> Self {
        Self::uniform(base)
    }
}
