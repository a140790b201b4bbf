//! Elastic material properties and one-sided impedances.
//!
//! The impedance of a side is `z = ρ c`: P-wave speed for the fault-normal
//! component, S-wave speed for the two shear components.

use crate::error::{FaultError, Result};
use crate::types::FaultGrid;

/// Isotropic elastic material.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Material {
    /// Density
    pub rho: f64,
    /// P-wave speed
    pub cp: f64,
    /// S-wave speed
    pub cs: f64,
}

impl Material {
    /// Create a new material.
    pub fn new(rho: f64, cp: f64, cs: f64) -> Self {
        Self { rho, cp, cs }
    }

    /// Typical crustal rock in MPa-compatible units (g/cm³, km/s).
    pub fn granite() -> Self {
        Self::new(2.67, 6.0, 3.464)
    }

    /// P-wave impedance `ρ cp`.
    #[inline]
    pub fn zp(&self) -> f64 {
        self.rho * self.cp
    }

    /// S-wave impedance `ρ cs`.
    #[inline]
    pub fn zs(&self) -> f64 {
        self.rho * self.cs
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::granite()
    }
}

/// One-sided impedance pair at a single point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Impedance {
    /// Normal (P-wave) impedance
    pub zp: f64,
    /// Shear (S-wave) impedance
    pub zs: f64,
}

impl Impedance {
    /// Impedance for component `c` (0 = normal, 1 and 2 = shear).
    #[inline]
    pub fn component(&self, c: usize) -> f64 {
        if c == 0 { self.zp } else { self.zs }
    }
}

/// Precomputed impedances for both sides at every fault point.
#[derive(Clone, Debug)]
pub struct ImpedanceField {
    side1: Vec<Impedance>,
    side2: Vec<Impedance>,
}

impl ImpedanceField {
    /// Same material on each side everywhere.
    pub fn uniform(grid: &FaultGrid, side1: Material, side2: Material) -> Result<Self> {
        let n = grid.n_points();
        Self::from_materials(grid, &vec![side1; n], &vec![side2; n])
    }

    /// Per-point materials for each side.
    ///
    /// # Errors
    /// - `ShapeMismatch` if either slice is not one entry per point
    /// - `InvalidImpedance` if any impedance is not finite and positive
    pub fn from_materials(grid: &FaultGrid, side1: &[Material], side2: &[Material]) -> Result<Self> {
        grid.check_len("side 1 materials", side1.len())?;
        grid.check_len("side 2 materials", side2.len())?;

        let to_impedance = |k: usize, m: &Material| -> Result<Impedance> {
            let z = Impedance {
                zp: m.zp(),
                zs: m.zs(),
            };
            for value in [z.zp, z.zs] {
                if !(value.is_finite() && value > 0.0) {
                    let p = grid.point(k);
                    return Err(FaultError::InvalidImpedance {
                        i: p.i,
                        j: p.j,
                        value,
                    });
                }
            }
            Ok(z)
        };

        let side1 = side1
            .iter()
            .enumerate()
            .map(|(k, m)| to_impedance(k, m))
            .collect::<Result<Vec<_>>>()?;
        let side2 = side2
            .iter()
            .enumerate()
            .map(|(k, m)| to_impedance(k, m))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { side1, side2 })
    }

    /// Impedances of both sides at flat index `k`.
    #[inline]
    pub fn at(&self, k: usize) -> (Impedance, Impedance) {
        (self.side1[k], self.side2[k])
    }

    /// Number of points covered.
    pub fn len(&self) -> usize {
        self.side1.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.side1.is_empty()
    }
}

/// Radiation-damping coefficient `η = z1 z2 / (z1 + z2)`.
///
/// This is half the harmonic mean of the two impedances.
#[inline]
pub fn radiation_damping(z1: f64, z2: f64) -> f64 {
    z1 * z2 / (z1 + z2)
}
