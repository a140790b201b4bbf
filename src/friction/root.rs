//! Bracketed Newton solver for the friction/radiation-damping balance.
//!
//! Sliding points must satisfy
//!
//! ```text
//! F(v) = phi - eta v - τ(v) = 0,    v ∈ [0, phi/eta]
//! ```
//!
//! where `phi` is the trial shear traction, `eta` the radiation-damping
//! coefficient and `τ(v) ≥ 0` the frictional strength. The bracket is valid
//! whenever the caller has already ruled out sticking (`F(0) = phi - τ(0) > 0`)
//! because `F(phi/eta) = -τ(phi/eta) ≤ 0`.
//!
//! Newton steps are taken while they stay inside the current bracket; otherwise
//! the solver bisects. Convergence is on the residual, `|F| ≤ tol · phi`, and
//! the iteration count is capped. Hitting the cap is an error, never a
//! silently returned velocity.

use tracing::error;

use crate::error::{FaultError, Result};
use crate::types::PointIndex;

/// Safeguarded Newton/bisection root finder.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RootFinder {
    /// Relative residual tolerance
    pub tol: f64,
    /// Hard iteration cap
    pub max_iter: usize,
}

impl Default for RootFinder {
    fn default() -> Self {
        Self {
            tol: 1e-10,
            max_iter: 100,
        }
    }
}

impl RootFinder {
    /// Create a root finder with explicit settings.
    pub fn new(tol: f64, max_iter: usize) -> Self {
        Self { tol, max_iter }
    }

    /// Set the relative tolerance.
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set the iteration cap.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Solve for the slip velocity.
    ///
    /// # Arguments
    /// * `phi` - Trial shear traction magnitude (> 0)
    /// * `eta` - Radiation-damping coefficient (> 0)
    /// * `point` - Grid point, used for error reporting
    /// * `strength` - Returns `(τ(v), dτ/dv)`
    ///
    /// # Errors
    /// - `NonConvergence` if the residual tolerance is not met within `max_iter`
    /// - `NonFinite` if the strength law produces NaN or infinity
    pub fn solve<F>(&self, phi: f64, eta: f64, point: PointIndex, strength: F) -> Result<f64>
    where
        F: Fn(f64) -> (f64, f64),
    {
        let residual = |v: f64| {
            let (tau, dtau) = strength(v);
            // Clamp negative strength but let NaN through to the finiteness check
            let tau = if tau < 0.0 { 0.0 } else { tau };
            (phi - eta * v - tau, -eta - dtau)
        };
        let tol = self.tol * phi;

        let mut lo = 0.0;
        let mut hi = phi / eta;

        // Zero strength at the free-slip velocity ends the search immediately
        let (f_hi, _) = residual(hi);
        if f_hi.abs() <= tol {
            return Ok(hi);
        }

        let mut v = 0.5 * (lo + hi);
        let mut last = f64::INFINITY;

        for _ in 0..self.max_iter {
            let (f, df) = residual(v);
            if !f.is_finite() {
                return Err(FaultError::NonFinite {
                    quantity: "friction residual",
                    i: point.i,
                    j: point.j,
                });
            }
            last = f.abs();
            if last <= tol {
                return Ok(v);
            }

            if f > 0.0 {
                lo = v;
            } else {
                hi = v;
            }

            let newton = v - f / df;
            v = if newton.is_finite() && newton > lo && newton < hi {
                newton
            } else {
                0.5 * (lo + hi)
            };
        }

        error!(
            i = point.i,
            j = point.j,
            residual = last,
            "friction root find hit iteration cap"
        );
        Err(FaultError::NonConvergence {
            i: point.i,
            j: point.j,
            iterations: self.max_iter,
            residual: last,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const P: PointIndex = PointIndex::new(0, 0);

    #[test]
    fn test_constant_strength_one_step() {
        let finder = RootFinder::default();
        let v = finder.solve(10.0, 2.0, P, |_| (4.0, 0.0)).unwrap();
        assert_relative_eq!(v, 3.0, max_relative = 1e-10);
    }

    #[test]
    fn test_zero_strength_is_free_slip() {
        let v = RootFinder::default().solve(6.0, 3.0, P, |_| (0.0, 0.0)).unwrap();
        assert_eq!(v, 2.0);
    }

    #[test]
    fn test_rate_strengthening_law() {
        // τ = c sqrt(v): smooth, increasing, no closed form needed for the check
        let (phi, eta, c) = (5.0, 0.5, 1.3);
        let v = RootFinder::default()
            .solve(phi, eta, P, |v| (c * v.sqrt(), 0.5 * c / v.sqrt().max(1e-300)))
            .unwrap();
        assert_relative_eq!(phi - eta * v, c * v.sqrt(), max_relative = 1e-9);
    }

    #[test]
    fn test_discontinuous_law_hits_cap() {
        // Strength jumps across the root: |F| >= phi/4 everywhere
        let (phi, eta) = (8.0, 1.0);
        let jump = 0.5 * phi / eta;
        let law = |v: f64| {
            if v < jump {
                (0.25 * phi, 0.0)
            } else {
                (0.75 * phi, 0.0)
            }
        };

        let err = RootFinder::new(1e-10, 50).solve(phi, eta, PointIndex::new(2, 3), law);
        match err {
            Err(FaultError::NonConvergence {
                i, j, iterations, ..
            }) => {
                assert_eq!((i, j, iterations), (2, 3, 50));
            }
            other => panic!("expected NonConvergence, got {other:?}"),
        }
    }

    #[test]
    fn test_nan_strength_is_reported() {
        let err = RootFinder::default().solve(1.0, 1.0, P, |_| (f64::NAN, 0.0));
        assert!(matches!(err, Err(FaultError::NonFinite { .. })));
    }
}
