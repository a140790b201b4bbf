//! Regularized rate-and-state friction.
//!
//! Friction coefficient (regularized near `V = 0`):
//!
//! ```text
//! f(V, ψ) = a asinh( V/(2 V0) exp(ψ/a) )
//! ```
//!
//! State evolution:
//!
//! ```text
//! aging:  dψ/dt = (b V0/L) (exp((f0 - ψ)/b) - V/V0)
//! slip:   dψ/dt = -(V/L) (f(V, ψ) - fss(V)),   fss = f0 - (b - a) ln(V/V0)
//! ```
//!
//! Strength is zero at `V = 0`, so every point with positive trial traction
//! slides and the velocity comes from the root finder.

use super::{FrictionLaw, ParameterField, PointContext, RootFinder};
use crate::error::{FaultError, Result};
use crate::types::FaultGrid;

/// State evolution law.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StateEvolution {
    Aging,
    Slip,
}

/// Rate-and-state parameters as spatial fields.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RateStateParams {
    pub evolution: StateEvolution,
    /// Direct effect
    pub a: ParameterField,
    /// Evolution effect
    pub b: ParameterField,
    /// State evolution distance
    pub l: ParameterField,
    /// Reference slip velocity
    pub v0: ParameterField,
    /// Reference friction coefficient
    pub f0: ParameterField,
    /// Initial state variable
    pub psi0: ParameterField,
    /// Root finder for the sliding branch
    pub root: RootFinder,
}

impl RateStateParams {
    /// Uniform parameters.
    pub fn new(evolution: StateEvolution, a: f64, b: f64, l: f64, v0: f64, f0: f64, psi0: f64) -> Self {
        Self {
            evolution,
            a: a.into(),
            b: b.into(),
            l: l.into(),
            v0: v0.into(),
            f0: f0.into(),
            psi0: psi0.into(),
            root: RootFinder::default(),
        }
    }

    /// Replace the direct-effect field.
    pub fn with_a(mut self, a: ParameterField) -> Self {
        self.a = a;
        self
    }

    /// Replace the initial state field.
    pub fn with_psi0(mut self, psi0: ParameterField) -> Self {
        self.psi0 = psi0;
        self
    }

    /// Use custom root finder settings.
    pub fn with_root_finder(mut self, root: RootFinder) -> Self {
        self.root = root;
        self
    }
}

/// Rate-and-state law evaluated on a fault grid.
#[derive(Clone, Debug)]
pub struct RateState {
    evolution: StateEvolution,
    a: Vec<f64>,
    b: Vec<f64>,
    l: Vec<f64>,
    v0: Vec<f64>,
    f0: Vec<f64>,
    psi0: Vec<f64>,
    root: RootFinder,
}

impl RateState {
    /// Evaluate the parameter fields on the grid.
    ///
    /// # Errors
    /// `InvalidConfig` if `a`, `b`, `L` or `V0` is not positive anywhere.
    pub fn new(grid: &FaultGrid, params: &RateStateParams) -> Result<Self> {
        let a = params.a.evaluate(grid);
        let b = params.b.evaluate(grid);
        let l = params.l.evaluate(grid);
        let v0 = params.v0.evaluate(grid);

        for (name, field) in [("a", &a), ("b", &b), ("L", &l), ("V0", &v0)] {
            if let Some(k) = field.iter().position(|&x| !(x > 0.0)) {
                return Err(FaultError::InvalidConfig(format!(
                    "rate-and-state {name} must be positive, got {} at {}",
                    field[k],
                    grid.point(k)
                )));
            }
        }

        Ok(Self {
            evolution: params.evolution,
            a,
            b,
            l,
            v0,
            f0: params.f0.evaluate(grid),
            psi0: params.psi0.evaluate(grid),
            root: params.root,
        })
    }

    /// Friction coefficient `f(V, ψ)` at flat index `k`.
    #[inline]
    pub fn friction_coefficient(&self, k: usize, v: f64, psi: f64) -> f64 {
        let a = self.a[k];
        a * (v / (2.0 * self.v0[k]) * (psi / a).exp()).asinh()
    }

    /// Steady-state friction coefficient at slip velocity `v > 0`.
    #[inline]
    pub fn steady_state_coefficient(&self, k: usize, v: f64) -> f64 {
        self.f0[k] - (self.b[k] - self.a[k]) * (v / self.v0[k]).ln()
    }

    /// Steady-state ψ for the aging law at slip velocity `v > 0`.
    pub fn steady_state_psi(&self, k: usize, v: f64) -> f64 {
        self.f0[k] - self.b[k] * (v / self.v0[k]).ln()
    }
}

impl FrictionLaw for RateState {
    fn name(&self) -> &'static str {
        match self.evolution {
            StateEvolution::Aging => "rate_state_aging",
            StateEvolution::Slip => "rate_state_slip",
        }
    }

    fn strength(&self, snc: f64, v: f64, ctx: &PointContext) -> f64 {
        snc.max(0.0) * self.friction_coefficient(ctx.k, v, ctx.state)
    }

    fn strength_slope(&self, snc: f64, v: f64, ctx: &PointContext) -> f64 {
        let k = ctx.k;
        let a = self.a[k];
        let c = (ctx.state / a).exp() / (2.0 * self.v0[k]);
        let x = c * v;
        snc.max(0.0) * a * c / (1.0 + x * x).sqrt()
    }

    fn root_finder(&self) -> RootFinder {
        self.root
    }

    fn state_rate(&self, v: f64, ctx: &PointContext) -> f64 {
        let k = ctx.k;
        match self.evolution {
            StateEvolution::Aging => {
                self.b[k] * self.v0[k] / self.l[k]
                    * (((self.f0[k] - ctx.state) / self.b[k]).exp() - v / self.v0[k])
            }
            StateEvolution::Slip => {
                if v <= 0.0 {
                    return 0.0;
                }
                let f = self.friction_coefficient(k, v, ctx.state);
                -v / self.l[k] * (f - self.steady_state_coefficient(k, v))
            }
        }
    }

    fn initial_state(&self, k: usize) -> f64 {
        self.psi0[k]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PointIndex;
    use approx::assert_relative_eq;

    fn law(evolution: StateEvolution) -> RateState {
        let grid = FaultGrid::uniform(1, 1, (0.0, 0.0), (1.0, 1.0));
        let params = RateStateParams::new(evolution, 0.008, 0.012, 0.02, 1e-6, 0.6, 0.7);
        RateState::new(&grid, &params).unwrap()
    }

    fn ctx(state: f64) -> PointContext {
        PointContext {
            point: PointIndex::new(0, 0),
            k: 0,
            slip: 0.0,
            state,
            t: 0.0,
        }
    }

    #[test]
    fn test_solve_satisfies_both_constraints() {
        let law = law(StateEvolution::Aging);
        let (phi, eta, snc) = (80.0, 4.0, 120.0);
        let c = ctx(0.7);

        let b = law.solve_fs(phi, eta, snc, &c).unwrap();
        assert!(b.v > 0.0);
        assert_relative_eq!(b.s, phi - eta * b.v, max_relative = 1e-9);
        assert_relative_eq!(b.s, law.strength(snc, b.v, &c), max_relative = 1e-9);
    }

    #[test]
    fn test_slope_matches_finite_difference() {
        let law = law(StateEvolution::Slip);
        let c = ctx(0.65);
        let (snc, v, h) = (50.0, 1e-3, 1e-9);
        let fd = (law.strength(snc, v + h, &c) - law.strength(snc, v - h, &c)) / (2.0 * h);
        assert_relative_eq!(law.strength_slope(snc, v, &c), fd, max_relative = 1e-5);
    }

    #[test]
    fn test_aging_steady_state_has_zero_rate() {
        let law = law(StateEvolution::Aging);
        let v = 1e-3;
        let psi_ss = law.steady_state_psi(0, v);
        assert_relative_eq!(law.state_rate(v, &ctx(psi_ss)), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_slip_law_is_frozen_at_rest() {
        let law = law(StateEvolution::Slip);
        assert_eq!(law.state_rate(0.0, &ctx(0.7)), 0.0);
    }

    #[test]
    fn test_rejects_nonpositive_parameters() {
        let grid = FaultGrid::uniform(1, 1, (0.0, 0.0), (1.0, 1.0));
        let params = RateStateParams::new(StateEvolution::Aging, 0.0, 0.012, 0.02, 1e-6, 0.6, 0.7);
        assert!(matches!(
            RateState::new(&grid, &params),
            Err(FaultError::InvalidConfig(_))
        ));
    }
}
