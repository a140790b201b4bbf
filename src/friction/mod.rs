//! Friction laws for the fault interface.
//!
//! A friction law maps the effective normal stress, the sliding history at a
//! point and the slip velocity to a shear strength. The interface solver only
//! needs one operation from it, [`FrictionLaw::solve_fs`]: given the trial shear
//! traction `phi` and the radiation-damping coefficient `eta`, return the slip
//! velocity and shear traction satisfying
//!
//! ```text
//! s = phi - eta v,    s <= τ(v),    s = τ(v) whenever v > 0
//! ```
//!
//! # Available Laws
//!
//! | Law | Strength | Solve |
//! |-----|----------|-------|
//! | `Frictionless` | 0 | closed form |
//! | `SlipWeakening` | `c0 + μ(U, t) σn` | closed form |
//! | `RateState` (aging / slip) | `σn a asinh(V/2V0 e^{ψ/a})` | root find |
//!
//! The closed set of laws is the [`FrictionModel`] enum, which the interface
//! uses by default. The [`FrictionLaw`] trait is the seam for anything else,
//! including contrived laws in tests.

mod params;
mod rate_state;
mod root;
mod slip_weakening;

pub use params::{ParameterField, Patch};
pub use rate_state::{RateState, RateStateParams, StateEvolution};
pub use root::RootFinder;
pub use slip_weakening::{SlipWeakening, SlipWeakeningParams};

use crate::error::Result;
use crate::types::PointIndex;

/// Resolved scalar pair returned by a friction solve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundChar {
    /// Slip velocity magnitude (>= 0)
    pub v: f64,
    /// Shear traction magnitude (>= 0)
    pub s: f64,
}

impl BoundChar {
    /// Locked point: no slip, shear traction equals the trial value.
    #[inline]
    pub fn stick(phi: f64) -> Self {
        Self { v: 0.0, s: phi }
    }

    /// Whether the point is sliding.
    #[inline]
    pub fn is_slipping(&self) -> bool {
        self.v > 0.0
    }
}

/// Per-point inputs a friction law may depend on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointContext {
    /// Grid point
    pub point: PointIndex,
    /// Flat index of the point
    pub k: usize,
    /// Cumulative slip magnitude
    pub slip: f64,
    /// Constitutive memory variable (ψ for rate-and-state)
    pub state: f64,
    /// Simulation time
    pub t: f64,
}

/// Capability interface of a friction law.
pub trait FrictionLaw: Send + Sync {
    /// Name of this law for logging.
    fn name(&self) -> &'static str;

    /// Shear strength at slip velocity `v` under effective normal stress `snc`.
    ///
    /// Implementations clamp `snc` at zero so tension never produces strength.
    fn strength(&self, snc: f64, v: f64, ctx: &PointContext) -> f64;

    /// Derivative of [`strength`](Self::strength) with respect to `v`.
    fn strength_slope(&self, _snc: f64, _v: f64, _ctx: &PointContext) -> f64 {
        0.0
    }

    /// Root finder settings for the sliding branch.
    fn root_finder(&self) -> RootFinder {
        RootFinder::default()
    }

    /// Rate of change of the memory variable at slip velocity `v`.
    fn state_rate(&self, _v: f64, _ctx: &PointContext) -> f64 {
        0.0
    }

    /// Memory variable at flat index `k` before the first step.
    fn initial_state(&self, _k: usize) -> f64 {
        0.0
    }

    /// Resolve slip velocity and shear traction for trial traction `phi >= 0`.
    ///
    /// Tensile points (`snc <= 0`) and points whose trial traction lies within
    /// the static strength are returned locked without iterating.
    fn solve_fs(&self, phi: f64, eta: f64, snc: f64, ctx: &PointContext) -> Result<BoundChar> {
        if snc <= 0.0 {
            return Ok(BoundChar::stick(phi));
        }
        if phi <= self.strength(snc, 0.0, ctx) {
            return Ok(BoundChar::stick(phi));
        }

        let v = self.root_finder().solve(phi, eta, ctx.point, |v| {
            (
                self.strength(snc, v, ctx),
                self.strength_slope(snc, v, ctx),
            )
        })?;

        Ok(BoundChar {
            v,
            s: (phi - eta * v).max(0.0),
        })
    }
}

/// Zero-strength interface.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Frictionless;

impl FrictionLaw for Frictionless {
    fn name(&self) -> &'static str {
        "frictionless"
    }

    fn strength(&self, _snc: f64, _v: f64, _ctx: &PointContext) -> f64 {
        0.0
    }

    fn solve_fs(&self, phi: f64, eta: f64, snc: f64, _ctx: &PointContext) -> Result<BoundChar> {
        if snc <= 0.0 || phi <= 0.0 {
            return Ok(BoundChar::stick(phi));
        }
        Ok(BoundChar {
            v: phi / eta,
            s: 0.0,
        })
    }
}

/// Closed set of friction laws, chosen when the interface is built.
#[derive(Clone, Debug)]
pub enum FrictionModel {
    Frictionless(Frictionless),
    SlipWeakening(SlipWeakening),
    RateState(RateState),
}

impl FrictionLaw for FrictionModel {
    fn name(&self) -> &'static str {
        match self {
            FrictionModel::Frictionless(f) => f.name(),
            FrictionModel::SlipWeakening(f) => f.name(),
            FrictionModel::RateState(f) => f.name(),
        }
    }

    #[inline]
    fn strength(&self, snc: f64, v: f64, ctx: &PointContext) -> f64 {
        match self {
            FrictionModel::Frictionless(f) => f.strength(snc, v, ctx),
            FrictionModel::SlipWeakening(f) => f.strength(snc, v, ctx),
            FrictionModel::RateState(f) => f.strength(snc, v, ctx),
        }
    }

    #[inline]
    fn strength_slope(&self, snc: f64, v: f64, ctx: &PointContext) -> f64 {
        match self {
            FrictionModel::Frictionless(f) => f.strength_slope(snc, v, ctx),
            FrictionModel::SlipWeakening(f) => f.strength_slope(snc, v, ctx),
            FrictionModel::RateState(f) => f.strength_slope(snc, v, ctx),
        }
    }

    fn root_finder(&self) -> RootFinder {
        match self {
            FrictionModel::Frictionless(f) => f.root_finder(),
            FrictionModel::SlipWeakening(f) => f.root_finder(),
            FrictionModel::RateState(f) => f.root_finder(),
        }
    }

    #[inline]
    fn state_rate(&self, v: f64, ctx: &PointContext) -> f64 {
        match self {
            FrictionModel::Frictionless(f) => f.state_rate(v, ctx),
            FrictionModel::SlipWeakening(f) => f.state_rate(v, ctx),
            FrictionModel::RateState(f) => f.state_rate(v, ctx),
        }
    }

    fn initial_state(&self, k: usize) -> f64 {
        match self {
            FrictionModel::Frictionless(f) => f.initial_state(k),
            FrictionModel::SlipWeakening(f) => f.initial_state(k),
            FrictionModel::RateState(f) => f.initial_state(k),
        }
    }

    #[inline]
    fn solve_fs(&self, phi: f64, eta: f64, snc: f64, ctx: &PointContext) -> Result<BoundChar> {
        match self {
            FrictionModel::Frictionless(f) => f.solve_fs(phi, eta, snc, ctx),
            FrictionModel::SlipWeakening(f) => f.solve_fs(phi, eta, snc, ctx),
            FrictionModel::RateState(f) => f.solve_fs(phi, eta, snc, ctx),
        }
    }
}

impl From<Frictionless> for FrictionModel {
    fn from(f: Frictionless) -> Self {
        FrictionModel::Frictionless(f)
    }
}

impl From<SlipWeakening> for FrictionModel {
    fn from(f: SlipWeakening) -> Self {
        FrictionModel::SlipWeakening(f)
    }
}

impl From<RateState> for FrictionModel {
    fn from(f: RateState) -> Self {
        FrictionModel::RateState(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ctx() -> PointContext {
        PointContext {
            point: PointIndex::new(0, 0),
            k: 0,
            slip: 0.0,
            state: 0.0,
            t: 0.0,
        }
    }

    /// Constant-coefficient Coulomb law relying on the default root-find path.
    struct Coulomb {
        mu: f64,
    }

    impl FrictionLaw for Coulomb {
        fn name(&self) -> &'static str {
            "coulomb"
        }

        fn strength(&self, snc: f64, _v: f64, _ctx: &PointContext) -> f64 {
            self.mu * snc.max(0.0)
        }
    }

    #[test]
    fn test_frictionless_free_slip() {
        let b = Frictionless.solve_fs(6.0, 2.0, 50.0, &ctx()).unwrap();
        assert_eq!(b, BoundChar { v: 3.0, s: 0.0 });
    }

    #[test]
    fn test_tensile_point_passes_trial_through() {
        let law = Coulomb { mu: 0.6 };
        for snc in [0.0, -5.0] {
            let b = law.solve_fs(12.0, 2.0, snc, &ctx()).unwrap();
            assert_eq!(b, BoundChar::stick(12.0));
        }
    }

    #[test]
    fn test_default_solve_satisfies_both_constraints() {
        let law = Coulomb { mu: 0.6 };
        let (phi, eta, snc) = (90.0, 8.0, 120.0);
        let b = law.solve_fs(phi, eta, snc, &ctx()).unwrap();

        assert!(b.is_slipping());
        assert_relative_eq!(b.s, 72.0, max_relative = 1e-10);
        assert_relative_eq!(b.s, phi - eta * b.v, max_relative = 1e-12);
    }

    #[test]
    fn test_stick_inside_envelope() {
        let law = Coulomb { mu: 0.6 };
        let b = law.solve_fs(50.0, 8.0, 120.0, &ctx()).unwrap();
        assert_eq!(b, BoundChar::stick(50.0));
    }

    #[test]
    fn test_model_dispatch_name() {
        let model: FrictionModel = Frictionless.into();
        assert_eq!(model.name(), "frictionless");
    }
}
