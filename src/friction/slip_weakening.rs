//! Linear slip-weakening friction with optional forced (time-weakening) rupture.
//!
//! ```text
//! μ(U, t) = μs - (μs - μd) min(max(U/dc, w(t)), 1)
//! w(t)    = (t - trup)/tc   for t >= trup, else 0
//! τ       = c0 + μ max(σn, 0)
//! ```
//!
//! Strength does not depend on slip velocity, so the sliding branch has the
//! closed form `v = (phi - τ)/η`, `s = τ`.

use super::{BoundChar, FrictionLaw, ParameterField, PointContext};
use crate::error::{FaultError, Result};
use crate::types::FaultGrid;

/// Slip-weakening parameters as spatial fields.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlipWeakeningParams {
    /// Static friction coefficient
    pub mus: ParameterField,
    /// Dynamic friction coefficient
    pub mud: ParameterField,
    /// Critical slip distance
    pub dc: ParameterField,
    /// Cohesion
    pub c0: ParameterField,
    /// Forced rupture time; `None` disables time weakening
    pub trup: Option<ParameterField>,
    /// Time-weakening duration
    pub tc: ParameterField,
}

impl SlipWeakeningParams {
    /// Uniform parameters without cohesion or forced rupture.
    pub fn new(mus: f64, mud: f64, dc: f64) -> Self {
        Self {
            mus: mus.into(),
            mud: mud.into(),
            dc: dc.into(),
            c0: 0.0.into(),
            trup: None,
            tc: 0.0.into(),
        }
    }

    /// Set the cohesion field.
    pub fn with_cohesion(mut self, c0: impl Into<ParameterField>) -> Self {
        self.c0 = c0.into();
        self
    }

    /// Force weakening starting at `trup` over duration `tc`.
    pub fn with_forced_rupture(
        mut self,
        trup: impl Into<ParameterField>,
        tc: impl Into<ParameterField>,
    ) -> Self {
        self.trup = Some(trup.into());
        self.tc = tc.into();
        self
    }

    /// Replace the static friction field (e.g. to add a nucleation patch).
    pub fn with_mus(mut self, mus: ParameterField) -> Self {
        self.mus = mus;
        self
    }
}

/// Slip-weakening law evaluated on a fault grid.
#[derive(Clone, Debug)]
pub struct SlipWeakening {
    mus: Vec<f64>,
    mud: Vec<f64>,
    dc: Vec<f64>,
    c0: Vec<f64>,
    trup: Vec<f64>,
    tc: Vec<f64>,
}

impl SlipWeakening {
    /// Evaluate the parameter fields on the grid.
    ///
    /// # Errors
    /// `InvalidConfig` if any `dc` is not positive.
    pub fn new(grid: &FaultGrid, params: &SlipWeakeningParams) -> Result<Self> {
        let dc = params.dc.evaluate(grid);
        if let Some(k) = dc.iter().position(|&d| !(d > 0.0)) {
            return Err(FaultError::InvalidConfig(format!(
                "slip-weakening distance must be positive, got {} at {}",
                dc[k],
                grid.point(k)
            )));
        }

        Ok(Self {
            mus: params.mus.evaluate(grid),
            mud: params.mud.evaluate(grid),
            dc,
            c0: params.c0.evaluate(grid),
            trup: match &params.trup {
                Some(trup) => trup.evaluate(grid),
                None => vec![f64::INFINITY; grid.n_points()],
            },
            tc: params.tc.evaluate(grid),
        })
    }

    /// Friction coefficient after slip `slip` at time `t`.
    pub fn friction_coefficient(&self, k: usize, slip: f64, t: f64) -> f64 {
        let slip_frac = slip / self.dc[k];
        let time_frac = if t >= self.trup[k] {
            if self.tc[k] > 0.0 {
                (t - self.trup[k]) / self.tc[k]
            } else {
                1.0
            }
        } else {
            0.0
        };
        let w = slip_frac.max(time_frac).min(1.0);
        self.mus[k] - (self.mus[k] - self.mud[k]) * w
    }
}

impl FrictionLaw for SlipWeakening {
    fn name(&self) -> &'static str {
        "slip_weakening"
    }

    fn strength(&self, snc: f64, _v: f64, ctx: &PointContext) -> f64 {
        let mu = self.friction_coefficient(ctx.k, ctx.slip, ctx.t);
        (self.c0[ctx.k] + mu * snc.max(0.0)).max(0.0)
    }

    fn solve_fs(&self, phi: f64, eta: f64, snc: f64, ctx: &PointContext) -> Result<BoundChar> {
        if snc <= 0.0 {
            return Ok(BoundChar::stick(phi));
        }
        let tau = self.strength(snc, 0.0, ctx);
        if phi <= tau {
            return Ok(BoundChar::stick(phi));
        }
        Ok(BoundChar {
            v: (phi - tau) / eta,
            s: tau,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PointIndex;
    use approx::assert_relative_eq;

    fn ctx(slip: f64, t: f64) -> PointContext {
        PointContext {
            point: PointIndex::new(0, 0),
            k: 0,
            slip,
            state: 0.0,
            t,
        }
    }

    fn single_point(params: SlipWeakeningParams) -> SlipWeakening {
        let grid = FaultGrid::uniform(1, 1, (0.0, 0.0), (1.0, 1.0));
        SlipWeakening::new(&grid, &params).unwrap()
    }

    #[test]
    fn test_weakening_curve() {
        let law = single_point(SlipWeakeningParams::new(0.677, 0.525, 0.4));
        assert_relative_eq!(law.friction_coefficient(0, 0.0, 0.0), 0.677);
        assert_relative_eq!(law.friction_coefficient(0, 0.2, 0.0), 0.601);
        assert_relative_eq!(law.friction_coefficient(0, 1.0, 0.0), 0.525);
    }

    #[test]
    fn test_forced_rupture() {
        let law = single_point(SlipWeakeningParams::new(0.6, 0.4, 1.0).with_forced_rupture(1.0, 0.5));
        assert_relative_eq!(law.friction_coefficient(0, 0.0, 0.5), 0.6);
        assert_relative_eq!(law.friction_coefficient(0, 0.0, 1.25), 0.5);
        assert_relative_eq!(law.friction_coefficient(0, 0.0, 3.0), 0.4);
    }

    #[test]
    fn test_forced_rupture_off_by_default() {
        let params = SlipWeakeningParams::new(0.6, 0.4, 1.0);
        assert_eq!(params.trup, None);
        let law = single_point(params);
        assert_relative_eq!(law.friction_coefficient(0, 0.0, 1e12), 0.6);
    }

    #[test]
    fn test_sliding_branch_is_exact() {
        let law = single_point(SlipWeakeningParams::new(0.6, 0.5, 0.4));
        let (phi, eta, snc) = (81.6, 10.0, 120.0);
        let b = law.solve_fs(phi, eta, snc, &ctx(0.0, 0.0)).unwrap();

        let tau_s = 0.6 * 120.0;
        assert_eq!(b.s, tau_s);
        assert_relative_eq!(b.v, (phi - tau_s) / eta);
    }

    #[test]
    fn test_cohesion_holds_at_zero_normal_stress() {
        // Cohesion is a strength, but tensile points are passed through
        let law = single_point(SlipWeakeningParams::new(0.6, 0.5, 0.4).with_cohesion(5.0));
        let b = law.solve_fs(3.0, 1.0, 1e-3, &ctx(0.0, 0.0)).unwrap();
        assert_eq!(b, BoundChar::stick(3.0));
    }

    #[test]
    fn test_rejects_nonpositive_dc() {
        let grid = FaultGrid::uniform(2, 1, (0.0, 0.0), (1.0, 1.0));
        let err = SlipWeakening::new(&grid, &SlipWeakeningParams::new(0.6, 0.5, 0.0));
        assert!(matches!(err, Err(FaultError::InvalidConfig(_))));
    }
}
