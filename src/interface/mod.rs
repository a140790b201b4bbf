//! Frictional interface boundary solver.
//!
//! At every RK stage the bulk solver hands over the boundary fields on both
//! sides of the fault. For each point the interface:
//!
//! 1. projects them on the outgoing characteristics and builds the welded
//!    (locked) solution;
//! 2. adds background and load tractions to get the trial normal and shear
//!    tractions;
//! 3. keeps the weld if the point is tensile or the trial shear lies inside the
//!    strength envelope;
//! 4. otherwise calls the friction law to get the slip velocity and shear
//!    strength, and rebuilds the side velocities from the characteristics.
//!
//! The normal component is always welded. Points never interact within a solve.
//!
//! # Example
//!
//! ```
//! use rupture_rs::boundary::BoundFields;
//! use rupture_rs::friction::{SlipWeakening, SlipWeakeningParams};
//! use rupture_rs::interface::FrictionInterface;
//! use rupture_rs::material::{ImpedanceField, Material};
//! use rupture_rs::types::FaultGrid;
//!
//! let grid = FaultGrid::uniform(4, 1, (0.0, 0.0), (0.1, 1.0));
//! let impedance = ImpedanceField::uniform(&grid, Material::granite(), Material::granite()).unwrap();
//! let law = SlipWeakening::new(&grid, &SlipWeakeningParams::new(0.677, 0.525, 0.4)).unwrap();
//!
//! let mut iface = FrictionInterface::new(grid, impedance, law)
//!     .unwrap()
//!     .with_background(-120.0, 70.0, 0.0);
//!
//! let b = vec![BoundFields::default(); 4];
//! let resolved = iface.solve_all(&b, &b, 0.0).unwrap();
//! assert_eq!(resolved.len(), 4);
//! assert_eq!(resolved[0].slip_velocity(), [0.0; 3]); // 70 < 0.677 * 120
//! ```

mod config;
mod snapshot;
mod state;

pub use config::{FrictionConfig, InterfaceConfig};
pub use snapshot::{FieldName, InterfaceSnapshot};
pub use state::InterfaceState;

use std::path::Path;

use tracing::{debug, error};

use crate::boundary::{BoundFields, Characteristics, IfFields};
use crate::error::{FaultError, Result};
use crate::friction::{FrictionLaw, FrictionModel, PointContext};
use crate::load::LoadSchedule;
use crate::material::{Impedance, ImpedanceField, radiation_damping};
use crate::types::{FaultGrid, PointIndex};

/// Fault interface with a friction law, loads and persistent state.
#[derive(Clone, Debug)]
pub struct FrictionInterface<L: FrictionLaw = FrictionModel> {
    grid: FaultGrid,
    impedance: ImpedanceField,
    /// Background traction (normal, shear-2, shear-3)
    background: [Vec<f64>; 3],
    law: L,
    loads: LoadSchedule,
    state: InterfaceState,
    /// Memory-variable rate from the last solve
    state_rate: Vec<f64>,
}

impl<L: FrictionLaw> FrictionInterface<L> {
    /// Create an interface with zero background traction and no loads.
    ///
    /// # Errors
    /// `ShapeMismatch` if the impedance field does not cover the grid.
    pub fn new(grid: FaultGrid, impedance: ImpedanceField, law: L) -> Result<Self> {
        grid.check_len("impedance field", impedance.len())?;

        let n = grid.n_points();
        let mut state = InterfaceState::new(grid.n1, grid.n2);
        for k in 0..n {
            state.state[k] = law.initial_state(k);
        }

        Ok(Self {
            loads: LoadSchedule::new(&grid),
            grid,
            impedance,
            background: std::array::from_fn(|_| vec![0.0; n]),
            law,
            state,
            state_rate: vec![0.0; n],
        })
    }

    /// Uniform background traction.
    pub fn with_background(mut self, sn: f64, s2: f64, s3: f64) -> Self {
        for (bg, value) in self.background.iter_mut().zip([sn, s2, s3]) {
            bg.fill(value);
        }
        self.refresh_total_traction();
        self
    }

    /// Per-point background traction.
    ///
    /// # Errors
    /// `ShapeMismatch` if any array is not one value per point.
    pub fn with_background_arrays(mut self, background: [Vec<f64>; 3]) -> Result<Self> {
        for bg in &background {
            self.grid.check_len("background traction", bg.len())?;
        }
        self.background = background;
        self.refresh_total_traction();
        Ok(self)
    }

    /// Replace the load schedule.
    ///
    /// # Errors
    /// `ShapeMismatch` if the schedule was built for a different grid size.
    pub fn with_loads(mut self, loads: LoadSchedule) -> Result<Self> {
        if loads.n_points() != self.grid.n_points() {
            return Err(FaultError::shape_mismatch(
                "load schedule",
                self.grid.n_points(),
                loads.n_points(),
            ));
        }
        self.loads = loads;
        self.refresh_total_traction();
        Ok(self)
    }

    /// Read loads from a file into the schedule.
    pub fn read_load(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let n = self.loads.read_load(path)?;
        self.refresh_total_traction();
        Ok(n)
    }

    /// Fault grid.
    pub fn grid(&self) -> &FaultGrid {
        &self.grid
    }

    /// Friction law.
    pub fn law(&self) -> &L {
        &self.law
    }

    /// Load schedule.
    pub fn loads(&self) -> &LoadSchedule {
        &self.loads
    }

    /// Persistent state.
    pub fn state(&self) -> &InterfaceState {
        &self.state
    }

    /// Resolve one point from the two sides' boundary fields.
    ///
    /// # Errors
    /// - `PointOutOfRange` if `p` is not on the fault
    /// - `NonFinite` for NaN/infinite boundary fields or friction state
    /// - whatever the friction law returns, e.g. `NonConvergence`
    pub fn solve_interface(
        &self,
        b1: &BoundFields,
        b2: &BoundFields,
        p: PointIndex,
        t: f64,
    ) -> Result<IfFields> {
        if !(b1.is_finite() && b2.is_finite()) {
            return Err(non_finite("boundary fields", p));
        }

        let k = self.grid.flat(p)?;
        let (z1, z2) = self.impedance.at(k);
        let iffin = Characteristics::from_sides(b1, b2, z1, z2).welded();

        // Compression positive
        let snc = -(iffin.s1[0] + self.background[0][k] + self.loads.traction(k)[0]);

        self.solve_friction(iffin, snc, z1.zs, z2.zs, p, t)
    }

    /// Enforce the friction envelope on a welded trial solution.
    ///
    /// `z1`, `z2` are the shear impedances. Tensile points and points inside
    /// the envelope get `iffin` back unchanged.
    pub fn solve_friction(
        &self,
        iffin: IfFields,
        snc: f64,
        z1: f64,
        z2: f64,
        p: PointIndex,
        t: f64,
    ) -> Result<IfFields> {
        let k = self.grid.flat(p)?;
        if snc <= 0.0 {
            return Ok(iffin);
        }

        let load = self.loads.traction(k);
        let trial = [
            iffin.s1[1] + self.background[1][k] + load[1],
            iffin.s1[2] + self.background[2][k] + load[2],
        ];
        let phi = trial[0].hypot(trial[1]);

        let ctx = PointContext {
            point: p,
            k,
            slip: self.state.slip[k],
            state: self.state.state[k],
            t,
        };
        if !(ctx.slip.is_finite() && ctx.state.is_finite()) {
            return Err(non_finite("friction state", p));
        }

        let eta = radiation_damping(z1, z2);
        let bc = self.law.solve_fs(phi, eta, snc, &ctx)?;
        if !bc.is_slipping() {
            return Ok(iffin);
        }
        if !(bc.v.is_finite() && bc.s.is_finite()) {
            return Err(non_finite("slip velocity", p));
        }

        // Outgoing characteristics recovered from the weld; the normal
        // component is not rebuilt, so only the shear impedance matters
        let ch = Characteristics::from_sides(
            &iffin.side1(),
            &iffin.side2(),
            Impedance { zp: z1, zs: z1 },
            Impedance { zp: z2, zs: z2 },
        );

        let mut out = iffin;
        for c in 1..3 {
            let s_total = bc.s * trial[c - 1] / phi;
            let s = s_total - self.background[c][k] - load[c];
            let (v1, v2) = ch.side_velocities(c, s);

            out.s1[c] = s;
            out.s2[c] = s;
            out.v1[c] = v1;
            out.v2[c] = v2;
        }

        Ok(out)
    }

    /// Solve every point and record the result in the interface state.
    ///
    /// `b1` and `b2` are flat, one record per point. Returns the resolved
    /// fields for the bulk solver in the same order.
    pub fn solve_all(
        &mut self,
        b1: &[BoundFields],
        b2: &[BoundFields],
        t: f64,
    ) -> Result<Vec<IfFields>> {
        self.check_sides(b1, b2)?;
        self.loads.set_time(t);

        let resolved = (0..self.grid.n_points())
            .map(|k| self.solve_interface(&b1[k], &b2[k], self.grid.point(k), t))
            .collect::<Result<Vec<_>>>()?;

        self.record(&resolved, t);
        Ok(resolved)
    }

    /// Solve every point in parallel and record the result.
    #[cfg(feature = "parallel")]
    pub fn solve_all_parallel(
        &mut self,
        b1: &[BoundFields],
        b2: &[BoundFields],
        t: f64,
    ) -> Result<Vec<IfFields>> {
        use rayon::prelude::*;

        self.check_sides(b1, b2)?;
        self.loads.set_time(t);

        let this = &*self;
        let resolved = (0..this.grid.n_points())
            .into_par_iter()
            .map(|k| this.solve_interface(&b1[k], &b2[k], this.grid.point(k), t))
            .collect::<Result<Vec<_>>>()?;

        self.record(&resolved, t);
        Ok(resolved)
    }

    fn check_sides(&self, b1: &[BoundFields], b2: &[BoundFields]) -> Result<()> {
        self.grid.check_len("side 1 boundary fields", b1.len())?;
        self.grid.check_len("side 2 boundary fields", b2.len())
    }

    /// Store slip velocity, total traction and memory rate from resolved fields.
    fn record(&mut self, resolved: &[IfFields], t: f64) {
        let mut n_slipping = 0usize;
        let mut n_tensile = 0usize;

        for (k, f) in resolved.iter().enumerate() {
            let load = self.loads.traction(k);
            let slip_vel = f.slip_velocity();
            let v = slip_vel[1].hypot(slip_vel[2]);

            self.state.slip_rate[k] = v;
            self.state.slip_rate_comp[0][k] = slip_vel[1];
            self.state.slip_rate_comp[1][k] = slip_vel[2];
            for c in 0..3 {
                self.state.traction[c][k] = f.s1[c] + self.background[c][k] + load[c];
            }

            let ctx = PointContext {
                point: self.grid.point(k),
                k,
                slip: self.state.slip[k],
                state: self.state.state[k],
                t,
            };
            self.state_rate[k] = self.law.state_rate(v, &ctx);

            if v > 0.0 {
                n_slipping += 1;
            }
            if self.state.traction[0][k] >= 0.0 {
                n_tensile += 1;
            }
        }

        self.state.t = t;
        debug!(t, n_slipping, n_tensile, law = self.law.name(), "interface solved");
    }

    /// Rescale all staged RK buffers by `a`.
    pub fn scale_df(&mut self, a: f64) {
        self.state.scale_df(a);
        self.loads.scale_df(a);
    }

    /// Stage `dt` times the rates from the last solve.
    pub fn calc_df(&mut self, dt: f64) {
        self.state.calc_df(dt, &self.state_rate);
        self.loads.calc_df(dt);
    }

    /// Commit the staged buffers with weight `b`.
    pub fn update(&mut self, b: f64) {
        self.state.update(b);
        self.loads.update(b);
    }

    /// Current fields for output.
    pub fn write_fields(&self) -> InterfaceSnapshot {
        self.state.snapshot()
    }

    /// Total traction recorded at construction or by the last solve.
    pub fn traction(&self, p: PointIndex) -> Result<[f64; 3]> {
        let k = self.grid.flat(p)?;
        Ok([
            self.state.traction[0][k],
            self.state.traction[1][k],
            self.state.traction[2][k],
        ])
    }

    /// Cumulative slip magnitude at a point.
    pub fn slip(&self, p: PointIndex) -> Result<f64> {
        Ok(self.state.slip[self.grid.flat(p)?])
    }

    /// Slip velocity magnitude at a point.
    pub fn slip_rate(&self, p: PointIndex) -> Result<f64> {
        Ok(self.state.slip_rate[self.grid.flat(p)?])
    }

    fn refresh_total_traction(&mut self) {
        for k in 0..self.grid.n_points() {
            let load = self.loads.traction(k);
            for c in 0..3 {
                self.state.traction[c][k] = self.background[c][k] + load[c];
            }
        }
    }
}

fn non_finite(quantity: &'static str, p: PointIndex) -> FaultError {
    error!(i = p.i, j = p.j, quantity, "non-finite value on fault");
    FaultError::NonFinite {
        quantity,
        i: p.i,
        j: p.j,
    }
}
