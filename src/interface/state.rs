//! Persistent per-point interface arrays and their RK buffers.

use super::snapshot::InterfaceSnapshot;

/// Slip, slip velocity, tractions and friction memory at every point.
///
/// All arrays are owned, flat and sized once at construction. Slip and the
/// memory variable only change in [`update`](Self::update); slip velocity and
/// tractions are overwritten by each interface solve.
#[derive(Clone, Debug)]
pub struct InterfaceState {
    pub(crate) n1: usize,
    pub(crate) n2: usize,
    /// Cumulative slip magnitude
    pub(crate) slip: Vec<f64>,
    /// Cumulative slip components (shear-2, shear-3)
    pub(crate) slip_comp: [Vec<f64>; 2],
    /// Slip velocity magnitude
    pub(crate) slip_rate: Vec<f64>,
    /// Slip velocity components (shear-2, shear-3)
    pub(crate) slip_rate_comp: [Vec<f64>; 2],
    /// Total traction (normal, shear-2, shear-3)
    pub(crate) traction: [Vec<f64>; 3],
    /// Friction memory variable
    pub(crate) state: Vec<f64>,
    /// Staged slip-magnitude increment
    pub(crate) du: Vec<f64>,
    /// Staged slip-component increments
    pub(crate) dux: [Vec<f64>; 2],
    /// Staged memory-variable increment
    pub(crate) dstate: Vec<f64>,
    /// Time of the last solve
    pub(crate) t: f64,
}

impl InterfaceState {
    /// Zeroed state for an `n1 × n2` fault.
    pub fn new(n1: usize, n2: usize) -> Self {
        let n = n1 * n2;
        Self {
            n1,
            n2,
            slip: vec![0.0; n],
            slip_comp: [vec![0.0; n], vec![0.0; n]],
            slip_rate: vec![0.0; n],
            slip_rate_comp: [vec![0.0; n], vec![0.0; n]],
            traction: [vec![0.0; n], vec![0.0; n], vec![0.0; n]],
            state: vec![0.0; n],
            du: vec![0.0; n],
            dux: [vec![0.0; n], vec![0.0; n]],
            dstate: vec![0.0; n],
            t: 0.0,
        }
    }

    /// Number of points.
    pub fn n_points(&self) -> usize {
        self.slip.len()
    }

    /// `du <- A du` (and the component and memory buffers).
    pub fn scale_df(&mut self, a: f64) {
        let buffers = std::iter::once(&mut self.du)
            .chain(self.dux.iter_mut())
            .chain(std::iter::once(&mut self.dstate));
        for buf in buffers {
            for x in buf.iter_mut() {
                *x *= a;
            }
        }
    }

    /// Stage `dt` times the current slip velocity and memory rates.
    pub fn calc_df(&mut self, dt: f64, state_rate: &[f64]) {
        for k in 0..self.n_points() {
            self.du[k] += dt * self.slip_rate[k];
            self.dux[0][k] += dt * self.slip_rate_comp[0][k];
            self.dux[1][k] += dt * self.slip_rate_comp[1][k];
            self.dstate[k] += dt * state_rate[k];
        }
    }

    /// Commit the B-weighted buffers into slip and memory.
    pub fn update(&mut self, b: f64) {
        for k in 0..self.n_points() {
            self.slip[k] += b * self.du[k];
            self.slip_comp[0][k] += b * self.dux[0][k];
            self.slip_comp[1][k] += b * self.dux[1][k];
            self.state[k] += b * self.dstate[k];
        }
    }

    /// Copy all fields into a snapshot.
    pub fn snapshot(&self) -> InterfaceSnapshot {
        InterfaceSnapshot::new(
            self.n1,
            self.n2,
            self.t,
            [
                self.slip.clone(),
                self.slip_comp[0].clone(),
                self.slip_comp[1].clone(),
                self.slip_rate.clone(),
                self.slip_rate_comp[0].clone(),
                self.slip_rate_comp[1].clone(),
                self.traction[0].clone(),
                self.traction[1].clone(),
                self.traction[2].clone(),
                self.state.clone(),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::FieldName;
    use approx::assert_relative_eq;

    #[test]
    fn test_forward_euler_slip() {
        let mut state = InterfaceState::new(2, 1);
        state.slip_rate = vec![2.0, 0.0];
        state.slip_rate_comp[0] = vec![2.0, 0.0];
        let rates = vec![0.5, 0.0];

        for _ in 0..10 {
            state.scale_df(0.0);
            state.calc_df(0.1, &rates);
            state.update(1.0);
        }

        assert_relative_eq!(state.slip[0], 2.0, max_relative = 1e-12);
        assert_relative_eq!(state.slip_comp[0][0], 2.0, max_relative = 1e-12);
        assert_relative_eq!(state.state[0], 0.5, max_relative = 1e-12);
        assert_eq!(state.slip[1], 0.0);
    }

    #[test]
    fn test_snapshot_layout() {
        let mut state = InterfaceState::new(2, 2);
        state.traction[0][3] = -120.0;
        let snap = state.snapshot();
        assert_eq!(snap.field(FieldName::NormalStress), &[0.0, 0.0, 0.0, -120.0]);
        assert_eq!(snap.n_points(), 4);
    }
}
