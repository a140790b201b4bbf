//! Williamson 2N-storage Runge-Kutta schemes.
//!
//! Every integrated quantity `q` keeps one extra register `dq`. Stage `m` runs
//!
//! ```text
//! dq <- A[m] dq              (scale_df)
//! dq <- dq + dt · f(q, t + C[m] dt)   (calc_df)
//! q  <- q + B[m] dq          (update)
//! ```
//!
//! so the fault, the loads and the bulk can all be advanced in lockstep by
//! calling the three hooks with the same coefficients.

/// Low-storage Runge-Kutta scheme.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LowStorageRk {
    /// Forward Euler
    Rk1,
    /// Heun's method
    Rk2,
    /// Williamson (1980), 3 stages
    #[default]
    Rk3,
    /// Carpenter & Kennedy (1994), 5 stages
    Rk4,
}

/// Coefficients of one stage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stage {
    /// Register scale
    pub a: f64,
    /// Update weight
    pub b: f64,
    /// Stage time as a fraction of `dt`
    pub c: f64,
}

const RK1_A: [f64; 1] = [0.0];
const RK1_B: [f64; 1] = [1.0];
const RK1_C: [f64; 1] = [0.0];

const RK2_A: [f64; 2] = [0.0, -1.0];
const RK2_B: [f64; 2] = [1.0, 0.5];
const RK2_C: [f64; 2] = [0.0, 1.0];

const RK3_A: [f64; 3] = [0.0, -5.0 / 9.0, -153.0 / 128.0];
const RK3_B: [f64; 3] = [1.0 / 3.0, 15.0 / 16.0, 8.0 / 15.0];
const RK3_C: [f64; 3] = [0.0, 1.0 / 3.0, 3.0 / 4.0];

const RK4_A: [f64; 5] = [
    0.0,
    -567301805773.0 / 1357537059087.0,
    -2404267990393.0 / 2016746695238.0,
    -3550918686646.0 / 2091501179385.0,
    -1275806237668.0 / 842570457699.0,
];
const RK4_B: [f64; 5] = [
    1432997174477.0 / 9575080441755.0,
    5161836677717.0 / 13612068292357.0,
    1720146321549.0 / 2090206949498.0,
    3134564353537.0 / 4481467310338.0,
    2277821191437.0 / 14882151754819.0,
];
const RK4_C: [f64; 5] = [
    0.0,
    1432997174477.0 / 9575080441755.0,
    2526269341429.0 / 6820363962896.0,
    2006345519317.0 / 3224310063776.0,
    2802321613138.0 / 2924317926251.0,
];

impl LowStorageRk {
    /// Scheme of the given order.
    ///
    /// Returns `None` for orders outside 1..=4.
    pub fn from_order(order: usize) -> Option<Self> {
        match order {
            1 => Some(LowStorageRk::Rk1),
            2 => Some(LowStorageRk::Rk2),
            3 => Some(LowStorageRk::Rk3),
            4 => Some(LowStorageRk::Rk4),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LowStorageRk::Rk1 => "ls-rk1",
            LowStorageRk::Rk2 => "ls-rk2",
            LowStorageRk::Rk3 => "ls-rk3",
            LowStorageRk::Rk4 => "ls-rk4",
        }
    }

    pub fn order(&self) -> usize {
        match self {
            LowStorageRk::Rk1 => 1,
            LowStorageRk::Rk2 => 2,
            LowStorageRk::Rk3 => 3,
            LowStorageRk::Rk4 => 4,
        }
    }

    pub fn n_stages(&self) -> usize {
        self.a().len()
    }

    /// Register scale per stage.
    pub fn a(&self) -> &'static [f64] {
        match self {
            LowStorageRk::Rk1 => &RK1_A,
            LowStorageRk::Rk2 => &RK2_A,
            LowStorageRk::Rk3 => &RK3_A,
            LowStorageRk::Rk4 => &RK4_A,
        }
    }

    /// Update weight per stage.
    pub fn b(&self) -> &'static [f64] {
        match self {
            LowStorageRk::Rk1 => &RK1_B,
            LowStorageRk::Rk2 => &RK2_B,
            LowStorageRk::Rk3 => &RK3_B,
            LowStorageRk::Rk4 => &RK4_B,
        }
    }

    /// Stage time fraction per stage.
    pub fn c(&self) -> &'static [f64] {
        match self {
            LowStorageRk::Rk1 => &RK1_C,
            LowStorageRk::Rk2 => &RK2_C,
            LowStorageRk::Rk3 => &RK3_C,
            LowStorageRk::Rk4 => &RK4_C,
        }
    }

    /// Stage coefficients in order.
    pub fn stages(&self) -> impl Iterator<Item = Stage> {
        let (a, b, c) = (self.a(), self.b(), self.c());
        (0..a.len()).map(move |m| Stage {
            a: a[m],
            b: b[m],
            c: c[m],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Integrate `y' = f(y, t)` from 0 to 1 with a scalar 2N register.
    fn integrate(rk: LowStorageRk, n_steps: usize, f: impl Fn(f64, f64) -> f64) -> f64 {
        let dt = 1.0 / n_steps as f64;
        let mut y = 1.0;
        let mut dy = 0.0;
        for n in 0..n_steps {
            let t = n as f64 * dt;
            for s in rk.stages() {
                dy *= s.a;
                dy += dt * f(y, t + s.c * dt);
                y += s.b * dy;
            }
        }
        y
    }

    fn observed_order(rk: LowStorageRk, f: impl Fn(f64, f64) -> f64 + Copy, exact: f64) -> f64 {
        let e1 = (integrate(rk, 10, f) - exact).abs();
        let e2 = (integrate(rk, 20, f) - exact).abs();
        (e1 / e2).log2()
    }

    #[test]
    fn test_coefficient_shapes() {
        for rk in [
            LowStorageRk::Rk1,
            LowStorageRk::Rk2,
            LowStorageRk::Rk3,
            LowStorageRk::Rk4,
        ] {
            assert_eq!(rk.a().len(), rk.b().len());
            assert_eq!(rk.a().len(), rk.c().len());
            assert_eq!(rk.a()[0], 0.0);
            assert_eq!(LowStorageRk::from_order(rk.order()), Some(rk));
        }
        assert_eq!(LowStorageRk::Rk4.n_stages(), 5);
        assert_eq!(LowStorageRk::from_order(5), None);
        assert_eq!(LowStorageRk::default(), LowStorageRk::Rk3);
    }

    #[test]
    fn test_order_on_decay() {
        let exact = (-1.0f64).exp();
        for rk in [
            LowStorageRk::Rk1,
            LowStorageRk::Rk2,
            LowStorageRk::Rk3,
            LowStorageRk::Rk4,
        ] {
            let p = observed_order(rk, |y, _| -y, exact);
            assert!(p > rk.order() as f64 - 0.2, "{}: observed order {p}", rk.name());
        }
    }

    #[test]
    fn test_stage_times_drive_time_dependent_rhs() {
        // y' = cos t, y(1) = 1 + sin 1
        let exact = 1.0 + 1.0f64.sin();
        for rk in [LowStorageRk::Rk2, LowStorageRk::Rk3, LowStorageRk::Rk4] {
            let p = observed_order(rk, |_, t| t.cos(), exact);
            assert!(p > rk.order() as f64 - 0.2, "{}: observed order {p}", rk.name());
        }
    }
}
