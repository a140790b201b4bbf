//! External traction perturbations ("loads") applied to the fault.
//!
//! A load adds `amplitude · weight(x) · tfunc(t)` to the background traction,
//! per component `[normal, shear_2, shear_3]`. Loads are independent and
//! additive, so the order they are listed in never matters.
//!
//! # Time Profile
//!
//! With a ramp time `t0 > 0` the load switches on smoothly:
//!
//! ```text
//! tfunc(t) = 0                                  t <= 0
//!          = exp((t - t0)² / (t (t - 2 t0)))    0 < t < t0
//!          = 1                                  t >= t0
//! ```
//!
//! `t0 = 0` applies the load in full from the start.
//!
//! # Example
//!
//! ```
//! use rupture_rs::load::{Footprint, Load, Shape};
//!
//! let load = Load::new(
//!     Footprint::new(Shape::Gaussian, (0.0, 0.0), (2.0, 2.0)),
//!     1.0,
//!     [0.0, 10.0, 0.0],
//! );
//! assert_eq!(load.time_function(0.0), 0.0);
//! assert_eq!(load.time_function(2.0), 1.0);
//! assert_eq!(load.traction_at(0.0, 0.0, 5.0), [0.0, 10.0, 0.0]);
//! ```

mod schedule;
mod shape;

pub use schedule::LoadSchedule;
pub use shape::{Footprint, Shape};

/// A single shaped, time-ramped traction perturbation.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Load {
    /// Where on the fault the load acts
    pub footprint: Footprint,
    /// Ramp-up time (0 for an immediate load)
    pub t0: f64,
    /// Amplitude per component `[normal, shear_2, shear_3]`
    pub amplitude: [f64; 3],
}

impl Load {
    /// Create a new load.
    pub fn new(footprint: Footprint, t0: f64, amplitude: [f64; 3]) -> Self {
        Self {
            footprint,
            t0,
            amplitude,
        }
    }

    /// Uniform load over the whole fault.
    pub fn uniform(t0: f64, amplitude: [f64; 3]) -> Self {
        Self::new(Footprint::everywhere(), t0, amplitude)
    }

    /// Time function in `[0, 1]`.
    pub fn time_function(&self, t: f64) -> f64 {
        let t0 = self.t0;
        if t0 <= 0.0 {
            return 1.0;
        }
        if t <= 0.0 {
            0.0
        } else if t >= t0 {
            1.0
        } else {
            ((t - t0).powi(2) / (t * (t - 2.0 * t0))).exp()
        }
    }

    /// Time derivative of [`time_function`](Self::time_function).
    pub fn time_function_rate(&self, t: f64) -> f64 {
        let t0 = self.t0;
        if t0 <= 0.0 || t <= 0.0 || t >= t0 {
            return 0.0;
        }
        let d = t * (t - 2.0 * t0);
        let g = (t - t0).powi(2) / d;
        // dg/dt = -2 t0² (t - t0) / d²
        let dg = -2.0 * t0 * t0 * (t - t0) / (d * d);
        g.exp() * dg
    }

    /// Whether the load is still ramping at time `t`.
    pub fn is_active(&self, t: f64) -> bool {
        self.t0 > 0.0 && t > 0.0 && t < self.t0
    }

    /// Traction perturbation at fault coordinates and time.
    pub fn traction_at(&self, x1: f64, x2: f64, t: f64) -> [f64; 3] {
        let f = self.footprint.weight(x1, x2) * self.time_function(t);
        self.amplitude.map(|a| a * f)
    }
}
