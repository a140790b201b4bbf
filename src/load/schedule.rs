//! Ordered collection of loads with low-storage Runge-Kutta staging.
//!
//! The committed load traction is advanced with the same 2N-storage scheme as
//! the slip:
//!
//! ```text
//! scale_df(A):  df <- A df
//! calc_df(dt):  df <- df + dt · d/dt Σ loads(x, t_stage)
//! update(B):    traction <- traction + B df
//! ```
//!
//! Immediate loads (`t0 = 0`) have no rate and enter the committed traction
//! directly when they are added.

use std::path::Path;

use tracing::{info, warn};

use super::Load;
use crate::error::Result;
use crate::io::{read_load_file, read_point_load_file};
use crate::types::FaultGrid;

/// Loads acting on one fault, plus their committed and staged tractions.
#[derive(Clone, Debug)]
pub struct LoadSchedule {
    grid: FaultGrid,
    loads: Vec<Load>,
    /// Footprint weight of each load at each point
    weights: Vec<Vec<f64>>,
    /// Committed load traction per component
    traction: [Vec<f64>; 3],
    /// Staged RK increment per component
    df: [Vec<f64>; 3],
    /// Time at which the next `calc_df` evaluates rates
    time: f64,
}

impl LoadSchedule {
    /// Empty schedule for a fault grid.
    pub fn new(grid: &FaultGrid) -> Self {
        let n = grid.n_points();
        Self {
            grid: grid.clone(),
            loads: Vec::new(),
            weights: Vec::new(),
            traction: std::array::from_fn(|_| vec![0.0; n]),
            df: std::array::from_fn(|_| vec![0.0; n]),
            time: 0.0,
        }
    }

    /// Append a load.
    ///
    /// The load's value at the current schedule time is added to the
    /// committed traction; later changes arrive through the RK staging.
    pub fn push(&mut self, load: Load) {
        let weights: Vec<f64> = (0..self.grid.n_points())
            .map(|k| {
                let (x1, x2) = self.grid.coords_flat(k);
                load.footprint.weight(x1, x2)
            })
            .collect();

        let tf = load.time_function(self.time);
        for (c, traction) in self.traction.iter_mut().enumerate() {
            let amp = load.amplitude[c] * tf;
            if amp != 0.0 {
                for (s, w) in traction.iter_mut().zip(&weights) {
                    *s += amp * w;
                }
            }
        }

        self.loads.push(load);
        self.weights.push(weights);
    }

    /// Parse load descriptors from a file and append them in file order.
    ///
    /// Returns the number of loads read.
    ///
    /// # Errors
    /// Any I/O or parse failure; the schedule is left unchanged.
    pub fn read_load(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let loads = read_load_file(path)?;
        if loads.is_empty() {
            warn!(path = %path.display(), "load file declares no loads");
        }
        let n = loads.len();
        for load in loads {
            self.push(load);
        }
        info!(path = %path.display(), n_loads = n, "read loads");
        Ok(n)
    }

    /// Add a static per-point traction perturbation.
    pub fn add_point_loads(&mut self, values: &[Vec<f64>; 3]) -> Result<()> {
        for v in values {
            self.grid.check_len("point load", v.len())?;
        }
        for (c, v) in values.iter().enumerate() {
            for (s, x) in self.traction[c].iter_mut().zip(v) {
                *s += x;
            }
        }
        Ok(())
    }

    /// Read a per-point load file (normal, shear-2, shear-3 blocks) and add it.
    pub fn read_point_load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let values = read_point_load_file(path, self.grid.n_points())?;
        self.add_point_loads(&values)?;
        info!(path = %path.display(), "read point load file");
        Ok(())
    }

    /// Set the stage time used by the next [`calc_df`](Self::calc_df).
    pub fn set_time(&mut self, t: f64) {
        self.time = t;
    }

    /// Current stage time.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Scale the staged buffer: `df <- A df`.
    pub fn scale_df(&mut self, a: f64) {
        for df in &mut self.df {
            for x in df.iter_mut() {
                *x *= a;
            }
        }
    }

    /// Stage `dt` times the load traction rate at the current stage time.
    pub fn calc_df(&mut self, dt: f64) {
        let t = self.time;
        for (load, weights) in self.loads.iter().zip(&self.weights) {
            let rate = load.time_function_rate(t);
            if rate == 0.0 {
                continue;
            }
            for (c, df) in self.df.iter_mut().enumerate() {
                let amp = dt * rate * load.amplitude[c];
                if amp == 0.0 {
                    continue;
                }
                for (x, w) in df.iter_mut().zip(weights) {
                    *x += amp * w;
                }
            }
        }
    }

    /// Commit the staged buffer: `traction <- traction + B df`.
    pub fn update(&mut self, b: f64) {
        for (traction, df) in self.traction.iter_mut().zip(&self.df) {
            for (s, x) in traction.iter_mut().zip(df) {
                *s += b * x;
            }
        }
    }

    /// Committed load traction at flat index `k`.
    #[inline]
    pub fn traction(&self, k: usize) -> [f64; 3] {
        [self.traction[0][k], self.traction[1][k], self.traction[2][k]]
    }

    /// Staged increment at flat index `k`.
    #[inline]
    pub fn staged(&self, k: usize) -> [f64; 3] {
        [self.df[0][k], self.df[1][k], self.df[2][k]]
    }

    /// Number of fault points the schedule covers.
    pub fn n_points(&self) -> usize {
        self.grid.n_points()
    }

    /// Loads in insertion order.
    pub fn loads(&self) -> &[Load] {
        &self.loads
    }

    /// Number of loads.
    pub fn len(&self) -> usize {
        self.loads.len()
    }

    /// Check if there are no loads.
    pub fn is_empty(&self) -> bool {
        self.loads.is_empty()
    }
}
