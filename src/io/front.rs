//! Rupture-front times in the SCEC code-verification contour-plot format.
//!
//! # File Format
//!
//! ```text
//! # problem=tpv5
//! # author=
//! # date=26/10/15
//! # code=rupture-rs
//! # version=0.1.0
//! # element_size=100 m
//! # Column #1 = horizontal coordinate, distance along strike (m)
//! # Column #2 = vertical coordinate, distance down-dip (m)
//! # Column #3 = rupture time (s)
//! #
//! j k t
//! #
//! -1.500000E+04 0.000000E+00 1.000000E+09
//! ```
//!
//! Fault coordinates are taken in km and written in m. Rows run over `i`
//! outer and `j` inner. Points that never ruptured are written with time
//! `1E+09`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::station::{ScecHeader, sci};
use crate::error::{FaultError, Result};
use crate::interface::{FieldName, InterfaceSnapshot};
use crate::types::{FaultGrid, PointIndex};

/// Slip rate (m/s) above which a point counts as ruptured.
pub const DEFAULT_FRONT_THRESHOLD: f64 = 1e-3;

/// Time written for points that never ruptured.
const NEVER_RUPTURED: f64 = 1.0e9;

/// First time each fault point slips faster than a threshold.
#[derive(Clone, Debug)]
pub struct FrontRecorder {
    header: ScecHeader,
    threshold: f64,
    n1: usize,
    n2: usize,
    /// Along-strike coordinate per point (km)
    x1: Vec<f64>,
    /// Down-dip coordinate per point (km)
    x2: Vec<f64>,
    /// Rupture time per point, negative until ruptured
    times: Vec<f64>,
}

impl FrontRecorder {
    /// Front on `grid` with the default slip-rate threshold.
    ///
    /// # Errors
    /// `InvalidConfig` if the depth sign is not ±1.
    pub fn new(grid: &FaultGrid, header: ScecHeader) -> Result<Self> {
        header.validate()?;
        let n = grid.n_points();
        let (x1, x2): (Vec<f64>, Vec<f64>) = (0..n).map(|k| grid.coords_flat(k)).unzip();
        Ok(Self {
            header,
            threshold: DEFAULT_FRONT_THRESHOLD,
            n1: grid.n1,
            n2: grid.n2,
            x1,
            x2,
            times: vec![-1.0; n],
        })
    }

    /// Use a different slip-rate threshold.
    ///
    /// # Errors
    /// `InvalidConfig` unless the threshold is finite and non-negative.
    pub fn with_threshold(mut self, threshold: f64) -> Result<Self> {
        if !(threshold.is_finite() && threshold >= 0.0) {
            return Err(FaultError::InvalidConfig(format!(
                "front threshold must be finite and non-negative, got {threshold}"
            )));
        }
        self.threshold = threshold;
        Ok(self)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Number of points tracked.
    pub fn n_points(&self) -> usize {
        self.times.len()
    }

    /// Rupture time per point, `-1` where the point has not ruptured.
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Rupture time at a point, `None` if it has not ruptured.
    pub fn rupture_time(&self, p: PointIndex) -> Result<Option<f64>> {
        let t = self.times[p.checked_flat(self.n1, self.n2)?];
        Ok((t >= 0.0).then_some(t))
    }

    /// Number of ruptured points.
    pub fn n_ruptured(&self) -> usize {
        self.times.iter().filter(|t| **t >= 0.0).count()
    }

    /// Mark points whose slip rate exceeds the threshold at time `t`.
    /// Returns how many points ruptured at this call.
    ///
    /// # Errors
    /// `ShapeMismatch` if the snapshot is not on the recorder's fault.
    pub fn update(&mut self, t: f64, snapshot: &InterfaceSnapshot) -> Result<usize> {
        if snapshot.n1 != self.n1 {
            return Err(FaultError::shape_mismatch("front snapshot n1", self.n1, snapshot.n1));
        }
        if snapshot.n2 != self.n2 {
            return Err(FaultError::shape_mismatch("front snapshot n2", self.n2, snapshot.n2));
        }

        let mut n_new = 0;
        let slip_rate = snapshot.field(FieldName::SlipVelocity);
        for (time, v) in self.times.iter_mut().zip(slip_rate) {
            if *time < 0.0 && *v > self.threshold {
                *time = t;
                n_new += 1;
            }
        }
        if n_new > 0 {
            debug!(t, n_new, n_ruptured = self.n_ruptured(), "rupture front advanced");
        }
        Ok(n_new)
    }

    /// Output file name: `{problem}_cplot.txt`.
    pub fn file_name(&self) -> String {
        format!("{}_cplot.txt", self.header.problem)
    }

    /// Write the front file into `dir` and return its path.
    pub fn write(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(self.file_name());
        let mut out = BufWriter::new(File::create(&path)?);
        self.write_to(&mut out)?;
        out.flush()?;
        info!(
            path = %path.display(),
            n_ruptured = self.n_ruptured(),
            n_points = self.n_points(),
            "wrote rupture front"
        );
        Ok(path)
    }

    /// Write the front file to any writer.
    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<()> {
        self.header.write_preamble(out)?;
        writeln!(out, "# Column #1 = horizontal coordinate, distance along strike (m)")?;
        writeln!(out, "# Column #2 = vertical coordinate, distance down-dip (m)")?;
        writeln!(out, "# Column #3 = rupture time (s)")?;
        writeln!(out, "#")?;
        writeln!(out, "j k t")?;
        writeln!(out, "#")?;

        let ds = self.header.depth_sign;
        for k in 0..self.times.len() {
            let t = if self.times[k] < 0.0 {
                NEVER_RUPTURED
            } else {
                self.times[k]
            };
            writeln!(
                out,
                "{} {} {}",
                sci(self.x1[k] * 1000.0, 6),
                sci(ds * self.x2[k] * 1000.0, 6),
                sci(t, 6)
            )?;
        }
        Ok(())
    }
}
