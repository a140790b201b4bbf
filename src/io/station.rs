//! On-fault station time series in the SCEC code-verification text format.
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
//! # time_step=0.005 s
//! # num_time_steps=2401
//! # location=7.5 km strike, 0 km across, 7.5 km depth
//! # Column #1 = Time (s)
//! # Column #2 = horizontal slip (m)
//! ...
//! #
//! t h-slip h-slip-rate h-shear-stress v-slip v-slip-rate v-shear-stress n-stress
//! #
//! 0.000000000000E+00 0.000000E+00 0.000000E+00 7.000000E+01 ...
//! ```
//!
//! "Horizontal" is the shear-2 direction and "vertical" the shear-3 direction.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{FaultError, Result};
use crate::interface::{FieldName, InterfaceSnapshot};
use crate::types::PointIndex;

const COLUMNS: [(&str, &str); 7] = [
    ("h-slip", "horizontal slip (m)"),
    ("h-slip-rate", "horizontal slip rate (m/s)"),
    ("h-shear-stress", "horizontal shear stress (MPa)"),
    ("v-slip", "vertical slip (m)"),
    ("v-slip-rate", "vertical slip rate (m/s)"),
    ("v-shear-stress", "vertical shear stress (MPa)"),
    ("n-stress", "normal stress (MPa)"),
];

/// Header metadata for a station file.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScecHeader {
    pub problem: String,
    pub author: String,
    pub version: String,
    pub element_size: String,
    /// `1.0` or `-1.0`; multiplies depth and vertical columns
    pub depth_sign: f64,
    /// Include the normal stress column
    pub normal: bool,
}

impl ScecHeader {
    /// Header for a problem with empty author and element size.
    pub fn new(problem: impl Into<String>) -> Self {
        Self {
            problem: problem.into(),
            author: String::new(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            element_size: String::new(),
            depth_sign: 1.0,
            normal: true,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_element_size(mut self, element_size: impl Into<String>) -> Self {
        self.element_size = element_size.into();
        self
    }

    pub fn with_depth_sign(mut self, depth_sign: f64) -> Self {
        self.depth_sign = depth_sign;
        self
    }

    pub fn without_normal(mut self) -> Self {
        self.normal = false;
        self
    }

    /// Check that the depth sign is ±1.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.depth_sign != 1.0 && self.depth_sign != -1.0 {
            return Err(FaultError::InvalidConfig(format!(
                "depth sign must be 1 or -1, got {}",
                self.depth_sign
            )));
        }
        Ok(())
    }

    /// Header lines shared by station and front files.
    pub(crate) fn write_preamble<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "# problem={}", self.problem)?;
        writeln!(out, "# author={}", self.author)?;
        writeln!(out, "# date={}", chrono::Local::now().format("%y/%m/%d"))?;
        writeln!(out, "# code={}", env!("CARGO_PKG_NAME"))?;
        writeln!(out, "# version={}", self.version)?;
        writeln!(out, "# element_size={}", self.element_size)?;
        Ok(())
    }
}

/// Records one fault point at every step and writes it as a station file.
#[derive(Clone, Debug)]
pub struct StationRecorder {
    label: String,
    point: PointIndex,
    /// Strike, across, depth in km
    location: (f64, f64, f64),
    header: ScecHeader,
    rows: Vec<[f64; 8]>,
}

impl StationRecorder {
    /// Station `label` (e.g. `faultst075dp075`) sampling grid point `point`.
    ///
    /// # Errors
    /// `InvalidConfig` if the depth sign is not ±1.
    pub fn new(
        label: impl Into<String>,
        point: PointIndex,
        location: (f64, f64, f64),
        header: ScecHeader,
    ) -> Result<Self> {
        header.validate()?;
        Ok(Self {
            label: label.into(),
            point,
            location,
            header,
            rows: Vec::new(),
        })
    }

    /// Sampled grid point.
    pub fn point(&self) -> PointIndex {
        self.point
    }

    /// Number of recorded rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sample the station point from a snapshot at time `t`.
    ///
    /// # Errors
    /// `PointOutOfRange` if the station point is not on the snapshot's fault.
    pub fn record(&mut self, t: f64, snapshot: &InterfaceSnapshot) -> Result<()> {
        let p = self.point;
        let at = |f| snapshot.at(f, p);
        let ds = self.header.depth_sign;
        self.rows.push([
            t,
            at(FieldName::Slip2)?,
            at(FieldName::SlipVelocity2)?,
            at(FieldName::ShearStress2)?,
            ds * at(FieldName::Slip3)?,
            ds * at(FieldName::SlipVelocity3)?,
            ds * at(FieldName::ShearStress3)?,
            at(FieldName::NormalStress)?,
        ]);
        Ok(())
    }

    /// Output file name: `{problem}_{label}.txt`.
    pub fn file_name(&self) -> String {
        format!("{}_{}.txt", self.header.problem, self.label)
    }

    /// Write the station file into `dir` and return its path.
    pub fn write(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(self.file_name());
        let mut out = BufWriter::new(File::create(&path)?);
        self.write_to(&mut out)?;
        out.flush()?;
        info!(path = %path.display(), rows = self.rows.len(), "wrote station file");
        Ok(path)
    }

    /// Write the station file to any writer.
    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<()> {
        let h = &self.header;
        let dt = match self.rows.as_slice() {
            [first, second, ..] => second[0] - first[0],
            _ => 0.0,
        };
        let (strike, across, depth) = self.location;
        let n_cols = if h.normal { COLUMNS.len() } else { COLUMNS.len() - 1 };

        h.write_preamble(out)?;
        writeln!(out, "# time_step={dt} s")?;
        writeln!(out, "# num_time_steps={}", self.rows.len())?;
        writeln!(
            out,
            "# location={strike} km strike, {across} km across, {} km depth",
            h.depth_sign * depth
        )?;
        writeln!(out, "# Column #1 = Time (s)")?;
        for (n, (_, desc)) in COLUMNS[..n_cols].iter().enumerate() {
            writeln!(out, "# Column #{} = {desc}", n + 2)?;
        }
        writeln!(out, "#")?;
        let names: Vec<&str> = COLUMNS[..n_cols].iter().map(|(name, _)| *name).collect();
        writeln!(out, "t {}", names.join(" "))?;
        writeln!(out, "#")?;

        for row in &self.rows {
            write!(out, "{}", sci(row[0], 12))?;
            for v in &row[1..=n_cols] {
                write!(out, " {}", sci(*v, 6))?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

/// Scientific notation with a signed, two-digit exponent (`1.500000E+01`).
pub(crate) fn sci(x: f64, precision: usize) -> String {
    let s = format!("{x:.precision$E}");
    match s.split_once('E') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', exp),
            };
            format!("{mantissa}E{sign}{digits:0>2}")
        }
        None => s,
    }
}
