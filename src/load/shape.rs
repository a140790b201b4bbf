//! Spatial footprints shared by loads and friction-parameter patches.

use std::fmt;
use std::str::FromStr;

use crate::error::FaultError;

/// Spatial profile of a load or parameter patch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Shape {
    /// Applies everywhere with unit weight
    Constant,
    /// Unit weight inside `|x - x0| <= a` on every bounded axis
    Boxcar,
    /// Unit weight inside `Σ ((x - x0)/a)² <= 1`
    Ellipse,
    /// Weight `max(0, 1 - Σ |x - x0|/a)`, a tapered pyramid
    Linear,
    /// Weight `exp(-Σ ((x - x0)/a)²)`
    Gaussian,
}

impl Shape {
    /// Name used in input files.
    pub fn name(&self) -> &'static str {
        match self {
            Shape::Constant => "constant",
            Shape::Boxcar => "boxcar",
            Shape::Ellipse => "ellipse",
            Shape::Linear => "linear",
            Shape::Gaussian => "gaussian",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Shape {
    type Err = FaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "constant" => Ok(Shape::Constant),
            "boxcar" => Ok(Shape::Boxcar),
            "ellipse" => Ok(Shape::Ellipse),
            "linear" => Ok(Shape::Linear),
            "gaussian" => Ok(Shape::Gaussian),
            _ => Err(FaultError::UnknownShape(s.to_string())),
        }
    }
}

/// Shape placed on the fault: centre and half-width per axis.
///
/// A half-width of zero leaves that axis unbounded, so a 2D problem can use
/// `length = (a, 0.0)` on a fault with a single point along the second axis.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Footprint {
    pub shape: Shape,
    pub center: (f64, f64),
    pub length: (f64, f64),
}

impl Footprint {
    /// Create a new footprint.
    pub fn new(shape: Shape, center: (f64, f64), length: (f64, f64)) -> Self {
        Self {
            shape,
            center,
            length,
        }
    }

    /// Footprint covering the whole fault.
    pub fn everywhere() -> Self {
        Self::new(Shape::Constant, (0.0, 0.0), (0.0, 0.0))
    }

    /// Weight in `[0, 1]` at fault coordinates `(x1, x2)`.
    pub fn weight(&self, x1: f64, x2: f64) -> f64 {
        // Scaled offsets; unbounded axes contribute nothing
        let scaled = |x: f64, x0: f64, a: f64| if a > 0.0 { (x - x0) / a } else { 0.0 };
        let r1 = scaled(x1, self.center.0, self.length.0);
        let r2 = scaled(x2, self.center.1, self.length.1);

        match self.shape {
            Shape::Constant => 1.0,
            Shape::Boxcar => {
                if r1.abs() <= 1.0 && r2.abs() <= 1.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Shape::Ellipse => {
                if r1 * r1 + r2 * r2 <= 1.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Shape::Linear => (1.0 - r1.abs() - r2.abs()).max(0.0),
            Shape::Gaussian => (-(r1 * r1 + r2 * r2)).exp(),
        }
    }
}
