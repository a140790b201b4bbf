//! Error types for the fault interface solver.
//!
//! Every variant is fatal for a run: the interface state of all points must
//! stay mutually consistent at each step boundary, so errors are propagated to
//! the run loop instead of being patched up locally.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while configuring or advancing a fault interface.
#[derive(Debug, Error)]
pub enum FaultError {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed record in an input file
    #[error("Parse error in {} at line {line}: {message}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// Required section header not found in an input file
    #[error("Section {section} not found in {}", .path.display())]
    MissingSection { path: PathBuf, section: String },

    /// Unknown load or parameter patch shape
    #[error("Unknown shape '{0}'")]
    UnknownShape(String),

    /// Point index outside the fault grid
    #[error("Point ({i}, {j}) outside the {n1} x {n2} fault")]
    PointOutOfRange {
        i: usize,
        j: usize,
        n1: usize,
        n2: usize,
    },

    /// Unknown output field name
    #[error("Unknown output field '{0}'")]
    UnknownField(String),

    /// Friction root find hit its iteration cap
    #[error(
        "Friction solve did not converge at ({i}, {j}) after {iterations} iterations \
         (residual {residual:e})"
    )]
    NonConvergence {
        i: usize,
        j: usize,
        iterations: usize,
        residual: f64,
    },

    /// Impedance that is zero, negative or not finite
    #[error("Invalid impedance {value} at ({i}, {j})")]
    InvalidImpedance { i: usize, j: usize, value: f64 },

    /// NaN or infinite value in state or boundary data
    #[error("Non-finite {quantity} at ({i}, {j})")]
    NonFinite {
        quantity: &'static str,
        i: usize,
        j: usize,
    },

    /// Array length does not match the interface point count
    #[error("Shape mismatch for {what}: expected {expected}, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl FaultError {
    /// Create a parse error for a file and line.
    pub fn parse(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            line,
            message: message.into(),
        }
    }

    /// Create a shape mismatch error.
    pub fn shape_mismatch(what: &'static str, expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch {
            what,
            expected,
            actual,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FaultError>;
