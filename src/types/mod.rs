//! Strongly-typed fault-surface types.
//!
//! Each point `(i, j)` on the fault surface is one independent friction
//! problem. Per-point arrays are stored flat in row-major order, so point
//! `(i, j)` lives at `i * n2 + j`.
//!
//! # Example
//!
//! ```
//! use rupture_rs::types::{FaultGrid, PointIndex};
//!
//! let grid = FaultGrid::uniform(4, 3, (0.0, 0.0), (0.5, 0.5));
//! let p = PointIndex::new(2, 1);
//! assert_eq!(grid.flat(p).unwrap(), 7);
//! assert_eq!(grid.coords(p).unwrap(), (1.0, 0.5));
//! assert!(grid.flat(PointIndex::new(0, 3)).is_err());
//! ```

mod grid;
mod indices;

pub use grid::FaultGrid;
pub use indices::PointIndex;
