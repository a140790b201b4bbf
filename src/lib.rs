//! # rupture-rs
//!
//! Frictional fault interface for finite-difference dynamic rupture
//! simulations.
//!
//! The crate sits between two elastic blocks. At every Runge-Kutta stage the
//! bulk solver hands over the particle velocity and traction on both sides of
//! the fault; the interface returns fields that satisfy continuity of traction
//! and the friction law, and advances slip and friction state in lockstep with
//! the bulk.
//!
//! This crate provides:
//! - Fault grid and per-point index types
//! - Characteristic decomposition and welded solution
//! - Friction laws (frictionless, slip-weakening, rate-and-state aging / slip)
//! - Time-dependent traction loads with spatial footprints
//! - Low-storage Runge-Kutta coefficients (orders 1-4)
//! - Output lists, SCEC station and rupture-front files, and a run loop driving
//!   any bulk solver
//!
//! Enable the `parallel` feature to solve fault points on the rayon pool, and
//! `serde` to (de)serialize configuration types.

pub mod boundary;
pub mod error;
pub mod friction;
pub mod interface;
pub mod io;
pub mod load;
pub mod material;
pub mod simulation;
pub mod time;
pub mod types;

// Re-export main types for convenience
pub use boundary::{BoundFields, Characteristics, IfFields};
pub use error::{FaultError, Result};
pub use friction::{
    BoundChar, FrictionLaw, FrictionModel, Frictionless, ParameterField, PointContext, RateState,
    RateStateParams, RootFinder, SlipWeakening, SlipWeakeningParams, StateEvolution,
};
pub use interface::{
    FieldName, FrictionConfig, FrictionInterface, InterfaceConfig, InterfaceSnapshot,
    InterfaceState,
};
pub use io::{FrontRecorder, OutputList, OutputUnitConfig, ScecHeader, StationRecorder};
pub use load::{Footprint, Load, LoadSchedule, Shape};
pub use material::{Impedance, ImpedanceField, Material};
pub use simulation::{BulkSolver, RunConfig, RunSummary, Simulation};
pub use time::LowStorageRk;
pub use types::{FaultGrid, PointIndex};
