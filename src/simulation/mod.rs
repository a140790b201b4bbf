//! Simulation runner.
//!
//! Ties together:
//! - a bulk solver (anything implementing [`BulkSolver`])
//! - the fault interface and its friction law
//! - a low-storage RK scheme
//! - output lists and stations
//!
//! # Example
//! ```ignore
//! use rupture_rs::simulation::{RunConfig, Simulation};
//! use rupture_rs::time::LowStorageRk;
//!
//! let config = RunConfig::new(0.005, 2400).with_scheme(LowStorageRk::Rk3);
//! let summary = Simulation::new(bulk, interface, config)
//!     .with_outputs(outputs)
//!     .run()?;
//! println!("peak slip rate {:.3} m/s", summary.peak_slip_rate);
//! ```

mod runner;

pub use runner::{BulkSolver, RunConfig, RunSummary, Simulation, run};
