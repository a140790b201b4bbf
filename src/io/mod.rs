//! File input and output.
//!
//! This module provides:
//! - **Load files**: nucleation and background perturbations (`[fault.load]`)
//! - **Per-point load files**: raw `sn`, `s2`, `s3` arrays
//! - **Output lists**: binary snapshots of interface fields (`[fault.outputlist]`)
//! - **Stations**: on-fault time series in the SCEC verification text format
//! - **Rupture fronts**: first time each point slips, in the same format
//!
//! Readers skip everything before their section header, so several sections
//! can share one input file.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use rupture_rs::io::{OutputList, read_load_file};
//!
//! let loads = read_load_file(Path::new("tpv5.in"))?;
//! let mut outputs = OutputList::from_file(Path::new("tpv5.in"), "data/tpv5_", 201, 101)?;
//!
//! outputs.write_list(tstep, t, &iface.write_fields())?;
//! outputs.close_list()?;
//! ```

mod front;
mod load_reader;
mod output;
mod station;

pub use front::{DEFAULT_FRONT_THRESHOLD, FrontRecorder};
pub use load_reader::{LOAD_SECTION, parse_loads, read_load_file, read_point_load_file};
pub use output::{
    AxisRange, OUTPUT_SECTION, OutputList, OutputUnit, OutputUnitConfig, parse_output_list,
    read_output_list,
};
pub use station::{ScecHeader, StationRecorder};
