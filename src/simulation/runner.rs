//! Simulation runner implementation.
//!
//! Drives a bulk solver and a fault interface through a low-storage RK
//! scheme. Each stage:
//!
//! 1. the bulk hands over its boundary fields on both sides of the fault
//! 2. the interface resolves them at the stage time
//! 3. the bulk applies the resolved fields as its boundary condition
//! 4. everything runs `scale_df(A)`, `calc_df(dt)`, `update(B)`
//!
//! After each step the output list, any stations and the rupture front are
//! updated.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::boundary::{BoundFields, IfFields};
use crate::error::{FaultError, Result};
use crate::friction::{FrictionLaw, FrictionModel};
use crate::interface::{FieldName, FrictionInterface};
use crate::io::{FrontRecorder, OutputList, StationRecorder};
use crate::time::LowStorageRk;

// =============================================================================
// Bulk Solver
// =============================================================================

/// The elastic solver on either side of the fault.
///
/// Implementations own their own 2N registers and advance them with the same
/// coefficients as the interface.
pub trait BulkSolver {
    /// Fill the boundary fields of both sides, one record per fault point.
    fn boundary_fields(&self, side1: &mut [BoundFields], side2: &mut [BoundFields]);

    /// Impose the resolved interface fields as the boundary condition.
    fn apply_interface(&mut self, resolved: &[IfFields]) -> Result<()>;

    /// `df <- A df`
    fn scale_df(&mut self, a: f64);

    /// `df <- df + dt · rate`, using the state at stage time `t`.
    fn calc_df(&mut self, dt: f64, t: f64);

    /// `q <- q + B df`
    fn update(&mut self, b: f64);
}

// =============================================================================
// Run Configuration
// =============================================================================

/// Configuration for a simulation run.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunConfig {
    /// Time step
    pub dt: f64,
    /// Number of time steps
    pub n_steps: usize,
    /// Start time
    pub t_start: f64,
    /// Time integration scheme
    pub scheme: LowStorageRk,
    /// Log progress every this many steps (0 disables)
    pub log_interval: usize,
    /// Directory for station and front files
    pub station_dir: Option<PathBuf>,
    /// Solve interface points on the rayon pool
    pub parallel: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            dt: 1e-3,
            n_steps: 0,
            t_start: 0.0,
            scheme: LowStorageRk::default(),
            log_interval: 100,
            station_dir: None,
            parallel: false,
        }
    }
}

impl RunConfig {
    /// `n_steps` steps of size `dt`.
    pub fn new(dt: f64, n_steps: usize) -> Self {
        Self {
            dt,
            n_steps,
            ..Default::default()
        }
    }

    pub fn with_scheme(mut self, scheme: LowStorageRk) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn with_t_start(mut self, t_start: f64) -> Self {
        self.t_start = t_start;
        self
    }

    pub fn with_log_interval(mut self, interval: usize) -> Self {
        self.log_interval = interval;
        self
    }

    pub fn with_station_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.station_dir = Some(dir.into());
        self
    }

    /// Use the rayon pool for interface solves (needs the `parallel` feature).
    pub fn parallel(mut self) -> Self {
        self.parallel = true;
        self
    }

    /// Check the time step and scheme settings.
    pub fn validate(&self) -> Result<()> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(FaultError::InvalidConfig(format!(
                "time step must be positive, got {}",
                self.dt
            )));
        }
        if self.parallel && !cfg!(feature = "parallel") {
            return Err(FaultError::InvalidConfig(
                "parallel interface solves need the `parallel` feature".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Run Summary
// =============================================================================

/// Statistics of a finished run.
#[derive(Clone, Debug)]
pub struct RunSummary {
    /// Final simulation time reached
    pub final_time: f64,
    /// Number of steps taken
    pub n_steps: usize,
    /// Largest slip velocity seen at any point and step
    pub peak_slip_rate: f64,
    /// Wall-clock time in seconds
    pub wall_time: f64,
}

// =============================================================================
// Simulation Runner
// =============================================================================

/// Bulk solver, fault interface and output bundled into one run.
pub struct Simulation<B: BulkSolver, L: FrictionLaw = FrictionModel> {
    bulk: B,
    interface: FrictionInterface<L>,
    outputs: OutputList,
    stations: Vec<StationRecorder>,
    front: Option<FrontRecorder>,
    config: RunConfig,
}

impl<B: BulkSolver, L: FrictionLaw> Simulation<B, L> {
    /// Create a simulation with no outputs.
    pub fn new(bulk: B, interface: FrictionInterface<L>, config: RunConfig) -> Self {
        Self {
            bulk,
            interface,
            outputs: OutputList::default(),
            stations: Vec::new(),
            front: None,
            config,
        }
    }

    /// Attach an output list.
    pub fn with_outputs(mut self, outputs: OutputList) -> Self {
        self.outputs = outputs;
        self
    }

    /// Attach a station.
    pub fn with_station(mut self, station: StationRecorder) -> Self {
        self.stations.push(station);
        self
    }

    /// Track rupture times.
    pub fn with_front(mut self, front: FrontRecorder) -> Self {
        self.front = Some(front);
        self
    }

    pub fn bulk(&self) -> &B {
        &self.bulk
    }

    pub fn interface(&self) -> &FrictionInterface<L> {
        &self.interface
    }

    pub fn stations(&self) -> &[StationRecorder] {
        &self.stations
    }

    pub fn front(&self) -> Option<&FrontRecorder> {
        self.front.as_ref()
    }

    /// Run every step, then close the output list and write stations and front.
    pub fn run(&mut self) -> Result<RunSummary> {
        run(
            &self.config,
            &mut self.bulk,
            &mut self.interface,
            &mut self.outputs,
            &mut self.stations,
            self.front.as_mut(),
        )
    }
}

/// Advance `bulk` and `interface` by `config.n_steps` steps.
///
/// Every error from a stage is fatal and returned as is.
pub fn run<B: BulkSolver, L: FrictionLaw>(
    config: &RunConfig,
    bulk: &mut B,
    interface: &mut FrictionInterface<L>,
    outputs: &mut OutputList,
    stations: &mut [StationRecorder],
    mut front: Option<&mut FrontRecorder>,
) -> Result<RunSummary> {
    config.validate()?;
    let start_wall = std::time::Instant::now();

    let n = interface.grid().n_points();
    if let Some(front) = front.as_deref() {
        interface.grid().check_len("rupture front", front.n_points())?;
    }
    let mut side1 = vec![BoundFields::default(); n];
    let mut side2 = vec![BoundFields::default(); n];
    let dt = config.dt;
    let mut t = config.t_start;
    let mut peak_slip_rate: f64 = 0.0;

    info!(
        scheme = config.scheme.name(),
        law = interface.law().name(),
        n_points = n,
        n_steps = config.n_steps,
        dt,
        "starting run"
    );

    for tstep in 0..config.n_steps {
        for stage in config.scheme.stages() {
            let t_stage = t + stage.c * dt;

            bulk.boundary_fields(&mut side1, &mut side2);
            let resolved = solve(interface, &side1, &side2, t_stage, config.parallel)?;
            bulk.apply_interface(&resolved)?;

            bulk.scale_df(stage.a);
            interface.scale_df(stage.a);
            bulk.calc_df(dt, t_stage);
            interface.calc_df(dt);
            bulk.update(stage.b);
            interface.update(stage.b);
        }
        t = config.t_start + (tstep + 1) as f64 * dt;

        let snapshot = interface.write_fields();
        outputs.write_list(tstep, t, &snapshot)?;
        for station in stations.iter_mut() {
            station.record(t, &snapshot)?;
        }
        if let Some(front) = front.as_deref_mut() {
            front.update(t, &snapshot)?;
        }

        let step_peak = snapshot
            .field(FieldName::SlipVelocity)
            .iter()
            .fold(0.0f64, |m, v| m.max(*v));
        peak_slip_rate = peak_slip_rate.max(step_peak);

        if config.log_interval > 0 && (tstep + 1) % config.log_interval == 0 {
            info!(tstep = tstep + 1, t, max_slip_rate = step_peak, "step");
        } else {
            debug!(tstep = tstep + 1, t, max_slip_rate = step_peak, "step");
        }
    }

    outputs.close_list()?;
    if let Some(dir) = &config.station_dir {
        for station in stations.iter() {
            station.write(dir)?;
        }
        if let Some(front) = front.as_deref() {
            front.write(dir)?;
        }
    }

    let wall_time = start_wall.elapsed().as_secs_f64();
    info!(final_time = t, n_steps = config.n_steps, wall_time, "run finished");

    Ok(RunSummary {
        final_time: t,
        n_steps: config.n_steps,
        peak_slip_rate,
        wall_time,
    })
}

#[cfg(feature = "parallel")]
fn solve<L: FrictionLaw>(
    interface: &mut FrictionInterface<L>,
    side1: &[BoundFields],
    side2: &[BoundFields],
    t: f64,
    parallel: bool,
) -> Result<Vec<IfFields>> {
    if parallel {
        interface.solve_all_parallel(side1, side2, t)
    } else {
        interface.solve_all(side1, side2, t)
    }
}

#[cfg(not(feature = "parallel"))]
fn solve<L: FrictionLaw>(
    interface: &mut FrictionInterface<L>,
    side1: &[BoundFields],
    side2: &[BoundFields],
    t: f64,
    _parallel: bool,
) -> Result<Vec<IfFields>> {
    interface.solve_all(side1, side2, t)
}
