//! Run-loop tests with a stub bulk solver.

use approx::assert_relative_eq;
use rupture_rs::io::{AxisRange, OutputList, OutputUnitConfig};
use rupture_rs::{
    BoundFields, BulkSolver, FaultError, FaultGrid, FieldName, Footprint, FrictionInterface,
    FrontRecorder, IfFields, ImpedanceField, Load, LoadSchedule, LowStorageRk, Material,
    PointIndex, RunConfig, ScecHeader, Shape, Simulation, SlipWeakening, SlipWeakeningParams,
    StationRecorder,
};

/// Rigid blocks at rest that only record what the runner asks of them.
#[derive(Default)]
struct RigidBulk {
    n_applied: usize,
    stage_times: Vec<f64>,
    scales: Vec<f64>,
    weights: Vec<f64>,
    last: Vec<IfFields>,
}

impl BulkSolver for RigidBulk {
    fn boundary_fields(&self, side1: &mut [BoundFields], side2: &mut [BoundFields]) {
        side1.fill(BoundFields::default());
        side2.fill(BoundFields::default());
    }

    fn apply_interface(&mut self, resolved: &[IfFields]) -> rupture_rs::Result<()> {
        self.n_applied += 1;
        self.last = resolved.to_vec();
        Ok(())
    }

    fn scale_df(&mut self, a: f64) {
        self.scales.push(a);
    }

    fn calc_df(&mut self, _dt: f64, t: f64) {
        self.stage_times.push(t);
    }

    fn update(&mut self, b: f64) {
        self.weights.push(b);
    }
}

/// Bulk that fails on the first boundary condition.
struct FailingBulk;

impl BulkSolver for FailingBulk {
    fn boundary_fields(&self, _: &mut [BoundFields], _: &mut [BoundFields]) {}
    fn apply_interface(&mut self, _: &[IfFields]) -> rupture_rs::Result<()> {
        Err(FaultError::InvalidConfig("bulk blew up".to_string()))
    }
    fn scale_df(&mut self, _: f64) {}
    fn calc_df(&mut self, _: f64, _: f64) {}
    fn update(&mut self, _: f64) {}
}

/// Fully weakened fault (mus = mud) with constant slip velocity.
fn sliding_interface(n1: usize, n2: usize) -> FrictionInterface<SlipWeakening> {
    let grid = FaultGrid::uniform(n1, n2, (0.0, 0.0), (0.1, 0.1));
    let m = Material::new(2.0, 4.0, 4.0); // z = 8
    let imp = ImpedanceField::uniform(&grid, m, m).unwrap();
    let law = SlipWeakening::new(&grid, &SlipWeakeningParams::new(0.5, 0.5, 0.4)).unwrap();
    FrictionInterface::new(grid, imp, law)
        .unwrap()
        .with_background(-100.0, 60.0, 0.0)
}

#[test]
fn test_constant_slip_rate_integrates_exactly() {
    // V = (60 - 50) / 4
    let config = RunConfig::new(0.01, 40).with_log_interval(0);
    let mut sim = Simulation::new(RigidBulk::default(), sliding_interface(3, 2), config);
    let summary = sim.run().unwrap();

    assert_eq!(summary.n_steps, 40);
    assert_relative_eq!(summary.final_time, 0.4, max_relative = 1e-12);
    assert_relative_eq!(summary.peak_slip_rate, 2.5, max_relative = 1e-12);

    let p = PointIndex::new(2, 1);
    assert_relative_eq!(sim.interface().slip(p).unwrap(), 2.5 * 0.4, max_relative = 1e-10);
    assert_relative_eq!(sim.bulk().last[5].slip_velocity()[1], 2.5, max_relative = 1e-12);
}

#[test]
fn test_stage_sequence_follows_scheme() {
    for scheme in [LowStorageRk::Rk1, LowStorageRk::Rk3, LowStorageRk::Rk4] {
        let config = RunConfig::new(0.1, 2).with_scheme(scheme).with_log_interval(0);
        let mut sim = Simulation::new(RigidBulk::default(), sliding_interface(1, 1), config);
        sim.run().unwrap();

        let bulk = sim.bulk();
        let n = scheme.n_stages();
        assert_eq!(bulk.n_applied, 2 * n);
        assert_eq!(&bulk.scales[..n], scheme.a());
        assert_eq!(&bulk.weights[n..], scheme.b());
        for (m, c) in scheme.c().iter().enumerate() {
            assert_relative_eq!(bulk.stage_times[n + m], 0.1 + c * 0.1, epsilon = 1e-15);
        }
    }
}

#[test]
fn test_bulk_error_stops_run() {
    let config = RunConfig::new(0.01, 10);
    let mut sim = Simulation::new(FailingBulk, sliding_interface(1, 1), config);
    assert!(matches!(sim.run(), Err(FaultError::InvalidConfig(_))));
}

#[test]
fn test_outputs_and_stations_written() {
    let dir = tempfile::tempdir().unwrap();
    let prefix = format!("{}/run_", dir.path().display());

    let units = vec![
        OutputUnitConfig::every_step("all", FieldName::SlipVelocity, 3, 2),
        OutputUnitConfig {
            name: "every5".to_string(),
            field: FieldName::Slip,
            steps: AxisRange::new(0, 100, 5),
            i: AxisRange::new(0, 2, 2),
            j: AxisRange::single(1),
        },
    ];
    let outputs = OutputList::from_configs(units, &prefix, 3, 2).unwrap();
    let station = StationRecorder::new(
        "faultst000dp000",
        PointIndex::new(1, 1),
        (0.0, 0.0, 0.1),
        ScecHeader::new("stub"),
    )
    .unwrap();

    let config = RunConfig::new(0.01, 12)
        .with_log_interval(0)
        .with_station_dir(dir.path());
    let mut sim = Simulation::new(RigidBulk::default(), sliding_interface(3, 2), config)
        .with_outputs(outputs)
        .with_station(station);
    sim.run().unwrap();

    let all = std::fs::read(dir.path().join("run_all_V.dat")).unwrap();
    assert_eq!(all.len(), 12 * 6 * 8);
    let first = f64::from_le_bytes(all[..8].try_into().unwrap());
    assert_relative_eq!(first, 2.5, max_relative = 1e-12);

    // Steps 0, 5, 10 at points (0, 1) and (2, 1)
    let every5 = std::fs::read(dir.path().join("run_every5_U.dat")).unwrap();
    assert_eq!(every5.len(), 3 * 2 * 8);
    let times = std::fs::read(dir.path().join("run_every5_t.dat")).unwrap();
    let t_last = f64::from_le_bytes(times[16..24].try_into().unwrap());
    assert_relative_eq!(t_last, 0.11, max_relative = 1e-12);

    let meta = std::fs::read_to_string(dir.path().join("run_every5.meta")).unwrap();
    assert!(meta.contains("nt = 3"));
    assert!(meta.contains("ni = 2"));
    assert!(meta.contains("nj = 1"));

    let station = std::fs::read_to_string(dir.path().join("stub_faultst000dp000.txt")).unwrap();
    assert!(station.contains("# num_time_steps=12"));
    assert_eq!(sim.stations()[0].len(), 12);
}

#[test]
fn test_invalid_config_rejected_before_stepping() {
    let mut sim = Simulation::new(
        RigidBulk::default(),
        sliding_interface(1, 1),
        RunConfig::new(-0.1, 5),
    );
    assert!(matches!(sim.run(), Err(FaultError::InvalidConfig(_))));
    assert_eq!(sim.bulk().n_applied, 0);
}

/// Line fault below static strength everywhere, with a ramped boxcar load on
/// the middle point only.
fn nucleation_interface() -> FrictionInterface<SlipWeakening> {
    let grid = FaultGrid::uniform(5, 1, (0.0, 0.0), (1.0, 1.0));
    let m = Material::new(2.0, 4.0, 4.0);
    let imp = ImpedanceField::uniform(&grid, m, m).unwrap();
    let law = SlipWeakening::new(&grid, &SlipWeakeningParams::new(0.6, 0.4, 0.5)).unwrap();

    let mut loads = LoadSchedule::new(&grid);
    let patch = Footprint::new(Shape::Boxcar, (2.0, 0.0), (0.5, 0.0));
    loads.push(Load::new(patch, 0.5, [0.0, 20.0, 0.0]));

    FrictionInterface::new(grid, imp, law)
        .unwrap()
        .with_background(-60.0, 30.0, 0.0)
        .with_loads(loads)
        .unwrap()
}

#[test]
fn test_rupture_front_from_ramped_nucleation() {
    let dir = tempfile::tempdir().unwrap();
    let iface = nucleation_interface();
    let front = FrontRecorder::new(iface.grid(), ScecHeader::new("ramp")).unwrap();

    let config = RunConfig::new(0.01, 100)
        .with_log_interval(0)
        .with_station_dir(dir.path());
    let mut sim = Simulation::new(RigidBulk::default(), iface, config).with_front(front);
    sim.run().unwrap();

    let front = sim.front().unwrap();
    // Strength 36 is exceeded once the ramp passes 0.3, well before t0
    let t_rup = front.rupture_time(PointIndex::new(2, 0)).unwrap().unwrap();
    assert!(t_rup > 0.1 && t_rup < 0.5, "rupture time {t_rup}");
    assert_eq!(front.n_ruptured(), 1);
    for i in [0, 1, 3, 4] {
        assert_eq!(front.rupture_time(PointIndex::new(i, 0)).unwrap(), None);
    }

    let text = std::fs::read_to_string(dir.path().join("ramp_cplot.txt")).unwrap();
    let rows: Vec<&str> = text.lines().filter(|l| !l.starts_with('#')).skip(1).collect();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows.iter().filter(|r| r.ends_with(" 1.000000E+09")).count(), 4);
    assert!(rows[2].starts_with("2.000000E+03 0.000000E+00 "));
}

#[test]
fn test_front_for_other_grid_rejected() {
    let other = FaultGrid::uniform(4, 1, (0.0, 0.0), (1.0, 1.0));
    let front = FrontRecorder::new(&other, ScecHeader::new("p")).unwrap();
    let mut sim = Simulation::new(
        RigidBulk::default(),
        nucleation_interface(),
        RunConfig::new(0.01, 5),
    )
    .with_front(front);
    assert!(matches!(sim.run(), Err(FaultError::ShapeMismatch { .. })));
    assert_eq!(sim.bulk().n_applied, 0);
}
