//! Binary output units for interface fields.
//!
//! # File Format
//!
//! ```text
//! [fault.outputlist]
//! vfault
//! V 0 1000 10 0 200 1 0 0 1
//! ufault
//! U 1000 1000 1 0 200 2 0 100 2
//!
//! ```
//!
//! Each unit is a name line followed by `field tm tp ts im ip is jm jp js`:
//! start, stop (inclusive) and stride for time steps and the two fault axes.
//! A blank line or end of file ends the list.
//!
//! A unit named `vfault` with prefix `run/tpv5_` writes
//!
//! - `run/tpv5_vfault_V.dat`: little-endian `f64`, one block of `ni × nj`
//!   values per scheduled step, `i` outer and `j` inner
//! - `run/tpv5_vfault_t.dat`: little-endian `f64` time of each block
//! - `run/tpv5_vfault.meta`: plain-text shape descriptor, written on close

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{FaultError, Result};
use crate::interface::{FieldName, InterfaceSnapshot};

/// Section header that starts the output list.
pub const OUTPUT_SECTION: &str = "[fault.outputlist]";

const UNIT_FIELDS: usize = 10;

/// Inclusive `start..=stop` range with a stride.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AxisRange {
    pub start: usize,
    pub stop: usize,
    pub stride: usize,
}

impl AxisRange {
    /// Create a range. `stride` must be at least 1; [`OutputUnit::create`]
    /// rejects zero strides.
    pub fn new(start: usize, stop: usize, stride: usize) -> Self {
        Self {
            start,
            stop,
            stride,
        }
    }

    /// A single index.
    pub fn single(n: usize) -> Self {
        Self::new(n, n, 1)
    }

    /// Check if `n` is on the range.
    pub fn contains(&self, n: usize) -> bool {
        n >= self.start && n <= self.stop && (n - self.start) % self.stride == 0
    }

    /// Number of indices on the range.
    pub fn count(&self) -> usize {
        if self.stop < self.start {
            0
        } else {
            (self.stop - self.start) / self.stride + 1
        }
    }

    /// Indices on the range.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (self.start..=self.stop).step_by(self.stride)
    }
}

/// Parsed description of one output unit.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OutputUnitConfig {
    pub name: String,
    pub field: FieldName,
    /// Time-step range
    pub steps: AxisRange,
    /// First fault axis
    pub i: AxisRange,
    /// Second fault axis
    pub j: AxisRange,
}

impl OutputUnitConfig {
    /// Every point at every step.
    pub fn every_step(name: impl Into<String>, field: FieldName, n1: usize, n2: usize) -> Self {
        Self {
            name: name.into(),
            field,
            steps: AxisRange::new(0, usize::MAX, 1),
            i: AxisRange::new(0, n1.saturating_sub(1), 1),
            j: AxisRange::new(0, n2.saturating_sub(1), 1),
        }
    }
}

/// Open output unit with its data and time files.
#[derive(Debug)]
pub struct OutputUnit {
    config: OutputUnitConfig,
    data: BufWriter<File>,
    times: BufWriter<File>,
    data_path: PathBuf,
    meta_path: PathBuf,
    /// Fault shape the ranges were clipped against
    shape: (usize, usize),
    n_written: usize,
}

impl OutputUnit {
    /// Clip the spatial ranges to an `n1 × n2` fault and create the files.
    ///
    /// # Errors
    /// - `InvalidConfig` if a stride is zero or a range starts outside the fault
    /// - `Io` if a file cannot be created
    pub fn create(mut config: OutputUnitConfig, prefix: &str, n1: usize, n2: usize) -> Result<Self> {
        for (axis, range) in [("time", &config.steps), ("i", &config.i), ("j", &config.j)] {
            if range.stride == 0 {
                return Err(FaultError::InvalidConfig(format!(
                    "output unit '{}': {axis} stride must be at least 1",
                    config.name
                )));
            }
        }
        clip_axis(&config.name, "i", &mut config.i, n1)?;
        clip_axis(&config.name, "j", &mut config.j, n2)?;
        if config.steps.stop < config.steps.start {
            warn!(unit = %config.name, "time range is empty, unit will never write");
        }

        let base = format!("{prefix}{}", config.name);
        let data_path = PathBuf::from(format!("{base}_{}.dat", config.field));
        let time_path = PathBuf::from(format!("{base}_t.dat"));
        let meta_path = PathBuf::from(format!("{base}.meta"));

        let data = BufWriter::new(File::create(&data_path)?);
        let times = BufWriter::new(File::create(&time_path)?);
        debug!(unit = %config.name, path = %data_path.display(), "opened output unit");

        Ok(Self {
            config,
            data,
            times,
            data_path,
            meta_path,
            shape: (n1, n2),
            n_written: 0,
        })
    }

    /// Unit description with clipped ranges.
    pub fn config(&self) -> &OutputUnitConfig {
        &self.config
    }

    /// Data file path.
    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Number of blocks written so far.
    pub fn n_written(&self) -> usize {
        self.n_written
    }

    /// Check if step `tstep` is on the schedule.
    pub fn is_scheduled(&self, tstep: usize) -> bool {
        self.config.steps.contains(tstep)
    }

    /// Append one block if `tstep` is scheduled. Returns whether it wrote.
    ///
    /// # Errors
    /// `ShapeMismatch` if the snapshot is not the fault the unit was created for.
    pub fn write_unit(&mut self, tstep: usize, t: f64, snapshot: &InterfaceSnapshot) -> Result<bool> {
        if !self.is_scheduled(tstep) {
            return Ok(false);
        }
        let (n1, n2) = self.shape;
        if snapshot.n1 != n1 {
            return Err(FaultError::shape_mismatch("output snapshot n1", n1, snapshot.n1));
        }
        if snapshot.n2 != n2 {
            return Err(FaultError::shape_mismatch("output snapshot n2", n2, snapshot.n2));
        }

        let values = snapshot.field(self.config.field);
        for i in self.config.i.iter() {
            for j in self.config.j.iter() {
                self.data.write_all(&values[i * snapshot.n2 + j].to_le_bytes())?;
            }
        }
        self.times.write_all(&t.to_le_bytes())?;
        self.n_written += 1;
        Ok(true)
    }

    /// Flush the data files and write the descriptor.
    pub fn close(&mut self) -> Result<()> {
        self.data.flush()?;
        self.times.flush()?;

        let c = &self.config;
        let mut meta = BufWriter::new(File::create(&self.meta_path)?);
        writeln!(meta, "name = {}", c.name)?;
        writeln!(meta, "field = {}", c.field)?;
        writeln!(meta, "dtype = f64le")?;
        writeln!(meta, "nt = {}", self.n_written)?;
        writeln!(meta, "ni = {}", c.i.count())?;
        writeln!(meta, "nj = {}", c.j.count())?;
        writeln!(meta, "steps = {} {} {}", c.steps.start, c.steps.stop, c.steps.stride)?;
        writeln!(meta, "i = {} {} {}", c.i.start, c.i.stop, c.i.stride)?;
        writeln!(meta, "j = {} {} {}", c.j.start, c.j.stop, c.j.stride)?;
        meta.flush()?;
        Ok(())
    }
}

fn clip_axis(unit: &str, axis: &'static str, range: &mut AxisRange, n: usize) -> Result<()> {
    if range.start >= n {
        return Err(FaultError::InvalidConfig(format!(
            "output unit '{unit}': {axis} start {} outside fault of size {n}",
            range.start
        )));
    }
    if range.stop >= n {
        warn!(unit, axis, stop = range.stop, limit = n - 1, "clipping output range");
        range.stop = n - 1;
    }
    Ok(())
}

/// Ordered collection of output units: write all, then close all.
#[derive(Debug, Default)]
pub struct OutputList {
    units: Vec<OutputUnit>,
}

impl OutputList {
    /// Read the `[fault.outputlist]` section and open every unit.
    pub fn from_file(path: &Path, prefix: &str, n1: usize, n2: usize) -> Result<Self> {
        let configs = read_output_list(path)?;
        let list = Self::from_configs(configs, prefix, n1, n2)?;
        info!(path = %path.display(), n_units = list.len(), "opened output list");
        Ok(list)
    }

    /// Open units from already parsed descriptions.
    pub fn from_configs(
        configs: Vec<OutputUnitConfig>,
        prefix: &str,
        n1: usize,
        n2: usize,
    ) -> Result<Self> {
        let units = configs
            .into_iter()
            .map(|c| OutputUnit::create(c, prefix, n1, n2))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { units })
    }

    /// Write every unit scheduled at `tstep`.
    pub fn write_list(&mut self, tstep: usize, t: f64, snapshot: &InterfaceSnapshot) -> Result<()> {
        for unit in &mut self.units {
            unit.write_unit(tstep, t, snapshot)?;
        }
        Ok(())
    }

    /// Close every unit.
    pub fn close_list(&mut self) -> Result<()> {
        for unit in &mut self.units {
            unit.close()?;
        }
        Ok(())
    }

    /// Units in insertion order.
    pub fn units(&self) -> &[OutputUnit] {
        &self.units
    }

    /// Number of units.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Check if the list has no units.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Read output unit descriptions from a file.
pub fn read_output_list(path: &Path) -> Result<Vec<OutputUnitConfig>> {
    let file = File::open(path)?;
    parse_output_list(BufReader::new(file), path)
}

/// Parse output unit descriptions; `path` is used for error messages.
pub fn parse_output_list<R: BufRead>(reader: R, path: &Path) -> Result<Vec<OutputUnitConfig>> {
    let mut lines = reader.lines().enumerate();

    let mut found = false;
    for (_, line) in lines.by_ref() {
        if line?.trim() == OUTPUT_SECTION {
            found = true;
            break;
        }
    }
    if !found {
        return Err(FaultError::MissingSection {
            path: path.to_path_buf(),
            section: OUTPUT_SECTION.to_string(),
        });
    }

    let mut configs = Vec::new();
    while let Some((idx, line)) = lines.next() {
        let line = line?;
        let name = line.trim();
        if name.is_empty() {
            break;
        }

        let (field_idx, field_line) = match lines.next() {
            Some((i, l)) => (i, l?),
            None => {
                return Err(FaultError::parse(
                    path,
                    idx + 1,
                    format!("output unit '{name}' has no field line"),
                ));
            }
        };
        configs.push(parse_unit(name, &field_line, path, field_idx + 1)?);
    }

    Ok(configs)
}

fn parse_unit(name: &str, text: &str, path: &Path, line: usize) -> Result<OutputUnitConfig> {
    let parts: Vec<&str> = text.split_whitespace().collect();
    if parts.len() != UNIT_FIELDS {
        return Err(FaultError::parse(
            path,
            line,
            format!("expected {UNIT_FIELDS} fields, got {}", parts.len()),
        ));
    }

    let field: FieldName = parts[0]
        .parse()
        .map_err(|e: FaultError| FaultError::parse(path, line, e.to_string()))?;

    let mut n = [0usize; UNIT_FIELDS - 1];
    for (slot, token) in n.iter_mut().zip(&parts[1..]) {
        *slot = token
            .parse()
            .map_err(|_| FaultError::parse(path, line, format!("invalid index '{token}'")))?;
    }
    if n[2] == 0 || n[5] == 0 || n[8] == 0 {
        return Err(FaultError::parse(path, line, "stride must be at least 1"));
    }

    Ok(OutputUnitConfig {
        name: name.to_string(),
        field,
        steps: AxisRange::new(n[0], n[1], n[2]),
        i: AxisRange::new(n[3], n[4], n[5]),
        j: AxisRange::new(n[6], n[7], n[8]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(text: &str) -> Result<Vec<OutputUnitConfig>> {
        parse_output_list(Cursor::new(text), Path::new("test.in"))
    }

    #[test]
    fn test_axis_range() {
        let r = AxisRange::new(2, 10, 3);
        assert_eq!(r.iter().collect::<Vec<_>>(), vec![2, 5, 8]);
        assert_eq!(r.count(), 3);
        assert!(r.contains(5));
        assert!(!r.contains(6));
        assert!(!r.contains(11));
        assert_eq!(AxisRange::new(4, 3, 1).count(), 0);
    }

    #[test]
    fn test_parse_list_stops_at_blank_line() {
        let text = "\
[fault.load]
0

[fault.outputlist]
vfault
V 0 100 10 0 4 1 0 0 1
sn
Sn 5 5 1 0 4 2 0 2 1

ignored
U 0 1 1 0 0 1 0 0 1
";
        let units = parse(text).unwrap();
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].name, "vfault");
        assert_eq!(units[0].field, FieldName::SlipVelocity);
        assert_eq!(units[0].steps, AxisRange::new(0, 100, 10));
        assert_eq!(units[1].i, AxisRange::new(0, 4, 2));
    }

    #[test]
    fn test_parse_list_at_eof() {
        let units = parse("[fault.outputlist]\nu\nU 0 1 1 0 0 1 0 0 1").unwrap();
        assert_eq!(units.len(), 1);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse("no section\n"),
            Err(FaultError::MissingSection { .. })
        ));
        assert!(matches!(
            parse("[fault.outputlist]\nu\nVx 0 1 1 0 0 1 0 0 1\n"),
            Err(FaultError::Parse { line: 3, .. })
        ));
        assert!(matches!(
            parse("[fault.outputlist]\nu\nU 0 1 0 0 0 1 0 0 1\n"),
            Err(FaultError::Parse { .. })
        ));
        assert!(matches!(
            parse("[fault.outputlist]\nu\n"),
            Err(FaultError::Parse { .. })
        ));
    }

    fn snapshot(n1: usize, n2: usize) -> InterfaceSnapshot {
        let fields = std::array::from_fn(|_| vec![1.5; n1 * n2]);
        InterfaceSnapshot::new(n1, n2, 0.0, fields)
    }

    #[test]
    fn test_zero_stride_rejected_on_create() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = format!("{}/", dir.path().display());
        let base = OutputUnitConfig::every_step("v", FieldName::SlipVelocity, 4, 2);

        let mut steps = base.clone();
        steps.steps = AxisRange::new(0, 10, 0);
        let mut j = base.clone();
        j.j = AxisRange::new(0, 1, 0);
        for config in [steps, j] {
            assert!(matches!(
                OutputList::from_configs(vec![config], &prefix, 4, 2),
                Err(FaultError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn test_write_rejects_snapshot_of_other_fault() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = format!("{}/", dir.path().display());
        let config = OutputUnitConfig::every_step("v", FieldName::SlipVelocity, 4, 2);
        let mut list = OutputList::from_configs(vec![config], &prefix, 4, 2).unwrap();

        assert!(matches!(
            list.write_list(0, 0.0, &snapshot(2, 4)),
            Err(FaultError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            list.write_list(0, 0.0, &snapshot(4, 1)),
            Err(FaultError::ShapeMismatch { .. })
        ));
        list.write_list(0, 0.0, &snapshot(4, 2)).unwrap();
        assert_eq!(list.units()[0].n_written(), 1);
    }

    #[test]
    fn test_clip_axis() {
        let mut r = AxisRange::new(0, 99, 1);
        clip_axis("u", "i", &mut r, 10).unwrap();
        assert_eq!(r.stop, 9);

        let mut r = AxisRange::new(10, 12, 1);
        assert!(matches!(
            clip_axis("u", "i", &mut r, 10),
            Err(FaultError::InvalidConfig(_))
        ));
    }
}
