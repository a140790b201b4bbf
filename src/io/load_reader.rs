//! Reader for load descriptor files.
//!
//! # File Format
//!
//! ```text
//! # Nucleation loads for a TPV-style problem
//! [fault.load]
//! 2
//! # shape     t0   x0_1  x0_2  a_1  a_2   sn     s2    s3
//! boxcar      0.0  0.0   7.5   1.5  1.5   0.0    11.6  0.0
//! gaussian    0.5  5.0   0.0   2.0  0.0   -5.0   0.0   0.0
//! ```
//!
//! Everything before the section header is ignored. After it, the first
//! non-comment line is the number of loads, followed by one record per line.
//! Missing sections, short records and unknown shapes are all fatal.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{FaultError, Result};
use crate::load::{Footprint, Load, Shape};

/// Section header that starts the load list.
pub const LOAD_SECTION: &str = "[fault.load]";

const LOAD_FIELDS: usize = 9;

/// Read all loads from a file.
///
/// # Errors
/// - `Io` if the file cannot be opened or read
/// - `MissingSection` if `[fault.load]` is absent
/// - `Parse` for a malformed count or record
pub fn read_load_file(path: &Path) -> Result<Vec<Load>> {
    let file = File::open(path)?;
    parse_loads(BufReader::new(file), path)
}

/// Parse loads from any buffered reader; `path` is used for error messages.
pub fn parse_loads<R: BufRead>(reader: R, path: &Path) -> Result<Vec<Load>> {
    let mut lines = reader.lines().enumerate();

    // Scan to the section header
    let mut found = false;
    for (_, line) in lines.by_ref() {
        if line?.trim() == LOAD_SECTION {
            found = true;
            break;
        }
    }
    if !found {
        return Err(FaultError::MissingSection {
            path: path.to_path_buf(),
            section: LOAD_SECTION.to_string(),
        });
    }

    let mut data = lines.filter_map(|(idx, line)| match line {
        Ok(l) => {
            let trimmed = l.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                None
            } else {
                Some(Ok((idx + 1, trimmed.to_string())))
            }
        }
        Err(e) => Some(Err(e)),
    });

    let (count_line, count_text) = match data.next() {
        Some(item) => item?,
        None => {
            return Err(FaultError::parse(path, 0, "missing load count after section header"));
        }
    };
    let count: usize = count_text.parse().map_err(|_| {
        FaultError::parse(
            path,
            count_line,
            format!("invalid load count '{count_text}'"),
        )
    })?;

    let mut loads = Vec::with_capacity(count);
    for _ in 0..count {
        let (line_num, text) = match data.next() {
            Some(item) => item?,
            None => {
                return Err(FaultError::parse(
                    path,
                    count_line,
                    format!("expected {count} loads, found {}", loads.len()),
                ));
            }
        };
        loads.push(parse_record(&text, path, line_num)?);
    }

    Ok(loads)
}

fn parse_record(text: &str, path: &Path, line: usize) -> Result<Load> {
    let parts: Vec<&str> = text.split_whitespace().collect();
    if parts.len() != LOAD_FIELDS {
        return Err(FaultError::parse(
            path,
            line,
            format!("expected {LOAD_FIELDS} fields, got {}", parts.len()),
        ));
    }

    let shape: Shape = parts[0]
        .parse()
        .map_err(|e: FaultError| FaultError::parse(path, line, e.to_string()))?;

    let mut values = [0.0; LOAD_FIELDS - 1];
    for (slot, token) in values.iter_mut().zip(&parts[1..]) {
        *slot = token
            .parse()
            .map_err(|_| FaultError::parse(path, line, format!("invalid number '{token}'")))?;
    }
    let [t0, c1, c2, a1, a2, sn, s2, s3] = values;

    if t0 < 0.0 {
        return Err(FaultError::parse(path, line, "ramp time must be non-negative"));
    }

    Ok(Load::new(
        Footprint::new(shape, (c1, c2), (a1, a2)),
        t0,
        [sn, s2, s3],
    ))
}

/// Read a per-point load file: `n` normal values, then `n` shear-2, then `n` shear-3.
///
/// Values may be split across lines in any way.
pub fn read_point_load_file(path: &Path, n: usize) -> Result<[Vec<f64>; 3]> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut values = Vec::with_capacity(3 * n);
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let content = line.split('#').next().unwrap_or("");
        for token in content.split_whitespace() {
            let v: f64 = token.parse().map_err(|_| {
                FaultError::parse(path, idx + 1, format!("invalid number '{token}'"))
            })?;
            values.push(v);
        }
    }

    if values.len() != 3 * n {
        return Err(FaultError::shape_mismatch("point load file", 3 * n, values.len()));
    }

    let s3 = values.split_off(2 * n);
    let s2 = values.split_off(n);
    Ok([values, s2, s3])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    fn parse(text: &str) -> Result<Vec<Load>> {
        parse_loads(Cursor::new(text), Path::new("test.in"))
    }

    #[test]
    fn test_parse_two_loads() {
        let text = "\
[fault.friction]
ignored 1 2 3

[fault.load]
# two loads
2
boxcar 0.0 0.0 7.5 1.5 1.5 0.0 11.6 0.0
gaussian 0.5 5.0 0.0 2.0 0.0 -5.0 0.0 0.0
";
        let loads = parse(text).unwrap();
        assert_eq!(loads.len(), 2);
        assert_eq!(loads[0].footprint.shape, Shape::Boxcar);
        assert_eq!(loads[0].amplitude, [0.0, 11.6, 0.0]);
        assert_eq!(loads[1].t0, 0.5);
        assert_eq!(loads[1].footprint.length, (2.0, 0.0));
    }

    #[test]
    fn test_missing_section() {
        let err = parse("[fault.outputlist]\n").unwrap_err();
        assert!(matches!(err, FaultError::MissingSection { .. }));
    }

    #[test]
    fn test_short_record_reports_line() {
        let text = "[fault.load]\n1\nboxcar 0.0 0.0\n";
        match parse(text) {
            Err(FaultError::Parse { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_too_few_records() {
        let text = "[fault.load]\n2\nconstant 0 0 0 0 0 1 0 0\n";
        assert!(matches!(parse(text), Err(FaultError::Parse { .. })));
    }

    #[test]
    fn test_unknown_shape() {
        let text = "[fault.load]\n1\nstar 0 0 0 0 0 1 0 0\n";
        assert!(matches!(parse(text), Err(FaultError::Parse { .. })));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = read_load_file(Path::new("/nonexistent/loads.in")).unwrap_err();
        assert!(matches!(err, FaultError::Io(_)));
    }

    #[test]
    fn test_point_load_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "-1 -2 # normal").unwrap();
        writeln!(file, "3 4").unwrap();
        writeln!(file, "0 0").unwrap();
        file.flush().unwrap();

        let [sn, s2, s3] = read_point_load_file(file.path(), 2).unwrap();
        assert_eq!(sn, vec![-1.0, -2.0]);
        assert_eq!(s2, vec![3.0, 4.0]);
        assert_eq!(s3, vec![0.0, 0.0]);

        assert!(matches!(
            read_point_load_file(file.path(), 3),
            Err(FaultError::ShapeMismatch { .. })
        ));
    }
}
