//! Read-only view of the interface fields for output.

use std::fmt;
use std::str::FromStr;

use crate::error::FaultError;
use crate::types::PointIndex;

/// Named per-point interface field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldName {
    /// Cumulative slip magnitude
    Slip,
    /// Cumulative slip, shear-2 component
    Slip2,
    /// Cumulative slip, shear-3 component
    Slip3,
    /// Slip velocity magnitude
    SlipVelocity,
    /// Slip velocity, shear-2 component
    SlipVelocity2,
    /// Slip velocity, shear-3 component
    SlipVelocity3,
    /// Total normal traction (tension positive)
    NormalStress,
    /// Total shear traction, shear-2 component
    ShearStress2,
    /// Total shear traction, shear-3 component
    ShearStress3,
    /// Friction memory variable
    State,
}

impl FieldName {
    /// All fields in storage order.
    pub const ALL: [FieldName; 10] = [
        FieldName::Slip,
        FieldName::Slip2,
        FieldName::Slip3,
        FieldName::SlipVelocity,
        FieldName::SlipVelocity2,
        FieldName::SlipVelocity3,
        FieldName::NormalStress,
        FieldName::ShearStress2,
        FieldName::ShearStress3,
        FieldName::State,
    ];

    /// Short name used in output-list files and on disk.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::Slip => "U",
            FieldName::Slip2 => "U2",
            FieldName::Slip3 => "U3",
            FieldName::SlipVelocity => "V",
            FieldName::SlipVelocity2 => "V2",
            FieldName::SlipVelocity3 => "V3",
            FieldName::NormalStress => "Sn",
            FieldName::ShearStress2 => "S2",
            FieldName::ShearStress3 => "S3",
            FieldName::State => "state",
        }
    }

    #[inline]
    fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldName {
    type Err = FaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldName::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| FaultError::UnknownField(s.to_string()))
    }
}

/// Owned copy of all interface fields at one instant.
///
/// Arrays are flat row-major over `(i, j)`. Tractions are totals: the
/// resolved field traction plus background and load.
#[derive(Clone, Debug, PartialEq)]
pub struct InterfaceSnapshot {
    /// Points along the first axis
    pub n1: usize,
    /// Points along the second axis
    pub n2: usize,
    /// Time of the last interface solve
    pub t: f64,
    fields: [Vec<f64>; 10],
}

impl InterfaceSnapshot {
    pub(crate) fn new(n1: usize, n2: usize, t: f64, fields: [Vec<f64>; 10]) -> Self {
        Self { n1, n2, t, fields }
    }

    /// Array for one field.
    pub fn field(&self, name: FieldName) -> &[f64] {
        &self.fields[name.slot()]
    }

    /// Value of a field at a point.
    ///
    /// # Errors
    /// `PointOutOfRange` if the point is not on the snapshot's fault.
    pub fn at(&self, name: FieldName, p: PointIndex) -> Result<f64, FaultError> {
        let k = p.checked_flat(self.n1, self.n2)?;
        Ok(self.fields[name.slot()][k])
    }

    /// Number of points.
    pub fn n_points(&self) -> usize {
        self.n1 * self.n2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_names_roundtrip() {
        for f in FieldName::ALL {
            assert_eq!(f.as_str().parse::<FieldName>().unwrap(), f);
        }
        assert!(matches!(
            "Vx".parse::<FieldName>(),
            Err(FaultError::UnknownField(_))
        ));
    }

    #[test]
    fn test_point_lookup_is_bounds_checked() {
        let mut fields: [Vec<f64>; 10] = std::array::from_fn(|_| vec![0.0; 6]);
        fields[3][3] = 2.5;
        let snap = InterfaceSnapshot::new(2, 3, 0.0, fields);

        assert_eq!(snap.at(FieldName::SlipVelocity, PointIndex::new(1, 0)).unwrap(), 2.5);
        assert!(matches!(
            snap.at(FieldName::SlipVelocity, PointIndex::new(0, 3)),
            Err(FaultError::PointOutOfRange { .. })
        ));
    }

    #[test]
    fn test_slots_follow_storage_order() {
        for (n, f) in FieldName::ALL.iter().enumerate() {
            assert_eq!(f.slot(), n);
        }
    }
}
