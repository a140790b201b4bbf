//! Two-sided boundary fields and characteristic impedance matching.
//!
//! The bulk solver hands the interface one [`BoundFields`] record per side and
//! per point: velocity and traction just off the fault, in local components
//! `[normal, shear_2, shear_3]`. The fault normal points from side 1 to side 2.
//!
//! # Characteristics
//!
//! For each component with impedance `z`, the outgoing characteristics are
//!
//! ```text
//! side 1:  P1 = s1 - z1 v1      (travels towards +n, into the fault)
//! side 2:  P2 = s2 + z2 v2      (travels towards -n, into the fault)
//! ```
//!
//! These are preserved by the interface condition. For any interface traction
//! `s`, the side velocities follow as `v1 = (s - P1)/z1` and `v2 = (P2 - s)/z2`.
//!
//! # Welded contact
//!
//! Requiring `v1 = v2` gives the locked solution
//!
//! ```text
//! v = (P2 - P1) / (z1 + z2)
//! s = (P1/z1 + P2/z2) / (1/z1 + 1/z2)
//! ```
//!
//! With traction continuity but free sliding, the slip velocity is
//! `V = v2 - v1 = (s_welded - s) / η` with `η = z1 z2 / (z1 + z2)`. This is the
//! radiation-damping relation used by the friction laws.

use crate::material::Impedance;

/// Velocity and traction just off the fault on one side.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundFields {
    /// Particle velocity `[normal, shear_2, shear_3]`
    pub v: [f64; 3],
    /// Traction `[normal, shear_2, shear_3]` (tension positive)
    pub s: [f64; 3],
}

impl BoundFields {
    /// Create a new boundary record.
    pub fn new(v: [f64; 3], s: [f64; 3]) -> Self {
        Self { v, s }
    }

    /// Record at rest with given traction.
    pub fn at_rest(s: [f64; 3]) -> Self {
        Self { v: [0.0; 3], s }
    }

    /// Check that every component is finite.
    pub fn is_finite(&self) -> bool {
        self.v.iter().chain(self.s.iter()).all(|x| x.is_finite())
    }
}

/// Resolved interface fields, valid on both sides of the fault.
///
/// Tractions are continuous across the fault (`s1 == s2`); the slip velocity
/// is `v2 - v1`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IfFields {
    /// Velocity on side 1
    pub v1: [f64; 3],
    /// Velocity on side 2
    pub v2: [f64; 3],
    /// Traction on side 1
    pub s1: [f64; 3],
    /// Traction on side 2
    pub s2: [f64; 3],
}

impl IfFields {
    /// Slip velocity `v2 - v1` per component.
    #[inline]
    pub fn slip_velocity(&self) -> [f64; 3] {
        [
            self.v2[0] - self.v1[0],
            self.v2[1] - self.v1[1],
            self.v2[2] - self.v1[2],
        ]
    }

    /// Boundary record to hand back to the bulk solver on side 1.
    pub fn side1(&self) -> BoundFields {
        BoundFields::new(self.v1, self.s1)
    }

    /// Boundary record to hand back to the bulk solver on side 2.
    pub fn side2(&self) -> BoundFields {
        BoundFields::new(self.v2, self.s2)
    }

    /// Check that every component is finite.
    pub fn is_finite(&self) -> bool {
        self.v1
            .iter()
            .chain(&self.v2)
            .chain(&self.s1)
            .chain(&self.s2)
            .all(|x| x.is_finite())
    }
}

/// Outgoing characteristics of both sides at one point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Characteristics {
    /// Side 1 characteristic `s1 - z1 v1` per component
    pub p1: [f64; 3],
    /// Side 2 characteristic `s2 + z2 v2` per component
    pub p2: [f64; 3],
    /// Side 1 impedances
    pub z1: Impedance,
    /// Side 2 impedances
    pub z2: Impedance,
}

impl Characteristics {
    /// Project the two boundary records onto their outgoing characteristics.
    pub fn from_sides(b1: &BoundFields, b2: &BoundFields, z1: Impedance, z2: Impedance) -> Self {
        let mut p1 = [0.0; 3];
        let mut p2 = [0.0; 3];
        for c in 0..3 {
            p1[c] = b1.s[c] - z1.component(c) * b1.v[c];
            p2[c] = b2.s[c] + z2.component(c) * b2.v[c];
        }
        Self { p1, p2, z1, z2 }
    }

    /// Locked (welded) traction for component `c`.
    #[inline]
    pub fn welded_traction(&self, c: usize) -> f64 {
        let (z1, z2) = (self.z1.component(c), self.z2.component(c));
        (self.p1[c] / z1 + self.p2[c] / z2) / (1.0 / z1 + 1.0 / z2)
    }

    /// Locked (welded) velocity for component `c`.
    #[inline]
    pub fn welded_velocity(&self, c: usize) -> f64 {
        let (z1, z2) = (self.z1.component(c), self.z2.component(c));
        (self.p2[c] - self.p1[c]) / (z1 + z2)
    }

    /// Welded solution for all components.
    pub fn welded(&self) -> IfFields {
        let mut out = IfFields::default();
        for c in 0..3 {
            let v = self.welded_velocity(c);
            let s = self.welded_traction(c);
            out.v1[c] = v;
            out.v2[c] = v;
            out.s1[c] = s;
            out.s2[c] = s;
        }
        out
    }

    /// Side velocities consistent with interface traction `s` on component `c`.
    #[inline]
    pub fn side_velocities(&self, c: usize, s: f64) -> (f64, f64) {
        let v1 = (s - self.p1[c]) / self.z1.component(c);
        let v2 = (self.p2[c] - s) / self.z2.component(c);
        (v1, v2)
    }
}
