//! Plain-data description of a fault interface.

use crate::error::Result;
use crate::friction::{
    FrictionModel, Frictionless, RateState, RateStateParams, SlipWeakening, SlipWeakeningParams,
};
use crate::load::{Load, LoadSchedule};
use crate::material::{ImpedanceField, Material};
use crate::types::FaultGrid;

use super::FrictionInterface;

/// Friction law selection with its parameters.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FrictionConfig {
    #[default]
    Frictionless,
    SlipWeakening(SlipWeakeningParams),
    RateState(RateStateParams),
}

/// Everything needed to build a [`FrictionInterface`] on a uniform grid.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InterfaceConfig {
    /// Points along the first fault axis
    pub n1: usize,
    /// Points along the second fault axis
    pub n2: usize,
    /// Coordinates of point (0, 0)
    pub origin: (f64, f64),
    /// Grid spacing along each axis
    pub spacing: (f64, f64),
    /// Material on the minus side
    pub side1: Material,
    /// Material on the plus side
    pub side2: Material,
    /// Uniform background traction (normal, shear-2, shear-3)
    pub background: [f64; 3],
    pub friction: FrictionConfig,
    /// Loads, applied in order
    pub loads: Vec<Load>,
}

impl Default for InterfaceConfig {
    fn default() -> Self {
        Self {
            n1: 1,
            n2: 1,
            origin: (0.0, 0.0),
            spacing: (1.0, 1.0),
            side1: Material::default(),
            side2: Material::default(),
            background: [0.0; 3],
            friction: FrictionConfig::default(),
            loads: Vec::new(),
        }
    }
}

impl InterfaceConfig {
    /// `n1 × n2` grid with the given spacing and default materials.
    pub fn new(n1: usize, n2: usize, spacing: (f64, f64)) -> Self {
        Self {
            n1,
            n2,
            spacing,
            ..Default::default()
        }
    }

    pub fn with_origin(mut self, origin: (f64, f64)) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_materials(mut self, side1: Material, side2: Material) -> Self {
        self.side1 = side1;
        self.side2 = side2;
        self
    }

    pub fn with_background(mut self, background: [f64; 3]) -> Self {
        self.background = background;
        self
    }

    pub fn with_friction(mut self, friction: FrictionConfig) -> Self {
        self.friction = friction;
        self
    }

    pub fn with_load(mut self, load: Load) -> Self {
        self.loads.push(load);
        self
    }

    /// Fault grid described by this configuration.
    pub fn grid(&self) -> FaultGrid {
        FaultGrid::uniform(self.n1, self.n2, self.origin, self.spacing)
    }

    /// Build the interface.
    ///
    /// # Errors
    /// Invalid materials or friction parameters.
    pub fn build(&self) -> Result<FrictionInterface<FrictionModel>> {
        let grid = self.grid();
        let impedance = ImpedanceField::uniform(&grid, self.side1, self.side2)?;
        let law = match &self.friction {
            FrictionConfig::Frictionless => FrictionModel::from(Frictionless),
            FrictionConfig::SlipWeakening(p) => SlipWeakening::new(&grid, p)?.into(),
            FrictionConfig::RateState(p) => RateState::new(&grid, p)?.into(),
        };

        let mut loads = LoadSchedule::new(&grid);
        for load in &self.loads {
            loads.push(*load);
        }

        let [sn, s2, s3] = self.background;
        FrictionInterface::new(grid, impedance, law)?
            .with_background(sn, s2, s3)
            .with_loads(loads)
    }
}
