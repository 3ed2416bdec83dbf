//! Constitutive relations: material laws mapping strain to stress.
//!
//! The alpha method mixes an explicit stress evaluation on the old state
//! with an implicit one on the new state, so a relation exposes both
//! branches as named operations. For a linear material they coincide; the
//! trait is the seam for history-dependent laws whose branches differ.

use crate::error::{Result, SolverError};

/// Which material branch an operator assembly should use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StressBranch {
    /// Explicit evaluation on the previous-step state
    Old,
    /// Implicit evaluation on the trial new state
    New,
}

/// A material law mapping axial strain to axial stress
pub trait ConstitutiveRelation: Send + Sync {
    /// Stress from strain on the previous-step branch
    fn old_value(&self, strain: f64) -> f64;

    /// Stress from strain on the implicit new-step branch
    fn new_value(&self, strain: f64) -> f64;

    /// Evaluate the requested branch
    fn value(&self, branch: StressBranch, strain: f64) -> f64 {
        match branch {
            StressBranch::Old => self.old_value(strain),
            StressBranch::New => self.new_value(strain),
        }
    }
}

/// Linear elasticity: stress = E * strain on both branches
#[derive(Debug, Clone, Copy)]
pub struct LinearElastic {
    /// Young's modulus
    pub youngs_modulus: f64,
}

impl LinearElastic {
    /// Create a linear-elastic law, rejecting a non-positive modulus
    pub fn new(youngs_modulus: f64) -> Result<Self> {
        if !youngs_modulus.is_finite() || youngs_modulus <= 0.0 {
            return Err(SolverError::Config(format!(
                "Young's modulus must be positive, got {}",
                youngs_modulus
            )));
        }
        Ok(Self { youngs_modulus })
    }
}

impl ConstitutiveRelation for LinearElastic {
    fn old_value(&self, strain: f64) -> f64 {
        self.youngs_modulus * strain
    }

    fn new_value(&self, strain: f64) -> f64 {
        self.youngs_modulus * strain
    }
}
