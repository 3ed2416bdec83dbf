//! Time-dependent boundary excitation.
//!
//! An excitation owns the loaded-boundary wiring and its current traction
//! value; the time-step pipeline updates it exactly once per step before
//! the solve. The update evaluates the load at the generalized-alpha
//! intermediate time t = (i + 1 - alpha_f) * delta_t, the instant where
//! the alpha method balances the momentum equation.

use crate::generalized_alpha::GeneralizedAlphaParameters;
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

/// A time-dependent boundary load feeding the weak-form residual
pub trait ExternalExcitation: Send {
    /// Wire the global DOF indices of the loaded boundary
    fn set_loaded_dofs(&mut self, dofs: Vec<usize>);

    /// Advance the excitation to step `i` (idempotent for a fixed `i`)
    fn update(&mut self, alpha: &GeneralizedAlphaParameters, delta_t: f64, step_index: usize);

    /// The current external load vector
    fn load_vector(&self, num_dofs: usize) -> DVector<f64>;
}

/// Sinusoidal traction applied to the loaded boundary
#[derive(Debug, Clone)]
pub struct SineExcitation {
    /// Peak traction magnitude
    pub amplitude: f64,
    /// Excitation frequency in Hz
    pub frequency_hz: f64,
    loaded_dofs: Vec<usize>,
    current_value: f64,
}

impl SineExcitation {
    /// Create a sine excitation; the value is zero until the first update
    pub fn new(amplitude: f64, frequency_hz: f64) -> Self {
        Self {
            amplitude,
            frequency_hz,
            loaded_dofs: Vec::new(),
            current_value: 0.0,
        }
    }

    /// Current traction value (for diagnostics/tests)
    pub fn current_value(&self) -> f64 {
        self.current_value
    }
}

impl ExternalExcitation for SineExcitation {
    fn set_loaded_dofs(&mut self, dofs: Vec<usize>) {
        self.loaded_dofs = dofs;
    }

    fn update(&mut self, alpha: &GeneralizedAlphaParameters, delta_t: f64, step_index: usize) {
        let t = (step_index as f64 + 1.0 - alpha.alpha_f) * delta_t;
        self.current_value =
            self.amplitude * (2.0 * std::f64::consts::PI * self.frequency_hz * t).sin();
    }

    fn load_vector(&self, num_dofs: usize) -> DVector<f64> {
        let mut f = DVector::zeros(num_dofs);
        for &dof in &self.loaded_dofs {
            if dof < num_dofs {
                f[dof] = self.current_value;
            }
        }
        f
    }
}

/// Constant load on the loaded boundary (regression/static-limit runs)
#[derive(Debug, Clone)]
pub struct StaticLoad {
    /// Constant traction magnitude
    pub magnitude: f64,
    loaded_dofs: Vec<usize>,
}

impl StaticLoad {
    /// Create a constant load
    pub fn new(magnitude: f64) -> Self {
        Self {
            magnitude,
            loaded_dofs: Vec::new(),
        }
    }
}

impl ExternalExcitation for StaticLoad {
    fn set_loaded_dofs(&mut self, dofs: Vec<usize>) {
        self.loaded_dofs = dofs;
    }

    fn update(&mut self, _alpha: &GeneralizedAlphaParameters, _delta_t: f64, _step_index: usize) {}

    fn load_vector(&self, num_dofs: usize) -> DVector<f64> {
        let mut f = DVector::zeros(num_dofs);
        for &dof in &self.loaded_dofs {
            if dof < num_dofs {
                f[dof] = self.magnitude;
            }
        }
        f
    }
}

/// Excitation selection for a simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExcitationConfig {
    /// Sinusoidal traction
    Sine { amplitude: f64, frequency_hz: f64 },
    /// Constant traction
    Constant { magnitude: f64 },
}

impl ExcitationConfig {
    /// Build the concrete excitation
    pub fn build(&self) -> Box<dyn ExternalExcitation> {
        match *self {
            ExcitationConfig::Sine {
                amplitude,
                frequency_hz,
            } => Box::new(SineExcitation::new(amplitude, frequency_hz)),
            ExcitationConfig::Constant { magnitude } => Box::new(StaticLoad::new(magnitude)),
        }
    }
}
