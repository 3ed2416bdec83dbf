//! Time-integration parameters for the generalized-alpha method.
//!
//! The generalized-alpha scheme integrates the semi-discrete equations of
//! motion M*ü + C*u̇ + K*u = F(t) implicitly, parametrized by
//! (alpha_f, alpha_m, beta, gamma) which control numerical damping and
//! stability. Standard choices:
//!
//! - **Newmark average acceleration** (unconditionally stable, no
//!   numerical damping): alpha_f = alpha_m = 0, beta = 1/4, gamma = 1/2
//! - **Spectral-radius family**: given the high-frequency spectral radius
//!   rho_inf in [0, 1], the second-order accurate, unconditionally stable
//!   member is
//!   alpha_m = (2*rho - 1)/(rho + 1), alpha_f = rho/(rho + 1),
//!   gamma = 1/2 - alpha_m + alpha_f, beta = (1 - alpha_m + alpha_f)^2/4

use crate::error::{Result, SolverError};
use serde::{Deserialize, Serialize};

/// Generalized-alpha integration coefficients
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeneralizedAlphaParameters {
    /// Newmark gamma (velocity weighting)
    pub gamma: f64,
    /// Newmark beta (acceleration weighting)
    pub beta: f64,
    /// Alpha shift of the stiffness/damping terms
    pub alpha_f: f64,
    /// Alpha shift of the inertia terms
    pub alpha_m: f64,
}

impl GeneralizedAlphaParameters {
    /// Create parameters from explicit coefficients (no validation; use
    /// `validate` or construct the consuming form to fail fast)
    pub fn new(gamma: f64, beta: f64, alpha_f: f64, alpha_m: f64) -> Self {
        Self {
            gamma,
            beta,
            alpha_f,
            alpha_m,
        }
    }

    /// Newmark average acceleration: gamma = 1/2, beta = 1/4, no alpha shift
    pub fn newmark_average_acceleration() -> Self {
        Self::new(0.5, 0.25, 0.0, 0.0)
    }

    /// Second-order accurate generalized-alpha member with the given
    /// high-frequency spectral radius rho_inf in [0, 1]
    pub fn from_spectral_radius(rho_inf: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&rho_inf) {
            return Err(SolverError::Config(format!(
                "Spectral radius must lie in [0, 1], got {}",
                rho_inf
            )));
        }
        let alpha_m = (2.0 * rho_inf - 1.0) / (rho_inf + 1.0);
        let alpha_f = rho_inf / (rho_inf + 1.0);
        let gamma = 0.5 - alpha_m + alpha_f;
        let beta = 0.25 * (1.0 - alpha_m + alpha_f).powi(2);
        Ok(Self::new(gamma, beta, alpha_f, alpha_m))
    }

    /// Check the stability/accuracy ranges: 0 < beta <= 1/2, 0 <= gamma <= 1
    pub fn validate(&self) -> Result<()> {
        if !self.beta.is_finite() || self.beta <= 0.0 || self.beta > 0.5 {
            return Err(SolverError::Config(format!(
                "beta must satisfy 0 < beta <= 0.5, got {}",
                self.beta
            )));
        }
        if !self.gamma.is_finite() || !(0.0..=1.0).contains(&self.gamma) {
            return Err(SolverError::Config(format!(
                "gamma must lie in [0, 1], got {}",
                self.gamma
            )));
        }
        Ok(())
    }
}

impl Default for GeneralizedAlphaParameters {
    fn default() -> Self {
        Self::newmark_average_acceleration()
    }
}

/// Time axis of the simulation: fixed step size and step count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSteppingParameters {
    /// Time step size
    pub delta_t: f64,
    /// Number of steps after the initial condition
    pub num_steps: usize,
}

impl TimeSteppingParameters {
    /// Create time-stepping parameters, rejecting a non-positive step
    pub fn new(delta_t: f64, num_steps: usize) -> Result<Self> {
        let params = Self { delta_t, num_steps };
        params.validate()?;
        Ok(params)
    }

    /// Check delta_t > 0 and num_steps > 0
    pub fn validate(&self) -> Result<()> {
        if !self.delta_t.is_finite() || self.delta_t <= 0.0 {
            return Err(SolverError::Config(format!(
                "delta_t must be positive, got {}",
                self.delta_t
            )));
        }
        if self.num_steps == 0 {
            return Err(SolverError::Config(
                "At least one time step is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Final physical time of the run
    pub fn total_time(&self) -> f64 {
        self.num_steps as f64 * self.delta_t
    }

    /// The discrete time axis: num_steps + 1 strictly increasing samples
    /// starting at t = 0 (the initial condition)
    pub fn linear_time_space(&self) -> Vec<f64> {
        (0..=self.num_steps)
            .map(|i| i as f64 * self.delta_t)
            .collect()
    }
}
