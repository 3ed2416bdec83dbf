//! Solution fields and the Newmark-consistent field update.
//!
//! `Fields` is the exclusively owned state aggregate threaded through the
//! step pipeline: old displacement/velocity/acceleration plus the trial
//! new displacement. Allocated once when the discretization is fixed,
//! overwritten every step, never reallocated during a run.

use crate::error::{Result, SolverError};
use eld_model::VectorSpace;
use nalgebra::DVector;

/// The per-run solution field set
#[derive(Debug, Clone, PartialEq)]
pub struct Fields {
    /// Displacement at the previous step
    pub u_old: DVector<f64>,
    /// Velocity at the previous step
    pub v_old: DVector<f64>,
    /// Acceleration at the previous step
    pub a_old: DVector<f64>,
    /// Trial/new displacement, written by the solve
    pub u_new: DVector<f64>,
}

impl Fields {
    /// Allocate zeroed fields for a generated function space
    pub fn generate(space: &VectorSpace) -> Self {
        let n = space.num_dofs;
        Self {
            u_old: DVector::zeros(n),
            v_old: DVector::zeros(n),
            a_old: DVector::zeros(n),
            u_new: DVector::zeros(n),
        }
    }

    /// Number of degrees of freedom
    pub fn num_dofs(&self) -> usize {
        self.u_old.len()
    }

    /// Overwrite the old-step state (initial conditions)
    pub fn set_initial_conditions(
        &mut self,
        u0: DVector<f64>,
        v0: DVector<f64>,
        a0: DVector<f64>,
    ) -> Result<()> {
        let n = self.num_dofs();
        if u0.len() != n || v0.len() != n || a0.len() != n {
            return Err(SolverError::Config(format!(
                "Initial conditions must have {} DOFs, got ({}, {}, {})",
                n,
                u0.len(),
                v0.len(),
                a0.len()
            )));
        }
        self.u_old = u0.clone();
        self.v_old = v0;
        self.a_old = a0;
        self.u_new = u0;
        Ok(())
    }
}

/// Advances old-step fields to new-step fields after a converged solve.
///
/// Given (u_old, v_old, a_old, u_new), produces the Newmark-consistent
/// (v_new, a_new) and rolls new -> old:
///
/// ```text
/// a_new = (u_new - u_old - dt*v_old)/(beta*dt^2) - (1-2*beta)/(2*beta)*a_old
/// v_new = v_old + dt*((1-gamma)*a_old + gamma*a_new)
/// ```
///
/// Runs exactly once per step, after the solve, before persistence.
#[derive(Debug, Clone, Copy)]
pub struct FieldUpdates {
    beta: f64,
    gamma: f64,
}

impl FieldUpdates {
    /// Create the update operator, rejecting beta <= 0 (division by zero)
    pub fn new(beta: f64, gamma: f64) -> Result<Self> {
        if !beta.is_finite() || beta <= 0.0 {
            return Err(SolverError::Config(format!(
                "Field update requires beta > 0, got {}",
                beta
            )));
        }
        if !gamma.is_finite() {
            return Err(SolverError::Config(format!(
                "Field update requires finite gamma, got {}",
                gamma
            )));
        }
        Ok(Self { beta, gamma })
    }

    /// Update velocity/acceleration from the solved u_new, then roll
    /// new-step fields into the old-step slots
    pub fn run(&self, fields: &mut Fields, delta_t: f64) -> Result<()> {
        if !delta_t.is_finite() || delta_t <= 0.0 {
            return Err(SolverError::Config(format!(
                "Field update requires delta_t > 0, got {}",
                delta_t
            )));
        }

        let dt2 = delta_t * delta_t;
        let a_new = (&fields.u_new - &fields.u_old - delta_t * &fields.v_old)
            / (self.beta * dt2)
            - ((1.0 - 2.0 * self.beta) / (2.0 * self.beta)) * &fields.a_old;
        let v_new = &fields.v_old
            + delta_t * ((1.0 - self.gamma) * &fields.a_old + self.gamma * &a_new);

        fields.u_old = fields.u_new.clone();
        fields.v_old = v_new;
        fields.a_old = a_new;
        Ok(())
    }
}
