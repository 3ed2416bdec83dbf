//! FEM solve capability: assemble, constrain, solve, write u_new.
//!
//! Two concrete solvers are carried behind the `FemSolver` trait: a
//! direct linear solve (LU) and a Newton-Raphson iteration. For the
//! linear material Newton converges in one iteration; it is the seam for
//! nonlinear constitutive relations. Non-convergence and singular
//! operators are fatal for the run; there is no automatic step-size
//! reduction.

use crate::error::{Result, SolverError};
use crate::fields::Fields;
use crate::form::ElastodynamicsForm;
use eld_model::{DirichletBc, Mesh, VectorSpace};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Solver convergence and diagnostic info
#[derive(Debug, Clone)]
pub struct SolveInfo {
    /// Number of iterations (1 for the direct solver)
    pub iterations: usize,
    /// Final residual norm, when the solver tracks one
    pub residual_norm: Option<f64>,
    /// Human-readable solver name
    pub solver_name: String,
}

/// The external solve capability consumed by the time-step pipeline
pub trait FemSolver: Send {
    /// Assemble lhs/rhs for the current state, apply essential BCs,
    /// solve, and write the result into `fields.u_new`
    fn run(&mut self, fields: &mut Fields, f_ext: &DVector<f64>) -> Result<SolveInfo>;
}

/// Apply essential boundary conditions by row/column elimination with
/// prescribed values, keeping the operator symmetric
fn apply_dirichlet(
    a: &mut DMatrix<f64>,
    b: &mut DVector<f64>,
    bcs: &[DirichletBc],
    space: &VectorSpace,
) {
    let n = a.nrows();
    for bc in bcs {
        let d = bc.dof(space);
        for i in 0..n {
            if i != d {
                b[i] -= a[(i, d)] * bc.value;
            }
        }
        for i in 0..n {
            a[(i, d)] = 0.0;
            a[(d, i)] = 0.0;
        }
        a[(d, d)] = 1.0;
        b[d] = bc.value;
    }
}

/// Direct linear solve of the assembled step system
pub struct LinearFemSolver {
    form: ElastodynamicsForm,
    mesh: Mesh,
    space: VectorSpace,
    bcs: Vec<DirichletBc>,
}

impl LinearFemSolver {
    /// Create a linear solver owning its discretization and form
    pub fn new(
        form: ElastodynamicsForm,
        mesh: Mesh,
        space: VectorSpace,
        bcs: Vec<DirichletBc>,
    ) -> Self {
        Self {
            form,
            mesh,
            space,
            bcs,
        }
    }
}

impl FemSolver for LinearFemSolver {
    fn run(&mut self, fields: &mut Fields, f_ext: &DVector<f64>) -> Result<SolveInfo> {
        let mut a = self.form.lhs_matrix(&self.mesh, &self.space)?;
        let mut b = self.form.rhs_vector(&self.mesh, &self.space, fields, f_ext)?;
        apply_dirichlet(&mut a, &mut b, &self.bcs, &self.space);

        let u = a
            .lu()
            .solve(&b)
            .ok_or_else(|| SolverError::Singular("LU factorization failed".to_string()))?;
        fields.u_new = u;

        Ok(SolveInfo {
            iterations: 1,
            residual_norm: None,
            solver_name: "nalgebra-LU".to_string(),
        })
    }
}

/// Newton-Raphson configuration
#[derive(Debug, Clone, Copy)]
pub struct NewtonConfig {
    /// Maximum number of iterations
    pub max_iterations: usize,
    /// Relative force residual tolerance
    pub tol_force: f64,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: 25,
            tol_force: 1e-10,
        }
    }
}

/// Newton-Raphson solve of the step system
pub struct NewtonFemSolver {
    form: ElastodynamicsForm,
    mesh: Mesh,
    space: VectorSpace,
    bcs: Vec<DirichletBc>,
    config: NewtonConfig,
}

impl NewtonFemSolver {
    /// Create a Newton solver with the default convergence settings
    pub fn new(
        form: ElastodynamicsForm,
        mesh: Mesh,
        space: VectorSpace,
        bcs: Vec<DirichletBc>,
    ) -> Self {
        Self {
            form,
            mesh,
            space,
            bcs,
            config: NewtonConfig::default(),
        }
    }

    /// Override the convergence settings
    pub fn with_config(mut self, config: NewtonConfig) -> Self {
        self.config = config;
        self
    }
}

impl FemSolver for NewtonFemSolver {
    fn run(&mut self, fields: &mut Fields, f_ext: &DVector<f64>) -> Result<SolveInfo> {
        let mut a = self.form.lhs_matrix(&self.mesh, &self.space)?;
        let mut b = self.form.rhs_vector(&self.mesh, &self.space, fields, f_ext)?;
        apply_dirichlet(&mut a, &mut b, &self.bcs, &self.space);

        let lu = a.clone().lu();
        let b_norm = b.norm().max(1.0);

        // Predictor: start from the old displacement
        let mut u = fields.u_old.clone();
        let mut r = &b - &a * &u;
        let mut r_norm = r.norm();
        let mut prev_norm = r_norm;

        for iter in 0..self.config.max_iterations {
            if r_norm / b_norm < self.config.tol_force {
                fields.u_new = u;
                return Ok(SolveInfo {
                    iterations: iter,
                    residual_norm: Some(r_norm),
                    solver_name: "Newton-Raphson".to_string(),
                });
            }

            let du = lu.solve(&r).ok_or_else(|| {
                SolverError::Singular("Tangent factorization failed".to_string())
            })?;
            u += du;
            r = &b - &a * &u;
            r_norm = r.norm();

            if r_norm > prev_norm * 10.0 {
                return Err(SolverError::NonConvergence {
                    iterations: iter + 1,
                    residual: r_norm,
                });
            }
            prev_norm = r_norm;
        }

        if r_norm / b_norm < self.config.tol_force {
            fields.u_new = u;
            return Ok(SolveInfo {
                iterations: self.config.max_iterations,
                residual_norm: Some(r_norm),
                solver_name: "Newton-Raphson".to_string(),
            });
        }

        Err(SolverError::NonConvergence {
            iterations: self.config.max_iterations,
            residual: r_norm,
        })
    }
}

/// FEM solver selection tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FemSolverKind {
    /// Direct LU solve
    Linear,
    /// Newton-Raphson iteration
    Newton,
}

/// Build the concrete solve capability for a selection tag
pub fn get_fem_solver(
    kind: FemSolverKind,
    form: ElastodynamicsForm,
    mesh: Mesh,
    space: VectorSpace,
    bcs: Vec<DirichletBc>,
) -> Box<dyn FemSolver> {
    match kind {
        FemSolverKind::Linear => Box::new(LinearFemSolver::new(form, mesh, space, bcs)),
        FemSolverKind::Newton => Box::new(NewtonFemSolver::new(form, mesh, space, bcs)),
    }
}
