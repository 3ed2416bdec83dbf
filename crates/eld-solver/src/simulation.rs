//! Top-level simulation driver.
//!
//! Wires mesh, space, boundary conditions, excitation, fields, solver and
//! writer together, builds the time step, and loops over the discrete
//! time axis. Steps are strictly sequential: step i consumes the full
//! state produced by step i-1.

use crate::constitutive::{LinearElastic, StressBranch};
use crate::error::{Result, SolverError};
use crate::excitation::ExcitationConfig;
use crate::fem_solver::{FemSolverKind, get_fem_solver};
use crate::fields::{FieldUpdates, Fields};
use crate::form::ElastodynamicsForm;
use crate::generalized_alpha::{GeneralizedAlphaParameters, TimeSteppingParameters};
use crate::time_step_builder::{TimeStepBuilder, TimeStepKind};
use eld_io::{TimeSeriesReader, TimeSeriesWriter};
use eld_model::{BcBuilder, BoundaryMarker, Mesh, MeshBuilder, SpaceBuilder, VectorSpace};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Name under which displacement snapshots are persisted and read back
pub const DISPLACEMENT_FUNCTION: &str = "displacement";

/// Complete configuration of one transient run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationParameters {
    /// Bar length
    pub bar_length: f64,
    /// Number of bar elements
    pub num_elements: usize,
    /// Cross-sectional area
    pub cross_section_area: f64,
    /// Mass density
    pub mass_density: f64,
    /// Young's modulus of the linear-elastic material
    pub youngs_modulus: f64,
    /// Mass-proportional Rayleigh damping coefficient
    #[serde(default)]
    pub eta_m: f64,
    /// Stiffness-proportional Rayleigh damping coefficient
    #[serde(default)]
    pub eta_k: f64,
    /// Generalized-alpha integration parameters
    #[serde(default)]
    pub alpha_params: GeneralizedAlphaParameters,
    /// Time axis
    pub time_params: TimeSteppingParameters,
    /// Boundary excitation
    pub excitation: ExcitationConfig,
    /// Algebraic solve capability
    pub fem_solver_kind: FemSolverKind,
    /// Integration variant
    pub time_step_kind: TimeStepKind,
    /// Initial displacement per DOF (zero when absent)
    #[serde(default)]
    pub initial_displacement: Option<Vec<f64>>,
    /// Initial velocity per DOF (zero when absent)
    #[serde(default)]
    pub initial_velocity: Option<Vec<f64>>,
    /// Output snapshot file
    pub save_file_name: PathBuf,
    /// Input dataset for the data-driven variant
    #[serde(default)]
    pub dataset_file_name: Option<PathBuf>,
}

/// Summary of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Number of executed steps
    pub num_steps: usize,
    /// Number of degrees of freedom
    pub num_dofs: usize,
    /// Final physical time
    pub final_time: f64,
}

fn initial_vector(values: Option<&[f64]>, num_dofs: usize) -> DVector<f64> {
    match values {
        Some(v) => DVector::from_row_slice(v),
        None => DVector::zeros(num_dofs),
    }
}

/// Solve M*a0 = f_ext(0) - K*u0 - C*v0 so the state enters the first
/// step in dynamic equilibrium
fn consistent_initial_acceleration(
    form: &ElastodynamicsForm,
    mesh: &Mesh,
    space: &VectorSpace,
    u0: &DVector<f64>,
    v0: &DVector<f64>,
    f0: &DVector<f64>,
) -> Result<DVector<f64>> {
    if u0.len() != space.num_dofs || v0.len() != space.num_dofs {
        return Err(SolverError::Config(format!(
            "Initial conditions must have {} DOFs, got ({}, {})",
            space.num_dofs,
            u0.len(),
            v0.len()
        )));
    }
    let m = form.mass(mesh, space)?;
    let k = form.stiffness(mesh, space, StressBranch::Old)?;
    let c = form.damping(mesh, space, StressBranch::Old)?;
    let rhs = f0 - &k * u0 - &c * v0;
    m.lu()
        .solve(&rhs)
        .ok_or_else(|| SolverError::Singular("Mass matrix factorization failed".to_string()))
}

/// Top-level driver for one transient simulation
pub struct Simulation {
    params: SimulationParameters,
}

impl Simulation {
    /// Create a driver for the given run configuration
    pub fn new(params: SimulationParameters) -> Self {
        Self { params }
    }

    /// Execute the full run: construct the discretization, build the time
    /// step, and integrate over the time axis (skipping t = 0, the
    /// initial condition)
    pub fn run(&mut self) -> Result<RunSummary> {
        let p = &self.params;
        p.time_params.validate()?;

        let mesh = MeshBuilder::interval(p.bar_length, p.num_elements, p.cross_section_area)?;
        let space = SpaceBuilder::new(1)?.generate(&mesh);

        let clamped = BoundaryMarker::plane_x("clamped", 0.0);
        let loaded = BoundaryMarker::plane_x("loaded", p.bar_length);
        let bcs = BcBuilder::clamp(&mesh, &space, &clamped);

        let mut boundary_excitation = p.excitation.build();
        let loaded_dofs: Vec<usize> = loaded
            .mark(&mesh)
            .into_iter()
            .flat_map(|node_index| space.node_dofs(node_index))
            .collect();
        boundary_excitation.set_loaded_dofs(loaded_dofs);

        let mut fields = Fields::generate(&space);
        let num_dofs = space.num_dofs;

        let relation = Box::new(LinearElastic::new(p.youngs_modulus)?);
        let form = ElastodynamicsForm::new(
            p.mass_density,
            p.eta_m,
            p.eta_k,
            relation,
            p.alpha_params,
            p.time_params.delta_t,
        )?;

        if p.initial_displacement.is_some() || p.initial_velocity.is_some() {
            let u0 = initial_vector(p.initial_displacement.as_deref(), num_dofs);
            let v0 = initial_vector(p.initial_velocity.as_deref(), num_dofs);
            let a0 = consistent_initial_acceleration(
                &form,
                &mesh,
                &space,
                &u0,
                &v0,
                &boundary_excitation.load_vector(num_dofs),
            )?;
            fields.set_initial_conditions(u0, v0, a0)?;
        }

        let num_constrained = BcBuilder::constrained_dofs(&bcs, &space).len();
        let fem_solver = get_fem_solver(
            p.fem_solver_kind,
            form,
            mesh.clone(),
            space.clone(),
            bcs,
        );

        let writer = TimeSeriesWriter::create(&p.save_file_name, &mesh, DISPLACEMENT_FUNCTION)?;
        let field_updates = FieldUpdates::new(p.alpha_params.beta, p.alpha_params.gamma)?;

        let mut builder = TimeStepBuilder::new(p.time_step_kind);
        builder.set(
            p.alpha_params,
            p.time_params.clone(),
            fem_solver,
            Box::new(writer),
            boundary_excitation,
            field_updates,
            fields,
        );
        if p.time_step_kind == TimeStepKind::DataDriven {
            let dataset_path = p.dataset_file_name.as_ref().ok_or_else(|| {
                crate::error::SolverError::Config(
                    "Data-driven time step requires a dataset file".to_string(),
                )
            })?;
            let dataset = TimeSeriesReader::open(dataset_path, &mesh, DISPLACEMENT_FUNCTION)?;
            builder.set_dataset(dataset);
        }
        let mut time_step = builder.build()?;

        let stats = mesh.statistics();
        eprintln!(
            "Run: {} nodes, {} elements, {} DOFs ({} constrained), {} steps of {:.3e}",
            stats.num_nodes,
            stats.num_elements,
            num_dofs,
            num_constrained,
            p.time_params.num_steps,
            p.time_params.delta_t
        );

        let time_axis = p.time_params.linear_time_space();
        for (i, t) in time_axis[1..].iter().enumerate() {
            println!("Time: {:.6}", t);
            time_step.run(i)?;
        }

        Ok(RunSummary {
            num_steps: p.time_params.num_steps,
            num_dofs,
            final_time: p.time_params.total_time(),
        })
    }
}
