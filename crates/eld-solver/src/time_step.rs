//! Per-step orchestration of the transient run.
//!
//! One step is a linear pipeline with no branching retries:
//! excitation update -> solve -> field update -> persist. Any failure is
//! fatal: a skipped step invalidates every later step.

use crate::error::Result;
use crate::excitation::ExternalExcitation;
use crate::fem_solver::FemSolver;
use crate::fields::{FieldUpdates, Fields};
use crate::generalized_alpha::{GeneralizedAlphaParameters, TimeSteppingParameters};
use eld_io::TimeSeriesReader;
use nalgebra::DVector;

/// Destination for per-step field snapshots (append-only, one write per
/// step, in step order)
pub trait SnapshotSink: Send {
    /// Append one field sample at the given physical time
    fn write_snapshot(&mut self, values: &[f64], time: f64) -> eld_io::Result<()>;
}

impl SnapshotSink for eld_io::TimeSeriesWriter {
    fn write_snapshot(&mut self, values: &[f64], time: f64) -> eld_io::Result<()> {
        self.write(values, time)
    }
}

/// One time step of the transient simulation
pub trait TimeStep {
    /// Execute step `i` (zero-based; the persisted time is (i+1)*delta_t)
    fn run(&mut self, i: usize) -> Result<()>;

    /// The solution state after the last executed step
    fn fields(&self) -> &Fields;
}

/// The elastodynamics step: excitation -> solve -> update -> persist
pub struct ElastodynamicsTimeStep {
    pub(crate) alpha_params: GeneralizedAlphaParameters,
    pub(crate) time_params: TimeSteppingParameters,
    pub(crate) fem_solver: Box<dyn FemSolver>,
    pub(crate) file: Box<dyn SnapshotSink>,
    pub(crate) boundary_excitation: Box<dyn ExternalExcitation>,
    pub(crate) field_updates: FieldUpdates,
    pub(crate) fields: Fields,
}

impl TimeStep for ElastodynamicsTimeStep {
    fn run(&mut self, i: usize) -> Result<()> {
        let delta_t = self.time_params.delta_t;

        self.boundary_excitation
            .update(&self.alpha_params, delta_t, i);
        let f_ext = self.boundary_excitation.load_vector(self.fields.num_dofs());

        self.fem_solver.run(&mut self.fields, &f_ext)?;
        self.field_updates.run(&mut self.fields, delta_t)?;
        self.file
            .write_snapshot(self.fields.u_new.as_slice(), (i as f64 + 1.0) * delta_t)?;
        Ok(())
    }

    fn fields(&self) -> &Fields {
        &self.fields
    }
}

/// Data-driven step: the new displacement is read from an external
/// time-indexed dataset instead of being solved for. The dataset is
/// validated against the mesh and function name when the reader opens.
pub struct DataDrivenTimeStep {
    pub(crate) time_params: TimeSteppingParameters,
    pub(crate) file: Box<dyn SnapshotSink>,
    pub(crate) field_updates: FieldUpdates,
    pub(crate) fields: Fields,
    pub(crate) dataset: TimeSeriesReader,
}

impl TimeStep for DataDrivenTimeStep {
    fn run(&mut self, i: usize) -> Result<()> {
        let delta_t = self.time_params.delta_t;

        let record = self.dataset.read_step(i)?;
        if record.values.len() != self.fields.num_dofs() {
            return Err(crate::error::SolverError::Config(format!(
                "Dataset step {} has {} DOFs, fields have {}",
                i,
                record.values.len(),
                self.fields.num_dofs()
            )));
        }
        self.fields.u_new = DVector::from_vec(record.values.clone());

        self.field_updates.run(&mut self.fields, delta_t)?;
        self.file
            .write_snapshot(self.fields.u_new.as_slice(), (i as f64 + 1.0) * delta_t)?;
        Ok(())
    }

    fn fields(&self) -> &Fields {
        &self.fields
    }
}
