//! Builder selecting and wiring the concrete time-step variant.
//!
//! The simulation driver stays agnostic to which integration variant
//! runs; it hands every collaborator to the builder and receives a boxed
//! `TimeStep`. Building with a missing collaborator is a configuration
//! error, not a panic.

use crate::error::{Result, SolverError};
use crate::excitation::ExternalExcitation;
use crate::fem_solver::FemSolver;
use crate::fields::{FieldUpdates, Fields};
use crate::generalized_alpha::{GeneralizedAlphaParameters, TimeSteppingParameters};
use crate::time_step::{DataDrivenTimeStep, ElastodynamicsTimeStep, SnapshotSink, TimeStep};
use eld_io::TimeSeriesReader;
use serde::{Deserialize, Serialize};

/// Time-step variant selection tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeStepKind {
    /// The four-stage elastodynamics pipeline
    Elastodynamics,
    /// Displacement read from an external dataset instead of a solve
    DataDriven,
}

/// Wires collaborators and builds the selected time-step variant
pub struct TimeStepBuilder {
    kind: TimeStepKind,
    alpha_params: Option<GeneralizedAlphaParameters>,
    time_params: Option<TimeSteppingParameters>,
    fem_solver: Option<Box<dyn FemSolver>>,
    file: Option<Box<dyn SnapshotSink>>,
    boundary_excitation: Option<Box<dyn ExternalExcitation>>,
    field_updates: Option<FieldUpdates>,
    fields: Option<Fields>,
    dataset: Option<TimeSeriesReader>,
}

impl TimeStepBuilder {
    /// Start a builder for the given variant
    pub fn new(kind: TimeStepKind) -> Self {
        Self {
            kind,
            alpha_params: None,
            time_params: None,
            fem_solver: None,
            file: None,
            boundary_excitation: None,
            field_updates: None,
            fields: None,
            dataset: None,
        }
    }

    /// Wire the collaborators shared by every variant
    #[allow(clippy::too_many_arguments)]
    pub fn set(
        &mut self,
        alpha_params: GeneralizedAlphaParameters,
        time_params: TimeSteppingParameters,
        fem_solver: Box<dyn FemSolver>,
        file: Box<dyn SnapshotSink>,
        boundary_excitation: Box<dyn ExternalExcitation>,
        field_updates: FieldUpdates,
        fields: Fields,
    ) {
        self.alpha_params = Some(alpha_params);
        self.time_params = Some(time_params);
        self.fem_solver = Some(fem_solver);
        self.file = Some(file);
        self.boundary_excitation = Some(boundary_excitation);
        self.field_updates = Some(field_updates);
        self.fields = Some(fields);
    }

    /// Wire the external dataset (data-driven variant only)
    pub fn set_dataset(&mut self, dataset: TimeSeriesReader) {
        self.dataset = Some(dataset);
    }

    fn take<T>(slot: Option<T>, name: &str) -> Result<T> {
        slot.ok_or_else(|| {
            SolverError::Config(format!("Time step builder is missing '{}'", name))
        })
    }

    /// Build the concrete time step, consuming the wired collaborators
    pub fn build(self) -> Result<Box<dyn TimeStep>> {
        let time_params = Self::take(self.time_params, "time_params")?;
        time_params.validate()?;
        let file = Self::take(self.file, "file")?;
        let field_updates = Self::take(self.field_updates, "field_updates")?;
        let fields = Self::take(self.fields, "fields")?;

        match self.kind {
            TimeStepKind::Elastodynamics => Ok(Box::new(ElastodynamicsTimeStep {
                alpha_params: Self::take(self.alpha_params, "alpha_params")?,
                time_params,
                fem_solver: Self::take(self.fem_solver, "fem_solver")?,
                file,
                boundary_excitation: Self::take(self.boundary_excitation, "boundary_excitation")?,
                field_updates,
                fields,
            })),
            TimeStepKind::DataDriven => Ok(Box::new(DataDrivenTimeStep {
                time_params,
                file,
                field_updates,
                fields,
                dataset: Self::take(self.dataset, "dataset")?,
            })),
        }
    }
}
