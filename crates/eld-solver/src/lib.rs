//! Transient structural dynamics solver.
//!
//! Integrates the semi-discrete equations of motion of a one-dimensional
//! bar with the generalized-alpha scheme. The crate assembles mass,
//! stiffness and Rayleigh damping operators from two-node bar elements,
//! builds the effective step system of the alpha method, solves it with
//! essential boundary conditions eliminated, and advances velocity and
//! acceleration with the Newmark update.

pub mod assembly;
pub mod constitutive;
pub mod error;
pub mod excitation;
pub mod fem_solver;
pub mod fields;
pub mod form;
pub mod generalized_alpha;
pub mod simulation;
pub mod time_step;
pub mod time_step_builder;

pub use constitutive::{ConstitutiveRelation, LinearElastic, StressBranch};
pub use error::{Result, SolverError};
pub use excitation::{ExcitationConfig, ExternalExcitation, SineExcitation, StaticLoad};
pub use fem_solver::{
    FemSolver, FemSolverKind, LinearFemSolver, NewtonConfig, NewtonFemSolver, SolveInfo,
    get_fem_solver,
};
pub use fields::{FieldUpdates, Fields};
pub use form::ElastodynamicsForm;
pub use generalized_alpha::{GeneralizedAlphaParameters, TimeSteppingParameters};
pub use simulation::{RunSummary, Simulation, SimulationParameters};
pub use time_step::{SnapshotSink, TimeStep};
pub use time_step_builder::{TimeStepBuilder, TimeStepKind};
