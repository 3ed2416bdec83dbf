//! Error types for eld-solver.
//!
//! All errors are fatal to the run: a skipped or corrupted step would
//! invalidate every subsequent step, since state is carried forward.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SolverError>;

#[derive(Error, Debug)]
pub enum SolverError {
    /// Invalid parameters, detected at construction rather than first use
    #[error("Configuration error: {0}")]
    Config(String),

    /// The algebraic solve did not converge
    #[error("Solver failed to converge after {iterations} iterations (residual = {residual:.3e})")]
    NonConvergence { iterations: usize, residual: f64 },

    /// The assembled operator could not be factorized
    #[error("Singular system: {0}")]
    Singular(String),

    /// Persistence failure; the remainder of the time series is invalid
    #[error("I/O error: {0}")]
    Io(#[from] eld_io::IoError),
}

impl From<String> for SolverError {
    fn from(message: String) -> Self {
        SolverError::Config(message)
    }
}
