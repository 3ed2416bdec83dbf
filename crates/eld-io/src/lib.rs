//! I/O utilities for the elastodyn solver.
//!
//! Provides the append-only time-series snapshot format written once per
//! time step, and the reader used by the data-driven time-step variant.

pub mod error;
pub mod time_series;

pub use error::{IoError, Result};
pub use time_series::{SnapshotHeader, SnapshotRecord, TimeSeriesReader, TimeSeriesWriter};
