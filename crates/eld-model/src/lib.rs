//! Discretization plumbing for the elastodyn solver.
//!
//! This crate carries the mesh, the vector function space (DOF map),
//! boundary marking, and essential boundary conditions. The numerical
//! core in `eld-solver` consumes these as opaque collaborators.

pub mod boundary;
pub mod mesh;
pub mod space;

pub use boundary::{BcBuilder, BoundaryMarker, DirichletBc};
pub use mesh::{Element, Mesh, MeshBuilder, MeshStatistics, Node};
pub use space::{SpaceBuilder, VectorSpace};
