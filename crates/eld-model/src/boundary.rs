//! Boundary marking and essential boundary conditions.
//!
//! A `BoundaryMarker` selects node sets by coordinate predicate; the
//! marked sets feed both the Dirichlet constraints and the loaded-boundary
//! wiring of the external excitation.

use crate::mesh::Mesh;
use crate::space::VectorSpace;

/// Marks mesh nodes by a coordinate predicate
pub struct BoundaryMarker {
    /// Marker name, for diagnostics
    pub name: String,
    predicate: Box<dyn Fn(&[f64; 3]) -> bool + Send + Sync>,
}

impl BoundaryMarker {
    /// Create a marker from an arbitrary coordinate predicate
    pub fn new<F>(name: &str, predicate: F) -> Self
    where
        F: Fn(&[f64; 3]) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            predicate: Box::new(predicate),
        }
    }

    /// Marker for the plane x == value (within tolerance)
    pub fn plane_x(name: &str, value: f64) -> Self {
        Self::new(name, move |c| (c[0] - value).abs() < 1e-9)
    }

    /// Zero-based indices of the marked nodes
    pub fn mark(&self, mesh: &Mesh) -> Vec<usize> {
        mesh.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| (self.predicate)(&n.coords()))
            .map(|(i, _)| i)
            .collect()
    }
}

impl std::fmt::Debug for BoundaryMarker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundaryMarker")
            .field("name", &self.name)
            .finish()
    }
}

/// An essential (displacement) boundary condition on one node component
#[derive(Debug, Clone, PartialEq)]
pub struct DirichletBc {
    /// Zero-based node index
    pub node_index: usize,
    /// Displacement component (0-based)
    pub component: usize,
    /// Prescribed value
    pub value: f64,
}

impl DirichletBc {
    /// Create a new essential boundary condition
    pub fn new(node_index: usize, component: usize, value: f64) -> Self {
        Self {
            node_index,
            component,
            value,
        }
    }

    /// Global DOF index in the given space
    pub fn dof(&self, space: &VectorSpace) -> usize {
        space.dof(self.node_index, self.component)
    }
}

/// Builds essential boundary conditions from marked node sets
pub struct BcBuilder;

impl BcBuilder {
    /// Clamp all components of every node selected by the marker
    pub fn clamp(mesh: &Mesh, space: &VectorSpace, marker: &BoundaryMarker) -> Vec<DirichletBc> {
        let mut bcs = Vec::new();
        for node_index in marker.mark(mesh) {
            for component in 0..space.dofs_per_node {
                bcs.push(DirichletBc::new(node_index, component, 0.0));
            }
        }
        bcs
    }

    /// Resolve a BC set to sorted, de-duplicated global DOF indices
    pub fn constrained_dofs(bcs: &[DirichletBc], space: &VectorSpace) -> Vec<usize> {
        let mut dofs: Vec<usize> = bcs.iter().map(|bc| bc.dof(space)).collect();
        dofs.sort_unstable();
        dofs.dedup();
        dofs
    }
}
