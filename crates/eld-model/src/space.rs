//! Vector function space over a mesh.
//!
//! The space fixes the global DOF layout once the mesh is known:
//! `dofs_per_node` displacement components per node, node-major ordering.

use crate::mesh::Mesh;

/// A vector-valued function space tied to a mesh
#[derive(Debug, Clone)]
pub struct VectorSpace {
    /// Displacement components per node
    pub dofs_per_node: usize,
    /// Total number of degrees of freedom
    pub num_dofs: usize,
}

impl VectorSpace {
    /// Global DOF index for a node (by zero-based node index) and component
    pub fn dof(&self, node_index: usize, component: usize) -> usize {
        debug_assert!(component < self.dofs_per_node);
        node_index * self.dofs_per_node + component
    }

    /// All global DOF indices belonging to a node
    pub fn node_dofs(&self, node_index: usize) -> Vec<usize> {
        (0..self.dofs_per_node)
            .map(|c| self.dof(node_index, c))
            .collect()
    }
}

/// Creates vector spaces of a fixed component count
#[derive(Debug, Clone)]
pub struct SpaceBuilder {
    dofs_per_node: usize,
}

impl SpaceBuilder {
    /// Create a builder for spaces with the given components per node
    pub fn new(dofs_per_node: usize) -> Result<Self, String> {
        if dofs_per_node == 0 {
            return Err("A vector space needs at least one component per node".to_string());
        }
        Ok(Self { dofs_per_node })
    }

    /// Generate the space for a concrete mesh, fixing the DOF count
    pub fn generate(&self, mesh: &Mesh) -> VectorSpace {
        VectorSpace {
            dofs_per_node: self.dofs_per_node,
            num_dofs: mesh.nodes.len() * self.dofs_per_node,
        }
    }
}
