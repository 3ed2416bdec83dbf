//! Global operator assembly over the bar mesh.
//!
//! Element matrices are evaluated in parallel, then scattered serially
//! into a COO triplet store; duplicate entries sum on conversion to CSR.
//! The assembled operators are returned dense, sized for direct solves.
//!
//! Element kernels (2-node bar of length L, area A):
//! - consistent mass: rho*A*L/6 * [[2, 1], [1, 2]]
//! - stiffness:       E_t*A/L  * [[1, -1], [-1, 1]]
//!
//! where E_t is the tangent modulus obtained by evaluating the selected
//! constitutive branch on unit axial strain.

use crate::constitutive::{ConstitutiveRelation, StressBranch};
use crate::error::{Result, SolverError};
use eld_model::{Mesh, VectorSpace};
use nalgebra::DMatrix;
use nalgebra_sparse::{CooMatrix, CsrMatrix};
use rayon::prelude::*;

/// One element's contribution: global DOF pair and 2x2 kernel, per component
struct ElementContribution {
    dofs: [usize; 2],
    kernel: [[f64; 2]; 2],
}

fn element_geometry(mesh: &Mesh, element: &eld_model::Element) -> Result<(f64, f64)> {
    let length = mesh.element_length(element)?;
    if length <= 0.0 {
        return Err(SolverError::Config(format!(
            "Element {} has zero length",
            element.id
        )));
    }
    Ok((length, element.area))
}

fn scatter(contributions: Vec<ElementContribution>, num_dofs: usize) -> DMatrix<f64> {
    let mut coo = CooMatrix::new(num_dofs, num_dofs);
    for c in &contributions {
        for (a, &row) in c.dofs.iter().enumerate() {
            for (b, &col) in c.dofs.iter().enumerate() {
                coo.push(row, col, c.kernel[a][b]);
            }
        }
    }
    // CSR conversion sums duplicate triplets
    let csr = CsrMatrix::from(&coo);
    let mut dense = DMatrix::zeros(num_dofs, num_dofs);
    for (row, col, value) in csr.triplet_iter() {
        dense[(row, col)] = *value;
    }
    dense
}

fn assemble<F>(mesh: &Mesh, space: &VectorSpace, kernel: F) -> Result<DMatrix<f64>>
where
    F: Fn(f64, f64) -> [[f64; 2]; 2] + Sync,
{
    let contributions: Vec<ElementContribution> = mesh
        .elements
        .par_iter()
        .map(|element| -> Result<Vec<ElementContribution>> {
            let (length, area) = element_geometry(mesh, element)?;
            let kernel = kernel(length, area);
            let i0 = mesh
                .node_index(element.nodes[0])
                .ok_or_else(|| SolverError::Config(format!(
                    "Element {} references missing node {}",
                    element.id, element.nodes[0]
                )))?;
            let i1 = mesh
                .node_index(element.nodes[1])
                .ok_or_else(|| SolverError::Config(format!(
                    "Element {} references missing node {}",
                    element.id, element.nodes[1]
                )))?;
            // Same scalar kernel for every displacement component
            Ok((0..space.dofs_per_node)
                .map(|component| ElementContribution {
                    dofs: [space.dof(i0, component), space.dof(i1, component)],
                    kernel,
                })
                .collect())
        })
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .flatten()
        .collect();

    Ok(scatter(contributions, space.num_dofs))
}

/// Assemble the global consistent mass matrix for density rho
pub fn mass_matrix(mesh: &Mesh, space: &VectorSpace, rho: f64) -> Result<DMatrix<f64>> {
    if !rho.is_finite() || rho <= 0.0 {
        return Err(SolverError::Config(format!(
            "Mass density must be positive, got {}",
            rho
        )));
    }
    assemble(mesh, space, |length, area| {
        let m = rho * area * length / 6.0;
        [[2.0 * m, m], [m, 2.0 * m]]
    })
}

/// Assemble the global stiffness matrix using the selected constitutive branch
pub fn stiffness_matrix(
    mesh: &Mesh,
    space: &VectorSpace,
    relation: &dyn ConstitutiveRelation,
    branch: StressBranch,
) -> Result<DMatrix<f64>> {
    assemble(mesh, space, |length, area| {
        let tangent_modulus = relation.value(branch, 1.0);
        let k = tangent_modulus * area / length;
        [[k, -k], [-k, k]]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constitutive::LinearElastic;
    use eld_model::{Element, MeshBuilder, Node, SpaceBuilder};

    /// Relation whose branches differ, to pin down branch selection
    struct TwoBranch;

    impl ConstitutiveRelation for TwoBranch {
        fn old_value(&self, strain: f64) -> f64 {
            100.0 * strain
        }
        fn new_value(&self, strain: f64) -> f64 {
            200.0 * strain
        }
    }

    #[test]
    fn single_element_mass_matrix() {
        let mesh = MeshBuilder::interval(2.0, 1, 0.5).unwrap();
        let space = SpaceBuilder::new(1).unwrap().generate(&mesh);
        let m = mass_matrix(&mesh, &space, 3.0).unwrap();

        // rho*A*L/6 = 3.0*0.5*2.0/6 = 0.5
        assert!((m[(0, 0)] - 1.0).abs() < 1e-12);
        assert!((m[(0, 1)] - 0.5).abs() < 1e-12);
        assert!((m[(1, 0)] - 0.5).abs() < 1e-12);
        assert!((m[(1, 1)] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn single_element_stiffness_matrix() {
        let mesh = MeshBuilder::interval(2.0, 1, 0.5).unwrap();
        let space = SpaceBuilder::new(1).unwrap().generate(&mesh);
        let law = LinearElastic::new(8.0).unwrap();
        let k = stiffness_matrix(&mesh, &space, &law, StressBranch::New).unwrap();

        // E*A/L = 8.0*0.5/2.0 = 2.0
        assert!((k[(0, 0)] - 2.0).abs() < 1e-12);
        assert!((k[(0, 1)] + 2.0).abs() < 1e-12);
        assert!((k[(1, 1)] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn shared_node_contributions_sum() {
        let mesh = MeshBuilder::interval(2.0, 2, 1.0).unwrap();
        let space = SpaceBuilder::new(1).unwrap().generate(&mesh);
        let law = LinearElastic::new(1.0).unwrap();
        let k = stiffness_matrix(&mesh, &space, &law, StressBranch::New).unwrap();

        // Interior node accumulates both adjacent elements: k = 1.0 each
        assert!((k[(1, 1)] - 2.0).abs() < 1e-12);
        assert!((k[(0, 0)] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn branch_selection_reaches_the_relation() {
        let mesh = MeshBuilder::interval(1.0, 1, 1.0).unwrap();
        let space = SpaceBuilder::new(1).unwrap().generate(&mesh);

        let k_old = stiffness_matrix(&mesh, &space, &TwoBranch, StressBranch::Old).unwrap();
        let k_new = stiffness_matrix(&mesh, &space, &TwoBranch, StressBranch::New).unwrap();
        assert!((k_old[(0, 0)] - 100.0).abs() < 1e-12);
        assert!((k_new[(0, 0)] - 200.0).abs() < 1e-12);
    }

    #[test]
    fn vector_space_blocks_are_uncoupled() {
        let mesh = MeshBuilder::interval(1.0, 1, 1.0).unwrap();
        let space = SpaceBuilder::new(2).unwrap().generate(&mesh);
        let law = LinearElastic::new(1.0).unwrap();
        let k = stiffness_matrix(&mesh, &space, &law, StressBranch::New).unwrap();

        assert_eq!(k.nrows(), 4);
        // No coupling between components of the same node
        assert_eq!(k[(0, 1)], 0.0);
        assert!((k[(0, 2)] + 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_length_element_is_fatal() {
        let mut mesh = eld_model::Mesh::new();
        mesh.add_node(Node::new(1, 0.0, 0.0, 0.0));
        mesh.add_node(Node::new(2, 0.0, 0.0, 0.0));
        mesh.add_element(Element::new(1, [1, 2], 1.0)).unwrap();
        let space = SpaceBuilder::new(1).unwrap().generate(&mesh);

        let result = mass_matrix(&mesh, &space, 1.0);
        assert!(matches!(result, Err(SolverError::Config(_))));
    }

    #[test]
    fn rejects_non_positive_density() {
        let mesh = MeshBuilder::interval(1.0, 1, 1.0).unwrap();
        let space = SpaceBuilder::new(1).unwrap().generate(&mesh);
        assert!(mass_matrix(&mesh, &space, 0.0).is_err());
        assert!(mass_matrix(&mesh, &space, -1.0).is_err());
    }
}
