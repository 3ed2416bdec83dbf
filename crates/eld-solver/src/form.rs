//! The elastodynamics weak form under generalized-alpha integration.
//!
//! Produces the two discrete expressions the FEM solve consumes per step:
//! the implicit left-hand operator (evaluated on the new state with the
//! new constitutive branch) and the explicit right-hand residual
//! (evaluated on the old state with the old branch plus external load):
//!
//! ```text
//! lhs = (1-alpha_f)*K_new + c1*C_new + m1*M
//! rhs = -alpha_f*K_old*u_old + f_ext
//!     + c1*C_old*u_old - c2*C_old*v_old - c3*C_old*a_old
//!     + m1*M*u_old + m2*M*v_old - m3*M*a_old
//! ```
//!
//! with Rayleigh damping C = eta_m*M + eta_k*K and the six coefficients
//! derived from the alpha parameters and the step size. Handing lhs/rhs
//! to a linear or Newton solve yields the generalized-alpha update for
//! u_new.

use crate::assembly;
use crate::constitutive::{ConstitutiveRelation, StressBranch};
use crate::error::{Result, SolverError};
use crate::fields::Fields;
use crate::generalized_alpha::GeneralizedAlphaParameters;
use eld_model::{Mesh, VectorSpace};
use nalgebra::{DMatrix, DVector};

/// Assembles the per-step weak-form operator and residual
pub struct ElastodynamicsForm {
    rho: f64,
    eta_m: f64,
    eta_k: f64,
    relation: Box<dyn ConstitutiveRelation>,
    alpha: GeneralizedAlphaParameters,
    delta_t: f64,
}

impl ElastodynamicsForm {
    /// Create the form, failing fast on parameters that would divide by
    /// zero at the first coefficient access
    pub fn new(
        mass_density: f64,
        eta_m: f64,
        eta_k: f64,
        relation: Box<dyn ConstitutiveRelation>,
        alpha: GeneralizedAlphaParameters,
        delta_t: f64,
    ) -> Result<Self> {
        if !mass_density.is_finite() || mass_density <= 0.0 {
            return Err(SolverError::Config(format!(
                "Mass density must be positive, got {}",
                mass_density
            )));
        }
        if !alpha.beta.is_finite() || alpha.beta <= 0.0 {
            return Err(SolverError::Config(format!(
                "Generalized-alpha beta must be positive, got {}",
                alpha.beta
            )));
        }
        if !delta_t.is_finite() || delta_t <= 0.0 {
            return Err(SolverError::Config(format!(
                "Time step must be positive, got {}",
                delta_t
            )));
        }
        Ok(Self {
            rho: mass_density,
            eta_m,
            eta_k,
            relation,
            alpha,
            delta_t,
        })
    }

    /// The integration parameters in use
    pub fn alpha(&self) -> &GeneralizedAlphaParameters {
        &self.alpha
    }

    /// Current time step size
    pub fn delta_t(&self) -> f64 {
        self.delta_t
    }

    /// Change the step size; coefficients are recomputed on access
    pub fn set_delta_t(&mut self, delta_t: f64) -> Result<()> {
        if !delta_t.is_finite() || delta_t <= 0.0 {
            return Err(SolverError::Config(format!(
                "Time step must be positive, got {}",
                delta_t
            )));
        }
        self.delta_t = delta_t;
        Ok(())
    }

    // Derived integration coefficients. Recomputed every access; delta_t
    // may vary between steps.

    pub fn c1(&self) -> f64 {
        self.alpha.gamma * (1.0 - self.alpha.alpha_f) / (self.alpha.beta * self.delta_t)
    }

    pub fn c2(&self) -> f64 {
        1.0 - (self.alpha.gamma / self.alpha.beta) * (1.0 - self.alpha.alpha_f)
    }

    pub fn c3(&self) -> f64 {
        self.delta_t
            * (1.0 - self.alpha.alpha_f)
            * (1.0 - self.alpha.gamma / (2.0 * self.alpha.beta))
    }

    pub fn m1(&self) -> f64 {
        (1.0 - self.alpha.alpha_m) / (self.delta_t * self.delta_t * self.alpha.beta)
    }

    pub fn m2(&self) -> f64 {
        (1.0 - self.alpha.alpha_m) / (self.delta_t * self.alpha.beta)
    }

    pub fn m3(&self) -> f64 {
        1.0 - (1.0 - self.alpha.alpha_m) / (2.0 * self.alpha.beta)
    }

    /// Global mass operator: rho * inner(u, w) over the domain
    pub fn mass(&self, mesh: &Mesh, space: &VectorSpace) -> Result<DMatrix<f64>> {
        assembly::mass_matrix(mesh, space, self.rho)
    }

    /// Global stiffness operator on the requested constitutive branch
    pub fn stiffness(
        &self,
        mesh: &Mesh,
        space: &VectorSpace,
        branch: StressBranch,
    ) -> Result<DMatrix<f64>> {
        assembly::stiffness_matrix(mesh, space, self.relation.as_ref(), branch)
    }

    /// Rayleigh damping on the requested branch: eta_m*M + eta_k*K
    pub fn damping(
        &self,
        mesh: &Mesh,
        space: &VectorSpace,
        branch: StressBranch,
    ) -> Result<DMatrix<f64>> {
        let m = self.mass(mesh, space)?;
        let k = self.stiffness(mesh, space, branch)?;
        Ok(self.eta_m * m + self.eta_k * k)
    }

    /// The implicit left-hand operator for one step
    pub fn lhs_matrix(&self, mesh: &Mesh, space: &VectorSpace) -> Result<DMatrix<f64>> {
        let m = self.mass(mesh, space)?;
        let k_new = self.stiffness(mesh, space, StressBranch::New)?;
        let c_new = self.eta_m * &m + self.eta_k * &k_new;

        Ok((1.0 - self.alpha.alpha_f) * k_new + self.c1() * c_new + self.m1() * m)
    }

    /// The explicit right-hand residual for one step, including the
    /// external load vector
    pub fn rhs_vector(
        &self,
        mesh: &Mesh,
        space: &VectorSpace,
        fields: &Fields,
        f_ext: &DVector<f64>,
    ) -> Result<DVector<f64>> {
        if f_ext.len() != space.num_dofs {
            return Err(SolverError::Config(format!(
                "External load has {} DOFs, space has {}",
                f_ext.len(),
                space.num_dofs
            )));
        }
        if fields.num_dofs() != space.num_dofs {
            return Err(SolverError::Config(format!(
                "Fields have {} DOFs, space has {}",
                fields.num_dofs(),
                space.num_dofs
            )));
        }

        let m = self.mass(mesh, space)?;
        let k_old = self.stiffness(mesh, space, StressBranch::Old)?;
        let c_old = self.eta_m * &m + self.eta_k * &k_old;

        let u = &fields.u_old;
        let v = &fields.v_old;
        let a = &fields.a_old;

        let rhs = -self.alpha.alpha_f * (&k_old * u)
            + f_ext
            + self.c1() * (&c_old * u)
            - self.c2() * (&c_old * v)
            - self.c3() * (&c_old * a)
            + self.m1() * (&m * u)
            + self.m2() * (&m * v)
            - self.m3() * (&m * a);
        Ok(rhs)
    }
}

impl std::fmt::Debug for ElastodynamicsForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElastodynamicsForm")
            .field("rho", &self.rho)
            .field("eta_m", &self.eta_m)
            .field("eta_k", &self.eta_k)
            .field("alpha", &self.alpha)
            .field("delta_t", &self.delta_t)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constitutive::LinearElastic;
    use eld_model::{MeshBuilder, SpaceBuilder};

    /// Minimal deterministic generator for parameter draws
    struct Lcg(u64);

    impl Lcg {
        fn next_unit(&mut self) -> f64 {
            self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (self.0 >> 11) as f64 / (1u64 << 53) as f64
        }
    }

    fn make_form(alpha: GeneralizedAlphaParameters, delta_t: f64) -> ElastodynamicsForm {
        let relation = Box::new(LinearElastic::new(100.0).unwrap());
        ElastodynamicsForm::new(1.0, 0.0, 0.0, relation, alpha, delta_t).unwrap()
    }

    #[test]
    fn coefficients_match_closed_forms_for_random_valid_parameters() {
        let mut rng = Lcg(0x5eed);
        for _ in 0..200 {
            let gamma = rng.next_unit();
            let beta = 0.05 + 0.45 * rng.next_unit();
            let alpha_f = rng.next_unit() * 0.5;
            let alpha_m = rng.next_unit() * 0.5;
            let dt = 1e-4 + rng.next_unit();

            let form = make_form(
                GeneralizedAlphaParameters::new(gamma, beta, alpha_f, alpha_m),
                dt,
            );

            assert_eq!(form.c1(), gamma * (1.0 - alpha_f) / (beta * dt));
            assert_eq!(form.c2(), 1.0 - (gamma / beta) * (1.0 - alpha_f));
            assert_eq!(form.c3(), dt * (1.0 - alpha_f) * (1.0 - gamma / (2.0 * beta)));
            assert_eq!(form.m1(), (1.0 - alpha_m) / (dt * dt * beta));
            assert_eq!(form.m2(), (1.0 - alpha_m) / (dt * beta));
            assert_eq!(form.m3(), 1.0 - (1.0 - alpha_m) / (2.0 * beta));
        }
    }

    #[test]
    fn rejects_zero_beta_and_zero_delta_t() {
        let relation = || Box::new(LinearElastic::new(100.0).unwrap());
        let zero_beta = GeneralizedAlphaParameters::new(0.5, 0.0, 0.0, 0.0);
        assert!(matches!(
            ElastodynamicsForm::new(1.0, 0.0, 0.0, relation(), zero_beta, 0.01),
            Err(SolverError::Config(_))
        ));

        let newmark = GeneralizedAlphaParameters::newmark_average_acceleration();
        assert!(matches!(
            ElastodynamicsForm::new(1.0, 0.0, 0.0, relation(), newmark, 0.0),
            Err(SolverError::Config(_))
        ));
        assert!(matches!(
            ElastodynamicsForm::new(0.0, 0.0, 0.0, relation(), newmark, 0.01),
            Err(SolverError::Config(_))
        ));
    }

    #[test]
    fn set_delta_t_revalidates() {
        let newmark = GeneralizedAlphaParameters::newmark_average_acceleration();
        let mut form = make_form(newmark, 0.01);
        assert!(form.set_delta_t(0.02).is_ok());
        assert_eq!(form.delta_t(), 0.02);
        assert!(form.set_delta_t(0.0).is_err());
    }

    #[test]
    fn newmark_reduction_of_lhs() {
        // alpha_f = alpha_m = 0, no damping: lhs = K + M/(beta*dt^2)
        let newmark = GeneralizedAlphaParameters::newmark_average_acceleration();
        let dt = 0.01;
        let form = make_form(newmark, dt);
        let mesh = MeshBuilder::interval(1.0, 2, 1.0).unwrap();
        let space = SpaceBuilder::new(1).unwrap().generate(&mesh);

        let lhs = form.lhs_matrix(&mesh, &space).unwrap();
        let m = form.mass(&mesh, &space).unwrap();
        let k = form.stiffness(&mesh, &space, StressBranch::New).unwrap();
        let expected = &k + (1.0 / (0.25 * dt * dt)) * &m;

        assert!((lhs - expected).norm() < 1e-9);
    }

    #[test]
    fn newmark_reduction_of_rhs() {
        // alpha_f = alpha_m = 0, no damping:
        // rhs = f + M*(u/(beta*dt^2) + v/(beta*dt) + (1/(2*beta) - 1)*a)
        let newmark = GeneralizedAlphaParameters::newmark_average_acceleration();
        let dt = 0.01;
        let form = make_form(newmark, dt);
        let mesh = MeshBuilder::interval(1.0, 2, 1.0).unwrap();
        let space = SpaceBuilder::new(1).unwrap().generate(&mesh);

        let mut fields = Fields::generate(&space);
        fields.u_old = DVector::from_vec(vec![0.0, 0.1, 0.2]);
        fields.v_old = DVector::from_vec(vec![0.0, 1.0, 2.0]);
        fields.a_old = DVector::from_vec(vec![0.0, -3.0, -6.0]);
        let f_ext = DVector::from_vec(vec![0.0, 0.0, 5.0]);

        let rhs = form.rhs_vector(&mesh, &space, &fields, &f_ext).unwrap();

        let m = form.mass(&mesh, &space).unwrap();
        let beta = 0.25;
        let state = &fields.u_old / (beta * dt * dt)
            + &fields.v_old / (beta * dt)
            + (1.0 / (2.0 * beta) - 1.0) * &fields.a_old;
        let expected = &f_ext + m * state;

        assert!((rhs - &expected).norm() < 1e-9 * expected.norm().max(1.0));
    }

    #[test]
    fn rhs_rejects_mismatched_load_vector() {
        let newmark = GeneralizedAlphaParameters::newmark_average_acceleration();
        let form = make_form(newmark, 0.01);
        let mesh = MeshBuilder::interval(1.0, 2, 1.0).unwrap();
        let space = SpaceBuilder::new(1).unwrap().generate(&mesh);
        let fields = Fields::generate(&space);
        let bad = DVector::zeros(7);

        assert!(matches!(
            form.rhs_vector(&mesh, &space, &fields, &bad),
            Err(SolverError::Config(_))
        ));
    }

    #[test]
    fn damping_combines_mass_and_stiffness() {
        let newmark = GeneralizedAlphaParameters::newmark_average_acceleration();
        let relation = Box::new(LinearElastic::new(100.0).unwrap());
        let form = ElastodynamicsForm::new(2.0, 0.3, 0.7, relation, newmark, 0.01).unwrap();
        let mesh = MeshBuilder::interval(1.0, 1, 1.0).unwrap();
        let space = SpaceBuilder::new(1).unwrap().generate(&mesh);

        let c = form.damping(&mesh, &space, StressBranch::New).unwrap();
        let m = form.mass(&mesh, &space).unwrap();
        let k = form.stiffness(&mesh, &space, StressBranch::New).unwrap();
        assert!((c - (0.3 * m + 0.7 * k)).norm() < 1e-12);
    }
}
