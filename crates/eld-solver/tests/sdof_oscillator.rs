//! Free-vibration checks against the closed-form single-DOF step.
//!
//! One clamped bar element leaves a single free DOF; the assembled step
//! system then reduces to a scalar equation with the consistent mass and
//! stiffness entries of that DOF. The first implicit step must match the
//! closed-form Newmark displacement, and long undamped runs must stay
//! bounded by the initial amplitude.

use eld_model::{BcBuilder, BoundaryMarker, MeshBuilder, SpaceBuilder};
use eld_solver::{
    ElastodynamicsForm, FieldUpdates, Fields, FemSolver, GeneralizedAlphaParameters,
    LinearElastic, LinearFemSolver, StressBranch,
};
use nalgebra::DVector;

const YOUNGS_MODULUS: f64 = 100.0;
const DENSITY: f64 = 1.0;
const DT: f64 = 0.01;

struct SdofProblem {
    solver: LinearFemSolver,
    fields: Fields,
    /// Consistent mass entry of the free DOF
    m: f64,
    /// Stiffness entry of the free DOF
    k: f64,
}

fn make_problem(u0: f64) -> SdofProblem {
    let mesh = MeshBuilder::interval(1.0, 1, 1.0).unwrap();
    let space = SpaceBuilder::new(1).unwrap().generate(&mesh);
    let clamped = BoundaryMarker::plane_x("clamped", 0.0);
    let bcs = BcBuilder::clamp(&mesh, &space, &clamped);

    let alpha = GeneralizedAlphaParameters::newmark_average_acceleration();
    let relation = Box::new(LinearElastic::new(YOUNGS_MODULUS).unwrap());
    let form = ElastodynamicsForm::new(DENSITY, 0.0, 0.0, relation, alpha, DT).unwrap();

    let mass = form.mass(&mesh, &space).unwrap();
    let stiffness = form.stiffness(&mesh, &space, StressBranch::New).unwrap();
    let m = mass[(1, 1)];
    let k = stiffness[(1, 1)];

    let mut fields = Fields::generate(&space);
    // Free vibration released from rest: a0 balances the elastic force
    fields
        .set_initial_conditions(
            DVector::from_vec(vec![0.0, u0]),
            DVector::zeros(2),
            DVector::from_vec(vec![0.0, -k * u0 / m]),
        )
        .unwrap();

    let solver = LinearFemSolver::new(form, mesh, space, bcs);
    SdofProblem {
        solver,
        fields,
        m,
        k,
    }
}

#[test]
fn first_step_matches_closed_form_newmark_displacement() {
    let u0 = 1.0;
    let mut problem = make_problem(u0);
    let f_ext = DVector::zeros(2);

    problem.solver.run(&mut problem.fields, &f_ext).unwrap();

    // With beta = 1/4 and no damping the free equation is
    // (k + m/(beta*dt^2)) u1 = m (u0/(beta*dt^2) + v0/(beta*dt) + (1/(2 beta) - 1) a0)
    let beta = 0.25;
    let m = problem.m;
    let k = problem.k;
    let a0 = -k * u0 / m;
    let numerator = m * (u0 / (beta * DT * DT) + (1.0 / (2.0 * beta) - 1.0) * a0);
    let expected = numerator / (k + m / (beta * DT * DT));

    let u1 = problem.fields.u_new[1];
    assert!(
        ((u1 - expected) / expected).abs() < 1e-9,
        "u1 = {u1}, expected {expected}"
    );
    // The clamped DOF never moves
    assert_eq!(problem.fields.u_new[0], 0.0);
}

#[test]
fn undamped_oscillation_stays_bounded() {
    let u0 = 1e-3;
    let mut problem = make_problem(u0);
    let updates = FieldUpdates::new(0.25, 0.5).unwrap();
    let f_ext = DVector::zeros(2);

    let mut peak: f64 = 0.0;
    let mut sign_changes = 0;
    let mut last_sign = 1.0_f64;
    for _ in 0..400 {
        problem.solver.run(&mut problem.fields, &f_ext).unwrap();
        updates.run(&mut problem.fields, DT).unwrap();

        let u = problem.fields.u_old[1];
        peak = peak.max(u.abs());
        if u != 0.0 && u.signum() != last_sign {
            sign_changes += 1;
            last_sign = u.signum();
        }
    }

    // Average-acceleration Newmark conserves energy for the undamped
    // linear problem; the amplitude cannot grow
    assert!(peak <= u0 * (1.0 + 1e-9), "peak = {peak}");
    // It actually oscillates: omega = sqrt(k/m) ~ 17.3 rad/s gives
    // roughly 11 zero crossings over 4 seconds
    assert!(sign_changes >= 8, "sign changes = {sign_changes}");
}

#[test]
fn rayleigh_damping_decays_the_response() {
    let u0 = 1e-3;
    let mesh = MeshBuilder::interval(1.0, 1, 1.0).unwrap();
    let space = SpaceBuilder::new(1).unwrap().generate(&mesh);
    let clamped = BoundaryMarker::plane_x("clamped", 0.0);
    let bcs = BcBuilder::clamp(&mesh, &space, &clamped);

    let alpha = GeneralizedAlphaParameters::newmark_average_acceleration();
    let relation = Box::new(LinearElastic::new(YOUNGS_MODULUS).unwrap());
    let form = ElastodynamicsForm::new(DENSITY, 0.1, 0.01, relation, alpha, DT).unwrap();
    let k_over_m = {
        let m = form.mass(&mesh, &space).unwrap()[(1, 1)];
        let k = form.stiffness(&mesh, &space, StressBranch::New).unwrap()[(1, 1)];
        k / m
    };

    let mut fields = Fields::generate(&space);
    fields
        .set_initial_conditions(
            DVector::from_vec(vec![0.0, u0]),
            DVector::zeros(2),
            DVector::from_vec(vec![0.0, -k_over_m * u0]),
        )
        .unwrap();

    let mut solver = LinearFemSolver::new(form, mesh, space, bcs);
    let updates = FieldUpdates::new(0.25, 0.5).unwrap();
    let f_ext = DVector::zeros(2);

    let mut late_peak: f64 = 0.0;
    for step in 0..800 {
        solver.run(&mut fields, &f_ext).unwrap();
        updates.run(&mut fields, DT).unwrap();
        if step >= 400 {
            late_peak = late_peak.max(fields.u_old[1].abs());
        }
    }

    assert!(
        late_peak < 0.5 * u0,
        "damped response did not decay: late peak = {late_peak}"
    );
}
