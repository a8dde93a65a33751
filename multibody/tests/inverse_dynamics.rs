mod common;

use approx::assert_abs_diff_eq;
use common::{G, LENGTH, MASS, double_pendulum, pendulum, rod};
use mass_properties::{CenterOfMass, Inertia, MassProperties};
use multibody::{
    KinematicTree, KinematicTreeBuilder, MultibodyErrors, MultibodyForces,
    joint::{JointModelBuilders, floating::FloatingBuilder, revolute::RevoluteBuilder},
};
use nalgebra::{DVector, Vector3};
use spatial_algebra::Force;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};
use transforms::Transform;

fn at_angles(tree: &KinematicTree, q: &[f64], v: &[f64]) -> multibody::GeneralizedState {
    let mut state = tree.create_default_state();
    tree.set_positions(&mut state, &DVector::from_row_slice(q))
        .unwrap();
    tree.set_velocities(&mut state, &DVector::from_row_slice(v))
        .unwrap();
    state
}

fn holding_torque(theta: f64) -> f64 {
    MASS * G * LENGTH / 2.0 * theta.cos()
}

#[test]
fn test_pendulum_holding_torque() {
    let tree = pendulum();
    for theta in [FRAC_PI_4, 0.0, FRAC_PI_2, PI] {
        let state = at_angles(&tree, &[theta], &[0.0]);
        let forces = tree.calc_force_elements_contribution(&state).unwrap();
        let tau = tree
            .calc_inverse_dynamics(&state, &DVector::zeros(1), &forces)
            .unwrap();
        assert_eq!(tau.len(), 1);
        assert_abs_diff_eq!(tau[0], holding_torque(theta), epsilon = 1e-12);

        let gravity = tree.calc_gravity_generalized_forces(&state).unwrap();
        let from_elements = tree.calc_generalized_forces(&state, &forces).unwrap();
        assert_abs_diff_eq!(gravity, from_elements, epsilon = 1e-12);
    }
}

#[test]
fn test_upright_rod_needs_no_torque() {
    let tree = pendulum();
    let state = at_angles(&tree, &[FRAC_PI_2], &[0.0]);
    let forces = tree.calc_force_elements_contribution(&state).unwrap();
    let tau = tree
        .calc_inverse_dynamics(&state, &DVector::zeros(1), &forces)
        .unwrap();
    assert_abs_diff_eq!(tau[0], 0.0, epsilon = 1e-12);
}

#[test]
fn test_gravity_generalized_forces_agree() {
    let tree = pendulum();
    let state = at_angles(&tree, &[FRAC_PI_4], &[0.0]);

    let gravity = tree.calc_gravity_generalized_forces(&state).unwrap();
    let forces = tree.calc_force_elements_contribution(&state).unwrap();
    let from_elements = tree.calc_generalized_forces(&state, &forces).unwrap();
    let tau = tree
        .calc_inverse_dynamics(&state, &DVector::zeros(1), &forces)
        .unwrap();

    assert_abs_diff_eq!(gravity[0], -holding_torque(FRAC_PI_4), epsilon = 1e-12);
    assert_abs_diff_eq!(from_elements, gravity, epsilon = 1e-12);
    assert_abs_diff_eq!(tau, -gravity, epsilon = 1e-12);
}

#[test]
fn test_rod_acceleration_uses_inertia_about_hinge() {
    let tree = pendulum();
    let state = at_angles(&tree, &[0.3], &[1.5]);
    let forces = tree.calc_force_elements_contribution(&state).unwrap();
    let vdot = DVector::from_vec(vec![2.0]);
    let tau = tree.calc_inverse_dynamics(&state, &vdot, &forces).unwrap();

    // a single hinge sees no velocity product terms
    let inertia = MASS * LENGTH * LENGTH / 3.0;
    assert_abs_diff_eq!(tau[0], inertia * 2.0 + holding_torque(0.3), epsilon = 1e-12);
}

#[test]
fn test_vdot_mismatch_has_no_side_effects() {
    let tree = pendulum();
    let state = at_angles(&tree, &[0.7], &[0.2]);
    let before = state.clone();
    let forces = tree.calc_force_elements_contribution(&state).unwrap();

    let result = tree.calc_inverse_dynamics(&state, &DVector::zeros(2), &forces);
    assert_eq!(
        result,
        Err(MultibodyErrors::DimensionMismatch {
            quantity: "vdot",
            expected: 1,
            actual: 2
        })
    );
    assert_eq!(state, before);
}

#[test]
fn test_forces_from_another_tree_rejected() {
    let tree = pendulum();
    let other = double_pendulum();
    let state = tree.create_default_state();
    let forces = MultibodyForces::new(&other);
    let result = tree.calc_inverse_dynamics(&state, &DVector::zeros(1), &forces);
    assert!(matches!(
        result,
        Err(MultibodyErrors::DimensionMismatch { .. })
    ));
}

#[test]
fn test_applied_forces_are_netted_out() {
    let tree = pendulum();
    let state = at_angles(&tree, &[0.0], &[0.0]);
    let mut forces = tree.calc_force_elements_contribution(&state).unwrap();

    // at zero angle the rod frame is aligned with the base, so lift its weight directly
    let link = tree.body_by_name("link").unwrap();
    let lift = Force::from_point_force(
        &Vector3::new(0.0, LENGTH / 2.0, 0.0),
        &Vector3::new(0.0, 0.0, MASS * G),
    );
    forces.add_body_force(link, lift).unwrap();
    let tau = tree
        .calc_inverse_dynamics(&state, &DVector::zeros(1), &forces)
        .unwrap();
    assert_abs_diff_eq!(tau[0], 0.0, epsilon = 1e-12);

    // a motor torque reduces what the hinge must supply one for one
    forces
        .add_generalized_force(&DVector::from_vec(vec![1.5]))
        .unwrap();
    let tau = tree
        .calc_inverse_dynamics(&state, &DVector::zeros(1), &forces)
        .unwrap();
    assert_abs_diff_eq!(tau[0], -1.5, epsilon = 1e-12);
}

#[test]
fn test_double_pendulum_static_torques() {
    let tree = double_pendulum();
    for (q1, q2) in [(0.0, 0.0), (FRAC_PI_4, -0.3), (1.2, 2.0), (-0.5, PI)] {
        let state = at_angles(&tree, &[q1, q2], &[0.0, 0.0]);
        let forces = tree.calc_force_elements_contribution(&state).unwrap();
        let tau = tree
            .calc_inverse_dynamics(&state, &DVector::zeros(2), &forces)
            .unwrap();

        let elbow = MASS * G * LENGTH / 2.0 * (q1 + q2).cos();
        let shoulder = MASS * G * LENGTH / 2.0 * q1.cos()
            + MASS * G * (LENGTH * q1.cos() + LENGTH / 2.0 * (q1 + q2).cos());
        assert_abs_diff_eq!(tau[1], elbow, epsilon = 1e-12);
        assert_abs_diff_eq!(tau[0], shoulder, epsilon = 1e-12);
    }
}

#[test]
fn test_double_pendulum_mass_matrix() {
    let tree = double_pendulum();
    let q2 = 0.8;
    let state = at_angles(&tree, &[0.4, q2], &[3.0, -2.0]);
    let m = tree.calc_mass_matrix_via_inverse_dynamics(&state).unwrap();

    let ml2 = MASS * LENGTH * LENGTH;
    assert_abs_diff_eq!(m[(0, 0)], ml2 * (5.0 / 3.0 + q2.cos()), epsilon = 1e-12);
    assert_abs_diff_eq!(m[(0, 1)], ml2 * (1.0 / 3.0 + q2.cos() / 2.0), epsilon = 1e-12);
    assert_abs_diff_eq!(m[(1, 1)], ml2 / 3.0, epsilon = 1e-12);
    assert_abs_diff_eq!(m, m.transpose(), epsilon = 1e-12);
}

#[test]
fn test_double_pendulum_bias_term() {
    let tree = double_pendulum();
    let (q2, qd1, qd2) = (0.8, 3.0, -2.0);
    let state = at_angles(&tree, &[0.4, q2], &[qd1, qd2]);
    let bias = tree.calc_bias_term(&state).unwrap();

    let h = MASS * LENGTH * LENGTH / 2.0 * q2.sin();
    assert_abs_diff_eq!(bias[0], -h * (2.0 * qd1 * qd2 + qd2 * qd2), epsilon = 1e-12);
    assert_abs_diff_eq!(bias[1], h * qd1 * qd1, epsilon = 1e-12);
}

#[test]
fn test_inverse_dynamics_decomposes() {
    let tree = double_pendulum();
    let state = at_angles(&tree, &[-0.2, 1.1], &[0.5, 1.7]);
    let vdot = DVector::from_vec(vec![-1.0, 0.25]);
    let forces = tree.calc_force_elements_contribution(&state).unwrap();

    let tau = tree.calc_inverse_dynamics(&state, &vdot, &forces).unwrap();
    let m = tree.calc_mass_matrix_via_inverse_dynamics(&state).unwrap();
    let bias = tree.calc_bias_term(&state).unwrap();
    let applied = tree.calc_generalized_forces(&state, &forces).unwrap();

    assert_abs_diff_eq!(tau, m * vdot + bias - applied, epsilon = 1e-10);
}

#[test]
fn test_batch_matches_sequential() {
    let tree = double_pendulum();
    let cases = (0..16)
        .map(|k| {
            let t = k as f64 * 0.1;
            let state = at_angles(&tree, &[t.sin(), t.cos()], &[t, -t]);
            let forces = tree.calc_force_elements_contribution(&state).unwrap();
            (state, DVector::from_vec(vec![1.0 - t, t * t]), forces)
        })
        .collect::<Vec<_>>();

    let batch = tree.calc_inverse_dynamics_batch(&cases).unwrap();
    assert_eq!(batch.len(), cases.len());
    for ((state, vdot, forces), tau) in cases.iter().zip(&batch) {
        let sequential = tree.calc_inverse_dynamics(state, vdot, forces).unwrap();
        assert_eq!(&sequential, tau);
    }
}

#[test]
fn test_batch_fails_on_bad_case() {
    let tree = pendulum();
    let state = tree.create_default_state();
    let forces = MultibodyForces::new(&tree);
    let cases = vec![
        (state.clone(), DVector::zeros(1), forces.clone()),
        (state, DVector::zeros(3), forces),
    ];
    assert!(tree.calc_inverse_dynamics_batch(&cases).is_err());
}

#[test]
fn test_newtonian_weight_on_free_body() {
    let mu = 4.0e14;
    let radius = 7.0e6;
    let mut sys = KinematicTreeBuilder::new();
    sys.set_gravity_newtonian(mu).unwrap();
    let mass = MassProperties::new(
        100.0,
        CenterOfMass::default(),
        Inertia::solid_cuboid(100.0, 1.0, 1.0, 1.0),
    )
    .unwrap();
    let mut satellite = sys.new_body("satellite").unwrap().with_mass_properties(mass);
    let mut orbit = sys
        .new_joint(
            "orbit",
            FloatingBuilder::new().with_position(0.0, 0.0, radius),
        )
        .unwrap();
    sys.base
        .connect_outer_joint(&mut orbit, Transform::identity())
        .unwrap();
    satellite
        .connect_inner_joint(&mut orbit, Transform::identity())
        .unwrap();
    sys.add_body(satellite);
    sys.add_joint(orbit);
    let tree = sys.finalize().unwrap();

    let state = tree.create_default_state();
    let gravity = tree.calc_gravity_generalized_forces(&state).unwrap();
    assert_eq!(gravity.len(), 6);
    assert_abs_diff_eq!(gravity[5], -100.0 * mu / (radius * radius), epsilon = 1e-9);
    assert_abs_diff_eq!(gravity[3], 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(gravity[4], 0.0, epsilon = 1e-12);
}

#[test]
fn test_welded_rods_act_as_one_body() {
    let mut sys = KinematicTreeBuilder::new();
    let mut upper = rod(&mut sys, "upper");
    let mut lower = rod(&mut sys, "lower");
    let mut shoulder = sys
        .new_joint("shoulder", RevoluteBuilder::new().with_axis(Vector3::x()))
        .unwrap();
    let mut weld = sys.new_joint("weld", JointModelBuilders::Fixed).unwrap();
    sys.base
        .connect_outer_joint(&mut shoulder, Transform::identity())
        .unwrap();
    upper
        .connect_inner_joint(&mut shoulder, Transform::identity())
        .unwrap();
    upper
        .connect_outer_joint(&mut weld, Transform::from_translation(0.0, LENGTH, 0.0))
        .unwrap();
    lower
        .connect_inner_joint(&mut weld, Transform::identity())
        .unwrap();
    sys.add_body(upper);
    sys.add_body(lower);
    sys.add_joint(shoulder);
    sys.add_joint(weld);
    let tree = sys.finalize().unwrap();

    assert_eq!(tree.nq(), 1);
    assert_eq!(tree.nv(), 1);
    let weld = tree.joint_by_name("weld").unwrap();
    assert_eq!(tree.joint_position_range(weld).unwrap(), 1..1);
    assert_eq!(tree.joint_velocity_range(weld).unwrap(), 1..1);

    let theta = 0.3;
    let state = at_angles(&tree, &[theta], &[0.7]);
    let forces = tree.calc_force_elements_contribution(&state).unwrap();
    let tau = tree
        .calc_inverse_dynamics(&state, &DVector::zeros(1), &forces)
        .unwrap();
    // a 2L rod of mass 2m, weight acting at L; a single hinge has no velocity terms
    assert_abs_diff_eq!(tau[0], 2.0 * MASS * G * LENGTH * theta.cos(), epsilon = 1e-12);

    let m = tree.calc_mass_matrix_via_inverse_dynamics(&state).unwrap();
    let inertia = 2.0 * MASS * (2.0 * LENGTH).powi(2) / 3.0;
    assert_abs_diff_eq!(m[(0, 0)], inertia, epsilon = 1e-12);
}

#[test]
fn test_massless_gimbal_link() {
    // shoulder about x, then a massless link, then a hinge about y carrying the rod
    let mut sys = KinematicTreeBuilder::new();
    let mut gimbal = sys
        .new_body("gimbal")
        .unwrap()
        .with_mass_properties(MassProperties::massless());
    let mut link = rod(&mut sys, "link");
    let mut pitch = sys
        .new_joint("pitch", RevoluteBuilder::new().with_axis(Vector3::x()))
        .unwrap();
    let mut roll = sys
        .new_joint("roll", RevoluteBuilder::new().with_axis(Vector3::y()))
        .unwrap();
    sys.base
        .connect_outer_joint(&mut pitch, Transform::identity())
        .unwrap();
    gimbal
        .connect_inner_joint(&mut pitch, Transform::identity())
        .unwrap();
    gimbal
        .connect_outer_joint(&mut roll, Transform::identity())
        .unwrap();
    link.connect_inner_joint(&mut roll, Transform::identity())
        .unwrap();
    sys.add_body(gimbal);
    sys.add_body(link);
    sys.add_joint(pitch);
    sys.add_joint(roll);
    let tree = sys.finalize().unwrap();

    // the rod's center of mass lies on the roll axis, so only pitch carries its weight
    let state = at_angles(&tree, &[0.6, 1.1], &[0.0, 0.0]);
    let forces = tree.calc_force_elements_contribution(&state).unwrap();
    let tau = tree
        .calc_inverse_dynamics(&state, &DVector::zeros(2), &forces)
        .unwrap();
    assert_abs_diff_eq!(tau[0], holding_torque(0.6), epsilon = 1e-12);
    assert_abs_diff_eq!(tau[1], 0.0, epsilon = 1e-12);
}
