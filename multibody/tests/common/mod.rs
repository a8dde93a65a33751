#![allow(dead_code)]

use mass_properties::{CenterOfMass, Inertia, MassProperties};
use multibody::{
    KinematicTree, KinematicTreeBuilder, body::BodyBuilder,
    joint::revolute::RevoluteBuilder,
};
use nalgebra::Vector3;
use transforms::Transform;

pub const MASS: f64 = 2.0;
pub const LENGTH: f64 = 1.0;
pub const G: f64 = 9.81;

/// Uniform rod hinged at its frame origin, lying along +y with its weight at the midpoint.
pub fn rod(sys: &mut KinematicTreeBuilder, name: &str) -> BodyBuilder {
    let mass = MassProperties::new(
        MASS,
        CenterOfMass::new(0.0, LENGTH / 2.0, 0.0),
        Inertia::thin_rod(MASS, LENGTH, &Vector3::y_axis()),
    )
    .unwrap();
    sys.new_body(name).unwrap().with_mass_properties(mass)
}

/// One rod on a hinge about base x, gravity along -z.
pub fn pendulum_builder() -> KinematicTreeBuilder {
    let mut sys = KinematicTreeBuilder::new();
    let mut link = rod(&mut sys, "link");
    let mut shoulder = sys
        .new_joint("shoulder", RevoluteBuilder::new().with_axis(Vector3::x()))
        .unwrap();
    sys.base
        .connect_outer_joint(&mut shoulder, Transform::identity())
        .unwrap();
    link.connect_inner_joint(&mut shoulder, Transform::identity())
        .unwrap();
    sys.add_body(link);
    sys.add_joint(shoulder);
    sys
}

pub fn pendulum() -> KinematicTree {
    pendulum_builder().finalize().unwrap()
}

/// Two rods in a chain, the elbow at the tip of the upper rod. Both hinges turn about x.
pub fn double_pendulum_builder() -> KinematicTreeBuilder {
    let mut sys = KinematicTreeBuilder::new();
    let mut upper = rod(&mut sys, "upper");
    let mut lower = rod(&mut sys, "lower");
    let mut shoulder = sys
        .new_joint("shoulder", RevoluteBuilder::new().with_axis(Vector3::x()))
        .unwrap();
    let mut elbow = sys
        .new_joint("elbow", RevoluteBuilder::new().with_axis(Vector3::x()))
        .unwrap();

    sys.base
        .connect_outer_joint(&mut shoulder, Transform::identity())
        .unwrap();
    upper
        .connect_inner_joint(&mut shoulder, Transform::identity())
        .unwrap();
    upper
        .connect_outer_joint(&mut elbow, Transform::from_translation(0.0, LENGTH, 0.0))
        .unwrap();
    lower
        .connect_inner_joint(&mut elbow, Transform::identity())
        .unwrap();

    sys.add_body(upper);
    sys.add_body(lower);
    sys.add_joint(shoulder);
    sys.add_joint(elbow);
    sys
}

pub fn double_pendulum() -> KinematicTree {
    double_pendulum_builder().finalize().unwrap()
}
