use geometry::{
    Geometry,
    cuboid::Cuboid,
    proximity_properties::{
        CoulombFriction, add_contact_material, add_rigid_hydroelastic_properties,
    },
};
use mass_properties::{CenterOfMass, Inertia, MassProperties};
use multibody::{
    KinematicTreeBuilder, MultibodyForces,
    joint::{prismatic::PrismaticBuilder, revolute::RevoluteBuilder},
};
use nalgebra::{DVector, Vector3};
use transforms::Transform;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Create a new system
    let mut sys = KinematicTreeBuilder::new();
    // Add some constant gravity to the frame
    sys.set_gravity_constant(0.0, 0.0, -9.8)?;

    // Create the bodies
    let mut cart = sys.new_body("cart")?;
    cart.set_mass_properties(MassProperties::new(
        10.0,
        CenterOfMass::default(),
        Inertia::solid_cuboid(10.0, 1.0, 2.0, 1.0),
    )?);
    let mut wheels = Geometry::new("wheels", Cuboid::new(1.0, 2.0, 1.0)?)?;
    add_contact_material(
        Some(1e7),
        Some(0.5),
        Some(CoulombFriction::new(0.8, 0.6)?),
        wheels.proximity_properties_mut(),
    )?;
    add_rigid_hydroelastic_properties(0.05, wheels.proximity_properties_mut())?;
    cart.add_geometry(wheels)?;

    let mut pole = sys.new_body("pole")?;
    pole.set_mass_properties(MassProperties::new(
        1.0,
        CenterOfMass::new(0.0, 0.0, 1.0),
        Inertia::thin_rod(1.0, 2.0, &Vector3::z_axis()),
    )?);

    // Create the joints
    let mut hinge = sys.new_joint(
        "hinge",
        RevoluteBuilder::new()
            .with_axis(Vector3::x())
            .with_angle(0.05),
    )?;
    let mut prismatic =
        sys.new_joint("prismatic", PrismaticBuilder::new().with_axis(Vector3::y()))?;

    // connect the system
    sys.base
        .connect_outer_joint(&mut prismatic, Transform::identity())?;
    cart.connect_inner_joint(&mut prismatic, Transform::from_translation(0.0, 0.0, -0.5))?;
    cart.connect_outer_joint(&mut hinge, Transform::from_translation(0.0, 0.0, 0.5))?;
    pole.connect_inner_joint(&mut hinge, Transform::identity())?;

    sys.add_body(cart);
    sys.add_body(pole);
    sys.add_joint(hinge);
    sys.add_joint(prismatic);

    let tree = sys.finalize()?;

    // generalized forces needed to follow a few samples of a swing up trajectory
    let cases = (0..8)
        .map(|k| {
            let t = k as f64 * 0.25;
            let mut state = tree.create_default_state();
            let q = DVector::from_vec(vec![0.2 * t.sin(), 0.05 + 0.3 * t]);
            tree.set_positions(&mut state, &q)?;
            tree.set_velocities(&mut state, &DVector::from_vec(vec![0.2 * t.cos(), 0.3]))?;
            let vdot = DVector::from_vec(vec![-0.2 * t.sin(), 0.0]);
            let forces: MultibodyForces = tree.calc_force_elements_contribution(&state)?;
            Ok((state, vdot, forces))
        })
        .collect::<Result<Vec<_>, multibody::MultibodyErrors>>()?;

    for (k, tau) in tree.calc_inverse_dynamics_batch(&cases)?.iter().enumerate() {
        println!(
            "t = {:.2} s: cart force {:9.3} N, hinge torque {:9.3} N m",
            k as f64 * 0.25,
            tau[0],
            tau[1]
        );
    }

    Ok(())
}
