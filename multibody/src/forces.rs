use crate::{
    MultibodyErrors,
    algorithms::kinematics::PositionKinematics,
    joint::JointModel,
    state::{GeneralizedState, check_length},
    system::{BodyIndex, KinematicTree},
};
use gravity::GravityModel;
use nalgebra::DVector;
use spatial_algebra::Force;
use tracing::trace;

/// Applied forces on a tree: a spatial force per body and a generalized force per dof.
///
/// Body forces are expressed in the body frame with torque about the body frame
/// origin. The set is opaque to the dynamics, it is only ever summed.
#[derive(Debug, Clone, PartialEq)]
pub struct MultibodyForces {
    body_forces: Vec<Force>,
    generalized_forces: DVector<f64>,
}

impl MultibodyForces {
    /// All zero forces sized for `tree`.
    pub fn new(tree: &KinematicTree) -> Self {
        Self {
            body_forces: vec![Force::zeros(); tree.nbodies()],
            generalized_forces: DVector::zeros(tree.nv()),
        }
    }

    pub fn body_forces(&self) -> &[Force] {
        &self.body_forces
    }

    pub fn generalized_forces(&self) -> &DVector<f64> {
        &self.generalized_forces
    }

    pub fn add_body_force(&mut self, body: BodyIndex, force: Force) -> Result<(), MultibodyErrors> {
        let entry = self
            .body_forces
            .get_mut(body.0)
            .ok_or_else(|| MultibodyErrors::BodyNotFound(body.to_string()))?;
        *entry += force;
        Ok(())
    }

    pub fn add_generalized_force(&mut self, tau: &DVector<f64>) -> Result<(), MultibodyErrors> {
        check_length("generalized forces", self.generalized_forces.len(), tau.len())?;
        self.generalized_forces += tau;
        Ok(())
    }

    pub fn set_zero(&mut self) {
        self.body_forces.fill(Force::zeros());
        self.generalized_forces.fill(0.0);
    }

    pub fn add_in_place(&mut self, other: &MultibodyForces) -> Result<(), MultibodyErrors> {
        check_length("body forces", self.body_forces.len(), other.body_forces.len())?;
        self.add_generalized_force(&other.generalized_forces)?;
        for (force, other) in self.body_forces.iter_mut().zip(&other.body_forces) {
            *force += *other;
        }
        Ok(())
    }

    /// Fails when the set was sized for a different tree.
    pub(crate) fn check_compatible(&self, tree: &KinematicTree) -> Result<(), MultibodyErrors> {
        check_length("body forces", tree.nbodies(), self.body_forces.len())?;
        check_length("generalized forces", tree.nv(), self.generalized_forces.len())
    }
}

impl KinematicTree {
    /// Weight of every body, applied at its center of mass, in body frame coordinates.
    fn calc_gravity_body_forces(
        &self,
        kinematics: &PositionKinematics,
        forces: &mut MultibodyForces,
    ) -> Result<(), MultibodyErrors> {
        for (i, body) in self.bodies.iter().enumerate() {
            let pose = &kinematics.ob_from_base[i];
            let mass_properties = body.mass_properties();
            let com = mass_properties.center_of_mass.vector();
            let com_in_base = pose.translation + pose.rotate_vector(&com);
            let g = pose.transform_vector(&self.gravity.calculate(&com_in_base)?);
            forces.body_forces[i] += Force::from_point_force(&com, &(g * mass_properties.mass));
        }
        Ok(())
    }

    /// Gravity plus the joints' spring, damper and constant forces at the state's
    /// positions and velocities.
    ///
    /// Positions must be set before calling: gravity is resolved through the current
    /// body orientations, so a stale state yields forces for that stale configuration.
    pub fn calc_force_elements_contribution(
        &self,
        state: &GeneralizedState,
    ) -> Result<MultibodyForces, MultibodyErrors> {
        let kinematics = self.calc_position_kinematics(state)?;
        let mut forces = MultibodyForces::new(self);
        self.calc_gravity_body_forces(&kinematics, &mut forces)?;

        let q = state.q.as_slice();
        let v = state.v.as_slice();
        let tau = forces.generalized_forces.as_mut_slice();
        for joint in &self.joints {
            joint.model.calculate_tau(
                &q[joint.position_range.clone()],
                &v[joint.velocity_range.clone()],
                &mut tau[joint.velocity_range.clone()],
            );
        }
        trace!(nbodies = self.bodies.len(), "force elements");
        Ok(forces)
    }

    /// Generalized forces equivalent to `forces`: J^T F_body + tau_applied.
    pub fn calc_generalized_forces(
        &self,
        state: &GeneralizedState,
        forces: &MultibodyForces,
    ) -> Result<DVector<f64>, MultibodyErrors> {
        forces.check_compatible(self)?;
        let kinematics = self.calc_position_kinematics(state)?;
        let mut f = forces.body_forces.clone();
        let mut tau = forces.generalized_forces.clone();
        self.rne_second_pass(&kinematics, &mut f, &mut tau);
        Ok(tau)
    }

    /// Generalized forces of gravity alone, J^T F_gravity.
    pub fn calc_gravity_generalized_forces(
        &self,
        state: &GeneralizedState,
    ) -> Result<DVector<f64>, MultibodyErrors> {
        let kinematics = self.calc_position_kinematics(state)?;
        let mut forces = MultibodyForces::new(self);
        self.calc_gravity_body_forces(&kinematics, &mut forces)?;
        let mut tau = forces.generalized_forces;
        self.rne_second_pass(&kinematics, &mut forces.body_forces, &mut tau);
        Ok(tau)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        joint::{JointParameters, prismatic::PrismaticBuilder},
        system::KinematicTreeBuilder,
    };
    use approx::assert_abs_diff_eq;
    use mass_properties::{CenterOfMass, MassProperties};
    use nalgebra::Vector3;
    use transforms::Transform;

    // 3 kg block on a vertical slider with a spring
    fn slider() -> KinematicTree {
        let mass = MassProperties::point_mass(3.0, CenterOfMass::default()).unwrap();
        let mut sys = KinematicTreeBuilder::new();
        let mut block = sys.new_body("block").unwrap().with_mass_properties(mass);
        let mut slide = sys
            .new_joint(
                "slide",
                PrismaticBuilder::new()
                    .with_axis(Vector3::z())
                    .with_parameters(JointParameters::new(0.0, 0.0, 0.0, 100.0)),
            )
            .unwrap();
        sys.base
            .connect_outer_joint(&mut slide, Transform::identity())
            .unwrap();
        block
            .connect_inner_joint(&mut slide, Transform::identity())
            .unwrap();
        sys.add_body(block);
        sys.add_joint(slide);
        sys.finalize().unwrap()
    }

    #[test]
    fn test_force_elements_include_gravity_and_spring() {
        let tree = slider();
        let mut state = tree.create_default_state();
        tree.set_positions(&mut state, &DVector::from_vec(vec![0.1])).unwrap();

        let forces = tree.calc_force_elements_contribution(&state).unwrap();
        assert_abs_diff_eq!(
            forces.body_forces()[0].translation(),
            Vector3::new(0.0, 0.0, -3.0 * 9.81),
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(forces.generalized_forces()[0], -10.0, epsilon = 1e-12);

        let tau = tree.calc_generalized_forces(&state, &forces).unwrap();
        let gravity = tree.calc_gravity_generalized_forces(&state).unwrap();
        assert_abs_diff_eq!(gravity[0], -3.0 * 9.81, epsilon = 1e-12);
        assert_abs_diff_eq!(tau[0], gravity[0] - 10.0, epsilon = 1e-12);
    }

    #[test]
    fn test_forces_sum_and_reset() {
        let tree = slider();
        let mut forces = MultibodyForces::new(&tree);
        let push = Force::new(Vector3::zeros(), Vector3::new(0.0, 0.0, 1.0));
        forces.add_body_force(BodyIndex(0), push).unwrap();
        forces
            .add_generalized_force(&DVector::from_vec(vec![2.0]))
            .unwrap();

        let mut total = forces.clone();
        total.add_in_place(&forces).unwrap();
        assert_abs_diff_eq!(total.body_forces()[0].translation()[2], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(total.generalized_forces()[0], 4.0, epsilon = 1e-12);

        total.set_zero();
        assert_eq!(total, MultibodyForces::new(&tree));
    }

    #[test]
    fn test_force_on_missing_body_rejected() {
        let tree = slider();
        let mut forces = MultibodyForces::new(&tree);
        let result = forces.add_body_force(BodyIndex(3), Force::zeros());
        assert!(matches!(result, Err(MultibodyErrors::BodyNotFound(_))));
        let result = forces.add_generalized_force(&DVector::zeros(2));
        assert!(matches!(result, Err(MultibodyErrors::DimensionMismatch { .. })));
    }
}
