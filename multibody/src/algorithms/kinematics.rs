use crate::{
    MultibodyErrors,
    joint::JointModel,
    state::GeneralizedState,
    system::{BodyIndex, KinematicTree},
};
use spatial_algebra::{SpatialTransform, Velocity};
use transforms::Transform;

/// Position dependent transforms of every body, indexed like the tree's bodies.
#[derive(Debug, Clone)]
pub struct PositionKinematics {
    /// outer body from inner body across each body's inner joint,
    /// the inner body being the base for bodies attached to it
    pub ob_from_ib: Vec<SpatialTransform>,
    /// pose of each body frame in the base frame
    pub ob_from_base: Vec<Transform>,
}

impl PositionKinematics {
    pub fn body_pose(&self, body: BodyIndex) -> Option<&Transform> {
        self.ob_from_base.get(body.0)
    }
}

impl KinematicTree {
    pub fn calc_position_kinematics(
        &self,
        state: &GeneralizedState,
    ) -> Result<PositionKinematics, MultibodyErrors> {
        self.check_state(state)?;
        let q = state.q.as_slice();
        let mut ob_from_ib = Vec::with_capacity(self.bodies.len());
        let mut ob_from_base: Vec<Transform> = Vec::with_capacity(self.bodies.len());

        for (i, joint) in self.joints.iter().enumerate() {
            let jof_from_jif = joint.model.transform(&q[joint.position_range.clone()])?;
            let transform = joint.transforms.ob_from_ib(SpatialTransform(jof_from_jif));
            let pose = match self.parents[i] {
                Some(parent) => transform.0 * ob_from_base[parent.0],
                None => transform.0,
            };
            ob_from_ib.push(transform);
            ob_from_base.push(pose);
        }

        Ok(PositionKinematics {
            ob_from_ib,
            ob_from_base,
        })
    }

    /// Spatial velocity of every body relative to the base, expressed in the body frame.
    pub fn calc_spatial_velocities(
        &self,
        state: &GeneralizedState,
    ) -> Result<Vec<Velocity>, MultibodyErrors> {
        let kinematics = self.calc_position_kinematics(state)?;
        let v = state.v.as_slice();
        let mut velocities: Vec<Velocity> = Vec::with_capacity(self.bodies.len());
        for (i, joint) in self.joints.iter().enumerate() {
            let v_ij = match self.parents[i] {
                Some(parent) => velocities[parent.0],
                None => Velocity::zeros(),
            };
            let vj = Velocity::from(joint.motion(&v[joint.velocity_range.clone()]));
            velocities.push(kinematics.ob_from_ib[i] * v_ij + vj);
        }
        Ok(velocities)
    }
}
