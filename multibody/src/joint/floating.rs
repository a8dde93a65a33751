use crate::joint::{JointErrors, JointModel};
use nalgebra::{Quaternion, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use spatial_algebra::MotionVector;
use transforms::Transform;

// smallest quaternion norm accepted before normalizing
const MIN_QUATERNION_NORM: f64 = 1e-9;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatingBuilder {
    /// initial pose of the joint outer frame in the joint inner frame
    pub pose: Transform,
}

impl FloatingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pose(mut self, pose: Transform) -> Self {
        self.pose = pose;
        self
    }

    pub fn with_position(mut self, x: f64, y: f64, z: f64) -> Self {
        self.pose.translation = Vector3::new(x, y, z);
        self
    }

    pub fn with_attitude(mut self, attitude: UnitQuaternion<f64>) -> Self {
        self.pose.rotation = attitude;
        self
    }

    pub fn build(&self) -> Result<Floating, JointErrors> {
        let finite = self.pose.translation.iter().all(|e| e.is_finite())
            && self.pose.rotation.coords.iter().all(|e| e.is_finite());
        if !finite {
            return Err(JointErrors::NonFinitePosition);
        }
        Ok(Floating { pose: self.pose })
    }
}

/// Six unconstrained degrees of freedom.
///
/// Positions are q = [qw, qx, qy, qz, x, y, z]: the attitude of the joint outer frame in the
/// joint inner frame followed by the outer frame origin in inner frame coordinates.
/// Velocities are v = [wx, wy, wz, vx, vy, vz], the spatial velocity of the outer frame
/// relative to the inner frame expressed in the outer frame, so nq = 7 while nv = 6.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Floating {
    pub pose: Transform,
}

impl JointModel for Floating {
    fn nq(&self) -> usize {
        7
    }

    fn nv(&self) -> usize {
        6
    }

    fn default_positions(&self, q: &mut [f64]) {
        let rotation = self.pose.rotation;
        q[0] = rotation.w;
        q[1] = rotation.i;
        q[2] = rotation.j;
        q[3] = rotation.k;
        q[4..7].copy_from_slice(self.pose.translation.as_slice());
    }

    fn transform(&self, q: &[f64]) -> Result<Transform, JointErrors> {
        if !q[..7].iter().all(|e| e.is_finite()) {
            return Err(JointErrors::NonFinitePosition);
        }
        let quaternion = Quaternion::new(q[0], q[1], q[2], q[3]);
        if quaternion.norm() < MIN_QUATERNION_NORM {
            return Err(JointErrors::ZeroQuaternion);
        }
        Ok(Transform::new(
            UnitQuaternion::from_quaternion(quaternion),
            Vector3::new(q[4], q[5], q[6]),
        ))
    }

    fn motion_subspace(&self) -> Vec<MotionVector> {
        // S is just identity for a floating joint
        let e = |i: usize| Vector3::ith(i, 1.0);
        vec![
            MotionVector::new(e(0), Vector3::zeros()),
            MotionVector::new(e(1), Vector3::zeros()),
            MotionVector::new(e(2), Vector3::zeros()),
            MotionVector::new(Vector3::zeros(), e(0)),
            MotionVector::new(Vector3::zeros(), e(1)),
            MotionVector::new(Vector3::zeros(), e(2)),
        ]
    }

    fn calculate_tau(&self, _q: &[f64], _v: &[f64], _tau: &mut [f64]) {}
}
