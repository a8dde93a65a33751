use serde::{Deserialize, Serialize};
use spatial_algebra::SpatialTransform;
use transforms::Transform;

/// We use the terminology B_from_A rather than A_to_B so that notation matches
/// matrix multiplication
/// i.e. v_C = C_from_B * B_from_A * v_A instead of
///      v_C = (A_to_B * B_to_C) * v_A
/// base: the reference frame that is the base
/// inner_body: the "body frame" of the body on the base side of the joint
/// outer_body: the "body frame" of the body on the tip side of the joint
/// jif: the "joint inner frame"
/// jof: the "joint outer frame"
///
/// Only the connection transforms are stored, they are fixed once the tree is finalized.
/// The joint's own jof_from_jif depends on the state and is supplied per evaluation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JointTransforms {
    pub jif_from_ib: SpatialTransform, // my-joint-inner-frame from my-inner-body-frame
    pub jof_from_ob: SpatialTransform, // my-joint-outer-frame from my-outer-body-frame
    pub ob_from_jof: SpatialTransform, // my-outer-body-frame from my-joint-outer-frame
}

impl JointTransforms {
    pub fn new(jif_from_ib: Transform, jof_from_ob: Transform) -> Self {
        Self {
            jif_from_ib: SpatialTransform(jif_from_ib),
            jof_from_ob: SpatialTransform(jof_from_ob),
            ob_from_jof: SpatialTransform(jof_from_ob.inv()),
        }
    }

    /// Transform from the inner body frame to the outer body frame across the joint.
    pub fn ob_from_ib(&self, jof_from_jif: SpatialTransform) -> SpatialTransform {
        // transforms are multiplied like matrices from right to left
        self.ob_from_jof * jof_from_jif * self.jif_from_ib
    }
}
