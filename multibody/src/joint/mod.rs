pub mod floating;
pub mod joint_transforms;
pub mod prismatic;
pub mod revolute;

use crate::{
    body::BodyConnectionBuilder,
    system::{BodyIndex, Id},
};
use floating::{Floating, FloatingBuilder};
use joint_transforms::JointTransforms;
use nalgebra::{Unit, Vector3};
use prismatic::{Prismatic, PrismaticBuilder};
use revolute::{Revolute, RevoluteBuilder};
use serde::{Deserialize, Serialize};
use spatial_algebra::MotionVector;
use std::ops::Range;
use thiserror::Error;
use transforms::Transform;

#[derive(Debug, Error, PartialEq)]
pub enum JointErrors {
    #[error("name cannot be empty for joint")]
    EmptyName,
    #[error("inner body already exists for joint '{0}'")]
    InnerBodyExists(String),
    #[error("joint axis must be finite and nonzero")]
    InvalidAxis,
    #[error("joint parameter '{0}' must be finite, got {1}")]
    InvalidParameter(&'static str, f64),
    #[error("joint positions must be finite")]
    NonFinitePosition,
    #[error("outer body already exists for joint '{0}'")]
    OuterBodyExists(String),
    #[error("floating joint attitude quaternion has zero norm")]
    ZeroQuaternion,
}

/// Spring, damper and constant force acting along a single degree of freedom.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointParameters {
    pub constant_force: f64,
    pub damping: f64,
    pub equilibrium: f64,
    pub spring_constant: f64,
}

impl JointParameters {
    pub fn new(constant_force: f64, damping: f64, equilibrium: f64, spring_constant: f64) -> Self {
        Self {
            constant_force,
            damping,
            equilibrium,
            spring_constant,
        }
    }

    pub fn validate(&self) -> Result<(), JointErrors> {
        let checks = [
            ("constant_force", self.constant_force),
            ("damping", self.damping),
            ("equilibrium", self.equilibrium),
            ("spring_constant", self.spring_constant),
        ];
        for (name, value) in checks {
            if !value.is_finite() {
                return Err(JointErrors::InvalidParameter(name, value));
            }
        }
        Ok(())
    }

    pub fn calculate_tau(&self, position: f64, velocity: f64) -> f64 {
        self.constant_force
            - self.spring_constant * (position - self.equilibrium)
            - self.damping * velocity
    }
}

/// Normalizes a user supplied joint axis.
pub(crate) fn unit_axis(axis: &Vector3<f64>) -> Result<Unit<Vector3<f64>>, JointErrors> {
    if !axis.iter().all(|e| e.is_finite()) {
        return Err(JointErrors::InvalidAxis);
    }
    Unit::try_new(*axis, f64::EPSILON).ok_or(JointErrors::InvalidAxis)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JointModelBuilders {
    Fixed,
    Floating(FloatingBuilder),
    Prismatic(PrismaticBuilder),
    Revolute(RevoluteBuilder),
}

impl JointModelBuilders {
    pub fn build(&self) -> Result<JointModels, JointErrors> {
        match self {
            JointModelBuilders::Fixed => Ok(JointModels::Fixed),
            JointModelBuilders::Floating(builder) => Ok(JointModels::Floating(builder.build()?)),
            JointModelBuilders::Prismatic(builder) => {
                Ok(JointModels::Prismatic(builder.build()?))
            }
            JointModelBuilders::Revolute(builder) => Ok(JointModels::Revolute(builder.build()?)),
        }
    }
}

impl From<FloatingBuilder> for JointModelBuilders {
    fn from(value: FloatingBuilder) -> Self {
        JointModelBuilders::Floating(value)
    }
}
impl From<PrismaticBuilder> for JointModelBuilders {
    fn from(value: PrismaticBuilder) -> Self {
        JointModelBuilders::Prismatic(value)
    }
}
impl From<RevoluteBuilder> for JointModelBuilders {
    fn from(value: RevoluteBuilder) -> Self {
        JointModelBuilders::Revolute(value)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointConnectionBuilder {
    pub inner_body: Option<BodyConnectionBuilder>,
    pub outer_body: Option<BodyConnectionBuilder>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointBuilder {
    pub id: Id,
    pub name: String,
    pub model: JointModelBuilders,
    pub connections: JointConnectionBuilder,
}

impl JointBuilder {
    pub fn new(
        id: Id,
        name: &str,
        model: impl Into<JointModelBuilders>,
    ) -> Result<Self, JointErrors> {
        if name.is_empty() {
            return Err(JointErrors::EmptyName);
        }
        Ok(Self {
            id,
            name: name.to_string(),
            model: model.into(),
            connections: JointConnectionBuilder::default(),
        })
    }

    /// A joint that welds its outer body to its inner body.
    pub fn fixed(id: Id, name: &str) -> Result<Self, JointErrors> {
        Self::new(id, name, JointModelBuilders::Fixed)
    }
}

pub trait JointModel {
    /// Number of generalized positions owned by the joint
    fn nq(&self) -> usize;
    /// Number of degrees of freedom, the dimension of the motion subspace
    fn nv(&self) -> usize;
    /// Writes the configured initial configuration into the joint's slice of q
    fn default_positions(&self, q: &mut [f64]);
    /// Pose of the joint outer frame in the joint inner frame (jof_from_jif) at positions `q`
    fn transform(&self, q: &[f64]) -> Result<Transform, JointErrors>;
    /// Basis of the motion subspace in joint outer frame coordinates, one column per dof
    fn motion_subspace(&self) -> Vec<MotionVector>;
    /// Adds the generalized forces of the joint's internal force elements to `tau`
    fn calculate_tau(&self, q: &[f64], v: &[f64], tau: &mut [f64]);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JointModels {
    Fixed,
    Floating(Floating),
    Prismatic(Prismatic),
    Revolute(Revolute),
}

impl JointModel for JointModels {
    fn nq(&self) -> usize {
        match self {
            JointModels::Fixed => 0,
            JointModels::Floating(joint) => joint.nq(),
            JointModels::Prismatic(joint) => joint.nq(),
            JointModels::Revolute(joint) => joint.nq(),
        }
    }

    fn nv(&self) -> usize {
        match self {
            JointModels::Fixed => 0,
            JointModels::Floating(joint) => joint.nv(),
            JointModels::Prismatic(joint) => joint.nv(),
            JointModels::Revolute(joint) => joint.nv(),
        }
    }

    fn default_positions(&self, q: &mut [f64]) {
        match self {
            JointModels::Fixed => {}
            JointModels::Floating(joint) => joint.default_positions(q),
            JointModels::Prismatic(joint) => joint.default_positions(q),
            JointModels::Revolute(joint) => joint.default_positions(q),
        }
    }

    fn transform(&self, q: &[f64]) -> Result<Transform, JointErrors> {
        match self {
            JointModels::Fixed => Ok(Transform::identity()),
            JointModels::Floating(joint) => joint.transform(q),
            JointModels::Prismatic(joint) => joint.transform(q),
            JointModels::Revolute(joint) => joint.transform(q),
        }
    }

    fn motion_subspace(&self) -> Vec<MotionVector> {
        match self {
            JointModels::Fixed => Vec::new(),
            JointModels::Floating(joint) => joint.motion_subspace(),
            JointModels::Prismatic(joint) => joint.motion_subspace(),
            JointModels::Revolute(joint) => joint.motion_subspace(),
        }
    }

    fn calculate_tau(&self, q: &[f64], v: &[f64], tau: &mut [f64]) {
        match self {
            JointModels::Fixed => {}
            JointModels::Floating(joint) => joint.calculate_tau(q, v, tau),
            JointModels::Prismatic(joint) => joint.calculate_tau(q, v, tau),
            JointModels::Revolute(joint) => joint.calculate_tau(q, v, tau),
        }
    }
}

/// A joint of a finalized tree. Joint `i` is always the inner joint of body `i`.
#[derive(Debug, Clone)]
pub struct Joint {
    pub(crate) name: String,
    pub(crate) model: JointModels,
    pub(crate) inner_body: Option<BodyIndex>,
    pub(crate) outer_body: BodyIndex,
    pub(crate) transforms: JointTransforms,
    // motion subspace columns expressed in the outer body frame
    pub(crate) motion_subspace: Vec<MotionVector>,
    pub(crate) position_range: Range<usize>,
    pub(crate) velocity_range: Range<usize>,
}

impl Joint {
    pub(crate) fn new(
        name: &str,
        model: JointModels,
        inner_body: Option<BodyIndex>,
        outer_body: BodyIndex,
        transforms: JointTransforms,
        position_start: usize,
        velocity_start: usize,
    ) -> Self {
        let motion_subspace = model
            .motion_subspace()
            .into_iter()
            .map(|s| transforms.ob_from_jof * s)
            .collect();
        let position_range = position_start..position_start + model.nq();
        let velocity_range = velocity_start..velocity_start + model.nv();
        Self {
            name: name.to_string(),
            model,
            inner_body,
            outer_body,
            transforms,
            motion_subspace,
            position_range,
            velocity_range,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> &JointModels {
        &self.model
    }

    /// None when the joint hangs off the base.
    pub fn inner_body(&self) -> Option<BodyIndex> {
        self.inner_body
    }

    pub fn outer_body(&self) -> BodyIndex {
        self.outer_body
    }

    pub fn transforms(&self) -> &JointTransforms {
        &self.transforms
    }

    pub fn motion_subspace(&self) -> &[MotionVector] {
        &self.motion_subspace
    }

    pub fn position_range(&self) -> Range<usize> {
        self.position_range.clone()
    }

    pub fn velocity_range(&self) -> Range<usize> {
        self.velocity_range.clone()
    }

    /// Spatial motion of the outer body relative to the inner body for joint rates `qd`,
    /// expressed in the outer body frame.
    pub(crate) fn motion(&self, qd: &[f64]) -> MotionVector {
        self.motion_subspace
            .iter()
            .zip(qd)
            .fold(MotionVector::zeros(), |acc, (s, qd)| acc + *s * *qd)
    }
}
