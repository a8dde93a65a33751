use crate::joint::{JointErrors, JointModel, JointParameters, unit_axis};
use nalgebra::{Unit, Vector3};
use serde::{Deserialize, Serialize};
use spatial_algebra::MotionVector;
use transforms::Transform;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevoluteBuilder {
    pub angle: f64,
    /// rotation axis in the joint inner frame, normalized on build
    pub axis: Vector3<f64>,
    pub parameters: JointParameters,
}

impl Default for RevoluteBuilder {
    fn default() -> Self {
        Self {
            angle: 0.0,
            axis: Vector3::z(),
            parameters: JointParameters::default(),
        }
    }
}

impl RevoluteBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_angle(mut self, angle: f64) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_axis(mut self, axis: Vector3<f64>) -> Self {
        self.axis = axis;
        self
    }

    pub fn with_parameters(mut self, parameters: JointParameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn build(&self) -> Result<Revolute, JointErrors> {
        if !self.angle.is_finite() {
            return Err(JointErrors::NonFinitePosition);
        }
        self.parameters.validate()?;
        Ok(Revolute {
            angle: self.angle,
            axis: unit_axis(&self.axis)?,
            parameters: self.parameters,
        })
    }
}

/// One rotational degree of freedom about a fixed axis. q = [angle], v = [angular rate].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revolute {
    pub angle: f64,
    pub axis: Unit<Vector3<f64>>,
    pub parameters: JointParameters,
}

impl JointModel for Revolute {
    fn nq(&self) -> usize {
        1
    }

    fn nv(&self) -> usize {
        1
    }

    fn default_positions(&self, q: &mut [f64]) {
        q[0] = self.angle;
    }

    fn transform(&self, q: &[f64]) -> Result<Transform, JointErrors> {
        if !q[0].is_finite() {
            return Err(JointErrors::NonFinitePosition);
        }
        Ok(Transform::from_axis_angle(&self.axis, q[0]))
    }

    fn motion_subspace(&self) -> Vec<MotionVector> {
        vec![MotionVector::new(self.axis.into_inner(), Vector3::zeros())]
    }

    fn calculate_tau(&self, q: &[f64], v: &[f64], tau: &mut [f64]) {
        tau[0] += self.parameters.calculate_tau(q[0], v[0]);
    }
}
