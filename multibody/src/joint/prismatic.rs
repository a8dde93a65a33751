use crate::joint::{JointErrors, JointModel, JointParameters, unit_axis};
use nalgebra::{Unit, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use spatial_algebra::MotionVector;
use transforms::Transform;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrismaticBuilder {
    /// translation axis in the joint inner frame, normalized on build
    pub axis: Vector3<f64>,
    pub parameters: JointParameters,
    pub position: f64,
}

impl Default for PrismaticBuilder {
    fn default() -> Self {
        Self {
            axis: Vector3::x(),
            parameters: JointParameters::default(),
            position: 0.0,
        }
    }
}

impl PrismaticBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_axis(mut self, axis: Vector3<f64>) -> Self {
        self.axis = axis;
        self
    }

    pub fn with_parameters(mut self, parameters: JointParameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_position(mut self, position: f64) -> Self {
        self.position = position;
        self
    }

    pub fn build(&self) -> Result<Prismatic, JointErrors> {
        if !self.position.is_finite() {
            return Err(JointErrors::NonFinitePosition);
        }
        self.parameters.validate()?;
        Ok(Prismatic {
            axis: unit_axis(&self.axis)?,
            parameters: self.parameters,
            position: self.position,
        })
    }
}

/// One translational degree of freedom along a fixed axis. q = [position], v = [velocity].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prismatic {
    pub axis: Unit<Vector3<f64>>,
    pub parameters: JointParameters,
    pub position: f64,
}

impl JointModel for Prismatic {
    fn nq(&self) -> usize {
        1
    }

    fn nv(&self) -> usize {
        1
    }

    fn default_positions(&self, q: &mut [f64]) {
        q[0] = self.position;
    }

    fn transform(&self, q: &[f64]) -> Result<Transform, JointErrors> {
        if !q[0].is_finite() {
            return Err(JointErrors::NonFinitePosition);
        }
        Ok(Transform::new(
            UnitQuaternion::identity(),
            self.axis.into_inner() * q[0],
        ))
    }

    fn motion_subspace(&self) -> Vec<MotionVector> {
        vec![MotionVector::new(Vector3::zeros(), self.axis.into_inner())]
    }

    fn calculate_tau(&self, q: &[f64], v: &[f64], tau: &mut [f64]) {
        tau[0] += self.parameters.calculate_tau(q[0], v[0]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_prismatic_transform_translates_along_axis() {
        let prismatic = PrismaticBuilder::new()
            .with_axis(Vector3::new(0.0, 0.0, -1.0))
            .build()
            .unwrap();
        let jof_from_jif = prismatic.transform(&[0.25]).unwrap();
        assert_abs_diff_eq!(
            jof_from_jif.translation,
            Vector3::new(0.0, 0.0, -0.25),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_prismatic_spring_tau() {
        let prismatic = PrismaticBuilder::new()
            .with_parameters(JointParameters::new(0.0, 2.0, 1.0, 5.0))
            .build()
            .unwrap();
        let mut tau = [0.0];
        prismatic.calculate_tau(&[1.5], &[0.1], &mut tau);
        assert_abs_diff_eq!(tau[0], -5.0 * 0.5 - 2.0 * 0.1, epsilon = 1e-12);
    }
}
