use constant::ConstantGravity;
use nalgebra::Vector3;
use newtonian::NewtonianGravity;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod constant;
pub mod newtonian;

/// Standard gravitational acceleration (m/s^2)
pub const STANDARD_GRAVITY: f64 = 9.81;

#[derive(Debug, Error, PartialEq)]
pub enum GravityErrors {
    #[error("gravity vector must be finite")]
    NotFinite,
    #[error("gravitational parameter must be positive and finite, got {0}")]
    InvalidMu(f64),
    #[error("position is too close to the attracting center for a point mass field")]
    SingularPosition,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Gravity {
    Constant(ConstantGravity),
    Newtonian(NewtonianGravity),
}

impl Default for Gravity {
    fn default() -> Self {
        Gravity::Constant(ConstantGravity::default())
    }
}

impl Gravity {
    /// Re-checks a model that arrived through deserialization rather than a constructor.
    pub fn validate(&self) -> Result<(), GravityErrors> {
        match self {
            Gravity::Constant(g) => ConstantGravity::new(g.g[0], g.g[1], g.g[2]).map(|_| ()),
            Gravity::Newtonian(g) => NewtonianGravity::new(g.mu).map(|_| ()),
        }
    }
}

impl GravityModel for Gravity {
    fn calculate(&self, r: &Vector3<f64>) -> Result<Vector3<f64>, GravityErrors> {
        match self {
            Gravity::Constant(g) => g.calculate(r),
            Gravity::Newtonian(g) => g.calculate(r),
        }
    }
}

pub trait GravityModel {
    // input r is the position where the field is evaluated, in the world frame
    // returns gravitational acceleration in the world frame
    fn calculate(&self, r: &Vector3<f64>) -> Result<Vector3<f64>, GravityErrors>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_catches_loaded_models() {
        assert!(Gravity::default().validate().is_ok());

        let constant = Gravity::Constant(ConstantGravity {
            g: Vector3::new(0.0, f64::NAN, -9.81),
        });
        assert_eq!(constant.validate(), Err(GravityErrors::NotFinite));

        let newtonian = Gravity::Newtonian(NewtonianGravity { mu: -1.0 });
        assert_eq!(newtonian.validate(), Err(GravityErrors::InvalidMu(-1.0)));
    }
}
