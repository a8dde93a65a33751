use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::{GravityErrors, GravityModel};

// below this radius the inverse square law is treated as singular
const MIN_RADIUS: f64 = 1e-6;

/// Point mass gravity centered at the world origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NewtonianGravity {
    pub mu: f64,
}

impl NewtonianGravity {
    pub fn new(mu: f64) -> Result<Self, GravityErrors> {
        if !mu.is_finite() || mu <= 0.0 {
            return Err(GravityErrors::InvalidMu(mu));
        }
        Ok(Self { mu })
    }
}

impl GravityModel for NewtonianGravity {
    fn calculate(&self, position: &Vector3<f64>) -> Result<Vector3<f64>, GravityErrors> {
        let position_mag = position.magnitude();
        if position_mag < MIN_RADIUS {
            return Err(GravityErrors::SingularPosition);
        }
        Ok(-position * self.mu / position_mag.powi(3))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_newtonian_inverse_square() {
        let g = NewtonianGravity::new(3.986004418e14).unwrap();
        let a1 = g.calculate(&Vector3::new(7.0e6, 0.0, 0.0)).unwrap();
        let a2 = g.calculate(&Vector3::new(14.0e6, 0.0, 0.0)).unwrap();
        assert!(a1[0] < 0.0);
        assert_relative_eq!(a1[0] / a2[0], 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_newtonian_singular_at_origin() {
        let g = NewtonianGravity::new(1.0).unwrap();
        assert_eq!(
            g.calculate(&Vector3::zeros()).unwrap_err(),
            GravityErrors::SingularPosition
        );
    }
}
