use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::{GravityErrors, GravityModel, STANDARD_GRAVITY};

/// A uniform field, the same acceleration everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstantGravity {
    pub g: Vector3<f64>,
}

impl Default for ConstantGravity {
    fn default() -> Self {
        Self {
            g: Vector3::new(0.0, 0.0, -STANDARD_GRAVITY),
        }
    }
}

impl ConstantGravity {
    pub fn new(gx: f64, gy: f64, gz: f64) -> Result<Self, GravityErrors> {
        let g = Vector3::new(gx, gy, gz);
        if !g.iter().all(|e| e.is_finite()) {
            return Err(GravityErrors::NotFinite);
        }
        Ok(Self { g })
    }
}

impl GravityModel for ConstantGravity {
    fn calculate(&self, _position: &Vector3<f64>) -> Result<Vector3<f64>, GravityErrors> {
        Ok(self.g)
    }
}
