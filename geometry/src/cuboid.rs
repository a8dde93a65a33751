use serde::{Deserialize, Serialize};

use crate::GeometryErrors;

/// Box with full side lengths along the geometry frame axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cuboid {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Cuboid {
    pub fn new(x: f64, y: f64, z: f64) -> Result<Self, GeometryErrors> {
        for (axis, length) in [("x", x), ("y", y), ("z", z)] {
            if !length.is_finite() || length <= 0.0 {
                return Err(GeometryErrors::InvalidDimension(axis, length));
            }
        }
        Ok(Self { x, y, z })
    }
}
