use serde::{Deserialize, Serialize};

use crate::GeometryErrors;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ellipsoid {
    pub radius_x: f64, // Radius along the x-axis
    pub radius_y: f64, // Radius along the y-axis
    pub radius_z: f64, // Radius along the z-axis
}

impl Ellipsoid {
    pub fn new(radius_x: f64, radius_y: f64, radius_z: f64) -> Result<Self, GeometryErrors> {
        for (axis, radius) in [
            ("radius_x", radius_x),
            ("radius_y", radius_y),
            ("radius_z", radius_z),
        ] {
            if !radius.is_finite() || radius <= 0.0 {
                return Err(GeometryErrors::InvalidDimension(axis, radius));
            }
        }
        Ok(Self {
            radius_x,
            radius_y,
            radius_z,
        })
    }

    pub fn sphere(radius: f64) -> Result<Self, GeometryErrors> {
        Self::new(radius, radius, radius)
    }
}
