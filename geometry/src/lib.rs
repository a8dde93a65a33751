pub mod cuboid;
pub mod ellipsoid;
pub mod proximity_properties;

use cuboid::Cuboid;
use ellipsoid::Ellipsoid;
use proximity_properties::ProximityProperties;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use transforms::Transform;

#[derive(Debug, Error, PartialEq)]
pub enum GeometryErrors {
    #[error("name cannot be empty for geometry")]
    EmptyName,
    #[error("{0} must be positive and finite, got {1}")]
    InvalidDimension(&'static str, f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Cuboid(Cuboid),
    Ellipsoid(Ellipsoid),
}

impl From<Cuboid> for Shape {
    fn from(value: Cuboid) -> Self {
        Shape::Cuboid(value)
    }
}

impl From<Ellipsoid> for Shape {
    fn from(value: Ellipsoid) -> Self {
        Shape::Ellipsoid(value)
    }
}

/// A collision geometry rigidly attached to a body.
///
/// The proximity properties are authored here and handed, read only, to whatever
/// contact engine consumes the model. Nothing in the dynamics interprets them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub name: String,
    pub shape: Shape,
    /// pose of the geometry frame in the body frame
    pub transform: Transform,
    pub proximity: ProximityProperties,
}

impl Geometry {
    pub fn new(name: &str, shape: impl Into<Shape>) -> Result<Self, GeometryErrors> {
        if name.is_empty() {
            return Err(GeometryErrors::EmptyName);
        }
        Ok(Self {
            name: name.to_string(),
            shape: shape.into(),
            transform: Transform::identity(),
            proximity: ProximityProperties::default(),
        })
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_proximity_properties(mut self, proximity: ProximityProperties) -> Self {
        self.proximity = proximity;
        self
    }

    pub fn proximity_properties(&self) -> &ProximityProperties {
        &self.proximity
    }

    pub fn proximity_properties_mut(&mut self) -> &mut ProximityProperties {
        &mut self.proximity
    }
}
