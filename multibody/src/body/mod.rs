use crate::{
    joint::{JointBuilder, JointErrors},
    system::{Id, JointIndex},
};
use geometry::{Geometry, proximity_properties::ProximityErrors};
use mass_properties::{MassProperties, MassPropertiesErrors};
use serde::{Deserialize, Serialize};
use spatial_algebra::SpatialInertia;
use thiserror::Error;
use transforms::Transform;

#[derive(Debug, Error, PartialEq)]
pub enum BodyErrors {
    #[error("geometry '{1}' is already attached to body '{0}'")]
    DuplicateGeometry(String, String),
    #[error("name cannot be empty for body")]
    EmptyName,
    #[error("attempted to connect inner joint to body '{0}', but it already has an inner joint")]
    InnerJointExists(String),
    #[error("{0}")]
    Joint(#[from] JointErrors),
    #[error("{0}")]
    MassPropertiesError(#[from] MassPropertiesErrors),
    #[error("no mass properties found for body '{0}'")]
    NoMassProperties(String),
    #[error("joint '{0}' already connected to {1} as an outer joint")]
    OuterJointExists(String, String),
    #[error("{0}")]
    Proximity(#[from] ProximityErrors),
}

/// One side of a joint: the body it attaches to and the pose of the joint frame in that body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyConnectionBuilder {
    pub body_id: Id,
    pub transform: Transform,
}

impl BodyConnectionBuilder {
    pub fn new(body_id: Id, transform: Transform) -> Self {
        Self { body_id, transform }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyBuilder {
    pub geometries: Vec<Geometry>,
    pub id: Id,
    pub inner_joint: Option<Id>,
    pub mass_properties: Option<MassProperties>,
    pub name: String,
    pub outer_joints: Vec<Id>, // ids into tree.joints, the joints hold the transforms
}

impl BodyBuilder {
    pub fn new(name: &str, id: Id) -> Result<Self, BodyErrors> {
        if name.is_empty() {
            return Err(BodyErrors::EmptyName);
        }
        Ok(Self {
            geometries: Vec::new(),
            id,
            inner_joint: None,
            mass_properties: None,
            name: name.to_string(),
            outer_joints: Vec::new(),
        })
    }

    /// Attaches `inner_joint` on the base side of this body.
    /// `transform` is the pose of the joint outer frame in this body's frame.
    pub fn connect_inner_joint(
        &mut self,
        inner_joint: &mut JointBuilder,
        transform: Transform,
    ) -> Result<(), BodyErrors> {
        if self.inner_joint.is_some() {
            return Err(BodyErrors::InnerJointExists(self.name.clone()));
        }
        if inner_joint.connections.outer_body.is_some() {
            return Err(JointErrors::OuterBodyExists(inner_joint.name.clone()).into());
        }
        self.inner_joint = Some(inner_joint.id);
        inner_joint.connections.outer_body = Some(BodyConnectionBuilder::new(self.id, transform));
        Ok(())
    }

    /// Attaches `outer_joint` on the tip side of this body.
    /// `transform` is the pose of the joint inner frame in this body's frame.
    pub fn connect_outer_joint(
        &mut self,
        outer_joint: &mut JointBuilder,
        transform: Transform,
    ) -> Result<(), BodyErrors> {
        if self.outer_joints.contains(&outer_joint.id) {
            return Err(BodyErrors::OuterJointExists(
                outer_joint.name.clone(),
                self.name.clone(),
            ));
        }
        if outer_joint.connections.inner_body.is_some() {
            return Err(JointErrors::InnerBodyExists(outer_joint.name.clone()).into());
        }
        self.outer_joints.push(outer_joint.id);
        outer_joint.connections.inner_body = Some(BodyConnectionBuilder::new(self.id, transform));
        Ok(())
    }

    pub fn with_mass_properties(mut self, mass_properties: MassProperties) -> Self {
        self.mass_properties = Some(mass_properties);
        self
    }

    pub fn set_mass_properties(&mut self, mass_properties: MassProperties) {
        self.mass_properties = Some(mass_properties);
    }

    pub fn add_geometry(&mut self, geometry: Geometry) -> Result<(), BodyErrors> {
        if self.geometries.iter().any(|g| g.name == geometry.name) {
            return Err(BodyErrors::DuplicateGeometry(
                self.name.clone(),
                geometry.name,
            ));
        }
        self.geometries.push(geometry);
        Ok(())
    }

    pub(crate) fn build(&self, inner_joint: JointIndex) -> Result<Body, BodyErrors> {
        let mass_properties = self
            .mass_properties
            .ok_or_else(|| BodyErrors::NoMassProperties(self.name.clone()))?;
        // builders may have been deserialized, so nothing upstream has validated them
        mass_properties.validate()?;
        for geometry in &self.geometries {
            geometry.proximity.validate()?;
        }
        Ok(Body {
            geometries: self.geometries.clone(),
            inertia: SpatialInertia::from(&mass_properties),
            inner_joint,
            mass_properties,
            name: self.name.clone(),
        })
    }
}

/// A body of a finalized tree. Read only, including the geometry attached to it.
#[derive(Debug, Clone)]
pub struct Body {
    geometries: Vec<Geometry>,
    inertia: SpatialInertia,
    inner_joint: JointIndex,
    mass_properties: MassProperties,
    name: String,
}

impl Body {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mass_properties(&self) -> &MassProperties {
        &self.mass_properties
    }

    /// Spatial inertia about the body frame origin, in body frame coordinates.
    pub fn spatial_inertia(&self) -> SpatialInertia {
        self.inertia
    }

    pub fn inner_joint(&self) -> JointIndex {
        self.inner_joint
    }

    pub fn geometries(&self) -> &[Geometry] {
        &self.geometries
    }

    pub fn geometry(&self, name: &str) -> Option<&Geometry> {
        self.geometries.iter().find(|g| g.name == name)
    }
}
