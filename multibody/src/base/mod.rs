use crate::{
    body::BodyConnectionBuilder,
    joint::{JointBuilder, JointErrors},
    system::Id,
};
use gravity::Gravity;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use transforms::Transform;

#[derive(Debug, Error, PartialEq)]
pub enum BaseErrors {
    #[error("{0}")]
    Joint(#[from] JointErrors),
    #[error("joint '{0}' already connected to {1} as an outer joint")]
    OuterJointExists(String, String),
}

/// The root of the tree. The base frame is inertial and carries the gravity field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BaseBuilder {
    pub gravity: Gravity,
    pub id: Id,
    pub name: String,
    pub outer_joints: Vec<Id>,
}

impl BaseBuilder {
    pub fn new(id: Id) -> Self {
        Self {
            gravity: Gravity::default(),
            id,
            name: "base".to_string(),
            outer_joints: Vec::new(),
        }
    }

    /// `transform` is the pose of the joint inner frame in the base frame.
    pub fn connect_outer_joint(
        &mut self,
        outer_joint: &mut JointBuilder,
        transform: Transform,
    ) -> Result<(), BaseErrors> {
        if self.outer_joints.contains(&outer_joint.id) {
            return Err(BaseErrors::OuterJointExists(
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

    pub fn set_gravity(&mut self, gravity: Gravity) {
        self.gravity = gravity;
    }
}
