use crate::{
    MultibodyErrors,
    base::BaseBuilder,
    body::{Body, BodyBuilder},
    joint::{Joint, JointBuilder, JointModelBuilders, joint_transforms::JointTransforms},
};

use core::fmt;
use gravity::{Gravity, constant::ConstantGravity, newtonian::NewtonianGravity};
use serde::{Deserialize, Serialize};
use std::{
    collections::{HashMap, HashSet},
    fmt::{Display, Formatter},
    ops::Range,
};
use tracing::{debug, warn};

/// Authoring form of a kinematic tree.
///
/// Every field is plain data so a model loader can deserialize it directly.
/// Nothing is checked until [`KinematicTreeBuilder::finalize`], which seals the
/// topology into an immutable [`KinematicTree`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KinematicTreeBuilder {
    pub base: BaseBuilder,
    pub bodies: Vec<BodyBuilder>,
    pub identifier: Identifier,
    pub joints: Vec<JointBuilder>,
}

impl Default for KinematicTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl KinematicTreeBuilder {
    pub fn new() -> Self {
        let mut identifier = Identifier::new();
        Self {
            base: BaseBuilder::new(identifier.next()),
            bodies: Vec::new(),
            identifier,
            joints: Vec::new(),
        }
    }

    pub fn add_body(&mut self, body: BodyBuilder) {
        self.bodies.push(body);
    }

    pub fn add_joint(&mut self, joint: JointBuilder) {
        self.joints.push(joint);
    }

    pub fn new_body(&mut self, name: &str) -> Result<BodyBuilder, MultibodyErrors> {
        let id = self.identifier.next();
        Ok(BodyBuilder::new(name, id)?)
    }

    pub fn new_joint(
        &mut self,
        name: &str,
        model: impl Into<JointModelBuilders>,
    ) -> Result<JointBuilder, MultibodyErrors> {
        let id = self.identifier.next();
        Ok(JointBuilder::new(id, name, model)?)
    }

    pub fn set_gravity_constant(
        &mut self,
        gx: f64,
        gy: f64,
        gz: f64,
    ) -> Result<(), MultibodyErrors> {
        self.base
            .set_gravity(Gravity::Constant(ConstantGravity::new(gx, gy, gz)?));
        Ok(())
    }

    pub fn set_gravity_newtonian(&mut self, mu: f64) -> Result<(), MultibodyErrors> {
        self.base
            .set_gravity(Gravity::Newtonian(NewtonianGravity::new(mu)?));
        Ok(())
    }

    /// Checks that every id resolves and that both sides of every connection agree.
    pub fn validate(&self) -> Result<(), MultibodyErrors> {
        self.lookup().map(|_| ())
    }

    /// Seals the topology into an immutable tree.
    ///
    /// Bodies are ordered by a depth first traversal from the base, so every parent
    /// precedes its children. Siblings are visited in the order their inner joints
    /// appear in `joints`, the input order, regardless of the order they were
    /// connected. Generalized coordinates are handed out to joints in that same order.
    pub fn finalize(&self) -> Result<KinematicTree, MultibodyErrors> {
        let result = self.build_tree();
        match &result {
            Ok(tree) => debug!(
                nbodies = tree.nbodies(),
                njoints = tree.njoints(),
                nq = tree.nq(),
                nv = tree.nv(),
                "finalized kinematic tree"
            ),
            Err(e) => warn!(error = %e, "rejected kinematic tree"),
        }
        result
    }

    fn lookup(
        &self,
    ) -> Result<(HashMap<Id, &BodyBuilder>, HashMap<Id, &JointBuilder>), MultibodyErrors> {
        let violation = |msg: String| MultibodyErrors::PreconditionViolation(msg);

        // check that the base has an outer joint
        if self.base.outer_joints.is_empty() {
            return Err(violation("base does not have any outer joints".into()));
        }

        let mut bodies = HashMap::new();
        let mut body_names = HashSet::new();
        for body in &self.bodies {
            if body.id == self.base.id || bodies.insert(body.id, body).is_some() {
                return Err(violation(format!("id {} is used more than once", body.id)));
            }
            if !body_names.insert(body.name.as_str()) {
                return Err(violation(format!("the body name '{}' is already taken", body.name)));
            }
        }

        let mut joints = HashMap::new();
        let mut joint_names = HashSet::new();
        for joint in &self.joints {
            if joint.id == self.base.id
                || bodies.contains_key(&joint.id)
                || joints.insert(joint.id, joint).is_some()
            {
                return Err(violation(format!("id {} is used more than once", joint.id)));
            }
            if !joint_names.insert(joint.name.as_str()) {
                return Err(violation(format!("the joint name '{}' is already taken", joint.name)));
            }
        }

        // check that all base outer joints exist and point back at the base
        for outer_joint_id in &self.base.outer_joints {
            let joint = joints
                .get(outer_joint_id)
                .ok_or_else(|| violation(format!("could not find joint '{outer_joint_id}'")))?;
            let inner = joint.connections.inner_body.as_ref();
            if inner.map(|c| c.body_id) != Some(self.base.id) {
                return Err(violation(format!(
                    "joint '{}' is listed on the base but is not connected to it",
                    joint.name
                )));
            }
        }

        // check that every body has an inner joint, otherwise it would be a second root
        for body in &self.bodies {
            let inner_joint_id = body.inner_joint.ok_or_else(|| {
                violation(format!(
                    "body '{}' does not have an inner joint, the tree would have multiple roots",
                    body.name
                ))
            })?;
            let inner_joint = joints
                .get(&inner_joint_id)
                .ok_or_else(|| violation(format!("could not find joint '{inner_joint_id}'")))?;
            let outer = inner_joint.connections.outer_body.as_ref();
            if outer.map(|c| c.body_id) != Some(body.id) {
                return Err(violation(format!(
                    "body '{}' names joint '{}' as its inner joint but is not its outer body",
                    body.name, inner_joint.name
                )));
            }

            for outer_joint_id in &body.outer_joints {
                let outer_joint = joints
                    .get(outer_joint_id)
                    .ok_or_else(|| violation(format!("could not find joint '{outer_joint_id}'")))?;
                let inner = outer_joint.connections.inner_body.as_ref();
                if inner.map(|c| c.body_id) != Some(body.id) {
                    return Err(violation(format!(
                        "body '{}' lists joint '{}' as an outer joint but is not its inner body",
                        body.name, outer_joint.name
                    )));
                }
            }
        }

        // check that every joint has an inner and outer body connection
        for joint in &self.joints {
            let inner = joint.connections.inner_body.as_ref().ok_or_else(|| {
                violation(format!("joint '{}' must have an inner body", joint.name))
            })?;
            let listed = if inner.body_id == self.base.id {
                self.base.outer_joints.contains(&joint.id)
            } else {
                let inner_body = bodies
                    .get(&inner.body_id)
                    .ok_or_else(|| violation(format!("could not find body '{}'", inner.body_id)))?;
                inner_body.outer_joints.contains(&joint.id)
            };
            if !listed {
                return Err(violation(format!(
                    "joint '{}' is not listed as an outer joint of its inner body",
                    joint.name
                )));
            }

            let outer = joint.connections.outer_body.as_ref().ok_or_else(|| {
                violation(format!("joint '{}' must have an outer body", joint.name))
            })?;
            let outer_body = bodies
                .get(&outer.body_id)
                .ok_or_else(|| violation(format!("could not find body '{}'", outer.body_id)))?;
            if outer_body.inner_joint != Some(joint.id) {
                return Err(violation(format!(
                    "joint '{}' is not the inner joint of its outer body",
                    joint.name
                )));
            }
        }

        Ok((bodies, joints))
    }

    fn build_tree(&self) -> Result<KinematicTree, MultibodyErrors> {
        let (body_builders, joint_builders) = self.lookup()?;
        // the base may have been deserialized, so its gravity model is unchecked
        self.base.gravity.validate()?;

        let mut bodies: Vec<Body> = Vec::with_capacity(self.bodies.len());
        let mut joints: Vec<Joint> = Vec::with_capacity(self.bodies.len());
        let mut parents: Vec<Option<BodyIndex>> = Vec::with_capacity(self.bodies.len());
        let mut children: Vec<Vec<BodyIndex>> = Vec::with_capacity(self.bodies.len());
        let mut base_children = Vec::new();
        let mut visited = HashSet::new();
        let mut nq = 0;
        let mut nv = 0;

        let input_order: HashMap<Id, usize> = self
            .joints
            .iter()
            .enumerate()
            .map(|(position, joint)| (joint.id, position))
            .collect();
        let siblings = |outer_joints: &[Id]| {
            let mut sorted = outer_joints.to_vec();
            // lookup has already rejected unknown ids
            sorted.sort_by_key(|id| input_order.get(id).copied().unwrap_or(usize::MAX));
            sorted
        };

        // explicit stack instead of recursion, reversed so siblings pop in input order
        let mut stack: Vec<(Id, Option<BodyIndex>)> = siblings(&self.base.outer_joints)
            .into_iter()
            .rev()
            .map(|id| (id, None))
            .collect();

        while let Some((joint_id, parent)) = stack.pop() {
            let joint_builder = joint_builders[&joint_id];
            let (inner, outer) = match (
                &joint_builder.connections.inner_body,
                &joint_builder.connections.outer_body,
            ) {
                (Some(inner), Some(outer)) => (inner, outer),
                _ => {
                    return Err(MultibodyErrors::PreconditionViolation(format!(
                        "joint '{}' must have an inner and an outer body",
                        joint_builder.name
                    )));
                }
            };
            let body_builder = body_builders[&outer.body_id];
            if !visited.insert(body_builder.id) {
                return Err(MultibodyErrors::PreconditionViolation(format!(
                    "body '{}' is reached more than once, the topology contains a cycle",
                    body_builder.name
                )));
            }

            let index = BodyIndex(bodies.len());
            let model = joint_builder.model.build()?;
            let transforms = JointTransforms::new(inner.transform, outer.transform);
            let joint = Joint::new(&joint_builder.name, model, parent, index, transforms, nq, nv);
            nq = joint.position_range.end;
            nv = joint.velocity_range.end;

            bodies.push(body_builder.build(JointIndex(index.0))?);
            joints.push(joint);
            parents.push(parent);
            children.push(Vec::new());
            match parent {
                Some(parent) => children[parent.0].push(index),
                None => base_children.push(index),
            }

            for outer_joint_id in siblings(&body_builder.outer_joints).into_iter().rev() {
                stack.push((outer_joint_id, Some(index)));
            }
        }

        if let Some(orphan) = self.bodies.iter().find(|b| !visited.contains(&b.id)) {
            return Err(MultibodyErrors::PreconditionViolation(format!(
                "body '{}' is not reachable from the base, check for cycles or detached subtrees",
                orphan.name
            )));
        }

        Ok(KinematicTree {
            base_children,
            bodies,
            children,
            gravity: self.base.gravity,
            joints,
            nq,
            nv,
            parents,
        })
    }
}

/// A finalized kinematic tree: bodies and joints in topological order.
///
/// Body `i` is attached to its parent by joint `i`. The tree holds no evaluation
/// state, every computation takes a [`GeneralizedState`](crate::state::GeneralizedState),
/// so one tree can be shared across threads.
#[derive(Debug, Clone)]
pub struct KinematicTree {
    pub(crate) base_children: Vec<BodyIndex>,
    pub(crate) bodies: Vec<Body>,
    pub(crate) children: Vec<Vec<BodyIndex>>,
    pub(crate) gravity: Gravity,
    pub(crate) joints: Vec<Joint>,
    pub(crate) nq: usize,
    pub(crate) nv: usize,
    pub(crate) parents: Vec<Option<BodyIndex>>,
}

impl KinematicTree {
    /// Total number of generalized positions.
    pub fn nq(&self) -> usize {
        self.nq
    }

    /// Total number of generalized velocities, the sum of all joint dofs.
    pub fn nv(&self) -> usize {
        self.nv
    }

    pub fn nbodies(&self) -> usize {
        self.bodies.len()
    }

    pub fn njoints(&self) -> usize {
        self.joints.len()
    }

    pub fn gravity(&self) -> &Gravity {
        &self.gravity
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn body(&self, body: BodyIndex) -> Result<&Body, MultibodyErrors> {
        self.bodies
            .get(body.0)
            .ok_or_else(|| MultibodyErrors::BodyNotFound(body.to_string()))
    }

    pub fn joint(&self, joint: JointIndex) -> Result<&Joint, MultibodyErrors> {
        self.joints
            .get(joint.0)
            .ok_or_else(|| MultibodyErrors::JointNotFound(joint.to_string()))
    }

    pub fn body_by_name(&self, name: &str) -> Option<BodyIndex> {
        self.bodies
            .iter()
            .position(|b| b.name() == name)
            .map(BodyIndex)
    }

    pub fn joint_by_name(&self, name: &str) -> Option<JointIndex> {
        self.joints
            .iter()
            .position(|j| j.name() == name)
            .map(JointIndex)
    }

    /// Parent of `body`, None when the body hangs directly off the base.
    pub fn parent(&self, body: BodyIndex) -> Result<Option<BodyIndex>, MultibodyErrors> {
        self.parents
            .get(body.0)
            .copied()
            .ok_or_else(|| MultibodyErrors::BodyNotFound(body.to_string()))
    }

    pub fn children(&self, body: BodyIndex) -> Result<&[BodyIndex], MultibodyErrors> {
        self.children
            .get(body.0)
            .map(|c| c.as_slice())
            .ok_or_else(|| MultibodyErrors::BodyNotFound(body.to_string()))
    }

    /// Bodies whose inner joint connects to the base.
    pub fn base_children(&self) -> &[BodyIndex] {
        &self.base_children
    }

    /// Bodies parent first. Reverse it for a leaves to root sweep.
    pub fn topological_order(&self) -> impl DoubleEndedIterator<Item = BodyIndex> + '_ {
        (0..self.bodies.len()).map(BodyIndex)
    }

    pub fn joint_position_range(&self, joint: JointIndex) -> Result<Range<usize>, MultibodyErrors> {
        Ok(self.joint(joint)?.position_range())
    }

    pub fn joint_velocity_range(&self, joint: JointIndex) -> Result<Range<usize>, MultibodyErrors> {
        Ok(self.joint(joint)?.velocity_range())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Identifier {
    current_id: usize,
}

impl Identifier {
    fn new() -> Self {
        Self { current_id: 0 }
    }

    fn next(&mut self) -> Id {
        let id = Id(self.current_id);
        self.current_id += 1;
        id
    }
}

/// Builder side handle of a body or joint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Id(usize);

impl Id {
    pub fn new(id: usize) -> Self {
        Self(id)
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position of a body in a finalized tree's topological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyIndex(pub usize);

impl Display for BodyIndex {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position of a joint in a finalized tree, equal to the index of its outer body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JointIndex(pub usize);

impl Display for JointIndex {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
