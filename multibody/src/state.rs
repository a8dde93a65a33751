use crate::{
    MultibodyErrors,
    joint::JointModel,
    system::{JointIndex, KinematicTree},
};
use nalgebra::DVector;

/// Generalized positions and velocities of one evaluation context.
///
/// A state is created from a tree and only ever read by it, the tree itself stays
/// immutable. Each context belongs to one thread at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneralizedState {
    pub(crate) q: DVector<f64>,
    pub(crate) v: DVector<f64>,
}

impl GeneralizedState {
    pub fn positions(&self) -> &DVector<f64> {
        &self.q
    }

    pub fn velocities(&self) -> &DVector<f64> {
        &self.v
    }

    pub fn nq(&self) -> usize {
        self.q.len()
    }

    pub fn nv(&self) -> usize {
        self.v.len()
    }
}

pub(crate) fn check_length(
    quantity: &'static str,
    expected: usize,
    actual: usize,
) -> Result<(), MultibodyErrors> {
    if expected != actual {
        return Err(MultibodyErrors::DimensionMismatch {
            quantity,
            expected,
            actual,
        });
    }
    Ok(())
}

impl KinematicTree {
    /// Each joint at its builder's initial configuration, at rest.
    pub fn create_default_state(&self) -> GeneralizedState {
        let mut q = DVector::zeros(self.nq);
        for joint in &self.joints {
            joint
                .model
                .default_positions(&mut q.as_mut_slice()[joint.position_range.clone()]);
        }
        GeneralizedState {
            q,
            v: DVector::zeros(self.nv),
        }
    }

    /// Fails when the state was not created for a tree of this shape.
    pub(crate) fn check_state(&self, state: &GeneralizedState) -> Result<(), MultibodyErrors> {
        check_length("positions", self.nq, state.q.len())?;
        check_length("velocities", self.nv, state.v.len())
    }

    pub fn set_positions(
        &self,
        state: &mut GeneralizedState,
        q: &DVector<f64>,
    ) -> Result<(), MultibodyErrors> {
        self.check_state(state)?;
        check_length("positions", self.nq, q.len())?;
        state.q.copy_from(q);
        Ok(())
    }

    pub fn set_velocities(
        &self,
        state: &mut GeneralizedState,
        v: &DVector<f64>,
    ) -> Result<(), MultibodyErrors> {
        self.check_state(state)?;
        check_length("velocities", self.nv, v.len())?;
        state.v.copy_from(v);
        Ok(())
    }

    pub fn joint_positions<'a>(
        &self,
        state: &'a GeneralizedState,
        joint: JointIndex,
    ) -> Result<&'a [f64], MultibodyErrors> {
        self.check_state(state)?;
        let range = self.joint_position_range(joint)?;
        Ok(&state.q.as_slice()[range])
    }

    pub fn set_joint_positions(
        &self,
        state: &mut GeneralizedState,
        joint: JointIndex,
        q: &[f64],
    ) -> Result<(), MultibodyErrors> {
        self.check_state(state)?;
        let range = self.joint_position_range(joint)?;
        check_length("joint positions", range.len(), q.len())?;
        state.q.as_mut_slice()[range].copy_from_slice(q);
        Ok(())
    }

    pub fn joint_velocities<'a>(
        &self,
        state: &'a GeneralizedState,
        joint: JointIndex,
    ) -> Result<&'a [f64], MultibodyErrors> {
        self.check_state(state)?;
        let range = self.joint_velocity_range(joint)?;
        Ok(&state.v.as_slice()[range])
    }

    pub fn set_joint_velocities(
        &self,
        state: &mut GeneralizedState,
        joint: JointIndex,
        v: &[f64],
    ) -> Result<(), MultibodyErrors> {
        self.check_state(state)?;
        let range = self.joint_velocity_range(joint)?;
        check_length("joint velocities", range.len(), v.len())?;
        state.v.as_mut_slice()[range].copy_from_slice(v);
        Ok(())
    }
}
