//! Tree structured rigid multibody systems and their inverse dynamics.
//!
//! A [`KinematicTreeBuilder`] is authored (in code or deserialized from RON), then
//! finalized into an immutable [`KinematicTree`]. Evaluation happens against a
//! [`GeneralizedState`] owned by the caller, so one tree can serve many contexts
//! on many threads.

pub mod algorithms;
pub mod base;
pub mod body;
pub mod forces;
pub mod joint;
pub mod state;
pub mod system;

pub use algorithms::kinematics::PositionKinematics;
pub use forces::MultibodyForces;
pub use state::GeneralizedState;
pub use system::{BodyIndex, Id, JointIndex, KinematicTree, KinematicTreeBuilder};

use base::BaseErrors;
use body::BodyErrors;
use gravity::GravityErrors;
use joint::JointErrors;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MultibodyErrors {
    #[error("{0}")]
    BaseErrors(#[from] BaseErrors),
    #[error("{0}")]
    Body(#[from] BodyErrors),
    #[error("could not find body '{0}' in the tree")]
    BodyNotFound(String),
    #[error("{quantity} has length {actual}, expected {expected}")]
    DimensionMismatch {
        quantity: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("{0}")]
    Gravity(#[from] GravityErrors),
    #[error("{0}")]
    JointErrors(#[from] JointErrors),
    #[error("could not find joint '{0}' in the tree")]
    JointNotFound(String),
    #[error("precondition violated: {0}")]
    PreconditionViolation(String),
}
