//! Recursive Newton-Euler inverse dynamics, Featherstone table 5.1.
//!
//! Gravity enters as an applied body force rather than as a fictitious base
//! acceleration, so the base is at rest with zero spatial acceleration and the
//! per-body forces from [`KinematicTree::calc_force_elements_contribution`] carry
//! the weight of each body.

use crate::{
    MultibodyErrors,
    algorithms::kinematics::PositionKinematics,
    forces::MultibodyForces,
    state::{GeneralizedState, check_length},
    system::KinematicTree,
};
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;
use spatial_algebra::{Acceleration, Force, Velocity};
use tracing::trace;

/// Per body results of the outward sweep, in body frame.
#[derive(Clone, Copy, Debug, Default)]
struct RneCache {
    v: Velocity,
    a: Acceleration,
    f: Force,
}

impl KinematicTree {
    /// Generalized forces tau = M(q) vdot + C(q, v) - tau_applied - J^T F_applied.
    ///
    /// `forces` holds every applied force, gravity included. Runs in time linear in
    /// the number of bodies and never forms the mass matrix.
    pub fn calc_inverse_dynamics(
        &self,
        state: &GeneralizedState,
        vdot: &DVector<f64>,
        forces: &MultibodyForces,
    ) -> Result<DVector<f64>, MultibodyErrors> {
        check_length("vdot", self.nv, vdot.len())?;
        forces.check_compatible(self)?;
        let kinematics = self.calc_position_kinematics(state)?;

        let cache = self.rne_first_pass(&kinematics, state, vdot, forces);
        let mut f: Vec<Force> = cache.iter().map(|c| c.f).collect();
        let mut tau = -forces.generalized_forces();
        self.rne_second_pass(&kinematics, &mut f, &mut tau);

        trace!(nbodies = self.bodies.len(), nv = self.nv, "inverse dynamics");
        Ok(tau)
    }

    /// Outward sweep: body velocities, accelerations and the net force each body needs.
    fn rne_first_pass(
        &self,
        kinematics: &PositionKinematics,
        state: &GeneralizedState,
        vdot: &DVector<f64>,
        forces: &MultibodyForces,
    ) -> Vec<RneCache> {
        let qd = state.v.as_slice();
        let qdd = vdot.as_slice();
        let mut cache: Vec<RneCache> = Vec::with_capacity(self.bodies.len());

        for (i, joint) in self.joints.iter().enumerate() {
            let (v_ij, a_ij) = match self.parents[i] {
                Some(parent) => (cache[parent.0].v, cache[parent.0].a),
                None => (Velocity::zeros(), Acceleration::zeros()),
            };
            let range = joint.velocity_range.clone();
            let vj = Velocity::from(joint.motion(&qd[range.clone()]));
            let aj = Acceleration::from(joint.motion(&qdd[range]));
            let ob_from_ib = kinematics.ob_from_ib[i];

            let v = ob_from_ib * v_ij + vj;
            let a = ob_from_ib * a_ij + aj + v.cross_motion(vj);

            let inertia = self.bodies[i].spatial_inertia();
            let f = inertia * a + v.cross_force(inertia * v) - forces.body_forces()[i];
            cache.push(RneCache { v, a, f });
        }
        cache
    }

    /// Inward sweep: projects each body's force onto its joint into `tau` and
    /// transmits it to the parent. `f` is consumed in place.
    pub(crate) fn rne_second_pass(
        &self,
        kinematics: &PositionKinematics,
        f: &mut [Force],
        tau: &mut DVector<f64>,
    ) {
        for i in (0..self.joints.len()).rev() {
            let joint = &self.joints[i];
            let start = joint.velocity_range.start;
            for (k, s) in joint.motion_subspace.iter().enumerate() {
                tau[start + k] += f[i].dot(s);
            }
            if let Some(parent) = self.parents[i] {
                let f_parent = kinematics.ob_from_ib[i].inv() * f[i];
                f[parent.0] += f_parent;
            }
        }
    }

    /// Inverse dynamics over many independent contexts against this one tree.
    ///
    /// Cases run in parallel and results come back in input order. The first
    /// failing case fails the whole batch.
    pub fn calc_inverse_dynamics_batch(
        &self,
        cases: &[(GeneralizedState, DVector<f64>, MultibodyForces)],
    ) -> Result<Vec<DVector<f64>>, MultibodyErrors> {
        cases
            .par_iter()
            .map(|(state, vdot, forces)| self.calc_inverse_dynamics(state, vdot, forces))
            .collect()
    }

    /// Coriolis, centripetal and gyroscopic generalized forces C(q, v).
    pub fn calc_bias_term(
        &self,
        state: &GeneralizedState,
    ) -> Result<DVector<f64>, MultibodyErrors> {
        let forces = MultibodyForces::new(self);
        self.calc_inverse_dynamics(state, &DVector::zeros(self.nv), &forces)
    }

    /// Mass matrix M(q), one inverse dynamics call per column with the velocities zeroed.
    pub fn calc_mass_matrix_via_inverse_dynamics(
        &self,
        state: &GeneralizedState,
    ) -> Result<DMatrix<f64>, MultibodyErrors> {
        self.check_state(state)?;
        let mut at_rest = state.clone();
        at_rest.v.fill(0.0);
        let forces = MultibodyForces::new(self);

        let mut mass_matrix = DMatrix::zeros(self.nv, self.nv);
        let mut vdot = DVector::zeros(self.nv);
        for j in 0..self.nv {
            vdot[j] = 1.0;
            let column = self.calc_inverse_dynamics(&at_rest, &vdot, &forces)?;
            mass_matrix.set_column(j, &column);
            vdot[j] = 0.0;
        }
        Ok(mass_matrix)
    }
}
