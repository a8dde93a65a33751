//! Spatial (6D) vectors following Featherstone's "Rigid Body Dynamics Algorithms".
//!
//! All spatial vectors are ordered [rotation; translation]. Motion vectors carry
//! [angular velocity; linear velocity], force vectors carry [torque; force].
//! Motion and force vectors transform differently, so they are kept as distinct types.

use mass_properties::MassProperties;
use nalgebra::{Matrix3, Matrix6, Vector3, Vector6};
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use transforms::Transform;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SpatialVector {
    pub rotation: Vector3<f64>,
    pub translation: Vector3<f64>,
}

impl SpatialVector {
    pub fn new(rotation: Vector3<f64>, translation: Vector3<f64>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    pub fn zeros() -> Self {
        Self::new(Vector3::zeros(), Vector3::zeros())
    }

    pub fn vector(&self) -> Vector6<f64> {
        Vector6::new(
            self.rotation[0],
            self.rotation[1],
            self.rotation[2],
            self.translation[0],
            self.translation[1],
            self.translation[2],
        )
    }

    /// Featherstone 2.34
    pub fn cross_force(self, rhs: SpatialVector) -> SpatialVector {
        let new_rotation =
            self.rotation.cross(&rhs.rotation) + self.translation.cross(&rhs.translation);
        let new_translation = self.rotation.cross(&rhs.translation);
        SpatialVector::new(new_rotation, new_translation)
    }

    /// Featherstone 2.33
    pub fn cross_motion(self, rhs: SpatialVector) -> SpatialVector {
        let new_rotation = self.rotation.cross(&rhs.rotation);
        let new_translation =
            self.rotation.cross(&rhs.translation) + self.translation.cross(&rhs.rotation);
        SpatialVector::new(new_rotation, new_translation)
    }

    #[inline]
    pub fn dot(&self, rhs: &SpatialVector) -> f64 {
        self.rotation.dot(&rhs.rotation) + self.translation.dot(&rhs.translation)
    }
}

impl From<Vector6<f64>> for SpatialVector {
    fn from(v: Vector6<f64>) -> SpatialVector {
        let rotation = Vector3::new(v[0], v[1], v[2]);
        let translation = Vector3::new(v[3], v[4], v[5]);
        SpatialVector::new(rotation, translation)
    }
}

impl Add<SpatialVector> for SpatialVector {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.rotation + rhs.rotation,
            self.translation + rhs.translation,
        )
    }
}

impl Sub<SpatialVector> for SpatialVector {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(
            self.rotation - rhs.rotation,
            self.translation - rhs.translation,
        )
    }
}

impl Neg for SpatialVector {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.rotation, -self.translation)
    }
}

impl Mul<f64> for SpatialVector {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.rotation * rhs, self.translation * rhs)
    }
}

// The motion and force wrappers all share the same linear structure.
macro_rules! spatial_wrapper {
    ($name:ident, $inner:ty) => {
        impl $name {
            pub fn new(rotation: Vector3<f64>, translation: Vector3<f64>) -> Self {
                Self(<$inner>::new(rotation, translation))
            }

            pub fn zeros() -> Self {
                Self::new(Vector3::zeros(), Vector3::zeros())
            }

            #[inline]
            pub fn rotation(&self) -> Vector3<f64> {
                self.spatial().rotation
            }

            #[inline]
            pub fn translation(&self) -> Vector3<f64> {
                self.spatial().translation
            }

            pub fn vector(&self) -> Vector6<f64> {
                self.spatial().vector()
            }
        }

        impl From<Vector6<f64>> for $name {
            fn from(v: Vector6<f64>) -> Self {
                Self(<$inner>::from(v))
            }
        }

        impl Add<$name> for $name {
            type Output = $name;
            #[inline]
            fn add(self, rhs: $name) -> $name {
                $name(self.0 + rhs.0)
            }
        }

        impl Sub<$name> for $name {
            type Output = $name;
            #[inline]
            fn sub(self, rhs: $name) -> $name {
                $name(self.0 - rhs.0)
            }
        }

        impl Neg for $name {
            type Output = $name;
            #[inline]
            fn neg(self) -> $name {
                $name(-self.0)
            }
        }

        impl Mul<f64> for $name {
            type Output = $name;
            #[inline]
            fn mul(self, rhs: f64) -> $name {
                $name(self.0 * rhs)
            }
        }

        impl AddAssign<$name> for $name {
            #[inline]
            fn add_assign(&mut self, rhs: $name) {
                *self = *self + rhs;
            }
        }

        impl SubAssign<$name> for $name {
            #[inline]
            fn sub_assign(&mut self, rhs: $name) {
                *self = *self - rhs;
            }
        }
    };
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MotionVector(SpatialVector);
spatial_wrapper!(MotionVector, SpatialVector);

impl MotionVector {
    #[inline]
    fn spatial(&self) -> SpatialVector {
        self.0
    }

    pub fn cross_motion(self, rhs: MotionVector) -> MotionVector {
        MotionVector(self.0.cross_motion(rhs.0))
    }

    pub fn cross_force(self, rhs: ForceVector) -> ForceVector {
        ForceVector(self.0.cross_force(rhs.0))
    }

    /// Power pairing of a motion and a force vector.
    #[inline]
    pub fn dot(&self, rhs: &ForceVector) -> f64 {
        self.0.dot(&rhs.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity(MotionVector);
spatial_wrapper!(Velocity, MotionVector);

impl Velocity {
    #[inline]
    fn spatial(&self) -> SpatialVector {
        self.0.0
    }

    /// v ×m rhs, the velocity product term of an acceleration.
    pub fn cross_motion(self, rhs: Velocity) -> Acceleration {
        Acceleration(self.0.cross_motion(rhs.0))
    }

    /// v ×f h, the gyroscopic term of the Newton-Euler equation.
    pub fn cross_force(self, rhs: Momentum) -> Force {
        Force(self.0.cross_force(rhs.0))
    }
}

impl From<MotionVector> for Velocity {
    fn from(motion: MotionVector) -> Self {
        Self(motion)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Acceleration(MotionVector);
spatial_wrapper!(Acceleration, MotionVector);

impl Acceleration {
    #[inline]
    fn spatial(&self) -> SpatialVector {
        self.0.0
    }
}

impl From<MotionVector> for Acceleration {
    fn from(motion: MotionVector) -> Self {
        Self(motion)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ForceVector(SpatialVector);
spatial_wrapper!(ForceVector, SpatialVector);

impl ForceVector {
    #[inline]
    fn spatial(&self) -> SpatialVector {
        self.0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Momentum(ForceVector);
spatial_wrapper!(Momentum, ForceVector);

impl Momentum {
    #[inline]
    fn spatial(&self) -> SpatialVector {
        self.0.0
    }
}

impl From<ForceVector> for Momentum {
    fn from(force: ForceVector) -> Self {
        Self(force)
    }
}

/// A spatial force: [torque; force], torque taken about the origin of the frame it is expressed in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Force(ForceVector);
spatial_wrapper!(Force, ForceVector);

impl Force {
    #[inline]
    fn spatial(&self) -> SpatialVector {
        self.0.0
    }

    /// A pure force `f` acting at point `r`, both in the same frame.
    pub fn from_point_force(r: &Vector3<f64>, f: &Vector3<f64>) -> Force {
        Force::new(r.cross(f), *f)
    }

    /// Projects the force onto a motion axis, the generalized force along that axis.
    #[inline]
    pub fn dot(&self, motion: &MotionVector) -> f64 {
        motion.dot(&self.0)
    }
}

impl From<ForceVector> for Force {
    fn from(force: ForceVector) -> Self {
        Self(force)
    }
}

// we only need this as wrapper on Transform, other wise we cant impl Mul<Motion> for Transform
// since it's not in this crate :(
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SpatialTransform(pub Transform);

impl SpatialTransform {
    pub fn identity() -> Self {
        Self(Transform::identity())
    }

    #[inline]
    pub fn inv(&self) -> SpatialTransform {
        SpatialTransform::from(self.0.inv())
    }
}

impl From<Transform> for SpatialTransform {
    #[inline]
    fn from(value: Transform) -> Self {
        Self(value)
    }
}

impl Mul<SpatialVector> for SpatialTransform {
    type Output = SpatialVector;
    /// motion transform, Featherstone 2.24
    fn mul(self, motion: SpatialVector) -> SpatialVector {
        let transform = self.0;
        let r = transform.translation;
        let rotation = transform.transform_vector(&motion.rotation);
        let translation =
            transform.transform_vector(&(motion.translation - r.cross(&motion.rotation)));
        SpatialVector::new(rotation, translation)
    }
}

impl Mul<MotionVector> for SpatialTransform {
    type Output = MotionVector;
    #[inline]
    fn mul(self, motion: MotionVector) -> MotionVector {
        MotionVector(self * motion.0)
    }
}

impl Mul<Velocity> for SpatialTransform {
    type Output = Velocity;
    #[inline]
    fn mul(self, velocity: Velocity) -> Velocity {
        Velocity(self * velocity.0)
    }
}

impl Mul<Acceleration> for SpatialTransform {
    type Output = Acceleration;
    #[inline]
    fn mul(self, acceleration: Acceleration) -> Acceleration {
        Acceleration(self * acceleration.0)
    }
}

impl Mul<ForceVector> for SpatialTransform {
    type Output = ForceVector;
    fn mul(self, force: ForceVector) -> ForceVector {
        let transform = self.0;
        let r = transform.translation;
        let f = force.0;
        let rotation = transform.transform_vector(&(f.rotation - r.cross(&f.translation)));
        let translation = transform.transform_vector(&f.translation);
        ForceVector(SpatialVector::new(rotation, translation))
    }
}

impl Mul<Force> for SpatialTransform {
    type Output = Force;
    #[inline]
    fn mul(self, force: Force) -> Force {
        Force(self * force.0)
    }
}

impl Mul<Momentum> for SpatialTransform {
    type Output = Momentum;
    #[inline]
    fn mul(self, momentum: Momentum) -> Momentum {
        Momentum(self * momentum.0)
    }
}

impl Mul<SpatialTransform> for SpatialTransform {
    type Output = SpatialTransform;
    #[inline]
    fn mul(self, rhs: SpatialTransform) -> SpatialTransform {
        SpatialTransform::from(self.0 * rhs.0)
    }
}

/// Rigid body inertia about the body frame origin.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpatialInertia(Matrix6<f64>);

impl Default for SpatialInertia {
    fn default() -> Self {
        Self(Matrix6::zeros())
    }
}

impl SpatialInertia {
    pub fn matrix(&self) -> Matrix6<f64> {
        self.0
    }

    pub fn mass(&self) -> f64 {
        self.0[(3, 3)]
    }
}

impl From<&MassProperties> for SpatialInertia {
    fn from(mp: &MassProperties) -> SpatialInertia {
        let inertia = mp.inertia.matrix();
        let mass = mp.mass;
        let com = mp.center_of_mass.vector();
        let cx = com.cross_matrix();
        let cxt = cx.transpose();

        let quad11 = inertia + cx * cxt * mass;
        let quad12 = cx * mass;
        let quad21 = cxt * mass;
        let quad22 = Matrix3::identity() * mass;

        let mut m = Matrix6::zeros();
        m.fixed_view_mut::<3, 3>(0, 0).copy_from(&quad11);
        m.fixed_view_mut::<3, 3>(0, 3).copy_from(&quad12);
        m.fixed_view_mut::<3, 3>(3, 0).copy_from(&quad21);
        m.fixed_view_mut::<3, 3>(3, 3).copy_from(&quad22);
        SpatialInertia(m)
    }
}

impl From<MassProperties> for SpatialInertia {
    fn from(mp: MassProperties) -> SpatialInertia {
        SpatialInertia::from(&mp)
    }
}

impl Add<SpatialInertia> for SpatialInertia {
    type Output = SpatialInertia;
    #[inline]
    fn add(self, rhs: SpatialInertia) -> SpatialInertia {
        SpatialInertia(self.0 + rhs.0)
    }
}

impl Mul<SpatialVector> for SpatialInertia {
    type Output = SpatialVector;
    fn mul(self, v: SpatialVector) -> SpatialVector {
        SpatialVector::from(self.0 * v.vector())
    }
}

impl Mul<MotionVector> for SpatialInertia {
    type Output = ForceVector;
    fn mul(self, motion: MotionVector) -> ForceVector {
        ForceVector(self * motion.0)
    }
}

impl Mul<Velocity> for SpatialInertia {
    type Output = Momentum;
    fn mul(self, velocity: Velocity) -> Momentum {
        Momentum(self * velocity.0)
    }
}

impl Mul<Acceleration> for SpatialInertia {
    type Output = Force;
    fn mul(self, acceleration: Acceleration) -> Force {
        Force(self * acceleration.0)
    }
}
