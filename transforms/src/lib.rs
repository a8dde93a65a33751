use nalgebra::{Unit, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::ops::Mul;

/// A rigid transform between two frames.
///
/// We use the terminology B_from_A rather than A_to_B so that notation matches
/// matrix multiplication
/// i.e. v_C = C_from_B * B_from_A * v_A
///
/// A `Transform` named `b_from_a` stores the pose of frame B expressed in frame A:
/// `rotation` is the orientation of B's axes in A and `translation` is the position of
/// B's origin in A's coordinates.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub rotation: UnitQuaternion<f64>,
    pub translation: Vector3<f64>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn new(rotation: UnitQuaternion<f64>, translation: Vector3<f64>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    pub fn identity() -> Self {
        Self {
            rotation: UnitQuaternion::identity(),
            translation: Vector3::zeros(),
        }
    }

    /// A pure translation, B's origin located at (x, y, z) in A.
    pub fn from_translation(x: f64, y: f64, z: f64) -> Self {
        Self::new(UnitQuaternion::identity(), Vector3::new(x, y, z))
    }

    /// A pure rotation of B relative to A by `angle` radians about `axis`.
    pub fn from_axis_angle(axis: &Unit<Vector3<f64>>, angle: f64) -> Self {
        Self::new(UnitQuaternion::from_axis_angle(axis, angle), Vector3::zeros())
    }

    pub fn inv(&self) -> Self {
        let rotation = self.rotation.inverse();
        let translation = -(rotation * self.translation);
        Self {
            rotation,
            translation,
        }
    }

    /// Expresses a free vector given in A's coordinates in B's coordinates.
    #[inline]
    pub fn transform_vector(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.rotation.inverse_transform_vector(v)
    }

    /// Expresses a point given in A's coordinates in B's coordinates.
    #[inline]
    pub fn transform_point(&self, p: &Vector3<f64>) -> Vector3<f64> {
        self.rotation
            .inverse_transform_vector(&(p - self.translation))
    }

    /// The inverse of `transform_vector`, B's coordinates back to A's.
    #[inline]
    pub fn rotate_vector(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.rotation.transform_vector(v)
    }
}

impl Mul<Transform> for Transform {
    type Output = Transform;
    /// `c_from_b * b_from_a = c_from_a`
    fn mul(self, b_from_a: Transform) -> Transform {
        Transform {
            rotation: b_from_a.rotation * self.rotation,
            translation: b_from_a.translation + b_from_a.rotation * self.translation,
        }
    }
}
