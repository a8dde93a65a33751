use nalgebra::{Matrix3, Unit, Vector3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// relative slack on the principal moment checks, inertias built from
// floating point geometry rarely land exactly on the boundary
const INERTIA_TOL: f64 = 1e-10;

#[derive(Debug, Error, PartialEq)]
pub enum MassPropertiesErrors {
    #[error("center of mass must be finite")]
    CenterOfMassNotFinite,
    #[error("inertia must be finite")]
    InertiaNotFinite,
    #[error("principal moments of inertia cannot be negative")]
    NegativePrincipalMoment,
    #[error("principal moments of inertia violate the triangle inequality")]
    TriangleInequality,
    #[error("massless bodies cannot carry rotational inertia")]
    MasslessWithInertia,
    #[error("mass must be finite")]
    MassNotFinite,
    #[error("mass cannot be negative")]
    NegativeMass,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CenterOfMass {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl CenterOfMass {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }
}

impl From<Vector3<f64>> for CenterOfMass {
    fn from(v: Vector3<f64>) -> CenterOfMass {
        CenterOfMass::new(v[0], v[1], v[2])
    }
}

/// Rotational inertia about the center of mass, expressed in the body frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Inertia {
    pub ixx: f64,
    pub iyy: f64,
    pub izz: f64,
    pub ixy: f64,
    pub ixz: f64,
    pub iyz: f64,
}

impl Inertia {
    pub fn new(
        ixx: f64,
        iyy: f64,
        izz: f64,
        ixy: f64,
        ixz: f64,
        iyz: f64,
    ) -> Result<Self, MassPropertiesErrors> {
        let inertia = Self {
            ixx,
            iyy,
            izz,
            ixy,
            ixz,
            iyz,
        };
        inertia.validate()?;
        Ok(inertia)
    }

    /// Uniform thin rod of `length` centered on the center of mass and lying along `axis`.
    pub fn thin_rod(mass: f64, length: f64, axis: &Unit<Vector3<f64>>) -> Self {
        let a = axis.into_inner();
        let m = (Matrix3::identity() - a * a.transpose()) * (mass * length * length / 12.0);
        Self::from_matrix_unchecked(&m)
    }

    pub fn solid_cuboid(mass: f64, x: f64, y: f64, z: f64) -> Self {
        let k = mass / 12.0;
        Self {
            ixx: k * (y * y + z * z),
            iyy: k * (x * x + z * z),
            izz: k * (x * x + y * y),
            ixy: 0.0,
            ixz: 0.0,
            iyz: 0.0,
        }
    }

    pub fn solid_sphere(mass: f64, radius: f64) -> Self {
        let i = 0.4 * mass * radius * radius;
        Self {
            ixx: i,
            iyy: i,
            izz: i,
            ixy: 0.0,
            ixz: 0.0,
            iyz: 0.0,
        }
    }

    pub fn zeros() -> Self {
        Self {
            ixx: 0.0,
            iyy: 0.0,
            izz: 0.0,
            ixy: 0.0,
            ixz: 0.0,
            iyz: 0.0,
        }
    }

    fn from_matrix_unchecked(m: &Matrix3<f64>) -> Self {
        Self {
            ixx: m[(0, 0)],
            iyy: m[(1, 1)],
            izz: m[(2, 2)],
            ixy: m[(0, 1)],
            ixz: m[(0, 2)],
            iyz: m[(1, 2)],
        }
    }

    pub fn matrix(&self) -> Matrix3<f64> {
        Matrix3::new(
            self.ixx, self.ixy, self.ixz, self.ixy, self.iyy, self.iyz, self.ixz, self.iyz,
            self.izz,
        )
    }

    /// Checks the tensor could belong to a physical body: finite, principal moments
    /// non-negative and each no larger than the sum of the other two.
    pub fn validate(&self) -> Result<(), MassPropertiesErrors> {
        let m = self.matrix();
        if m.iter().any(|e| !e.is_finite()) {
            return Err(MassPropertiesErrors::InertiaNotFinite);
        }
        let scale = m.diagonal().abs().max().max(1.0);
        let tol = INERTIA_TOL * scale;
        let p = m.symmetric_eigenvalues();
        if p.iter().any(|&e| e < -tol) {
            return Err(MassPropertiesErrors::NegativePrincipalMoment);
        }
        if p[0] > p[1] + p[2] + tol || p[1] > p[0] + p[2] + tol || p[2] > p[0] + p[1] + tol {
            return Err(MassPropertiesErrors::TriangleInequality);
        }
        Ok(())
    }
}

impl TryFrom<Matrix3<f64>> for Inertia {
    type Error = MassPropertiesErrors;
    fn try_from(m: Matrix3<f64>) -> Result<Inertia, MassPropertiesErrors> {
        // symmetric part only, the lower triangle is assumed to mirror the upper
        let inertia = Self::from_matrix_unchecked(&m);
        inertia.validate()?;
        Ok(inertia)
    }
}

/// Represents the mass properties of an object
/// Mass, Center of Mass, Inertia
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MassProperties {
    pub center_of_mass: CenterOfMass,
    pub mass: f64,
    /// about the center of mass
    pub inertia: Inertia,
}

impl Default for MassProperties {
    fn default() -> Self {
        Self {
            center_of_mass: CenterOfMass::default(),
            mass: 1.0,
            inertia: Inertia::solid_sphere(1.0, 1.0),
        }
    }
}

impl MassProperties {
    pub fn new(
        mass: f64,
        center_of_mass: CenterOfMass,
        inertia: Inertia,
    ) -> Result<Self, MassPropertiesErrors> {
        let mp = MassProperties {
            mass,
            center_of_mass,
            inertia,
        };
        mp.validate()?;
        Ok(mp)
    }

    /// A point mass located at `center_of_mass`.
    pub fn point_mass(
        mass: f64,
        center_of_mass: CenterOfMass,
    ) -> Result<Self, MassPropertiesErrors> {
        Self::new(mass, center_of_mass, Inertia::zeros())
    }

    /// A massless link, such as the intermediate frame of a compound joint.
    pub fn massless() -> Self {
        Self {
            center_of_mass: CenterOfMass::default(),
            mass: 0.0,
            inertia: Inertia::zeros(),
        }
    }

    /// Zero mass is allowed only together with zero inertia.
    pub fn validate(&self) -> Result<(), MassPropertiesErrors> {
        if !self.mass.is_finite() {
            return Err(MassPropertiesErrors::MassNotFinite);
        }
        if self.mass < 0.0 {
            return Err(MassPropertiesErrors::NegativeMass);
        }
        if !self.center_of_mass.vector().iter().all(|e| e.is_finite()) {
            return Err(MassPropertiesErrors::CenterOfMassNotFinite);
        }
        self.inertia.validate()?;
        if self.mass == 0.0 && self.inertia != Inertia::zeros() {
            return Err(MassPropertiesErrors::MasslessWithInertia);
        }
        Ok(())
    }
}
