//! Linear-elastic material with its plane-stress constitutive matrix

use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

/// Isotropic linear-elastic material
///
/// The shear modulus and the plane-stress constitutive matrix are derived
/// once at construction; the material is immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearElastic {
    /// Modulus of elasticity (Young's modulus) in Pa
    e: f64,
    /// Poisson's ratio
    nu: f64,
    /// Density in kg/m^3
    rho: f64,
    /// Shear modulus in Pa
    g: f64,
    /// Plane-stress constitutive matrix
    c: Matrix3<f64>,
}

impl LinearElastic {
    pub fn new(e: f64, nu: f64, rho: f64) -> Self {
        let g = e / (2.0 * (1.0 + nu));
        let ct = e / (1.0 - nu * nu);
        let c = Matrix3::new(
            ct,
            ct * nu,
            0.0,
            ct * nu,
            ct,
            0.0,
            0.0,
            0.0,
            ct * 0.5 * (1.0 - nu),
        );
        Self { e, nu, rho, g, c }
    }

    pub fn youngs_modulus(&self) -> f64 {
        self.e
    }

    pub fn poissons_ratio(&self) -> f64 {
        self.nu
    }

    pub fn density(&self) -> f64 {
        self.rho
    }

    pub fn shear_modulus(&self) -> f64 {
        self.g
    }

    /// Plane-stress constitutive matrix C relating strain to stress
    pub fn constitutive(&self) -> &Matrix3<f64> {
        &self.c
    }
}
