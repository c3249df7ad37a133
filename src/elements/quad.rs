//! Isoparametric quadrilateral elements for plane-stress problems
//!
//! The element types only provide their shape functions and derivatives;
//! stiffness, mass and strain recovery are free functions generic over the
//! [`Quadrilateral`] trait so the integration loops monomorphize per type.
//!
//! Node ordering starts at the (+1, +1) corner and runs counter-clockwise:
//! corners first, then (for the quadratic types) the mid-side nodes from
//! the top edge counter-clockwise, then the centre node for Quad9.

use nalgebra::{DMatrix, DVector, Matrix2, Matrix3};

use crate::error::{FeaError, FeaResult};
use crate::quadrature::QuadratureRule;

/// Shape-function interface of the quadrilateral family
pub trait Quadrilateral {
    /// Number of element nodes
    const NODES: usize;
    /// Number of translational degrees of freedom (u, v per node)
    const DOFS: usize;

    /// Shape functions at natural coordinates (r1, r2), one per node
    fn shape_functions(r1: f64, r2: f64) -> DVector<f64>;

    /// Shape-function derivatives with respect to (r1, r2), 2 x NODES
    fn shape_derivatives(r1: f64, r2: f64) -> DMatrix<f64>;
}

/// Four-node bilinear quadrilateral
pub struct Quad4;

impl Quadrilateral for Quad4 {
    const NODES: usize = 4;
    const DOFS: usize = 8;

    fn shape_functions(r1: f64, r2: f64) -> DVector<f64> {
        DVector::from_column_slice(&[
            0.25 * (1.0 + r1) * (1.0 + r2),
            0.25 * (1.0 - r1) * (1.0 + r2),
            0.25 * (1.0 - r1) * (1.0 - r2),
            0.25 * (1.0 + r1) * (1.0 - r2),
        ])
    }

    fn shape_derivatives(r1: f64, r2: f64) -> DMatrix<f64> {
        DMatrix::from_row_slice(
            2,
            4,
            &[
                0.25 * (1.0 + r2),
                -0.25 * (1.0 + r2),
                -0.25 * (1.0 - r2),
                0.25 * (1.0 - r2),
                //
                0.25 * (1.0 + r1),
                0.25 * (1.0 - r1),
                -0.25 * (1.0 - r1),
                -0.25 * (1.0 + r1),
            ],
        )
    }
}

/// Eight-node serendipity quadrilateral
pub struct Quad8;

impl Quadrilateral for Quad8 {
    const NODES: usize = 8;
    const DOFS: usize = 16;

    fn shape_functions(r1: f64, r2: f64) -> DVector<f64> {
        DVector::from_column_slice(&[
            0.25 * (1.0 + r1) * (1.0 + r2) * (r1 + r2 - 1.0),
            0.25 * (1.0 - r1) * (1.0 + r2) * (-r1 + r2 - 1.0),
            0.25 * (1.0 - r1) * (1.0 - r2) * (-r1 - r2 - 1.0),
            0.25 * (1.0 + r1) * (1.0 - r2) * (r1 - r2 - 1.0),
            0.5 * (1.0 - r1 * r1) * (1.0 + r2),
            0.5 * (1.0 - r1) * (1.0 - r2 * r2),
            0.5 * (1.0 - r1 * r1) * (1.0 - r2),
            0.5 * (1.0 + r1) * (1.0 - r2 * r2),
        ])
    }

    fn shape_derivatives(r1: f64, r2: f64) -> DMatrix<f64> {
        DMatrix::from_row_slice(
            2,
            8,
            &[
                0.25 * (1.0 + r2) * (2.0 * r1 + r2),
                0.25 * (1.0 + r2) * (2.0 * r1 - r2),
                0.25 * (1.0 - r2) * (2.0 * r1 + r2),
                0.25 * (1.0 - r2) * (2.0 * r1 - r2),
                -r1 * (1.0 + r2),
                -0.5 * (1.0 - r2 * r2),
                -r1 * (1.0 - r2),
                0.5 * (1.0 - r2 * r2),
                //
                0.25 * (1.0 + r1) * (r1 + 2.0 * r2),
                0.25 * (1.0 - r1) * (2.0 * r2 - r1),
                0.25 * (1.0 - r1) * (r1 + 2.0 * r2),
                0.25 * (1.0 + r1) * (2.0 * r2 - r1),
                0.5 * (1.0 - r1 * r1),
                -r2 * (1.0 - r1),
                -0.5 * (1.0 - r1 * r1),
                -r2 * (1.0 + r1),
            ],
        )
    }
}

/// Nine-node Lagrangian bi-quadratic quadrilateral
pub struct Quad9;

impl Quadrilateral for Quad9 {
    const NODES: usize = 9;
    const DOFS: usize = 18;

    fn shape_functions(r1: f64, r2: f64) -> DVector<f64> {
        DVector::from_column_slice(&[
            0.25 * (1.0 + r1) * (1.0 + r2) * r1 * r2,
            -0.25 * (1.0 - r1) * (1.0 + r2) * r1 * r2,
            0.25 * (1.0 - r1) * (1.0 - r2) * r1 * r2,
            -0.25 * (1.0 + r1) * (1.0 - r2) * r1 * r2,
            0.5 * (1.0 - r1 * r1) * (1.0 + r2) * r2,
            -0.5 * (1.0 - r1) * r1 * (1.0 - r2 * r2),
            -0.5 * (1.0 - r1 * r1) * (1.0 - r2) * r2,
            0.5 * (1.0 + r1) * r1 * (1.0 - r2 * r2),
            (1.0 - r1 * r1) * (1.0 - r2 * r2),
        ])
    }

    fn shape_derivatives(r1: f64, r2: f64) -> DMatrix<f64> {
        DMatrix::from_row_slice(
            2,
            9,
            &[
                0.25 * r2 * (1.0 + r2) * (1.0 + 2.0 * r1),
                -0.25 * r2 * (1.0 + r2) * (1.0 - 2.0 * r1),
                0.25 * r2 * (1.0 - r2) * (1.0 - 2.0 * r1),
                -0.25 * r2 * (1.0 - r2) * (1.0 + 2.0 * r1),
                -r1 * r2 * (1.0 + r2),
                -0.5 * (1.0 - 2.0 * r1) * (1.0 - r2 * r2),
                r1 * r2 * (1.0 - r2),
                0.5 * (1.0 + 2.0 * r1) * (1.0 - r2 * r2),
                -2.0 * r1 * (1.0 - r2 * r2),
                //
                0.25 * r1 * (1.0 + r1) * (1.0 + 2.0 * r2),
                -0.25 * r1 * (1.0 - r1) * (1.0 + 2.0 * r2),
                0.25 * r1 * (1.0 - r1) * (1.0 - 2.0 * r2),
                -0.25 * r1 * (1.0 + r1) * (1.0 - 2.0 * r2),
                0.5 * (1.0 - r1 * r1) * (1.0 + 2.0 * r2),
                r1 * r2 * (1.0 - r1),
                -0.5 * (1.0 - r1 * r1) * (1.0 - 2.0 * r2),
                -r1 * r2 * (1.0 + r1),
                -2.0 * r2 * (1.0 - r1 * r1),
            ],
        )
    }
}

/// Shape-function matrix expanded over (u, v) DOFs, 2 x 2n
pub fn shape_matrix<E: Quadrilateral>(r1: f64, r2: f64) -> DMatrix<f64> {
    let n = E::shape_functions(r1, r2);
    let mut out = DMatrix::zeros(2, E::DOFS);
    for i in 0..E::NODES {
        out[(0, 2 * i)] = n[i];
        out[(1, 2 * i + 1)] = n[i];
    }
    out
}

/// Jacobian of the isoparametric map, J = dN * X
pub fn jacobian<E: Quadrilateral>(ncoords: &DMatrix<f64>, r1: f64, r2: f64) -> Matrix2<f64> {
    let dn = E::shape_derivatives(r1, r2);
    let j = dn * ncoords;
    Matrix2::new(j[(0, 0)], j[(0, 1)], j[(1, 0)], j[(1, 1)])
}

/// Strain-displacement matrix B (3 x 2n) and the Jacobian at (r1, r2)
///
/// Rows are (eps_xx, eps_yy, gamma_xy) over the interleaved (u, v)
/// ordering. A singular Jacobian is a contract violation.
pub fn deformation_matrix<E: Quadrilateral>(
    ncoords: &DMatrix<f64>,
    r1: f64,
    r2: f64,
) -> FeaResult<(DMatrix<f64>, Matrix2<f64>)> {
    let jac = jacobian::<E>(ncoords, r1, r2);
    let inv = jac.try_inverse().ok_or_else(|| {
        FeaError::InvalidElement(format!("singular Jacobian at ({r1}, {r2})"))
    })?;
    let dn = E::shape_derivatives(r1, r2);
    let data = inv * dn; // physical derivatives, 2 x n

    let mut b = DMatrix::zeros(3, E::DOFS);
    for i in 0..E::NODES {
        b[(0, 2 * i)] = data[(0, i)];
        b[(1, 2 * i + 1)] = data[(1, i)];
        b[(2, 2 * i)] = data[(1, i)];
        b[(2, 2 * i + 1)] = data[(0, i)];
    }
    Ok((b, jac))
}

fn check_lengths<E: Quadrilateral>(
    ncoords: &DMatrix<f64>,
    per_point: &[usize],
    rule: &QuadratureRule,
) -> FeaResult<()> {
    if ncoords.nrows() != E::NODES || ncoords.ncols() != 2 {
        return Err(FeaError::InvalidElement(format!(
            "expected {} x 2 nodal coordinates, got {} x {}",
            E::NODES,
            ncoords.nrows(),
            ncoords.ncols()
        )));
    }
    for &len in per_point {
        if len != rule.len() {
            return Err(FeaError::InvalidElement(format!(
                "per-point data length {} does not match the {}-point rule",
                len,
                rule.len()
            )));
        }
    }
    Ok(())
}

/// Element stiffness: sum over the rule of w1 w2 B' C B |det J| t
pub fn stiffness<E: Quadrilateral>(
    ncoords: &DMatrix<f64>,
    cmatrix: &[Matrix3<f64>],
    thickness: &[f64],
    rule: &QuadratureRule,
) -> FeaResult<DMatrix<f64>> {
    check_lengths::<E>(ncoords, &[cmatrix.len(), thickness.len()], rule)?;

    let mut stiffness = DMatrix::zeros(E::DOFS, E::DOFS);
    for p in 0..rule.len() {
        let (r1, r2) = (rule.points()[(p, 0)], rule.points()[(p, 1)]);
        let (b, jac) = deformation_matrix::<E>(ncoords, r1, r2)?;
        let c = &cmatrix[p];
        let scale = rule.weight(p) * jac.determinant().abs() * thickness[p];

        for i in 0..E::DOFS {
            for j in 0..E::DOFS {
                let mut sum = 0.0;
                for m in 0..3 {
                    for n in 0..3 {
                        sum += b[(m, i)] * c[(m, n)] * b[(n, j)];
                    }
                }
                stiffness[(i, j)] += scale * sum;
            }
        }
    }
    Ok(stiffness)
}

/// Consistent element mass: sum over the rule of w1 w2 N' N rho |det J| t
pub fn mass<E: Quadrilateral>(
    ncoords: &DMatrix<f64>,
    density: &[f64],
    thickness: &[f64],
    rule: &QuadratureRule,
) -> FeaResult<DMatrix<f64>> {
    check_lengths::<E>(ncoords, &[density.len(), thickness.len()], rule)?;

    let mut mass = DMatrix::zeros(E::DOFS, E::DOFS);
    for p in 0..rule.len() {
        let (r1, r2) = (rule.points()[(p, 0)], rule.points()[(p, 1)]);
        let n = shape_matrix::<E>(r1, r2);
        let jac = jacobian::<E>(ncoords, r1, r2);
        let scale = rule.weight(p) * density[p] * jac.determinant().abs() * thickness[p];

        for i in 0..E::DOFS {
            for j in 0..E::DOFS {
                let sum = n[(0, i)] * n[(0, j)] + n[(1, i)] * n[(1, j)];
                mass[(i, j)] += scale * sum;
            }
        }
    }
    Ok(mass)
}

/// Strain at the natural coordinate (r1, r2), extrapolated from the
/// integration points
///
/// Strain is evaluated at every integration point through B * u, then
/// carried to (r1, r2) by the shape functions evaluated at (r1/s, r2/s)
/// with s the largest sample abscissa; this inverts the interior Gauss
/// placement onto the unit square. `u` holds one column per time step.
pub fn strain<E: Quadrilateral>(
    ncoords: &DMatrix<f64>,
    u: &DMatrix<f64>,
    rule: &QuadratureRule,
    r1: f64,
    r2: f64,
) -> FeaResult<DMatrix<f64>> {
    check_lengths::<E>(ncoords, &[], rule)?;
    if rule.len() < 2 {
        return Err(FeaError::InvalidConfig(
            "strain recovery is undefined for one-point rules".into(),
        ));
    }
    if rule.len() != E::NODES {
        return Err(FeaError::InvalidConfig(format!(
            "strain recovery needs one integration point per node ({} points for {} nodes)",
            rule.len(),
            E::NODES
        )));
    }
    if u.nrows() != E::DOFS {
        return Err(FeaError::InvalidElement(format!(
            "displacement rows {} do not match the element ({})",
            u.nrows(),
            E::DOFS
        )));
    }

    let scale = (0..rule.len())
        .map(|p| rule.points()[(p, 0)].abs())
        .fold(0.0, f64::max);
    let extrapolation = E::shape_functions(r1 / scale, r2 / scale);

    let mut out = DMatrix::zeros(3, u.ncols());
    for p in 0..rule.len() {
        let (s1, s2) = (rule.points()[(p, 0)], rule.points()[(p, 1)]);
        let (b, _) = deformation_matrix::<E>(ncoords, s1, s2)?;
        out += extrapolation[p] * b * u;
    }
    Ok(out)
}
