//! Generalized symmetric eigensolver with spectral shift
//!
//! Solves K phi = lambda M phi for the eigenvalues nearest a shift sigma
//! by Lanczos iteration on the shift-inverted operator (K - sigma M)^-1 M,
//! carried out in the M-inner product with full reorthogonalization. The
//! shifted matrix is factored once with the skyline Cholesky solver; every
//! iteration costs one backsolve and one mass product.

use log::debug;
use nalgebra::{DMatrix, DVector, SymmetricEigen};
use nalgebra_sparse::CsrMatrix;

use crate::error::{FeaError, FeaResult};
use crate::math::sparse::{add_scaled, matvec, SkylineCholesky};

/// Eigenvalues (ascending) and M-orthonormal eigenvectors, one per column
pub struct GeneralizedEigen {
    pub values: DVector<f64>,
    pub vectors: DMatrix<f64>,
}

/// Extract the `count` eigenvalues of K phi = lambda M phi nearest `sigma`
///
/// `tolerance` bounds the relative Ritz residual; zero means machine
/// precision. Returns `EigenSolveFailure` if the iteration allowance is
/// exhausted before convergence, or if (K - sigma M) cannot be factored.
pub fn smallest_eigenpairs(
    stiffness: &CsrMatrix<f64>,
    mass: &CsrMatrix<f64>,
    count: usize,
    sigma: f64,
    tolerance: f64,
) -> FeaResult<GeneralizedEigen> {
    let n = stiffness.nrows();
    if count == 0 {
        return Err(FeaError::InvalidConfig(
            "at least one eigenpair must be requested".into(),
        ));
    }
    if count > n {
        return Err(FeaError::InvalidConfig(format!(
            "{count} eigenpairs requested from a {n}-DOF system"
        )));
    }

    let shifted = if sigma == 0.0 {
        stiffness.clone()
    } else {
        add_scaled(stiffness, mass, -sigma)
    };
    let factor = SkylineCholesky::factor(&shifted)
        .map_err(|_| FeaError::EigenSolveFailure { iterations: 0 })?;

    let tol = if tolerance > 0.0 {
        tolerance
    } else {
        f64::EPSILON
    };
    let max_subspace = (2 * count + 200).min(n);

    // Deterministic start vector, generic with respect to the mode shapes
    let start = DVector::from_fn(n, |i, _| 1.0 + 0.5 * ((i + 1) as f64).sin());

    let mut basis: Vec<DVector<f64>> = Vec::with_capacity(max_subspace);
    let mut mass_basis: Vec<DVector<f64>> = Vec::with_capacity(max_subspace);
    let mut alphas: Vec<f64> = Vec::with_capacity(max_subspace);
    let mut betas: Vec<f64> = Vec::with_capacity(max_subspace);

    let m_start = matvec(mass, &start);
    let norm = start.dot(&m_start);
    if norm <= 0.0 || !norm.is_finite() {
        return Err(FeaError::EigenSolveFailure { iterations: 0 });
    }
    let norm = norm.sqrt();
    basis.push(&start / norm);
    mass_basis.push(&m_start / norm);

    loop {
        let j = alphas.len();
        let mut w = factor.solve(&mass_basis[j]);
        let alpha = w.dot(&mass_basis[j]);
        w.axpy(-alpha, &basis[j], 1.0);
        if j > 0 {
            w.axpy(-betas[j - 1], &basis[j - 1], 1.0);
        }
        // Full reorthogonalization, applied twice
        for _ in 0..2 {
            for (q, mq) in basis.iter().zip(&mass_basis) {
                let c = w.dot(mq);
                w.axpy(-c, q, 1.0);
            }
        }
        alphas.push(alpha);

        let mw = matvec(mass, &w);
        let beta = w.dot(&mw).max(0.0).sqrt();

        let steps = alphas.len();
        let breakdown = beta <= f64::EPSILON * alpha.abs().max(1.0);

        if steps >= count {
            let (values, modes) = ritz_pairs(&alphas, &betas);
            let nu_max = values[0].1.abs();
            // Residuals bottom out at the reorthogonalization noise level
            let floor = 8.0 * f64::EPSILON * nu_max * (n as f64).sqrt();
            let converged = values.iter().take(count).all(|&(idx, nu)| {
                let residual = beta * modes[(steps - 1, idx)].abs();
                residual <= (tol * nu.abs()).max(floor)
            });
            // A subspace spanning the whole partition is exact regardless
            // of the residual estimate
            if converged || breakdown || steps == n {
                debug!("Lanczos converged with a {steps}-vector subspace");
                return Ok(assemble_pairs(
                    &values, &modes, &basis, count, sigma, steps,
                ));
            }
            if steps == max_subspace {
                return Err(FeaError::EigenSolveFailure {
                    iterations: max_subspace,
                });
            }
        } else if breakdown {
            return Err(FeaError::EigenSolveFailure { iterations: steps });
        }

        betas.push(beta);
        basis.push(&w / beta);
        mass_basis.push(&mw / beta);
    }
}

/// Eigen-decompose the Lanczos tridiagonal; returns (column, nu) sorted by
/// descending |nu| together with the eigenvector matrix
fn ritz_pairs(alphas: &[f64], betas: &[f64]) -> (Vec<(usize, f64)>, DMatrix<f64>) {
    let s = alphas.len();
    let mut t = DMatrix::zeros(s, s);
    for (i, &a) in alphas.iter().enumerate() {
        t[(i, i)] = a;
    }
    for (i, &b) in betas.iter().take(s.saturating_sub(1)).enumerate() {
        t[(i, i + 1)] = b;
        t[(i + 1, i)] = b;
    }
    let eigen = SymmetricEigen::new(t);
    let mut order: Vec<(usize, f64)> = eigen
        .eigenvalues
        .iter()
        .copied()
        .enumerate()
        .collect();
    order.sort_by(|a, b| b.1.abs().partial_cmp(&a.1.abs()).unwrap());
    (order, eigen.eigenvectors)
}

fn assemble_pairs(
    order: &[(usize, f64)],
    modes: &DMatrix<f64>,
    basis: &[DVector<f64>],
    count: usize,
    sigma: f64,
    steps: usize,
) -> GeneralizedEigen {
    let n = basis[0].len();
    let mut pairs: Vec<(f64, DVector<f64>)> = order
        .iter()
        .take(count)
        .map(|&(idx, nu)| {
            let lambda = sigma + 1.0 / nu;
            let mut phi = DVector::zeros(n);
            for (j, q) in basis.iter().take(steps).enumerate() {
                phi.axpy(modes[(j, idx)], q, 1.0);
            }
            (lambda, phi)
        })
        .collect();
    pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());

    let values = DVector::from_iterator(count, pairs.iter().map(|p| p.0));
    let mut vectors = DMatrix::zeros(n, count);
    for (i, (_, phi)) in pairs.iter().enumerate() {
        vectors.set_column(i, phi);
    }
    GeneralizedEigen { values, vectors }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::sparse::SparseMatrixBuilder;
    use approx::assert_relative_eq;

    /// Spring chain: K tridiagonal (2, -1), M diagonal with varied masses
    fn chain(n: usize) -> (CsrMatrix<f64>, CsrMatrix<f64>) {
        let mut k = SparseMatrixBuilder::new(n);
        let mut m = SparseMatrixBuilder::new(n);
        for i in 0..n {
            k.add(i, i, 2.0);
            if i + 1 < n {
                k.add(i, i + 1, -1.0);
                k.add(i + 1, i, -1.0);
            }
            m.add(i, i, 1.0 + 0.1 * (i % 3) as f64);
        }
        (k.to_csr(), m.to_csr())
    }

    /// Dense reference solution through M^-1/2 K M^-1/2
    fn dense_reference(k: &CsrMatrix<f64>, m: &CsrMatrix<f64>) -> Vec<f64> {
        let n = k.nrows();
        let mut dense = DMatrix::zeros(n, n);
        for (row, col, &val) in k.triplet_iter() {
            dense[(row, col)] = val;
        }
        let mut scale = DVector::zeros(n);
        for (row, col, &val) in m.triplet_iter() {
            assert_eq!(row, col);
            scale[row] = val.sqrt();
        }
        for i in 0..n {
            for j in 0..n {
                dense[(i, j)] /= scale[i] * scale[j];
            }
        }
        let mut values: Vec<f64> = SymmetricEigen::new(dense).eigenvalues.iter().copied().collect();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap());
        values
    }

    #[test]
    fn matches_dense_reference() {
        let (k, m) = chain(40);
        let reference = dense_reference(&k, &m);
        let result = smallest_eigenpairs(&k, &m, 5, 0.0, 1e-10).unwrap();
        for i in 0..5 {
            assert_relative_eq!(result.values[i], reference[i], max_relative = 1e-8);
        }
    }

    #[test]
    fn vectors_are_mass_orthonormal() {
        let (k, m) = chain(30);
        let result = smallest_eigenpairs(&k, &m, 4, 0.0, 1e-12).unwrap();
        for i in 0..4 {
            let mi = matvec(&m, &result.vectors.column(i).into_owned());
            for j in 0..4 {
                let dot = result.vectors.column(j).dot(&mi);
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(dot, expected, epsilon = 1e-7);
            }
        }
    }

    #[test]
    fn residuals_satisfy_the_pencil() {
        let (k, m) = chain(25);
        let result = smallest_eigenpairs(&k, &m, 3, 0.0, 1e-12).unwrap();
        for i in 0..3 {
            let phi = result.vectors.column(i).into_owned();
            let lhs = matvec(&k, &phi);
            let rhs = matvec(&m, &phi) * result.values[i];
            assert!((lhs - rhs).norm() < 1e-7);
        }
    }

    #[test]
    fn shift_targets_nearby_eigenvalues() {
        let (k, m) = chain(40);
        let reference = dense_reference(&k, &m);
        // A small positive shift below the first eigenvalue returns the
        // same leading pairs
        let result = smallest_eigenpairs(&k, &m, 3, reference[0] * 0.5, 1e-10).unwrap();
        for i in 0..3 {
            assert_relative_eq!(result.values[i], reference[i], max_relative = 1e-8);
        }
    }

    #[test]
    fn invalid_requests_are_rejected() {
        let (k, m) = chain(5);
        assert!(matches!(
            smallest_eigenpairs(&k, &m, 0, 0.0, 0.0),
            Err(FeaError::InvalidConfig(_))
        ));
        assert!(matches!(
            smallest_eigenpairs(&k, &m, 6, 0.0, 0.0),
            Err(FeaError::InvalidConfig(_))
        ));
    }
}
