//! Modal analysis: natural frequencies and mode shapes

use std::f64::consts::PI;

use log::{info, warn};
use nalgebra::{DMatrix, DVector};

use crate::analysis::Normalization;
use crate::error::{FeaError, FeaResult};
use crate::math::eigen::smallest_eigenpairs;
use crate::math::sparse::{matvec, partition};
use crate::model::Model;

/// Eigenvalue extraction of the undamped free-free partition
///
/// Builds K_ff and M_ff, solves the generalized eigenproblem near the
/// shift and turns the eigenvalues into natural frequencies in Hz.
pub struct ModalAnalysis<'a> {
    model: &'a Model,
    modes: usize,
    tolerance: f64,
    sigma: f64,
    normalization: Normalization,
    return_modes: bool,
}

/// Frequencies in Hz plus (optionally) full-length mode shapes
pub struct ModalResult {
    /// Natural frequencies in Hz, ascending
    pub frequencies: DVector<f64>,
    /// Mode shapes over all equations, one column per mode; restrained
    /// rows are zero
    pub modes: Option<DMatrix<f64>>,
    /// The same shapes restricted to the free partition
    pub(crate) free_vectors: Option<DMatrix<f64>>,
}

impl<'a> ModalAnalysis<'a> {
    pub fn new(model: &'a Model) -> Self {
        Self {
            model,
            modes: 1,
            tolerance: 0.0,
            sigma: 0.0,
            normalization: Normalization::Mass,
            return_modes: true,
        }
    }

    /// Number of eigenpairs to extract
    pub fn with_modes(mut self, modes: usize) -> Self {
        self.modes = modes;
        self
    }

    /// Relative eigenvalue accuracy; zero means machine precision
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Shift value near which eigenvalues are extracted
    pub fn with_sigma(mut self, sigma: f64) -> Self {
        self.sigma = sigma;
        self
    }

    pub fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }

    /// Whether mode shapes are assembled in addition to the frequencies
    pub fn with_mode_shapes(mut self, return_modes: bool) -> Self {
        self.return_modes = return_modes;
        self
    }

    pub fn solve(&self) -> FeaResult<ModalResult> {
        if self.modes == 0 {
            return Err(FeaError::InvalidConfig(
                "number of eigenvalues must be positive".into(),
            ));
        }
        if self.sigma < 0.0 {
            return Err(FeaError::InvalidConfig("sigma must be non-negative".into()));
        }
        if self.tolerance < 0.0 {
            return Err(FeaError::InvalidConfig(
                "tolerance must be non-negative".into(),
            ));
        }
        let free = self.model.free_dofs();
        if self.modes > free.len() {
            return Err(FeaError::InvalidConfig(format!(
                "{} modes requested from {} free degrees of freedom",
                self.modes,
                free.len()
            )));
        }

        info!(
            "Modal analysis: {} modes of a {}-DOF free partition",
            self.modes,
            free.len()
        );

        let stiffness = partition(&self.model.stiffness_matrix()?, free, free);
        let mass = partition(&self.model.mass_matrix()?, free, free);

        let eigen = smallest_eigenpairs(&stiffness, &mass, self.modes, self.sigma, self.tolerance)?;

        // Negative eigenvalues are discarded, not fatal
        let keep: Vec<usize> = (0..eigen.values.len())
            .filter(|&i| eigen.values[i] >= 0.0)
            .collect();
        if keep.len() < eigen.values.len() {
            warn!(
                "{} negative eigenvalues found and filtered out",
                eigen.values.len() - keep.len()
            );
        }

        let frequencies =
            DVector::from_iterator(keep.len(), keep.iter().map(|&i| eigen.values[i].sqrt() / (2.0 * PI)));

        if !self.return_modes {
            return Ok(ModalResult {
                frequencies,
                modes: None,
                free_vectors: None,
            });
        }

        let mut vectors = DMatrix::zeros(free.len(), keep.len());
        for (col, &i) in keep.iter().enumerate() {
            vectors.set_column(col, &eigen.vectors.column(i));
        }

        match self.normalization {
            Normalization::Mass => {
                for mut column in vectors.column_iter_mut() {
                    let m_phi = matvec(&mass, &column.clone_owned());
                    let scale = column.dot(&m_phi).sqrt();
                    column /= scale;
                }
            }
            Normalization::Displacement => {
                for mut column in vectors.column_iter_mut() {
                    let scale = column.amax();
                    column /= scale;
                }
            }
        }

        // Scatter the free-partition shapes back to full length
        let mut modes = DMatrix::zeros(self.model.dof_count(), keep.len());
        for (row, &number) in free.iter().enumerate() {
            for col in 0..keep.len() {
                modes[(number, col)] = vectors[(row, col)];
            }
        }

        Ok(ModalResult {
            frequencies,
            modes: Some(modes),
            free_vectors: Some(vectors),
        })
    }
}
