//! Transient dynamics by modal superposition and Newmark integration
//!
//! The equations of motion are projected onto a truncated mass-normalized
//! modal basis, which turns the system diagonal: K_hat = diag(omega^2),
//! M_hat = I and C_hat = diag(2 zeta omega) with the damping ratios taken
//! from the model's Rayleigh coefficients. Integration uses the
//! linear-acceleration Newmark scheme (beta = 1/6, gamma = 1/2).

use std::f64::consts::PI;

use log::{info, warn};
use nalgebra::{DMatrix, DVector};

use crate::analysis::{ModalAnalysis, Normalization};
use crate::error::{FeaError, FeaResult};
use crate::loads::{interp, time_grid};
use crate::math::sparse::mul_dense;
use crate::model::Model;

/// Newmark parameters of the linear-acceleration scheme
const NEWMARK_BETA: f64 = 1.0 / 6.0;
const NEWMARK_GAMMA: f64 = 0.5;

/// Modal time-history analysis
pub struct TransientAnalysis<'a> {
    model: &'a Model,
    period: f64,
    increment: f64,
    modes: usize,
}

/// Modal displacement/velocity/acceleration histories on the caller grid
pub struct TransientResult {
    /// Output time grid
    pub time: Vec<f64>,
    /// Modal displacements, one row per mode
    pub displacement: DMatrix<f64>,
    /// Modal velocities
    pub velocity: DMatrix<f64>,
    /// Modal accelerations
    pub acceleration: DMatrix<f64>,
    /// Natural frequencies of the retained modes in Hz
    pub frequencies: DVector<f64>,
    /// Full-length mode shapes, one column per retained mode
    pub modes: DMatrix<f64>,
    /// Mode shapes restricted to the free partition
    pub(crate) free_vectors: DMatrix<f64>,
}

impl<'a> TransientAnalysis<'a> {
    pub fn new(model: &'a Model) -> Self {
        Self {
            model,
            period: 1.0,
            increment: 0.1,
            modes: 10,
        }
    }

    /// Simulation time period
    pub fn with_period(mut self, period: f64) -> Self {
        self.period = period;
        self
    }

    /// Output (and initial solver) time increment
    pub fn with_increment(mut self, increment: f64) -> Self {
        self.increment = increment;
        self
    }

    /// Number of modes retained in the superposition
    pub fn with_modes(mut self, modes: usize) -> Self {
        self.modes = modes;
        self
    }

    pub fn solve(&self) -> FeaResult<TransientResult> {
        if self.period <= 0.0 {
            return Err(FeaError::InvalidConfig("time period must be positive".into()));
        }
        if self.increment <= 0.0 {
            return Err(FeaError::InvalidConfig(
                "increment size must be positive".into(),
            ));
        }

        let modal = ModalAnalysis::new(self.model)
            .with_modes(self.modes)
            .with_normalization(Normalization::Mass)
            .solve()?;
        let frequencies = modal.frequencies;
        let modes = modal.modes.expect("modal analysis retains shapes");
        let vectors = modal.free_vectors.expect("modal analysis retains shapes");
        let m = frequencies.len();
        if m == 0 {
            return Err(FeaError::InvalidConfig(
                "no positive modes available for superposition".into(),
            ));
        }

        // The integration step must resolve the fastest retained mode
        let mut step = self.increment;
        let cap = 0.1 / frequencies[m - 1];
        if step > cap {
            warn!(
                "Increment {:.3e} s exceeds the stability bound; clamped to {:.3e} s",
                step, cap
            );
            step = cap;
        }

        let grid = time_grid(self.period, step);
        info!(
            "Transient analysis: {} modes over {} steps of {:.3e} s",
            m,
            grid.len(),
            step
        );

        // Modal properties: unit mass, stiffness omega^2, Rayleigh damping
        let (alpha, beta) = self.model.damping();
        let omega = frequencies.map(|f| 2.0 * PI * f);
        let khat = omega.map(|w| w * w);
        let chat = omega.map(|w| {
            let zeta = alpha / (2.0 * w) + beta * w / 2.0;
            2.0 * zeta * w
        });

        // Modal forces: interpolate every load onto the grid, gather into
        // the free-DOF space and project through the mode shapes
        let mut loads = DMatrix::zeros(self.model.load_series().len(), grid.len());
        for (i, series) in self.model.load_series().iter().enumerate() {
            for (j, &t) in grid.iter().enumerate() {
                loads[(i, j)] = series.sample(t);
            }
        }
        let gathered = mul_dense(self.model.selection(), &loads);
        let forces = vectors.transpose() * gathered;

        let q0 = DVector::zeros(m);
        let v0 = DVector::zeros(m);
        let (dsp, vlc, acl) = newmark(&khat, &chat, &forces, step, &q0, &v0);

        // Interpolate the solver grid onto the caller grid if they differ
        let output = time_grid(self.period, self.increment);
        let (displacement, velocity, acceleration) = if (step - self.increment).abs() < 1e-15 {
            (dsp, vlc, acl)
        } else {
            (
                resample_rows(&dsp, &grid, &output),
                resample_rows(&vlc, &grid, &output),
                resample_rows(&acl, &grid, &output),
            )
        };

        Ok(TransientResult {
            time: output,
            displacement,
            velocity,
            acceleration,
            frequencies,
            modes,
            free_vectors: vectors,
        })
    }
}

/// Integrate the diagonal modal system M=I, C=diag(chat), K=diag(khat)
/// under the force histories `forces` (one row per mode, one column per
/// step) with the linear-acceleration Newmark scheme
pub fn newmark(
    khat: &DVector<f64>,
    chat: &DVector<f64>,
    forces: &DMatrix<f64>,
    step: f64,
    q0: &DVector<f64>,
    v0: &DVector<f64>,
) -> (DMatrix<f64>, DMatrix<f64>, DMatrix<f64>) {
    let (nb, ng) = (NEWMARK_BETA, NEWMARK_GAMMA);
    let m = khat.len();
    let steps = forces.ncols();

    let a1 = DVector::from_fn(m, |i, _| {
        1.0 / (nb * step * step) + ng / (nb * step) * chat[i]
    });
    let a2 = DVector::from_fn(m, |i, _| 1.0 / (nb * step) + (ng / nb - 1.0) * chat[i]);
    let a3 = DVector::from_fn(m, |i, _| {
        1.0 / (2.0 * nb) - 1.0 + step * (ng / (2.0 * nb) - 1.0) * chat[i]
    });
    // Effective stiffness, factored once (diagonal, so elementwise)
    let keff_inv = DVector::from_fn(m, |i, _| 1.0 / (khat[i] + a1[i]));

    let c1 = ng / (nb * step);
    let c2 = 1.0 - ng / nb;
    let c3 = step * (1.0 - ng / (2.0 * nb));
    let c4 = 1.0 / (nb * step * step);
    let c5 = -1.0 / (nb * step);
    let c6 = -(1.0 / (2.0 * nb) - 1.0);

    let mut dsp = DMatrix::zeros(m, steps);
    let mut vlc = DMatrix::zeros(m, steps);
    let mut acl = DMatrix::zeros(m, steps);

    for i in 0..m {
        dsp[(i, 0)] = q0[i];
        vlc[(i, 0)] = v0[i];
        acl[(i, 0)] = forces[(i, 0)] - chat[i] * v0[i] - khat[i] * q0[i];
    }

    for j in 0..steps.saturating_sub(1) {
        for i in 0..m {
            let (q, v, a) = (dsp[(i, j)], vlc[(i, j)], acl[(i, j)]);
            let rhs = forces[(i, j + 1)] + a1[i] * q + a2[i] * v + a3[i] * a;
            let q_next = keff_inv[i] * rhs;
            dsp[(i, j + 1)] = q_next;
            vlc[(i, j + 1)] = c1 * (q_next - q) + c2 * v + c3 * a;
            acl[(i, j + 1)] = c4 * (q_next - q) + c5 * v + c6 * a;
        }
    }

    (dsp, vlc, acl)
}

fn resample_rows(data: &DMatrix<f64>, from: &[f64], to: &[f64]) -> DMatrix<f64> {
    let mut out = DMatrix::zeros(data.nrows(), to.len());
    for i in 0..data.nrows() {
        let row: Vec<f64> = data.row(i).iter().copied().collect();
        for (j, &t) in to.iter().enumerate() {
            out[(i, j)] = interp(t, from, &row);
        }
    }
    out
}
