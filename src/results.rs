//! Sensor extraction and strain recovery
//!
//! Analyses return modal or full-length quantities; this module slices
//! them down to the measurement degrees of freedom and recovers strain at
//! sensor nodes by averaging the corner extrapolations of their incident
//! elements.

use nalgebra::{DMatrix, DVector};

use crate::analysis::{StaticResult, TransientResult};
use crate::elements::Dof;
use crate::error::{FeaError, FeaResult};
use crate::model::Model;

/// Corner natural coordinates paired with a node's incident elements in
/// ascending label order
const CORNER_PATTERN: [(f64, f64); 4] = [(1.0, 1.0), (1.0, -1.0), (-1.0, -1.0), (-1.0, 1.0)];

/// Measurement nodes and their (x, y) equation numbers
pub struct SensorSet {
    labels: Vec<usize>,
    dofs: Vec<usize>,
}

impl SensorSet {
    pub fn new(model: &Model, labels: &[usize]) -> FeaResult<Self> {
        let mut dofs = Vec::with_capacity(2 * labels.len());
        for &label in labels {
            let node = model.nodes.get(label).ok_or_else(|| {
                FeaError::InvalidConfig(format!("unknown sensor node {label}"))
            })?;
            for dof in [Dof::X, Dof::Y] {
                dofs.push(node.number(dof).ok_or_else(|| {
                    FeaError::InvalidConfig(format!(
                        "sensor node {label} has no active {dof:?} degree of freedom"
                    ))
                })?);
            }
        }
        Ok(Self {
            labels: labels.to_vec(),
            dofs,
        })
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Equation numbers, x then y per sensor
    pub fn dof_numbers(&self) -> &[usize] {
        &self.dofs
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Select the given rows of a full-length matrix
pub fn select_rows(matrix: &DMatrix<f64>, rows: &[usize]) -> DMatrix<f64> {
    let mut out = DMatrix::zeros(rows.len(), matrix.ncols());
    for (i, &row) in rows.iter().enumerate() {
        for j in 0..matrix.ncols() {
            out[(i, j)] = matrix[(row, j)];
        }
    }
    out
}

/// Sensor displacement histories, one row per time step, columns (Ux, Uy)
/// per sensor
pub fn sensor_displacements(result: &TransientResult, sensors: &SensorSet) -> DMatrix<f64> {
    let rows = select_rows(&result.modes, sensors.dof_numbers());
    (rows * &result.displacement).transpose()
}

/// Sensor acceleration histories, one row per time step
pub fn sensor_accelerations(result: &TransientResult, sensors: &SensorSet) -> DMatrix<f64> {
    let rows = select_rows(&result.modes, sensors.dof_numbers());
    (rows * &result.acceleration).transpose()
}

/// Static sensor displacements, (Ux, Uy) per sensor
pub fn static_sensor_displacements(result: &StaticResult, sensors: &SensorSet) -> DVector<f64> {
    DVector::from_iterator(
        sensors.dof_numbers().len(),
        sensors.dof_numbers().iter().map(|&d| result.displacement[d]),
    )
}

/// Strain histories at the sensor nodes, one row per time step and
/// (Exx, Eyy, Exy) columns per sensor
pub fn transient_strains(
    model: &Model,
    result: &TransientResult,
    sensors: &SensorSet,
) -> FeaResult<DMatrix<f64>> {
    let steps = result.displacement.ncols();
    strains_at_sensors(model, sensors, steps, |edofs| {
        let rows = select_rows(&result.modes, edofs);
        Ok(rows * &result.displacement)
    })
}

/// Static strain at the sensor nodes, a single row of (Exx, Eyy, Exy)
/// columns per sensor
pub fn static_strains(
    model: &Model,
    result: &StaticResult,
    sensors: &SensorSet,
) -> FeaResult<DMatrix<f64>> {
    strains_at_sensors(model, sensors, 1, |edofs| {
        Ok(DMatrix::from_iterator(
            edofs.len(),
            1,
            edofs.iter().map(|&d| result.displacement[d]),
        ))
    })
}

/// Average the corner strain of every element incident to each sensor
///
/// `element_displacements` maps an element's global DOF numbers to its
/// displacement history (rows per DOF, columns per step).
fn strains_at_sensors<F>(
    model: &Model,
    sensors: &SensorSet,
    steps: usize,
    mut element_displacements: F,
) -> FeaResult<DMatrix<f64>>
where
    F: FnMut(&[usize]) -> FeaResult<DMatrix<f64>>,
{
    let mut out = DMatrix::zeros(steps, 3 * sensors.len());

    for (k, &label) in sensors.labels().iter().enumerate() {
        let mut links = model.nodes[label].links().to_vec();
        links.sort_unstable();

        let mut accumulated = DMatrix::zeros(3, steps);
        let mut visited = 0usize;
        for (&elabel, &(r1, r2)) in links.iter().zip(CORNER_PATTERN.iter()) {
            let element = &model.elements[elabel];
            let edofs = element.global_dofs(&model.nodes)?;
            let disp = element_displacements(&edofs)?;
            accumulated += element.strain(&model.nodes, &disp, r1, r2)?;
            visited += 1;
        }
        if visited == 0 {
            return Err(FeaError::InvalidConfig(format!(
                "sensor node {label} has no incident elements"
            )));
        }

        let mean = accumulated / visited as f64;
        for t in 0..steps {
            for c in 0..3 {
                out[(t, 3 * k + c)] = mean[(c, t)];
            }
        }
    }

    Ok(out)
}
