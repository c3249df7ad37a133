//! Linear static analysis

use log::info;
use nalgebra::DVector;

use crate::error::FeaResult;
use crate::math::sparse::{matvec, partition, SkylineCholesky};
use crate::model::Model;

/// Direct solve of K_ff u_f = f_f
///
/// Every load contributes its final time sample; the force vector is
/// gathered into the free-DOF space through the model's selection matrix.
pub struct StaticAnalysis<'a> {
    model: &'a Model,
}

/// Full-length displacement vector; restrained entries are zero
pub struct StaticResult {
    pub displacement: DVector<f64>,
}

impl<'a> StaticAnalysis<'a> {
    pub fn new(model: &'a Model) -> Self {
        Self { model }
    }

    pub fn solve(&self) -> FeaResult<StaticResult> {
        let free = self.model.free_dofs();
        info!("Static analysis: {} free degrees of freedom", free.len());

        let stiffness = partition(&self.model.stiffness_matrix()?, free, free);

        let loads = DVector::from_iterator(
            self.model.load_series().len(),
            self.model.load_series().iter().map(|s| s.last_value()),
        );
        let rhs = matvec(self.model.selection(), &loads);

        let factor = SkylineCholesky::factor(&stiffness)?;
        let solution = factor.solve(&rhs);

        let mut displacement = DVector::zeros(self.model.dof_count());
        for (i, &number) in free.iter().enumerate() {
            displacement[number] = solution[i];
        }

        Ok(StaticResult { displacement })
    }
}
