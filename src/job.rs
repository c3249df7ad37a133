//! Job records handed over by the upstream definition layer
//!
//! The graphical front-end and its dictionary conversion live outside this
//! crate; these types mirror the record it produces so a driver can
//! deserialize a job and feed the engine.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::Normalization;
use crate::error::{FeaError, FeaResult};

/// Requested analysis procedure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisKind {
    Modal,
    TimeHistory,
    Static,
}

/// Modal analysis settings of a job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModalSettings {
    pub modes: usize,
    pub normalization: Normalization,
}

/// Time-history settings of a job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeHistorySettings {
    /// Rayleigh mass-proportional coefficient
    pub alpha: f64,
    /// Rayleigh stiffness-proportional coefficient
    pub beta: f64,
    pub period: f64,
    pub increment: f64,
    /// Load case selector, 0..=3
    pub load_case: u8,
}

/// A complete job definition
///
/// Table fields are row lists: `material` rows are (E, nu, T),
/// `boundary1..3` rows are (kx, ky, T), `corrosion_wastage` rows are
/// (w, x/L) and `temperature` rows are (T, x/L).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDefinition {
    pub name: String,
    /// Damage scenario selector, 0..=6
    pub model_index: u8,
    pub thickness: f64,
    /// Stiffness reduction fraction of the damaged elements
    pub damage: f64,
    pub material: Vec<[f64; 3]>,
    pub boundary1: Vec<[f64; 3]>,
    pub boundary2: Vec<[f64; 3]>,
    pub boundary3: Vec<[f64; 3]>,
    pub corrosion_wastage: Vec<[f64; 2]>,
    pub temperature: Vec<[f64; 2]>,
    pub analysis: AnalysisKind,
    pub modal_settings: Option<ModalSettings>,
    pub th_settings: Option<TimeHistorySettings>,
}

impl JobDefinition {
    pub fn from_json_file(path: &Path) -> FeaResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> FeaResult<Self> {
        let job: JobDefinition = serde_json::from_str(content)
            .map_err(|e| FeaError::InvalidConfig(format!("malformed job record: {e}")))?;
        job.validate()?;
        Ok(job)
    }

    pub fn validate(&self) -> FeaResult<()> {
        if self.model_index > 6 {
            return Err(FeaError::InvalidConfig(format!(
                "model index {} out of range 0..=6",
                self.model_index
            )));
        }
        if self.material.is_empty() {
            return Err(FeaError::InvalidConfig(
                "a job needs at least one material row".into(),
            ));
        }
        match self.analysis {
            AnalysisKind::Modal => {
                if self.modal_settings.is_none() {
                    return Err(FeaError::InvalidConfig(
                        "modal jobs need modal settings".into(),
                    ));
                }
            }
            AnalysisKind::TimeHistory => match &self.th_settings {
                None => {
                    return Err(FeaError::InvalidConfig(
                        "time-history jobs need time-history settings".into(),
                    ))
                }
                Some(th) if th.load_case > 3 => {
                    return Err(FeaError::InvalidConfig(format!(
                        "load case {} out of range 0..=3",
                        th.load_case
                    )))
                }
                Some(_) => {}
            },
            AnalysisKind::Static => {}
        }
        Ok(())
    }
}
