//! Analysis drivers: modal extraction, transient dynamics, static solve

pub mod modal;
pub mod statics;
pub mod transient;

use serde::{Deserialize, Serialize};

pub use modal::{ModalAnalysis, ModalResult};
pub use statics::{StaticAnalysis, StaticResult};
pub use transient::{TransientAnalysis, TransientResult};

/// Mode-shape normalization method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Normalization {
    /// Scale each shape so that phi' M phi = 1
    #[default]
    Mass,
    /// Scale each shape to unit peak displacement
    Displacement,
}
