//! quadfem - A native Rust plane-stress finite element engine
//!
//! This library provides a two-dimensional structural analysis kernel for
//! slender beam-like bodies meshed with isoparametric quadrilaterals,
//! supporting:
//! - Quad4/Quad8/Quad9 plane-stress elements
//! - Tabulated Gauss quadrature over line/triangle/quadrilateral/
//!   tetrahedron/hexahedron reference domains
//! - Sparse assembly with lumped spring and mass boundary terms
//! - Modal analysis (shift-invert Lanczos eigensolver)
//! - Transient dynamics by modal superposition and Newmark integration
//! - Linear static analysis and strain recovery at sensor nodes
//!
//! ## Example
//! ```rust
//! use quadfem::prelude::*;
//!
//! // Two Quad4 elements spanning a 2 m x 1 m strip
//! let mut nodes: Vec<Node> = [
//!     (0.0, 0.0), (0.0, 1.0), (1.0, 0.0), (1.0, 1.0), (2.0, 0.0), (2.0, 1.0),
//! ]
//! .iter()
//! .map(|&(x, y)| Node::new(x, y, 0.0))
//! .collect();
//! for node in &mut nodes {
//!     node.activate(&[Dof::X, Dof::Y]);
//! }
//!
//! let rule = QuadratureRule::quadrilateral(2).unwrap();
//! let steel = LinearElastic::new(200e9, 0.3, 7850.0);
//! let elements = vec![
//!     Element::new(vec![0, 2, 3, 1], ElementKind::Quad4, vec![steel.clone(); 4],
//!         vec![0.01; 4], rule.clone()).unwrap(),
//!     Element::new(vec![2, 4, 5, 3], ElementKind::Quad4, vec![steel; 4],
//!         vec![0.01; 4], rule).unwrap(),
//! ];
//!
//! let mut model = Model::new(nodes, elements);
//! model.add_fixation(&[0, 1], &[Dof::X, Dof::Y]).unwrap();
//!
//! let modal = ModalAnalysis::new(&model).with_modes(3);
//! let result = modal.solve().unwrap();
//! assert!(result.frequencies[0] > 0.0);
//! ```

pub mod analysis;
pub mod elements;
pub mod error;
pub mod io;
pub mod job;
pub mod loads;
pub mod math;
pub mod model;
pub mod quadrature;
pub mod results;

// Re-export common types
pub mod prelude {
    pub use crate::analysis::{
        ModalAnalysis, ModalResult, Normalization, StaticAnalysis, StaticResult,
        TransientAnalysis, TransientResult,
    };
    pub use crate::elements::{Dof, LinearElastic, Node, Quad4, Quad8, Quad9, Quadrilateral};
    pub use crate::error::{FeaError, FeaResult};
    pub use crate::job::{AnalysisKind, JobDefinition, ModalSettings, TimeHistorySettings};
    pub use crate::loads::TimeSeries;
    pub use crate::model::{Element, ElementKind, Model};
    pub use crate::quadrature::{Domain, QuadratureRule};
    pub use crate::results::SensorSet;
}
