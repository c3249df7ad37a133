//! Element-level building blocks: materials, nodes and the quadrilateral library

pub mod material;
pub mod node;
pub mod quad;

pub use material::LinearElastic;
pub use node::{Dof, Node};
pub use quad::{Quad4, Quad8, Quad9, Quadrilateral};
