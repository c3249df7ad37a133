//! Numerical kernels shared by the assembler and the analyses

pub mod eigen;
pub mod sparse;

pub use eigen::{smallest_eigenpairs, GeneralizedEigen};
pub use sparse::{
    add_scaled, matvec, mul_dense, partition, SkylineCholesky, SparseMatrixBuilder,
};
