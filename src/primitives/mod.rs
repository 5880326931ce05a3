//! Core compute primitives (Vector, Matrix).
//!
//! Every estimator in the crate trains on `Matrix<f32>` rows and `Vector<f32>`
//! targets.

mod matrix;
mod vector;

pub use matrix::Matrix;
pub use vector::Vector;
