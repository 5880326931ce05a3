//! Core traits for estimators and transformers.
//!
//! The cost model only talks to these traits, so any regression technique
//! can stand in for the default random forest.

use crate::error::Result;
use crate::primitives::{Matrix, Vector};

/// A supervised scalar regressor.
///
/// # Examples
///
/// ```
/// use print_orient::prelude::*;
/// use print_orient::tree::RandomForestRegressor;
///
/// let x = Matrix::from_vec(6, 1, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
/// let y = Vector::from_slice(&[1.0, 1.0, 1.0, 5.0, 5.0, 5.0]);
///
/// let mut model = RandomForestRegressor::new(5).with_random_state(7);
/// Regressor::fit(&mut model, &x, &y).unwrap();
/// let predictions = Regressor::predict(&model, &x).unwrap();
/// assert_eq!(predictions.len(), 6);
/// ```
pub trait Regressor {
    /// Fits the model to training data.
    ///
    /// # Errors
    ///
    /// Returns an error if fitting fails (dimension mismatch, empty data, ...).
    fn fit(&mut self, x: &Matrix<f32>, y: &Vector<f32>) -> Result<()>;

    /// Predicts target values for input data.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is not fitted or `x` has a different
    /// feature width than the training data.
    fn predict(&self, x: &Matrix<f32>) -> Result<Vector<f32>>;

    /// Number of features the model was fitted on, `None` before `fit`.
    fn n_features(&self) -> Option<usize>;

    /// Computes the R² score of the predictions against `y`.
    ///
    /// # Errors
    ///
    /// Propagates prediction errors.
    fn score(&self, x: &Matrix<f32>, y: &Vector<f32>) -> Result<f32> {
        let predictions = self.predict(x)?;
        Ok(crate::metrics::r_squared(&predictions, y))
    }
}

/// Trait for data transformers (scalers).
pub trait Transformer {
    /// Fits the transformer to data.
    ///
    /// # Errors
    ///
    /// Returns an error if fitting fails.
    fn fit(&mut self, x: &Matrix<f32>) -> Result<()>;

    /// Transforms data using fitted parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the transformer is not fitted or the width differs
    /// from the fitted width.
    fn transform(&self, x: &Matrix<f32>) -> Result<Matrix<f32>>;

    /// Fits and transforms in one step.
    ///
    /// # Errors
    ///
    /// Returns an error if fitting fails.
    fn fit_transform(&mut self, x: &Matrix<f32>) -> Result<Matrix<f32>> {
        self.fit(x)?;
        self.transform(x)
    }
}
