//! Preprocessing transformers.
//!
//! The cost model standardizes its 13 input columns before both regressors
//! see them; [`StandardScaler`] is that transform.
//!
//! # Example
//!
//! ```
//! use print_orient::prelude::*;
//! use print_orient::preprocessing::StandardScaler;
//!
//! let data = Matrix::from_vec(4, 2, vec![
//!     1.0, 100.0,
//!     2.0, 200.0,
//!     3.0, 300.0,
//!     4.0, 400.0,
//! ]).expect("valid matrix dimensions");
//!
//! let mut scaler = StandardScaler::new();
//! let scaled = scaler.fit_transform(&data).expect("fit_transform should succeed");
//! assert!(scaled.get(0, 0).abs() < 2.0);
//! ```

use crate::error::{OrientError, Result};
use crate::primitives::Matrix;
use crate::traits::Transformer;
use serde::{Deserialize, Serialize};

/// Standardizes features by removing the mean and scaling to unit variance.
///
/// z = (x - mean) / std, with the population std (divide by n). Columns with
/// zero variance are only centered.
///
/// The fitted width is part of the contract: `transform` rejects any other
/// width with [`OrientError::InconsistentModelState`] instead of padding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    /// Mean of each feature (computed during fit).
    mean: Option<Vec<f32>>,
    /// Standard deviation of each feature (computed during fit).
    std: Option<Vec<f32>>,
}

impl Default for StandardScaler {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardScaler {
    /// Creates an unfitted scaler.
    #[must_use]
    pub fn new() -> Self {
        Self {
            mean: None,
            std: None,
        }
    }

    /// Returns the fitted per-column means.
    ///
    /// # Errors
    ///
    /// Returns [`OrientError::NotFitted`] before `fit`.
    pub fn mean(&self) -> Result<&[f32]> {
        self.mean.as_deref().ok_or_else(not_fitted)
    }

    /// Returns the fitted per-column standard deviations.
    ///
    /// # Errors
    ///
    /// Returns [`OrientError::NotFitted`] before `fit`.
    pub fn std(&self) -> Result<&[f32]> {
        self.std.as_deref().ok_or_else(not_fitted)
    }

    /// Returns true if the scaler has been fitted.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.mean.is_some()
    }

    /// Feature width the scaler was fitted on.
    #[must_use]
    pub fn n_features(&self) -> Option<usize> {
        self.mean.as_ref().map(Vec::len)
    }

    /// Standardizes a single row.
    ///
    /// # Errors
    ///
    /// Returns an error if unfitted or if `row.len()` differs from the fitted
    /// width.
    pub fn transform_row(&self, row: &[f32]) -> Result<Vec<f32>> {
        let (mean, std) = self.fitted_stats()?;
        if row.len() != mean.len() {
            return Err(OrientError::width_mismatch(
                "scaler",
                mean.len(),
                row.len(),
            ));
        }
        Ok(row
            .iter()
            .zip(mean.iter().zip(std))
            .map(|(&x, (&m, &s))| scale_value(x, m, s))
            .collect())
    }

    fn fitted_stats(&self) -> Result<(&[f32], &[f32])> {
        match (&self.mean, &self.std) {
            (Some(mean), Some(std)) if mean.len() == std.len() => Ok((mean, std)),
            (Some(mean), Some(std)) => Err(OrientError::width_mismatch(
                "scaler statistics",
                mean.len(),
                std.len(),
            )),
            _ => Err(not_fitted()),
        }
    }
}

fn not_fitted() -> OrientError {
    OrientError::NotFitted {
        what: "StandardScaler".to_string(),
    }
}

fn scale_value(x: f32, mean: f32, std: f32) -> f32 {
    let centered = x - mean;
    if std > 1e-10 {
        centered / std
    } else {
        centered
    }
}

impl Transformer for StandardScaler {
    /// Computes the mean and standard deviation of each feature.
    fn fit(&mut self, x: &Matrix<f32>) -> Result<()> {
        let (n_samples, n_features) = x.shape();

        if n_samples == 0 {
            return Err("Cannot fit with zero samples".into());
        }

        let mut mean = vec![0.0; n_features];
        for (j, mean_j) in mean.iter_mut().enumerate() {
            let sum: f32 = (0..n_samples).map(|i| x.get(i, j)).sum();
            *mean_j = sum / n_samples as f32;
        }

        let mut std = vec![0.0; n_features];
        for (j, std_j) in std.iter_mut().enumerate() {
            let sum_sq: f32 = (0..n_samples)
                .map(|i| {
                    let diff = x.get(i, j) - mean[j];
                    diff * diff
                })
                .sum();
            *std_j = (sum_sq / n_samples as f32).sqrt();
        }

        self.mean = Some(mean);
        self.std = Some(std);

        Ok(())
    }

    /// Standardizes the data using fitted mean and std.
    fn transform(&self, x: &Matrix<f32>) -> Result<Matrix<f32>> {
        let (mean, std) = self.fitted_stats()?;

        let (n_samples, n_features) = x.shape();
        if n_features != mean.len() {
            return Err(OrientError::width_mismatch(
                "scaler",
                mean.len(),
                n_features,
            ));
        }

        let mut result = Vec::with_capacity(n_samples * n_features);
        for i in 0..n_samples {
            for j in 0..n_features {
                result.push(scale_value(x.get(i, j), mean[j], std[j]));
            }
        }

        Matrix::from_vec(n_samples, n_features, result).map_err(Into::into)
    }
}
