//! Evaluation metrics for the cost model.
//!
//! Regression metrics only: R² is the quality signal reported after
//! training; MSE, RMSE and MAE round out the training report.
//! [`round_to`] fixes the decimals of numbers that end up in reports.

use crate::primitives::Vector;

/// Computes the coefficient of determination (R²).
///
/// R² = 1 - (`SS_res` / `SS_tot`)
///
/// Returns 0.0 when the targets are constant (`SS_tot` = 0).
///
/// # Examples
///
/// ```
/// use print_orient::metrics::r_squared;
/// use print_orient::primitives::Vector;
///
/// let y_true = Vector::from_slice(&[3.0, -0.5, 2.0, 7.0]);
/// let y_pred = Vector::from_slice(&[2.5, 0.0, 2.0, 8.0]);
/// let r2 = r_squared(&y_pred, &y_true);
/// assert!(r2 > 0.9);
/// ```
///
/// # Panics
///
/// Panics if vectors have different lengths.
#[must_use]
pub fn r_squared(y_pred: &Vector<f32>, y_true: &Vector<f32>) -> f32 {
    assert_eq!(y_pred.len(), y_true.len(), "Vectors must have same length");

    let y_mean = y_true.mean();

    let ss_res: f32 = y_true
        .as_slice()
        .iter()
        .zip(y_pred.as_slice())
        .map(|(t, p)| (t - p).powi(2))
        .sum();

    let ss_tot: f32 = y_true.as_slice().iter().map(|t| (t - y_mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return 0.0;
    }

    1.0 - (ss_res / ss_tot)
}

/// Computes the Mean Squared Error (MSE).
///
/// # Panics
///
/// Panics if vectors have different lengths or are empty.
#[must_use]
pub fn mse(y_pred: &Vector<f32>, y_true: &Vector<f32>) -> f32 {
    assert_eq!(y_pred.len(), y_true.len(), "Vectors must have same length");
    assert!(!y_true.is_empty(), "Vectors cannot be empty");

    let sum_sq_error: f32 = y_true
        .as_slice()
        .iter()
        .zip(y_pred.as_slice())
        .map(|(t, p)| (t - p).powi(2))
        .sum();

    sum_sq_error / y_true.len() as f32
}

/// Computes the Root Mean Squared Error, in target units.
///
/// # Panics
///
/// Panics if vectors have different lengths or are empty.
#[must_use]
pub fn rmse(y_pred: &Vector<f32>, y_true: &Vector<f32>) -> f32 {
    mse(y_pred, y_true).sqrt()
}

/// Computes the Mean Absolute Error (MAE).
///
/// # Panics
///
/// Panics if vectors have different lengths or are empty.
#[must_use]
pub fn mae(y_pred: &Vector<f32>, y_true: &Vector<f32>) -> f32 {
    assert_eq!(y_pred.len(), y_true.len(), "Vectors must have same length");
    assert!(!y_true.is_empty(), "Vectors cannot be empty");

    let sum_abs: f32 = y_true
        .as_slice()
        .iter()
        .zip(y_pred.as_slice())
        .map(|(t, p)| (t - p).abs())
        .sum();

    sum_abs / y_true.len() as f32
}

/// Rounds half away from zero to `decimals` places.
///
/// ```
/// use print_orient::metrics::round_to;
///
/// assert_eq!(round_to(3.14159, 2), 3.14);
/// assert_eq!(round_to(-2.25, 1), -2.3);
/// ```
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_r2_perfect() {
        let y = Vector::from_slice(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!((r_squared(&y, &y) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_r2_argument_order_matters() {
        // Mean is taken from y_true, so swapping arguments changes the value.
        let y_true = Vector::from_slice(&[1.0, 2.0, 3.0, 4.0]);
        let y_pred = Vector::from_slice(&[1.0, 2.0, 3.0, 5.0]);
        assert!((r_squared(&y_pred, &y_true) - 0.8).abs() < 1e-5);
        assert!((r_squared(&y_true, &y_pred) - (1.0 - 1.0 / 8.75)).abs() < 1e-5);
    }

    #[test]
    fn test_r2_constant_targets_is_zero() {
        let y_true = Vector::from_slice(&[2.0, 2.0, 2.0]);
        let y_pred = Vector::from_slice(&[1.0, 2.0, 3.0]);
        assert!(r_squared(&y_pred, &y_true).abs() < 1e-9);
    }

    #[test]
    fn test_r2_bad_predictions_negative() {
        let y_true = Vector::from_slice(&[1.0, 2.0, 3.0]);
        let y_pred = Vector::from_slice(&[3.0, 2.0, 1.0]);
        assert!(r_squared(&y_pred, &y_true) < 0.0);
    }

    #[test]
    fn test_mse_rmse_mae() {
        let y_true = Vector::from_slice(&[3.0, -0.5, 2.0, 7.0]);
        let y_pred = Vector::from_slice(&[2.5, 0.0, 2.0, 8.0]);
        assert!((mse(&y_pred, &y_true) - 0.375).abs() < 1e-6);
        assert!((rmse(&y_pred, &y_true) - 0.375_f32.sqrt()).abs() < 1e-6);
        assert!((mae(&y_pred, &y_true) - 0.5).abs() < 1e-6);
    }

    #[test]
    #[should_panic(expected = "Vectors must have same length")]
    fn test_mse_length_mismatch_panics() {
        let a = Vector::from_slice(&[1.0, 2.0]);
        let b = Vector::from_slice(&[1.0]);
        let _ = mse(&a, &b);
    }

    #[test]
    fn test_round_to_decimals() {
        assert_eq!(round_to(12.345_678, 2), 12.35);
        assert_eq!(round_to(12.345_678, 1), 12.3);
        assert_eq!(round_to(12.5, 0), 13.0);
        assert_eq!(round_to(-0.04, 1), -0.0);
        assert!(round_to(f64::NAN, 2).is_nan());
    }
}
