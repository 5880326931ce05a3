//! Train/test splitting.
//!
//! The cost model trains two regressors on the same rows, so the split is
//! expressed as index sets that can be applied to any number of aligned
//! targets.

use crate::error::{OrientError, Result};
use crate::primitives::{Matrix, Vector};

/// Validates inputs and returns `(n_train, n_test)`.
///
/// `n_test = ceil(n_samples * test_size)`, the same count scikit-learn
/// takes for a fractional test size; both sides must be non-empty.
fn split_sizes(n_samples: usize, test_size: f32) -> Result<(usize, usize)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(OrientError::InvalidHyperparameter {
            param: "test_size".to_string(),
            value: test_size.to_string(),
            constraint: "between 0 and 1 (exclusive)".to_string(),
        });
    }

    let n_test = (n_samples as f32 * test_size).ceil() as usize;
    let n_train = n_samples.saturating_sub(n_test);

    if n_test == 0 || n_train == 0 {
        return Err(format!(
            "Split would result in empty train or test set (n_train={n_train}, n_test={n_test})"
        )
        .into());
    }

    Ok((n_train, n_test))
}

/// Shuffles `0..n_samples`, reproducibly when seeded.
fn shuffle_indices(n_samples: usize, random_state: Option<u64>) -> Vec<usize> {
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    let mut indices: Vec<usize> = (0..n_samples).collect();

    if let Some(seed) = random_state {
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);
    } else {
        let mut rng = rand::thread_rng();
        indices.shuffle(&mut rng);
    }

    indices
}

/// Splits `0..n_samples` into shuffled (train, test) index sets.
///
/// # Errors
///
/// Returns an error if `test_size` is outside (0, 1) or either side would be
/// empty.
///
/// # Examples
///
/// ```
/// use print_orient::model_selection::train_test_split_indices;
///
/// let (train, test) = train_test_split_indices(15, 0.2, Some(42)).unwrap();
/// assert_eq!(train.len(), 12);
/// assert_eq!(test.len(), 3);
/// ```
pub fn train_test_split_indices(
    n_samples: usize,
    test_size: f32,
    random_state: Option<u64>,
) -> Result<(Vec<usize>, Vec<usize>)> {
    let (n_train, _) = split_sizes(n_samples, test_size)?;
    let mut indices = shuffle_indices(n_samples, random_state);
    let test = indices.split_off(n_train);
    Ok((indices, test))
}

/// Gathers the rows of `x` and `y` at `indices`.
#[must_use]
pub fn take_rows(x: &Matrix<f32>, y: &Vector<f32>, indices: &[usize]) -> (Matrix<f32>, Vector<f32>) {
    (x.select_rows(indices), y.select(indices))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sizes_take_ceiling_of_test_share() {
        // 15 * 0.2 = 3 exactly; 11 * 0.2 = 2.2 -> 3; 26 * 0.2 = 5.2 -> 6
        assert_eq!(split_sizes(15, 0.2).expect("valid"), (12, 3));
        assert_eq!(split_sizes(11, 0.2).expect("valid"), (8, 3));
        assert_eq!(split_sizes(26, 0.2).expect("valid"), (20, 6));
        assert_eq!(split_sizes(10, 0.25).expect("valid"), (7, 3));
    }

    #[test]
    fn test_split_indices_partition() {
        let (train, test) = train_test_split_indices(20, 0.25, Some(42)).expect("valid");
        assert_eq!(train.len(), 15);
        assert_eq!(test.len(), 5);

        let mut all: Vec<usize> = train.iter().chain(test.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_reproducibility() {
        let a = train_test_split_indices(30, 0.2, Some(42)).expect("a");
        let b = train_test_split_indices(30, 0.2, Some(42)).expect("b");
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_test_size() {
        for bad in [0.0, 1.0, -0.5, 1.5, f32::NAN] {
            assert!(train_test_split_indices(10, bad, Some(0)).is_err(), "{bad}");
        }
    }

    #[test]
    fn test_empty_side_rejected() {
        // ceil(1 * 0.5) = 1 leaves no training rows
        assert!(train_test_split_indices(1, 0.5, Some(0)).is_err());
        assert!(train_test_split_indices(0, 0.5, Some(0)).is_err());
        assert!(train_test_split_indices(3, 0.1, Some(0)).is_ok());
    }

    #[test]
    fn test_take_rows_keeps_rows_aligned() {
        let x = Matrix::from_vec(10, 2, (0..20).map(|i| i as f32).collect()).expect("10x2");
        let y = Vector::from_vec((0..10).map(|i| i as f32).collect());

        let (train, test) = train_test_split_indices(10, 0.2, Some(42)).expect("split");
        let (x_train, y_train) = take_rows(&x, &y, &train);
        let (x_test, y_test) = take_rows(&x, &y, &test);
        assert_eq!(x_train.shape(), (8, 2));
        assert_eq!(x_test.shape(), (2, 2));

        // Row i of x is [2i, 2i+1] and y_i = i.
        for i in 0..x_train.n_rows() {
            assert!((x_train.get(i, 0) - 2.0 * y_train[i]).abs() < 1e-6);
        }
        for i in 0..x_test.n_rows() {
            assert!((x_test.get(i, 1) - (2.0 * y_test[i] + 1.0)).abs() < 1e-6);
        }
    }
}
