//! Helper functions for regression tree building.
//!
//! Trees are grown over index sets into the caller's matrix, so no
//! sub-matrices are copied while recursing.

use super::{RegressionLeaf, RegressionNode, RegressionTreeNode};
use crate::primitives::Matrix;

/// Stopping rules shared by every node of one tree.
#[derive(Debug, Clone, Copy)]
pub(super) struct GrowthLimits {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

/// Mean of the targets selected by `indices`.
pub(super) fn mean_at(y: &[f32], indices: &[usize]) -> f32 {
    if indices.is_empty() {
        return 0.0;
    }
    indices.iter().map(|&i| y[i]).sum::<f32>() / indices.len() as f32
}

/// Population variance of the targets selected by `indices`.
pub(super) fn variance_at(y: &[f32], indices: &[usize]) -> f32 {
    if indices.len() <= 1 {
        return 0.0;
    }
    let mean = mean_at(y, indices);
    indices.iter().map(|&i| (y[i] - mean).powi(2)).sum::<f32>() / indices.len() as f32
}

/// Best threshold on one feature, as (threshold, variance reduction).
///
/// Candidate thresholds are midpoints between consecutive distinct values.
/// Splits that leave fewer than `min_samples_leaf` samples on a side are
/// skipped. Running sums make each candidate O(1) after the sort.
fn best_split_for_feature(
    x: &Matrix<f32>,
    y: &[f32],
    indices: &[usize],
    feature_idx: usize,
    current_variance: f32,
    min_samples_leaf: usize,
) -> Option<(f32, f32)> {
    let mut pairs: Vec<(f32, f32)> = indices
        .iter()
        .map(|&i| (x.get(i, feature_idx), y[i]))
        .collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

    let n = pairs.len();
    let total_sum: f64 = pairs.iter().map(|p| f64::from(p.1)).sum();
    let total_sq: f64 = pairs.iter().map(|p| f64::from(p.1).powi(2)).sum();

    let mut left_sum = 0.0_f64;
    let mut left_sq = 0.0_f64;
    let mut best: Option<(f32, f32)> = None;

    for k in 0..n.saturating_sub(1) {
        let yk = f64::from(pairs[k].1);
        left_sum += yk;
        left_sq += yk * yk;

        // Only split between distinct feature values.
        if pairs[k].0 == pairs[k + 1].0 {
            continue;
        }

        let n_left = k + 1;
        let n_right = n - n_left;
        if n_left < min_samples_leaf || n_right < min_samples_leaf {
            continue;
        }

        let right_sum = total_sum - left_sum;
        let right_sq = total_sq - left_sq;
        let var_left = (left_sq / n_left as f64 - (left_sum / n_left as f64).powi(2)).max(0.0);
        let var_right =
            (right_sq / n_right as f64 - (right_sum / n_right as f64).powi(2)).max(0.0);
        let weighted =
            (n_left as f64 * var_left + n_right as f64 * var_right) / n as f64;
        let gain = current_variance - weighted as f32;

        if gain > 0.0 && best.map_or(true, |(_, g)| gain > g) {
            let threshold = (pairs[k].0 + pairs[k + 1].0) / 2.0;
            best = Some((threshold, gain));
        }
    }

    best
}

/// Best split over all features as (feature_idx, threshold, gain).
///
/// Ties keep the lowest feature index.
pub(super) fn find_best_split(
    x: &Matrix<f32>,
    y: &[f32],
    indices: &[usize],
    min_samples_leaf: usize,
) -> Option<(usize, f32, f32)> {
    if indices.len() < 2 {
        return None;
    }

    let current_variance = variance_at(y, indices);
    let mut best: Option<(usize, f32, f32)> = None;

    for feature_idx in 0..x.n_cols() {
        if let Some((threshold, gain)) = best_split_for_feature(
            x,
            y,
            indices,
            feature_idx,
            current_variance,
            min_samples_leaf,
        ) {
            if best.map_or(true, |(_, _, g)| gain > g) {
                best = Some((feature_idx, threshold, gain));
            }
        }
    }

    best
}

fn make_leaf(y: &[f32], indices: &[usize]) -> RegressionTreeNode {
    RegressionTreeNode::Leaf(RegressionLeaf {
        value: mean_at(y, indices),
        n_samples: indices.len(),
    })
}

/// Builds a regression tree recursively over `indices`.
pub(super) fn build_regression_tree(
    x: &Matrix<f32>,
    y: &[f32],
    indices: &[usize],
    depth: usize,
    limits: GrowthLimits,
) -> RegressionTreeNode {
    let at_max_depth = limits.max_depth.is_some_and(|max_d| depth >= max_d);
    if indices.len() < limits.min_samples_split
        || at_max_depth
        || variance_at(y, indices) < 1e-10
    {
        return make_leaf(y, indices);
    }

    let Some((feature_idx, threshold, _gain)) =
        find_best_split(x, y, indices, limits.min_samples_leaf)
    else {
        return make_leaf(y, indices);
    };

    let (left, right): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .partition(|&&i| x.get(i, feature_idx) <= threshold);

    if left.is_empty() || right.is_empty() {
        return make_leaf(y, indices);
    }

    RegressionTreeNode::Node(RegressionNode {
        feature_idx,
        threshold,
        n_samples: indices.len(),
        impurity_decrease: variance_at(y, indices) * indices.len() as f32
            - variance_at(y, &left) * left.len() as f32
            - variance_at(y, &right) * right.len() as f32,
        left: Box::new(build_regression_tree(x, y, &left, depth + 1, limits)),
        right: Box::new(build_regression_tree(x, y, &right, depth + 1, limits)),
    })
}

/// Accumulates weighted impurity decrease per feature.
pub(super) fn accumulate_importances(node: &RegressionTreeNode, importances: &mut [f32]) {
    if let RegressionTreeNode::Node(n) = node {
        importances[n.feature_idx] += n.impurity_decrease.max(0.0);
        accumulate_importances(&n.left, importances);
        accumulate_importances(&n.right, importances);
    }
}

/// Creates a bootstrap sample (random sample with replacement).
pub(super) fn bootstrap_sample(n_samples: usize, random_state: Option<u64>) -> Vec<usize> {
    use rand::distributions::{Distribution, Uniform};
    use rand::SeedableRng;

    let dist = Uniform::from(0..n_samples);

    if let Some(seed) = random_state {
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        (0..n_samples).map(|_| dist.sample(&mut rng)).collect()
    } else {
        let mut rng = rand::thread_rng();
        (0..n_samples).map(|_| dist.sample(&mut rng)).collect()
    }
}
