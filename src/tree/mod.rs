//! Regression trees and the random-forest ensemble.
//!
//! This module implements:
//! - CART regression trees using variance reduction (MSE) as split criterion
//! - Random Forest regressor (bootstrap aggregation of CART trees)
//!
//! Both implement [`Regressor`], which is the only interface the cost model
//! uses.
//!
//! # Example
//!
//! ```
//! use print_orient::prelude::*;
//! use print_orient::tree::RandomForestRegressor;
//!
//! let x = Matrix::from_vec(8, 1, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]).unwrap();
//! let y = Vector::from_slice(&[1.0, 1.0, 1.0, 1.0, 9.0, 9.0, 9.0, 9.0]);
//!
//! let mut forest = RandomForestRegressor::new(20)
//!     .with_max_depth(4)
//!     .with_random_state(42);
//! forest.fit(&x, &y).expect("fit should succeed");
//! let predictions = forest.predict(&x).expect("same width");
//! assert!(predictions[0] < predictions[7]);
//! ```

mod helpers;

use crate::error::{OrientError, Result};
use crate::primitives::{Matrix, Vector};
use crate::traits::Regressor;
use helpers::GrowthLimits;
use serde::{Deserialize, Serialize};

/// Leaf node in a regression tree.
///
/// Holds the mean of the training targets that reached it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionLeaf {
    /// Predicted value for this leaf (mean of y values)
    pub value: f32,
    /// Number of training samples in this leaf
    pub n_samples: usize,
}

/// Internal node in a regression tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionNode {
    /// Index of the feature to split on
    pub feature_idx: usize,
    /// Threshold value for the split
    pub threshold: f32,
    /// Training samples that reached this node
    pub n_samples: usize,
    /// Sample-weighted variance removed by this split
    pub impurity_decrease: f32,
    /// Left subtree (samples where feature <= threshold)
    pub left: Box<RegressionTreeNode>,
    /// Right subtree (samples where feature > threshold)
    pub right: Box<RegressionTreeNode>,
}

/// A node in a regression tree (either internal node or leaf).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RegressionTreeNode {
    /// Internal decision node with split condition
    Node(RegressionNode),
    /// Leaf node with value prediction
    Leaf(RegressionLeaf),
}

impl RegressionTreeNode {
    /// Returns the depth of the tree rooted at this node.
    ///
    /// Leaf nodes have depth 0, internal nodes have depth 1 + max(left, right).
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            RegressionTreeNode::Leaf(_) => 0,
            RegressionTreeNode::Node(node) => 1 + node.left.depth().max(node.right.depth()),
        }
    }

    /// Walks the tree for one sample.
    fn predict_one(&self, sample: &[f32]) -> f32 {
        let mut node = self;
        loop {
            match node {
                RegressionTreeNode::Leaf(leaf) => return leaf.value,
                RegressionTreeNode::Node(internal) => {
                    node = if sample[internal.feature_idx] <= internal.threshold {
                        &internal.left
                    } else {
                        &internal.right
                    };
                }
            }
        }
    }
}

/// Decision tree regressor using the CART algorithm.
///
/// Uses variance reduction as splitting criterion; leaves predict the mean of
/// their training targets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTreeRegressor {
    tree: Option<RegressionTreeNode>,
    n_features: Option<usize>,
    max_depth: Option<usize>,
    min_samples_split: usize,
    min_samples_leaf: usize,
}

impl DecisionTreeRegressor {
    /// Creates a new decision tree regressor with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: None,
            n_features: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }

    /// Sets the maximum depth of the tree (root has depth 0).
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Sets the minimum number of samples required to split an internal node
    /// (clamped to >= 2).
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples.max(2);
        self
    }

    /// Sets the minimum number of samples required at a leaf (clamped to >= 1).
    #[must_use]
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples.max(1);
        self
    }

    /// Depth of the fitted tree, `None` before `fit`.
    #[must_use]
    pub fn depth(&self) -> Option<usize> {
        self.tree.as_ref().map(RegressionTreeNode::depth)
    }

    fn limits(&self) -> GrowthLimits {
        GrowthLimits {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
        }
    }

    /// Fits on the given row indices of `x` (repeats allowed).
    fn fit_indices(&mut self, x: &Matrix<f32>, y: &[f32], indices: &[usize]) {
        self.tree = Some(helpers::build_regression_tree(
            x,
            y,
            indices,
            0,
            self.limits(),
        ));
        self.n_features = Some(x.n_cols());
    }

    fn fitted_tree(&self) -> Result<&RegressionTreeNode> {
        self.tree.as_ref().ok_or_else(|| OrientError::NotFitted {
            what: "DecisionTreeRegressor".to_string(),
        })
    }

    /// Predicts a single sample.
    ///
    /// # Errors
    ///
    /// Returns an error if unfitted or the sample width differs from the
    /// training width.
    pub fn predict_row(&self, sample: &[f32]) -> Result<f32> {
        let tree = self.fitted_tree()?;
        check_width("decision tree", self.n_features, sample.len())?;
        Ok(tree.predict_one(sample))
    }
}

impl Default for DecisionTreeRegressor {
    fn default() -> Self {
        Self::new()
    }
}

impl Regressor for DecisionTreeRegressor {
    fn fit(&mut self, x: &Matrix<f32>, y: &Vector<f32>) -> Result<()> {
        validate_training_data(x, y)?;
        let indices: Vec<usize> = (0..x.n_rows()).collect();
        self.fit_indices(x, y.as_slice(), &indices);
        Ok(())
    }

    fn predict(&self, x: &Matrix<f32>) -> Result<Vector<f32>> {
        let tree = self.fitted_tree()?;
        check_width("decision tree", self.n_features, x.n_cols())?;
        Ok(Vector::from_vec(
            (0..x.n_rows())
                .map(|row| tree.predict_one(x.row_slice(row)))
                .collect(),
        ))
    }

    fn n_features(&self) -> Option<usize> {
        self.n_features
    }
}

/// Random Forest Regressor.
///
/// Ensemble of CART regression trees, each trained on a bootstrap sample of
/// the rows. Predictions are the mean over all trees.
///
/// With `random_state` set, tree `i` draws its bootstrap sample from seed
/// `random_state + i`, so fitting is reproducible and the same with or
/// without the `parallel` feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    trees: Vec<DecisionTreeRegressor>,
    n_estimators: usize,
    max_depth: Option<usize>,
    min_samples_split: usize,
    min_samples_leaf: usize,
    random_state: Option<u64>,
    n_features: Option<usize>,
}

impl RandomForestRegressor {
    /// Creates a new Random Forest regressor with `n_estimators` trees.
    #[must_use]
    pub fn new(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            random_state: None,
            n_features: None,
        }
    }

    /// Sets the maximum depth for each tree.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Sets the minimum samples required to split a node in each tree.
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples.max(2);
        self
    }

    /// Sets the minimum samples per leaf in each tree.
    #[must_use]
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples.max(1);
        self
    }

    /// Sets the random state for reproducibility.
    #[must_use]
    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = Some(random_state);
        self
    }

    /// Number of fitted trees.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Configured number of trees.
    #[must_use]
    pub fn n_estimators(&self) -> usize {
        self.n_estimators
    }

    fn template_tree(&self) -> DecisionTreeRegressor {
        let tree = DecisionTreeRegressor::new()
            .with_min_samples_split(self.min_samples_split)
            .with_min_samples_leaf(self.min_samples_leaf);
        match self.max_depth {
            Some(depth) => tree.with_max_depth(depth),
            None => tree,
        }
    }

    fn fit_one(&self, x: &Matrix<f32>, y: &[f32], tree_idx: usize) -> DecisionTreeRegressor {
        let seed = self
            .random_state
            .map(|s| s.wrapping_add(tree_idx as u64));
        let bootstrap = helpers::bootstrap_sample(x.n_rows(), seed);
        let mut tree = self.template_tree();
        tree.fit_indices(x, y, &bootstrap);
        tree
    }

    /// Predicts a single sample by averaging all trees.
    ///
    /// # Errors
    ///
    /// Returns an error if unfitted or the sample width differs from the
    /// training width.
    pub fn predict_row(&self, sample: &[f32]) -> Result<f32> {
        self.check_fitted()?;
        check_width("random forest", self.n_features, sample.len())?;
        let total: f32 = self
            .trees
            .iter()
            .filter_map(|t| t.tree.as_ref())
            .map(|t| t.predict_one(sample))
            .sum();
        Ok(total / self.trees.len() as f32)
    }

    fn check_fitted(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(OrientError::NotFitted {
                what: "RandomForestRegressor".to_string(),
            });
        }
        Ok(())
    }

    /// Returns feature importances based on mean decrease in variance,
    /// normalized to sum to 1.0. `None` before `fit`.
    #[must_use]
    pub fn feature_importances(&self) -> Option<Vec<f32>> {
        let n_features = self.n_features?;
        if self.trees.is_empty() {
            return None;
        }

        let mut total = vec![0.0; n_features];
        for tree in self.trees.iter().filter_map(|t| t.tree.as_ref()) {
            helpers::accumulate_importances(tree, &mut total);
        }

        let sum: f32 = total.iter().sum();
        if sum > 0.0 {
            for importance in &mut total {
                *importance /= sum;
            }
        }

        Some(total)
    }
}

impl Default for RandomForestRegressor {
    fn default() -> Self {
        Self::new(10)
    }
}

impl Regressor for RandomForestRegressor {
    fn fit(&mut self, x: &Matrix<f32>, y: &Vector<f32>) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(OrientError::InvalidHyperparameter {
                param: "n_estimators".to_string(),
                value: "0".to_string(),
                constraint: ">= 1".to_string(),
            });
        }
        validate_training_data(x, y)?;

        let targets = y.as_slice();

        #[cfg(feature = "parallel")]
        let trees: Vec<DecisionTreeRegressor> = {
            use rayon::prelude::*;
            (0..self.n_estimators)
                .into_par_iter()
                .map(|i| self.fit_one(x, targets, i))
                .collect()
        };

        #[cfg(not(feature = "parallel"))]
        let trees: Vec<DecisionTreeRegressor> = (0..self.n_estimators)
            .map(|i| self.fit_one(x, targets, i))
            .collect();

        log::debug!(
            "fitted random forest: {} trees on {}x{} matrix",
            trees.len(),
            x.n_rows(),
            x.n_cols()
        );

        self.trees = trees;
        self.n_features = Some(x.n_cols());
        Ok(())
    }

    fn predict(&self, x: &Matrix<f32>) -> Result<Vector<f32>> {
        self.check_fitted()?;
        check_width("random forest", self.n_features, x.n_cols())?;

        let predictions = (0..x.n_rows())
            .map(|row| self.predict_row(x.row_slice(row)))
            .collect::<Result<Vec<f32>>>()?;
        Ok(Vector::from_vec(predictions))
    }

    fn n_features(&self) -> Option<usize> {
        self.n_features
    }
}

fn validate_training_data(x: &Matrix<f32>, y: &Vector<f32>) -> Result<()> {
    let n_rows = x.n_rows();
    if n_rows != y.len() {
        return Err(OrientError::dimension_mismatch("samples", n_rows, y.len()));
    }
    if n_rows == 0 {
        return Err("Cannot fit with zero samples".into());
    }
    if x.n_cols() == 0 {
        return Err("Cannot fit with zero features".into());
    }
    Ok(())
}

fn check_width(context: &str, fitted: Option<usize>, actual: usize) -> Result<()> {
    match fitted {
        Some(expected) if expected != actual => {
            Err(OrientError::width_mismatch(context, expected, actual))
        }
        _ => Ok(()),
    }
}
