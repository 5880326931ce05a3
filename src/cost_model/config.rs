//! Training hyperparameters.

use crate::error::{OrientError, Result};
use serde::{Deserialize, Serialize};

/// Hyperparameters for [`super::CostModel`].
///
/// Defaults: 100 trees, depth 10, at least 5 samples to split a node, 20%
/// held out with seed 42, at least 10 samples overall.
///
/// # Examples
///
/// ```
/// use print_orient::cost_model::CostModelConfig;
///
/// let config = CostModelConfig::default().with_n_estimators(20).with_random_state(7);
/// assert_eq!(config.n_estimators, 20);
/// assert_eq!(config.max_depth, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostModelConfig {
    /// Trees per forest
    pub n_estimators: usize,
    /// Maximum tree depth
    pub max_depth: usize,
    /// Minimum samples to split an internal node
    pub min_samples_split: usize,
    /// Held-out fraction
    pub test_size: f32,
    /// Seed for the split and the bootstrap samples
    pub random_state: u64,
    /// Minimum clean samples required to train
    pub min_samples: usize,
}

impl Default for CostModelConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: 10,
            min_samples_split: 5,
            test_size: 0.2,
            random_state: 42,
            min_samples: 10,
        }
    }
}

impl CostModelConfig {
    /// Sets the number of trees per forest.
    #[must_use]
    pub fn with_n_estimators(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators;
        self
    }

    /// Sets the maximum tree depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the minimum samples to split a node.
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    /// Sets the held-out fraction.
    #[must_use]
    pub fn with_test_size(mut self, test_size: f32) -> Self {
        self.test_size = test_size;
        self
    }

    /// Sets the random seed.
    #[must_use]
    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = random_state;
        self
    }

    /// Sets the minimum number of training samples.
    #[must_use]
    pub fn with_min_samples(mut self, min_samples: usize) -> Self {
        self.min_samples = min_samples;
        self
    }

    /// Checks every field against its valid range.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHyperparameter` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let invalid = |param: &str, value: String, constraint: &str| {
            Err(OrientError::InvalidHyperparameter {
                param: param.to_string(),
                value,
                constraint: constraint.to_string(),
            })
        };

        if self.n_estimators == 0 {
            return invalid("n_estimators", "0".to_string(), ">= 1");
        }
        if self.max_depth == 0 {
            return invalid("max_depth", "0".to_string(), ">= 1");
        }
        if self.min_samples_split < 2 {
            return invalid(
                "min_samples_split",
                self.min_samples_split.to_string(),
                ">= 2",
            );
        }
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return invalid("test_size", self.test_size.to_string(), "in (0, 1)");
        }
        if self.min_samples < 2 {
            return invalid("min_samples", self.min_samples.to_string(), ">= 2");
        }
        Ok(())
    }
}
