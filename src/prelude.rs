//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use print_orient::prelude::*;
//! ```

pub use crate::cost_model::{CostModel, CostModelConfig, TrainedCostModel};
pub use crate::dataset::{Dataset, OrientationSample};
pub use crate::error::OrientError;
pub use crate::features::{extract_from_path, Extraction, FeatureVector, VectorSource};
pub use crate::metrics::{mae, mse, r_squared, rmse};
pub use crate::preprocessing::StandardScaler;
pub use crate::primitives::{Matrix, Vector};
pub use crate::recommend::{
    OrientationCandidate, OrientationRecommender, RecommendationReport, CANDIDATE_ANGLES,
};
pub use crate::traits::{Regressor, Transformer};
pub use crate::tree::RandomForestRegressor;
