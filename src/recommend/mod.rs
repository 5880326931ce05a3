//! Orientation recommendation over a fixed candidate set.
//!
//! Each candidate orientation is scored as
//! `0.7 * predicted_filament_m + 0.3 * predicted_time_min`; lower is better.
//!
//! # Quick Start
//!
//! ```no_run
//! use print_orient::cost_model::TrainedCostModel;
//! use print_orient::features::extract_from_path;
//! use print_orient::recommend::OrientationRecommender;
//!
//! let model: TrainedCostModel = TrainedCostModel::load("models").unwrap();
//! let extraction = extract_from_path("bracket.stl");
//!
//! let ranked = OrientationRecommender::new(&model)
//!     .recommend(extraction.vector.as_slice(), 5)
//!     .unwrap();
//! println!("best: {:?}", ranked[0].angles);
//! ```

mod report;

pub use report::{
    default_report_name, AngleTriple, BestOrientation, RankedOrientation, RecommendationReport,
    Savings,
};

use crate::cost_model::TrainedCostModel;
use crate::error::Result;
use crate::features::FeatureVector;
use crate::traits::Regressor;
use crate::tree::RandomForestRegressor;
use serde::{Deserialize, Serialize};

/// Candidate rotations (x, y, z) in degrees, in evaluation order.
pub const CANDIDATE_ANGLES: [[f64; 3]; 13] = [
    [0.0, 0.0, 0.0],
    [90.0, 0.0, 0.0],
    [0.0, 90.0, 0.0],
    [0.0, 0.0, 90.0],
    [45.0, 0.0, 0.0],
    [0.0, 45.0, 0.0],
    [0.0, 0.0, 45.0],
    [45.0, 45.0, 0.0],
    [45.0, 0.0, 45.0],
    [0.0, 45.0, 45.0],
    [45.0, 45.0, 45.0],
    [30.0, 60.0, 0.0],
    [60.0, 30.0, 0.0],
];

/// Weight of filament length in the score.
pub const FILAMENT_WEIGHT: f64 = 0.7;

/// Weight of print time in the score.
pub const TIME_WEIGHT: f64 = 0.3;

/// Combined cost of an orientation; lower is better.
///
/// # Examples
///
/// ```
/// use print_orient::recommend::score;
///
/// assert!((score(10.0, 100.0) - 37.0).abs() < 1e-9);
/// ```
#[must_use]
pub fn score(filament_m: f64, time_min: f64) -> f64 {
    FILAMENT_WEIGHT * filament_m + TIME_WEIGHT * time_min
}

/// One evaluated orientation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientationCandidate {
    /// Rotation (x, y, z) in degrees
    pub angles: [f64; 3],
    /// Predicted filament length in metres
    pub predicted_filament_m: f64,
    /// Predicted print time in minutes
    pub predicted_time_min: f64,
    /// Weighted cost
    pub score: f64,
}

impl OrientationCandidate {
    /// True for the unrotated orientation.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.angles == [0.0, 0.0, 0.0]
    }
}

/// Ranks [`CANDIDATE_ANGLES`] with a borrowed cost model.
///
/// Stateless apart from the borrow; the model is never mutated.
#[derive(Debug)]
pub struct OrientationRecommender<'a, R = RandomForestRegressor> {
    model: &'a TrainedCostModel<R>,
}

impl<'a, R: Regressor + Sync> OrientationRecommender<'a, R> {
    /// Wraps a trained model.
    #[must_use]
    pub fn new(model: &'a TrainedCostModel<R>) -> Self {
        Self { model }
    }

    fn evaluate(&self, vector: &FeatureVector, angles: [f64; 3]) -> Result<OrientationCandidate> {
        let (filament, time) = self.model.predict_orientation(vector, angles)?;
        let (filament, time) = (f64::from(filament), f64::from(time));
        Ok(OrientationCandidate {
            angles,
            predicted_filament_m: filament,
            predicted_time_min: time,
            score: score(filament, time),
        })
    }

    /// Evaluates every candidate, in [`CANDIDATE_ANGLES`] order.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` unless `vector` has exactly ten values,
    /// and propagates model errors. No partial result is returned.
    pub fn evaluate_all(&self, vector: &[f64]) -> Result<Vec<OrientationCandidate>> {
        let vector = FeatureVector::try_from(vector)?;

        #[cfg(feature = "parallel")]
        let candidates: Result<Vec<OrientationCandidate>> = {
            use rayon::prelude::*;
            CANDIDATE_ANGLES[..]
                .par_iter()
                .map(|&angles| self.evaluate(&vector, angles))
                .collect()
        };

        #[cfg(not(feature = "parallel"))]
        let candidates: Result<Vec<OrientationCandidate>> = CANDIDATE_ANGLES
            .iter()
            .map(|&angles| self.evaluate(&vector, angles))
            .collect();

        candidates
    }

    /// The `min(top_k, 13)` best candidates, ascending by score.
    ///
    /// Ties keep candidate order.
    ///
    /// # Errors
    ///
    /// Same as [`OrientationRecommender::evaluate_all`].
    pub fn recommend(&self, vector: &[f64], top_k: usize) -> Result<Vec<OrientationCandidate>> {
        let mut candidates = self.evaluate_all(vector)?;
        candidates.sort_by(|a, b| a.score.total_cmp(&b.score));
        candidates.truncate(top_k);
        log::debug!(
            "ranked {} candidates, best {:?} (score {:.2})",
            CANDIDATE_ANGLES.len(),
            candidates.first().map(|c| c.angles),
            candidates.first().map_or(f64::NAN, |c| c.score)
        );
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests;
