//! JSON report for one recommendation run.

use super::OrientationCandidate;
use crate::error::Result;
use crate::features::{Extraction, VectorSource};
use crate::metrics::round_to;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Rotation written as `{"x": .., "y": .., "z": ..}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleTriple {
    /// Degrees about X
    pub x: f64,
    /// Degrees about Y
    pub y: f64,
    /// Degrees about Z
    pub z: f64,
}

impl From<[f64; 3]> for AngleTriple {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }
}

/// One ranked entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedOrientation {
    /// 1-based rank
    pub rank: usize,
    /// Rotation
    pub angles: AngleTriple,
    /// Filament in metres, 2 decimals
    pub predicted_filament_m: f64,
    /// Time in minutes, 1 decimal
    pub predicted_time_min: f64,
    /// Score, 2 decimals
    pub score: f64,
}

/// The top-ranked orientation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestOrientation {
    /// Rotation
    pub angles: AngleTriple,
    /// Filament in metres, 2 decimals
    pub predicted_filament_m: f64,
    /// Time in minutes, 1 decimal
    pub predicted_time_min: f64,
}

/// Improvement of the best orientation over (0, 0, 0). Only positive
/// savings are reported.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Savings {
    /// Filament saved in metres
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filament_m: Option<f64>,
    /// Filament saved as a percentage of the default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filament_percent: Option<f64>,
    /// Time saved in minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_min: Option<f64>,
    /// Time saved as a percentage of the default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_percent: Option<f64>,
}

impl Savings {
    fn between(default: &OrientationCandidate, best: &OrientationCandidate) -> Option<Self> {
        let filament = default.predicted_filament_m - best.predicted_filament_m;
        let time = default.predicted_time_min - best.predicted_time_min;
        if filament <= 0.0 && time <= 0.0 {
            return None;
        }

        let percent = |saved: f64, base: f64| (base > 0.0).then(|| round_to(saved / base * 100.0, 1));
        let mut savings = Self::default();
        if filament > 0.0 {
            savings.filament_m = Some(round_to(filament, 2));
            savings.filament_percent = percent(filament, default.predicted_filament_m);
        }
        if time > 0.0 {
            savings.time_min = Some(round_to(time, 1));
            savings.time_percent = percent(time, default.predicted_time_min);
        }
        Some(savings)
    }
}

/// Everything written for one mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationReport {
    /// Source mesh path as given
    pub stl_file: String,
    /// Feature vector used
    pub stl_vector: Vec<f64>,
    /// Whether the vector was measured
    pub vector_source: VectorSource,
    /// Ranked candidates, best first
    pub recommendations: Vec<RankedOrientation>,
    /// The first entry of `recommendations`
    pub best_orientation: Option<BestOrientation>,
    /// Savings against (0, 0, 0) when it was ranked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub savings_vs_default: Option<Savings>,
}

impl RecommendationReport {
    /// Builds the report from ranked candidates (best first).
    #[must_use]
    pub fn new(stl_file: &str, extraction: &Extraction, ranked: &[OrientationCandidate]) -> Self {
        let recommendations = ranked
            .iter()
            .enumerate()
            .map(|(i, c)| RankedOrientation {
                rank: i + 1,
                angles: c.angles.into(),
                predicted_filament_m: round_to(c.predicted_filament_m, 2),
                predicted_time_min: round_to(c.predicted_time_min, 1),
                score: round_to(c.score, 2),
            })
            .collect();

        let best = ranked.first();
        let best_orientation = best.map(|c| BestOrientation {
            angles: c.angles.into(),
            predicted_filament_m: round_to(c.predicted_filament_m, 2),
            predicted_time_min: round_to(c.predicted_time_min, 1),
        });

        let savings_vs_default = best.and_then(|best| {
            ranked
                .iter()
                .find(|c| c.is_default())
                .and_then(|default| Savings::between(default, best))
        });

        Self {
            stl_file: stl_file.to_string(),
            stl_vector: extraction.vector.as_slice().to_vec(),
            vector_source: extraction.source,
            recommendations,
            best_orientation,
            savings_vs_default,
        }
    }

    /// Writes the report as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns I/O or serialization errors.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path.as_ref(), serde_json::to_string_pretty(self)?)?;
        log::info!("wrote recommendations to {}", path.as_ref().display());
        Ok(())
    }
}

/// `orientation_recommendation_<stem>.json` for a mesh path.
///
/// # Examples
///
/// ```
/// use print_orient::recommend::default_report_name;
///
/// assert_eq!(
///     default_report_name("parts/bracket.stl"),
///     "orientation_recommendation_bracket.json"
/// );
/// ```
#[must_use]
pub fn default_report_name<P: AsRef<Path>>(stl_path: P) -> String {
    let stem = stl_path
        .as_ref()
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("orientation_recommendation_{stem}.json")
}
