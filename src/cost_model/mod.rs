//! Filament and print-time cost model.
//!
//! Two independent regressors map the 13-column input (ten geometric slots
//! followed by the three rotation angles in degrees) to filament length and
//! print time. Both see rows standardized by one shared [`StandardScaler`].
//!
//! Training returns a [`TrainedCostModel`] value; nothing is global. The
//! model persists as three independently loadable bincode artifacts plus a
//! JSON training report.
//!
//! # Example
//!
//! ```no_run
//! use print_orient::cost_model::{CostModel, CostModelConfig};
//! use print_orient::dataset::Dataset;
//!
//! let dataset = Dataset::open("dataset.json").unwrap();
//! let model = CostModel::new(CostModelConfig::default())
//!     .fit(dataset.samples())
//!     .unwrap();
//! model.save("models").unwrap();
//! ```

mod config;

pub use config::CostModelConfig;

use crate::dataset::OrientationSample;
use crate::error::{OrientError, Result};
use crate::features::{FeatureVector, FEATURE_LEN};
use crate::metrics::{mae, rmse};
use crate::model_selection::{take_rows, train_test_split_indices};
use crate::preprocessing::StandardScaler;
use crate::primitives::{Matrix, Vector};
use crate::traits::{Regressor, Transformer};
use crate::tree::RandomForestRegressor;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Model input width: geometric slots plus three angles.
pub const INPUT_WIDTH: usize = FEATURE_LEN + 3;

/// Filament regressor artifact name.
pub const FILAMENT_MODEL_FILE: &str = "model_filament.bin";
/// Time regressor artifact name.
pub const TIME_MODEL_FILE: &str = "model_time.bin";
/// Scaler artifact name.
pub const SCALER_FILE: &str = "scaler_x.bin";
/// Training report name.
pub const REPORT_FILE: &str = "training_report.json";

/// Diagnostics from one training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Samples used
    pub n_samples: usize,
    /// Rows in the training split
    pub n_train: usize,
    /// Rows in the test split
    pub n_test: usize,
    /// Input width
    pub n_features: usize,
    /// Samples whose vector was a fallback substitute
    pub fallback_samples: usize,
    /// R² of the filament model on the training rows
    pub filament_r2_train: f32,
    /// R² of the filament model on the test rows
    pub filament_r2_test: f32,
    /// R² of the time model on the training rows
    pub time_r2_train: f32,
    /// R² of the time model on the test rows
    pub time_r2_test: f32,
    /// Mean absolute filament error on the test rows, in metres
    pub filament_mae_test: f32,
    /// Root mean squared filament error on the test rows, in metres
    pub filament_rmse_test: f32,
    /// Mean absolute time error on the test rows, in minutes
    pub time_mae_test: f32,
    /// Root mean squared time error on the test rows, in minutes
    pub time_rmse_test: f32,
    /// Hyperparameters used
    pub config: CostModelConfig,
}

/// Trains cost models.
#[derive(Debug, Clone, Default)]
pub struct CostModel {
    config: CostModelConfig,
}

impl CostModel {
    /// Creates a trainer with the given configuration.
    #[must_use]
    pub fn new(config: CostModelConfig) -> Self {
        Self { config }
    }

    /// The training configuration.
    #[must_use]
    pub fn config(&self) -> &CostModelConfig {
        &self.config
    }

    /// Trains the default random-forest pair.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientData` below the configured minimum sample count,
    /// `InvalidHyperparameter` for a bad configuration, and any fitting error.
    pub fn fit(&self, samples: &[OrientationSample]) -> Result<TrainedCostModel> {
        self.fit_with(samples, |config| {
            RandomForestRegressor::new(config.n_estimators)
                .with_max_depth(config.max_depth)
                .with_min_samples_split(config.min_samples_split)
                .with_random_state(config.random_state)
        })
    }

    /// Trains with regressors built by `make_regressor`, called once per
    /// target.
    ///
    /// # Errors
    ///
    /// Same as [`CostModel::fit`].
    pub fn fit_with<R, F>(
        &self,
        samples: &[OrientationSample],
        make_regressor: F,
    ) -> Result<TrainedCostModel<R>>
    where
        R: Regressor,
        F: Fn(&CostModelConfig) -> R,
    {
        let config = &self.config;
        config.validate()?;

        if samples.len() < config.min_samples {
            return Err(OrientError::InsufficientData {
                available: samples.len(),
                required: config.min_samples,
            });
        }

        let rows: Vec<Vec<f32>> = samples.iter().map(OrientationSample::model_input).collect();
        let x = Matrix::from_rows(&rows)?;
        let y_filament = Vector::from_vec(
            samples
                .iter()
                .map(|s| s.filament_length_m as f32)
                .collect(),
        );
        let y_time = Vector::from_vec(samples.iter().map(|s| s.time_minutes as f32).collect());

        let (train_idx, test_idx) =
            train_test_split_indices(x.n_rows(), config.test_size, Some(config.random_state))?;
        let (x_train, y_filament_train) = take_rows(&x, &y_filament, &train_idx);
        let (x_test, y_filament_test) = take_rows(&x, &y_filament, &test_idx);
        let y_time_train = y_time.select(&train_idx);
        let y_time_test = y_time.select(&test_idx);

        let mut scaler = StandardScaler::new();
        let x_train = scaler.fit_transform(&x_train)?;
        let x_test = scaler.transform(&x_test)?;

        let mut filament = make_regressor(config);
        filament.fit(&x_train, &y_filament_train)?;
        let mut time = make_regressor(config);
        time.fit(&x_train, &y_time_train)?;

        let filament_pred = filament.predict(&x_test)?;
        let time_pred = time.predict(&x_test)?;

        let report = TrainingReport {
            n_samples: samples.len(),
            n_train: train_idx.len(),
            n_test: test_idx.len(),
            n_features: x.n_cols(),
            fallback_samples: samples
                .iter()
                .filter(|s| s.vector_source == Some(crate::features::VectorSource::Fallback))
                .count(),
            filament_r2_train: filament.score(&x_train, &y_filament_train)?,
            filament_r2_test: filament.score(&x_test, &y_filament_test)?,
            time_r2_train: time.score(&x_train, &y_time_train)?,
            time_r2_test: time.score(&x_test, &y_time_test)?,
            filament_mae_test: mae(&filament_pred, &y_filament_test),
            filament_rmse_test: rmse(&filament_pred, &y_filament_test),
            time_mae_test: mae(&time_pred, &y_time_test),
            time_rmse_test: rmse(&time_pred, &y_time_test),
            config: config.clone(),
        };

        log::info!(
            "trained on {} rows ({} test): filament R² {:.3}/{:.3}, time R² {:.3}/{:.3}",
            report.n_train,
            report.n_test,
            report.filament_r2_train,
            report.filament_r2_test,
            report.time_r2_train,
            report.time_r2_test
        );

        let mut model = TrainedCostModel::from_parts(filament, time, scaler)?;
        model.report = Some(report);
        Ok(model)
    }
}

/// A fitted scaler plus the filament and time regressors fitted on its
/// output. Read-only after construction.
#[derive(Debug, Clone)]
pub struct TrainedCostModel<R = RandomForestRegressor> {
    filament: R,
    time: R,
    scaler: StandardScaler,
    report: Option<TrainingReport>,
}

impl<R: Regressor> TrainedCostModel<R> {
    /// Assembles a model from fitted parts.
    ///
    /// # Errors
    ///
    /// Returns `NotFitted` if a part is unfitted and `InconsistentModelState`
    /// if the regressors were fitted on a different width than the scaler.
    pub fn from_parts(filament: R, time: R, scaler: StandardScaler) -> Result<Self> {
        let width = scaler.n_features().ok_or_else(|| OrientError::NotFitted {
            what: "StandardScaler".to_string(),
        })?;

        for (name, regressor) in [("filament model", &filament), ("time model", &time)] {
            match regressor.n_features() {
                None => {
                    return Err(OrientError::NotFitted {
                        what: name.to_string(),
                    })
                }
                Some(n) if n != width => return Err(OrientError::width_mismatch(name, width, n)),
                Some(_) => {}
            }
        }

        Ok(Self {
            filament,
            time,
            scaler,
            report: None,
        })
    }

    /// Input width every prediction must have.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.scaler.n_features().unwrap_or_default()
    }

    /// Predicts `(filament_m, time_min)` for one input row.
    ///
    /// # Errors
    ///
    /// Returns `InconsistentModelState` if `input` is not exactly
    /// [`TrainedCostModel::n_features`] wide. Inputs are never padded.
    pub fn predict(&self, input: &[f32]) -> Result<(f32, f32)> {
        let scaled = self.scaler.transform_row(input)?;
        let x = Matrix::from_vec(1, scaled.len(), scaled)?;
        let filament = self.filament.predict(&x)?;
        let time = self.time.predict(&x)?;
        Ok((filament[0], time[0]))
    }

    /// Predicts for a feature vector in the given orientation (degrees).
    ///
    /// # Errors
    ///
    /// Same as [`TrainedCostModel::predict`].
    pub fn predict_orientation(&self, vector: &FeatureVector, angles: [f64; 3]) -> Result<(f32, f32)> {
        self.predict(&vector.with_angles(angles))
    }

    /// The fitted scaler.
    #[must_use]
    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    /// The filament regressor.
    #[must_use]
    pub fn filament_model(&self) -> &R {
        &self.filament
    }

    /// The time regressor.
    #[must_use]
    pub fn time_model(&self) -> &R {
        &self.time
    }

    /// Diagnostics from training, if known.
    #[must_use]
    pub fn report(&self) -> Option<&TrainingReport> {
        self.report.as_ref()
    }
}

impl<R: Regressor + Serialize> TrainedCostModel<R> {
    /// Writes the three artifacts (and the report, when present) into `dir`.
    ///
    /// # Errors
    ///
    /// Returns I/O or serialization errors.
    pub fn save<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        save_artifact(&dir.join(FILAMENT_MODEL_FILE), &self.filament)?;
        save_artifact(&dir.join(TIME_MODEL_FILE), &self.time)?;
        save_artifact(&dir.join(SCALER_FILE), &self.scaler)?;
        if let Some(report) = &self.report {
            std::fs::write(dir.join(REPORT_FILE), serde_json::to_string_pretty(report)?)?;
        }
        log::info!("saved cost model to {}", dir.display());
        Ok(())
    }
}

impl<R: Regressor + DeserializeOwned> TrainedCostModel<R> {
    /// Loads the three artifacts from `dir` as a matched triple.
    ///
    /// # Errors
    ///
    /// Returns `MissingArtifact` for an absent file, serialization errors for
    /// a corrupt one, and `InconsistentModelState` when the widths disagree.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let filament: R = load_artifact(&dir.join(FILAMENT_MODEL_FILE), "filament model")?;
        let time: R = load_artifact(&dir.join(TIME_MODEL_FILE), "time model")?;
        let scaler: StandardScaler = load_artifact(&dir.join(SCALER_FILE), "feature scaler")?;

        let mut model = Self::from_parts(filament, time, scaler)?;
        model.report = read_report(&dir.join(REPORT_FILE));
        log::info!(
            "loaded cost model from {} ({} features)",
            dir.display(),
            model.n_features()
        );
        Ok(model)
    }
}

/// Serializes one artifact with bincode.
///
/// # Errors
///
/// Returns I/O or serialization errors.
pub fn save_artifact<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let bytes = bincode::serialize(value)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Deserializes one bincode artifact.
///
/// # Errors
///
/// Returns `MissingArtifact` if the file does not exist.
pub fn load_artifact<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    if !path.exists() {
        return Err(OrientError::missing(path, what));
    }
    let bytes = std::fs::read(path)?;
    Ok(bincode::deserialize(&bytes)?)
}

fn read_report(path: &Path) -> Option<TrainingReport> {
    let text = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&text) {
        Ok(report) => Some(report),
        Err(e) => {
            log::warn!("ignoring unreadable {}: {e}", path.display());
            None
        }
    }
}
