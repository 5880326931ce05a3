//! print-orient: print orientation recommendation from mesh geometry.
//!
//! The pipeline measures an STL mesh into a ten-slot feature vector, predicts
//! filament length and print time for a candidate rotation with a pair of
//! random-forest regressors, and ranks a fixed set of 13 rotations by
//! `0.7 * filament + 0.3 * time`.
//!
//! # Quick Start
//!
//! ```
//! use print_orient::prelude::*;
//! use print_orient::features::coerce;
//!
//! // Twelve samples of one block printed in different orientations.
//! let samples: Vec<OrientationSample> = CANDIDATE_ANGLES
//!     .iter()
//!     .cycle()
//!     .take(12)
//!     .enumerate()
//!     .map(|(i, &[x, y, z])| OrientationSample {
//!         model_name: "block".into(),
//!         stl_path: format!("block{i}.stl"),
//!         json_path: String::new(),
//!         stl_vector: coerce(&[20.0, 20.0, 10.0, 4000.0, 1600.0, 8.0, 12.0, 10.0, 10.0, 5.0]),
//!         angle_x: x,
//!         angle_y: y,
//!         angle_z: z,
//!         filament_length_m: 1.0 + x / 10.0,
//!         time_minutes: 30.0 + y,
//!         features: None,
//!         vector_source: None,
//!     })
//!     .collect();
//!
//! let model = CostModel::new(CostModelConfig::default().with_n_estimators(10))
//!     .fit(&samples)
//!     .unwrap();
//! let ranked = OrientationRecommender::new(&model)
//!     .recommend(samples[0].stl_vector.as_slice(), 3)
//!     .unwrap();
//! assert_eq!(ranked.len(), 3);
//! assert!(ranked[0].score <= ranked[1].score);
//! ```
//!
//! # Modules
//!
//! - [`primitives`]: Core Vector and Matrix types
//! - [`traits`]: Regressor and Transformer seams
//! - [`preprocessing`]: Standard scaler
//! - [`tree`]: Regression trees and random forest
//! - [`metrics`]: Regression metrics
//! - [`model_selection`]: Train/test splitting
//! - [`mesh`]: STL loading and geometric measurement
//! - [`features`]: Ten-slot feature vectors with deterministic fallback
//! - [`gcode`]: Print-time and material estimates from G-code headers
//! - [`dataset`]: Training samples, cleaning, dedup and assembly
//! - [`cost_model`]: Filament and time regressors with persistence
//! - [`recommend`]: Candidate ranking and recommendation reports

pub mod cost_model;
pub mod dataset;
pub mod error;
pub mod features;
pub mod gcode;
pub mod mesh;
pub mod metrics;
pub mod model_selection;
pub mod prelude;
pub mod preprocessing;
pub mod primitives;
pub mod recommend;
pub mod traits;
pub mod tree;

pub use error::{OrientError, Result};
pub use primitives::{Matrix, Vector};
pub use traits::{Regressor, Transformer};
