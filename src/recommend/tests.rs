//! Tests for candidate ranking and the recommendation report.

use super::*;
use crate::cost_model::{CostModel, CostModelConfig};
use crate::dataset::OrientationSample;
use crate::error::OrientError;
use crate::features::{coerce, Extraction, VectorSource};

/// Filament grows with angle_x, time with angle_y, so rankings are
/// predictable.
fn trained_model() -> TrainedCostModel {
    let samples: Vec<OrientationSample> = CANDIDATE_ANGLES
        .iter()
        .cycle()
        .take(26)
        .enumerate()
        .map(|(i, &angles)| OrientationSample {
            model_name: "block".to_string(),
            stl_path: format!("block{}.stl", i / 13),
            json_path: String::new(),
            stl_vector: coerce(&[20.0, 20.0, 10.0, 4000.0, 1600.0, 8.0, 12.0, 10.0, 10.0, 5.0]),
            angle_x: angles[0],
            angle_y: angles[1],
            angle_z: angles[2],
            filament_length_m: 1.0 + angles[0] / 10.0,
            time_minutes: 30.0 + angles[1],
            features: None,
            vector_source: Some(VectorSource::Measured),
        })
        .collect();

    CostModel::new(CostModelConfig::default().with_n_estimators(10))
        .fit(&samples)
        .expect("fit")
}

fn block_vector() -> Vec<f64> {
    vec![20.0, 20.0, 10.0, 4000.0, 1600.0, 8.0, 12.0, 10.0, 10.0, 5.0]
}

fn candidate(angles: [f64; 3], filament: f64, time: f64) -> OrientationCandidate {
    OrientationCandidate {
        angles,
        predicted_filament_m: filament,
        predicted_time_min: time,
        score: score(filament, time),
    }
}

#[test]
fn test_score_formula() {
    assert!((score(10.0, 100.0) - 37.0).abs() < 1e-12);
    assert!((score(0.0, 0.0)).abs() < 1e-12);
    assert!((FILAMENT_WEIGHT + TIME_WEIGHT - 1.0).abs() < 1e-12);
}

#[test]
fn test_candidate_set_is_unique() {
    for (i, a) in CANDIDATE_ANGLES.iter().enumerate() {
        for b in &CANDIDATE_ANGLES[i + 1..] {
            assert_ne!(a, b);
        }
    }
    assert_eq!(CANDIDATE_ANGLES[0], [0.0, 0.0, 0.0]);
}

#[test]
fn test_recommend_sorted_and_sized() {
    let model = trained_model();
    let recommender = OrientationRecommender::new(&model);

    for top_k in [0usize, 1, 5, 13, 20] {
        let ranked = recommender.recommend(&block_vector(), top_k).expect("rank");
        assert_eq!(ranked.len(), top_k.min(13));
        assert!(ranked.windows(2).all(|w| w[0].score <= w[1].score));
        for c in &ranked {
            assert!(CANDIDATE_ANGLES.contains(&c.angles));
            assert!((c.score - score(c.predicted_filament_m, c.predicted_time_min)).abs() < 1e-9);
        }
    }
}

#[test]
fn test_recommend_prefers_low_cost_orientation() {
    let model = trained_model();
    let ranked = OrientationRecommender::new(&model)
        .recommend(&block_vector(), 13)
        .expect("rank");
    // Both targets are lowest at angle_x = angle_y = 0.
    assert_eq!(ranked[0].angles[0], 0.0);
    assert_eq!(ranked[0].angles[1], 0.0);
}

#[test]
fn test_evaluate_all_keeps_candidate_order() {
    let model = trained_model();
    let all = OrientationRecommender::new(&model)
        .evaluate_all(&block_vector())
        .expect("evaluate");
    let angles: Vec<[f64; 3]> = all.iter().map(|c| c.angles).collect();
    assert_eq!(angles, CANDIDATE_ANGLES.to_vec());
}

#[test]
fn test_ties_keep_candidate_order() {
    let model = trained_model();
    let recommender = OrientationRecommender::new(&model);
    let all = recommender.evaluate_all(&block_vector()).expect("evaluate");
    let ranked = recommender.recommend(&block_vector(), 13).expect("rank");

    let position = |angles: [f64; 3]| {
        CANDIDATE_ANGLES
            .iter()
            .position(|a| *a == angles)
            .expect("candidate")
    };
    for pair in ranked.windows(2) {
        if pair[0].score == pair[1].score {
            assert!(position(pair[0].angles) < position(pair[1].angles));
        }
    }
    assert_eq!(all.len(), 13);
}

#[test]
fn test_wrong_vector_length_fails() {
    let model = trained_model();
    let recommender = OrientationRecommender::new(&model);
    for len in [9usize, 11] {
        let err = recommender.recommend(&vec![1.0; len], 5).unwrap_err();
        assert!(matches!(err, OrientError::DimensionMismatch { .. }));
    }
}

#[test]
fn test_report_rounding_and_best() {
    let ranked = vec![
        candidate([45.0, 0.0, 0.0], 1.23456, 40.06),
        candidate([0.0, 0.0, 0.0], 2.0, 50.0),
    ];
    let extraction = Extraction {
        vector: coerce(&[1.0; 10]),
        source: VectorSource::Measured,
    };
    let report = RecommendationReport::new("parts/gear.stl", &extraction, &ranked);

    assert_eq!(report.recommendations.len(), 2);
    assert_eq!(report.recommendations[0].rank, 1);
    assert_eq!(report.recommendations[0].predicted_filament_m, 1.23);
    assert_eq!(report.recommendations[0].predicted_time_min, 40.1);
    assert_eq!(report.recommendations[1].score, 16.4);

    let best = report.best_orientation.as_ref().expect("best");
    assert_eq!(best.angles, AngleTriple { x: 45.0, y: 0.0, z: 0.0 });

    let savings = report.savings_vs_default.as_ref().expect("savings");
    assert_eq!(savings.filament_m, Some(0.77));
    assert_eq!(savings.filament_percent, Some(38.3));
    assert_eq!(savings.time_min, Some(9.9));
}

#[test]
fn test_report_without_default_has_no_savings() {
    let ranked = vec![candidate([90.0, 0.0, 0.0], 1.0, 10.0)];
    let extraction = Extraction {
        vector: coerce(&[]),
        source: VectorSource::Fallback,
    };
    let report = RecommendationReport::new("a.stl", &extraction, &ranked);
    assert!(report.savings_vs_default.is_none());

    let json = serde_json::to_value(&report).expect("serialize");
    assert!(json.get("savings_vs_default").is_none());
    assert_eq!(json["vector_source"], "fallback");
    assert_eq!(json["recommendations"][0]["angles"]["x"], 90.0);
}

#[test]
fn test_report_default_best_has_no_savings() {
    let ranked = vec![
        candidate([0.0, 0.0, 0.0], 1.0, 10.0),
        candidate([90.0, 0.0, 0.0], 2.0, 20.0),
    ];
    let extraction = Extraction {
        vector: coerce(&[]),
        source: VectorSource::Measured,
    };
    let report = RecommendationReport::new("a.stl", &extraction, &ranked);
    assert!(report.savings_vs_default.is_none());
}

#[test]
fn test_report_save() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join(default_report_name("bracket.stl"));
    let extraction = Extraction {
        vector: coerce(&[]),
        source: VectorSource::Measured,
    };
    let report = RecommendationReport::new(
        "bracket.stl",
        &extraction,
        &[candidate([0.0; 3], 1.0, 1.0)],
    );
    report.save(&path).expect("save");

    let text = std::fs::read_to_string(&path).expect("read");
    let restored: RecommendationReport = serde_json::from_str(&text).expect("parse");
    assert_eq!(restored, report);
}
