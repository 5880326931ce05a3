//! Property-based tests using proptest.
//!
//! These tests verify invariants of feature coercion, the fallback vector
//! and candidate ranking.

use print_orient::features::{coerce, fallback_vector, FEATURE_LEN};
use print_orient::prelude::*;
use print_orient::recommend::score;
use proptest::prelude::*;
use std::sync::OnceLock;

/// One small model shared by every case; training per case would dominate.
fn shared_model() -> &'static TrainedCostModel {
    static MODEL: OnceLock<TrainedCostModel> = OnceLock::new();
    MODEL.get_or_init(|| {
        let samples: Vec<OrientationSample> = CANDIDATE_ANGLES
            .iter()
            .cycle()
            .take(39)
            .enumerate()
            .map(|(i, &[x, y, z])| {
                let size = 10.0 + (i / 13) as f64 * 15.0;
                OrientationSample {
                    model_name: format!("part{}", i / 13),
                    stl_path: format!("part{}.stl", i / 13),
                    json_path: String::new(),
                    stl_vector: coerce(&[size, size, size, size.powi(3), 6.0 * size * size]),
                    angle_x: x,
                    angle_y: y,
                    angle_z: z,
                    filament_length_m: size / 10.0 + x / 45.0,
                    time_minutes: size + y / 3.0 + z / 9.0,
                    features: None,
                    vector_source: None,
                }
            })
            .collect();
        CostModel::new(CostModelConfig::default().with_n_estimators(8))
            .fit(&samples)
            .expect("fit shared model")
    })
}

fn feature_strategy() -> impl Strategy<Value = Vec<f64>> {
    proptest::collection::vec(-1000.0f64..1000.0, FEATURE_LEN)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn coerce_always_yields_ten_slots(values in proptest::collection::vec(-1e6f64..1e6, 0..30)) {
        let vector = coerce(&values);
        prop_assert_eq!(vector.as_slice().len(), FEATURE_LEN);

        let kept = values.len().min(FEATURE_LEN);
        prop_assert_eq!(&vector.as_slice()[..kept], &values[..kept]);
        prop_assert!(vector.as_slice()[kept..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn fallback_vector_is_deterministic_and_finite(name in "[a-zA-Z0-9_]{1,24}\\.stl") {
        let a = fallback_vector(&name);
        let b = fallback_vector(&name);
        prop_assert_eq!(a, b);
        prop_assert!(a.is_finite());
    }

    #[test]
    fn recommendations_are_sorted_unique_and_bounded(
        vector in feature_strategy(),
        top_k in 0usize..20,
    ) {
        let ranked = OrientationRecommender::new(shared_model())
            .recommend(&vector, top_k)
            .expect("recommend");

        prop_assert_eq!(ranked.len(), top_k.min(CANDIDATE_ANGLES.len()));
        prop_assert!(ranked.windows(2).all(|w| w[0].score <= w[1].score));
        for (i, a) in ranked.iter().enumerate() {
            prop_assert!(CANDIDATE_ANGLES.contains(&a.angles));
            prop_assert!(ranked[i + 1..].iter().all(|b| b.angles != a.angles));
        }
    }

    #[test]
    fn score_matches_weighted_sum(
        vector in feature_strategy(),
    ) {
        let all = OrientationRecommender::new(shared_model())
            .evaluate_all(&vector)
            .expect("evaluate");
        for c in all {
            let expected = 0.7 * c.predicted_filament_m + 0.3 * c.predicted_time_min;
            prop_assert!((c.score - expected).abs() < 1e-9);
            prop_assert!((c.score - score(c.predicted_filament_m, c.predicted_time_min)).abs() < 1e-12);
        }
    }

    #[test]
    fn top_one_is_the_minimum(vector in feature_strategy()) {
        let recommender = OrientationRecommender::new(shared_model());
        let all = recommender.evaluate_all(&vector).expect("evaluate");
        let best = recommender.recommend(&vector, 1).expect("recommend");
        let min = all.iter().map(|c| c.score).fold(f64::INFINITY, f64::min);
        prop_assert_eq!(best[0].score, min);
    }

    #[test]
    fn wrong_length_vectors_are_rejected(len in (0usize..30).prop_filter("not ten", |n| *n != FEATURE_LEN)) {
        let result = OrientationRecommender::new(shared_model()).recommend(&vec![1.0; len], 5);
        prop_assert!(result.is_err());
    }
}
