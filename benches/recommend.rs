//! Benchmarks for cost-model training and orientation ranking.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use print_orient::features::{coerce, fallback_vector};
use print_orient::prelude::*;

fn generate_samples(n_parts: usize) -> Vec<OrientationSample> {
    (0..n_parts)
        .flat_map(|part| {
            let size = 10.0 + part as f64 * 3.0;
            CANDIDATE_ANGLES.iter().map(move |&[x, y, z]| OrientationSample {
                model_name: format!("part_{part}"),
                stl_path: format!("part_{part}.stl"),
                json_path: String::new(),
                stl_vector: coerce(&[size, size, size / 2.0, size.powi(3) / 2.0, 4.0 * size * size]),
                angle_x: x,
                angle_y: y,
                angle_z: z,
                filament_length_m: size / 10.0 + x / 45.0,
                time_minutes: size + y / 3.0,
                features: None,
                vector_source: None,
            })
        })
        .collect()
}

fn bench_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("cost_model_fit");
    group.sample_size(10);

    for n_parts in [5, 20, 50].iter() {
        let samples = generate_samples(*n_parts);
        let config = CostModelConfig::default().with_n_estimators(20);

        group.bench_with_input(BenchmarkId::from_parameter(samples.len()), n_parts, |b, _| {
            b.iter(|| {
                CostModel::new(config.clone())
                    .fit(black_box(&samples))
                    .expect("fit")
            });
        });
    }

    group.finish();
}

fn bench_recommend(c: &mut Criterion) {
    let mut group = c.benchmark_group("recommend");

    for n_estimators in [10, 100].iter() {
        let model = CostModel::new(CostModelConfig::default().with_n_estimators(*n_estimators))
            .fit(&generate_samples(20))
            .expect("fit");
        let vector = fallback_vector("bench.stl");

        group.bench_with_input(
            BenchmarkId::from_parameter(n_estimators),
            n_estimators,
            |b, _| {
                let recommender = OrientationRecommender::new(&model);
                b.iter(|| {
                    recommender
                        .recommend(black_box(vector.as_slice()), black_box(5))
                        .expect("recommend")
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_fit, bench_recommend);
criterion_main!(benches);
