// Criterion benchmarks for Comps Engine

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use comps_engine::core::distance::{calculate_bounding_box, distance_miles};
use comps_engine::models::{Coordinates, FeatureCode, Property, QualityGrade, SearchParameters};
use comps_engine::{InMemoryCandidateSource, ScoreModel, SimilaritySearchService};
use std::sync::Arc;

fn create_property(id: usize, lat: f64, lon: f64) -> Property {
    Property {
        coordinates: Some(Coordinates::new(lat, lon)),
        heated_area: Some(1400.0 + (id % 1200) as f64),
        lot_area: Some(6000.0 + (id % 4000) as f64),
        year_built: Some(1970 + (id % 50) as i32),
        quality: QualityGrade::from_code(["B", "C", "D"][id % 3]),
        bedrooms: Some(2 + (id % 3) as u32),
        bathrooms: Some(1.5 + (id % 3) as f64 * 0.5),
        features: if id % 2 == 0 {
            vec![FeatureCode::active("POOL")]
        } else {
            vec![FeatureCode::active("GARAGE")]
        },
        ..Property::new(format!("{:07}", id))
    }
}

fn create_target() -> Property {
    Property {
        features: vec![FeatureCode::active("POOL"), FeatureCode::active("GARAGE")],
        ..create_property(0, 29.7604, -95.3698)
    }
}

fn bench_distance(c: &mut Criterion) {
    let houston = Coordinates::new(29.7604, -95.3698);
    let galleria = Coordinates::new(29.7390, -95.4630);

    c.bench_function("distance_miles", |b| {
        b.iter(|| distance_miles(black_box(houston), black_box(galleria)));
    });
}

fn bench_bounding_box(c: &mut Criterion) {
    c.bench_function("bounding_box_calculation", |b| {
        b.iter(|| {
            calculate_bounding_box(
                black_box(29.7604),
                black_box(-95.3698),
                black_box(5.0),
            )
        });
    });
}

fn bench_scoring(c: &mut Criterion) {
    let model = ScoreModel::default();
    let target = create_target();
    let candidate = create_property(17, 29.77, -95.37);

    c.bench_function("score_pair", |b| {
        b.iter(|| model.score(black_box(&target), black_box(&candidate)));
    });
}

fn bench_find_similar(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("failed to build tokio runtime");

    let mut group = c.benchmark_group("find_similar");

    for corpus_size in [1_000, 10_000, 50_000].iter() {
        let mut corpus = vec![create_target()];
        corpus.extend((1..*corpus_size).map(|i| {
            let lat_offset = ((i * 37) % 200) as f64 * 0.0005 - 0.05;
            let lon_offset = ((i * 61) % 200) as f64 * 0.0005 - 0.05;
            create_property(i, 29.7604 + lat_offset, -95.3698 + lon_offset)
        }));

        let service = SimilaritySearchService::new(
            Arc::new(InMemoryCandidateSource::new(corpus)),
            ScoreModel::default(),
        );
        let target_id = create_target().account_number;
        let params = SearchParameters::default();

        group.bench_with_input(
            BenchmarkId::new("in_memory", corpus_size),
            corpus_size,
            |b, _| {
                b.iter(|| {
                    runtime.block_on(service.find_similar(black_box(&target_id), black_box(&params)))
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_distance,
    bench_bounding_box,
    bench_scoring,
    bench_find_similar
);

criterion_main!(benches);
