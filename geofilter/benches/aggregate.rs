//! Benchmarks pour l'union des polygones du filtre

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use geo::{polygon, Geometry};
use geofilter::{aggregate_features, Feature, SpatialRef, TargetReference, WGS84_EPSG};

/// Grille de carrés qui se chevauchent deux à deux
fn grid(side: usize) -> Vec<Feature> {
    let mut features = Vec::with_capacity(side * side);
    for row in 0..side {
        for col in 0..side {
            let (x, y) = (col as f64 * 0.9, row as f64 * 0.9);
            let square: Geometry = polygon![
                (x: x, y: y),
                (x: x + 1.0, y: y),
                (x: x + 1.0, y: y + 1.0),
                (x: x, y: y + 1.0),
                (x: x, y: y),
            ]
            .into();
            features.push(Feature::new(square, Some(SpatialRef::wgs84())));
        }
    }
    features
}

fn bench_union_grid(c: &mut Criterion) {
    let target = TargetReference::import(WGS84_EPSG).unwrap();

    let mut group = c.benchmark_group("union_grid");
    for side in [4usize, 8, 16] {
        let features = grid(side);
        group.throughput(Throughput::Elements(features.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(side), &features, |b, features| {
            b.iter(|| {
                let area = aggregate_features(black_box(features.clone()), &target).unwrap();
                black_box(area)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_union_grid);
criterion_main!(benches);
