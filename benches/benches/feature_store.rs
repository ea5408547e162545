// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::Arc;

use criterion::{
    BatchSize, BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main,
};
use kurbo::Point;
use waymark_feature::{Feature, FeatureId, FeatureStateStore, Geometry};

#[derive(Clone)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u32(&mut self) -> u32 {
        // Numerical Recipes LCG parameters.
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 32) as u32
    }

    fn below(&mut self, upper: usize) -> usize {
        (self.next_u32() as usize) % upper
    }
}

const LAYERS: [&str; 4] = ["schools", "parks", "wards", "bus-stops"];

fn features(n: usize) -> Vec<Arc<Feature>> {
    (0..n)
        .map(|i| {
            let p = Point::new(77.5 + i as f64 * 1e-4, 12.9);
            Arc::new(Feature::new(Geometry::Point(p)).with_property("id", i as i64))
        })
        .collect()
}

/// Pointer churn: mostly hovers, some clicks, stars and leaves.
fn bench_pointer_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("feature_store/pointer_churn");
    const OPS: usize = 4_096;
    group.throughput(Throughput::Elements(OPS as u64));

    for n in [64usize, 1_024] {
        let pool = features(n);
        group.bench_with_input(BenchmarkId::new("features", n), &pool, |b, pool| {
            b.iter_batched(
                || (FeatureStateStore::new(), Lcg::new(0x5eed)),
                |(mut store, mut rng)| {
                    for now in 0..OPS as u64 {
                        let feature = pool[rng.below(pool.len())].clone();
                        let layer = LAYERS[rng.below(LAYERS.len())];
                        match rng.below(16) {
                            0 => {
                                store.on_click(feature, layer, Point::ZERO, now);
                            }
                            1 => {
                                store.toggle_star(&feature.feature_id(), now);
                            }
                            2 => {
                                store.on_leave(layer);
                            }
                            _ => {
                                store.on_hover(feature, layer, Point::ZERO, now);
                            }
                        }
                    }
                    black_box(store.take_dirty_layers());
                    black_box(store);
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_fallback_id(c: &mut Criterion) {
    let mut group = c.benchmark_group("feature_store/fallback_id");
    for len in [16usize, 1_024] {
        let ring: Vec<Point> = (0..len)
            .map(|i| Point::new(77.5 + i as f64 * 1e-5, 12.9 + i as f64 * 1e-5))
            .collect();
        let geometry = Geometry::Polygon(vec![ring]);
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::new("polygon", len), &geometry, |b, g| {
            b.iter(|| black_box(FeatureId::from_geometry(g)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_pointer_churn, bench_fallback_id);
criterion_main!(benches);
