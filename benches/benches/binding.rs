// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use waymark_binding::{LayerBindingResolver, Strategy};
use waymark_layer::{InspectConfig, LayerDescriptor, LayerKind, PaintType, PhysicalLayer};

/// A style of `len` layers where a handful belong to "schools" under
/// different naming conventions.
fn build_style(len: usize) -> Vec<PhysicalLayer> {
    let mut style = Vec::with_capacity(len);
    style.push(PhysicalLayer::new("background", PaintType::Background));
    for i in 0..len {
        let paint = match i % 4 {
            0 => PaintType::Fill,
            1 => PaintType::Line,
            2 => PaintType::Circle,
            _ => PaintType::Symbol,
        };
        style.push(
            PhysicalLayer::new(format!("layer-{i}"), paint)
                .with_source("osm")
                .with_source_layer(format!("sl-{}", i % 16)),
        );
    }
    style.push(PhysicalLayer::new("schools-fill", PaintType::Fill));
    style.push(
        PhysicalLayer::new("campus-label", PaintType::Symbol).with_source_layer("education"),
    );
    style.push(PhysicalLayer::new("old-schools-dots", PaintType::Circle));
    style
}

fn schools() -> LayerDescriptor {
    LayerDescriptor::new("schools", LayerKind::Vector)
        .with_source_layer("education")
        .with_alt_source_layers(["colleges"])
        .with_sublayer(LayerDescriptor::new("schools-private", LayerKind::Vector))
        .with_inspect(InspectConfig::titled("name"))
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("binding/resolve");
    let descriptor = schools();

    for len in [64usize, 256, 1_024] {
        let style = build_style(len);
        group.throughput(Throughput::Elements(style.len() as u64));

        let all = LayerBindingResolver::new();
        group.bench_with_input(BenchmarkId::new("all_strategies", len), &style, |b, style| {
            b.iter(|| black_box(all.resolve(&descriptor, style)));
        });

        // Without the fuzzy pass: what naming discipline buys.
        let strict = LayerBindingResolver::with_strategies(
            Strategy::ALL
                .into_iter()
                .filter(|s| *s != Strategy::FuzzyId),
        );
        group.bench_with_input(BenchmarkId::new("no_fuzzy", len), &style, |b, style| {
            b.iter(|| black_box(strict.resolve(&descriptor, style)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_resolve);
criterion_main!(benches);
