// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use waymark_layer::{LayerKind, LayerMeta, PaintType, PhysicalLayer};
use waymark_order::RenderOrder;

const KINDS: [LayerKind; 5] = [
    LayerKind::Vector,
    LayerKind::LayerGroup,
    LayerKind::Csv,
    LayerKind::Geojson,
    LayerKind::Markers,
];

/// Builds a stack by inserting `groups` groups of three layers each, the way
/// an application would, so the stack is already in anchor order.
fn build_stack(order: &RenderOrder, groups: usize) -> (Vec<PhysicalLayer>, Vec<String>) {
    let mut stack = vec![
        PhysicalLayer::new("background", PaintType::Background).as_basemap(),
        PhysicalLayer::new("satellite", PaintType::Raster).as_basemap(),
        PhysicalLayer::new("place-labels", PaintType::Symbol),
    ];
    let mut names = Vec::with_capacity(groups);
    for g in 0..groups {
        let group = format!("group-{g}");
        names.push(group.clone());
        let kind = KINDS[g % KINDS.len()];
        for part in ["fill", "line", "label"] {
            let id = format!("{group}-{part}");
            let anchor = order
                .insertion_anchor(kind, &id, &group, &names, &stack)
                .map(str::to_owned);
            let layer = PhysicalLayer::new(id, PaintType::Fill)
                .with_meta(LayerMeta::new(&*group, kind));
            let at = anchor
                .and_then(|a| stack.iter().position(|l| l.id == a))
                .unwrap_or(stack.len());
            stack.insert(at, layer);
        }
    }
    (stack, names)
}

fn bench_insertion_anchor(c: &mut Criterion) {
    let mut group = c.benchmark_group("order/insertion_anchor");
    let order = RenderOrder::default();

    for groups in [8usize, 64, 256] {
        let (stack, names) = build_stack(&order, groups);
        group.bench_with_input(BenchmarkId::new("geojson", groups), &stack, |b, stack| {
            b.iter(|| {
                black_box(order.insertion_anchor(
                    LayerKind::Geojson,
                    "new-line",
                    "new",
                    &names,
                    stack,
                ))
            });
        });
        group.bench_with_input(BenchmarkId::new("landcover", groups), &stack, |b, stack| {
            b.iter(|| {
                black_box(order.insertion_anchor(
                    LayerKind::Vector,
                    "landcover-fill",
                    "landcover",
                    &names,
                    stack,
                ))
            });
        });
    }

    group.finish();
}

fn bench_sort_stack(c: &mut Criterion) {
    let mut group = c.benchmark_group("order/sort_stack");
    let order = RenderOrder::default();

    for groups in [64usize, 256] {
        let (mut stack, names) = build_stack(&order, groups);
        stack.reverse();
        group.bench_with_input(BenchmarkId::new("compare", groups), &stack, |b, stack| {
            b.iter_batched(
                || stack.clone(),
                |mut s| {
                    s.sort_by(|a, b| order.compare(a, b, &names));
                    black_box(s);
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_insertion_anchor, bench_sort_stack);
criterion_main!(benches);
