// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Matching strategies: independent predicates over (descriptor, physical layer).

use waymark_layer::{LayerDescriptor, LayerKind, PhysicalLayer};

/// One way a physical layer can be recognized as part of a semantic layer.
///
/// Every strategy is a pure predicate; the resolver runs them all and unions
/// what they find.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// The physical id equals the semantic id.
    ExactId,
    /// The physical id starts with `<semantic id>-` or `<semantic id> `.
    IdPrefix,
    /// The physical source-layer equals the descriptor's source-layer.
    SourceLayer,
    /// The physical source-layer equals one of the descriptor's alternates.
    AltSourceLayer,
    /// Any sub-layer descriptor matches, using the full strategy list.
    Sublayers,
    /// A `GeoJSON` descriptor's data lives in the source `geojson-<semantic id>`.
    GeojsonSource,
    /// The physical source equals the descriptor's explicit source.
    ExplicitSource,
    /// One id contains the other. Last resort.
    FuzzyId,
}

impl Strategy {
    /// All strategies, in evaluation order.
    pub const ALL: [Self; 8] = [
        Self::ExactId,
        Self::IdPrefix,
        Self::SourceLayer,
        Self::AltSourceLayer,
        Self::Sublayers,
        Self::GeojsonSource,
        Self::ExplicitSource,
        Self::FuzzyId,
    ];

    /// Short name used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ExactId => "exact-id",
            Self::IdPrefix => "id-prefix",
            Self::SourceLayer => "source-layer",
            Self::AltSourceLayer => "alt-source-layer",
            Self::Sublayers => "sublayers",
            Self::GeojsonSource => "geojson-source",
            Self::ExplicitSource => "explicit-source",
            Self::FuzzyId => "fuzzy-id",
        }
    }

    /// Returns `true` if `layer` belongs to `descriptor` under this strategy.
    ///
    /// `strategies` is the list used to match sub-layers recursively.
    #[must_use]
    pub fn matches(
        self,
        strategies: &[Self],
        descriptor: &LayerDescriptor,
        layer: &PhysicalLayer,
    ) -> bool {
        match self {
            Self::ExactId => exact_id(descriptor, layer),
            Self::IdPrefix => id_prefix(descriptor, layer),
            Self::SourceLayer => source_layer(descriptor, layer),
            Self::AltSourceLayer => alt_source_layer(descriptor, layer),
            Self::Sublayers => descriptor.sublayers.iter().any(|sub| {
                strategies
                    .iter()
                    .any(|strategy| strategy.matches(strategies, sub, layer))
            }),
            Self::GeojsonSource => geojson_source(descriptor, layer),
            Self::ExplicitSource => explicit_source(descriptor, layer),
            Self::FuzzyId => fuzzy_id(descriptor, layer),
        }
    }
}

/// The physical id equals the semantic id.
#[must_use]
pub fn exact_id(descriptor: &LayerDescriptor, layer: &PhysicalLayer) -> bool {
    layer.id == descriptor.id
}

/// The physical id is the semantic id followed by `-` or a space.
#[must_use]
pub fn id_prefix(descriptor: &LayerDescriptor, layer: &PhysicalLayer) -> bool {
    layer
        .id
        .strip_prefix(descriptor.id.as_str())
        .is_some_and(|rest| rest.starts_with('-') || rest.starts_with(' '))
}

/// The physical source-layer equals the descriptor's source-layer.
#[must_use]
pub fn source_layer(descriptor: &LayerDescriptor, layer: &PhysicalLayer) -> bool {
    match (&descriptor.source_layer, &layer.source_layer) {
        (Some(wanted), Some(actual)) => wanted == actual,
        _ => false,
    }
}

/// The physical source-layer equals one of the descriptor's alternate names.
#[must_use]
pub fn alt_source_layer(descriptor: &LayerDescriptor, layer: &PhysicalLayer) -> bool {
    layer
        .source_layer
        .as_ref()
        .is_some_and(|actual| descriptor.alt_source_layers.iter().any(|alt| alt == actual))
}

/// For `GeoJSON` descriptors, the physical source is `geojson-<semantic id>`.
#[must_use]
pub fn geojson_source(descriptor: &LayerDescriptor, layer: &PhysicalLayer) -> bool {
    if descriptor.kind != LayerKind::Geojson {
        return false;
    }
    layer.source.as_deref().is_some_and(|source| {
        source
            .strip_prefix("geojson-")
            .is_some_and(|rest| rest == descriptor.id)
    })
}

/// The physical source equals the descriptor's explicit source.
#[must_use]
pub fn explicit_source(descriptor: &LayerDescriptor, layer: &PhysicalLayer) -> bool {
    match (&descriptor.source, &layer.source) {
        (Some(wanted), Some(actual)) => wanted == actual,
        _ => false,
    }
}

/// Either id contains the other. Empty ids never match.
#[must_use]
pub fn fuzzy_id(descriptor: &LayerDescriptor, layer: &PhysicalLayer) -> bool {
    if descriptor.id.is_empty() || layer.id.is_empty() {
        return false;
    }
    layer.id.contains(descriptor.id.as_str()) || descriptor.id.contains(layer.id.as_str())
}
