// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=waymark_binding --heading-base-level=0

//! Waymark Binding: resolve semantic layers to physical render layers.
//!
//! A semantic layer from the catalogue ("schools") compiles into an unknown
//! number of physical layers ("schools-fill", "schools-outline", a label layer
//! reading the `education` source-layer, ...). Style authors are not
//! consistent about naming, so no single rule finds them all.
//!
//! [`LayerBindingResolver`] runs an ordered list of independent [`Strategy`]
//! predicates, **unions** what they find (it never stops at the first
//! strategy that matches), de-duplicates preserving first-seen order, and
//! finally drops paint types that carry no pickable features (background,
//! raster, hillshade).
//!
//! The resolver does not cache anything: each call takes the current physical
//! layer list. Callers that resolve before the style has finished compiling
//! retry with a [`RetryPolicy`].
//!
//! ## Minimal example
//!
//! ```rust
//! use waymark_binding::{LayerBindingResolver, Strategy};
//! use waymark_layer::{LayerDescriptor, LayerKind, PaintType, PhysicalLayer};
//!
//! let schools = LayerDescriptor::new("schools", LayerKind::Vector).with_source_layer("education");
//! let style = [
//!     PhysicalLayer::new("background", PaintType::Background),
//!     PhysicalLayer::new("schools-fill", PaintType::Fill),
//!     PhysicalLayer::new("campus-label", PaintType::Symbol).with_source_layer("education"),
//!     PhysicalLayer::new("roads", PaintType::Line),
//! ];
//!
//! let resolution = LayerBindingResolver::new().resolve(&schools, &style);
//! assert_eq!(resolution.ids(), &["schools-fill", "campus-label"]);
//! assert_eq!(resolution.matched_by("campus-label"), Some(Strategy::SourceLayer));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod retry;
mod strategy;

use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashSet;
use smallvec::SmallVec;
use waymark_layer::{LayerDescriptor, PhysicalLayer};

pub use retry::RetryPolicy;
pub use strategy::{
    Strategy, alt_source_layer, exact_id, explicit_source, fuzzy_id, geojson_source, id_prefix,
    source_layer,
};

/// Physical layer ids bound to a semantic layer. Usually a handful.
pub type BoundLayers = SmallVec<[String; 4]>;

/// The outcome of one resolution: matched ids plus the strategy that found each.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Resolution {
    ids: BoundLayers,
    provenance: SmallVec<[Strategy; 4]>,
    filtered: usize,
}

impl Resolution {
    /// Returns the matched physical ids, in first-seen order.
    #[must_use]
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Consumes the resolution, returning the matched ids.
    #[must_use]
    pub fn into_ids(self) -> BoundLayers {
        self.ids
    }

    /// Returns `true` if nothing matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns the number of matched ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns the first strategy that matched `id`.
    #[must_use]
    pub fn matched_by(&self, id: &str) -> Option<Strategy> {
        self.ids
            .iter()
            .position(|matched| matched == id)
            .map(|idx| self.provenance[idx])
    }

    /// Iterates over `(physical id, strategy)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Strategy)> + '_ {
        self.ids
            .iter()
            .map(String::as_str)
            .zip(self.provenance.iter().copied())
    }

    /// Number of matches dropped because their paint type is not interactive.
    #[must_use]
    pub fn filtered(&self) -> usize {
        self.filtered
    }
}

/// Resolves semantic layer descriptors against a physical layer list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerBindingResolver {
    strategies: SmallVec<[Strategy; 8]>,
}

impl Default for LayerBindingResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerBindingResolver {
    /// Creates a resolver running every [`Strategy`] in [`Strategy::ALL`] order.
    #[must_use]
    pub fn new() -> Self {
        Self::with_strategies(Strategy::ALL)
    }

    /// Creates a resolver running only `strategies`, in the given order.
    #[must_use]
    pub fn with_strategies<I>(strategies: I) -> Self
    where
        I: IntoIterator<Item = Strategy>,
    {
        Self {
            strategies: strategies.into_iter().collect(),
        }
    }

    /// Returns the strategies, in evaluation order.
    #[must_use]
    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    /// Finds the physical layers in `layers` that implement `descriptor`.
    ///
    /// All strategies run; their results are unioned in strategy order,
    /// de-duplicated, and stripped of non-interactive paint types.
    #[must_use]
    pub fn resolve(&self, descriptor: &LayerDescriptor, layers: &[PhysicalLayer]) -> Resolution {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut matched: Vec<(&PhysicalLayer, Strategy)> = Vec::new();

        for &strategy in &self.strategies {
            for layer in layers {
                if seen.contains(layer.id.as_str()) {
                    continue;
                }
                if strategy.matches(&self.strategies, descriptor, layer) {
                    seen.insert(layer.id.as_str());
                    matched.push((layer, strategy));
                }
            }
        }

        let mut resolution = Resolution::default();
        for (layer, strategy) in matched {
            if layer.paint_type.is_interactive() {
                resolution.ids.push(layer.id.clone());
                resolution.provenance.push(strategy);
            } else {
                resolution.filtered += 1;
            }
        }
        resolution
    }
}
