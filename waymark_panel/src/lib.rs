// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=waymark_panel --heading-base-level=0

//! Waymark Panel: a feature info panel driven by change notifications.
//!
//! [`FeatureInfoPanel`] is a read-only consumer of interaction state. It is a
//! [`waymark_interaction::ChangeObserver`]: each notification marks the
//! layers it names as stale, and [`FeatureInfoPanel::render`] rebuilds just
//! those layers from any [`waymark_interaction::FeatureQuery`] source.
//!
//! Within a layer, hovered features come first, then selected, then starred,
//! then the most recently touched. Each feature shows either a compact title
//! or its full field list ([`DisplayMode`]); selection expands a feature and
//! hovering collapses it, while starred features keep whatever the user chose.
//!
//! ## Minimal example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use kurbo::Point;
//! use waymark_feature::{Feature, FeatureRecord, FeatureStateStore, Geometry};
//! use waymark_interaction::FeatureQuery;
//! use waymark_layer::{InspectConfig, LayerDescriptor, LayerKind};
//! use waymark_panel::{DisplayMode, FeatureInfoPanel};
//!
//! struct Source {
//!     store: FeatureStateStore,
//!     schools: LayerDescriptor,
//! }
//!
//! impl FeatureQuery for Source {
//!     fn registered_layers(&self) -> Vec<String> {
//!         vec!["schools".into()]
//!     }
//!     fn descriptor(&self, layer_id: &str) -> Option<&LayerDescriptor> {
//!         (layer_id == "schools").then_some(&self.schools)
//!     }
//!     fn layer_features(&self, layer_id: &str) -> Vec<FeatureRecord> {
//!         self.store.layer_features(layer_id)
//!     }
//! }
//!
//! let at = Point::new(77.59, 12.97);
//! let mut source = Source {
//!     store: FeatureStateStore::new(),
//!     schools: LayerDescriptor::new("schools", LayerKind::Vector)
//!         .with_inspect(InspectConfig::titled("label")),
//! };
//! let school = Feature::new(Geometry::Point(at))
//!     .with_id("s-1")
//!     .with_property("label", "Government High School");
//! source.store.on_click(Arc::new(school), "schools", at, 0);
//!
//! let mut panel = FeatureInfoPanel::new();
//! let model = panel.render(&source);
//! let entry = &model.section("schools").unwrap().entries[0];
//! assert_eq!(entry.title, "Government High School");
//! assert_eq!(entry.mode, DisplayMode::Full);
//! ```

mod model;
mod panel;

pub use model::{DisplayMode, PanelEntry, PanelModel, PanelSection};
pub use panel::FeatureInfoPanel;
