// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=waymark_feature --heading-base-level=0

//! Waymark Feature: hover, selection and star state for map features.
//!
//! A [`FeatureStateStore`] keeps one [`FeatureRecord`] per `(layer, feature)`
//! pair the user has interacted with. The rules it enforces:
//!
//! - At most one feature is hovered per semantic layer.
//! - At most one feature is selected across all layers.
//! - Stars are global per [`FeatureId`] and survive record deletion; a feature
//!   starred in one layer shows as starred wherever it is recorded.
//! - A record lives while it is hovered, selected, or starred. Idle records
//!   older than a maximum age are removed by [`FeatureStateStore::evict`].
//!
//! Features rarely carry a dependable id, so [`Feature::feature_id`] falls back
//! from the feature's own id to the `id` and `fid` properties, and finally to
//! a stable hash of the geometry.
//!
//! Time is always passed in explicitly, in host milliseconds. Layers whose
//! records changed are tracked in an [`understory_dirty::DirtySet`] and drained
//! with [`FeatureStateStore::take_dirty_layers`].
//!
//! ## Minimal example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use kurbo::Point;
//! use waymark_feature::{Feature, FeatureId, FeatureStateStore, Geometry};
//!
//! let at = Point::new(77.59, 12.97);
//! let school = Arc::new(
//!     Feature::new(Geometry::Point(at)).with_property("id", "school-12"),
//! );
//!
//! let mut store = FeatureStateStore::new();
//! store.on_hover(school.clone(), "schools", at, 1_000);
//! store.on_click(school, "schools", at, 1_200);
//!
//! let id = FeatureId::from("school-12");
//! assert_eq!(store.toggle_star(&id, 1_300), Some(true));
//! store.on_leave("schools");
//!
//! let record = store.record("schools", &id).unwrap();
//! assert!(record.is_selected() && record.is_starred() && !record.is_hovered());
//! assert_eq!(store.take_dirty_layers(), ["schools"]);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod feature;
mod geometry;
mod record;
mod store;

pub use feature::{Feature, FeatureId, Properties, PropertyValue};
pub use geometry::Geometry;
pub use record::{FeatureRecord, InteractionFlags};
pub use store::{FeatureKey, FeatureStateStore, FlagChange, FlagChanges, RECORDS};
