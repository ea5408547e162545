// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=waymark_order --heading-base-level=0

//! Waymark Order: paint-order anchoring for layers added to a rendered style.
//!
//! A map style is an ordered stack of physical layers, bottom first. When the
//! application adds a new layer it has to pick the layer to insert *before*
//! so that the stack stays in a sensible order: imagery at the bottom, then
//! area fills, then lines and points, with labels on top.
//!
//! [`RenderOrder`] holds the two lookup tables that define "sensible":
//!
//! - a **type table** mapping each [`LayerKind`] to an integer priority
//!   (lower is painted first, further back);
//! - an **override table** mapping layer or group ids to a priority that wins
//!   over the type table. Override values may be non-contiguous; only their
//!   relative magnitude matters.
//!
//! [`RenderOrder::insertion_anchor`] is a pure function over those tables and
//! the current stack. It returns the id of the layer to insert before, or
//! `None` to append on top. Moving layers is left to the caller.
//!
//! ## Minimal example
//!
//! ```rust
//! use waymark_layer::{LayerKind, LayerMeta, PaintType, PhysicalLayer};
//! use waymark_order::RenderOrder;
//!
//! let order = RenderOrder::default();
//! let stack = [
//!     PhysicalLayer::new("background", PaintType::Background).as_basemap(),
//!     PhysicalLayer::new("roads-line", PaintType::Line)
//!         .with_meta(LayerMeta::new("roads", LayerKind::Vector)),
//!     PhysicalLayer::new("place-labels", PaintType::Symbol),
//! ];
//!
//! // GeoJSON (priority 50) ranks above vector (priority 20): it goes above
//! // the roads, and therefore before the next layer of another group.
//! let anchor = order.insertion_anchor(
//!     LayerKind::Geojson,
//!     "trails-line",
//!     "trails",
//!     &["roads", "trails"],
//!     &stack,
//! );
//! assert_eq!(anchor, Some("place-labels"));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

use alloc::string::String;
use core::cmp::Ordering;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use waymark_layer::{LayerKind, PhysicalLayer};

/// Paint priority. Lower values are painted first (further back).
pub type Priority = i32;

/// Priority of kinds missing from the type table.
pub const UNRANKED: Priority = 1_000;

/// Default type priorities.
pub const DEFAULT_TYPE_PRIORITIES: [(LayerKind, Priority); 9] = [
    (LayerKind::Style, 0),
    (LayerKind::Terrain, 5),
    (LayerKind::Tms, 10),
    (LayerKind::Img, 15),
    (LayerKind::Vector, 20),
    (LayerKind::LayerGroup, 30),
    (LayerKind::Csv, 40),
    (LayerKind::Geojson, 50),
    (LayerKind::Markers, 60),
];

/// Default per-id overrides.
pub const DEFAULT_OVERRIDES: [(&str, Priority); 2] = [("landcover", 19), ("osm-landuse", 21)];

/// The two lookup tables that define paint order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderOrder {
    type_priorities: HashMap<LayerKind, Priority>,
    overrides: HashMap<String, Priority>,
}

impl Default for RenderOrder {
    fn default() -> Self {
        let mut order = Self::empty();
        for (kind, priority) in DEFAULT_TYPE_PRIORITIES {
            order.set_type_priority(kind, priority);
        }
        for (id, priority) in DEFAULT_OVERRIDES {
            order.set_override(id, priority);
        }
        order
    }
}

impl RenderOrder {
    /// Creates tables with no entries; every kind is [`UNRANKED`].
    #[must_use]
    pub fn empty() -> Self {
        Self {
            type_priorities: HashMap::new(),
            overrides: HashMap::new(),
        }
    }

    /// Sets the priority of a layer kind.
    pub fn set_type_priority(&mut self, kind: LayerKind, priority: Priority) {
        self.type_priorities.insert(kind, priority);
    }

    /// Sets an override for a layer or group id.
    pub fn set_override(&mut self, id: impl Into<String>, priority: Priority) {
        self.overrides.insert(id.into(), priority);
    }

    /// Returns the override for `id`, if any.
    #[must_use]
    pub fn override_for(&self, id: &str) -> Option<Priority> {
        self.overrides.get(id).copied()
    }

    /// Returns the priority of `kind` from the type table.
    #[must_use]
    pub fn type_priority(&self, kind: LayerKind) -> Priority {
        self.type_priorities.get(&kind).copied().unwrap_or(UNRANKED)
    }

    /// Returns the priority of a layer: the first override found among `ids`,
    /// else the type priority of `kind`.
    #[must_use]
    pub fn priority(&self, ids: &[&str], kind: LayerKind) -> Priority {
        ids.iter()
            .find_map(|id| self.override_for(id))
            .unwrap_or_else(|| self.type_priority(kind))
    }

    /// Returns the rank of a physical layer: its priority and the position of
    /// its group in `ordered_groups`. Layers without metadata are unranked.
    #[must_use]
    pub fn rank<S: AsRef<str>>(
        &self,
        layer: &PhysicalLayer,
        ordered_groups: &[S],
    ) -> Option<(Priority, usize)> {
        let meta = layer.meta.as_ref()?;
        Some((
            self.priority(&[meta.group_id.as_str()], meta.layer_kind),
            group_position(ordered_groups, &meta.group_id),
        ))
    }

    /// Compares two physical layers by rank.
    ///
    /// Unranked layers (basemap) sort before ranked ones. Useful to sort a
    /// whole stack with a stable sort.
    #[must_use]
    pub fn compare<S: AsRef<str>>(
        &self,
        a: &PhysicalLayer,
        b: &PhysicalLayer,
        ordered_groups: &[S],
    ) -> Ordering {
        self.rank(a, ordered_groups)
            .cmp(&self.rank(b, ordered_groups))
    }

    /// Computes where a new physical layer should be inserted.
    ///
    /// Returns the id of the layer in `stack` (ordered bottom to top) that the
    /// new layer should be inserted before, or `None` to append it on top.
    ///
    /// - The new layer's priority is the override for `new_id`, else the
    ///   override for `new_group`, else the type priority of `new_kind`.
    /// - Tile-image ([`LayerKind::Tms`]) layers go directly above the last
    ///   basemap layer, if there is one.
    /// - Otherwise the stack is scanned top-down over ranked layers. The first
    ///   one that ranks lower (lower priority, or equal priority with an
    ///   earlier group in `ordered_groups`, or the same group) is the layer to
    ///   go above: the anchor is the next layer above it that belongs to a
    ///   different group.
    /// - If every ranked layer outranks the new one, the anchor is the
    ///   bottom-most ranked layer.
    /// - With no ranked layers at all, vector and `GeoJSON` layers go below the
    ///   first label layer.
    #[must_use]
    pub fn insertion_anchor<'s, S: AsRef<str>>(
        &self,
        new_kind: LayerKind,
        new_id: &str,
        new_group: &str,
        ordered_groups: &[S],
        stack: &'s [PhysicalLayer],
    ) -> Option<&'s str> {
        if new_kind == LayerKind::Tms
            && let Some(last_basemap) = stack.iter().rposition(|layer| layer.basemap)
        {
            return stack.get(last_basemap + 1).map(|layer| layer.id.as_str());
        }

        let priority = self.priority(&[new_id, new_group], new_kind);
        let position = group_position(ordered_groups, new_group);

        let mut bottom_ranked = None;
        for (index, layer) in stack.iter().enumerate().rev() {
            let Some(meta) = layer.meta.as_ref() else {
                continue;
            };
            let Some((other_priority, other_position)) = self.rank(layer, ordered_groups) else {
                continue;
            };
            let ranks_lower = other_priority < priority
                || (other_priority == priority
                    && (other_position < position || meta.group_id == new_group));
            if ranks_lower {
                return stack[index + 1..]
                    .iter()
                    .find(|above| above.group_id() != Some(meta.group_id.as_str()))
                    .map(|above| above.id.as_str());
            }
            bottom_ranked = Some(index);
        }

        if let Some(index) = bottom_ranked {
            return Some(stack[index].id.as_str());
        }

        if new_kind.is_feature_data() {
            return stack
                .iter()
                .find(|layer| layer.paint_type.is_label())
                .map(|layer| layer.id.as_str());
        }

        None
    }
}

fn group_position<S: AsRef<str>>(ordered_groups: &[S], group: &str) -> usize {
    ordered_groups
        .iter()
        .position(|g| g.as_ref() == group)
        .unwrap_or(usize::MAX)
}
