// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Feature records and interaction flags.

use alloc::string::String;
use alloc::sync::Arc;

use bitflags::bitflags;
use kurbo::Point;

use crate::feature::{Feature, FeatureId};

bitflags! {
    /// Interaction state of one feature record.
    ///
    /// The store owns [`HOVERED`](Self::HOVERED) and
    /// [`SELECTED`](Self::SELECTED) per record. [`STARRED`](Self::STARRED) is
    /// global per feature id and is only merged in when records are read.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct InteractionFlags: u8 {
        /// The pointer is over the feature.
        const HOVERED = 1 << 0;
        /// The feature is the current selection.
        const SELECTED = 1 << 1;
        /// The feature is starred.
        const STARRED = 1 << 2;
    }
}

/// The interaction-state entry for one feature within one semantic layer.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureRecord {
    /// Derived feature id.
    pub feature_id: FeatureId,
    /// Latest snapshot of the feature.
    pub feature: Arc<Feature>,
    /// Owning semantic layer.
    pub layer_id: String,
    /// Last interaction coordinate (`x = longitude`, `y = latitude`).
    pub lng_lat: Point,
    /// Interaction flags.
    pub flags: InteractionFlags,
    /// Last-touched host time, in milliseconds.
    pub timestamp: u64,
}

impl FeatureRecord {
    pub(crate) fn new(
        feature_id: FeatureId,
        feature: Arc<Feature>,
        layer_id: &str,
        lng_lat: Point,
        now: u64,
    ) -> Self {
        Self {
            feature_id,
            feature,
            layer_id: layer_id.into(),
            lng_lat,
            flags: InteractionFlags::empty(),
            timestamp: now,
        }
    }

    /// Returns `true` if the record is hovered.
    #[must_use]
    pub fn is_hovered(&self) -> bool {
        self.flags.contains(InteractionFlags::HOVERED)
    }

    /// Returns `true` if the record is selected.
    #[must_use]
    pub fn is_selected(&self) -> bool {
        self.flags.contains(InteractionFlags::SELECTED)
    }

    /// Returns `true` if the star flag was merged in and set.
    #[must_use]
    pub fn is_starred(&self) -> bool {
        self.flags.contains(InteractionFlags::STARRED)
    }

    /// Whether the record must be kept, given the feature's star state.
    pub(crate) fn is_retained(&self, starred: bool) -> bool {
        starred || self.flags.intersects(InteractionFlags::HOVERED | InteractionFlags::SELECTED)
    }
}
