// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raw pointer events as delivered by the host for physical layers.

use std::sync::Arc;

use kurbo::Point;
use waymark_feature::Feature;

/// What the pointer did.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PointerKind {
    /// The pointer moved over a feature.
    Move,
    /// A feature was clicked.
    Click,
    /// The pointer left the layer.
    Leave,
}

/// A pointer event on a physical layer.
#[derive(Clone, Debug, PartialEq)]
pub struct PointerEvent {
    /// What happened.
    pub kind: PointerKind,
    /// Physical layer id the host reported the event for.
    pub layer_id: String,
    /// Topmost feature under the pointer. Absent for leave events.
    pub feature: Option<Arc<Feature>>,
    /// Pointer position (`x = longitude`, `y = latitude`).
    pub lng_lat: Point,
}

impl PointerEvent {
    /// A move over `feature`.
    #[must_use]
    pub fn moved(layer_id: impl Into<String>, feature: Arc<Feature>, lng_lat: Point) -> Self {
        Self {
            kind: PointerKind::Move,
            layer_id: layer_id.into(),
            feature: Some(feature),
            lng_lat,
        }
    }

    /// A click on `feature`.
    #[must_use]
    pub fn clicked(layer_id: impl Into<String>, feature: Arc<Feature>, lng_lat: Point) -> Self {
        Self {
            kind: PointerKind::Click,
            layer_id: layer_id.into(),
            feature: Some(feature),
            lng_lat,
        }
    }

    /// The pointer left the layer.
    #[must_use]
    pub fn left(layer_id: impl Into<String>) -> Self {
        Self {
            kind: PointerKind::Leave,
            layer_id: layer_id.into(),
            feature: None,
            lng_lat: Point::ZERO,
        }
    }
}
