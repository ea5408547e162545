// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Physical render layers as reported by the host style.

use alloc::string::String;

use serde::{Deserialize, Serialize};

use crate::kind::{LayerKind, PaintType};

/// Metadata the application records on physical layers it adds itself.
///
/// Layers that came with a basemap style carry no metadata and are skipped
/// when ranking paint order.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerMeta {
    /// Paint-order group of the semantic layer that produced this layer.
    pub group_id: String,
    /// Kind of the semantic layer that produced this layer.
    pub layer_kind: LayerKind,
}

impl LayerMeta {
    /// Creates layer metadata.
    #[must_use]
    pub fn new(group_id: impl Into<String>, layer_kind: LayerKind) -> Self {
        Self {
            group_id: group_id.into(),
            layer_kind,
        }
    }
}

/// One entry of the host style's ordered layer list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalLayer {
    /// Physical layer id.
    pub id: String,
    /// Paint type.
    #[serde(rename = "type")]
    pub paint_type: PaintType,
    /// Source id, if the layer draws from a source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Source-layer name inside a vector source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_layer: Option<String>,
    /// Application metadata, present on layers the application added.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<LayerMeta>,
    /// Whether this layer belongs to the basemap or imagery underlay.
    #[serde(default)]
    pub basemap: bool,
}

impl PhysicalLayer {
    /// Creates a physical layer with only an id and paint type.
    #[must_use]
    pub fn new(id: impl Into<String>, paint_type: PaintType) -> Self {
        Self {
            id: id.into(),
            paint_type,
            source: None,
            source_layer: None,
            meta: None,
            basemap: false,
        }
    }

    /// Sets the source id.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the source-layer name.
    #[must_use]
    pub fn with_source_layer(mut self, name: impl Into<String>) -> Self {
        self.source_layer = Some(name.into());
        self
    }

    /// Attaches application metadata.
    #[must_use]
    pub fn with_meta(mut self, meta: LayerMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Marks the layer as part of the basemap or imagery underlay.
    #[must_use]
    pub fn as_basemap(mut self) -> Self {
        self.basemap = true;
        self
    }

    /// Returns the paint-order group recorded in the metadata, if any.
    #[must_use]
    pub fn group_id(&self) -> Option<&str> {
        self.meta.as_ref().map(|m| m.group_id.as_str())
    }
}
