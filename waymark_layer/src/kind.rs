// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Closed sets of semantic layer kinds and physical paint types.

use core::fmt;

use serde::{Deserialize, Serialize};

/// The kind of a semantic layer, as declared in the layer catalogue.
///
/// Serialized in kebab-case (`"geojson"`, `"layer-group"`, ...).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayerKind {
    /// Vector tiles.
    #[default]
    Vector,
    /// An inline or fetched `GeoJSON` document.
    Geojson,
    /// Tile-image (raster) layers, typically satellite or scanned maps.
    Tms,
    /// Point data loaded from a CSV table.
    Csv,
    /// Individually placed markers.
    Markers,
    /// A complete external style (basemaps).
    Style,
    /// Terrain elevation.
    Terrain,
    /// A grouping of other layers.
    LayerGroup,
    /// A single georeferenced image.
    Img,
}

impl LayerKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Vector,
        Self::Geojson,
        Self::Tms,
        Self::Csv,
        Self::Markers,
        Self::Style,
        Self::Terrain,
        Self::LayerGroup,
        Self::Img,
    ];

    /// Returns the catalogue spelling of this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vector => "vector",
            Self::Geojson => "geojson",
            Self::Tms => "tms",
            Self::Csv => "csv",
            Self::Markers => "markers",
            Self::Style => "style",
            Self::Terrain => "terrain",
            Self::LayerGroup => "layer-group",
            Self::Img => "img",
        }
    }

    /// Returns `true` for kinds drawn from feature geometry (vector or `GeoJSON`).
    #[must_use]
    pub const fn is_feature_data(self) -> bool {
        matches!(self, Self::Vector | Self::Geojson)
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The paint type of a physical layer, as reported by the rendering engine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaintType {
    /// Filled polygons.
    Fill,
    /// Stroked lines.
    Line,
    /// Circles at point locations.
    Circle,
    /// Text labels and icons.
    Symbol,
    /// Extruded polygons.
    FillExtrusion,
    /// Density heatmap.
    Heatmap,
    /// Raster tiles.
    Raster,
    /// Hillshading derived from terrain.
    Hillshade,
    /// Solid background.
    Background,
    /// Any paint type this crate does not know about.
    #[serde(other)]
    Other,
}

impl PaintType {
    /// Returns `true` if features painted by this type can be hovered or clicked.
    ///
    /// Background, raster and hillshade layers carry no pickable features.
    #[must_use]
    pub const fn is_interactive(self) -> bool {
        !matches!(self, Self::Background | Self::Raster | Self::Hillshade)
    }

    /// Returns `true` for text/label layers.
    #[must_use]
    pub const fn is_label(self) -> bool {
        matches!(self, Self::Symbol)
    }
}
