// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Semantic layer descriptors.

use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::kind::LayerKind;

/// The interactive capability of a semantic layer.
///
/// A descriptor that carries an `InspectConfig` is interactive: its physical
/// layers are subscribed for pointer events and its features show up in the
/// info panel.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InspectConfig {
    /// Property key used as the feature title, if any.
    pub title: Option<String>,
    /// Property keys shown in full detail, in order. Empty means all properties.
    pub fields: Vec<String>,
}

impl InspectConfig {
    /// Creates an inspect config that titles features by `key`.
    #[must_use]
    pub fn titled(key: impl Into<String>) -> Self {
        Self {
            title: Some(key.into()),
            fields: Vec::new(),
        }
    }

    /// Sets the fields shown in full detail.
    #[must_use]
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }
}

/// A semantic layer as declared in the layer catalogue.
///
/// Catalogue JSON uses camelCase keys and `type` for the kind:
///
/// ```rust
/// # use waymark_layer::{LayerDescriptor, LayerKind};
/// let json = r#"{
///     "id": "schools",
///     "type": "vector",
///     "sourceLayer": "education",
///     "inspect": { "title": "name" }
/// }"#;
/// let d: LayerDescriptor = serde_json::from_str(json).unwrap();
/// assert_eq!(d.kind, LayerKind::Vector);
/// assert_eq!(d.source_layer.as_deref(), Some("education"));
/// assert!(d.is_interactive());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerDescriptor {
    /// Semantic layer id.
    pub id: String,
    /// Layer kind. Sublayers may omit it.
    #[serde(rename = "type", default)]
    pub kind: LayerKind,
    /// Source-layer name inside a vector source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_layer: Option<String>,
    /// Alternate source-layer names that also belong to this layer.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alt_source_layers: Vec<String>,
    /// Nested sub-layer descriptors.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sublayers: Vec<Self>,
    /// Explicit physical source id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Group this layer belongs to, for paint ordering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Interactive capability.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspect: Option<InspectConfig>,
}

impl LayerDescriptor {
    /// Creates a non-interactive descriptor with only an id and kind.
    #[must_use]
    pub fn new(id: impl Into<String>, kind: LayerKind) -> Self {
        Self {
            id: id.into(),
            kind,
            source_layer: None,
            alt_source_layers: Vec::new(),
            sublayers: Vec::new(),
            source: None,
            group: None,
            inspect: None,
        }
    }

    /// Sets the source-layer name.
    #[must_use]
    pub fn with_source_layer(mut self, name: impl Into<String>) -> Self {
        self.source_layer = Some(name.into());
        self
    }

    /// Adds alternate source-layer names.
    #[must_use]
    pub fn with_alt_source_layers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.alt_source_layers
            .extend(names.into_iter().map(Into::into));
        self
    }

    /// Appends a sub-layer descriptor.
    #[must_use]
    pub fn with_sublayer(mut self, sublayer: Self) -> Self {
        self.sublayers.push(sublayer);
        self
    }

    /// Sets the explicit physical source id.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the paint-order group.
    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Makes the layer interactive.
    #[must_use]
    pub fn with_inspect(mut self, inspect: InspectConfig) -> Self {
        self.inspect = Some(inspect);
        self
    }

    /// Returns `true` if the layer declares an inspect capability.
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        self.inspect.is_some()
    }

    /// Returns the paint-order group, defaulting to the layer id.
    #[must_use]
    pub fn group_id(&self) -> &str {
        self.group.as_deref().unwrap_or(&self.id)
    }

    /// Returns the source id a `GeoJSON` layer's data is registered under.
    #[must_use]
    pub fn geojson_source_id(&self) -> String {
        alloc::format!("geojson-{}", self.id)
    }
}
