// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Feature snapshots, property values, and feature ids.

use alloc::borrow::ToOwned;
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::{String, ToString};
use core::borrow::Borrow;
use core::fmt;

use crate::geometry::Geometry;

/// Identifies a feature independently of the layer it was seen in.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureId(String);

impl FeatureId {
    /// Creates a feature id from any string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the fallback id derived from a geometry hash.
    #[must_use]
    pub fn from_geometry(geometry: &Geometry) -> Self {
        Self(format!("geom-{:016x}", geometry.stable_hash()))
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for FeatureId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FeatureId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for FeatureId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for FeatureId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<i64> for FeatureId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

/// A scalar property value.
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyValue {
    /// Explicit null.
    Null,
    /// Boolean.
    Bool(bool),
    /// Number.
    Number(f64),
    /// String.
    String(String),
}

/// Largest magnitude where every integer is exactly representable in `f64`.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

impl PropertyValue {
    /// Interprets this value as a feature id.
    ///
    /// Non-empty strings and finite numbers qualify; integral numbers are
    /// rendered without a fractional part.
    #[must_use]
    pub fn as_feature_id(&self) -> Option<FeatureId> {
        match self {
            Self::String(s) if !s.is_empty() => Some(FeatureId::new(s.as_str())),
            Self::Number(n) if n.is_finite() => Some(FeatureId::new(format_number(*n))),
            _ => None,
        }
    }

    /// Returns the value as a string slice, if it is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => f.write_str(&format_number(*n)),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<i64> for PropertyValue {
    #[allow(
        clippy::cast_precision_loss,
        reason = "property numbers are f64 on the wire"
    )]
    fn from(v: i64) -> Self {
        Self::Number(v as f64)
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    reason = "range-checked against the safe integer range; the round trip detects fractions"
)]
fn format_number(n: f64) -> String {
    if (-MAX_SAFE_INTEGER..=MAX_SAFE_INTEGER).contains(&n) {
        let int = n as i64;
        if int as f64 == n {
            return int.to_string();
        }
    }
    format!("{n}")
}

/// Feature properties in key order.
pub type Properties = BTreeMap<String, PropertyValue>;

/// An immutable snapshot of a feature as delivered by the rendering engine.
#[derive(Clone, Debug, PartialEq)]
pub struct Feature {
    /// The feature's own id, if the source assigns one.
    pub id: Option<FeatureId>,
    /// Geometry.
    pub geometry: Geometry,
    /// Properties.
    pub properties: Properties,
}

impl Feature {
    /// Creates a feature with no id and no properties.
    #[must_use]
    pub fn new(geometry: Geometry) -> Self {
        Self {
            id: None,
            geometry,
            properties: Properties::new(),
        }
    }

    /// Sets the feature's own id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<FeatureId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Adds a property.
    #[must_use]
    pub fn with_property(
        mut self,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Returns a property by key.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Derives the feature id.
    ///
    /// In order: the feature's own id, `properties.id`, `properties.fid`, and
    /// finally a hash of the geometry. The fallback is idempotent for
    /// identical geometry but not guaranteed collision-free.
    #[must_use]
    pub fn feature_id(&self) -> FeatureId {
        if let Some(id) = &self.id {
            return id.clone();
        }
        ["id", "fid"]
            .iter()
            .find_map(|key| self.property(key).and_then(PropertyValue::as_feature_id))
            .unwrap_or_else(|| FeatureId::from_geometry(&self.geometry))
    }
}
