// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine configuration and layer catalogue parsing.

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use waymark_binding::RetryPolicy;
use waymark_layer::LayerDescriptor;
use waymark_order::RenderOrder;

/// Errors from parsing or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The document is not valid JSON for the expected shape.
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// An interval that drives a timer is zero.
    #[error("`{0}` must be greater than zero")]
    ZeroInterval(&'static str),
    /// A catalogue entry has an empty id.
    #[error("catalogue entry {0} has an empty id")]
    EmptyLayerId(usize),
    /// Two catalogue entries share an id.
    #[error("layer `{0}` appears more than once in the catalogue")]
    DuplicateLayer(String),
}

/// Tunables of the interaction engine.
///
/// Every field has a default, so a partial JSON object is valid.
///
/// ```rust
/// use waymark_interaction::EngineConfig;
///
/// let config = EngineConfig::from_json(r#"{ "max_retries": 5 }"#).unwrap();
/// assert_eq!(config.max_retries, 5);
/// assert_eq!(config.retry_delay_ms, 300);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Delay between binding retries, in milliseconds.
    pub retry_delay_ms: u64,
    /// Binding retries after the initial attempt.
    pub max_retries: u32,
    /// Interval between eviction sweeps, in milliseconds.
    pub sweep_interval_ms: u64,
    /// Idle records older than this are evicted, in milliseconds.
    pub max_age_ms: u64,
    /// Paint-order tables used to place new layers.
    pub render_order: RenderOrder,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            retry_delay_ms: 300,
            max_retries: 3,
            sweep_interval_ms: 30_000,
            max_age_ms: 60_000,
            render_order: RenderOrder::default(),
        }
    }
}

impl EngineConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations whose timers could not make progress.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retry_delay_ms == 0 {
            return Err(ConfigError::ZeroInterval("retry_delay_ms"));
        }
        if self.sweep_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval("sweep_interval_ms"));
        }
        if self.max_age_ms == 0 {
            return Err(ConfigError::ZeroInterval("max_age_ms"));
        }
        Ok(())
    }

    /// The binding retry policy these settings describe.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_delay_ms, self.max_retries)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogueDocument {
    Wrapped { layers: Vec<LayerDescriptor> },
    Bare(Vec<LayerDescriptor>),
}

/// Parses a layer catalogue.
///
/// Accepts either `{"layers": [...]}` or a bare array of descriptors. Ids must
/// be non-empty and unique at the top level.
pub fn parse_catalogue(json: &str) -> Result<Vec<LayerDescriptor>, ConfigError> {
    let layers = match serde_json::from_str(json)? {
        CatalogueDocument::Wrapped { layers } | CatalogueDocument::Bare(layers) => layers,
    };
    {
        let mut seen = HashSet::new();
        for (index, layer) in layers.iter().enumerate() {
            if layer.id.is_empty() {
                return Err(ConfigError::EmptyLayerId(index));
            }
            if !seen.insert(layer.id.as_str()) {
                return Err(ConfigError::DuplicateLayer(layer.id.clone()));
            }
        }
    }
    Ok(layers)
}
