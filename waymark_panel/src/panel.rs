// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The panel observer and its incremental rebuild.

use hashbrown::{HashMap, HashSet};
use tracing::trace;
use waymark_feature::{Feature, FeatureId, FeatureKey, FeatureRecord, PropertyValue};
use waymark_interaction::{ChangeNotification, ChangeObserver, FeatureQuery};
use waymark_layer::InspectConfig;

use crate::model::{DisplayMode, PanelEntry, PanelModel, PanelSection};

/// Property keys tried, in order, when the layer names no title key.
const TITLE_KEYS: [&str; 2] = ["name", "title"];

/// Lists hovered, selected and starred features, grouped by layer.
///
/// The panel listens for change notifications and only rebuilds the layers
/// they name. Per-feature display modes persist across renders for as long
/// as the feature stays in the store.
#[derive(Debug)]
pub struct FeatureInfoPanel {
    modes: HashMap<FeatureKey, DisplayMode>,
    sections: HashMap<String, PanelSection>,
    stale: HashSet<String>,
    /// Set until the first render, which builds every layer.
    all_stale: bool,
}

impl Default for FeatureInfoPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureInfoPanel {
    /// Creates an empty panel. The first render builds every layer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            modes: HashMap::new(),
            sections: HashMap::new(),
            stale: HashSet::new(),
            all_stale: true,
        }
    }

    /// Marks a layer for rebuild on the next render.
    pub fn invalidate(&mut self, layer_id: &str) {
        self.stale.insert(layer_id.to_owned());
    }

    /// Returns `true` if a layer will be rebuilt on the next render.
    #[must_use]
    pub fn is_stale(&self, layer_id: &str) -> bool {
        self.all_stale || self.stale.contains(layer_id)
    }

    /// Returns the display mode of a feature, if the panel tracks it.
    #[must_use]
    pub fn mode(&self, layer_id: &str, feature_id: &FeatureId) -> Option<DisplayMode> {
        self.modes.get(&key(layer_id, feature_id)).copied()
    }

    /// Expands or collapses a feature, returning the new mode.
    ///
    /// Selected features always show in full and are not affected. Unknown
    /// features return `None`.
    pub fn toggle_display_mode(
        &mut self,
        layer_id: &str,
        feature_id: &FeatureId,
    ) -> Option<DisplayMode> {
        let selected = self
            .sections
            .get(layer_id)
            .and_then(|section| section.entry(feature_id))
            .is_some_and(|entry| entry.selected);
        let mode = self.modes.get_mut(&key(layer_id, feature_id))?;
        if selected {
            return Some(DisplayMode::Full);
        }
        *mode = mode.toggled();
        let mode = *mode;
        self.invalidate(layer_id);
        Some(mode)
    }

    /// Rebuilds stale layers from `source` and returns the whole panel.
    pub fn render(&mut self, source: &impl FeatureQuery) -> PanelModel {
        let layers = source.registered_layers();
        self.sections
            .retain(|layer_id, _| layers.contains(layer_id));
        self.modes.retain(|k, _| layers.contains(&k.layer_id));

        let mut rebuilt = 0;
        for layer_id in &layers {
            if self.is_stale(layer_id) || !self.sections.contains_key(layer_id.as_str()) {
                let section = self.build_section(layer_id, source);
                self.sections.insert(layer_id.clone(), section);
                rebuilt += 1;
            }
        }
        trace!(layers = layers.len(), rebuilt, "panel rendered");
        self.stale.clear();
        self.all_stale = false;

        PanelModel {
            sections: layers
                .iter()
                .filter_map(|layer_id| self.sections.get(layer_id.as_str()))
                .filter(|section| !section.entries.is_empty())
                .cloned()
                .collect(),
        }
    }

    fn build_section(&mut self, layer_id: &str, source: &impl FeatureQuery) -> PanelSection {
        let inspect = source
            .descriptor(layer_id)
            .and_then(|descriptor| descriptor.inspect.clone())
            .unwrap_or_default();
        let records = source.layer_features(layer_id);

        let present: HashSet<&FeatureId> = records.iter().map(|r| &r.feature_id).collect();
        self.modes
            .retain(|k, _| k.layer_id != layer_id || present.contains(&k.feature_id));

        let mut entries: Vec<PanelEntry> = records
            .iter()
            .map(|record| {
                let mode = self.next_mode(record);
                entry(record, mode, &inspect)
            })
            .collect();
        entries.sort_by(|a, b| {
            b.hovered
                .cmp(&a.hovered)
                .then(b.selected.cmp(&a.selected))
                .then(b.starred.cmp(&a.starred))
                .then(b.timestamp.cmp(&a.timestamp))
                .then_with(|| a.feature_id.cmp(&b.feature_id))
        });
        PanelSection {
            layer_id: layer_id.to_owned(),
            entries,
        }
    }

    /// Selected features go full, hovered ones compact, starred ones keep
    /// whatever they had.
    fn next_mode(&mut self, record: &FeatureRecord) -> DisplayMode {
        let slot = self
            .modes
            .entry(key(&record.layer_id, &record.feature_id))
            .or_default();
        if record.is_selected() {
            *slot = DisplayMode::Full;
        } else if record.is_hovered() {
            *slot = DisplayMode::Compact;
        }
        *slot
    }
}

impl ChangeObserver for FeatureInfoPanel {
    fn on_change(&mut self, notification: &ChangeNotification) {
        for layer_id in &notification.changed_layers {
            self.invalidate(layer_id);
        }
    }
}

fn key(layer_id: &str, feature_id: &FeatureId) -> FeatureKey {
    FeatureKey {
        layer_id: layer_id.to_owned(),
        feature_id: feature_id.clone(),
    }
}

fn entry(record: &FeatureRecord, mode: DisplayMode, inspect: &InspectConfig) -> PanelEntry {
    let fields = match mode {
        DisplayMode::Compact => Vec::new(),
        DisplayMode::Full => fields(&record.feature, inspect),
    };
    PanelEntry {
        feature_id: record.feature_id.clone(),
        title: title(&record.feature, &record.feature_id, inspect),
        mode,
        hovered: record.is_hovered(),
        selected: record.is_selected(),
        starred: record.is_starred(),
        lng_lat: record.lng_lat,
        timestamp: record.timestamp,
        fields,
    }
}

/// The configured title property, else `name`, else `title`, else the id.
fn title(feature: &Feature, feature_id: &FeatureId, inspect: &InspectConfig) -> String {
    inspect
        .title
        .iter()
        .map(String::as_str)
        .chain(TITLE_KEYS)
        .filter_map(|k| feature.property(k))
        .filter(|value| !matches!(value, PropertyValue::Null))
        .map(ToString::to_string)
        .find(|text| !text.is_empty())
        .unwrap_or_else(|| feature_id.to_string())
}

/// The configured fields that exist, or every property in key order.
fn fields(feature: &Feature, inspect: &InspectConfig) -> Vec<(String, String)> {
    if inspect.fields.is_empty() {
        return feature
            .properties
            .iter()
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect();
    }
    inspect
        .fields
        .iter()
        .filter_map(|k| feature.property(k).map(|v| (k.clone(), v.to_string())))
        .collect()
}
