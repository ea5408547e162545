// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The rendered panel: sections of entries, one section per layer.

use std::fmt;

use kurbo::Point;
use waymark_feature::FeatureId;

/// How much of a feature an entry shows.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum DisplayMode {
    /// Title only.
    #[default]
    Compact,
    /// Title and fields.
    Full,
}

impl DisplayMode {
    /// The other mode.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Compact => Self::Full,
            Self::Full => Self::Compact,
        }
    }
}

/// One feature in the panel.
#[derive(Clone, Debug, PartialEq)]
pub struct PanelEntry {
    /// Feature id.
    pub feature_id: FeatureId,
    /// Display title.
    pub title: String,
    /// Display mode.
    pub mode: DisplayMode,
    /// The pointer is over the feature.
    pub hovered: bool,
    /// The feature is selected.
    pub selected: bool,
    /// The feature is starred.
    pub starred: bool,
    /// Last interaction coordinate.
    pub lng_lat: Point,
    /// Last-touched time, in milliseconds.
    pub timestamp: u64,
    /// `(key, value)` pairs; empty unless the mode is [`DisplayMode::Full`].
    pub fields: Vec<(String, String)>,
}

/// The entries of one semantic layer.
#[derive(Clone, Debug, PartialEq)]
pub struct PanelSection {
    /// Semantic layer id.
    pub layer_id: String,
    /// Entries in display order.
    pub entries: Vec<PanelEntry>,
}

impl PanelSection {
    /// Finds an entry by feature id.
    #[must_use]
    pub fn entry(&self, feature_id: &FeatureId) -> Option<&PanelEntry> {
        self.entries.iter().find(|e| e.feature_id == *feature_id)
    }
}

/// A full panel rendering. Layers without entries are omitted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PanelModel {
    /// Sections in layer registration order.
    pub sections: Vec<PanelSection>,
}

impl PanelModel {
    /// Returns the section of `layer_id`.
    #[must_use]
    pub fn section(&self, layer_id: &str) -> Option<&PanelSection> {
        self.sections.iter().find(|s| s.layer_id == layer_id)
    }

    /// Returns `true` if there is nothing to show.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Total number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.iter().map(|s| s.entries.len()).sum()
    }
}

impl fmt::Display for PanelModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sections.is_empty() {
            return writeln!(f, "(no features)");
        }
        for section in &self.sections {
            writeln!(f, "{}", section.layer_id)?;
            for entry in &section.entries {
                write!(f, "  {}", entry.title)?;
                let mut marks = Vec::new();
                if entry.hovered {
                    marks.push("hovered");
                }
                if entry.selected {
                    marks.push("selected");
                }
                if entry.starred {
                    marks.push("starred");
                }
                if !marks.is_empty() {
                    write!(f, " [{}]", marks.join(", "))?;
                }
                writeln!(f)?;
                for (key, value) in &entry.fields {
                    writeln!(f, "    {key}: {value}")?;
                }
            }
        }
        Ok(())
    }
}
