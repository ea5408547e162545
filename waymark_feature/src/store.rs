// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The authoritative record of per-feature interaction state.

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use hashbrown::{HashMap, HashSet};
use kurbo::Point;
use smallvec::SmallVec;
use understory_dirty::intern::Interner;
use understory_dirty::{Channel, DirtySet, InternId};

use crate::feature::{Feature, FeatureId};
use crate::record::{FeatureRecord, InteractionFlags};

/// Dirty channel marked for every layer whose records changed.
pub const RECORDS: Channel = Channel::new(0);

/// One flag flipping on one record.
///
/// Mutations report these so callers can mirror hover and selection onto an
/// ephemeral highlight overlay.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlagChange {
    /// Layer of the record.
    pub layer_id: String,
    /// Feature of the record.
    pub feature_id: FeatureId,
    /// The flag that changed; a single bit.
    pub flag: InteractionFlags,
    /// New value of the flag.
    pub value: bool,
}

/// Flag changes produced by one mutation.
pub type FlagChanges = SmallVec<[FlagChange; 2]>;

/// A `(layer, feature)` pair naming one record.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureKey {
    /// Layer id.
    pub layer_id: String,
    /// Feature id.
    pub feature_id: FeatureId,
}

type LayerRecords = HashMap<FeatureId, FeatureRecord>;

/// Per-feature, per-layer interaction state.
///
/// All mutations are synchronous and total. A record exists while its
/// feature is hovered, selected, or starred; records that lose all three are
/// deleted (eviction also removes idle records). The starred set lives apart
/// from the records and survives their deletion.
///
/// Every mutation marks the touched layers dirty in [`RECORDS`]; drain them
/// with [`FeatureStateStore::take_dirty_layers`].
#[derive(Debug, Default)]
pub struct FeatureStateStore {
    layers: HashMap<String, LayerRecords>,
    starred: HashSet<FeatureId>,
    layer_keys: Interner<String>,
    dirty: DirtySet<InternId>,
    revision: u64,
}

impl FeatureStateStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hovers `feature` on `layer_id`.
    ///
    /// Any other hovered record on the layer loses its hover flag and is
    /// deleted unless selected or starred. Then the feature's record is
    /// created or refreshed with the hover flag set.
    pub fn on_hover(
        &mut self,
        feature: Arc<Feature>,
        layer_id: &str,
        lng_lat: Point,
        now: u64,
    ) -> FlagChanges {
        let feature_id = feature.feature_id();
        let mut changes = FlagChanges::new();

        let records = self.layers.entry_ref(layer_id).or_default();
        let stale: SmallVec<[FeatureId; 2]> = records
            .values()
            .filter(|r| r.is_hovered() && r.feature_id != feature_id)
            .map(|r| r.feature_id.clone())
            .collect();
        for id in stale {
            clear_flag(
                records,
                &self.starred,
                &id,
                InteractionFlags::HOVERED,
                &mut changes,
            );
        }

        let record = upsert(records, feature_id, feature, layer_id, lng_lat, now);
        set_flag(record, InteractionFlags::HOVERED, &mut changes);

        self.mark(layer_id);
        changes
    }

    /// Selects `feature` on `layer_id`.
    ///
    /// Selection is global: every other selected record, in any layer, is
    /// unselected first and deleted unless hovered or starred.
    pub fn on_click(
        &mut self,
        feature: Arc<Feature>,
        layer_id: &str,
        lng_lat: Point,
        now: u64,
    ) -> FlagChanges {
        let feature_id = feature.feature_id();
        let mut changes = FlagChanges::new();

        let selected: Vec<FeatureKey> = self
            .selected_keys()
            .filter(|key| !(key.layer_id == layer_id && key.feature_id == feature_id))
            .collect();
        for key in selected {
            if let Some(records) = self.layers.get_mut(key.layer_id.as_str()) {
                clear_flag(
                    records,
                    &self.starred,
                    &key.feature_id,
                    InteractionFlags::SELECTED,
                    &mut changes,
                );
            }
            self.mark(&key.layer_id);
        }

        let records = self.layers.entry_ref(layer_id).or_default();
        let record = upsert(records, feature_id, feature, layer_id, lng_lat, now);
        set_flag(record, InteractionFlags::SELECTED, &mut changes);

        self.mark(layer_id);
        changes
    }

    /// Clears every hover on `layer_id`, deleting records that are neither
    /// selected nor starred.
    pub fn on_leave(&mut self, layer_id: &str) -> FlagChanges {
        let mut changes = FlagChanges::new();
        let Some(records) = self.layers.get_mut(layer_id) else {
            return changes;
        };
        let hovered: SmallVec<[FeatureId; 2]> = records
            .values()
            .filter(|r| r.is_hovered())
            .map(|r| r.feature_id.clone())
            .collect();
        if hovered.is_empty() {
            return changes;
        }
        for id in hovered {
            clear_flag(
                records,
                &self.starred,
                &id,
                InteractionFlags::HOVERED,
                &mut changes,
            );
        }
        self.mark(layer_id);
        changes
    }

    /// Flips the star on `feature_id`.
    ///
    /// Returns the new star state, or `None` when the id is neither starred
    /// nor known to any record (nothing to star). Starring refreshes the
    /// timestamp of the feature's records; unstarring deletes records that
    /// are neither hovered nor selected.
    pub fn toggle_star(&mut self, feature_id: &FeatureId, now: u64) -> Option<bool> {
        let was_starred = self.starred.contains(feature_id);
        if !was_starred && !self.has_record(feature_id) {
            return None;
        }

        let mut touched: SmallVec<[String; 2]> = SmallVec::new();
        if was_starred {
            self.starred.remove(feature_id);
            for (layer_id, records) in &mut self.layers {
                let Some(record) = records.get(feature_id) else {
                    continue;
                };
                if !record.is_retained(false) {
                    records.remove(feature_id);
                }
                touched.push(layer_id.clone());
            }
        } else {
            self.starred.insert(feature_id.clone());
            for (layer_id, records) in &mut self.layers {
                if let Some(record) = records.get_mut(feature_id) {
                    record.timestamp = now;
                    touched.push(layer_id.clone());
                }
            }
        }

        for layer_id in &touched {
            self.mark(layer_id);
        }
        if touched.is_empty() {
            self.bump_revision();
        }
        Some(!was_starred)
    }

    /// Clears the selection flag of `feature_id`, deleting its record unless
    /// hovered or starred. Unknown or unselected ids are a no-op.
    pub fn close_selected(&mut self, feature_id: &FeatureId) -> FlagChanges {
        let mut changes = FlagChanges::new();
        let layers: SmallVec<[String; 1]> = self
            .selected_keys()
            .filter(|key| key.feature_id == *feature_id)
            .map(|key| key.layer_id)
            .collect();
        for layer_id in layers {
            if let Some(records) = self.layers.get_mut(layer_id.as_str()) {
                clear_flag(
                    records,
                    &self.starred,
                    feature_id,
                    InteractionFlags::SELECTED,
                    &mut changes,
                );
            }
            self.mark(&layer_id);
        }
        changes
    }

    /// Unselects everything, returning the records that were selected and
    /// the flag transitions it caused.
    pub fn clear_all_selections(&mut self) -> (Vec<FeatureKey>, FlagChanges) {
        let mut cleared: Vec<FeatureKey> = self.selected_keys().collect();
        cleared.sort();
        let mut changes = FlagChanges::new();
        for key in &cleared {
            if let Some(records) = self.layers.get_mut(key.layer_id.as_str()) {
                clear_flag(
                    records,
                    &self.starred,
                    &key.feature_id,
                    InteractionFlags::SELECTED,
                    &mut changes,
                );
            }
            self.mark(&key.layer_id);
        }
        (cleared, changes)
    }

    /// Deletes idle records: not hovered, not selected, not starred, and last
    /// touched more than `max_age` milliseconds before `now`.
    pub fn evict(&mut self, now: u64, max_age: u64) -> Vec<FeatureKey> {
        let mut evicted = Vec::new();
        for (layer_id, records) in &mut self.layers {
            records.retain(|id, record| {
                let idle = !record.is_retained(self.starred.contains(id))
                    && now.saturating_sub(record.timestamp) > max_age;
                if idle {
                    evicted.push(FeatureKey {
                        layer_id: layer_id.clone(),
                        feature_id: id.clone(),
                    });
                }
                !idle
            });
        }
        evicted.sort();
        let mut last: Option<&str> = None;
        for key in &evicted {
            if last != Some(key.layer_id.as_str()) {
                let interned = self.layer_keys.intern(key.layer_id.clone());
                self.dirty.mark(interned, RECORDS);
                last = Some(key.layer_id.as_str());
            }
        }
        if !evicted.is_empty() {
            self.bump_revision();
        }
        evicted
    }

    /// Deletes every record of `layer_id`, returning them. Stars survive.
    pub fn remove_layer(&mut self, layer_id: &str) -> Vec<FeatureRecord> {
        let Some(records) = self.layers.remove(layer_id) else {
            return Vec::new();
        };
        self.mark(layer_id);
        let mut removed: Vec<FeatureRecord> = records.into_values().collect();
        removed.sort_by(|a, b| a.feature_id.cmp(&b.feature_id));
        removed
    }

    /// Returns the records of `layer_id`, with the star flag merged in,
    /// ordered by feature id.
    #[must_use]
    pub fn layer_features(&self, layer_id: &str) -> Vec<FeatureRecord> {
        let Some(records) = self.layers.get(layer_id) else {
            return Vec::new();
        };
        let mut out: Vec<FeatureRecord> = records.values().map(|r| self.merged(r)).collect();
        out.sort_by(|a, b| a.feature_id.cmp(&b.feature_id));
        out
    }

    /// Returns one record, with the star flag merged in.
    #[must_use]
    pub fn record(&self, layer_id: &str, feature_id: &FeatureId) -> Option<FeatureRecord> {
        self.layers
            .get(layer_id)
            .and_then(|records| records.get(feature_id))
            .map(|r| self.merged(r))
    }

    /// Returns `true` if `feature_id` is starred.
    #[must_use]
    pub fn is_starred(&self, feature_id: &FeatureId) -> bool {
        self.starred.contains(feature_id)
    }

    /// Returns the starred ids, sorted.
    #[must_use]
    pub fn starred(&self) -> Vec<FeatureId> {
        let mut ids: Vec<FeatureId> = self.starred.iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Returns the selected record, if any.
    #[must_use]
    pub fn selected(&self) -> Option<FeatureKey> {
        self.selected_keys().next()
    }

    /// Returns the hovered feature of `layer_id`, if any.
    #[must_use]
    pub fn hovered(&self, layer_id: &str) -> Option<FeatureId> {
        self.layers
            .get(layer_id)?
            .values()
            .find(|r| r.is_hovered())
            .map(|r| r.feature_id.clone())
    }

    /// Returns the ids of layers that currently hold records, sorted.
    #[must_use]
    pub fn layer_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .layers
            .iter()
            .filter(|(_, records)| !records.is_empty())
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Total number of records across all layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.values().map(HashMap::len).sum()
    }

    /// Returns `true` if there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Monotonic counter bumped by every mutation that changed something.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns `true` if any layer changed since the last drain.
    #[must_use]
    pub fn has_dirty_layers(&self) -> bool {
        self.dirty.has_dirty(RECORDS)
    }

    /// Drains the layers whose records changed, sorted.
    pub fn take_dirty_layers(&mut self) -> Vec<String> {
        let interned: Vec<InternId> = self.dirty.drain(RECORDS).collect();
        let mut layers: Vec<String> = interned
            .into_iter()
            .filter_map(|id| self.layer_keys.get(id).cloned())
            .collect();
        layers.sort();
        layers
    }

    fn has_record(&self, feature_id: &FeatureId) -> bool {
        self.layers
            .values()
            .any(|records| records.contains_key(feature_id))
    }

    fn selected_keys(&self) -> impl Iterator<Item = FeatureKey> + '_ {
        self.layers.iter().flat_map(|(layer_id, records)| {
            records
                .values()
                .filter(|r| r.is_selected())
                .map(move |r| FeatureKey {
                    layer_id: layer_id.clone(),
                    feature_id: r.feature_id.clone(),
                })
        })
    }

    fn merged(&self, record: &FeatureRecord) -> FeatureRecord {
        let mut out = record.clone();
        out.flags.set(
            InteractionFlags::STARRED,
            self.starred.contains(&record.feature_id),
        );
        out
    }

    fn mark(&mut self, layer_id: &str) {
        let interned = self.layer_keys.intern(String::from(layer_id));
        self.dirty.mark(interned, RECORDS);
        self.bump_revision();
    }

    fn bump_revision(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

fn upsert<'r>(
    records: &'r mut LayerRecords,
    feature_id: FeatureId,
    feature: Arc<Feature>,
    layer_id: &str,
    lng_lat: Point,
    now: u64,
) -> &'r mut FeatureRecord {
    let record = records.entry(feature_id).or_insert_with_key(|id| {
        FeatureRecord::new(id.clone(), feature.clone(), layer_id, lng_lat, now)
    });
    record.feature = feature;
    record.lng_lat = lng_lat;
    record.timestamp = now;
    record
}

fn set_flag(record: &mut FeatureRecord, flag: InteractionFlags, changes: &mut FlagChanges) {
    if record.flags.contains(flag) {
        return;
    }
    record.flags.insert(flag);
    changes.push(FlagChange {
        layer_id: record.layer_id.clone(),
        feature_id: record.feature_id.clone(),
        flag,
        value: true,
    });
}

/// Clears `flag` on one record and deletes the record if nothing retains it.
fn clear_flag(
    records: &mut LayerRecords,
    starred: &HashSet<FeatureId>,
    feature_id: &FeatureId,
    flag: InteractionFlags,
    changes: &mut FlagChanges,
) {
    let Some(record) = records.get_mut(feature_id) else {
        return;
    };
    if !record.flags.contains(flag) {
        return;
    }
    record.flags.remove(flag);
    changes.push(FlagChange {
        layer_id: record.layer_id.clone(),
        feature_id: feature_id.clone(),
        flag,
        value: false,
    });
    if !record.is_retained(starred.contains(feature_id)) {
        records.remove(feature_id);
    }
}
