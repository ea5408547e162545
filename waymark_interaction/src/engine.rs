// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The interaction engine: registration, binding, routing and coalescing.

use std::sync::Arc;

use hashbrown::{HashMap, HashSet};
use kurbo::Point;
use smallvec::SmallVec;
use tracing::{debug, info, trace, warn};
use waymark_binding::{BoundLayers, LayerBindingResolver, Resolution, RetryPolicy};
use waymark_feature::{
    Feature, FeatureId, FeatureKey, FeatureRecord, FeatureStateStore, FlagChange, InteractionFlags,
};
use waymark_layer::{LayerDescriptor, PhysicalLayer};
use waymark_timing::{TimerId, TimerQueue};

use crate::config::{ConfigError, EngineConfig, parse_catalogue};
use crate::event::{
    ChangeNotification, ChangeObserver, Event, EventData, EventType, ObserverId, Observers,
};
use crate::host::{Clock, HighlightTarget, HostError, MapHost};
use crate::pointer::{PointerEvent, PointerKind};
use crate::query::FeatureQuery;

type Owners = SmallVec<[String; 2]>;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Timer {
    Retry { layer_id: String },
    Sweep,
}

#[derive(Debug)]
struct Registration {
    descriptor: LayerDescriptor,
    bound: BoundLayers,
    targets: SmallVec<[HighlightTarget; 2]>,
    /// Retries run so far.
    retries: u32,
    retry: Option<TimerId>,
}

impl Registration {
    fn new(descriptor: LayerDescriptor) -> Self {
        Self {
            descriptor,
            bound: BoundLayers::new(),
            targets: SmallVec::new(),
            retries: 0,
            retry: None,
        }
    }

    fn is_active(&self) -> bool {
        self.descriptor.is_interactive() && !self.bound.is_empty()
    }
}

#[derive(Debug)]
struct PendingFrame {
    last: Event,
    coalesced: usize,
}

/// Tracks hover, selection and stars for dynamically registered map layers.
///
/// The engine owns a [`MapHost`] and a [`Clock`] and is driven entirely by
/// the host's event loop:
///
/// - layers come and go through [`register_layer`](Self::register_layer) and
///   [`unregister_layer`](Self::unregister_layer);
/// - pointer events arrive through [`handle_pointer`](Self::handle_pointer)
///   (physical ids) or the `on_feature_*` methods (semantic ids);
/// - deferred work runs from [`advance`](Self::advance), which the host calls
///   at [`next_deadline`](Self::next_deadline);
/// - observers hear about changes once per frame, from
///   [`on_animation_frame`](Self::on_animation_frame).
///
/// Nothing here fails: host errors are logged and absorbed.
#[derive(Debug)]
pub struct InteractionEngine<H, C> {
    host: H,
    clock: C,
    config: EngineConfig,
    retry_policy: RetryPolicy,
    resolver: LayerBindingResolver,
    store: FeatureStateStore,
    layers: HashMap<String, Registration>,
    /// Semantic ids in registration order.
    order: Vec<String>,
    /// Physical id to the semantic layers bound to it, oldest first.
    routes: HashMap<String, Owners>,
    timers: TimerQueue<Timer>,
    observers: Observers,
    pending: Option<PendingFrame>,
    /// Layers registered or unregistered since the last flush.
    structural: HashSet<String>,
}

impl<H: MapHost, C: Clock> InteractionEngine<H, C> {
    /// Creates an engine with a validated configuration.
    pub fn new(host: H, clock: C, config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(host, clock, config))
    }

    /// Creates an engine with [`EngineConfig::default`].
    #[must_use]
    pub fn with_default_config(host: H, clock: C) -> Self {
        Self::build(host, clock, EngineConfig::default())
    }

    fn build(host: H, clock: C, config: EngineConfig) -> Self {
        let mut timers = TimerQueue::new();
        timers.schedule(
            clock.now_ms().saturating_add(config.sweep_interval_ms),
            Timer::Sweep,
        );
        Self {
            host,
            clock,
            retry_policy: config.retry_policy(),
            config,
            resolver: LayerBindingResolver::new(),
            store: FeatureStateStore::new(),
            layers: HashMap::new(),
            order: Vec::new(),
            routes: HashMap::new(),
            timers,
            observers: Observers::default(),
            pending: None,
            structural: HashSet::new(),
        }
    }

    /// Replaces the binding resolver.
    #[must_use]
    pub fn with_resolver(mut self, resolver: LayerBindingResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// The host.
    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The host, mutably.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The clock.
    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The underlying state store.
    #[must_use]
    pub fn store(&self) -> &FeatureStateStore {
        &self.store
    }

    // Registration --------------------------------------------------------

    /// Registers a semantic layer.
    ///
    /// Interactive layers are bound right away if the style already has
    /// matching physical layers; otherwise binding is retried on the timer
    /// queue. Registering an id again replaces the earlier registration.
    pub fn register_layer(&mut self, descriptor: LayerDescriptor) {
        let layer_id = descriptor.id.clone();
        if self.layers.contains_key(layer_id.as_str()) {
            debug!(layer = %layer_id, "replacing existing registration");
            self.teardown(&layer_id);
        }

        let interactive = descriptor.is_interactive();
        self.layers
            .insert(layer_id.clone(), Registration::new(descriptor));
        self.order.push(layer_id.clone());

        if interactive {
            self.attempt_binding(&layer_id);
        } else {
            trace!(layer = %layer_id, "not inspectable; no pointer subscriptions");
        }
        info!(layer = %layer_id, interactive, "layer registered");

        self.structural.insert(layer_id.clone());
        self.emit(EventType::LayerRegistered, EventData::Layer { layer_id });
    }

    /// Registers every layer of a catalogue document, returning how many.
    pub fn register_catalogue(&mut self, json: &str) -> Result<usize, ConfigError> {
        let descriptors = parse_catalogue(json)?;
        let count = descriptors.len();
        for descriptor in descriptors {
            self.register_layer(descriptor);
        }
        Ok(count)
    }

    /// Unregisters a semantic layer.
    ///
    /// Pending retries are cancelled, pointer subscriptions dropped, and all
    /// of the layer's records deleted. Stars survive. Returns `false` for
    /// unknown ids.
    pub fn unregister_layer(&mut self, layer_id: &str) -> bool {
        if !self.layers.contains_key(layer_id) {
            trace!(layer = %layer_id, "unregister of unknown layer ignored");
            return false;
        }
        let removed = self.teardown(layer_id);
        info!(layer = %layer_id, records = removed, "layer unregistered");

        self.structural.insert(layer_id.to_owned());
        self.emit(
            EventType::LayerUnregistered,
            EventData::Layer {
                layer_id: layer_id.to_owned(),
            },
        );
        true
    }

    /// Drops everything the engine holds for `layer_id`. Returns the number
    /// of records deleted.
    fn teardown(&mut self, layer_id: &str) -> usize {
        let cancelled = self
            .timers
            .cancel_where(|timer| matches!(timer, Timer::Retry { layer_id: id } if id == layer_id));
        if cancelled > 0 {
            trace!(layer = %layer_id, cancelled, "cancelled pending retries");
        }

        let records = self.store.remove_layer(layer_id);
        let cleared: Vec<FlagChange> = records.iter().flat_map(cleared_highlights).collect();
        self.apply_highlights(&cleared);

        let Some(registration) = self.layers.remove(layer_id) else {
            return records.len();
        };
        self.order.retain(|id| id != layer_id);
        for physical in &registration.bound {
            let Some(owners) = self.routes.get_mut(physical.as_str()) else {
                continue;
            };
            owners.retain(|owner| owner != layer_id);
            if !owners.is_empty() {
                trace!(layer = %layer_id, physical = %physical, "physical layer still shared");
                continue;
            }
            self.routes.remove(physical.as_str());
            match self.host.unsubscribe_pointer(physical) {
                Ok(()) => {}
                Err(HostError::LayerNotFound(_)) => {
                    trace!(layer = %layer_id, physical = %physical, "physical layer already gone");
                }
                Err(err) => {
                    debug!(layer = %layer_id, physical = %physical, %err, "unsubscribe failed");
                }
            }
        }
        records.len()
    }

    /// Runs one resolution attempt against the current style.
    ///
    /// An attempt that ends with nothing bound, whether nothing matched or
    /// every subscription failed, schedules the next retry until the budget
    /// is spent.
    fn attempt_binding(&mut self, layer_id: &str) {
        let style = self.host.style_layers();
        let Some(registration) = self.layers.get(layer_id) else {
            return;
        };
        let resolution = self.resolver.resolve(&registration.descriptor, &style);
        let bound = if resolution.is_empty() {
            0
        } else {
            self.bind(layer_id, &resolution, &style)
        };
        if bound == 0 {
            self.schedule_retry(layer_id, resolution.len());
        } else if let Some(registration) = self.layers.get_mut(layer_id) {
            registration.retry = None;
        }
    }

    fn schedule_retry(&mut self, layer_id: &str, matched: usize) {
        let now = self.clock.now_ms();
        let Some(registration) = self.layers.get_mut(layer_id) else {
            return;
        };
        match self.retry_policy.next_delay(registration.retries) {
            Some(delay) => {
                let at = now.saturating_add(delay);
                registration.retry = Some(self.timers.schedule(
                    at,
                    Timer::Retry {
                        layer_id: layer_id.to_owned(),
                    },
                ));
                debug!(
                    layer = %layer_id,
                    matched,
                    retries = registration.retries,
                    retry_at = at,
                    "no physical layers bound yet; will retry"
                );
            }
            None => {
                registration.retry = None;
                warn!(
                    layer = %layer_id,
                    matched,
                    retries = registration.retries,
                    "no physical layers bound; layer stays inert"
                );
            }
        }
    }

    /// Subscribes every resolved physical layer and records its routing.
    /// Returns how many were bound.
    fn bind(&mut self, layer_id: &str, resolution: &Resolution, style: &[PhysicalLayer]) -> usize {
        let mut bound = BoundLayers::new();
        let mut targets: SmallVec<[HighlightTarget; 2]> = SmallVec::new();
        for (physical, strategy) in resolution.iter() {
            match self.routes.get_mut(physical) {
                Some(owners) => {
                    // The host already delivers this layer's events.
                    debug!(
                        layer = %layer_id,
                        physical,
                        shared_with = ?owners,
                        "sharing physical layer"
                    );
                    if !owners.iter().any(|owner| owner == layer_id) {
                        owners.push(layer_id.to_owned());
                    }
                }
                None => {
                    if let Err(err) = self.host.subscribe_pointer(physical) {
                        warn!(layer = %layer_id, physical, %err, "pointer subscription failed");
                        continue;
                    }
                    let mut owners = Owners::new();
                    owners.push(layer_id.to_owned());
                    self.routes.insert(physical.to_owned(), owners);
                }
            }
            trace!(layer = %layer_id, physical, strategy = strategy.name(), "bound");
            bound.push(physical.to_owned());

            if let Some(target) = style
                .iter()
                .find(|layer| layer.id == physical)
                .and_then(HighlightTarget::of_layer)
                && !targets.contains(&target)
            {
                targets.push(target);
            }
        }
        let count = bound.len();
        info!(
            layer = %layer_id,
            bound = count,
            filtered = resolution.filtered(),
            "layer bound"
        );
        if let Some(registration) = self.layers.get_mut(layer_id) {
            registration.bound = bound;
            registration.targets = targets;
        }
        count
    }

    // Timers --------------------------------------------------------------

    /// Runs every timer that is due, returning how many fired.
    pub fn advance(&mut self) -> usize {
        let now = self.clock.now_ms();
        let due = self.timers.pop_due(now);
        let fired = due.len();
        for (id, timer) in due {
            match timer {
                Timer::Retry { layer_id } => {
                    let Some(registration) = self.layers.get_mut(layer_id.as_str()) else {
                        continue;
                    };
                    if registration.retry != Some(id) {
                        continue;
                    }
                    registration.retry = None;
                    registration.retries += 1;
                    self.attempt_binding(&layer_id);
                }
                Timer::Sweep => {
                    self.sweep(now);
                    self.timers.schedule(
                        now.saturating_add(self.config.sweep_interval_ms),
                        Timer::Sweep,
                    );
                }
            }
        }
        fired
    }

    /// The earliest time [`advance`](Self::advance) has work to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_deadline()
    }

    /// Returns `true` if a binding retry is pending for `layer_id`.
    #[must_use]
    pub fn is_retry_pending(&self, layer_id: &str) -> bool {
        self.layers
            .get(layer_id)
            .and_then(|registration| registration.retry)
            .is_some_and(|id| self.timers.is_pending(id))
    }

    /// Evicts idle records. Every mutation deletes a record as soon as it
    /// loses its last flag, so in normal operation the sweep finds nothing
    /// and emits nothing; it only clears records a host left behind.
    fn sweep(&mut self, now: u64) {
        let evicted = self.store.evict(now, self.config.max_age_ms);
        if evicted.is_empty() {
            trace!("sweep found no idle records");
            return;
        }
        debug!(evicted = evicted.len(), "evicted idle records");
        self.emit(
            EventType::Cleanup,
            EventData::Count {
                count: evicted.len(),
            },
        );
    }

    // Pointer input -------------------------------------------------------

    /// Routes a physical-layer pointer event to the semantic layers bound
    /// to it.
    ///
    /// Moves and leaves reach every owning layer. Selection is global, so a
    /// click goes to the most recently registered owner only.
    ///
    /// Events for physical ids the engine did not subscribe to are ignored.
    /// Returns `true` if the event changed state.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> bool {
        let Some(owners) = self.routes.get(event.layer_id.as_str()).cloned() else {
            trace!(physical = %event.layer_id, "pointer event on unbound layer ignored");
            return false;
        };
        match (event.kind, event.feature) {
            (PointerKind::Move, Some(feature)) => owners.iter().fold(false, |changed, layer_id| {
                self.on_feature_hover(feature.clone(), layer_id, event.lng_lat) || changed
            }),
            (PointerKind::Click, Some(feature)) => owners
                .last()
                .is_some_and(|layer_id| self.on_feature_click(feature, layer_id, event.lng_lat)),
            (PointerKind::Leave, _) => owners
                .iter()
                .fold(false, |changed, layer_id| self.on_feature_leave(layer_id) || changed),
            (_, None) => false,
        }
    }

    /// Hovers `feature` on a semantic layer.
    pub fn on_feature_hover(
        &mut self,
        feature: Arc<Feature>,
        layer_id: &str,
        lng_lat: Point,
    ) -> bool {
        if !self.accepts_input(layer_id) {
            return false;
        }
        let feature_id = feature.feature_id();
        let changes = self
            .store
            .on_hover(feature, layer_id, lng_lat, self.clock.now_ms());
        self.apply_highlights(&changes);
        self.emit(
            EventType::FeatureHover,
            EventData::Feature {
                layer_id: layer_id.to_owned(),
                feature_id,
            },
        );
        true
    }

    /// Selects `feature` on a semantic layer, replacing any selection.
    pub fn on_feature_click(
        &mut self,
        feature: Arc<Feature>,
        layer_id: &str,
        lng_lat: Point,
    ) -> bool {
        if !self.accepts_input(layer_id) {
            return false;
        }
        let feature_id = feature.feature_id();
        let changes = self
            .store
            .on_click(feature, layer_id, lng_lat, self.clock.now_ms());
        self.apply_highlights(&changes);
        debug!(layer = %layer_id, feature = %feature_id, "feature selected");
        self.emit(
            EventType::FeatureClick,
            EventData::Feature {
                layer_id: layer_id.to_owned(),
                feature_id,
            },
        );
        true
    }

    /// Clears hover on a semantic layer.
    pub fn on_feature_leave(&mut self, layer_id: &str) -> bool {
        let changes = self.store.on_leave(layer_id);
        if changes.is_empty() {
            return false;
        }
        self.apply_highlights(&changes);
        self.emit(
            EventType::FeatureLeave,
            EventData::Layer {
                layer_id: layer_id.to_owned(),
            },
        );
        true
    }

    fn accepts_input(&self, layer_id: &str) -> bool {
        match self.layers.get(layer_id) {
            Some(registration) if registration.descriptor.is_interactive() => true,
            Some(_) => {
                trace!(layer = %layer_id, "input on non-inspectable layer ignored");
                false
            }
            None => {
                trace!(layer = %layer_id, "input on unregistered layer ignored");
                false
            }
        }
    }

    // Feature commands ----------------------------------------------------

    /// Stars or unstars a feature, returning the new state.
    ///
    /// Ids that are neither starred nor recorded anywhere are ignored.
    pub fn toggle_feature_star(&mut self, feature_id: &FeatureId) -> Option<bool> {
        let starred = self.store.toggle_star(feature_id, self.clock.now_ms())?;
        debug!(feature = %feature_id, starred, "star toggled");
        self.emit(
            EventType::FeatureStarToggle,
            EventData::Star {
                feature_id: feature_id.clone(),
                starred,
            },
        );
        Some(starred)
    }

    /// Closes the selection of `feature_id`. Returns `false` if it was not
    /// selected.
    pub fn close_selected_feature(&mut self, feature_id: &FeatureId) -> bool {
        let changes = self.store.close_selected(feature_id);
        let Some(layer_id) = changes.first().map(|change| change.layer_id.clone()) else {
            return false;
        };
        self.apply_highlights(&changes);
        self.emit(
            EventType::FeatureClose,
            EventData::Feature {
                layer_id,
                feature_id: feature_id.clone(),
            },
        );
        true
    }

    /// Clears every selection, returning what was selected.
    pub fn clear_all_selections(&mut self) -> Vec<FeatureKey> {
        let (cleared, changes) = self.store.clear_all_selections();
        if cleared.is_empty() {
            return cleared;
        }
        self.apply_highlights(&changes);
        self.emit(
            EventType::SelectionsCleared,
            EventData::Count {
                count: cleared.len(),
            },
        );
        cleared
    }

    fn apply_highlights(&mut self, changes: &[FlagChange]) {
        for change in changes {
            let Some(registration) = self.layers.get(change.layer_id.as_str()) else {
                continue;
            };
            for target in &registration.targets {
                if let Err(err) = self.host.set_feature_highlight(
                    target,
                    &change.feature_id,
                    change.flag,
                    change.value,
                ) {
                    debug!(
                        layer = %change.layer_id,
                        feature = %change.feature_id,
                        %err,
                        "highlight update failed"
                    );
                }
            }
        }
    }

    // Queries -------------------------------------------------------------

    /// Records of a layer with the star flag merged in.
    #[must_use]
    pub fn layer_features(&self, layer_id: &str) -> Vec<FeatureRecord> {
        self.store.layer_features(layer_id)
    }

    /// Interactive layers with at least one bound physical layer, in
    /// registration order.
    #[must_use]
    pub fn active_layers(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter(|id| self.is_layer_interactive(id))
            .map(String::as_str)
            .collect()
    }

    /// Returns `true` if the layer is inspectable and bound.
    #[must_use]
    pub fn is_layer_interactive(&self, layer_id: &str) -> bool {
        self.layers
            .get(layer_id)
            .is_some_and(Registration::is_active)
    }

    /// The descriptor of a registered layer.
    #[must_use]
    pub fn descriptor(&self, layer_id: &str) -> Option<&LayerDescriptor> {
        self.layers
            .get(layer_id)
            .map(|registration| &registration.descriptor)
    }

    /// Physical ids bound to a semantic layer.
    #[must_use]
    pub fn bound_layers(&self, layer_id: &str) -> &[String] {
        self.layers
            .get(layer_id)
            .map(|registration| registration.bound.as_slice())
            .unwrap_or_default()
    }

    /// Highlight targets of a semantic layer.
    #[must_use]
    pub fn highlight_targets(&self, layer_id: &str) -> &[HighlightTarget] {
        self.layers
            .get(layer_id)
            .map(|registration| registration.targets.as_slice())
            .unwrap_or_default()
    }

    /// Semantic ids in registration order.
    #[must_use]
    pub fn registered_layers(&self) -> &[String] {
        &self.order
    }

    /// The semantic layers a physical layer is routed to, oldest first.
    #[must_use]
    pub fn routes(&self, physical_id: &str) -> &[String] {
        self.routes
            .get(physical_id)
            .map(|owners| owners.as_slice())
            .unwrap_or_default()
    }

    /// Where a new physical layer of `descriptor` belongs in the current
    /// style: the id to insert before, or `None` for the top.
    ///
    /// Groups rank in registration order.
    #[must_use]
    pub fn insertion_anchor(
        &self,
        descriptor: &LayerDescriptor,
        physical_id: &str,
    ) -> Option<String> {
        let style = self.host.style_layers();
        let mut groups: Vec<&str> = Vec::new();
        for id in &self.order {
            if let Some(registration) = self.layers.get(id.as_str()) {
                let group = registration.descriptor.group_id();
                if !groups.contains(&group) {
                    groups.push(group);
                }
            }
        }
        self.config
            .render_order
            .insertion_anchor(
                descriptor.kind,
                physical_id,
                descriptor.group_id(),
                &groups,
                &style,
            )
            .map(str::to_owned)
    }

    // Observers and frames ------------------------------------------------

    /// Adds a change observer.
    pub fn subscribe(&mut self, observer: impl ChangeObserver + 'static) -> ObserverId {
        self.observers.subscribe(observer)
    }

    /// Removes a change observer.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Returns `true` if a frame has been requested and not yet flushed.
    #[must_use]
    pub fn has_pending_frame(&self) -> bool {
        self.pending.is_some()
    }

    /// Flushes the changes of the current tick as one notification.
    ///
    /// Returns the notification that was delivered, or `None` if nothing
    /// changed since the last frame.
    pub fn on_animation_frame(&mut self) -> Option<ChangeNotification> {
        let pending = self.pending.take()?;
        let mut changed_layers = self.store.take_dirty_layers();
        changed_layers.extend(self.structural.drain());
        changed_layers.sort();
        changed_layers.dedup();

        let notification = ChangeNotification {
            last: pending.last,
            coalesced: pending.coalesced,
            changed_layers,
        };
        trace!(
            event = %notification.last.event_type,
            coalesced = notification.coalesced,
            observers = self.observers.len(),
            "flushing frame"
        );
        self.observers.notify(&notification);
        Some(notification)
    }

    fn emit(&mut self, event_type: EventType, data: EventData) {
        let event = Event {
            event_type,
            data,
            timestamp: self.clock.now_ms(),
        };
        if let Some(pending) = &mut self.pending {
            pending.last = event;
            pending.coalesced += 1;
            return;
        }
        self.pending = Some(PendingFrame {
            last: event,
            coalesced: 1,
        });
        self.host.request_animation_frame();
    }
}

impl<H: MapHost, C: Clock> FeatureQuery for InteractionEngine<H, C> {
    fn registered_layers(&self) -> Vec<String> {
        self.order.clone()
    }

    fn descriptor(&self, layer_id: &str) -> Option<&LayerDescriptor> {
        Self::descriptor(self, layer_id)
    }

    fn layer_features(&self, layer_id: &str) -> Vec<FeatureRecord> {
        self.store.layer_features(layer_id)
    }
}

/// Highlight flags a removed record leaves behind on the host.
fn cleared_highlights(record: &FeatureRecord) -> SmallVec<[FlagChange; 2]> {
    [InteractionFlags::HOVERED, InteractionFlags::SELECTED]
        .into_iter()
        .filter(|flag| record.flags.contains(*flag))
        .map(|flag| FlagChange {
            layer_id: record.layer_id.clone(),
            feature_id: record.feature_id.clone(),
            flag,
            value: false,
        })
        .collect()
}
