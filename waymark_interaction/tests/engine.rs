// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for `InteractionEngine` against a scripted host and a manual clock.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use kurbo::Point;
use waymark_feature::{Feature, FeatureId, Geometry, InteractionFlags};
use waymark_interaction::{
    ChangeNotification, EngineConfig, EventData, EventType, FeatureQuery, HighlightTarget,
    HostError, InteractionEngine, ManualClock, MapHost, PointerEvent,
};
use tracing::field::{Field, Visit};
use tracing::{Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};
use waymark_layer::{
    InspectConfig, LayerDescriptor, LayerKind, LayerMeta, PaintType, PhysicalLayer,
};

#[derive(Debug, Default)]
struct FakeHost {
    style: Vec<PhysicalLayer>,
    subscribed: Vec<String>,
    /// Physical ids whose subscription the host rejects.
    refused: Vec<String>,
    unsubscribed: Vec<String>,
    highlights: Vec<(HighlightTarget, FeatureId, InteractionFlags, bool)>,
    frames: usize,
}

impl FakeHost {
    fn with_style(style: Vec<PhysicalLayer>) -> Self {
        Self {
            style,
            ..Self::default()
        }
    }
}

impl MapHost for FakeHost {
    fn style_layers(&self) -> Vec<PhysicalLayer> {
        self.style.clone()
    }

    fn subscribe_pointer(&mut self, layer_id: &str) -> Result<(), HostError> {
        if !self.style.iter().any(|l| l.id == layer_id) {
            return Err(HostError::LayerNotFound(layer_id.into()));
        }
        if self.refused.iter().any(|id| id == layer_id) {
            return Err(HostError::Rejected(layer_id.into()));
        }
        self.subscribed.push(layer_id.into());
        Ok(())
    }

    fn unsubscribe_pointer(&mut self, layer_id: &str) -> Result<(), HostError> {
        if !self.style.iter().any(|l| l.id == layer_id) {
            return Err(HostError::LayerNotFound(layer_id.into()));
        }
        self.unsubscribed.push(layer_id.into());
        Ok(())
    }

    fn set_feature_highlight(
        &mut self,
        target: &HighlightTarget,
        feature_id: &FeatureId,
        flag: InteractionFlags,
        value: bool,
    ) -> Result<(), HostError> {
        self.highlights
            .push((target.clone(), feature_id.clone(), flag, value));
        Ok(())
    }

    fn request_animation_frame(&mut self) {
        self.frames += 1;
    }
}

type Engine = InteractionEngine<FakeHost, ManualClock>;

fn engine(style: Vec<PhysicalLayer>) -> (Engine, ManualClock) {
    let clock = ManualClock::new(0);
    let engine = InteractionEngine::with_default_config(FakeHost::with_style(style), clock.clone());
    (engine, clock)
}

fn schools() -> LayerDescriptor {
    LayerDescriptor::new("schools", LayerKind::Vector)
        .with_source_layer("education")
        .with_inspect(InspectConfig::titled("name"))
}

fn schools_style() -> Vec<PhysicalLayer> {
    vec![
        PhysicalLayer::new("background", PaintType::Background).as_basemap(),
        PhysicalLayer::new("schools-fill", PaintType::Fill)
            .with_source("osm")
            .with_source_layer("education"),
        PhysicalLayer::new("schools-label", PaintType::Symbol)
            .with_source("osm")
            .with_source_layer("education"),
    ]
}

fn feature(id: &str) -> Arc<Feature> {
    Arc::new(Feature::new(Geometry::Point(AT)).with_property("id", id))
}

const AT: Point = Point::new(77.59, 12.97);

/// Collects `(layer, message)` of every warning logged while installed.
#[derive(Clone, Default)]
struct Warnings(Arc<Mutex<Vec<(String, String)>>>);

impl Warnings {
    fn take(&self) -> Vec<(String, String)> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

impl<S: Subscriber> Layer<S> for Warnings {
    fn on_event(&self, event: &tracing::Event<'_>, _: Context<'_, S>) {
        if *event.metadata().level() != Level::WARN {
            return;
        }
        let mut fields = WarningFields::default();
        event.record(&mut fields);
        self.0.lock().unwrap().push((fields.layer, fields.message));
    }
}

#[derive(Default)]
struct WarningFields {
    layer: String,
    message: String,
}

impl Visit for WarningFields {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            "layer" => self.layer = format!("{value:?}"),
            "message" => self.message = format!("{value:?}"),
            _ => {}
        }
    }
}

/// Runs `f` with `warnings` listening to this thread's events.
fn capturing<R>(warnings: &Warnings, f: impl FnOnce() -> R) -> R {
    let subscriber = tracing_subscriber::registry().with(warnings.clone());
    tracing::subscriber::with_default(subscriber, f)
}

/// Steps the clock to `at` and runs due timers.
fn step(engine: &mut Engine, clock: &ManualClock, at: u64) {
    clock.set(at);
    engine.advance();
}

/// Bound engine with the registration frame already flushed.
fn bound_engine() -> (Engine, ManualClock) {
    let (mut engine, clock) = engine(schools_style());
    engine.register_layer(schools());
    engine.on_animation_frame();
    engine.host_mut().frames = 0;
    engine.host_mut().highlights.clear();
    (engine, clock)
}

#[test]
fn binds_immediately_when_style_is_ready() {
    let (engine, _) = bound_engine();
    assert_eq!(engine.bound_layers("schools"), &["schools-fill", "schools-label"]);
    assert_eq!(engine.host().subscribed, ["schools-fill", "schools-label"]);
    assert_eq!(engine.active_layers(), ["schools"]);
    assert_eq!(engine.routes("schools-label"), ["schools"]);
    // Both physical layers read the same source-layer: one highlight target.
    assert_eq!(
        engine.highlight_targets("schools"),
        &[HighlightTarget::new("osm").with_source_layer("education")]
    );
}

#[test]
fn layer_appearing_at_350ms_binds_on_second_retry() {
    let (mut engine, clock) = engine(Vec::new());
    engine.register_layer(schools());
    assert!(engine.bound_layers("schools").is_empty());
    assert_eq!(engine.next_deadline(), Some(300));

    step(&mut engine, &clock, 300);
    assert!(engine.bound_layers("schools").is_empty());
    assert_eq!(engine.next_deadline(), Some(600));

    clock.set(350);
    engine.host_mut().style = schools_style();
    engine.advance();
    assert!(engine.bound_layers("schools").is_empty(), "not due until 600");

    step(&mut engine, &clock, 600);
    assert_eq!(engine.bound_layers("schools"), &["schools-fill", "schools-label"]);
    assert!(!engine.is_retry_pending("schools"));
    // Only the eviction sweep is left.
    assert_eq!(engine.next_deadline(), Some(30_000));
}

#[test]
fn never_matching_layer_gives_up_after_third_retry() {
    let warnings = Warnings::default();
    let (mut engine, clock) = engine(vec![PhysicalLayer::new("roads", PaintType::Line)]);
    capturing(&warnings, || {
        engine.register_layer(schools());
        for at in [300, 600] {
            step(&mut engine, &clock, at);
            assert!(engine.is_retry_pending("schools"));
        }
    });
    assert!(warnings.take().is_empty(), "no warning while retries remain");

    capturing(&warnings, || step(&mut engine, &clock, 900));
    assert_eq!(
        warnings.take(),
        [(
            "schools".to_owned(),
            "no physical layers bound; layer stays inert".to_owned()
        )]
    );
    assert!(!engine.is_retry_pending("schools"));
    assert!(engine.host().subscribed.is_empty());
    assert!(!engine.is_layer_interactive("schools"));
    // Still registered, just inert.
    assert_eq!(engine.registered_layers(), ["schools"]);
    assert_eq!(engine.next_deadline(), Some(30_000));
}

#[test]
fn non_inspectable_layers_are_never_subscribed() {
    let (mut engine, _) = engine(schools_style());
    engine.register_layer(LayerDescriptor::new("schools", LayerKind::Vector));
    assert!(engine.host().subscribed.is_empty());
    assert!(engine.active_layers().is_empty());
    assert!(engine.descriptor("schools").is_some());
    assert!(!engine.on_feature_hover(feature("a"), "schools", AT));
}

#[test]
fn five_mutations_coalesce_into_one_notification() {
    let (mut engine, clock) = bound_engine();
    let seen: Rc<RefCell<Vec<ChangeNotification>>> = Rc::default();
    let sink = seen.clone();
    engine.subscribe(move |n: &ChangeNotification| sink.borrow_mut().push(n.clone()));

    clock.set(1_000);
    engine.handle_pointer(PointerEvent::moved("schools-fill", feature("a"), AT));
    engine.handle_pointer(PointerEvent::moved("schools-fill", feature("b"), AT));
    engine.handle_pointer(PointerEvent::clicked("schools-fill", feature("b"), AT));
    clock.set(1_010);
    assert_eq!(engine.toggle_feature_star(&FeatureId::from("b")), Some(true));
    engine.handle_pointer(PointerEvent::left("schools-fill"));

    assert_eq!(engine.host().frames, 1);
    assert!(seen.borrow().is_empty(), "nothing is delivered before the frame");

    let note = engine.on_animation_frame().unwrap();
    assert_eq!(note.coalesced, 5);
    assert_eq!(note.event_type(), EventType::FeatureLeave);
    assert_eq!(note.last.timestamp, 1_010);
    assert_eq!(
        note.last.data,
        EventData::Layer {
            layer_id: "schools".into()
        }
    );
    assert_eq!(note.changed_layers, ["schools"]);

    assert!(engine.on_animation_frame().is_none());
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn pointer_events_on_unknown_physical_layers_are_ignored() {
    let (mut engine, _) = bound_engine();
    assert!(!engine.handle_pointer(PointerEvent::moved("roads", feature("a"), AT)));
    assert!(!engine.handle_pointer(PointerEvent::left("background")));
    assert_eq!(engine.host().frames, 0);
    assert!(engine.layer_features("schools").is_empty());
}

#[test]
fn hover_and_selection_are_mirrored_to_highlights() {
    let (mut engine, _) = bound_engine();
    let target = HighlightTarget::new("osm").with_source_layer("education");
    engine.handle_pointer(PointerEvent::moved("schools-fill", feature("a"), AT));
    engine.handle_pointer(PointerEvent::moved("schools-label", feature("b"), AT));
    engine.handle_pointer(PointerEvent::clicked("schools-label", feature("b"), AT));

    let hovered = InteractionFlags::HOVERED;
    let selected = InteractionFlags::SELECTED;
    assert_eq!(
        engine.host().highlights,
        [
            (target.clone(), FeatureId::from("a"), hovered, true),
            (target.clone(), FeatureId::from("a"), hovered, false),
            (target.clone(), FeatureId::from("b"), hovered, true),
            (target, FeatureId::from("b"), selected, true),
        ]
    );
}

#[test]
fn selection_is_single_across_layers() {
    let mut style = schools_style();
    style.push(PhysicalLayer::new("parks-fill", PaintType::Fill).with_source("parks-src"));
    let (mut engine, _) = engine(style);
    engine.register_layer(schools());
    engine.register_layer(
        LayerDescriptor::new("parks", LayerKind::Geojson).with_inspect(InspectConfig::default()),
    );

    engine.on_feature_click(feature("a"), "schools", AT);
    engine.on_feature_click(feature("p"), "parks", AT);
    let selected = engine.store().selected().unwrap();
    assert_eq!(selected.layer_id, "parks");
    assert!(engine.layer_features("schools").is_empty());

    let cleared = engine.clear_all_selections();
    assert_eq!(cleared.len(), 1);
    assert!(engine.store().selected().is_none());
    assert!(engine.clear_all_selections().is_empty());
}

#[test]
fn star_survives_leave_inactivity_and_reregistration() {
    let (mut engine, clock) = bound_engine();
    let id = FeatureId::from("a");
    engine.on_feature_hover(feature("a"), "schools", AT);
    engine.toggle_feature_star(&id);
    engine.on_feature_leave("schools");
    engine.on_animation_frame();

    // Three sweeps over 90 s of inactivity. Records always carry a flag, so
    // the sweeps find nothing to evict and stay quiet.
    for at in [30_000, 60_000, 90_000] {
        step(&mut engine, &clock, at);
    }
    assert!(!engine.has_pending_frame(), "no cleanup event");
    let records = engine.layer_features("schools");
    assert_eq!(records.len(), 1);
    assert!(records[0].is_starred());

    assert!(engine.unregister_layer("schools"));
    assert!(engine.layer_features("schools").is_empty());
    assert!(engine.store().is_starred(&id));

    engine.register_layer(schools());
    engine.on_feature_hover(feature("a"), "schools", AT);
    assert!(engine.layer_features("schools")[0].is_starred());
}

#[test]
fn unregister_cascades_and_tolerates_missing_layers() {
    let (mut engine, _) = bound_engine();
    engine.on_feature_hover(feature("a"), "schools", AT);
    engine.on_feature_click(feature("a"), "schools", AT);
    engine.host_mut().highlights.clear();

    // The label layer vanished from the style before unregistration.
    engine.host_mut().style.retain(|l| l.id != "schools-label");
    assert!(engine.unregister_layer("schools"));

    assert_eq!(engine.host().unsubscribed, ["schools-fill"]);
    assert!(engine.routes("schools-fill").is_empty());
    assert!(engine.descriptor("schools").is_none());
    assert!(engine.store().is_empty());
    let cleared: Vec<(InteractionFlags, bool)> = engine
        .host()
        .highlights
        .iter()
        .map(|(_, _, flag, value)| (*flag, *value))
        .collect();
    assert_eq!(
        cleared,
        [
            (InteractionFlags::HOVERED, false),
            (InteractionFlags::SELECTED, false)
        ]
    );

    let note = engine.on_animation_frame().unwrap();
    assert_eq!(note.event_type(), EventType::LayerUnregistered);
    assert!(note.touches("schools"));

    assert!(!engine.unregister_layer("schools"), "unknown ids are a no-op");
}

#[test]
fn unregister_cancels_pending_retries() {
    let (mut engine, clock) = engine(Vec::new());
    engine.register_layer(schools());
    assert!(engine.is_retry_pending("schools"));
    engine.unregister_layer("schools");
    assert_eq!(engine.next_deadline(), Some(30_000));

    engine.host_mut().style = schools_style();
    step(&mut engine, &clock, 300);
    assert!(engine.host().subscribed.is_empty());
}

#[test]
fn reregistering_replaces_the_binding() {
    let (mut engine, _) = bound_engine();
    engine.register_layer(schools());
    assert_eq!(engine.registered_layers(), ["schools"]);
    assert_eq!(engine.host().unsubscribed, ["schools-fill", "schools-label"]);
    assert_eq!(engine.bound_layers("schools").len(), 2);
    assert_eq!(engine.host().subscribed.len(), 4);
}

#[test]
fn star_and_close_on_unknown_ids_are_no_ops() {
    let (mut engine, _) = bound_engine();
    assert_eq!(engine.toggle_feature_star(&FeatureId::from("ghost")), None);
    assert!(!engine.close_selected_feature(&FeatureId::from("ghost")));
    assert!(!engine.has_pending_frame());
}

#[test]
fn close_selected_emits_feature_close() {
    let (mut engine, _) = bound_engine();
    engine.on_feature_click(feature("a"), "schools", AT);
    engine.on_animation_frame();
    assert!(engine.close_selected_feature(&FeatureId::from("a")));
    let note = engine.on_animation_frame().unwrap();
    assert_eq!(note.event_type(), EventType::FeatureClose);
    assert!(engine.layer_features("schools").is_empty());
}

#[test]
fn catalogue_registers_every_layer() {
    let (mut engine, _) = engine(schools_style());
    let count = engine
        .register_catalogue(
            r#"{ "layers": [
                { "id": "schools", "type": "vector", "sourceLayer": "education",
                  "inspect": { "title": "name" } },
                { "id": "hillshade", "type": "terrain" }
            ] }"#,
        )
        .unwrap();
    assert_eq!(count, 2);
    assert_eq!(
        FeatureQuery::registered_layers(&engine),
        ["schools", "hillshade"]
    );
    assert_eq!(engine.active_layers(), ["schools"]);
}

#[test]
fn invalid_config_is_rejected() {
    let config = EngineConfig {
        retry_delay_ms: 0,
        ..EngineConfig::default()
    };
    let result = InteractionEngine::new(FakeHost::default(), ManualClock::new(0), config);
    assert!(result.is_err());
}

#[test]
fn insertion_anchor_uses_the_current_style() {
    let style = vec![
        PhysicalLayer::new("background", PaintType::Background).as_basemap(),
        PhysicalLayer::new("roads-line", PaintType::Line)
            .with_meta(LayerMeta::new("roads", LayerKind::Vector)),
        PhysicalLayer::new("place-labels", PaintType::Symbol),
    ];
    let (mut engine, _) = engine(style);
    engine.register_layer(LayerDescriptor::new("roads", LayerKind::Vector));
    let trails = LayerDescriptor::new("trails", LayerKind::Geojson);
    engine.register_layer(trails.clone());
    assert_eq!(
        engine.insertion_anchor(&trails, "trails-line").as_deref(),
        Some("place-labels")
    );
}

fn roads(id: &str) -> LayerDescriptor {
    LayerDescriptor::new(id, LayerKind::Vector).with_inspect(InspectConfig::default())
}

#[test]
fn overlapping_layers_share_physical_layers() {
    let (mut engine, _) = engine(vec![
        PhysicalLayer::new("roads-line", PaintType::Line),
        PhysicalLayer::new("roads-major-line", PaintType::Line),
    ]);
    engine.register_layer(roads("roads"));
    engine.register_layer(roads("roads-major"));

    assert_eq!(engine.bound_layers("roads"), &["roads-line", "roads-major-line"]);
    assert_eq!(engine.bound_layers("roads-major"), &["roads-major-line"]);
    assert_eq!(engine.active_layers(), ["roads", "roads-major"]);
    assert!(!engine.is_retry_pending("roads-major"));
    // One host subscription per physical layer.
    assert_eq!(engine.host().subscribed, ["roads-line", "roads-major-line"]);
    assert_eq!(engine.routes("roads-major-line"), ["roads", "roads-major"]);

    // Hover reaches every owner; a click lands on the newest one only.
    engine.handle_pointer(PointerEvent::moved("roads-major-line", feature("a"), AT));
    assert_eq!(engine.layer_features("roads").len(), 1);
    assert_eq!(engine.layer_features("roads-major").len(), 1);
    engine.handle_pointer(PointerEvent::clicked("roads-major-line", feature("a"), AT));
    assert_eq!(engine.store().selected().unwrap().layer_id, "roads-major");
    assert!(engine.handle_pointer(PointerEvent::left("roads-major-line")));
    assert!(engine.store().hovered("roads").is_none());
    assert!(engine.store().hovered("roads-major").is_none());

    // The shared layer stays subscribed until its last owner leaves.
    engine.unregister_layer("roads");
    assert_eq!(engine.host().unsubscribed, ["roads-line"]);
    assert_eq!(engine.routes("roads-major-line"), ["roads-major"]);
    assert!(engine.handle_pointer(PointerEvent::moved("roads-major-line", feature("b"), AT)));

    engine.unregister_layer("roads-major");
    assert_eq!(engine.host().unsubscribed, ["roads-line", "roads-major-line"]);
    assert!(engine.routes("roads-major-line").is_empty());
}

#[test]
fn rejected_subscriptions_are_retried_like_a_miss() {
    let (mut engine, clock) = engine(schools_style());
    engine.host_mut().refused = vec!["schools-fill".into(), "schools-label".into()];
    engine.register_layer(schools());
    assert!(engine.bound_layers("schools").is_empty());
    assert!(!engine.is_layer_interactive("schools"));
    assert!(engine.is_retry_pending("schools"));
    assert_eq!(engine.next_deadline(), Some(300));

    engine.host_mut().refused = vec!["schools-label".into()];
    step(&mut engine, &clock, 300);
    assert_eq!(engine.bound_layers("schools"), &["schools-fill"]);
    assert!(engine.is_layer_interactive("schools"));
    assert!(!engine.is_retry_pending("schools"));
}

#[test]
fn subscriptions_that_never_succeed_warn_once_the_budget_is_spent() {
    let warnings = Warnings::default();
    let (mut engine, clock) = engine(schools_style());
    engine.host_mut().refused = vec!["schools-fill".into(), "schools-label".into()];
    capturing(&warnings, || {
        engine.register_layer(schools());
        for at in [300, 600, 900] {
            step(&mut engine, &clock, at);
        }
    });
    let inert: Vec<(String, String)> = warnings
        .take()
        .into_iter()
        .filter(|(_, message)| message.contains("stays inert"))
        .collect();
    assert_eq!(inert.len(), 1);
    assert_eq!(inert[0].0, "schools");
    assert!(!engine.is_retry_pending("schools"));
    assert!(engine.host().subscribed.is_empty());
}
