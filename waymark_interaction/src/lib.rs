// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=waymark_interaction --heading-base-level=0

//! Waymark Interaction: hover, selection and stars for dynamically registered
//! map layers.
//!
//! The [`InteractionEngine`] sits between a rendering host ([`MapHost`]) and
//! the application's semantic layer catalogue. It:
//!
//! - binds each inspectable semantic layer to the physical render layers the
//!   compiled style produced, retrying on a timer while the style is still
//!   compiling;
//! - routes pointer events from physical layers to semantic layers and keeps
//!   per-feature state in a [`waymark_feature::FeatureStateStore`];
//! - mirrors hover and selection onto the host's per-feature highlight state;
//! - coalesces every mutation of a tick into one [`ChangeNotification`] per
//!   animation frame.
//!
//! The engine is single-threaded and never blocks: time comes from a
//! [`Clock`], deferred work runs from [`InteractionEngine::advance`], and the
//! host is asked for frames with [`MapHost::request_animation_frame`].
//!
//! ## Minimal example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use kurbo::Point;
//! use waymark_feature::{Feature, FeatureId, Geometry, InteractionFlags};
//! use waymark_interaction::{
//!     ChangeNotification, EventType, HighlightTarget, HostError, InteractionEngine, ManualClock,
//!     MapHost, PointerEvent,
//! };
//! use waymark_layer::{InspectConfig, LayerDescriptor, LayerKind, PaintType, PhysicalLayer};
//!
//! #[derive(Default)]
//! struct Host {
//!     frames: usize,
//! }
//!
//! impl MapHost for Host {
//!     fn style_layers(&self) -> Vec<PhysicalLayer> {
//!         vec![PhysicalLayer::new("schools-fill", PaintType::Fill).with_source("osm")]
//!     }
//!     fn subscribe_pointer(&mut self, _: &str) -> Result<(), HostError> {
//!         Ok(())
//!     }
//!     fn unsubscribe_pointer(&mut self, _: &str) -> Result<(), HostError> {
//!         Ok(())
//!     }
//!     fn set_feature_highlight(
//!         &mut self,
//!         _: &HighlightTarget,
//!         _: &FeatureId,
//!         _: InteractionFlags,
//!         _: bool,
//!     ) -> Result<(), HostError> {
//!         Ok(())
//!     }
//!     fn request_animation_frame(&mut self) {
//!         self.frames += 1;
//!     }
//! }
//!
//! let mut engine = InteractionEngine::with_default_config(Host::default(), ManualClock::new(0));
//! engine.register_layer(
//!     LayerDescriptor::new("schools", LayerKind::Vector)
//!         .with_inspect(InspectConfig::titled("name")),
//! );
//! assert_eq!(engine.bound_layers("schools"), &["schools-fill"]);
//!
//! let at = Point::new(77.59, 12.97);
//! let school = Arc::new(Feature::new(Geometry::Point(at)).with_id("s-1"));
//! engine.handle_pointer(PointerEvent::moved("schools-fill", school.clone(), at));
//! engine.handle_pointer(PointerEvent::clicked("schools-fill", school, at));
//!
//! // Three mutations, one frame request, one notification.
//! assert_eq!(engine.host().frames, 1);
//! let note: ChangeNotification = engine.on_animation_frame().unwrap();
//! assert_eq!(note.coalesced, 3);
//! assert_eq!(note.event_type(), EventType::FeatureClick);
//! assert_eq!(note.changed_layers, ["schools"]);
//! ```

mod config;
mod engine;
mod event;
mod host;
mod pointer;
mod query;

pub use config::{ConfigError, EngineConfig, parse_catalogue};
pub use engine::InteractionEngine;
pub use event::{
    ChangeNotification, ChangeObserver, Event, EventData, EventType, ObserverId, Observers,
};
pub use host::{Clock, HighlightTarget, HostError, ManualClock, MapHost, SystemClock};
pub use pointer::{PointerEvent, PointerKind};
pub use query::FeatureQuery;
