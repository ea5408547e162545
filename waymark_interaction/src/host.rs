// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The rendering host and the clock, as seen by the engine.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use waymark_feature::{FeatureId, InteractionFlags};
use waymark_layer::PhysicalLayer;

/// Errors reported by [`MapHost`] calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// The physical layer does not exist (any more).
    #[error("layer `{0}` not found in the style")]
    LayerNotFound(String),
    /// The source does not exist (any more).
    #[error("source `{0}` not found in the style")]
    SourceNotFound(String),
    /// Any other host failure.
    #[error("host rejected the call: {0}")]
    Rejected(String),
}

/// Where per-feature highlight state lives on the host: a source, plus the
/// source-layer for tiled vector sources.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HighlightTarget {
    /// Source id.
    pub source: String,
    /// Source-layer name, for tiled vector sources.
    pub source_layer: Option<String>,
}

impl HighlightTarget {
    /// Creates a target for a source without source-layers.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            source_layer: None,
        }
    }

    /// Sets the source-layer.
    #[must_use]
    pub fn with_source_layer(mut self, source_layer: impl Into<String>) -> Self {
        self.source_layer = Some(source_layer.into());
        self
    }

    /// Derives the target of a physical layer, if it reads from a source.
    #[must_use]
    pub fn of_layer(layer: &PhysicalLayer) -> Option<Self> {
        let source = layer.source.as_ref()?;
        Some(Self {
            source: source.clone(),
            source_layer: layer.source_layer.clone(),
        })
    }
}

/// The rendering engine the interaction engine drives.
///
/// Everything is called synchronously from engine operations. Implementations
/// must not call back into the engine.
pub trait MapHost {
    /// Returns the current physical layer stack, bottom first.
    ///
    /// Called on every resolution attempt; the result is never cached.
    fn style_layers(&self) -> Vec<PhysicalLayer>;

    /// Starts delivering pointer events for a physical layer.
    fn subscribe_pointer(&mut self, layer_id: &str) -> Result<(), HostError>;

    /// Stops delivering pointer events for a physical layer.
    fn unsubscribe_pointer(&mut self, layer_id: &str) -> Result<(), HostError>;

    /// Sets or clears one highlight flag on a feature.
    fn set_feature_highlight(
        &mut self,
        target: &HighlightTarget,
        feature_id: &FeatureId,
        flag: InteractionFlags,
        value: bool,
    ) -> Result<(), HostError>;

    /// Asks for [`InteractionEngine::on_animation_frame`] to be called on
    /// the next frame.
    ///
    /// [`InteractionEngine::on_animation_frame`]: crate::InteractionEngine::on_animation_frame
    fn request_animation_frame(&mut self);
}

/// A source of host time in milliseconds.
pub trait Clock {
    /// Returns the current time in milliseconds.
    fn now_ms(&self) -> u64;
}

/// A clock that only moves when told to.
///
/// Clones share the same time, so a test can keep one handle while the
/// engine owns another.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    /// Creates a clock at `start` milliseconds.
    #[must_use]
    pub fn new(start: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    /// Sets the current time.
    pub fn set(&self, now: u64) {
        self.now.set(now);
    }

    /// Moves the clock forward by `ms`.
    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get().saturating_add(ms));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

/// Milliseconds elapsed since the clock was created.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    /// Creates a clock starting at zero now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "u64 milliseconds cover half a billion years of uptime"
    )]
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}
