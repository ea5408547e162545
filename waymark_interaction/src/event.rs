// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change notifications and their observers.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::mpsc::Sender;

use serde::{Deserialize, Serialize};
use waymark_feature::FeatureId;

/// What kind of mutation produced a notification.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventType {
    /// A semantic layer was registered.
    LayerRegistered,
    /// A semantic layer was unregistered.
    LayerUnregistered,
    /// A feature was hovered.
    FeatureHover,
    /// A feature was clicked.
    FeatureClick,
    /// The pointer left a layer.
    FeatureLeave,
    /// A feature was starred or unstarred.
    FeatureStarToggle,
    /// A selection was closed.
    FeatureClose,
    /// All selections were cleared.
    SelectionsCleared,
    /// The eviction sweep removed idle records.
    Cleanup,
}

impl EventType {
    /// Returns the kebab-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LayerRegistered => "layer-registered",
            Self::LayerUnregistered => "layer-unregistered",
            Self::FeatureHover => "feature-hover",
            Self::FeatureClick => "feature-click",
            Self::FeatureLeave => "feature-leave",
            Self::FeatureStarToggle => "feature-star-toggle",
            Self::FeatureClose => "feature-close",
            Self::SelectionsCleared => "selections-cleared",
            Self::Cleanup => "cleanup",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of the event that produced a notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventData {
    /// A layer-level event.
    Layer {
        /// Semantic layer id.
        layer_id: String,
    },
    /// A feature-level event.
    Feature {
        /// Semantic layer id.
        layer_id: String,
        /// Feature id.
        feature_id: FeatureId,
    },
    /// A star toggle.
    Star {
        /// Feature id.
        feature_id: FeatureId,
        /// The new star state.
        starred: bool,
    },
    /// A bulk operation.
    Count {
        /// Number of records affected.
        count: usize,
    },
}

/// One mutation as it happened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    /// Event kind.
    pub event_type: EventType,
    /// Event payload.
    pub data: EventData,
    /// Host time of the mutation, in milliseconds.
    pub timestamp: u64,
}

/// The single notification flushed per animation frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangeNotification {
    /// The last event of the frame.
    pub last: Event,
    /// Number of events coalesced into this notification.
    pub coalesced: usize,
    /// Semantic layers whose state changed during the frame, sorted.
    pub changed_layers: Vec<String>,
}

impl ChangeNotification {
    /// Kind of the last event.
    #[must_use]
    pub fn event_type(&self) -> EventType {
        self.last.event_type
    }

    /// Returns `true` if `layer_id` changed during the frame.
    #[must_use]
    pub fn touches(&self, layer_id: &str) -> bool {
        self.changed_layers.iter().any(|id| id == layer_id)
    }
}

/// Receives change notifications.
pub trait ChangeObserver {
    /// Called once per flushed frame.
    fn on_change(&mut self, notification: &ChangeNotification);
}

impl<F> ChangeObserver for F
where
    F: FnMut(&ChangeNotification),
{
    fn on_change(&mut self, notification: &ChangeNotification) {
        self(notification);
    }
}

impl<T: ChangeObserver> ChangeObserver for Rc<RefCell<T>> {
    fn on_change(&mut self, notification: &ChangeNotification) {
        self.borrow_mut().on_change(notification);
    }
}

impl ChangeObserver for Sender<ChangeNotification> {
    fn on_change(&mut self, notification: &ChangeNotification) {
        if self.send(notification.clone()).is_err() {
            tracing::trace!("notification receiver dropped");
        }
    }
}

/// Handle returned by [`Observers::subscribe`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

/// A registry of observers, notified in subscription order.
#[derive(Default)]
pub struct Observers {
    entries: Vec<(ObserverId, Box<dyn ChangeObserver>)>,
    next_id: u64,
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.entries.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl Observers {
    /// Adds an observer.
    pub fn subscribe(&mut self, observer: impl ChangeObserver + 'static) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, Box::new(observer)));
        id
    }

    /// Removes an observer. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    /// Number of observers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nobody is listening.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Delivers `notification` to every observer.
    pub fn notify(&mut self, notification: &ChangeNotification) {
        for (_, observer) in &mut self.entries {
            observer.on_change(notification);
        }
    }
}
