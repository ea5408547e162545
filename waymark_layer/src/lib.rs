// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Waymark Layer: shared vocabulary for semantic and physical map layers.
//!
//! A map application declares **semantic layers** in its layer catalogue
//! ("schools", "osm-landuse", ...). When the rendering engine compiles its
//! style, each semantic layer turns into zero or more **physical layers**:
//! the actual paint layers the engine knows about, each with a paint type, a
//! source, and an optional source-layer name.
//!
//! This crate only describes both sides; it does not decide how they relate.
//!
//! - [`LayerDescriptor`]: a semantic layer as declared in the catalogue.
//!   Deserializable from catalogue JSON with `serde`.
//! - [`InspectConfig`]: the interactive capability of a semantic layer.
//! - [`PhysicalLayer`]: a physical layer as reported by the host style.
//! - [`LayerMeta`]: bookkeeping the application attaches to physical layers it
//!   adds itself, used for paint ordering.
//! - [`LayerKind`] and [`PaintType`]: closed sets of layer and paint types.
//!
//! ## Minimal example
//!
//! ```rust
//! use waymark_layer::{InspectConfig, LayerDescriptor, LayerKind, PaintType, PhysicalLayer};
//!
//! let schools = LayerDescriptor::new("schools", LayerKind::Vector)
//!     .with_source_layer("education")
//!     .with_inspect(InspectConfig::default());
//! assert!(schools.is_interactive());
//!
//! let fill = PhysicalLayer::new("schools-fill", PaintType::Fill)
//!     .with_source("openmaptiles")
//!     .with_source_layer("education");
//! assert!(fill.paint_type.is_interactive());
//! ```
//!
//! Sources that depend on this crate: `waymark_binding` (resolution),
//! `waymark_order` (paint order) and `waymark_interaction` (the engine).
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod descriptor;
mod kind;
mod physical;

pub use descriptor::{InspectConfig, LayerDescriptor};
pub use kind::{LayerKind, PaintType};
pub use physical::{LayerMeta, PhysicalLayer};
