// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Read-only access for consumers such as info panels.

use waymark_feature::FeatureRecord;
use waymark_layer::LayerDescriptor;

/// Read-only view of interaction state.
pub trait FeatureQuery {
    /// Semantic layer ids in registration order.
    fn registered_layers(&self) -> Vec<String>;

    /// The descriptor of a registered layer.
    fn descriptor(&self, layer_id: &str) -> Option<&LayerDescriptor>;

    /// Records of a layer with the star flag merged in, ordered by feature id.
    fn layer_features(&self, layer_id: &str) -> Vec<FeatureRecord>;
}
