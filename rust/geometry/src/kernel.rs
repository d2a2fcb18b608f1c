// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Kernel context: the topology arena plus conversion settings.

use shellweld_topology::{TopologyArena, TopologyKey};

use crate::settings::ConversionSettings;
use crate::taxonomy::NodeId;

/// A shape produced for one taxonomy item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionResult {
    /// The item the shape was converted from.
    pub item: NodeId,
    pub shape: TopologyKey,
    /// Welding split a self-intersecting boundary while building the shape.
    pub non_manifold: bool,
}

/// Owns the arena every converted shape lives in.
///
/// While a [`FacesetHelper`](crate::faceset::FacesetHelper) is alive it
/// borrows the kernel mutably and the kernel records which shell the helper
/// serves; the record is cleared when the helper is dropped.
#[derive(Debug, Default)]
pub struct Kernel {
    pub(crate) arena: TopologyArena,
    pub(crate) settings: ConversionSettings,
    pub(crate) active_faceset: Option<NodeId>,
}

impl Kernel {
    pub fn new(settings: ConversionSettings) -> Self {
        Self {
            arena: TopologyArena::new(),
            settings,
            active_faceset: None,
        }
    }

    pub fn settings(&self) -> &ConversionSettings {
        &self.settings
    }

    pub fn arena(&self) -> &TopologyArena {
        &self.arena
    }

    pub fn into_arena(self) -> TopologyArena {
        self.arena
    }

    /// The shell or face the live faceset helper was built for, if any.
    pub fn active_faceset(&self) -> Option<NodeId> {
        self.active_faceset
    }
}
