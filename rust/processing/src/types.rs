// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pipeline input and output types.

use serde::{Deserialize, Serialize};
use shellweld_geometry::{ConversionResult, Item, NodeId};
use shellweld_topology::serialization::ArenaSnapshot;
use shellweld_topology::TopologyKey;

/// A building element: a named group of geometry items converted together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: NodeId,
    #[serde(default)]
    pub name: Option<String>,
    pub items: Vec<Item>,
}

/// Outcome of converting one element.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ElementResult {
    pub id: NodeId,
    pub name: Option<String>,
    pub solids: usize,
    pub comp_solids: usize,
    pub shells: usize,
    pub faces: usize,
    pub wires: usize,
    /// Some item had a self-intersecting boundary split into cycles.
    pub non_manifold: bool,
    /// Failures of individual items, joined.
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<ArenaSnapshot>,
}

impl ElementResult {
    pub fn new(element: &Element) -> Self {
        Self {
            id: element.id,
            name: element.name.clone(),
            ..Self::default()
        }
    }

    pub fn record(&mut self, result: &ConversionResult) {
        match result.shape {
            TopologyKey::Solid(_) => self.solids += 1,
            TopologyKey::CompSolid(_) => self.comp_solids += 1,
            TopologyKey::Shell(_) => self.shells += 1,
            TopologyKey::Face(_) => self.faces += 1,
            TopologyKey::Wire(_) => self.wires += 1,
            TopologyKey::Vertex(_) | TopologyKey::Edge(_) => {}
        }
        self.non_manifold |= result.non_manifold;
    }

    pub fn shape_count(&self) -> usize {
        self.solids + self.comp_solids + self.shells + self.faces + self.wires
    }
}

/// Processing statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessingStats {
    /// Elements submitted.
    pub total_elements: usize,
    /// Elements that produced at least one shape.
    pub converted_elements: usize,
    /// Elements with at least one failed item.
    pub failed_elements: usize,
    /// Elements with a split self-intersecting boundary.
    pub non_manifold_elements: usize,
    /// Shapes produced across all elements.
    pub total_shapes: usize,
    /// Wall-clock time of the batch (ms).
    pub total_time_ms: u64,
}

impl ProcessingStats {
    pub fn from_results(results: &[ElementResult]) -> Self {
        Self {
            total_elements: results.len(),
            converted_elements: results.iter().filter(|r| r.shape_count() > 0).count(),
            failed_elements: results.iter().filter(|r| r.error.is_some()).count(),
            non_manifold_elements: results.iter().filter(|r| r.non_manifold).count(),
            total_shapes: results.iter().map(ElementResult::shape_count).sum(),
            total_time_ms: 0,
        }
    }
}

/// Result of processing a batch of elements, in input order.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub elements: Vec<ElementResult>,
    pub stats: ProcessingStats,
}
