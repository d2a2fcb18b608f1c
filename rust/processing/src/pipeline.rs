// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parallel element conversion.

use rayon::prelude::*;
use rustc_hash::FxHashSet;
use shellweld_geometry::Kernel;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::types::{Element, ElementResult, ProcessingResult, ProcessingStats};

/// Converts every item of one element on a fresh kernel.
///
/// Item failures are logged and collected; the remaining items still run.
pub fn process_element(element: &Element, config: &PipelineConfig) -> ElementResult {
    let mut kernel = Kernel::new(config.settings.clone());
    let mut result = ElementResult::new(element);
    let mut errors = Vec::new();

    for item in &element.items {
        match kernel.convert(item) {
            Ok(shapes) => shapes.iter().for_each(|shape| result.record(shape)),
            Err(e) => {
                tracing::warn!(
                    element = %element.id,
                    item = %item.id(),
                    kind = item.kind(),
                    error = %e,
                    "Failed to convert element item"
                );
                errors.push(format!("{}: {e}", item.id()));
            }
        }
    }

    if !errors.is_empty() {
        result.error = Some(errors.join("; "));
    }
    if config.snapshots {
        result.snapshot = Some(kernel.into_arena().to_snapshot());
    }
    result
}

/// Converts elements in parallel, one kernel per element.
///
/// Results keep the input order.
pub fn process_elements(elements: &[Element], config: &PipelineConfig) -> ProcessingResult {
    let start = std::time::Instant::now();
    tracing::info!(
        elements = elements.len(),
        worker_threads = ?config.worker_threads,
        "Starting element processing"
    );
    warn_duplicate_ids(elements);

    let convert = || {
        elements
            .par_iter()
            .map(|element| process_element(element, config))
            .collect::<Vec<_>>()
    };
    let results = match config.worker_threads {
        Some(threads) => match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => pool.install(convert),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to build thread pool, using the global pool");
                convert()
            }
        },
        None => convert(),
    };

    let elapsed = start.elapsed();
    let stats = ProcessingStats {
        total_time_ms: elapsed.as_millis() as u64,
        ..ProcessingStats::from_results(&results)
    };
    tracing::info!(
        elements = stats.total_elements,
        converted = stats.converted_elements,
        failed = stats.failed_elements,
        non_manifold = stats.non_manifold_elements,
        shapes = stats.total_shapes,
        elapsed_ms = stats.total_time_ms,
        "Element processing complete"
    );

    ProcessingResult {
        elements: results,
        stats,
    }
}

/// Parses a JSON array of elements and processes it.
pub fn process_elements_json(json: &str, config: &PipelineConfig) -> Result<ProcessingResult> {
    let elements: Vec<Element> = serde_json::from_str(json)?;
    Ok(process_elements(&elements, config))
}

fn warn_duplicate_ids(elements: &[Element]) {
    let mut seen = FxHashSet::default();
    for element in elements {
        if !seen.insert(element.id) {
            tracing::warn!(element = %element.id, "Duplicate element id");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shellweld_geometry::{Extrusion, Face, IdAllocator, Item, Loop, NodeId, PointNode};

    fn square_prism(ids: &mut IdAllocator, depth: f64) -> Item {
        let points: Vec<PointNode> = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]
            .iter()
            .map(|&(x, y)| PointNode::new(ids.allocate(), x, y, 0.0))
            .collect();
        let lp = Loop::polygon(ids.allocate(), &points, true);
        let face = Face::new(ids.allocate(), vec![lp]);
        Item::Extrusion(Extrusion {
            id: ids.allocate(),
            basis: vec![face],
            direction: [0.0, 0.0, 1.0],
            depth,
            placement: None,
        })
    }

    #[test]
    fn failed_item_does_not_stop_element() {
        let mut ids = IdAllocator::new();
        let element = Element {
            id: NodeId(1000),
            name: Some("Wall".into()),
            items: vec![square_prism(&mut ids, 0.0), square_prism(&mut ids, 2.0)],
        };
        let result = process_element(&element, &PipelineConfig::default());

        assert_eq!(result.solids, 1);
        assert!(result.error.is_some());
        assert!(result.snapshot.is_none());
    }

    #[test]
    fn snapshot_on_request() {
        let mut ids = IdAllocator::new();
        let element = Element {
            id: NodeId(1000),
            name: None,
            items: vec![square_prism(&mut ids, 1.0)],
        };
        let config = PipelineConfig::default().with_snapshots(true);
        let result = process_element(&element, &config);
        assert!(result.snapshot.is_some());
    }
}
