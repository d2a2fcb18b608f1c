// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use shellweld_geometry::mapping::triangulated_face_set;
use shellweld_geometry::{ConversionSettings, IdAllocator, Item, NodeId};
use shellweld_processing::{
    process_elements, process_elements_json, Element, Error, PipelineConfig,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn tetrahedron(ids: &mut IdAllocator, offset: f64) -> Item {
    let coords = vec![
        vec![offset, 0.0, 0.0],
        vec![offset + 1.0, 0.0, 0.0],
        vec![offset, 1.0, 0.0],
        vec![offset, 0.0, 1.0],
    ];
    let indices = vec![vec![1, 3, 2], vec![1, 2, 4], vec![2, 3, 4], vec![3, 1, 4]];
    let shell =
        triangulated_face_set(&coords, &indices, true, &ConversionSettings::default(), ids)
            .unwrap();
    Item::Shell(shell)
}

fn open_tetrahedron(ids: &mut IdAllocator) -> Item {
    let coords = vec![
        vec![0.0, 0.0, 0.0],
        vec![1.0, 0.0, 0.0],
        vec![0.0, 1.0, 0.0],
        vec![0.0, 0.0, 1.0],
    ];
    let indices = vec![vec![1, 3, 2], vec![1, 2, 4], vec![2, 3, 4]];
    let shell =
        triangulated_face_set(&coords, &indices, true, &ConversionSettings::default(), ids)
            .unwrap();
    Item::Shell(shell)
}

fn elements() -> Vec<Element> {
    let mut ids = IdAllocator::starting_at(1);
    let mut elements: Vec<Element> = (0..8)
        .map(|i| Element {
            id: NodeId(10_000 + i),
            name: Some(format!("element {i}")),
            items: vec![tetrahedron(&mut ids, i as f64 * 2.0)],
        })
        .collect();
    elements.push(Element {
        id: NodeId(20_000),
        name: None,
        items: vec![open_tetrahedron(&mut ids)],
    });
    elements
}

#[test]
fn batch_keeps_order_and_counts() {
    init_tracing();
    let elements = elements();
    let config = PipelineConfig::default().with_worker_threads(2);
    let result = process_elements(&elements, &config);

    let ids: Vec<NodeId> = result.elements.iter().map(|r| r.id).collect();
    let expected: Vec<NodeId> = elements.iter().map(|e| e.id).collect();
    assert_eq!(ids, expected);

    // The open shell is declared closed but stays a shell.
    let open = result.elements.last().unwrap();
    assert_eq!(open.shells, 1);
    assert_eq!(open.solids, 0);

    assert_eq!(result.stats.total_elements, 9);
    assert_eq!(result.stats.converted_elements, 9);
    assert_eq!(result.stats.failed_elements, 0);
    assert_eq!(result.stats.total_shapes, 9);
    assert!(result.elements[..8].iter().all(|r| r.solids == 1));
}

#[test]
fn json_batch_reports_failures_per_element() {
    let mut elements = elements();
    elements.truncate(2);
    let mut ids = IdAllocator::starting_at(90_000);
    elements.push(Element {
        id: NodeId(30_000),
        name: Some("broken".into()),
        items: vec![Item::Shell(shellweld_geometry::Shell {
            id: ids.allocate(),
            faces: Vec::new(),
            closed: false,
        })],
    });
    let json = serde_json::to_string(&elements).unwrap();

    let config = PipelineConfig::default().with_settings(ConversionSettings::default());
    let result = process_elements_json(&json, &config).unwrap();
    assert_eq!(result.stats.total_elements, 3);
    assert_eq!(result.stats.failed_elements, 1);
    assert_eq!(result.stats.converted_elements, 2);

    let broken = &result.elements[2];
    assert_eq!(broken.shape_count(), 0);
    assert!(broken.error.as_deref().unwrap().contains('#'));

    let out = serde_json::to_value(&result).unwrap();
    assert_eq!(out["stats"]["failed_elements"], 1);
    assert!(out["elements"][0].get("snapshot").is_none());
}

#[test]
fn invalid_json_fails_the_batch() {
    let err = process_elements_json("[{\"id\": 1}]", &PipelineConfig::default()).unwrap_err();
    assert!(matches!(err, Error::Json(_)));
}
