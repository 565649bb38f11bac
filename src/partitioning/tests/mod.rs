use super::*;
#[path = "partition_property_tests.rs"]
mod partition_property_tests;

use crate::topology::mesh::TriMesh;

/// `n x n` grid of vertices, each quad split along its main diagonal.
pub(super) fn grid(n: usize) -> TriMesh {
    let id = |i: usize, j: usize| i * n + j;
    let mut cells = Vec::new();
    for i in 0..n - 1 {
        for j in 0..n - 1 {
            cells.push([id(i, j), id(i, j + 1), id(i + 1, j + 1)]);
            cells.push([id(i, j), id(i + 1, j + 1), id(i + 1, j)]);
        }
    }
    TriMesh::create_mesh(n * n, &cells).unwrap()
}

#[test]
fn zero_parts_is_an_error() {
    let g = MeshGraph::from_mesh(&grid(3));
    let cfg = PartitionerConfig {
        n_parts: 0,
        ..Default::default()
    };
    assert_eq!(partition(&g, 9, &cfg), Err(MeshEditError::ZeroPartitions));
}

#[test]
fn single_part_takes_everything() {
    let g = MeshGraph::from_mesh(&grid(4));
    let cfg = PartitionerConfig {
        n_parts: 1,
        ..Default::default()
    };
    let pm = partition(&g, 16, &cfg).unwrap();
    assert_eq!(pm.part_sizes(), vec![16]);
    assert_eq!(edge_cut(&g, &pm), 0);
}

#[test]
fn grid_into_four_balanced_parts() {
    let m = grid(10);
    let g = MeshGraph::from_mesh(&m);
    let pm = partition(&g, g.capacity(), &PartitionerConfig::default()).unwrap();
    let sizes = pm.part_sizes();
    assert_eq!(sizes.iter().sum::<usize>(), 100);
    assert!(sizes.iter().all(|&s| s <= 25), "sizes = {sizes:?}");
    assert!(imbalance(&pm) <= 1.0 + 1e-12);
    assert_eq!(pm.iter().count(), 100);
}

#[test]
fn removed_vertices_are_unassigned() {
    let m = TriMesh::create_mesh(5, &[[0, 1, 2], [0, 2, 3]]).unwrap();
    let g = MeshGraph::from_mesh(&m);
    let pm = partition(&g, 5, &PartitionerConfig::default()).unwrap();
    assert_eq!(pm.part_of(4), None);
    assert!((0..4).all(|v| pm.part_of(v).is_some()));
}

#[test]
fn config_round_trips_through_json() {
    let cfg = PartitionerConfig {
        n_parts: 3,
        rng_seed: 9,
        balance_slack: 0.1,
    };
    let s = serde_json::to_string(&cfg).unwrap();
    let back: PartitionerConfig = serde_json::from_str(&s).unwrap();
    assert_eq!(back, cfg);
    let partial: PartitionerConfig = serde_json::from_str(r#"{"n_parts": 8}"#).unwrap();
    assert_eq!(partial.rng_seed, 42);
}
