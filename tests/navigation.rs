use mesh_edit::topology::{CellShape, Mesh, PrimitiveType, TetMesh, TriMesh, Tuple};
use proptest::prelude::*;
use std::collections::{BTreeSet, HashSet};

mod util;

/// Kuhn split of the unit cube into six tetrahedra around the 0-7 diagonal.
fn cube() -> TetMesh {
    let axes = [1usize, 2, 4];
    let mut cells = Vec::new();
    for &a in &axes {
        for &b in &axes {
            if a != b {
                cells.push([0, a, a | b, 7]);
            }
        }
    }
    TetMesh::create_mesh(8, &cells).unwrap()
}

fn walk<S: CellShape>(m: &Mesh<S>, start: Tuple, steps: &[u8]) -> Tuple {
    steps.iter().fold(start, |t, s| match s % 4 {
        0 => m.switch_vertex(&t).unwrap(),
        1 => m.switch_edge(&t).unwrap(),
        2 => m.switch_face(&t).unwrap(),
        _ => m.switch_cell(&t).unwrap_or(t),
    })
}

fn check_laws<S: CellShape>(m: &Mesh<S>, t: Tuple) {
    assert!(m.is_valid(&t));
    let sv = m.switch_vertex(&t).unwrap();
    assert_ne!(sv.vid(), t.vid());
    assert_eq!(m.switch_vertex(&sv), Some(t));
    let se = m.switch_edge(&t).unwrap();
    assert_eq!(se.vid(), t.vid());
    assert_eq!(m.switch_edge(&se), Some(t));
    assert_eq!(m.switch_face(&m.switch_face(&t).unwrap()), Some(t));
    match m.switch_cell(&t) {
        Some(n) => {
            assert_ne!(n.cid(), t.cid());
            assert_eq!(n.vid(), t.vid());
            assert_eq!(m.switch_cell(&n), Some(t));
        }
        None if S::DIM == 2 => assert!(m.is_boundary_edge(&t)),
        None => {}
    }
}

/// Every tuple reachable from `start` by the switches that keep its vertex.
fn vertex_orbit<S: CellShape>(m: &Mesh<S>, start: Tuple) -> HashSet<Tuple> {
    let mut seen = HashSet::from([start]);
    let mut todo = vec![start];
    while let Some(t) = todo.pop() {
        let next = [m.switch_edge(&t), m.switch_face(&t), m.switch_cell(&t)];
        for n in next.into_iter().flatten() {
            if seen.insert(n) {
                todo.push(n);
            }
        }
    }
    seen
}

fn sorted_pair((a, b): (usize, usize)) -> (usize, usize) {
    (a.min(b), a.max(b))
}

/// The orbit of a vertex tuple covers exactly the simplices around the
/// vertex, once per (cell, edge, face) flag.
fn check_orbit<S: CellShape>(m: &Mesh<S>, v: usize) {
    let start = m.tuple_from_vertex(v).unwrap();
    let orbit = vertex_orbit(m, start);
    assert!(orbit.iter().all(|t| t.vid() == v && m.is_valid(t)));

    let cells: BTreeSet<usize> = orbit.iter().map(|t| t.cid()).collect();
    let incident: BTreeSet<usize> = m
        .get_incident(&start, PrimitiveType::Vertex)
        .iter()
        .map(|t| t.cid())
        .collect();
    assert_eq!(cells, incident, "cells around {v}");

    let edges: BTreeSet<(usize, usize)> = orbit
        .iter()
        .map(|t| sorted_pair(m.edge_vertices(t).unwrap()))
        .collect();
    let ring: BTreeSet<(usize, usize)> = m
        .get_one_ring(&start, PrimitiveType::Edge)
        .iter()
        .map(|t| sorted_pair(m.edge_vertices(t).unwrap()))
        .collect();
    assert_eq!(edges, ring, "edges around {v}");

    let pairs: BTreeSet<(usize, usize)> = orbit.iter().map(|t| (t.cid(), t.local_eid())).collect();
    let flags_per_cell = if S::DIM == 2 { 2 } else { 6 };
    let edges_per_cell = if S::DIM == 2 { 2 } else { 3 };
    assert_eq!(pairs.len(), incident.len() * edges_per_cell);
    assert_eq!(orbit.len(), incident.len() * flags_per_cell);

    if S::DIM == 3 {
        let faces: BTreeSet<[usize; 3]> = orbit
            .iter()
            .map(|t| {
                let mut f = m.face_vertices(t).unwrap();
                f.sort_unstable();
                f
            })
            .collect();
        let around: BTreeSet<[usize; 3]> = m
            .get_one_ring(&start, PrimitiveType::Face)
            .iter()
            .map(|t| {
                let mut f = m.face_vertices(t).unwrap();
                f.sort_unstable();
                f
            })
            .collect();
        assert_eq!(faces, around, "faces around {v}");
    }
}

#[test]
fn vertex_orbits_cover_the_grid_stars() {
    let (m, _) = util::grid(4);
    for v in 0..m.vertex_count() {
        check_orbit(&m, v);
    }
}

#[test]
fn vertex_orbits_cover_the_cube_stars() {
    let m = cube();
    for v in 0..8 {
        check_orbit(&m, v);
    }
    // the diagonal ends see all six cells
    let t = m.tuple_from_vertex(0).unwrap();
    assert_eq!(vertex_orbit(&m, t).len(), 36);
}

proptest! {
    #[test]
    fn triangle_switches_are_involutions(
        n in 3usize..7,
        cell in any::<prop::sample::Index>(),
        j in 0usize..3,
        steps in prop::collection::vec(any::<u8>(), 0..16),
    ) {
        let (m, _) = util::grid(n);
        let cid = cell.index(m.cell_count());
        let t = walk(&m, m.tuple_from_edge(cid, j).unwrap(), &steps);
        check_laws(&m, t);
    }

    #[test]
    fn tet_switches_are_involutions(
        cell in 0usize..6,
        j in 0usize..6,
        steps in prop::collection::vec(any::<u8>(), 0..16),
    ) {
        let m = cube();
        let t = walk(&m, m.tuple_from_edge(cell, j).unwrap(), &steps);
        check_laws(&m, t);
    }
}

#[test]
fn cube_has_expected_counts() {
    let m = cube();
    assert_eq!(m.get_all(PrimitiveType::Vertex).len(), 8);
    assert_eq!(m.get_all(PrimitiveType::Edge).len(), 19);
    assert_eq!(m.get_all(PrimitiveType::Face).len(), 18);
    assert_eq!(m.get_all(PrimitiveType::Tetrahedron).len(), 6);
    // the main diagonal is shared by all six cells
    let diag = m.edge_tuple(0, 7).unwrap();
    assert_eq!(m.get_incident(&diag, PrimitiveType::Edge).len(), 6);
    assert!(!m.is_boundary_edge(&diag));
}

#[test]
fn one_ring_of_a_grid_vertex() {
    let (m, _) = util::grid(3);
    let centre = m.tuple_from_vertex(4).unwrap();
    let ring: Vec<usize> = m
        .get_one_ring(&centre, PrimitiveType::Vertex)
        .iter()
        .map(|t| t.vid())
        .collect();
    util::assert_permutation(&ring, &[0, 1, 3, 5, 7, 8]);
    assert_eq!(m.get_one_ring(&centre, PrimitiveType::Face).len(), 6);
    assert!(!m.is_boundary_vertex(4));
    assert!(m.is_boundary_vertex(0));
}

#[test]
fn triangle_mesh_has_no_tetrahedra() {
    let m: TriMesh = util::quad();
    assert!(m.get_all(PrimitiveType::Tetrahedron).is_empty());
    assert_eq!(m.get_all(PrimitiveType::Face).len(), 2);
}
