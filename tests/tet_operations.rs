use mesh_edit::prelude::*;

mod util;

fn tet_counts(m: &TetMesh) -> (usize, usize) {
    (m.vertex_count(), m.get_all(PrimitiveType::Tetrahedron).len())
}

#[test]
fn split_of_the_shared_edge() {
    let mut m = util::bipyramid();
    let t = m.edge_tuple(0, 1).unwrap();
    let r = m.split_edge(&t).unwrap();
    assert_eq!(r.vid(), 5);
    assert_eq!(tet_counts(&m), (6, 4));
    assert!(m.edge_tuple(0, 1).is_none());
    assert!(m.edge_tuple(5, 0).is_some());
    assert!(m.edge_tuple(5, 1).is_some());
    assert!(m.check_connectivity().is_ok());
}

#[test]
fn face_swap_then_edge_swap_round_trip() {
    let mut m = util::bipyramid();
    let face = m.tuple_from_face(0, 0).unwrap();
    assert_eq!(m.face_vertices(&face), Some([0, 1, 2]));

    let new_edge = m.swap_face(&face).unwrap();
    assert_eq!(tet_counts(&m), (5, 3));
    let (a, b) = m.edge_vertices(&new_edge).unwrap();
    util::assert_permutation(&[a, b], &[3, 4]);
    assert_eq!(m.get_incident(&new_edge, PrimitiveType::Edge).len(), 3);
    assert!(m.check_connectivity().is_ok());

    let back = m.swap_edge(&new_edge).unwrap();
    assert_eq!(tet_counts(&m), (5, 2));
    assert!(m.edge_tuple(3, 4).is_none());
    let verts = m.face_vertices(&back).unwrap();
    util::assert_permutation(&verts, &[0, 1, 2]);
}

#[test]
fn edge_swap_needs_three_tets() {
    let mut m = util::bipyramid();
    let before = m.clone();
    let t = m.edge_tuple(0, 1).unwrap();
    assert!(matches!(m.swap_edge(&t), Err(Rejection::Inapplicable(_))));
    assert_eq!(m, before);
}

#[test]
fn apex_collapse_leaves_one_tet() {
    let mut m = util::bipyramid();
    let t = m.edge_tuple(3, 0).unwrap();
    let survivor = m.collapse_edge(&t).unwrap();
    assert_eq!(survivor.vid(), 0);
    assert_eq!(tet_counts(&m), (4, 1));
    assert!(m.check_connectivity().is_ok());
}

#[test]
fn tet_edits_through_the_executor() {
    let mut m = util::bipyramid();
    let ops = m
        .get_all(PrimitiveType::Edge)
        .into_iter()
        .map(|t| (OperationKind::EdgeSplit, t))
        .collect();
    let report = ExecutePass::<Tetrahedron, _>::new(NoHooks).run(&mut m, ops).unwrap();
    assert!(report.executed >= 1);
    assert_eq!(m.vertex_count(), 5 + report.executed);
    m.consolidate().unwrap();
    assert_eq!(m.vertex_capacity(), m.vertex_count());
    assert!(m.check_connectivity().is_ok());
}
