#![allow(dead_code)]
use mesh_edit::data::AttributeHandle;
use mesh_edit::remesh::{Position, register_positions};
use mesh_edit::topology::{PrimitiveType, TetMesh, TriMesh};

/// Unit square split along 0-2.
pub fn quad() -> TriMesh {
    TriMesh::create_mesh(4, &[[0, 1, 2], [0, 2, 3]]).unwrap()
}

/// `n x n` unit-spaced lattice, each square cut along its rising diagonal.
pub fn grid(n: usize) -> (TriMesh, AttributeHandle<Position>) {
    let id = |i: usize, j: usize| j * n + i;
    let mut cells = Vec::new();
    for j in 0..n - 1 {
        for i in 0..n - 1 {
            cells.push([id(i, j), id(i + 1, j), id(i + 1, j + 1)]);
            cells.push([id(i, j), id(i + 1, j + 1), id(i, j + 1)]);
        }
    }
    let coords: Vec<Position> = (0..n * n).map(|v| [(v % n) as f64, (v / n) as f64, 0.0]).collect();
    let mut m = TriMesh::create_mesh(n * n, &cells).unwrap();
    let h = register_positions(&mut m, &coords).unwrap();
    (m, h)
}

/// Open fan of four triangles around vertex 0; vertex 1 sits on top of 0.
pub fn open_fan() -> (TriMesh, AttributeHandle<Position>) {
    let mut m = TriMesh::create_mesh(6, &[[0, 1, 2], [0, 2, 3], [0, 3, 4], [0, 4, 5]]).unwrap();
    let coords = [
        [0.0, 0.0, 0.0],
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.5, 0.9, 0.0],
        [-0.5, 0.9, 0.0],
        [-1.0, 0.0, 0.0],
    ];
    let h = register_positions(&mut m, &coords).unwrap();
    (m, h)
}

/// Closed fan of five triangles around interior vertex 0; ring vertex 1
/// sits on top of 0.
pub fn closed_fan() -> (TriMesh, AttributeHandle<Position>) {
    let cells: Vec<[usize; 3]> = (1..=5).map(|i| [0, i, i % 5 + 1]).collect();
    let mut m = TriMesh::create_mesh(6, &cells).unwrap();
    let mut coords = vec![[0.0; 3]; 6];
    for (k, p) in coords.iter_mut().enumerate().skip(2) {
        let a = (k - 1) as f64 * std::f64::consts::TAU / 5.0;
        *p = [a.cos(), a.sin(), 0.0];
    }
    let h = register_positions(&mut m, &coords).unwrap();
    (m, h)
}

/// Two tetrahedra glued on face 0-1-2, apexes 3 and 4.
pub fn bipyramid() -> TetMesh {
    TetMesh::create_mesh(5, &[[0, 1, 2, 3], [0, 2, 1, 4]]).unwrap()
}

/// Counts of live vertices and cells.
pub fn counts(m: &TriMesh) -> (usize, usize) {
    (m.vertex_count(), m.get_all(PrimitiveType::Face).len())
}

/// Assert vec is a permutation of another vec (order-agnostic).
pub fn assert_permutation<T: Ord + Copy + std::fmt::Debug>(got: &[T], want: &[T]) {
    let mut a = got.to_vec();
    a.sort_unstable();
    let mut b = want.to_vec();
    b.sort_unstable();
    assert_eq!(a, b, "not a permutation\n got={:?}\nwant={:?}", got, want);
}
