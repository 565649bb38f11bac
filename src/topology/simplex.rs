//! Cell shapes and their local numbering tables.
//!
//! A mesh is generic over the shape of its top-dimensional cells. The shape
//! fixes how many vertices a cell has and how local edges and faces are
//! numbered inside one cell; every navigation routine works off these tables
//! and never hard-codes a dimension.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// Simplex dimensions addressable through a [`Tuple`](crate::topology::Tuple).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PrimitiveType {
    Vertex,
    Edge,
    Face,
    Tetrahedron,
}

impl PrimitiveType {
    /// Topological dimension (0 for vertices up to 3 for tetrahedra).
    #[inline]
    pub const fn dimension(self) -> usize {
        match self {
            PrimitiveType::Vertex => 0,
            PrimitiveType::Edge => 1,
            PrimitiveType::Face => 2,
            PrimitiveType::Tetrahedron => 3,
        }
    }

    /// Inverse of [`dimension`](Self::dimension).
    pub const fn from_dimension(dim: usize) -> Option<Self> {
        match dim {
            0 => Some(PrimitiveType::Vertex),
            1 => Some(PrimitiveType::Edge),
            2 => Some(PrimitiveType::Face),
            3 => Some(PrimitiveType::Tetrahedron),
            _ => None,
        }
    }
}

/// Static description of a simplicial cell.
///
/// Implementors are zero-sized markers; all information lives in associated
/// constants so the tables are resolved at compile time.
pub trait CellShape: Copy + Debug + Default + PartialEq + Send + Sync + 'static {
    /// Dimension of a cell.
    const DIM: usize;
    /// Vertices per cell.
    const N_VERTS: usize;
    /// Local vertex pairs of each local edge.
    const LOCAL_EDGES: &'static [[usize; 2]];
    /// Local vertex triples of each local face.
    const LOCAL_FACES: &'static [[usize; 3]];
    /// Number of cells an edge must be shared by for `swap_edge` to apply.
    const EDGE_SWAP_VALENCE: usize;

    /// Fixed-size vertex list of one cell.
    type Verts: Copy + Debug + PartialEq + Eq + Hash + Send + Sync + AsRef<[usize]> + AsMut<[usize]>;

    /// Build a vertex list from a slice of exactly `N_VERTS` ids.
    fn verts_from_slice(s: &[usize]) -> Option<Self::Verts>;

    /// Local vertices of the facet a tuple crosses in `switch_cell`: its edge
    /// for triangles, its face for tetrahedra. `None` for an out-of-range
    /// local index.
    fn tuple_facet(local_eid: usize, local_fid: usize) -> Option<&'static [usize]>;

    /// The primitive type of a whole cell.
    #[inline]
    fn cell_primitive() -> PrimitiveType {
        match Self::DIM {
            2 => PrimitiveType::Face,
            _ => PrimitiveType::Tetrahedron,
        }
    }
}

/// Triangle cells (surface and planar meshes).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Triangle;

/// Tetrahedral cells (volume meshes).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Tetrahedron;

impl CellShape for Triangle {
    const DIM: usize = 2;
    const N_VERTS: usize = 3;
    // edge i is opposite vertex i
    const LOCAL_EDGES: &'static [[usize; 2]] = &[[1, 2], [0, 2], [0, 1]];
    const LOCAL_FACES: &'static [[usize; 3]] = &[[0, 1, 2]];
    const EDGE_SWAP_VALENCE: usize = 2;

    type Verts = [usize; 3];

    #[inline]
    fn verts_from_slice(s: &[usize]) -> Option<Self::Verts> {
        s.try_into().ok()
    }

    #[inline]
    fn tuple_facet(local_eid: usize, _local_fid: usize) -> Option<&'static [usize]> {
        Self::LOCAL_EDGES.get(local_eid).map(|e| e.as_slice())
    }
}

impl CellShape for Tetrahedron {
    const DIM: usize = 3;
    const N_VERTS: usize = 4;
    const LOCAL_EDGES: &'static [[usize; 2]] = &[[0, 1], [1, 2], [0, 2], [0, 3], [1, 3], [2, 3]];
    const LOCAL_FACES: &'static [[usize; 3]] = &[[0, 1, 2], [0, 2, 3], [0, 1, 3], [1, 2, 3]];
    const EDGE_SWAP_VALENCE: usize = 3;

    type Verts = [usize; 4];

    #[inline]
    fn verts_from_slice(s: &[usize]) -> Option<Self::Verts> {
        s.try_into().ok()
    }

    #[inline]
    fn tuple_facet(_local_eid: usize, local_fid: usize) -> Option<&'static [usize]> {
        Self::LOCAL_FACES.get(local_fid).map(|f| f.as_slice())
    }
}

/// Local index of the edge joining local vertices `a` and `b`.
pub fn local_edge_index<S: CellShape>(a: usize, b: usize) -> Option<usize> {
    S::LOCAL_EDGES
        .iter()
        .position(|e| (e[0] == a && e[1] == b) || (e[0] == b && e[1] == a))
}

/// Local index of a face containing both local vertices `a` and `b`, other
/// than `skip`.
pub fn local_face_with_edge<S: CellShape>(a: usize, b: usize, skip: Option<usize>) -> Option<usize> {
    S::LOCAL_FACES
        .iter()
        .enumerate()
        .find(|(i, f)| Some(*i) != skip && f.contains(&a) && f.contains(&b))
        .map(|(i, _)| i)
}

/// Local index of the face made of local vertices `{a, b, c}` in any order.
pub fn local_face_index<S: CellShape>(a: usize, b: usize, c: usize) -> Option<usize> {
    S::LOCAL_FACES
        .iter()
        .position(|f| f.contains(&a) && f.contains(&b) && f.contains(&c))
}

/// Position of global vertex `v` inside a cell's vertex list.
#[inline]
pub fn local_position(verts: &[usize], v: usize) -> Option<usize> {
    verts.iter().position(|&x| x == v)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_tables<S: CellShape>() {
        for (i, e) in S::LOCAL_EDGES.iter().enumerate() {
            assert!(e[0] < S::N_VERTS && e[1] < S::N_VERTS && e[0] != e[1]);
            assert_eq!(local_edge_index::<S>(e[1], e[0]), Some(i));
        }
        for f in S::LOCAL_FACES {
            // every face edge is a local edge
            for (a, b) in [(f[0], f[1]), (f[1], f[2]), (f[0], f[2])] {
                assert!(local_edge_index::<S>(a, b).is_some());
            }
        }
        let n = S::N_VERTS;
        assert_eq!(S::LOCAL_EDGES.len(), n * (n - 1) / 2);
    }

    #[test]
    fn triangle_tables_are_consistent() {
        check_tables::<Triangle>();
        // edge i is opposite vertex i
        for (i, e) in Triangle::LOCAL_EDGES.iter().enumerate() {
            assert!(!e.contains(&i));
        }
    }

    #[test]
    fn tetrahedron_tables_are_consistent() {
        check_tables::<Tetrahedron>();
        // each edge lies on exactly two faces
        for e in Tetrahedron::LOCAL_EDGES {
            let n = Tetrahedron::LOCAL_FACES
                .iter()
                .filter(|f| f.contains(&e[0]) && f.contains(&e[1]))
                .count();
            assert_eq!(n, 2);
        }
    }

    #[test]
    fn primitive_dimension_roundtrip() {
        for d in 0..4 {
            let p = PrimitiveType::from_dimension(d).unwrap();
            assert_eq!(p.dimension(), d);
        }
        assert!(PrimitiveType::from_dimension(4).is_none());
        assert_eq!(Triangle::cell_primitive(), PrimitiveType::Face);
        assert_eq!(Tetrahedron::cell_primitive(), PrimitiveType::Tetrahedron);
    }
}
