// Graph trait abstraction for partitioning
use crate::topology::mesh::Mesh;
use crate::topology::simplex::CellShape;
use rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};
use std::hash::Hash;

/// Trait for graphs that can be partitioned.
//
/// All methods are read-only and thread-safe. Implementors must guarantee
/// that all returned iterators are safe for concurrent use and do not mutate
/// the graph.
pub trait PartitionableGraph: Sync {
    /// Vertex identifier type (must be copyable, hashable, and thread-safe).
    type VertexId: Copy + Hash + Eq + Send + Sync;
    /// Parallel iterator over all vertices.
    type VertexParIter<'a>: IndexedParallelIterator<Item = Self::VertexId> + 'a
    where
        Self: 'a;
    /// Parallel iterator over neighbors.
    type NeighParIter<'a>: ParallelIterator<Item = Self::VertexId> + 'a
    where
        Self: 'a;
    /// Sequential iterator over neighbors.
    type NeighIter<'a>: Iterator<Item = Self::VertexId> + 'a
    where
        Self: 'a;

    /// Returns a parallel, indexable iterator over all vertices.
    fn vertices(&self) -> Self::VertexParIter<'_>;

    /// Returns a parallel iterator over neighbours of `v`.
    fn neighbors(&self, v: Self::VertexId) -> Self::NeighParIter<'_>;

    /// Returns a sequential iterator over neighbours of `v`.
    fn neighbors_seq(&self, v: Self::VertexId) -> Self::NeighIter<'_>;

    /// Degree of a vertex (number of neighbors).
    fn degree(&self, v: Self::VertexId) -> usize;

    /// Returns a parallel iterator over all undirected edges (u, v) with u < v.
    fn edges(&self) -> impl ParallelIterator<Item = (Self::VertexId, Self::VertexId)> + '_
    where
        Self::VertexId: PartialOrd,
    {
        self.vertices().flat_map_iter(move |u| {
            self.neighbors_seq(u)
                .filter(move |&v| u < v)
                .map(move |v| (u, v))
                .collect::<Vec<_>>()
                .into_iter()
        })
    }
}

/// Vertex adjacency of a mesh, snapshotted for partitioning.
///
/// Vertex ids are the mesh's vertex slots; removed vertices are absent from
/// [`vertices`](PartitionableGraph::vertices) and have no neighbours.
#[derive(Clone, Debug, Default)]
pub struct MeshGraph {
    live: Vec<usize>,
    adj: Vec<Vec<usize>>,
}

impl MeshGraph {
    pub fn from_mesh<S: CellShape>(mesh: &Mesh<S>) -> Self {
        let cap = mesh.vertex_capacity();
        let adj = (0..cap)
            .into_par_iter()
            .map(|v| {
                if mesh.connectivity().is_vertex_live(v) {
                    mesh.one_ring_vids(v)
                } else {
                    Vec::new()
                }
            })
            .collect();
        Self {
            live: mesh.connectivity().live_vertices().collect(),
            adj,
        }
    }

    /// Number of vertex slots, removed ones included.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.adj.len()
    }
}

impl PartitionableGraph for MeshGraph {
    type VertexId = usize;
    type VertexParIter<'a> = rayon::iter::Copied<rayon::slice::Iter<'a, usize>>;
    type NeighParIter<'a> = rayon::iter::Copied<rayon::slice::Iter<'a, usize>>;
    type NeighIter<'a> = std::iter::Copied<std::slice::Iter<'a, usize>>;

    fn vertices(&self) -> Self::VertexParIter<'_> {
        self.live.as_slice().into_par_iter().copied()
    }

    fn neighbors(&self, v: usize) -> Self::NeighParIter<'_> {
        self.adj.get(v).map_or(&[][..], Vec::as_slice).into_par_iter().copied()
    }

    fn neighbors_seq(&self, v: usize) -> Self::NeighIter<'_> {
        self.adj.get(v).map_or(&[][..], Vec::as_slice).iter().copied()
    }

    fn degree(&self, v: usize) -> usize {
        self.adj.get(v).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::mesh::TriMesh;

    #[test]
    fn mesh_graph_of_a_quad() {
        // two triangles sharing edge 0-2, vertex 4 unreferenced
        let m = TriMesh::create_mesh(5, &[[0, 1, 2], [0, 2, 3]]).unwrap();
        let g = MeshGraph::from_mesh(&m);
        assert_eq!(g.capacity(), 5);
        let mut vs: Vec<_> = g.vertices().collect();
        vs.sort();
        assert_eq!(vs, vec![0, 1, 2, 3]);
        assert_eq!(g.degree(0), 3);
        assert_eq!(g.degree(4), 0);
        let mut ns: Vec<_> = g.neighbors(1).collect();
        ns.sort();
        assert_eq!(ns, vec![0, 2]);
    }

    #[test]
    fn edges_are_listed_once() {
        let m = TriMesh::create_mesh(4, &[[0, 1, 2], [0, 2, 3]]).unwrap();
        let g = MeshGraph::from_mesh(&m);
        let mut edges: Vec<_> = g.edges().collect();
        edges.sort();
        assert_eq!(edges, vec![(0, 1), (0, 2), (0, 3), (1, 2), (2, 3)]);
    }
}
