//! Partitioning metrics utilities.
//!
//! Functions for evaluating the quality of a vertex partition: edge cut,
//! load imbalance and replication factor. The executor logs them at debug
//! level; tests use them to check partition quality.

use super::{PartitionMap, PartitionableGraph};
use hashbrown::HashSet;
use rayon::iter::ParallelIterator;

/// Computes the edge cut of a partitioning (O(E)).
///
/// The edge cut is the number of edges whose endpoints lie in different
/// parts. Vertices missing from the map count as part 0.
pub fn edge_cut<G>(g: &G, pm: &PartitionMap) -> usize
where
    G: PartitionableGraph<VertexId = usize>,
{
    g.edges()
        .filter(|&(u, v)| pm.part_of(u).unwrap_or(0) != pm.part_of(v).unwrap_or(0))
        .count()
}

/// Ratio of the largest part to the mean part size; 1.0 is perfect balance.
pub fn imbalance(pm: &PartitionMap) -> f64 {
    let sizes = pm.part_sizes();
    let total: usize = sizes.iter().sum();
    if total == 0 {
        return 1.0;
    }
    let max = sizes.iter().copied().max().unwrap_or(0);
    max as f64 * sizes.len() as f64 / total as f64
}

/// Computes the replication factor of a partitioning (O(E)).
///
/// The average number of parts each vertex is present in when every part
/// also keeps the one-ring of its own vertices. This is the number of
/// workers whose lock sets may touch a vertex.
pub fn replication_factor<G>(g: &G, pm: &PartitionMap) -> f64
where
    G: PartitionableGraph<VertexId = usize>,
{
    let per_vertex: Vec<usize> = g
        .vertices()
        .map(|u| {
            let mut owners = HashSet::new();
            owners.insert(pm.part_of(u).unwrap_or(0));
            for v in g.neighbors_seq(u) {
                owners.insert(pm.part_of(v).unwrap_or(0));
            }
            owners.len()
        })
        .collect();
    if per_vertex.is_empty() {
        return 0.0;
    }
    per_vertex.iter().sum::<usize>() as f64 / per_vertex.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partitioning::graph_traits::MeshGraph;
    use crate::topology::mesh::TriMesh;

    fn strip() -> (MeshGraph, PartitionMap) {
        // 0-1-2 over 3-4-5, split into left {0,1,3,4} and right {2,5}
        let m = TriMesh::create_mesh(6, &[[0, 1, 3], [1, 4, 3], [1, 2, 4], [2, 5, 4]]).unwrap();
        let g = MeshGraph::from_mesh(&m);
        let pm = PartitionMap::from_parts(vec![Some(0), Some(0), Some(1), Some(0), Some(0), Some(1)], 2);
        (g, pm)
    }

    #[test]
    fn cut_and_balance() {
        let (g, pm) = strip();
        // cut edges: 1-2, 2-4, 4-5
        assert_eq!(edge_cut(&g, &pm), 3);
        assert!((imbalance(&pm) - 4.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn replication_counts_ghost_parts() {
        let (g, pm) = strip();
        // vertices 1, 2, 4, 5 see both parts
        assert!((replication_factor(&g, &pm) - 10.0 / 6.0).abs() < 1e-12);
    }
}
