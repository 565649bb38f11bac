//! Reference edit drivers over a vertex position attribute.
//!
//! Each driver is an [`EditHooks`](crate::operations::EditHooks)
//! implementation plus the scheduling callbacks that go with it, packaged
//! as a ready [`ExecutePass`](crate::scheduler::ExecutePass):
//!
//! - [`ShortestEdgeCollapse`] collapses edges below a length threshold,
//!   shortest first, placing the survivor at the edge midpoint.
//! - [`LongEdgeSplit`] splits edges above a target length, longest first.
//! - [`ValenceSwap`] flips triangle-mesh edges toward regular valence.
//! - [`LaplacianSmooth`] moves vertices to their one-ring average.
//! - [`IsotropicRemesh`] chains the four toward one target length.

pub mod edge_split;
pub mod edge_swap;
pub mod isotropic;
pub mod shortest_edge_collapse;
pub mod smooth;

pub use edge_split::{LongEdgeSplit, SplitConfig};
pub use edge_swap::{ValenceSwap, valence_gain};
pub use isotropic::{IsotropicConfig, IsotropicRemesh};
pub use shortest_edge_collapse::{CollapseConfig, ShortestEdgeCollapse};
pub use smooth::{LaplacianSmooth, SmoothConfig};

use crate::data::AttributeHandle;
use crate::mesh_error::MeshEditError;
use crate::topology::mesh::Mesh;
use crate::topology::simplex::{CellShape, PrimitiveType};
use crate::topology::tuple::Tuple;
use hashbrown::HashSet;

/// Point in space; triangle meshes use `z = 0`.
pub type Position = [f64; 3];

/// Name under which [`register_positions`] stores the coordinates.
pub const POSITION: &str = "position";

/// Register the vertex position attribute and fill it from `coords`.
pub fn register_positions<S: CellShape>(
    mesh: &mut Mesh<S>,
    coords: &[Position],
) -> Result<AttributeHandle<Position>, MeshEditError> {
    let h = mesh.register_attribute(POSITION, PrimitiveType::Vertex, [0.0; 3])?;
    let pos = mesh.attribute_mut(&h)?;
    for (v, p) in coords.iter().enumerate() {
        pos.assign(v, *p)?;
    }
    Ok(h)
}

#[inline]
pub fn distance_sq(a: &Position, b: &Position) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[inline]
pub fn midpoint(a: &Position, b: &Position) -> Position {
    [(a[0] + b[0]) * 0.5, (a[1] + b[1]) * 0.5, (a[2] + b[2]) * 0.5]
}

/// Squared length of the tuple's edge.
pub fn edge_length_sq<S: CellShape>(mesh: &Mesh<S>, pos: &AttributeHandle<Position>, t: &Tuple) -> Option<f64> {
    let (a, b) = mesh.edge_vertices(t)?;
    let pos = mesh.attribute(pos).ok()?;
    Some(distance_sq(pos.get(a)?, pos.get(b)?))
}

/// Endpoint positions of the tuple's edge, tuple vertex first.
pub(crate) fn edge_positions<S: CellShape>(
    mesh: &Mesh<S>,
    pos: &AttributeHandle<Position>,
    t: &Tuple,
) -> Option<(Position, Position)> {
    let (a, b) = mesh.edge_vertices(t)?;
    let pos = mesh.attribute(pos).ok()?;
    Some((*pos.get(a)?, *pos.get(b)?))
}

/// One tuple per distinct edge of the cells named by `cells`.
pub fn edges_of_cells<S: CellShape>(mesh: &Mesh<S>, cells: &[Tuple]) -> Vec<Tuple> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for t in cells {
        for j in 0..S::LOCAL_EDGES.len() {
            let Some(e) = mesh.tuple_from_edge(t.cid(), j) else {
                continue;
            };
            if let Some((a, b)) = mesh.edge_vertices(&e) {
                if seen.insert((a.min(b), a.max(b))) {
                    out.push(e);
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::mesh::TriMesh;

    #[test]
    fn positions_and_lengths() {
        let mut m = TriMesh::create_mesh(4, &[[0, 1, 2], [0, 2, 3]]).unwrap();
        let h = register_positions(&mut m, &[[0., 0., 0.], [1., 0., 0.], [1., 1., 0.], [0., 1., 0.]]).unwrap();
        assert_eq!(m.find_attribute::<Position>(POSITION, PrimitiveType::Vertex), Some(h));
        let diag = m.edge_tuple(0, 2).unwrap();
        assert_eq!(edge_length_sq(&m, &h, &diag), Some(2.0));
        assert_eq!(midpoint(&[0., 0., 0.], &[1., 1., 0.]), [0.5, 0.5, 0.]);
    }

    #[test]
    fn shared_edges_are_listed_once() {
        let m = TriMesh::create_mesh(4, &[[0, 1, 2], [0, 2, 3]]).unwrap();
        let cells = m.get_all(PrimitiveType::Face);
        assert_eq!(edges_of_cells(&m, &cells).len(), 5);
    }
}
