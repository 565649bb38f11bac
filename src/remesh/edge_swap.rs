//! Valence-improving edge flips on triangle meshes.

use crate::mesh_error::MeshEditError;
use crate::operations::{EditHooks, OperationKind};
use crate::remesh::edges_of_cells;
use crate::scheduler::{ExecutePass, ExecutorConfig, PassReport};
use crate::topology::mesh::Mesh;
use crate::topology::simplex::{CellShape, PrimitiveType};
use crate::topology::tuple::Tuple;

/// Ideal valence of an interior vertex of a triangle mesh.
pub const INTERIOR_VALENCE: usize = 6;
/// Ideal valence of a boundary vertex.
pub const BOUNDARY_VALENCE: usize = 4;

/// Flip interior edges when that brings the four involved vertices closer to
/// their ideal valence. Refuses every edit on tetrahedral meshes.
#[derive(Copy, Clone, Debug, Default)]
pub struct ValenceSwap;

impl ValenceSwap {
    pub fn pass<S: CellShape>(&self, config: ExecutorConfig) -> ExecutePass<S, Self> {
        ExecutePass::new(*self)
            .with_priority(|m, _, t| valence_gain(m, t).map_or(f64::NEG_INFINITY, |g| g as f64))
            .with_freshness(|m, d| {
                valence_gain(m, &d.tuple).is_some_and(|g| (g as f64).total_cmp(&d.priority).is_eq())
            })
            .with_renewal(|m, _, affected| {
                edges_of_cells(m, affected)
                    .into_iter()
                    .filter(|e| valence_gain(m, e).is_some_and(|g| g > 0))
                    .map(|e| (OperationKind::EdgeSwap, e))
                    .collect()
            })
            .with_config(config)
    }

    /// Queue every edge of `mesh` and flip while the valence improves.
    pub fn run<S: CellShape>(&self, mesh: &mut Mesh<S>, config: ExecutorConfig) -> Result<PassReport, MeshEditError> {
        let ops = mesh
            .get_all(PrimitiveType::Edge)
            .into_iter()
            .map(|t| (OperationKind::EdgeSwap, t))
            .collect();
        self.pass(config).run(mesh, ops)
    }
}

fn valence_error<S: CellShape>(mesh: &Mesh<S>, v: usize, valence: usize) -> i64 {
    let ideal = if mesh.is_boundary_vertex(v) { BOUNDARY_VALENCE } else { INTERIOR_VALENCE };
    let d = valence as i64 - ideal as i64;
    d * d
}

/// How much flipping the tuple's interior edge lowers the squared valence
/// error of its two endpoints and two opposite vertices. `None` for boundary
/// edges and on tetrahedral meshes.
pub fn valence_gain<S: CellShape>(mesh: &Mesh<S>, t: &Tuple) -> Option<i64> {
    if S::DIM != 2 {
        return None;
    }
    let (a, b) = mesh.edge_vertices(t)?;
    let incident = mesh.get_incident(t, PrimitiveType::Edge);
    if incident.len() != 2 {
        return None;
    }
    let mut opposite = Vec::with_capacity(2);
    for e in &incident {
        let c = mesh.cell_vertices(e.cid())?.iter().copied().find(|&x| x != a && x != b)?;
        opposite.push(c);
    }
    let mut gain = 0;
    for (v, delta) in [(a, -1i64), (b, -1), (opposite[0], 1), (opposite[1], 1)] {
        let val = mesh.one_ring_vids(v).len();
        let after = (val as i64 + delta).max(0) as usize;
        gain += valence_error(mesh, v, val) - valence_error(mesh, v, after);
    }
    Some(gain)
}

impl<S: CellShape> EditHooks<S> for ValenceSwap {
    type Cache = ();

    fn before(&self, mesh: &Mesh<S>, kind: OperationKind, t: &Tuple, _cache: &mut ()) -> bool {
        if kind != OperationKind::EdgeSwap {
            return true;
        }
        valence_gain(mesh, t).is_some_and(|g| g > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::Rejection;
    use crate::topology::mesh::{TetMesh, TriMesh};

    // square 0,1,2,3 split along 0-2, extra triangles hanging off 0 and 2
    fn crowded() -> TriMesh {
        TriMesh::create_mesh(
            8,
            &[[0, 1, 2], [0, 2, 3], [0, 3, 4], [0, 4, 5], [2, 1, 6], [2, 6, 7]],
        )
        .unwrap()
    }

    #[test]
    fn gain_counts_all_four_vertices() {
        let m = crowded();
        let diag = m.edge_tuple(0, 2).unwrap();
        // all four on the boundary: 0 and 2 at valence 5, 1 and 3 at 3
        assert_eq!(valence_gain(&m, &diag), Some(4));
        assert_eq!(valence_gain(&m, &m.edge_tuple(0, 1).unwrap()), None);
    }

    #[test]
    fn flips_only_when_it_helps() {
        let mut m = TriMesh::create_mesh(4, &[[0, 1, 2], [0, 2, 3]]).unwrap();
        // every corner of a lone quad is on the boundary: 3,2,3,2 -> 2,3,2,3
        let diag = m.edge_tuple(0, 2).unwrap();
        assert_eq!(valence_gain(&m, &diag), Some(0));
        assert_eq!(m.execute(OperationKind::EdgeSwap, &diag, &ValenceSwap), Err(Rejection::BeforeHook));

        let mut c = crowded();
        let report = ValenceSwap.run(&mut c, ExecutorConfig::default()).unwrap();
        assert_eq!(report.executed, 1);
        assert!(c.edge_tuple(1, 3).is_some());
        assert!(c.edge_tuple(0, 2).is_none());
        assert!(c.check_connectivity().is_ok());
    }

    #[test]
    fn tet_meshes_are_refused() {
        let mut m = TetMesh::create_mesh(5, &[[0, 1, 2, 3], [0, 2, 1, 4]]).unwrap();
        let t = m.edge_tuple(0, 1).unwrap();
        assert_eq!(valence_gain(&m, &t), None);
        assert!(m.execute(OperationKind::EdgeSwap, &t, &ValenceSwap).is_err());
    }
}
