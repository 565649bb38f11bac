//! Shortest-edge-first collapse.

use crate::data::AttributeHandle;
use crate::mesh_error::MeshEditError;
use crate::operations::{EditHooks, OperationKind};
use crate::remesh::{Position, distance_sq, edge_length_sq, edge_positions, edges_of_cells, midpoint};
use crate::scheduler::{ExecutePass, ExecutorConfig, PassReport};
use crate::topology::mesh::Mesh;
use crate::topology::simplex::{CellShape, PrimitiveType};
use crate::topology::tuple::Tuple;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollapseConfig {
    /// Edges strictly longer than this are left alone.
    pub length_threshold: f64,
    /// Never move a boundary vertex: refuse collapses that would, and keep
    /// the boundary endpoint's position when only the survivor is on it.
    pub freeze_boundary: bool,
}

impl Default for CollapseConfig {
    fn default() -> Self {
        Self {
            length_threshold: 1.0,
            freeze_boundary: false,
        }
    }
}

/// Collapse every edge shorter than the threshold, shortest first.
#[derive(Clone, Debug)]
pub struct ShortestEdgeCollapse {
    position: AttributeHandle<Position>,
    config: CollapseConfig,
}

impl ShortestEdgeCollapse {
    pub fn new(position: AttributeHandle<Position>, config: CollapseConfig) -> Self {
        Self { position, config }
    }

    #[inline]
    pub fn config(&self) -> &CollapseConfig {
        &self.config
    }

    /// Pass with priorities, staleness and renewal wired to edge lengths.
    /// Callers may still add a stopping criterion.
    pub fn pass<S: CellShape>(&self, config: ExecutorConfig) -> ExecutePass<S, Self> {
        let pos = self.position;
        let limit = self.config.length_threshold * self.config.length_threshold;
        ExecutePass::new(self.clone())
            .with_priority(move |m, _, t| edge_length_sq(m, &pos, t).map_or(f64::NEG_INFINITY, |l| -l))
            .with_freshness(move |m, d| {
                edge_length_sq(m, &pos, &d.tuple).is_some_and(|l| (-l).total_cmp(&d.priority).is_eq())
            })
            .with_renewal(move |m, _, affected| {
                edges_of_cells(m, affected)
                    .into_iter()
                    .filter(|e| edge_length_sq(m, &pos, e).is_some_and(|l| l <= limit))
                    .map(|e| (OperationKind::EdgeCollapse, e))
                    .collect()
            })
            .with_config(config)
    }

    /// Queue every edge of `mesh` and collapse to exhaustion.
    pub fn run<S: CellShape>(&self, mesh: &mut Mesh<S>, config: ExecutorConfig) -> Result<PassReport, MeshEditError> {
        let ops = mesh
            .get_all(PrimitiveType::Edge)
            .into_iter()
            .map(|t| (OperationKind::EdgeCollapse, t))
            .collect();
        self.pass(config).run(mesh, ops)
    }
}

impl<S: CellShape> EditHooks<S> for ShortestEdgeCollapse {
    /// Position of the surviving vertex.
    type Cache = Option<Position>;

    fn before(&self, mesh: &Mesh<S>, kind: OperationKind, t: &Tuple, cache: &mut Self::Cache) -> bool {
        if kind != OperationKind::EdgeCollapse {
            return true;
        }
        let Some((p0, p1)) = edge_positions(mesh, &self.position, t) else {
            return false;
        };
        let limit = self.config.length_threshold;
        if distance_sq(&p0, &p1) > limit * limit {
            return false;
        }
        let target = if self.config.freeze_boundary {
            let Some((v0, v1)) = mesh.edge_vertices(t) else {
                return false;
            };
            if mesh.is_boundary_vertex(v0) {
                return false;
            }
            if mesh.is_boundary_vertex(v1) { p1 } else { midpoint(&p0, &p1) }
        } else {
            midpoint(&p0, &p1)
        };
        *cache = Some(target);
        true
    }

    fn after(&self, mesh: &mut Mesh<S>, _kind: OperationKind, t: &Tuple, cache: &Self::Cache) -> bool {
        let Some(p) = cache else {
            return true;
        };
        mesh.attribute_mut(&self.position)
            .and_then(|pos| pos.assign(t.vid(), *p))
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remesh::register_positions;
    use crate::topology::mesh::TriMesh;

    // diamond around interior vertex 0, with ring vertex 1 pulled close
    fn diamond() -> (TriMesh, AttributeHandle<Position>) {
        let mut m = TriMesh::create_mesh(5, &[[0, 1, 2], [0, 2, 3], [0, 3, 4], [0, 4, 1]]).unwrap();
        let h = register_positions(
            &mut m,
            &[[0., 0., 0.], [0.2, 0., 0.], [0., 1., 0.], [-1., 0., 0.], [0., -1., 0.]],
        )
        .unwrap();
        (m, h)
    }

    fn short_only() -> CollapseConfig {
        CollapseConfig {
            length_threshold: 0.5,
            ..Default::default()
        }
    }

    #[test]
    fn long_edges_are_refused_by_the_hook() {
        let (mut m, h) = diamond();
        let driver = ShortestEdgeCollapse::new(h, short_only());
        let before = m.clone();
        let t = m.edge_tuple(0, 2).unwrap();
        assert_eq!(
            m.execute(OperationKind::EdgeCollapse, &t, &driver),
            Err(crate::operations::Rejection::BeforeHook)
        );
        assert_eq!(m, before);
    }

    #[test]
    fn survivor_moves_to_the_midpoint() {
        let (mut m, h) = diamond();
        let driver = ShortestEdgeCollapse::new(h, CollapseConfig::default());
        let t = m.edge_tuple(0, 1).unwrap();
        let applied = m.execute(OperationKind::EdgeCollapse, &t, &driver).unwrap();
        assert_eq!(applied.tuple.vid(), 1);
        assert_eq!(m.attribute(&h).unwrap()[1], [0.1, 0., 0.]);
    }

    #[test]
    fn frozen_boundary_keeps_boundary_positions() {
        let (mut m, h) = diamond();
        let driver = ShortestEdgeCollapse::new(
            h,
            CollapseConfig {
                freeze_boundary: true,
                ..Default::default()
            },
        );
        let outward = m.edge_tuple(1, 0).unwrap();
        assert_eq!(
            m.execute(OperationKind::EdgeCollapse, &outward, &driver),
            Err(crate::operations::Rejection::BeforeHook)
        );
        let inward = m.edge_tuple(0, 1).unwrap();
        m.execute(OperationKind::EdgeCollapse, &inward, &driver).unwrap();
        assert_eq!(m.attribute(&h).unwrap()[1], [0.2, 0., 0.]);
    }

    #[test]
    fn run_collapses_only_the_short_edge() {
        let (mut m, h) = diamond();
        let driver = ShortestEdgeCollapse::new(h, short_only());
        let report = driver.run(&mut m, ExecutorConfig::default()).unwrap();
        assert_eq!(report.executed, 1);
        assert_eq!(m.vertex_count(), 4);
        assert_eq!(m.cell_count(), 2);
    }

    #[test]
    fn config_defaults_fill_missing_fields() {
        let cfg: CollapseConfig = serde_json::from_str(r#"{"freeze_boundary": true}"#).unwrap();
        assert_eq!(cfg.length_threshold, 1.0);
        assert!(cfg.freeze_boundary);
    }
}
