//! Longest-edge-first split toward a target length.

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
pub struct SplitConfig {
    /// Edges strictly longer than this get split.
    pub target_length: f64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self { target_length: 1.0 }
    }
}

/// Split every edge longer than the target, longest first; new vertices sit
/// at edge midpoints.
#[derive(Clone, Debug)]
pub struct LongEdgeSplit {
    position: AttributeHandle<Position>,
    config: SplitConfig,
}

impl LongEdgeSplit {
    pub fn new(position: AttributeHandle<Position>, config: SplitConfig) -> Self {
        Self { position, config }
    }

    #[inline]
    pub fn config(&self) -> &SplitConfig {
        &self.config
    }

    pub fn pass<S: CellShape>(&self, config: ExecutorConfig) -> ExecutePass<S, Self> {
        let pos = self.position;
        let limit = self.config.target_length * self.config.target_length;
        ExecutePass::new(self.clone())
            .with_priority(move |m, _, t| edge_length_sq(m, &pos, t).unwrap_or(f64::NEG_INFINITY))
            .with_freshness(move |m, d| {
                edge_length_sq(m, &pos, &d.tuple).is_some_and(|l| l.total_cmp(&d.priority).is_eq())
            })
            .with_renewal(move |m, _, affected| {
                edges_of_cells(m, affected)
                    .into_iter()
                    .filter(|e| edge_length_sq(m, &pos, e).is_some_and(|l| l > limit))
                    .map(|e| (OperationKind::EdgeSplit, e))
                    .collect()
            })
            .with_config(config)
    }

    /// Queue every edge of `mesh` and split to exhaustion.
    pub fn run<S: CellShape>(&self, mesh: &mut Mesh<S>, config: ExecutorConfig) -> Result<PassReport, MeshEditError> {
        let ops = mesh
            .get_all(PrimitiveType::Edge)
            .into_iter()
            .map(|t| (OperationKind::EdgeSplit, t))
            .collect();
        self.pass(config).run(mesh, ops)
    }
}

impl<S: CellShape> EditHooks<S> for LongEdgeSplit {
    /// Position of the new vertex.
    type Cache = Option<Position>;

    fn before(&self, mesh: &Mesh<S>, kind: OperationKind, t: &Tuple, cache: &mut Self::Cache) -> bool {
        if kind != OperationKind::EdgeSplit {
            return true;
        }
        let Some((p0, p1)) = edge_positions(mesh, &self.position, t) else {
            return false;
        };
        let target = self.config.target_length;
        if distance_sq(&p0, &p1) <= target * target {
            return false;
        }
        *cache = Some(midpoint(&p0, &p1));
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
