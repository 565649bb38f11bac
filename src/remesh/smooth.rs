//! Laplacian vertex smoothing.

use crate::data::AttributeHandle;
use crate::mesh_error::MeshEditError;
use crate::operations::{EditHooks, OperationKind};
use crate::remesh::Position;
use crate::scheduler::{ExecutePass, ExecutorConfig, PassReport};
use crate::topology::mesh::Mesh;
use crate::topology::simplex::{CellShape, PrimitiveType};
use crate::topology::tuple::Tuple;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothConfig {
    /// Also move boundary vertices, averaging only their boundary
    /// neighbours so they slide along the boundary.
    pub smooth_boundary: bool,
}

/// Move each vertex to the average of its one-ring.
#[derive(Clone, Debug)]
pub struct LaplacianSmooth {
    position: AttributeHandle<Position>,
    config: SmoothConfig,
}

impl LaplacianSmooth {
    pub fn new(position: AttributeHandle<Position>, config: SmoothConfig) -> Self {
        Self { position, config }
    }

    #[inline]
    pub fn config(&self) -> &SmoothConfig {
        &self.config
    }

    pub fn pass<S: CellShape>(&self, config: ExecutorConfig) -> ExecutePass<S, Self> {
        ExecutePass::new(self.clone()).with_config(config)
    }

    /// Smooth every vertex once, in vertex order.
    pub fn run<S: CellShape>(&self, mesh: &mut Mesh<S>, config: ExecutorConfig) -> Result<PassReport, MeshEditError> {
        let ops = mesh
            .get_all(PrimitiveType::Vertex)
            .into_iter()
            .map(|t| (OperationKind::VertexSmooth, t))
            .collect();
        self.pass(config).run(mesh, ops)
    }

    fn target<S: CellShape>(&self, mesh: &Mesh<S>, v: usize) -> Option<Position> {
        let on_boundary = mesh.is_boundary_vertex(v);
        if on_boundary && !self.config.smooth_boundary {
            return None;
        }
        let pos = mesh.attribute(&self.position).ok()?;
        let ring: Vec<usize> = mesh
            .one_ring_vids(v)
            .into_iter()
            .filter(|&w| {
                !on_boundary || mesh.edge_tuple(v, w).is_some_and(|e| mesh.is_boundary_edge(&e))
            })
            .collect();
        if ring.is_empty() {
            return None;
        }
        let mut sum = [0.0; 3];
        for w in &ring {
            let p = pos.get(*w)?;
            for (s, x) in sum.iter_mut().zip(p) {
                *s += x;
            }
        }
        let n = ring.len() as f64;
        Some(sum.map(|s| s / n))
    }
}

impl<S: CellShape> EditHooks<S> for LaplacianSmooth {
    /// New position of the smoothed vertex.
    type Cache = Option<Position>;

    fn before(&self, mesh: &Mesh<S>, kind: OperationKind, t: &Tuple, cache: &mut Self::Cache) -> bool {
        if kind != OperationKind::VertexSmooth {
            return true;
        }
        *cache = self.target(mesh, t.vid());
        cache.is_some()
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
