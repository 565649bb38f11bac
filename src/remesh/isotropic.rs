//! Isotropic remeshing: split, collapse, flip and smooth toward one target
//! edge length, repeated for a fixed number of iterations.

use crate::data::AttributeHandle;
use crate::mesh_error::MeshEditError;
use crate::remesh::{
    CollapseConfig, LaplacianSmooth, LongEdgeSplit, Position, ShortestEdgeCollapse, SmoothConfig, SplitConfig,
    ValenceSwap,
};
use crate::scheduler::{ExecutorConfig, PassReport};
use crate::topology::mesh::Mesh;
use crate::topology::simplex::CellShape;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IsotropicConfig {
    pub target_length: f64,
    pub iterations: usize,
    pub use_split: bool,
    pub use_collapse: bool,
    pub use_swap: bool,
    pub use_smooth: bool,
    /// Keep boundary vertices where they are.
    pub freeze_boundary: bool,
}

impl Default for IsotropicConfig {
    fn default() -> Self {
        Self {
            target_length: 1.0,
            iterations: 5,
            use_split: true,
            use_collapse: true,
            use_swap: true,
            use_smooth: true,
            freeze_boundary: true,
        }
    }
}

/// Drives the other remeshing passes in the usual order: split above 4/3 of
/// the target, collapse below 4/5 of it, flip toward regular valence, then
/// smooth. The mesh is consolidated after every iteration.
#[derive(Clone, Debug)]
pub struct IsotropicRemesh {
    position: AttributeHandle<Position>,
    config: IsotropicConfig,
}

impl IsotropicRemesh {
    pub fn new(position: AttributeHandle<Position>, config: IsotropicConfig) -> Self {
        Self { position, config }
    }

    #[inline]
    pub fn config(&self) -> &IsotropicConfig {
        &self.config
    }

    pub fn run<S: CellShape>(&self, mesh: &mut Mesh<S>, exec: ExecutorConfig) -> Result<PassReport, MeshEditError> {
        let cfg = &self.config;
        let split = LongEdgeSplit::new(
            self.position,
            SplitConfig {
                target_length: cfg.target_length * 4.0 / 3.0,
            },
        );
        let collapse = ShortestEdgeCollapse::new(
            self.position,
            CollapseConfig {
                length_threshold: cfg.target_length * 4.0 / 5.0,
                freeze_boundary: cfg.freeze_boundary,
            },
        );
        let smooth = LaplacianSmooth::new(
            self.position,
            SmoothConfig {
                smooth_boundary: !cfg.freeze_boundary,
            },
        );

        let mut total = PassReport::default();
        for i in 1..=cfg.iterations {
            let mut round = PassReport::default();
            if cfg.use_split {
                round.merge(&split.run(mesh, exec.clone())?);
            }
            if cfg.use_collapse {
                round.merge(&collapse.run(mesh, exec.clone())?);
            }
            if cfg.use_swap {
                round.merge(&ValenceSwap.run(mesh, exec.clone())?);
            }
            if cfg.use_smooth {
                round.merge(&smooth.run(mesh, exec.clone())?);
            }
            mesh.consolidate()?;
            log::info!(
                "isotropic iteration {i}: {} edits, {} refused, {} vertices, {} cells",
                round.executed,
                round.rejected_structural + round.rejected_predicate,
                mesh.vertex_count(),
                mesh.cell_count()
            );
            total.merge(&round);
            total.passes += 1;
        }
        Ok(total)
    }
}
