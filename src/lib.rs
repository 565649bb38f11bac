#![cfg_attr(docsrs, feature(doc_cfg))]
//! # mesh-edit
//!
//! mesh-edit is a kernel for transactional topological editing of
//! simplicial meshes (triangles in 2-D, tetrahedra in 3-D). It provides
//! tuple-based navigation, atomic local edits with full rollback, and
//! schedulers that drive large batches of edits sequentially or across
//! mesh partitions in parallel.
//!
//! ## Features
//! - Arena-backed connectivity with tombstoned deletion, per-cell versions
//!   for stale-handle detection, and an explicit [`Mesh::consolidate`]
//!   compaction pass
//! - Per-dimension attribute collections with transactional write logs
//! - Edge, face and cell split, edge collapse (link-condition checked), edge
//!   swap, tetrahedral face swap and attribute-only vertex smoothing, each
//!   all-or-nothing behind caller hooks
//! - A max-priority executor with staleness checks, work renewal and early
//!   stopping, plus a partitioned variant that edits disjoint mesh regions
//!   concurrently on a rayon pool
//! - Reference collapse, split, valence-flip, smoothing and isotropic
//!   remeshing drivers
//!
//! ## Determinism
//!
//! Partition seeds come from configuration, so a partitioned run with a
//! fixed seed always starts from the same partition. The sequential policy
//! is fully deterministic; ties in priority pop in insertion order.
//!
//! ## Usage
//!
//! ```
//! use mesh_edit::prelude::*;
//!
//! let mut mesh = TriMesh::create_mesh(4, &[[0, 1, 2], [0, 2, 3]]).unwrap();
//! let diag = mesh.edge_tuple(0, 2).unwrap();
//! let t = mesh.swap_edge(&diag).unwrap();
//! assert!(mesh.is_valid(&t));
//! assert!(!mesh.is_valid(&diag));
//! assert_eq!(mesh.cell_count(), 2);
//! ```
//!
//! [`Mesh::consolidate`]: topology::Mesh::consolidate

pub mod data;
pub mod debug_invariants;
pub mod mesh_error;
pub mod operations;
pub mod partitioning;
pub mod remesh;
pub mod scheduler;
pub mod topology;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::data::{AttributeCollection, AttributeHandle, AttributeValue};
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::mesh_error::MeshEditError;
    pub use crate::operations::{Applied, EditHooks, NoHooks, OperationKind, RejectClass, Rejection};
    pub use crate::partitioning::{PartitionMap, PartitionerConfig, partition};
    pub use crate::remesh::{
        CollapseConfig, IsotropicConfig, IsotropicRemesh, LaplacianSmooth, LongEdgeSplit, Position,
        ShortestEdgeCollapse, SmoothConfig, SplitConfig, ValenceSwap, register_positions,
    };
    pub use crate::scheduler::{Descriptor, ExecutePass, ExecutionPolicy, ExecutorConfig, PassReport};
    pub use crate::topology::{
        CellShape, Mesh, NonManifoldHandling, PrimitiveType, TetMesh, Tetrahedron, TriMesh, Triangle, Tuple,
    };
}
