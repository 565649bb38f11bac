//! MeshEditError: unified error type for mesh-edit public APIs
//!
//! Faults that abort a call (malformed construction input, misuse of attribute
//! handles, broken connectivity found by validation) are reported through this
//! type. Edits that are merely *refused* are not errors; they are reported as a
//! [`Rejection`](crate::operations::Rejection).

use crate::topology::simplex::PrimitiveType;
use thiserror::Error;

/// Unified error type for mesh-edit operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MeshEditError {
    /// A cell references a vertex id outside `0..vertex_count`.
    #[error("cell {cell} references vertex {vertex}, but the mesh has {vertex_count} vertices")]
    VertexOutOfRange {
        cell: usize,
        vertex: usize,
        vertex_count: usize,
    },
    /// A cell lists the same vertex twice.
    #[error("cell {cell} is degenerate: vertex {vertex} appears more than once")]
    DegenerateCell { cell: usize, vertex: usize },

    /// An attribute with this name is already registered for the dimension.
    #[error("attribute `{name}` is already registered on {dim:?}")]
    DuplicateAttribute { name: String, dim: PrimitiveType },
    /// The handle's element type does not match the stored collection.
    #[error("attribute `{name}` does not hold values of the requested type")]
    AttributeTypeMismatch { name: String },
    /// The handle does not name a collection of this mesh.
    #[error("no attribute #{index} registered on {dim:?}")]
    UnknownAttribute { dim: PrimitiveType, index: usize },
    /// Index past the end of an attribute collection.
    #[error("attribute index {index} out of range (len = {len})")]
    AttributeIndexOutOfRange { index: usize, len: usize },
    /// `begin_protect` called while a transaction is already recording.
    #[error("attribute transaction already active")]
    TransactionActive,

    /// `consolidate` was requested while an edit transaction is open.
    #[error("cannot consolidate while an edit transaction is open")]
    ConsolidateDuringEdit,
    /// Connectivity validation failed.
    #[error("connectivity invariant violated: {0}")]
    ConnectivityMismatch(String),

    /// A partitioner or executor was asked for zero parts.
    #[error("partition count must be at least 1")]
    ZeroPartitions,
    /// The rayon worker pool could not be built.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
}
