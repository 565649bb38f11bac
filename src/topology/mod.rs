//! Mesh topology: cell shapes, tuples, the connectivity store and the
//! [`Mesh`] type with its navigation and query surface.
//!
//! Most users will build a [`TriMesh`] or [`TetMesh`] with
//! [`Mesh::create_mesh`] and walk it through [`Tuple`]s.

pub mod connectivity;
pub mod consolidate;
pub mod link;
pub mod mesh;
pub mod queries;
pub mod simplex;
pub mod tuple;
pub mod validation;

pub use connectivity::{CellRecord, Connectivity, Remap, VertexRecord};
pub use mesh::{Mesh, TetMesh, TriMesh};
pub use simplex::{CellShape, PrimitiveType, Tetrahedron, Triangle};
pub use tuple::Tuple;
pub use validation::NonManifoldHandling;
