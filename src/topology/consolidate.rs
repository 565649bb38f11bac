//! Compaction of tombstoned records.

use crate::mesh_error::MeshEditError;
use crate::topology::connectivity::Remap;
use crate::topology::mesh::Mesh;
use crate::topology::simplex::{CellShape, PrimitiveType};

/// Expand a cell remap to per-cell slot blocks of width `k`.
fn expand_remap(cells: &[Option<usize>], k: usize) -> Vec<Option<usize>> {
    cells
        .iter()
        .flat_map(|c| (0..k).map(move |j| c.map(|n| n * k + j)))
        .collect()
}

impl<S: CellShape> Mesh<S> {
    /// Drop every tombstoned vertex and cell, renumber densely and move
    /// attribute values along.
    ///
    /// Every tuple taken before the call is meaningless afterwards, as are
    /// ids stored outside the mesh; the returned [`Remap`] translates them.
    pub fn consolidate(&mut self) -> Result<Remap, MeshEditError> {
        if self.conn.in_transaction() {
            return Err(MeshEditError::ConsolidateDuringEdit);
        }
        let remap = self.conn.compact();
        let n_verts = self.conn.vertex_capacity();
        let n_cells = self.conn.cell_capacity();
        let n_edges = S::LOCAL_EDGES.len();

        self.attrs
            .compact_dim(PrimitiveType::Vertex, &remap.vertices, n_verts);
        self.attrs
            .compact_dim(S::cell_primitive(), &remap.cells, n_cells);
        self.attrs.compact_dim(
            PrimitiveType::Edge,
            &expand_remap(&remap.cells, n_edges),
            n_cells * n_edges,
        );
        if S::DIM == 3 {
            let n_faces = S::LOCAL_FACES.len();
            self.attrs.compact_dim(
                PrimitiveType::Face,
                &expand_remap(&remap.cells, n_faces),
                n_cells * n_faces,
            );
        }

        log::debug!(
            "consolidate: {} -> {} vertices, {} -> {} cells",
            remap.vertices.len(),
            n_verts,
            remap.cells.len(),
            n_cells
        );
        crate::debug_invariants!(
            crate::debug_invariants::DebugInvariants::validate_invariants(self),
            "consolidate"
        );
        Ok(remap)
    }
}
