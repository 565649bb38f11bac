//! Connectivity validation.
//!
//! Checks the mutual consistency of the cell → vertex and vertex → cell
//! arrays. Facet manifoldness is checked separately and, by default, only
//! logged: meshes with non-manifold facets are valid input, edits around them
//! are simply refused by the link condition and the swap valence checks.

use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::MeshEditError;
use crate::topology::mesh::Mesh;
use crate::topology::simplex::CellShape;

/// Behavior for non-manifold facet detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NonManifoldHandling {
    /// Skip non-manifold detection.
    Ignore,
    /// Log a warning on facets shared by more than two cells.
    #[default]
    Warn,
    /// Return an error on facets shared by more than two cells.
    Error,
}

impl<S: CellShape> Mesh<S> {
    /// Verify vertex ↔ cell adjacency:
    /// - every live cell references distinct, live, in-range vertices, and
    ///   each of them lists the cell;
    /// - every vertex lists only live cells that contain it, sorted and
    ///   without duplicates;
    /// - live vertices have at least one cell, removed vertices none.
    pub fn check_connectivity(&self) -> Result<(), MeshEditError> {
        let conn = &self.conn;
        let nv = conn.vertex_capacity();

        for c in conn.live_cells() {
            let verts = conn.cell_verts(c).unwrap_or(&[]);
            for (i, &v) in verts.iter().enumerate() {
                if v >= nv {
                    return Err(MeshEditError::ConnectivityMismatch(format!(
                        "cell {c} references vertex {v} past capacity {nv}"
                    )));
                }
                if verts[..i].contains(&v) {
                    return Err(MeshEditError::ConnectivityMismatch(format!(
                        "cell {c} repeats vertex {v}"
                    )));
                }
                if !conn.is_vertex_live(v) {
                    return Err(MeshEditError::ConnectivityMismatch(format!(
                        "cell {c} references removed vertex {v}"
                    )));
                }
                if conn.vertex_cells(v).binary_search(&c).is_err() {
                    return Err(MeshEditError::ConnectivityMismatch(format!(
                        "vertex {v} does not list incident cell {c}"
                    )));
                }
            }
        }

        for v in 0..nv {
            let cells = conn.vertex_cells(v);
            if cells.windows(2).any(|w| w[0] >= w[1]) {
                return Err(MeshEditError::ConnectivityMismatch(format!(
                    "cell list of vertex {v} is not strictly ascending"
                )));
            }
            if conn.is_vertex_live(v) == cells.is_empty() {
                return Err(MeshEditError::ConnectivityMismatch(format!(
                    "vertex {v}: removed flag disagrees with its {} incident cells",
                    cells.len()
                )));
            }
            for &c in cells {
                let contains = conn.is_cell_live(c) && conn.cell_verts(c).is_some_and(|cv| cv.contains(&v));
                if !contains {
                    return Err(MeshEditError::ConnectivityMismatch(format!(
                        "vertex {v} lists cell {c}, which is removed or does not contain it"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Count facets shared by more than two cells and handle them per
    /// `handling`. Returns the number found.
    pub fn check_manifold_facets(&self, handling: NonManifoldHandling) -> Result<usize, MeshEditError> {
        if handling == NonManifoldHandling::Ignore {
            return Ok(0);
        }
        let mut found = 0;
        for c in self.conn.live_cells() {
            let Some(verts) = self.conn.cell_verts(c) else {
                continue;
            };
            for skip in 0..S::N_VERTS {
                let facet: Vec<usize> = verts
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != skip)
                    .map(|(_, &v)| v)
                    .collect();
                let sharing = self.conn.cells_containing(&facet);
                // report each facet once, from its lowest cell
                if sharing.len() <= 2 || sharing[0] != c {
                    continue;
                }
                found += 1;
                match handling {
                    NonManifoldHandling::Warn => {
                        log::warn!("Non-manifold facet {facet:?} shared by {} cells", sharing.len());
                    }
                    NonManifoldHandling::Error => {
                        return Err(MeshEditError::ConnectivityMismatch(format!(
                            "facet {facet:?} is shared by {} cells",
                            sharing.len()
                        )));
                    }
                    NonManifoldHandling::Ignore => {}
                }
            }
        }
        Ok(found)
    }
}

impl<S: CellShape> DebugInvariants for Mesh<S> {
    fn validate_invariants(&self) -> Result<(), MeshEditError> {
        self.check_connectivity()?;
        self.check_manifold_facets(NonManifoldHandling::Warn)?;
        Ok(())
    }
}
