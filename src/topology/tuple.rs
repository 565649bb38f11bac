//! `Tuple`: a pointer-free navigation handle.
//!
//! A tuple names one oriented local context inside one cell: a vertex, an
//! edge through that vertex, a face through that edge, and the cell itself.
//! It stores the global vertex id, the *local* edge and face indices within
//! the cell, the global cell id and the cell's version at the time the tuple
//! was produced.
//!
//! Tuples never borrow the mesh. An edit that touches a cell bumps its
//! version, so every tuple handed out earlier becomes invalid rather than
//! dangling; see [`Mesh::is_valid`](crate::topology::Mesh::is_valid).
//!
//! The switches that stay inside one cell are pure functions of the tuple and
//! the cell's vertex list and are implemented here. `switch_cell` needs the
//! reverse adjacency and lives on the mesh.

use crate::topology::simplex::{CellShape, local_edge_index, local_face_with_edge, local_position};
use serde::{Deserialize, Serialize};

/// Oriented (vertex, edge, face, cell) context with a cached cell version.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tuple {
    vid: usize,
    cid: usize,
    version: u64,
    local_eid: u8,
    local_fid: u8,
}

impl Tuple {
    #[inline]
    pub(crate) fn new(vid: usize, local_eid: usize, local_fid: usize, cid: usize, version: u64) -> Self {
        Self {
            vid,
            cid,
            version,
            local_eid: local_eid as u8,
            local_fid: local_fid as u8,
        }
    }

    /// Global vertex id.
    #[inline]
    pub const fn vid(&self) -> usize {
        self.vid
    }

    /// Local edge index inside the cell.
    #[inline]
    pub const fn local_eid(&self) -> usize {
        self.local_eid as usize
    }

    /// Local face index inside the cell (always 0 for triangles).
    #[inline]
    pub const fn local_fid(&self) -> usize {
        self.local_fid as usize
    }

    /// Global cell id.
    #[inline]
    pub const fn cid(&self) -> usize {
        self.cid
    }

    /// Cell version captured when the tuple was produced.
    #[inline]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Local endpoints of the tuple's edge, tuple vertex first.
    pub(crate) fn local_edge_ends<S: CellShape>(&self, verts: &[usize]) -> Option<(usize, usize)> {
        let lv = local_position(verts, self.vid)?;
        let [a, b] = *S::LOCAL_EDGES.get(self.local_eid())?;
        match (a == lv, b == lv) {
            (true, _) => Some((a, b)),
            (_, true) => Some((b, a)),
            _ => None,
        }
    }

    /// Whether the local indices name a vertex on an edge on a face of a cell
    /// with vertex list `verts`. Tuples built by the mesh always are; a
    /// deserialized one need not be.
    pub(crate) fn is_well_formed<S: CellShape>(&self, verts: &[usize]) -> bool {
        let Some((a, b)) = self.local_edge_ends::<S>(verts) else {
            return false;
        };
        S::LOCAL_FACES
            .get(self.local_fid())
            .is_some_and(|f| f.contains(&a) && f.contains(&b))
    }

    /// Other endpoint of the tuple's edge, same edge, face and cell.
    pub(crate) fn switch_vertex_in<S: CellShape>(&self, verts: &[usize]) -> Option<Tuple> {
        let (_, other) = self.local_edge_ends::<S>(verts)?;
        Some(Tuple { vid: verts[other], ..*self })
    }

    /// Other edge of the tuple's face through the tuple's vertex.
    pub(crate) fn switch_edge_in<S: CellShape>(&self, verts: &[usize]) -> Option<Tuple> {
        let (lv, other) = self.local_edge_ends::<S>(verts)?;
        let face = S::LOCAL_FACES.get(self.local_fid())?;
        let third = face.iter().copied().find(|&x| x != lv && x != other)?;
        let eid = local_edge_index::<S>(lv, third)?;
        Some(Tuple { local_eid: eid as u8, ..*self })
    }

    /// Other face of the cell through the tuple's edge. A triangle has one
    /// face, so the tuple comes back unchanged.
    pub(crate) fn switch_face_in<S: CellShape>(&self, verts: &[usize]) -> Option<Tuple> {
        let (a, b) = self.local_edge_ends::<S>(verts)?;
        match local_face_with_edge::<S>(a, b, Some(self.local_fid())) {
            Some(fid) => Some(Tuple { local_fid: fid as u8, ..*self }),
            None => Some(*self),
        }
    }
}
