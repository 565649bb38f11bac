//! `Mesh<S>`: connectivity, navigation and attributes of one simplicial mesh.
//!
//! The mesh exclusively owns every array. Callers hold [`Tuple`]s, which are
//! plain ids plus a cached cell version, and must check
//! [`is_valid`](Mesh::is_valid) before trusting a tuple obtained before the
//! last edit.

use crate::data::attribute::{AttributeCollection, AttributeValue};
use crate::data::attribute_manager::{AttributeHandle, AttributeManager};
use crate::mesh_error::MeshEditError;
use crate::topology::connectivity::Connectivity;
use crate::topology::simplex::{
    CellShape, PrimitiveType, Tetrahedron, Triangle, local_edge_index, local_face_index,
    local_face_with_edge, local_position,
};
use crate::topology::tuple::Tuple;

/// A triangle mesh.
pub type TriMesh = Mesh<Triangle>;
/// A tetrahedral mesh.
pub type TetMesh = Mesh<Tetrahedron>;

/// Simplicial mesh with transactional editing support.
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh<S: CellShape> {
    pub(crate) conn: Connectivity<S>,
    pub(crate) attrs: AttributeManager,
}

impl<S: CellShape> Default for Mesh<S> {
    fn default() -> Self {
        Self {
            conn: Connectivity::default(),
            attrs: AttributeManager::default(),
        }
    }
}

impl<S: CellShape> Mesh<S> {
    /// Build a mesh of `vertex_count` vertices from a cell list.
    ///
    /// # Errors
    /// [`MeshEditError::VertexOutOfRange`] when a cell references a vertex
    /// `>= vertex_count`, [`MeshEditError::DegenerateCell`] when a cell
    /// repeats a vertex.
    pub fn create_mesh(vertex_count: usize, cells: &[S::Verts]) -> Result<Self, MeshEditError> {
        let mesh = Self {
            conn: Connectivity::from_cells(vertex_count, cells)?,
            attrs: AttributeManager::default(),
        };
        crate::debug_invariants!(
            crate::debug_invariants::DebugInvariants::validate_invariants(&mesh),
            "create_mesh"
        );
        Ok(mesh)
    }

    // ---------------------------------------------------------------------
    // Sizes
    // ---------------------------------------------------------------------

    /// Live vertices.
    pub fn vertex_count(&self) -> usize {
        self.conn.live_vertices().count()
    }

    /// Live cells.
    pub fn cell_count(&self) -> usize {
        self.conn.live_cells().count()
    }

    /// Vertex slots, tombstones included.
    #[inline]
    pub fn vertex_capacity(&self) -> usize {
        self.conn.vertex_capacity()
    }

    /// Cell slots, tombstones included.
    #[inline]
    pub fn cell_capacity(&self) -> usize {
        self.conn.cell_capacity()
    }

    /// Read-only view of the connectivity arrays.
    #[inline]
    pub fn connectivity(&self) -> &Connectivity<S> {
        &self.conn
    }

    /// Vertex ids of cell `cid`.
    #[inline]
    pub fn cell_vertices(&self, cid: usize) -> Option<&[usize]> {
        self.conn.cell_verts(cid)
    }

    // ---------------------------------------------------------------------
    // Tuple construction
    // ---------------------------------------------------------------------

    fn make_tuple(&self, cid: usize, vid: usize, local_eid: usize, local_fid: usize) -> Tuple {
        let version = self.conn.cell(cid).map_or(0, |r| r.version());
        Tuple::new(vid, local_eid, local_fid, cid, version)
    }

    /// Tuple at local edge `local_eid` of cell `cid`, pointing at the edge's
    /// first local vertex.
    pub fn tuple_from_edge(&self, cid: usize, local_eid: usize) -> Option<Tuple> {
        let verts = self.conn.cell_verts(cid)?;
        let [a, b] = *S::LOCAL_EDGES.get(local_eid)?;
        let fid = local_face_with_edge::<S>(a, b, None)?;
        Some(self.make_tuple(cid, verts[a], local_eid, fid))
    }

    /// Tuple on local face `local_fid` of cell `cid`.
    pub fn tuple_from_face(&self, cid: usize, local_fid: usize) -> Option<Tuple> {
        let verts = self.conn.cell_verts(cid)?;
        let [a, b, _] = *S::LOCAL_FACES.get(local_fid)?;
        let eid = local_edge_index::<S>(a, b)?;
        Some(self.make_tuple(cid, verts[a], eid, local_fid))
    }

    /// Tuple at local vertex 0 of cell `cid`.
    pub fn tuple_from_cell(&self, cid: usize) -> Option<Tuple> {
        let first = *self.conn.cell_verts(cid)?.first()?;
        self.tuple_in_cell(cid, first, None)
    }

    /// Tuple at vertex `vid` in its lowest-numbered incident cell.
    pub fn tuple_from_vertex(&self, vid: usize) -> Option<Tuple> {
        if !self.conn.is_vertex_live(vid) {
            return None;
        }
        let cid = *self.conn.vertex_cells(vid).first()?;
        self.tuple_in_cell(cid, vid, None)
    }

    /// Tuple at `vid` in cell `cid`; along the edge to `toward` if given.
    pub(crate) fn tuple_in_cell(&self, cid: usize, vid: usize, toward: Option<usize>) -> Option<Tuple> {
        let verts = self.conn.cell_verts(cid)?;
        let lv = local_position(verts, vid)?;
        let other = match toward {
            Some(w) => local_position(verts, w)?,
            None => (lv + 1) % S::N_VERTS,
        };
        let eid = local_edge_index::<S>(lv, other)?;
        let fid = local_face_with_edge::<S>(lv, other, None)?;
        Some(self.make_tuple(cid, vid, eid, fid))
    }

    /// Tuple at `v0` on edge `(v0, v1)`, if that edge exists.
    pub fn edge_tuple(&self, v0: usize, v1: usize) -> Option<Tuple> {
        let cid = *self.conn.cells_containing(&[v0, v1]).first()?;
        self.tuple_in_cell(cid, v0, Some(v1))
    }

    // ---------------------------------------------------------------------
    // Navigation
    // ---------------------------------------------------------------------

    /// `true` iff the tuple's cell is live and has not been edited since the
    /// tuple was produced, and its local indices fit the cell.
    #[inline]
    pub fn is_valid(&self, t: &Tuple) -> bool {
        self.conn.cell(t.cid()).is_some_and(|r| {
            !r.is_removed() && r.version() == t.version() && t.is_well_formed::<S>(r.verts())
        })
    }

    /// Other endpoint of the tuple's edge. A stale tuple comes back unchanged.
    pub fn switch_vertex(&self, t: &Tuple) -> Option<Tuple> {
        let verts = self.conn.cell_verts(t.cid())?;
        Some(t.switch_vertex_in::<S>(verts).unwrap_or(*t))
    }

    /// Other edge of the tuple's face through its vertex.
    pub fn switch_edge(&self, t: &Tuple) -> Option<Tuple> {
        let verts = self.conn.cell_verts(t.cid())?;
        Some(t.switch_edge_in::<S>(verts).unwrap_or(*t))
    }

    /// Other face of the cell through the tuple's edge (identity on
    /// triangle meshes).
    pub fn switch_face(&self, t: &Tuple) -> Option<Tuple> {
        let verts = self.conn.cell_verts(t.cid())?;
        Some(t.switch_face_in::<S>(verts).unwrap_or(*t))
    }

    /// Neighbouring cell across the tuple's facet, keeping vertex, edge and
    /// face. `None` on the boundary.
    pub fn switch_cell(&self, t: &Tuple) -> Option<Tuple> {
        let verts = self.conn.cell_verts(t.cid())?;
        let facet: Vec<usize> = S::tuple_facet(t.local_eid(), t.local_fid())?
            .iter()
            .map(|&l| verts[l])
            .collect();
        let (a, b) = t.local_edge_ends::<S>(verts)?;
        let (ga, gb) = (verts[a], verts[b]);

        let other = self
            .conn
            .cells_containing(&facet)
            .into_iter()
            .find(|&c| c != t.cid())?;
        let nverts = self.conn.cell_verts(other)?;
        let (la, lb) = (local_position(nverts, ga)?, local_position(nverts, gb)?);
        let eid = local_edge_index::<S>(la, lb)?;
        let fid = if S::DIM == 2 {
            0
        } else {
            let lf: Vec<usize> = facet
                .iter()
                .map(|&g| local_position(nverts, g))
                .collect::<Option<_>>()?;
            local_face_index::<S>(lf[0], lf[1], lf[2])?
        };
        Some(self.make_tuple(other, t.vid(), eid, fid))
    }

    // ---------------------------------------------------------------------
    // Canonical ids
    // ---------------------------------------------------------------------

    /// Global vertex id.
    #[inline]
    pub fn vid(&self, t: &Tuple) -> usize {
        t.vid()
    }

    /// Global cell id.
    #[inline]
    pub fn cid(&self, t: &Tuple) -> usize {
        t.cid()
    }

    /// Global id of the tuple's edge: `cell * n_local_edges + local` in the
    /// lowest-numbered cell containing it.
    pub fn eid(&self, t: &Tuple) -> Option<usize> {
        let (a, b) = self.edge_vertices(t)?;
        self.slot_of(&[a, b])
    }

    /// Global id of the tuple's face. Equals the cell id on triangle meshes;
    /// `cell * 4 + local` in the lowest-numbered owner on tet meshes.
    pub fn fid(&self, t: &Tuple) -> Option<usize> {
        if S::DIM == 2 {
            return Some(t.cid());
        }
        self.slot_of(&self.face_vertices(t)?)
    }

    /// Canonical id of the simplex spanned by `verts`, as used to index
    /// attributes: the vertex itself, or a local slot of the lowest-numbered
    /// cell containing every vertex.
    pub(crate) fn slot_of(&self, verts: &[usize]) -> Option<usize> {
        if let [v] = verts {
            return Some(*v);
        }
        let owner = *self.conn.cells_containing(verts).first()?;
        let ov = self.conn.cell_verts(owner)?;
        let local: Vec<usize> = verts
            .iter()
            .map(|&g| local_position(ov, g))
            .collect::<Option<_>>()?;
        match *local.as_slice() {
            [a, b] => Some(owner * S::LOCAL_EDGES.len() + local_edge_index::<S>(a, b)?),
            [a, b, c] if S::DIM == 3 => Some(owner * S::LOCAL_FACES.len() + local_face_index::<S>(a, b, c)?),
            _ if local.len() == S::N_VERTS => Some(owner),
            _ => None,
        }
    }

    /// Global id of the `dim`-simplex at `t`.
    pub fn id(&self, t: &Tuple, dim: PrimitiveType) -> Option<usize> {
        match dim {
            PrimitiveType::Vertex => Some(t.vid()),
            PrimitiveType::Edge => self.eid(t),
            PrimitiveType::Face => self.fid(t),
            PrimitiveType::Tetrahedron if S::DIM == 3 => Some(t.cid()),
            PrimitiveType::Tetrahedron => None,
        }
    }

    /// Global vertex ids of the tuple's edge, tuple vertex first.
    pub fn edge_vertices(&self, t: &Tuple) -> Option<(usize, usize)> {
        let verts = self.conn.cell_verts(t.cid())?;
        let (a, b) = t.local_edge_ends::<S>(verts)?;
        Some((verts[a], verts[b]))
    }

    /// Global vertex ids of the tuple's face.
    pub fn face_vertices(&self, t: &Tuple) -> Option<[usize; 3]> {
        let verts = self.conn.cell_verts(t.cid())?;
        let f = S::LOCAL_FACES.get(t.local_fid())?;
        Some([verts[f[0]], verts[f[1]], verts[f[2]]])
    }

    // ---------------------------------------------------------------------
    // Attributes
    // ---------------------------------------------------------------------

    /// Number of addressable slots for `dim`, following the canonical id
    /// scheme.
    pub fn capacity_of(&self, dim: PrimitiveType) -> usize {
        let cells = self.conn.cell_capacity();
        match dim {
            PrimitiveType::Vertex => self.conn.vertex_capacity(),
            PrimitiveType::Edge => cells * S::LOCAL_EDGES.len(),
            PrimitiveType::Face if S::DIM == 2 => cells,
            PrimitiveType::Face => cells * S::LOCAL_FACES.len(),
            PrimitiveType::Tetrahedron if S::DIM == 3 => cells,
            PrimitiveType::Tetrahedron => 0,
        }
    }

    /// Register a new attribute on `dim`, sized to the current capacity.
    pub fn register_attribute<T: AttributeValue>(
        &mut self,
        name: &str,
        dim: PrimitiveType,
        default: T,
    ) -> Result<AttributeHandle<T>, MeshEditError> {
        let len = self.capacity_of(dim);
        self.attrs.register(name, dim, default, len)
    }

    pub fn find_attribute<T: AttributeValue>(&self, name: &str, dim: PrimitiveType) -> Option<AttributeHandle<T>> {
        self.attrs.find(name, dim)
    }

    pub fn attribute<T: AttributeValue>(&self, h: &AttributeHandle<T>) -> Result<&AttributeCollection<T>, MeshEditError> {
        self.attrs.get(h)
    }

    pub fn attribute_mut<T: AttributeValue>(
        &mut self,
        h: &AttributeHandle<T>,
    ) -> Result<&mut AttributeCollection<T>, MeshEditError> {
        self.attrs.get_mut(h)
    }

    /// Bring every attribute collection up to the current capacity.
    pub fn resize_attributes(&mut self) {
        for dim in [
            PrimitiveType::Vertex,
            PrimitiveType::Edge,
            PrimitiveType::Face,
            PrimitiveType::Tetrahedron,
        ] {
            let n = self.capacity_of(dim);
            self.attrs.resize_dim(dim, n);
        }
    }
}
