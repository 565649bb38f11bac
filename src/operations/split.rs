//! Star splits: a new vertex inserted into an edge, a face or a cell.

use crate::operations::{Anchor, EditHooks, EditPlan, NoHooks, OperationKind, Rejection, substituted};
use crate::topology::mesh::Mesh;
use crate::topology::simplex::CellShape;
use crate::topology::tuple::Tuple;

impl<S: CellShape> Mesh<S> {
    /// Insert a new vertex `vn` into the simplex spanned by `subs`: every cell
    /// containing all of `subs` is replaced by one copy per entry of `subs`,
    /// with that entry substituted by `vn`. Copies are grouped by entry, in
    /// the order of `subs`.
    fn plan_star_split(&self, subs: &[usize], toward: usize) -> Result<EditPlan<S::Verts>, Rejection> {
        let cells = self.conn.cells_containing(subs);
        if cells.is_empty() {
            return Err(Rejection::Inapplicable("simplex has no incident cell"));
        }
        // add_vertex appends, so the new id is the current capacity
        let vn = self.conn.vertex_capacity();

        let mut add = Vec::with_capacity(subs.len() * cells.len());
        for (from, &c) in subs.iter().flat_map(|f| cells.iter().map(move |c| (f, c))) {
            add.push(substituted(&self.conn, c, *from, vn).ok_or(Rejection::Inapplicable("cell vanished"))?);
        }
        Ok(EditPlan {
            remove: cells,
            add,
            new_vertex: true,
            bump_around: None,
            touch_around: None,
            anchor: Anchor::Edge(vn, toward),
        })
    }

    /// Split edge `(v0, v1)` at a new vertex `vn`: every cell on the edge is
    /// replaced by its `v1 -> vn` and `v0 -> vn` halves.
    pub(crate) fn plan_split(&self, t: &Tuple) -> Result<EditPlan<S::Verts>, Rejection> {
        let (v0, v1) = self
            .edge_vertices(t)
            .ok_or(Rejection::Inapplicable("tuple has no edge"))?;
        self.plan_star_split(&[v1, v0], v1)
    }

    pub(crate) fn plan_face_split(&self, t: &Tuple) -> Result<EditPlan<S::Verts>, Rejection> {
        let f = self
            .face_vertices(t)
            .ok_or(Rejection::Inapplicable("tuple has no face"))?;
        self.plan_star_split(&f, t.vid())
    }

    pub(crate) fn plan_cell_split(&self, t: &Tuple) -> Result<EditPlan<S::Verts>, Rejection> {
        let verts: Vec<usize> = self
            .cell_vertices(t.cid())
            .ok_or(Rejection::StaleTuple)?
            .to_vec();
        self.plan_star_split(&verts, t.vid())
    }

    /// Split the tuple's edge at a new vertex.
    ///
    /// Returns a tuple at the new vertex on the half-edge toward the
    /// original edge's far endpoint. Boundary edges may be split.
    pub fn split_edge(&mut self, t: &Tuple) -> Result<Tuple, Rejection> {
        self.split_edge_with(t, &NoHooks)
    }

    pub fn split_edge_with<H: EditHooks<S>>(&mut self, t: &Tuple, hooks: &H) -> Result<Tuple, Rejection> {
        self.execute(OperationKind::EdgeSplit, t, hooks).map(|a| a.tuple)
    }

    /// Insert a vertex inside the tuple's face, coning it to the face's
    /// corners. On tetrahedral meshes both tets sharing the face are split.
    ///
    /// Returns a tuple at the new vertex on the edge to the tuple's vertex.
    pub fn split_face(&mut self, t: &Tuple) -> Result<Tuple, Rejection> {
        self.split_face_with(t, &NoHooks)
    }

    pub fn split_face_with<H: EditHooks<S>>(&mut self, t: &Tuple, hooks: &H) -> Result<Tuple, Rejection> {
        self.execute(OperationKind::FaceSplit, t, hooks).map(|a| a.tuple)
    }

    /// Insert a vertex inside the tuple's cell. On triangle meshes this is
    /// [`split_face`](Self::split_face).
    pub fn split_cell(&mut self, t: &Tuple) -> Result<Tuple, Rejection> {
        self.split_cell_with(t, &NoHooks)
    }

    pub fn split_cell_with<H: EditHooks<S>>(&mut self, t: &Tuple, hooks: &H) -> Result<Tuple, Rejection> {
        self.execute(OperationKind::CellSplit, t, hooks).map(|a| a.tuple)
    }
}
