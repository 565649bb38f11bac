//! Vertex smoothing: an edit with no topological change.

use crate::operations::{Anchor, EditHooks, EditPlan, NoHooks, OperationKind, Rejection};
use crate::topology::mesh::Mesh;
use crate::topology::simplex::CellShape;
use crate::topology::tuple::Tuple;

impl<S: CellShape> Mesh<S> {
    /// Leave every cell in place and report the vertex star as affected.
    pub(crate) fn plan_smooth(&self, t: &Tuple) -> Result<EditPlan<S::Verts>, Rejection> {
        let v = t.vid();
        if self.conn.vertex_cells(v).is_empty() {
            return Err(Rejection::Inapplicable("vertex has no incident cell"));
        }
        Ok(EditPlan {
            remove: Vec::new(),
            add: Vec::new(),
            new_vertex: false,
            bump_around: None,
            touch_around: Some(v),
            anchor: Anchor::Vertex(v),
        })
    }

    /// Run the hooks' attribute update at the tuple's vertex under the edit
    /// protocol. Connectivity and tuple versions are unchanged; a refusal in
    /// `after` or `invariants` restores every attribute value.
    pub fn smooth_vertex<H: EditHooks<S>>(&mut self, t: &Tuple, hooks: &H) -> Result<Tuple, Rejection> {
        self.execute(OperationKind::VertexSmooth, t, hooks).map(|a| a.tuple)
    }

    /// [`smooth_vertex`](Self::smooth_vertex) without hooks: only checks that
    /// the tuple is live.
    pub fn touch_vertex(&mut self, t: &Tuple) -> Result<Tuple, Rejection> {
        self.smooth_vertex(t, &NoHooks)
    }
}
