//! Edge collapse.

use crate::operations::{Anchor, EditHooks, EditPlan, NoHooks, OperationKind, Rejection, substituted};
use crate::topology::mesh::Mesh;
use crate::topology::simplex::CellShape;
use crate::topology::tuple::Tuple;

impl<S: CellShape> Mesh<S> {
    /// Collapse `(v0, v1)` onto `v1`: cells on the edge disappear, the other
    /// cells of `v0` take `v1` in its place.
    pub(crate) fn plan_collapse(&self, t: &Tuple) -> Result<EditPlan<S::Verts>, Rejection> {
        let (v0, v1) = self
            .edge_vertices(t)
            .ok_or(Rejection::Inapplicable("tuple has no edge"))?;
        let on_edge = self.conn.cells_containing(&[v0, v1]);
        let moved: Vec<usize> = self
            .conn
            .vertex_cells(v0)
            .iter()
            .copied()
            .filter(|c| !on_edge.contains(c))
            .collect();
        let kept_by_v1 = self.conn.vertex_cells(v1).len() - on_edge.len();
        if moved.is_empty() && kept_by_v1 == 0 {
            return Err(Rejection::Inapplicable("collapse would leave no cell"));
        }
        if !self.link_condition(t) {
            return Err(Rejection::LinkCondition);
        }

        let add = moved
            .iter()
            .map(|&c| substituted(&self.conn, c, v0, v1))
            .collect::<Option<Vec<_>>>()
            .ok_or(Rejection::Inapplicable("cell vanished"))?;
        let mut remove = moved;
        remove.extend(on_edge);
        Ok(EditPlan {
            remove,
            add,
            new_vertex: false,
            bump_around: Some(v1),
            touch_around: None,
            anchor: Anchor::Vertex(v1),
        })
    }

    /// Collapse the tuple's edge onto its far endpoint.
    ///
    /// The tuple's vertex is removed. Refused with
    /// [`Rejection::LinkCondition`] when the result would not be a manifold.
    /// Returns a tuple at the surviving vertex.
    pub fn collapse_edge(&mut self, t: &Tuple) -> Result<Tuple, Rejection> {
        self.collapse_edge_with(t, &NoHooks)
    }

    pub fn collapse_edge_with<H: EditHooks<S>>(&mut self, t: &Tuple, hooks: &H) -> Result<Tuple, Rejection> {
        self.execute(OperationKind::EdgeCollapse, t, hooks).map(|a| a.tuple)
    }
}
