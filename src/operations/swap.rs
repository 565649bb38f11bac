//! Edge and face swaps.
//!
//! The edge swap covers the 2-D flip (two triangles around an edge) and the
//! 3-D 3-2 swap (three tetrahedra around an edge); both replace the cells
//! around the edge by cells around the "ring" of opposite vertices. The face
//! swap is the 2-3 swap, the inverse of the 3-2 swap.

use crate::operations::{Anchor, EditHooks, EditPlan, NoHooks, OperationKind, Rejection, substituted};
use crate::topology::mesh::Mesh;
use crate::topology::simplex::CellShape;
use crate::topology::tuple::Tuple;
use itertools::Itertools;

impl<S: CellShape> Mesh<S> {
    pub(crate) fn plan_edge_swap(&self, t: &Tuple) -> Result<EditPlan<S::Verts>, Rejection> {
        let (a, b) = self
            .edge_vertices(t)
            .ok_or(Rejection::Inapplicable("tuple has no edge"))?;
        let cells = self.conn.cells_containing(&[a, b]);
        if cells.len() != S::EDGE_SWAP_VALENCE {
            return Err(Rejection::Inapplicable("edge valence does not admit a swap"));
        }
        let ring: Vec<usize> = cells
            .iter()
            .filter_map(|&c| self.conn.cell_verts(c))
            .flatten()
            .copied()
            .filter(|&v| v != a && v != b)
            .sorted_unstable()
            .dedup()
            .collect();
        if ring.len() != S::DIM {
            return Err(Rejection::Inapplicable("edge ring is not closed"));
        }
        if !self.conn.cells_containing(&ring).is_empty() {
            return Err(Rejection::Inapplicable("swapped simplex already exists"));
        }

        let first = cells[0];
        let first_verts = self
            .conn
            .cell_verts(first)
            .ok_or(Rejection::Inapplicable("cell vanished"))?;
        let e = *ring
            .iter()
            .find(|v| !first_verts.contains(v))
            .ok_or(Rejection::Inapplicable("edge ring is not closed"))?;
        let add = [b, a]
            .iter()
            .map(|&from| substituted(&self.conn, first, from, e))
            .collect::<Option<Vec<_>>>()
            .ok_or(Rejection::Inapplicable("cell vanished"))?;

        let other = *ring
            .iter()
            .find(|&&v| v != e)
            .ok_or(Rejection::Inapplicable("edge ring is not closed"))?;
        let anchor = match ring.as_slice() {
            &[r0, r1, r2] => Anchor::Face {
                at: e,
                toward: other,
                verts: [r0, r1, r2],
            },
            _ => Anchor::Edge(e, other),
        };
        Ok(EditPlan {
            remove: cells,
            add,
            new_vertex: false,
            bump_around: None,
            touch_around: None,
            anchor,
        })
    }

    pub(crate) fn plan_face_swap(&self, t: &Tuple) -> Result<EditPlan<S::Verts>, Rejection> {
        if S::DIM != 3 {
            return Err(Rejection::Inapplicable("face swap needs tetrahedra"));
        }
        let face = self
            .face_vertices(t)
            .ok_or(Rejection::Inapplicable("tuple has no face"))?;
        let cells = self.conn.cells_containing(&face);
        let &[c0, c1] = cells.as_slice() else {
            return Err(Rejection::Inapplicable("face is not shared by two cells"));
        };
        let apex = |c: usize| {
            self.conn
                .cell_verts(c)
                .and_then(|vs| vs.iter().copied().find(|v| !face.contains(v)))
        };
        let (Some(d), Some(e)) = (apex(c0), apex(c1)) else {
            return Err(Rejection::Inapplicable("cell vanished"));
        };
        if d == e || !self.conn.cells_containing(&[d, e]).is_empty() {
            return Err(Rejection::Inapplicable("apexes are already joined"));
        }
        let add = face
            .iter()
            .map(|&from| substituted(&self.conn, c0, from, e))
            .collect::<Option<Vec<_>>>()
            .ok_or(Rejection::Inapplicable("cell vanished"))?;
        Ok(EditPlan {
            remove: vec![c0, c1],
            add,
            new_vertex: false,
            bump_around: None,
            touch_around: None,
            anchor: Anchor::Edge(e, d),
        })
    }

    /// Swap the tuple's edge.
    ///
    /// On triangle meshes this flips the diagonal of the two triangles
    /// sharing the edge and returns a tuple on the new diagonal. On
    /// tetrahedral meshes it is the 3-2 swap: exactly three tetrahedra around
    /// the edge become two sharing the triangle of the ring vertices, and the
    /// result lies on that triangle.
    pub fn swap_edge(&mut self, t: &Tuple) -> Result<Tuple, Rejection> {
        self.swap_edge_with(t, &NoHooks)
    }

    pub fn swap_edge_with<H: EditHooks<S>>(&mut self, t: &Tuple, hooks: &H) -> Result<Tuple, Rejection> {
        self.execute(OperationKind::EdgeSwap, t, hooks).map(|a| a.tuple)
    }

    /// 2-3 swap of the tuple's face: the two tetrahedra sharing it become
    /// three around the edge joining their apexes. Returns a tuple on that
    /// edge.
    pub fn swap_face(&mut self, t: &Tuple) -> Result<Tuple, Rejection> {
        self.swap_face_with(t, &NoHooks)
    }

    pub fn swap_face_with<H: EditHooks<S>>(&mut self, t: &Tuple, hooks: &H) -> Result<Tuple, Rejection> {
        self.execute(OperationKind::FaceSwap, t, hooks).map(|a| a.tuple)
    }
}
