//! Atomic topological edits.
//!
//! Every edit runs the same three-phase protocol:
//!
//! 1. **plan + before**: the structural preconditions are checked (tuple
//!    validity, valence, link condition) and the caller's
//!    [`EditHooks::before`] may veto the edit or fill its cache. Nothing has
//!    been written yet.
//! 2. **apply**: connectivity and every attribute collection start
//!    recording, the planned cells are replaced and attribute collections are
//!    resized to the new capacity.
//! 3. **after + invariants**: the caller recomputes attributes in
//!    [`EditHooks::after`] and checks [`EditHooks::invariants`]. A refusal in
//!    either rolls the mesh back to its exact prior state.
//!
//! Every topological edit is expressed as removing a set of cells and
//! adding a set of cells, each new cell being an old cell with one vertex
//! substituted, so orientation carries over. Vertex smoothing changes no
//! cell and only gives the hooks a protected window over attributes.

pub mod collapse;
pub mod smooth;
pub mod split;
pub mod swap;

use crate::topology::connectivity::Connectivity;
use crate::topology::mesh::Mesh;
use crate::topology::simplex::{CellShape, PrimitiveType, local_face_index, local_position};
use crate::topology::tuple::Tuple;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The edit kinds the kernel implements.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    EdgeSplit,
    EdgeCollapse,
    EdgeSwap,
    /// 2-3 swap; tetrahedral meshes only.
    FaceSwap,
    /// Insert a vertex inside the tuple's face (1-3 on triangles, 2-6 on an
    /// interior tet face).
    FaceSplit,
    /// Insert a vertex inside the tuple's cell.
    CellSplit,
    /// Attribute-only edit at the tuple's vertex.
    VertexSmooth,
}

impl OperationKind {
    /// The simplex the operating tuple designates.
    #[inline]
    pub fn primitive<S: CellShape>(self) -> PrimitiveType {
        match self {
            OperationKind::FaceSwap | OperationKind::FaceSplit => PrimitiveType::Face,
            OperationKind::CellSplit => S::cell_primitive(),
            OperationKind::VertexSmooth => PrimitiveType::Vertex,
            _ => PrimitiveType::Edge,
        }
    }

    /// Whether the edit changes connectivity.
    #[inline]
    pub const fn is_topological(self) -> bool {
        !matches!(self, OperationKind::VertexSmooth)
    }
}

/// Why an edit was refused. Refusals are recoverable outcomes, never faults.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The tuple's cell was removed or edited since the tuple was taken.
    #[error("tuple no longer refers to a live cell version")]
    StaleTuple,
    /// The local configuration does not admit this edit.
    #[error("operation not applicable: {0}")]
    Inapplicable(&'static str),
    /// Collapsing would break manifoldness.
    #[error("link condition violated")]
    LinkCondition,
    #[error("refused by before hook")]
    BeforeHook,
    #[error("refused by after hook")]
    AfterHook,
    #[error("invariant check failed")]
    Invariant,
    /// The applied edit left no live cell at its result tuple; rolled back.
    #[error("edit left no cell at the result")]
    ResultLost,
    /// The vertex lock set could not be acquired.
    #[error("vertex locks held by another partition")]
    LockUnavailable,
}

/// Coarse grouping of [`Rejection`]s.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectClass {
    /// Refused before anything was written.
    Structural,
    /// Refused after apply; the mesh was rolled back.
    Predicate,
    /// Refused for lack of locks; may succeed in a later pass.
    Concurrency,
}

impl Rejection {
    pub const fn class(self) -> RejectClass {
        match self {
            Rejection::StaleTuple
            | Rejection::Inapplicable(_)
            | Rejection::LinkCondition
            | Rejection::BeforeHook => RejectClass::Structural,
            Rejection::AfterHook | Rejection::Invariant | Rejection::ResultLost => RejectClass::Predicate,
            Rejection::LockUnavailable => RejectClass::Concurrency,
        }
    }
}

/// Caller-supplied behaviour around each edit.
///
/// `Cache` carries state from [`before`](Self::before) to
/// [`after`](Self::after), e.g. the positions of the edge endpoints that are
/// about to be merged. A fresh cache is created for every edit.
pub trait EditHooks<S: CellShape> {
    type Cache: Default + Send;

    /// Inspect the mesh before the edit; return `false` to refuse.
    fn before(&self, _mesh: &Mesh<S>, _kind: OperationKind, _t: &Tuple, _cache: &mut Self::Cache) -> bool {
        true
    }

    /// Update attributes on the edited mesh; `t` is the edit's result tuple.
    /// Return `false` to roll the edit back.
    fn after(&self, _mesh: &mut Mesh<S>, _kind: OperationKind, _t: &Tuple, _cache: &Self::Cache) -> bool {
        true
    }

    /// Acceptance predicate over the cells created or touched by the edit.
    fn invariants(&self, _mesh: &Mesh<S>, _kind: OperationKind, _affected: &[Tuple]) -> bool {
        true
    }
}

/// Hooks that accept every edit.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoHooks;

impl<S: CellShape> EditHooks<S> for NoHooks {
    type Cache = ();
}

/// Outcome of a committed edit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Applied {
    /// Result tuple; its meaning depends on the edit kind.
    pub tuple: Tuple,
    /// One tuple per live cell created or version-bumped by the edit.
    pub affected: Vec<Tuple>,
}

// -------------------------------------------------------------------------
// Plans
// -------------------------------------------------------------------------

/// Where the result tuple of an edit sits.
#[derive(Copy, Clone, Debug)]
pub(crate) enum Anchor {
    Vertex(usize),
    /// At the first vertex, along the edge to the second.
    Edge(usize, usize),
    /// At `at`, on the face `verts` of the first created cell.
    Face { at: usize, toward: usize, verts: [usize; 3] },
}

/// A fully checked edit, ready to apply.
#[derive(Clone, Debug)]
pub(crate) struct EditPlan<V> {
    pub(crate) remove: Vec<usize>,
    pub(crate) add: Vec<V>,
    /// Append one vertex before replacing cells.
    pub(crate) new_vertex: bool,
    /// Bump the version of every remaining cell of this vertex.
    pub(crate) bump_around: Option<usize>,
    /// Report every cell of this vertex as affected, versions untouched.
    pub(crate) touch_around: Option<usize>,
    pub(crate) anchor: Anchor,
}

/// Vertex list of cell `c` with `from` replaced by `to`.
pub(crate) fn substituted<S: CellShape>(
    conn: &Connectivity<S>,
    c: usize,
    from: usize,
    to: usize,
) -> Option<S::Verts> {
    let mut verts = conn.cell(c)?.verts;
    let slot = verts.as_mut().iter_mut().find(|v| **v == from)?;
    *slot = to;
    Some(verts)
}

// -------------------------------------------------------------------------
// Runner
// -------------------------------------------------------------------------

impl<S: CellShape> Mesh<S> {
    fn plan(&self, kind: OperationKind, t: &Tuple) -> Result<EditPlan<S::Verts>, Rejection> {
        match kind {
            OperationKind::EdgeSplit => self.plan_split(t),
            OperationKind::EdgeCollapse => self.plan_collapse(t),
            OperationKind::EdgeSwap => self.plan_edge_swap(t),
            OperationKind::FaceSwap => self.plan_face_swap(t),
            OperationKind::FaceSplit => self.plan_face_split(t),
            OperationKind::CellSplit => self.plan_cell_split(t),
            OperationKind::VertexSmooth => self.plan_smooth(t),
        }
    }

    /// Whether `kind` could be applied at `t` right now, ignoring hooks.
    pub fn can_apply(&self, kind: OperationKind, t: &Tuple) -> Result<(), Rejection> {
        if !self.is_valid(t) {
            return Err(Rejection::StaleTuple);
        }
        self.plan(kind, t).map(|_| ())
    }

    /// Run one edit through the full protocol.
    ///
    /// On `Err` the mesh, connectivity and every attribute value alike, is
    /// exactly as it was before the call.
    pub fn execute<H: EditHooks<S>>(
        &mut self,
        kind: OperationKind,
        t: &Tuple,
        hooks: &H,
    ) -> Result<Applied, Rejection> {
        if !self.is_valid(t) {
            return Err(Rejection::StaleTuple);
        }
        let plan = self.plan(kind, t)?;
        let mut cache = H::Cache::default();
        if !hooks.before(self, kind, t, &mut cache) {
            return Err(Rejection::BeforeHook);
        }

        self.conn.begin();
        self.attrs.begin_protect();
        let outcome = match self.apply_plan(&plan) {
            None => Err(Rejection::ResultLost),
            Some(applied) => {
                self.resize_attributes();
                if !hooks.after(self, kind, &applied.tuple, &cache) {
                    Err(Rejection::AfterHook)
                } else if !hooks.invariants(self, kind, &applied.affected) {
                    Err(Rejection::Invariant)
                } else {
                    Ok(applied)
                }
            }
        };

        match outcome {
            Ok(applied) => {
                self.conn.commit();
                self.attrs.end_protect();
                crate::debug_invariants!(
                    crate::debug_invariants::DebugInvariants::validate_invariants(self),
                    "execute"
                );
                Ok(applied)
            }
            Err(r) => {
                self.conn.rollback();
                self.attrs.rollback();
                log::trace!("{kind:?} at {t:?} rolled back: {r}");
                Err(r)
            }
        }
    }

    fn apply_plan(&mut self, plan: &EditPlan<S::Verts>) -> Option<Applied> {
        if plan.new_vertex {
            self.conn.add_vertex();
        }
        let touched: Vec<usize> = plan
            .remove
            .iter()
            .filter_map(|&c| self.conn.cell_verts(c))
            .flatten()
            .copied()
            .sorted_unstable()
            .dedup()
            .collect();

        let mut affected = self.conn.replace_cells(&plan.remove, &plan.add);
        if let Some(v) = plan.bump_around {
            let around: Vec<usize> = self.conn.vertex_cells(v).to_vec();
            for c in around {
                if !affected.contains(&c) {
                    self.conn.bump_version(c);
                    affected.push(c);
                }
            }
        }
        if let Some(v) = plan.touch_around {
            affected.extend_from_slice(self.conn.vertex_cells(v));
        }
        for v in touched {
            if self.conn.is_vertex_live(v) && self.conn.vertex_cells(v).is_empty() {
                self.conn.remove_vertex(v);
            }
        }

        let tuple = match plan.anchor {
            Anchor::Vertex(v) => self.tuple_from_vertex(v),
            Anchor::Edge(a, b) => self.edge_tuple(a, b),
            Anchor::Face { at, toward, verts } => {
                let cid = *affected.first()?;
                let cv = self.conn.cell_verts(cid)?;
                let lf: Vec<usize> = verts
                    .iter()
                    .map(|&g| local_position(cv, g))
                    .collect::<Option<_>>()?;
                let fid = local_face_index::<S>(lf[0], lf[1], lf[2])?;
                self.face_tuple_toward(cid, fid, at, toward)
            }
        }?;
        let affected = affected
            .into_iter()
            .filter_map(|c| self.tuple_from_cell(c))
            .collect();
        Some(Applied { tuple, affected })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::mesh::TriMesh;
    use crate::topology::simplex::{Tetrahedron, Triangle};

    struct Refuse {
        stage: u8,
    }

    impl EditHooks<Triangle> for Refuse {
        type Cache = usize;

        fn before(&self, m: &TriMesh, _: OperationKind, _: &Tuple, cache: &mut usize) -> bool {
            *cache = m.vertex_count();
            self.stage != 0
        }

        fn after(&self, m: &mut TriMesh, _: OperationKind, _: &Tuple, cache: &usize) -> bool {
            assert_ne!(m.vertex_count(), *cache);
            self.stage != 1
        }

        fn invariants(&self, _: &TriMesh, _: OperationKind, affected: &[Tuple]) -> bool {
            assert!(!affected.is_empty());
            self.stage != 2
        }
    }

    #[test]
    fn rejection_classes() {
        assert_eq!(Rejection::LinkCondition.class(), RejectClass::Structural);
        assert_eq!(Rejection::Invariant.class(), RejectClass::Predicate);
        assert_eq!(Rejection::ResultLost.class(), RejectClass::Predicate);
        assert_eq!(Rejection::Inapplicable("valence").class(), RejectClass::Structural);
        assert_eq!(Rejection::LockUnavailable.class(), RejectClass::Concurrency);
        assert_eq!(OperationKind::FaceSwap.primitive::<Triangle>(), PrimitiveType::Face);
        assert_eq!(OperationKind::CellSplit.primitive::<Triangle>(), PrimitiveType::Face);
        assert_eq!(OperationKind::CellSplit.primitive::<Tetrahedron>(), PrimitiveType::Tetrahedron);
        assert_eq!(OperationKind::VertexSmooth.primitive::<Tetrahedron>(), PrimitiveType::Vertex);
        assert!(!OperationKind::VertexSmooth.is_topological());
    }

    #[test]
    fn each_refusal_stage_leaves_mesh_untouched() {
        let mut m = TriMesh::create_mesh(4, &[[0, 1, 2], [0, 2, 3]]).unwrap();
        let h = m.register_attribute("w", PrimitiveType::Vertex, 1.5f64).unwrap();
        let before = m.clone();
        let t = m.edge_tuple(0, 2).unwrap();
        let expected = [Rejection::BeforeHook, Rejection::AfterHook, Rejection::Invariant];
        for (stage, want) in expected.into_iter().enumerate() {
            let r = m.execute(OperationKind::EdgeSplit, &t, &Refuse { stage: stage as u8 });
            assert_eq!(r, Err(want));
            assert_eq!(m, before);
        }
        assert_eq!(m.attribute(&h).unwrap().len(), 4);
        assert!(!m.connectivity().in_transaction());

        let ok = m.execute(OperationKind::EdgeSplit, &t, &Refuse { stage: 3 }).unwrap();
        assert_eq!(m.vertex_count(), 5);
        assert!(m.is_valid(&ok.tuple));
        assert!(!m.is_valid(&t));
    }

    #[test]
    fn stale_tuple_is_refused() {
        let mut m = TriMesh::create_mesh(4, &[[0, 1, 2], [0, 2, 3]]).unwrap();
        let t = m.edge_tuple(0, 1).unwrap();
        m.split_edge(&m.edge_tuple(0, 2).unwrap()).unwrap();
        assert_eq!(m.can_apply(OperationKind::EdgeSplit, &t), Err(Rejection::StaleTuple));
        assert_eq!(m.split_edge(&t), Err(Rejection::StaleTuple));
    }
}
