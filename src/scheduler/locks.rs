//! Per-vertex lock sets for partitioned execution.
//!
//! Each worker edits its own copy of a mesh region and may only lock the
//! vertices its partition owns. Partitions own disjoint vertex sets, so two
//! edits whose lock sets were both granted never touch the same vertex,
//! cell or attribute slot. Acquisition never waits: a worker that cannot
//! take its whole lock set defers the operation to a later pass.

use crate::topology::mesh::Mesh;
use crate::topology::simplex::CellShape;
use crate::topology::tuple::Tuple;

/// Which vertex slots a worker may lock.
#[derive(Clone, Debug, Default)]
pub struct VertexLocks {
    lockable: Vec<bool>,
}

impl VertexLocks {
    pub fn new(lockable: Vec<bool>) -> Self {
        Self { lockable }
    }

    /// Every one of the first `n` slots is lockable.
    pub fn all(n: usize) -> Self {
        Self::new(vec![true; n])
    }

    #[inline]
    pub fn is_lockable(&self, v: usize) -> bool {
        self.lockable.get(v).copied().unwrap_or(false)
    }

    /// Make vertices below `n` that lie past the table lockable; they were
    /// created by the worker holding this table.
    pub fn ensure(&mut self, n: usize) {
        if self.lockable.len() < n {
            self.lockable.resize(n, true);
        }
    }

    /// Start an empty lock set.
    pub fn guard(&self) -> LockGuard<'_> {
        LockGuard {
            locks: self,
            held: Vec::new(),
        }
    }
}

/// The vertices requested for one edit.
#[derive(Debug)]
pub struct LockGuard<'a> {
    locks: &'a VertexLocks,
    held: Vec<usize>,
}

impl LockGuard<'_> {
    /// Take `v` unless another partition owns it. Taking a vertex already in
    /// this set succeeds.
    pub fn try_lock(&mut self, v: usize) -> bool {
        if self.held.contains(&v) {
            return true;
        }
        if self.locks.is_lockable(v) {
            self.held.push(v);
            true
        } else {
            false
        }
    }

    /// Take every vertex of `vs`, stopping at the first failure.
    pub fn try_lock_all(&mut self, vs: impl IntoIterator<Item = usize>) -> bool {
        vs.into_iter().all(|v| self.try_lock(v))
    }

    #[inline]
    pub fn held(&self) -> &[usize] {
        &self.held
    }
}

/// Closed one-rings of both endpoints of the tuple's edge: every vertex of
/// every cell an edit at `t` can replace.
pub(crate) fn edit_footprint<S: CellShape>(mesh: &Mesh<S>, t: &Tuple) -> Option<Vec<usize>> {
    let (a, b) = mesh.edge_vertices(t)?;
    let mut ring = vec![a, b];
    for v in [a, b] {
        ring.extend(mesh.one_ring_vids(v));
    }
    ring.sort_unstable();
    ring.dedup();
    Some(ring)
}

/// Default lock set: every vertex within two hops of the tuple's edge.
///
/// Two operations whose lock sets are disjoint touch disjoint cells, and
/// neither reads attributes the other writes.
pub fn lock_two_ring<S: CellShape>(mesh: &Mesh<S>, t: &Tuple, guard: &mut LockGuard<'_>) -> bool {
    let Some(ring) = edit_footprint(mesh, t) else {
        return false;
    };
    let mut two_ring = ring.clone();
    for &v in &ring {
        two_ring.extend(mesh.one_ring_vids(v));
    }
    two_ring.sort_unstable();
    two_ring.dedup();
    guard.try_lock_all(two_ring)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::mesh::TriMesh;

    #[test]
    fn only_owned_vertices_lock() {
        let locks = VertexLocks::new(vec![true, true, false, true]);
        let mut g = locks.guard();
        assert!(g.try_lock(1));
        assert!(g.try_lock(1));
        assert_eq!(g.held(), &[1]);
        assert!(!g.try_lock(2));
        assert!(!g.try_lock(10));
        assert!(!g.try_lock_all([0, 2, 3]));
        assert_eq!(g.held(), &[1, 0]);
    }

    #[test]
    fn vertices_created_later_are_lockable() {
        let mut locks = VertexLocks::new(vec![false; 2]);
        locks.ensure(4);
        assert!(!locks.is_lockable(1));
        assert!(locks.is_lockable(3));
        assert!(!locks.is_lockable(4));
        assert!(VertexLocks::all(3).is_lockable(2));
    }

    #[test]
    fn two_ring_of_a_strip_edge() {
        // strip of 4 quads along x: vertices 0..5 bottom, 5..10 top
        let mut cells = Vec::new();
        for i in 0..4 {
            cells.push([i, i + 1, i + 6]);
            cells.push([i, i + 6, i + 5]);
        }
        let m = TriMesh::create_mesh(10, &cells).unwrap();
        let locks = VertexLocks::all(10);
        let mut g = locks.guard();
        assert!(lock_two_ring(&m, &m.edge_tuple(0, 6).unwrap(), &mut g));
        let mut held = g.held().to_vec();
        held.sort();
        assert_eq!(held, vec![0, 1, 2, 3, 5, 6, 7, 8]);
        assert_eq!(edit_footprint(&m, &m.edge_tuple(0, 6).unwrap()), Some(vec![0, 1, 2, 5, 6, 7]));

        // the far end is owned elsewhere
        let mut owned = vec![true; 10];
        owned[3] = false;
        let partial = VertexLocks::new(owned);
        assert!(!lock_two_ring(&m, &m.edge_tuple(0, 6).unwrap(), &mut partial.guard()));
        assert!(lock_two_ring(&m, &m.edge_tuple(0, 5).unwrap(), &mut partial.guard()));
    }
}
