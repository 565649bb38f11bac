//! Arena-backed connectivity store.
//!
//! Cells are stored as fixed-size vertex lists; each vertex keeps a sorted
//! list of the cells incident to it. Deletion only sets a tombstone flag, so
//! ids stay stable until [`Connectivity::compact`] renumbers everything.
//!
//! All mutation goes through a small journaling layer: between
//! [`begin`](Connectivity::begin) and [`commit`](Connectivity::commit) the
//! first write to any pre-existing record saves its old value, and
//! [`rollback`](Connectivity::rollback) restores those records and truncates
//! whatever was appended. A rolled back edit therefore leaves the store equal
//! to its state before `begin`, including versions.

use crate::mesh_error::MeshEditError;
use crate::topology::simplex::CellShape;
use hashbrown::HashMap;

/// Per-vertex record: sorted incident cells and tombstone.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VertexRecord {
    pub(crate) cells: Vec<usize>,
    pub(crate) removed: bool,
}

impl VertexRecord {
    /// Sorted ids of the live cells incident to this vertex.
    #[inline]
    pub fn cells(&self) -> &[usize] {
        &self.cells
    }

    #[inline]
    pub fn is_removed(&self) -> bool {
        self.removed
    }
}

/// Per-cell record: ordered vertex list, tombstone and version counter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellRecord<V> {
    pub(crate) verts: V,
    pub(crate) removed: bool,
    pub(crate) version: u64,
}

impl<V: AsRef<[usize]>> CellRecord<V> {
    #[inline]
    pub fn verts(&self) -> &[usize] {
        self.verts.as_ref()
    }

    #[inline]
    pub fn is_removed(&self) -> bool {
        self.removed
    }

    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }
}

#[derive(Clone, Debug)]
struct Journal<V> {
    vertex_len: usize,
    cell_len: usize,
    vertices: HashMap<usize, VertexRecord>,
    cells: HashMap<usize, CellRecord<V>>,
}

/// Old-to-new id maps produced by [`Connectivity::compact`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Remap {
    pub vertices: Vec<Option<usize>>,
    pub cells: Vec<Option<usize>>,
}

/// Vertex and cell arrays of one mesh.
#[derive(Clone, Debug)]
pub struct Connectivity<S: CellShape> {
    vertices: Vec<VertexRecord>,
    cells: Vec<CellRecord<S::Verts>>,
    journal: Option<Journal<S::Verts>>,
}

impl<S: CellShape> PartialEq for Connectivity<S> {
    fn eq(&self, other: &Self) -> bool {
        self.vertices == other.vertices && self.cells == other.cells
    }
}

impl<S: CellShape> Default for Connectivity<S> {
    fn default() -> Self {
        Self {
            vertices: Vec::new(),
            cells: Vec::new(),
            journal: None,
        }
    }
}

impl<S: CellShape> Connectivity<S> {
    /// Build the store from a cell list. Vertices referenced by no cell are
    /// created as removed.
    pub fn from_cells(vertex_count: usize, cells: &[S::Verts]) -> Result<Self, MeshEditError> {
        let mut vertices = vec![VertexRecord::default(); vertex_count];
        let mut records = Vec::with_capacity(cells.len());
        for (cid, verts) in cells.iter().enumerate() {
            let vs = verts.as_ref();
            for (i, &v) in vs.iter().enumerate() {
                if v >= vertex_count {
                    return Err(MeshEditError::VertexOutOfRange {
                        cell: cid,
                        vertex: v,
                        vertex_count,
                    });
                }
                if vs[..i].contains(&v) {
                    return Err(MeshEditError::DegenerateCell { cell: cid, vertex: v });
                }
                // cids are visited in increasing order, so lists stay sorted
                vertices[v].cells.push(cid);
            }
            records.push(CellRecord {
                verts: *verts,
                removed: false,
                version: 0,
            });
        }
        for v in &mut vertices {
            v.removed = v.cells.is_empty();
        }
        Ok(Self {
            vertices,
            cells: records,
            journal: None,
        })
    }

    // ---------------------------------------------------------------------
    // Read access
    // ---------------------------------------------------------------------

    /// Number of vertex slots, removed ones included.
    #[inline]
    pub fn vertex_capacity(&self) -> usize {
        self.vertices.len()
    }

    /// Number of cell slots, removed ones included.
    #[inline]
    pub fn cell_capacity(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn vertex(&self, v: usize) -> Option<&VertexRecord> {
        self.vertices.get(v)
    }

    #[inline]
    pub fn cell(&self, c: usize) -> Option<&CellRecord<S::Verts>> {
        self.cells.get(c)
    }

    /// Vertex list of cell `c`, live or not.
    #[inline]
    pub fn cell_verts(&self, c: usize) -> Option<&[usize]> {
        self.cells.get(c).map(|r| r.verts.as_ref())
    }

    /// Incident cells of `v`; empty for unknown or removed vertices.
    #[inline]
    pub fn vertex_cells(&self, v: usize) -> &[usize] {
        self.vertices.get(v).map_or(&[], |r| r.cells.as_slice())
    }

    #[inline]
    pub fn is_vertex_live(&self, v: usize) -> bool {
        self.vertices.get(v).is_some_and(|r| !r.removed)
    }

    #[inline]
    pub fn is_cell_live(&self, c: usize) -> bool {
        self.cells.get(c).is_some_and(|r| !r.removed)
    }

    pub fn live_vertices(&self) -> impl Iterator<Item = usize> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.removed)
            .map(|(v, _)| v)
    }

    pub fn live_cells(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.removed)
            .map(|(c, _)| c)
    }

    /// Live cells containing every vertex in `verts`, ascending.
    pub fn cells_containing(&self, verts: &[usize]) -> Vec<usize> {
        let Some(shortest) = verts.iter().map(|&v| self.vertex_cells(v)).min_by_key(|l| l.len()) else {
            return Vec::new();
        };
        shortest
            .iter()
            .copied()
            .filter(|&c| {
                self.cell_verts(c)
                    .is_some_and(|cv| verts.iter().all(|v| cv.contains(v)))
            })
            .collect()
    }

    // ---------------------------------------------------------------------
    // Journal
    // ---------------------------------------------------------------------

    /// Start recording undo information.
    pub fn begin(&mut self) {
        self.journal = Some(Journal {
            vertex_len: self.vertices.len(),
            cell_len: self.cells.len(),
            vertices: HashMap::new(),
            cells: HashMap::new(),
        });
    }

    #[inline]
    pub fn in_transaction(&self) -> bool {
        self.journal.is_some()
    }

    /// Drop the undo information and keep the current state.
    pub fn commit(&mut self) {
        self.journal = None;
    }

    /// Restore the state captured by [`begin`](Self::begin).
    pub fn rollback(&mut self) {
        let Some(journal) = self.journal.take() else {
            return;
        };
        self.vertices.truncate(journal.vertex_len);
        self.cells.truncate(journal.cell_len);
        for (v, rec) in journal.vertices {
            self.vertices[v] = rec;
        }
        for (c, rec) in journal.cells {
            self.cells[c] = rec;
        }
    }

    fn touch_vertex(&mut self, v: usize) {
        if let Some(j) = self.journal.as_mut() {
            if v < j.vertex_len && !j.vertices.contains_key(&v) {
                j.vertices.insert(v, self.vertices[v].clone());
            }
        }
    }

    fn touch_cell(&mut self, c: usize) {
        if let Some(j) = self.journal.as_mut() {
            if c < j.cell_len && !j.cells.contains_key(&c) {
                j.cells.insert(c, self.cells[c].clone());
            }
        }
    }

    // ---------------------------------------------------------------------
    // Mutation
    // ---------------------------------------------------------------------

    /// Append a fresh vertex with no incident cells.
    pub fn add_vertex(&mut self) -> usize {
        self.vertices.push(VertexRecord::default());
        self.vertices.len() - 1
    }

    /// Tombstone vertex `v`. Its incident-cell list must already be empty.
    pub fn remove_vertex(&mut self, v: usize) {
        self.touch_vertex(v);
        let rec = &mut self.vertices[v];
        debug_assert!(rec.cells.is_empty(), "removing vertex {v} with live cells");
        rec.removed = true;
    }

    /// Increment the version of live cell `c` without changing its vertices.
    pub fn bump_version(&mut self, c: usize) {
        self.touch_cell(c);
        self.cells[c].version += 1;
    }

    /// Remove the cells in `remove` and create one cell per entry of `add`.
    ///
    /// New cells take over the removed slots first, in order, with their
    /// version bumped; any further cells are appended. Leftover removed slots
    /// are tombstoned and bumped as well. Returns the ids of the new cells in
    /// the order of `add`.
    pub fn replace_cells(&mut self, remove: &[usize], add: &[S::Verts]) -> Vec<usize> {
        for &c in remove {
            self.touch_cell(c);
            let verts = self.cells[c].verts;
            for &v in verts.as_ref() {
                self.touch_vertex(v);
                let list = &mut self.vertices[v].cells;
                if let Ok(pos) = list.binary_search(&c) {
                    list.remove(pos);
                }
            }
        }

        let mut created = Vec::with_capacity(add.len());
        for (i, verts) in add.iter().enumerate() {
            let c = match remove.get(i) {
                Some(&slot) => {
                    let rec = &mut self.cells[slot];
                    rec.verts = *verts;
                    rec.removed = false;
                    rec.version += 1;
                    slot
                }
                None => {
                    self.cells.push(CellRecord {
                        verts: *verts,
                        removed: false,
                        version: 0,
                    });
                    self.cells.len() - 1
                }
            };
            for &v in verts.as_ref() {
                self.touch_vertex(v);
                let rec = &mut self.vertices[v];
                rec.removed = false;
                if let Err(pos) = rec.cells.binary_search(&c) {
                    rec.cells.insert(pos, c);
                }
            }
            created.push(c);
        }

        for &c in remove.iter().skip(add.len()) {
            let rec = &mut self.cells[c];
            rec.removed = true;
            rec.version += 1;
        }
        created
    }

    /// Drop tombstoned records and renumber densely, preserving order.
    pub fn compact(&mut self) -> Remap {
        let mut remap = Remap {
            vertices: vec![None; self.vertices.len()],
            cells: vec![None; self.cells.len()],
        };
        let mut next = 0;
        for (v, rec) in self.vertices.iter().enumerate() {
            if !rec.removed {
                remap.vertices[v] = Some(next);
                next += 1;
            }
        }
        next = 0;
        for (c, rec) in self.cells.iter().enumerate() {
            if !rec.removed {
                remap.cells[c] = Some(next);
                next += 1;
            }
        }

        let old_vertices = std::mem::take(&mut self.vertices);
        self.vertices = old_vertices
            .into_iter()
            .filter(|r| !r.removed)
            .map(|mut r| {
                // monotone remap keeps the lists sorted
                r.cells = r.cells.iter().filter_map(|&c| remap.cells[c]).collect();
                r
            })
            .collect();

        let old_cells = std::mem::take(&mut self.cells);
        self.cells = old_cells
            .into_iter()
            .filter(|r| !r.removed)
            .map(|mut r| {
                for v in r.verts.as_mut() {
                    // live cells only reference live vertices
                    *v = remap.vertices[*v].unwrap_or(*v);
                }
                r
            })
            .collect();
        remap
    }
}
