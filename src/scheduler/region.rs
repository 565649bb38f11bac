//! Working copies of mesh regions for partitioned execution.
//!
//! A region holds every cell incident to a vertex its partition owns,
//! renumbered densely in ascending global order, plus the attribute values
//! of those simplices. Workers edit their regions concurrently. Afterwards
//! each region is written back: cells it replaced or re-versioned, vertices
//! it created or removed, and the attribute values of its interior.

use crate::mesh_error::MeshEditError;
use crate::scheduler::Descriptor;
use crate::scheduler::locks::VertexLocks;
use crate::topology::mesh::Mesh;
use crate::topology::simplex::{CellShape, PrimitiveType};
use crate::topology::tuple::Tuple;
use hashbrown::HashMap;
use itertools::Itertools;

#[derive(Debug)]
pub(crate) struct Region<S: CellShape> {
    pub(crate) part: usize,
    pub(crate) mesh: Mesh<S>,
    /// Vertices the partition owns, by local id.
    pub(crate) locks: VertexLocks,
    global_vid: Vec<usize>,
    global_cid: Vec<usize>,
    local_vid: HashMap<usize, usize>,
    local_cid: HashMap<usize, usize>,
}

/// Canonical slot pairs, per dimension, for every sub-simplex of `cells`
/// in `from` and its image in `to` under `vmap`.
fn slot_pairs<S: CellShape>(
    from: &Mesh<S>,
    to: &Mesh<S>,
    cells: impl IntoIterator<Item = usize>,
    vmap: impl Fn(usize) -> Option<usize>,
) -> [Vec<(usize, usize)>; 4] {
    let mut pairs: [Vec<(usize, usize)>; 4] = Default::default();
    let mut push = |dim: PrimitiveType, verts: &[usize]| {
        let image: Option<Vec<usize>> = verts.iter().map(|&v| vmap(v)).collect();
        if let (Some(a), Some(b)) = (from.slot_of(verts), image.and_then(|img| to.slot_of(&img))) {
            pairs[dim.dimension()].push((a, b));
        }
    };
    for c in cells {
        let Some(verts) = from.cell_vertices(c) else {
            continue;
        };
        for e in S::LOCAL_EDGES {
            push(PrimitiveType::Edge, &[verts[e[0]], verts[e[1]]]);
        }
        if S::DIM == 3 {
            for f in S::LOCAL_FACES {
                push(PrimitiveType::Face, &[verts[f[0]], verts[f[1]], verts[f[2]]]);
            }
        }
        push(S::cell_primitive(), verts);
    }
    for p in &mut pairs {
        p.sort_unstable();
        p.dedup();
    }
    pairs
}

fn copy_attributes<S: CellShape>(to: &mut Mesh<S>, from: &Mesh<S>, pairs: &[Vec<(usize, usize)>; 4]) {
    for dim in [
        PrimitiveType::Vertex,
        PrimitiveType::Edge,
        PrimitiveType::Face,
        PrimitiveType::Tetrahedron,
    ] {
        let p = &pairs[dim.dimension()];
        if !p.is_empty() {
            to.attrs.copy_dim_from(dim, &from.attrs, p);
        }
    }
}

impl<S: CellShape> Region<S> {
    /// Copy out the region of partition `part`.
    pub(crate) fn extract(global: &Mesh<S>, owners: &[usize], part: usize) -> Result<Self, MeshEditError> {
        let conn = &global.conn;
        let global_cid: Vec<usize> = conn
            .live_vertices()
            .filter(|&v| owners.get(v) == Some(&part))
            .flat_map(|v| conn.vertex_cells(v).iter().copied())
            .sorted_unstable()
            .dedup()
            .collect();
        let global_vid: Vec<usize> = global_cid
            .iter()
            .filter_map(|&c| conn.cell_verts(c))
            .flatten()
            .copied()
            .sorted_unstable()
            .dedup()
            .collect();
        let local_vid: HashMap<usize, usize> = global_vid.iter().enumerate().map(|(l, &g)| (g, l)).collect();
        let local_cid: HashMap<usize, usize> = global_cid.iter().enumerate().map(|(l, &g)| (g, l)).collect();

        let mut cells = Vec::with_capacity(global_cid.len());
        for &c in &global_cid {
            let Some(rec) = conn.cell(c) else {
                continue;
            };
            let mut verts = rec.verts;
            for v in verts.as_mut() {
                *v = local_vid[&*v];
            }
            cells.push(verts);
        }
        let mut mesh = Mesh::create_mesh(global_vid.len(), &cells)?;
        let attrs = global.attrs.empty_like(|dim| mesh.capacity_of(dim));
        mesh.attrs = attrs;

        let mut pairs = slot_pairs(global, &mesh, global_cid.iter().copied(), |g| local_vid.get(&g).copied());
        pairs[0] = global_vid.iter().enumerate().map(|(l, &g)| (g, l)).collect();
        copy_attributes(&mut mesh, global, &pairs);

        let locks = VertexLocks::new(global_vid.iter().map(|&g| owners.get(g) == Some(&part)).collect());
        Ok(Self {
            part,
            mesh,
            locks,
            global_vid,
            global_cid,
            local_vid,
            local_cid,
        })
    }

    /// The same tuple in local ids.
    pub(crate) fn to_local(&self, t: &Tuple) -> Option<Tuple> {
        let vid = *self.local_vid.get(&t.vid())?;
        let cid = *self.local_cid.get(&t.cid())?;
        let local = Tuple::new(vid, t.local_eid(), t.local_fid(), cid, 0);
        self.mesh.is_valid(&local).then_some(local)
    }

    /// Whether local vertex `v` belongs to this partition; vertices created
    /// in the region always do.
    #[inline]
    pub(crate) fn owns(&self, v: usize) -> bool {
        v >= self.global_vid.len() || self.locks.is_lockable(v)
    }

    /// Write the region's edits into `global` and translate its leftover
    /// descriptors. Returns them with the number that went stale locally.
    pub(crate) fn merge_into(
        self,
        global: &mut Mesh<S>,
        owners: &mut Vec<usize>,
        leftovers: Vec<Descriptor>,
    ) -> (Vec<Descriptor>, usize) {
        let local = &self.mesh;
        let (n_verts0, n_cells0) = (self.global_vid.len(), self.global_cid.len());

        // vertices created here
        let mut vmap: Vec<Option<usize>> = self.global_vid.iter().map(|&g| Some(g)).collect();
        for l in n_verts0..local.vertex_capacity() {
            vmap.push(local.conn.is_vertex_live(l).then(|| global.conn.add_vertex()));
        }
        owners.resize(global.vertex_capacity(), self.part);

        // cells replaced, re-versioned or created here
        let changed = |c: usize| {
            c >= n_cells0 || local.conn.cell(c).is_some_and(|r| r.is_removed() || r.version() != 0)
        };
        let remove: Vec<usize> = (0..n_cells0).filter(|&c| changed(c)).map(|c| self.global_cid[c]).collect();
        let added: Vec<usize> = local.conn.live_cells().filter(|&c| changed(c)).collect();
        let mut add = Vec::with_capacity(added.len());
        for &c in &added {
            let Some(rec) = local.conn.cell(c) else {
                continue;
            };
            let mut verts = rec.verts;
            for v in verts.as_mut() {
                // live cells only reference live vertices
                *v = vmap[*v].unwrap_or(usize::MAX);
            }
            add.push(verts);
        }
        let created = global.conn.replace_cells(&remove, &add);

        let mut cmap: Vec<Option<usize>> = (0..local.cell_capacity())
            .map(|c| (c < n_cells0 && !changed(c)).then(|| self.global_cid[c]))
            .collect();
        for (&c, &g) in added.iter().zip(&created) {
            cmap[c] = Some(g);
        }

        for l in 0..n_verts0 {
            let g = self.global_vid[l];
            if !local.conn.is_vertex_live(l) && global.conn.is_vertex_live(g) && global.conn.vertex_cells(g).is_empty() {
                global.conn.remove_vertex(g);
            }
        }

        global.resize_attributes();
        let interior = local
            .conn
            .live_cells()
            .filter(|&c| local.cell_vertices(c).is_some_and(|vs| vs.iter().all(|&v| self.owns(v))));
        let mut pairs = slot_pairs(local, global, interior, |v| vmap.get(v).copied().flatten());
        pairs[0] = local
            .conn
            .live_vertices()
            .filter(|&v| self.owns(v))
            .filter_map(|v| Some((v, vmap[v]?)))
            .collect();
        copy_attributes(global, local, &pairs);

        let mut stale = 0;
        let mut out = Vec::with_capacity(leftovers.len());
        for d in leftovers {
            let back = local.is_valid(&d.tuple).then(|| {
                let cid = cmap.get(d.tuple.cid()).copied().flatten()?;
                let vid = vmap.get(d.tuple.vid()).copied().flatten()?;
                let version = global.conn.cell(cid)?.version();
                Some(Tuple::new(vid, d.tuple.local_eid(), d.tuple.local_fid(), cid, version))
            });
            match back.flatten() {
                Some(tuple) => out.push(Descriptor { tuple, ..d }),
                None => stale += 1,
            }
        }
        log::trace!(
            "part {}: merged {} -> {} cells, {} new vertices",
            self.part,
            remove.len(),
            created.len(),
            local.vertex_capacity() - n_verts0
        );
        (out, stale)
    }
}
