//! Enumeration and neighbourhood queries.

use crate::topology::mesh::Mesh;
use crate::topology::simplex::{CellShape, PrimitiveType, local_edge_index};
use crate::topology::tuple::Tuple;
use itertools::Itertools;

impl<S: CellShape> Mesh<S> {
    /// One tuple per live simplex of dimension `dim`.
    ///
    /// Edges and faces shared by several cells are reported once, from the
    /// lowest-numbered cell containing them.
    pub fn get_all(&self, dim: PrimitiveType) -> Vec<Tuple> {
        match dim {
            PrimitiveType::Vertex => self
                .conn
                .live_vertices()
                .filter_map(|v| self.tuple_from_vertex(v))
                .collect(),
            PrimitiveType::Edge => self
                .conn
                .live_cells()
                .flat_map(|c| (0..S::LOCAL_EDGES.len()).map(move |j| (c, j)))
                .filter_map(|(c, j)| {
                    let t = self.tuple_from_edge(c, j)?;
                    (self.eid(&t)? == c * S::LOCAL_EDGES.len() + j).then_some(t)
                })
                .collect(),
            PrimitiveType::Face if S::DIM == 2 => self
                .conn
                .live_cells()
                .filter_map(|c| self.tuple_from_cell(c))
                .collect(),
            PrimitiveType::Face => self
                .conn
                .live_cells()
                .flat_map(|c| (0..S::LOCAL_FACES.len()).map(move |j| (c, j)))
                .filter_map(|(c, j)| {
                    let t = self.tuple_from_face(c, j)?;
                    (self.fid(&t)? == c * S::LOCAL_FACES.len() + j).then_some(t)
                })
                .collect(),
            PrimitiveType::Tetrahedron if S::DIM == 3 => self
                .conn
                .live_cells()
                .filter_map(|c| self.tuple_from_cell(c))
                .collect(),
            PrimitiveType::Tetrahedron => Vec::new(),
        }
    }

    /// Ids of the vertices sharing a cell with `vid`, ascending.
    pub fn one_ring_vids(&self, vid: usize) -> Vec<usize> {
        self.conn
            .vertex_cells(vid)
            .iter()
            .filter_map(|&c| self.conn.cell_verts(c))
            .flatten()
            .copied()
            .filter(|&v| v != vid)
            .sorted_unstable()
            .dedup()
            .collect()
    }

    /// The `dim`-simplices around the tuple's vertex.
    ///
    /// - `Vertex`: each neighbouring vertex (as a tuple at that vertex on the
    ///   edge back to the centre).
    /// - `Edge`: each incident edge, as a tuple at the centre vertex.
    /// - cell dimension: each incident cell, as a tuple at the centre vertex.
    /// - `Face` on tet meshes: each incident face, once.
    pub fn get_one_ring(&self, t: &Tuple, dim: PrimitiveType) -> Vec<Tuple> {
        let v = t.vid();
        match dim {
            PrimitiveType::Vertex => self
                .one_ring_vids(v)
                .into_iter()
                .filter_map(|w| self.edge_tuple(w, v))
                .collect(),
            PrimitiveType::Edge => self
                .one_ring_vids(v)
                .into_iter()
                .filter_map(|w| self.edge_tuple(v, w))
                .collect(),
            d if d == S::cell_primitive() => self
                .conn
                .vertex_cells(v)
                .iter()
                .filter_map(|&c| self.tuple_in_cell(c, v, None))
                .collect(),
            PrimitiveType::Face => {
                let mut seen = hashbrown::HashSet::new();
                let mut out = Vec::new();
                for &c in self.conn.vertex_cells(v) {
                    for j in 0..S::LOCAL_FACES.len() {
                        let Some(ft) = self.tuple_from_face(c, j) else { continue };
                        let Some(fv) = self.face_vertices(&ft) else { continue };
                        if !fv.contains(&v) {
                            continue;
                        }
                        if let Some(id) = self.fid(&ft) {
                            if seen.insert(id) {
                                out.push(self.face_tuple_at(c, j, v).unwrap_or(ft));
                            }
                        }
                    }
                }
                out
            }
            PrimitiveType::Tetrahedron => Vec::new(),
        }
    }

    fn face_tuple_at(&self, cid: usize, local_fid: usize, vid: usize) -> Option<Tuple> {
        let verts = self.conn.cell_verts(cid)?;
        let f = S::LOCAL_FACES.get(local_fid)?;
        let lv = f.iter().copied().find(|&l| verts[l] == vid)?;
        let lo = f.iter().copied().find(|&l| l != lv)?;
        self.face_tuple_toward(cid, local_fid, vid, verts[lo])
    }

    /// Tuple at `vid` on local face `local_fid` of `cid`, along the edge to
    /// `toward`. Both vertices must lie on the face.
    pub(crate) fn face_tuple_toward(&self, cid: usize, local_fid: usize, vid: usize, toward: usize) -> Option<Tuple> {
        let verts = self.conn.cell_verts(cid)?;
        let f = S::LOCAL_FACES.get(local_fid)?;
        let lv = f.iter().copied().find(|&l| verts[l] == vid)?;
        let lo = f.iter().copied().find(|&l| verts[l] == toward)?;
        let eid = local_edge_index::<S>(lv, lo)?;
        Some(Tuple::new(vid, eid, local_fid, cid, self.conn.cell(cid)?.version()))
    }

    /// Cells incident to the `dim`-simplex at `t`, as tuples at `t`'s vertex.
    pub fn get_incident(&self, t: &Tuple, dim: PrimitiveType) -> Vec<Tuple> {
        let Some(verts) = self.simplex_vertices(t, dim) else {
            return Vec::new();
        };
        self.conn
            .cells_containing(&verts)
            .into_iter()
            .filter_map(|c| self.tuple_in_cell(c, t.vid(), verts.get(1).copied()))
            .collect()
    }

    /// Global vertex ids of the `dim`-simplex at `t`.
    pub fn simplex_vertices(&self, t: &Tuple, dim: PrimitiveType) -> Option<Vec<usize>> {
        match dim {
            PrimitiveType::Vertex => Some(vec![t.vid()]),
            PrimitiveType::Edge => self.edge_vertices(t).map(|(a, b)| vec![a, b]),
            PrimitiveType::Face if S::DIM == 3 => {
                let f = self.face_vertices(t)?;
                // keep the tuple vertex first
                let mut out = vec![t.vid()];
                out.extend(f.iter().copied().filter(|&x| x != t.vid()));
                Some(out)
            }
            _ => self.cell_vertices(t.cid()).map(|v| {
                let mut out = vec![t.vid()];
                out.extend(v.iter().copied().filter(|&x| x != t.vid()));
                out
            }),
        }
    }

    /// Whether the facet opposite local vertex `skip` of cell `cid` has no
    /// neighbouring cell.
    pub(crate) fn is_boundary_facet(&self, cid: usize, skip: usize) -> bool {
        let Some(verts) = self.conn.cell_verts(cid) else {
            return false;
        };
        let facet: Vec<usize> = verts
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != skip)
            .map(|(_, &v)| v)
            .collect();
        self.conn.cells_containing(&facet).len() == 1
    }

    /// Whether the tuple's edge lies on the boundary (triangle meshes: has a
    /// single incident cell; tet meshes: lies on a boundary face).
    pub fn is_boundary_edge(&self, t: &Tuple) -> bool {
        let Some((a, b)) = self.edge_vertices(t) else {
            return false;
        };
        if S::DIM == 2 {
            return self.conn.cells_containing(&[a, b]).len() == 1;
        }
        self.conn.cells_containing(&[a, b]).into_iter().any(|c| {
            self.conn.cell_verts(c).is_some_and(|verts| {
                (0..S::N_VERTS).any(|skip| {
                    verts[skip] != a && verts[skip] != b && self.is_boundary_facet(c, skip)
                })
            })
        })
    }

    /// Whether `vid` lies on a boundary facet.
    pub fn is_boundary_vertex(&self, vid: usize) -> bool {
        self.conn.vertex_cells(vid).iter().any(|&c| {
            self.conn.cell_verts(c).is_some_and(|verts| {
                (0..S::N_VERTS).any(|skip| verts[skip] != vid && self.is_boundary_facet(c, skip))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::topology::mesh::{TetMesh, TriMesh};
    use crate::topology::simplex::PrimitiveType;

    fn fan() -> TriMesh {
        // closed fan of 4 triangles around vertex 0
        TriMesh::create_mesh(5, &[[0, 1, 2], [0, 2, 3], [0, 3, 4], [0, 4, 1]]).unwrap()
    }

    #[test]
    fn get_all_counts_each_simplex_once() {
        let m = fan();
        assert_eq!(m.get_all(PrimitiveType::Vertex).len(), 5);
        assert_eq!(m.get_all(PrimitiveType::Edge).len(), 8);
        assert_eq!(m.get_all(PrimitiveType::Face).len(), 4);

        let t = TetMesh::create_mesh(5, &[[0, 1, 2, 3], [0, 2, 1, 4]]).unwrap();
        assert_eq!(t.get_all(PrimitiveType::Vertex).len(), 5);
        assert_eq!(t.get_all(PrimitiveType::Edge).len(), 9);
        assert_eq!(t.get_all(PrimitiveType::Face).len(), 7);
        assert_eq!(t.get_all(PrimitiveType::Tetrahedron).len(), 2);
    }

    #[test]
    fn one_ring_and_incident() {
        let m = fan();
        let c = m.tuple_from_vertex(0).unwrap();
        assert_eq!(m.one_ring_vids(0), vec![1, 2, 3, 4]);
        assert_eq!(m.get_one_ring(&c, PrimitiveType::Vertex).len(), 4);
        assert!(m.get_one_ring(&c, PrimitiveType::Vertex).iter().all(|t| t.vid() != 0));
        assert_eq!(m.get_one_ring(&c, PrimitiveType::Edge).len(), 4);
        assert_eq!(m.get_one_ring(&c, PrimitiveType::Face).len(), 4);

        let e = m.edge_tuple(0, 2).unwrap();
        let inc = m.get_incident(&e, PrimitiveType::Edge);
        assert_eq!(inc.len(), 2);
        assert!(inc.iter().all(|t| m.edge_vertices(t) == Some((0, 2))));
        assert_eq!(m.get_incident(&e, PrimitiveType::Vertex).len(), 4);
    }

    #[test]
    fn boundary_classification() {
        let m = fan();
        assert!(!m.is_boundary_vertex(0));
        assert!(m.is_boundary_vertex(3));
        assert!(m.is_boundary_edge(&m.edge_tuple(1, 2).unwrap()));
        assert!(!m.is_boundary_edge(&m.edge_tuple(0, 2).unwrap()));

        let t = TetMesh::create_mesh(5, &[[0, 1, 2, 3], [0, 2, 1, 4]]).unwrap();
        // every edge of two glued tets touches the hull
        assert!(t.is_boundary_edge(&t.edge_tuple(0, 1).unwrap()));
        let f = t.get_one_ring(&t.tuple_from_vertex(3).unwrap(), PrimitiveType::Face);
        assert_eq!(f.len(), 3);
    }
}
