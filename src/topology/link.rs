//! Link condition for edge collapse.
//!
//! Collapsing edge `ab` keeps the mesh a manifold iff
//! `lk(a) ∩ lk(b) == lk(ab)`, where links are taken in the mesh closed off by
//! coning every boundary facet to one virtual vertex. Links are compared as
//! sets of sorted vertex lists of every dimension.

use crate::topology::mesh::Mesh;
use crate::topology::simplex::CellShape;
use crate::topology::tuple::Tuple;
use hashbrown::HashSet;
use itertools::Itertools;

/// Id of the virtual cone apex; sorts after every real vertex.
const VIRTUAL_VERTEX: usize = usize::MAX;

impl<S: CellShape> Mesh<S> {
    /// Cells of the closed-off mesh containing every vertex of `simplex`.
    fn closed_star(&self, simplex: &[usize]) -> Vec<Vec<usize>> {
        let mut out = Vec::new();
        for c in self.conn.cells_containing(simplex) {
            let Some(verts) = self.conn.cell_verts(c) else {
                continue;
            };
            out.push(verts.to_vec());
            for (skip, &apex) in verts.iter().enumerate() {
                if simplex.contains(&apex) || !self.is_boundary_facet(c, skip) {
                    continue;
                }
                let mut coned: Vec<usize> = verts.iter().copied().filter(|&v| v != apex).collect();
                coned.push(VIRTUAL_VERTEX);
                out.push(coned);
            }
        }
        out
    }

    /// Link of `simplex`: every face of its closed star disjoint from it.
    pub(crate) fn link(&self, simplex: &[usize]) -> HashSet<Vec<usize>> {
        let mut link = HashSet::new();
        for cell in self.closed_star(simplex) {
            let rest: Vec<usize> = cell
                .into_iter()
                .filter(|v| !simplex.contains(v))
                .sorted_unstable()
                .collect();
            for face in rest.into_iter().powerset().filter(|f| !f.is_empty()) {
                link.insert(face);
            }
        }
        link
    }

    /// Whether collapsing the tuple's edge preserves manifoldness.
    pub fn link_condition(&self, t: &Tuple) -> bool {
        let Some((a, b)) = self.edge_vertices(t) else {
            return false;
        };
        let la = self.link(&[a]);
        let lb = self.link(&[b]);
        let lab = self.link(&[a, b]);
        let common: HashSet<Vec<usize>> = la.intersection(&lb).cloned().collect();
        common == lab
    }
}
