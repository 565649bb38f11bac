//! Entry-point for native vertex partitioning.
//!
//! The partitioned executor splits the vertex set into `n_parts` connected,
//! balanced groups with few edges between them. [`partition`] picks far-apart
//! seeds (see [`seed_select`]) and grows all parts together by breadth-first
//! search, one vertex per part per round, capping each part at its balanced
//! share.

pub mod graph_traits;
pub mod metrics;
pub mod seed_select;

pub use self::graph_traits::{MeshGraph, PartitionableGraph};
pub use self::metrics::*;

use crate::mesh_error::MeshEditError;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub type PartitionId = usize;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartitionerConfig {
    pub n_parts: usize,
    pub rng_seed: u64,
    /// Extra room each part may take above `ceil(n / n_parts)`, as a fraction.
    pub balance_slack: f64,
}

impl Default for PartitionerConfig {
    fn default() -> Self {
        Self {
            n_parts: 4,
            rng_seed: 42,
            balance_slack: 0.0,
        }
    }
}

/// Part of every vertex slot, `None` for removed vertices.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PartitionMap {
    parts: Vec<Option<PartitionId>>,
    n_parts: usize,
}

impl PartitionMap {
    pub fn from_parts(parts: Vec<Option<PartitionId>>, n_parts: usize) -> Self {
        Self { parts, n_parts }
    }

    #[inline]
    pub fn part_of(&self, v: usize) -> Option<PartitionId> {
        self.parts.get(v).copied().flatten()
    }

    /// Assign `v`, growing the map when `v` is past its end.
    pub fn assign(&mut self, v: usize, p: PartitionId) {
        if v >= self.parts.len() {
            self.parts.resize(v + 1, None);
        }
        self.parts[v] = Some(p);
    }

    #[inline]
    pub fn n_parts(&self) -> usize {
        self.n_parts
    }

    /// Number of vertex slots covered.
    #[inline]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn part_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.n_parts];
        for p in self.parts.iter().flatten() {
            if let Some(s) = sizes.get_mut(*p) {
                *s += 1;
            }
        }
        sizes
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, PartitionId)> + '_ {
        self.parts
            .iter()
            .enumerate()
            .filter_map(|(v, p)| p.map(|p| (v, p)))
    }
}

/// Partition the vertices of `graph` into `cfg.n_parts` groups.
///
/// `capacity` bounds the vertex ids the graph may return. Every vertex of
/// the graph is assigned; parts may be empty only when there are fewer
/// vertices than parts.
pub fn partition<G>(graph: &G, capacity: usize, cfg: &PartitionerConfig) -> Result<PartitionMap, MeshEditError>
where
    G: PartitionableGraph<VertexId = usize>,
{
    use rayon::iter::ParallelIterator;

    if cfg.n_parts == 0 {
        return Err(MeshEditError::ZeroPartitions);
    }
    let mut vertices: Vec<usize> = graph.vertices().collect();
    vertices.sort_unstable();
    let n = vertices.len();
    let mut pm = PartitionMap::from_parts(vec![None; capacity], cfg.n_parts);
    if n == 0 {
        return Ok(pm);
    }

    let share = n.div_ceil(cfg.n_parts);
    let cap = ((share as f64) * (1.0 + cfg.balance_slack.max(0.0))).ceil() as usize;
    let mut sizes = vec![0usize; cfg.n_parts];
    let mut frontiers: Vec<VecDeque<usize>> = vec![VecDeque::new(); cfg.n_parts];

    for (p, s) in seed_select::pick_seeds(graph, capacity, cfg).into_iter().enumerate() {
        pm.assign(s, p);
        sizes[p] += 1;
        frontiers[p].push_back(s);
    }

    // round-robin growth: each part claims at most one vertex per round
    let mut progress = true;
    while progress {
        progress = false;
        for p in 0..cfg.n_parts {
            if sizes[p] >= cap {
                continue;
            }
            while let Some(&u) = frontiers[p].front() {
                let next = graph.neighbors_seq(u).filter(|&v| pm.part_of(v).is_none()).min();
                match next {
                    Some(v) => {
                        pm.assign(v, p);
                        sizes[p] += 1;
                        frontiers[p].push_back(v);
                        progress = true;
                        break;
                    }
                    None => {
                        frontiers[p].pop_front();
                    }
                }
            }
        }
    }

    // vertices cut off by capped parts go to the smallest part
    for v in vertices {
        if pm.part_of(v).is_none() {
            let p = (0..cfg.n_parts).min_by_key(|&p| (sizes[p], p)).unwrap_or(0);
            pm.assign(v, p);
            sizes[p] += 1;
        }
    }
    log::debug!("partition: {} vertices into parts of sizes {:?}", n, sizes);
    Ok(pm)
}

#[cfg(test)]
mod tests;
