//! Seed selection for region-growing partitioning.
//!
//! [`pick_seeds`] draws the first seed at random with probability weighted by
//! vertex degree, then adds seeds one at a time at the vertex farthest (in
//! hops) from every seed chosen so far. Far-apart seeds give compact,
//! low-cut regions once grown.

use crate::partitioning::PartitionerConfig;
use crate::partitioning::graph_traits::PartitionableGraph;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rayon::iter::ParallelIterator;
use std::collections::VecDeque;

/// Draw one entry of `vertices` with probability proportional to `weights`;
/// uniform when every weight is zero.
fn weighted_pick(vertices: &[usize], weights: &[u64], rng: &mut SmallRng) -> Option<usize> {
    if vertices.is_empty() {
        return None;
    }
    let mut prefix: Vec<u64> = Vec::with_capacity(weights.len());
    let mut sum = 0u64;
    for &w in weights {
        sum += w;
        prefix.push(sum);
    }
    if sum == 0 {
        return Some(vertices[rng.gen_range(0..vertices.len())]);
    }
    let t = rng.gen_range(0..sum);
    // first prefix strictly greater than t
    let i = prefix.partition_point(|&p| p <= t);
    vertices.get(i).copied()
}

/// Hop distance from the nearest of `sources`; `usize::MAX` when unreachable.
pub fn hop_distances<G>(graph: &G, capacity: usize, sources: &[usize]) -> Vec<usize>
where
    G: PartitionableGraph<VertexId = usize>,
{
    let mut dist = vec![usize::MAX; capacity];
    let mut queue = VecDeque::new();
    for &s in sources {
        if s < capacity && dist[s] == usize::MAX {
            dist[s] = 0;
            queue.push_back(s);
        }
    }
    while let Some(u) = queue.pop_front() {
        for v in graph.neighbors_seq(u) {
            if v < capacity && dist[v] == usize::MAX {
                dist[v] = dist[u] + 1;
                queue.push_back(v);
            }
        }
    }
    dist
}

/// Pick `min(cfg.n_parts, |V|)` seed vertices.
///
/// Deterministic for a given `cfg.rng_seed`. Unreachable vertices count as
/// infinitely far, so every connected component receives a seed before any
/// component receives a second one.
pub fn pick_seeds<G>(graph: &G, capacity: usize, cfg: &PartitionerConfig) -> Vec<usize>
where
    G: PartitionableGraph<VertexId = usize>,
{
    let mut vertices: Vec<usize> = graph.vertices().collect();
    vertices.sort_unstable();
    let degrees: Vec<u64> = vertices.iter().map(|&v| graph.degree(v) as u64).collect();
    let mut rng = SmallRng::seed_from_u64(cfg.rng_seed);

    let Some(first) = weighted_pick(&vertices, &degrees, &mut rng) else {
        return Vec::new();
    };
    let n_seeds = cfg.n_parts.min(vertices.len());
    let mut seeds = Vec::with_capacity(n_seeds);
    seeds.push(first);
    while seeds.len() < n_seeds {
        let dist = hop_distances(graph, capacity, &seeds);
        // ties resolve to the lowest id
        let Some(&far) = vertices
            .iter()
            .filter(|&&v| dist[v] > 0)
            .max_by(|&&a, &&b| dist[a].cmp(&dist[b]).then(b.cmp(&a)))
        else {
            break;
        };
        seeds.push(far);
    }
    seeds
}
