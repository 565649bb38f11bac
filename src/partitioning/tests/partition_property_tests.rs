use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::grid;
use crate::partitioning::metrics::edge_cut;
use crate::partitioning::{MeshGraph, PartitionMap, PartitionerConfig, partition};

#[test]
fn grid_cut_beats_random_assignment() {
    let m = grid(10);
    let g = MeshGraph::from_mesh(&m);
    let cfg = PartitionerConfig::default();
    let pm = partition(&g, g.capacity(), &cfg).unwrap();
    let my_cut = edge_cut(&g, &pm);

    let mut rng = SmallRng::seed_from_u64(123);
    let rnd_pm = PartitionMap::from_parts((0..100).map(|_| Some(rng.gen_range(0..4))).collect(), 4);
    let rnd_cut = edge_cut(&g, &rnd_pm);

    assert!(my_cut < rnd_cut, "grid cut {} >= random cut {}", my_cut, rnd_cut);
}

#[test]
fn partition_is_deterministic_per_seed() {
    let g = MeshGraph::from_mesh(&grid(8));
    let cfg = PartitionerConfig {
        n_parts: 3,
        rng_seed: 7,
        ..Default::default()
    };
    assert_eq!(partition(&g, 64, &cfg).unwrap(), partition(&g, 64, &cfg).unwrap());
}

proptest! {
    #[test]
    fn prop_grids_are_covered_and_balanced(
        n in 2usize..9,
        k in 1usize..6,
        seed in any::<u64>(),
    ) {
        let g = MeshGraph::from_mesh(&grid(n));
        let cfg = PartitionerConfig { n_parts: k, rng_seed: seed, ..Default::default() };
        let pm = partition(&g, n * n, &cfg).unwrap();

        // every vertex is in exactly one valid part
        prop_assert!((0..n * n).all(|v| pm.part_of(v).is_some_and(|p| p < k)));
        let sizes = pm.part_sizes();
        prop_assert_eq!(sizes.iter().sum::<usize>(), n * n);
        // no part exceeds its balanced share
        let share = (n * n).div_ceil(k);
        prop_assert!(sizes.iter().all(|&s| s <= share), "sizes = {:?}", sizes);
    }
}
