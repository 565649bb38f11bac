use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use mesh_edit::data::AttributeHandle;
use mesh_edit::remesh::{LongEdgeSplit, Position, SplitConfig, register_positions};
use mesh_edit::scheduler::{ExecutionPolicy, ExecutorConfig};
use mesh_edit::topology::TriMesh;

// n x n unit lattice, squares cut along the rising diagonal
fn lattice(n: usize) -> (TriMesh, AttributeHandle<Position>) {
    let id = |i: usize, j: usize| j * n + i;
    let mut cells = Vec::with_capacity(2 * (n - 1) * (n - 1));
    for j in 0..n - 1 {
        for i in 0..n - 1 {
            cells.push([id(i, j), id(i + 1, j), id(i + 1, j + 1)]);
            cells.push([id(i, j), id(i + 1, j + 1), id(i, j + 1)]);
        }
    }
    let coords: Vec<Position> = (0..n * n).map(|v| [(v % n) as f64, (v / n) as f64, 0.0]).collect();
    let mut m = TriMesh::create_mesh(n * n, &cells).unwrap();
    let h = register_positions(&mut m, &coords).unwrap();
    (m, h)
}

fn bench_refine(c: &mut Criterion) {
    let mut group = c.benchmark_group("long_edge_split");
    group.sample_size(10);

    for &n in &[16usize, 32] {
        for (label, policy) in [
            ("sequential", ExecutionPolicy::Sequential),
            ("partitioned4", ExecutionPolicy::Partitioned { parts: 4 }),
        ] {
            let config = ExecutorConfig {
                policy,
                ..Default::default()
            };
            group.bench_with_input(BenchmarkId::new(label, n), &n, |b, &n| {
                b.iter_batched(
                    || lattice(n),
                    |(mut m, h)| {
                        let driver = LongEdgeSplit::new(h, SplitConfig { target_length: 0.6 });
                        driver.run(&mut m, config.clone()).unwrap()
                    },
                    criterion::BatchSize::LargeInput,
                )
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_refine);
criterion_main!(benches);
