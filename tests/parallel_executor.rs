use mesh_edit::prelude::*;
use serial_test::serial;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

mod util;

fn partitioned(parts: usize) -> ExecutorConfig {
    ExecutorConfig {
        policy: ExecutionPolicy::Partitioned { parts },
        num_threads: 4,
        ..Default::default()
    }
}

fn refine(config: ExecutorConfig) -> (TriMesh, PassReport) {
    let (mut m, h) = util::grid(10);
    let driver = LongEdgeSplit::new(h, SplitConfig { target_length: 1.2 });
    let report = driver.run(&mut m, config).unwrap();
    (m, report)
}

#[test]
#[serial]
fn parallel_and_sequential_refinement_agree() {
    let (seq, seq_report) = refine(ExecutorConfig::default());
    let (par, par_report) = refine(partitioned(4));
    // only the 81 diagonals exceed the target; their halves do not
    assert_eq!(util::counts(&seq), (181, 324));
    assert_eq!(util::counts(&par), util::counts(&seq));
    assert_eq!(seq_report.executed, 81);
    assert_eq!(par_report.executed, 81);
    assert!(par_report.passes >= 1);
    assert!(par.check_connectivity().is_ok());
    assert_eq!(par.check_manifold_facets(NonManifoldHandling::Error), Ok(0));
}

#[test]
#[serial]
fn single_partition_matches_sequential_exactly() {
    let (seq, _) = refine(ExecutorConfig::default());
    let (par, report) = refine(ExecutorConfig {
        num_threads: 1,
        ..partitioned(1)
    });
    assert_eq!(report.lock_deferrals, 0);
    assert_eq!(util::counts(&par), util::counts(&seq));
}

#[test]
#[serial]
fn stopping_criterion_is_checked_between_rounds() {
    let (mut m, h) = util::grid(10);
    let driver = LongEdgeSplit::new(h, SplitConfig { target_length: 1.2 });
    let pass = driver
        .pass::<Triangle>(partitioned(4))
        .with_stopping_criterion(|m| m.vertex_count() >= 120, 1);
    let ops = m
        .get_all(PrimitiveType::Edge)
        .into_iter()
        .map(|t| (OperationKind::EdgeSplit, t))
        .collect();
    let report = pass.run(&mut m, ops).unwrap();
    assert!(report.stopped_early);
    assert!(m.vertex_count() >= 120);
    assert!(m.vertex_count() < 181);
}

/// Splits like [`LongEdgeSplit`] but lingers in `after`, counting how many
/// edits are in flight at once.
struct Lingering {
    inner: LongEdgeSplit,
    active: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl EditHooks<Triangle> for Lingering {
    type Cache = <LongEdgeSplit as EditHooks<Triangle>>::Cache;

    fn before(&self, mesh: &TriMesh, kind: OperationKind, t: &Tuple, cache: &mut Self::Cache) -> bool {
        self.inner.before(mesh, kind, t, cache)
    }

    fn after(&self, mesh: &mut TriMesh, kind: OperationKind, t: &Tuple, cache: &Self::Cache) -> bool {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(2));
        self.active.fetch_sub(1, Ordering::SeqCst);
        self.inner.after(mesh, kind, t, cache)
    }
}

#[test]
#[serial]
fn workers_edit_their_regions_concurrently() {
    let (mut m, h) = util::grid(20);
    let peak = Arc::new(AtomicUsize::new(0));
    let hooks = Lingering {
        inner: LongEdgeSplit::new(h, SplitConfig { target_length: 1.2 }),
        active: Arc::new(AtomicUsize::new(0)),
        peak: Arc::clone(&peak),
    };
    let pass = ExecutePass::new(hooks).with_config(partitioned(4));
    let ops = m
        .get_all(PrimitiveType::Edge)
        .into_iter()
        .map(|t| (OperationKind::EdgeSplit, t))
        .collect();
    let report = pass.run(&mut m, ops).unwrap();
    // one diagonal per square
    assert_eq!(report.executed, 361);
    assert!(peak.load(Ordering::SeqCst) >= 2, "edits never overlapped");
    assert!(m.check_connectivity().is_ok());
    assert_eq!(m.attribute(&h).unwrap().len(), m.vertex_capacity());
}

#[test]
#[serial]
fn zero_partitions_is_a_configuration_error() {
    let (mut m, h) = util::grid(3);
    let driver = LongEdgeSplit::new(h, SplitConfig::default());
    assert_eq!(
        driver.run(&mut m, partitioned(0)),
        Err(MeshEditError::ZeroPartitions)
    );
}
