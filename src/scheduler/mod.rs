//! Batch execution of edits.
//!
//! An [`ExecutePass`] bundles the edit hooks with the scheduling callbacks
//! (priority, staleness, renewal, locking, early stopping) and runs a list of
//! operations to exhaustion under an [`ExecutionPolicy`]:
//!
//! - `Sequential`: one max-priority queue, see [`sequential`].
//! - `Partitioned { parts }`: the vertex set is split into low-cut parts;
//!   each part edits a private copy of its region on its own rayon task and
//!   the copies are merged back between rounds, see [`parallel`].

pub mod locks;
pub mod parallel;
pub mod queue;
pub(crate) mod region;
pub mod sequential;

pub use locks::{LockGuard, VertexLocks, lock_two_ring};
pub use queue::OperationQueue;

use crate::mesh_error::MeshEditError;
use crate::operations::{EditHooks, OperationKind, RejectClass, Rejection};
use crate::topology::mesh::Mesh;
use crate::topology::simplex::CellShape;
use crate::topology::tuple::Tuple;
use serde::{Deserialize, Serialize};

/// A queued operation.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
    pub kind: OperationKind,
    pub tuple: Tuple,
    /// Priority computed when the descriptor was queued.
    pub priority: f64,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionPolicy {
    #[default]
    Sequential,
    Partitioned { parts: usize },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    pub policy: ExecutionPolicy,
    /// Worker threads; 0 lets rayon choose.
    pub num_threads: usize,
    /// Partitioned passes before leftover deferred work drains sequentially.
    pub max_passes: usize,
    /// Seed for partitioning.
    pub partition_seed: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            policy: ExecutionPolicy::Sequential,
            num_threads: 0,
            max_passes: 8,
            partition_seed: 42,
        }
    }
}

/// Counters of one [`ExecutePass::run`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassReport {
    pub executed: usize,
    pub rejected_structural: usize,
    pub rejected_predicate: usize,
    /// Popped with an invalid tuple.
    pub stale: usize,
    /// Re-queued because their priority was out of date.
    pub requeued: usize,
    /// Deferred to a later pass for lack of locks.
    pub lock_deferrals: usize,
    pub passes: usize,
    pub stopped_early: bool,
}

impl PassReport {
    pub(crate) fn record(&mut self, r: Rejection) {
        match r.class() {
            RejectClass::Structural => self.rejected_structural += 1,
            RejectClass::Predicate => self.rejected_predicate += 1,
            RejectClass::Concurrency => self.lock_deferrals += 1,
        }
    }

    pub(crate) fn merge(&mut self, other: &PassReport) {
        self.executed += other.executed;
        self.rejected_structural += other.rejected_structural;
        self.rejected_predicate += other.rejected_predicate;
        self.stale += other.stale;
        self.requeued += other.requeued;
        self.lock_deferrals += other.lock_deferrals;
        self.stopped_early |= other.stopped_early;
    }
}

pub type PriorityFn<S> = Box<dyn Fn(&Mesh<S>, OperationKind, &Tuple) -> f64 + Send + Sync>;
pub type FreshnessFn<S> = Box<dyn Fn(&Mesh<S>, &Descriptor) -> bool + Send + Sync>;
pub type RenewFn<S> = Box<dyn Fn(&Mesh<S>, OperationKind, &[Tuple]) -> Vec<(OperationKind, Tuple)> + Send + Sync>;
pub type LockFn<S> = Box<dyn Fn(&Mesh<S>, &Tuple, &mut LockGuard<'_>) -> bool + Send + Sync>;
pub type StopFn<S> = Box<dyn Fn(&Mesh<S>) -> bool + Send + Sync>;

/// Hooks plus scheduling callbacks for one batch of edits.
pub struct ExecutePass<S: CellShape, H> {
    pub hooks: H,
    pub priority: PriorityFn<S>,
    pub is_weight_up_to_date: FreshnessFn<S>,
    pub renew_neighbor_tuples: RenewFn<S>,
    pub lock_vertices: LockFn<S>,
    pub stopping_criterion: Option<StopFn<S>>,
    pub stopping_criterion_checking_frequency: usize,
    pub config: ExecutorConfig,
}

impl<S: CellShape, H: EditHooks<S> + Sync> ExecutePass<S, H> {
    /// Pass with the given hooks and default callbacks: zero priority, never
    /// stale, no renewal, two-ring locking, no early stop.
    pub fn new(hooks: H) -> Self {
        Self {
            hooks,
            priority: Box::new(|_, _, _| 0.0),
            is_weight_up_to_date: Box::new(|_, _| true),
            renew_neighbor_tuples: Box::new(|_, _, _| Vec::new()),
            lock_vertices: Box::new(lock_two_ring::<S>),
            stopping_criterion: None,
            stopping_criterion_checking_frequency: 100,
            config: ExecutorConfig::default(),
        }
    }

    pub fn with_priority(mut self, f: impl Fn(&Mesh<S>, OperationKind, &Tuple) -> f64 + Send + Sync + 'static) -> Self {
        self.priority = Box::new(f);
        self
    }

    pub fn with_freshness(mut self, f: impl Fn(&Mesh<S>, &Descriptor) -> bool + Send + Sync + 'static) -> Self {
        self.is_weight_up_to_date = Box::new(f);
        self
    }

    pub fn with_renewal(
        mut self,
        f: impl Fn(&Mesh<S>, OperationKind, &[Tuple]) -> Vec<(OperationKind, Tuple)> + Send + Sync + 'static,
    ) -> Self {
        self.renew_neighbor_tuples = Box::new(f);
        self
    }

    pub fn with_lock(
        mut self,
        f: impl Fn(&Mesh<S>, &Tuple, &mut LockGuard<'_>) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.lock_vertices = Box::new(f);
        self
    }

    /// Stop once `f` holds, checking before the first pop and then after
    /// every `frequency` popped operations, whatever their outcome.
    pub fn with_stopping_criterion(
        mut self,
        f: impl Fn(&Mesh<S>) -> bool + Send + Sync + 'static,
        frequency: usize,
    ) -> Self {
        self.stopping_criterion = Some(Box::new(f));
        self.stopping_criterion_checking_frequency = frequency.max(1);
        self
    }

    pub fn with_config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    /// Descriptor for `(kind, t)` with its current priority.
    pub fn descriptor(&self, mesh: &Mesh<S>, kind: OperationKind, t: Tuple) -> Descriptor {
        Descriptor {
            kind,
            tuple: t,
            priority: (self.priority)(mesh, kind, &t),
        }
    }

    /// Whether the stopping criterion is due after `iterations` pops and
    /// holds.
    pub(crate) fn should_stop(&self, mesh: &Mesh<S>, iterations: usize) -> bool {
        let Some(stop) = &self.stopping_criterion else {
            return false;
        };
        let every = self.stopping_criterion_checking_frequency.max(1);
        iterations % every == 0 && stop(mesh)
    }

    /// Whether the criterion holds right now, ignoring the frequency.
    pub(crate) fn criterion_holds(&self, mesh: &Mesh<S>) -> bool {
        self.stopping_criterion.as_ref().is_some_and(|stop| stop(mesh))
    }

    /// Apply `ops` and every operation their renewals produce.
    ///
    /// # Errors
    /// [`MeshEditError::ZeroPartitions`] for a partitioned policy with no
    /// parts, [`MeshEditError::ThreadPool`] when the worker pool cannot be
    /// built. Refused edits are counted in the report, never returned.
    pub fn run(&self, mesh: &mut Mesh<S>, ops: Vec<(OperationKind, Tuple)>) -> Result<PassReport, MeshEditError> {
        let descs: Vec<Descriptor> = ops
            .into_iter()
            .map(|(k, t)| self.descriptor(mesh, k, t))
            .collect();
        let report = match self.config.policy {
            ExecutionPolicy::Sequential => {
                let mut report = PassReport::default();
                sequential::run_sequential(self, mesh, descs, &mut report);
                report
            }
            ExecutionPolicy::Partitioned { parts } => parallel::run_partitioned(self, mesh, descs, parts)?,
        };
        log::debug!("{:?} run finished: {:?}", self.config.policy, report);
        Ok(report)
    }
}
