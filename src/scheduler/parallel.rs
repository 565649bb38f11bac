//! Partitioned parallel execution.
//!
//! The vertex set is partitioned once. Every round, each part copies out
//! its region (see [`region`](super::region)) and a rayon task works the
//! descriptors whose tuple vertex it owns against that copy, with exclusive
//! access and no shared state. An edit runs only when its whole vertex lock
//! set lies in the part: the closed one-rings of the edge's endpoints and
//! whatever the pass's lock callback asks for. Everything else waits for the
//! next round. Regions are then written back one after the other.
//!
//! The stopping criterion is checked on the whole mesh between rounds; with
//! a criterion set, each worker pops at most `frequency` descriptors per
//! round. After `max_passes` full rounds, or a round that commits nothing,
//! leftovers drain through the sequential policy.

use crate::mesh_error::MeshEditError;
use crate::operations::{EditHooks, Rejection};
use crate::partitioning::{MeshGraph, PartitionerConfig, edge_cut, partition};
use crate::scheduler::locks::edit_footprint;
use crate::scheduler::queue::OperationQueue;
use crate::scheduler::region::Region;
use crate::scheduler::{Descriptor, ExecutePass, PassReport, sequential};
use crate::topology::mesh::Mesh;
use crate::topology::simplex::CellShape;
use rayon::iter::{IndexedParallelIterator, IntoParallelRefMutIterator, ParallelIterator};

#[derive(Default)]
struct WorkerOutcome {
    report: PassReport,
    /// Local descriptors for the next round.
    deferred: Vec<Descriptor>,
    /// The worker ran out of budget with work still queued.
    truncated: bool,
}

/// Split `descs` by the owner of their tuple vertex, translated into each
/// region's ids. Returns the buckets and the number of stale descriptors.
fn route<S: CellShape>(
    mesh: &Mesh<S>,
    owners: &[usize],
    regions: &[Region<S>],
    descs: Vec<Descriptor>,
) -> (Vec<Vec<Descriptor>>, usize) {
    let mut buckets = vec![Vec::new(); regions.len()];
    let mut stale = 0;
    for d in descs {
        let local = mesh
            .is_valid(&d.tuple)
            .then(|| owners.get(d.tuple.vid()).copied().unwrap_or(0).min(regions.len() - 1))
            .and_then(|p| Some((p, regions[p].to_local(&d.tuple)?)));
        match local {
            Some((p, tuple)) => buckets[p].push(Descriptor { tuple, ..d }),
            None => stale += 1,
        }
    }
    (buckets, stale)
}

fn work<S, H>(pass: &ExecutePass<S, H>, region: &mut Region<S>, bucket: Vec<Descriptor>, budget: Option<usize>) -> WorkerOutcome
where
    S: CellShape,
    H: EditHooks<S> + Sync,
{
    let mut queue = OperationQueue::new();
    queue.extend(bucket);
    let mut out = WorkerOutcome::default();
    let mut iterations = 0usize;

    while let Some(d) = queue.pop() {
        iterations += 1;
        let mesh = &region.mesh;
        if !mesh.is_valid(&d.tuple) {
            out.report.stale += 1;
        } else if !(pass.is_weight_up_to_date)(mesh, &d)
            && pass.descriptor(mesh, d.kind, d.tuple).priority.total_cmp(&d.priority).is_ne()
        {
            out.report.requeued += 1;
            queue.push(pass.descriptor(mesh, d.kind, d.tuple));
        } else if !edit_footprint(mesh, &d.tuple).is_some_and(|vs| vs.iter().all(|&v| region.locks.is_lockable(v)))
            || !(pass.lock_vertices)(mesh, &d.tuple, &mut region.locks.guard())
        {
            out.report.record(Rejection::LockUnavailable);
            out.deferred.push(d);
        } else {
            match region.mesh.execute(d.kind, &d.tuple, &pass.hooks) {
                Ok(applied) => {
                    out.report.executed += 1;
                    region.locks.ensure(region.mesh.vertex_capacity());
                    let renewed = (pass.renew_neighbor_tuples)(&region.mesh, d.kind, &applied.affected);
                    for (kind, t) in renewed {
                        let desc = pass.descriptor(&region.mesh, kind, t);
                        if region.owns(t.vid()) {
                            queue.push(desc);
                        } else {
                            out.deferred.push(desc);
                        }
                    }
                }
                Err(r) => {
                    log::trace!("part {}: {:?} at {:?} refused: {r}", region.part, d.kind, d.tuple);
                    out.report.record(r);
                }
            }
        }
        if budget.is_some_and(|b| iterations >= b) && !queue.is_empty() {
            out.truncated = true;
            out.deferred.extend(queue.drain_sorted());
            break;
        }
    }
    out
}

pub(crate) fn run_partitioned<S, H>(
    pass: &ExecutePass<S, H>,
    mesh: &mut Mesh<S>,
    descs: Vec<Descriptor>,
    parts: usize,
) -> Result<PassReport, MeshEditError>
where
    S: CellShape,
    H: EditHooks<S> + Sync,
{
    if parts == 0 {
        return Err(MeshEditError::ZeroPartitions);
    }
    let graph = MeshGraph::from_mesh(mesh);
    let pcfg = PartitionerConfig {
        n_parts: parts,
        rng_seed: pass.config.partition_seed,
        ..Default::default()
    };
    let pm = partition(&graph, graph.capacity(), &pcfg)?;
    log::debug!(
        "partitioned {} vertex slots into {parts} parts, edge cut {}",
        graph.capacity(),
        edge_cut(&graph, &pm)
    );
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(pass.config.num_threads)
        .build()
        .map_err(|e| MeshEditError::ThreadPool(e.to_string()))?;

    let mut owners: Vec<usize> = (0..mesh.vertex_capacity())
        .map(|v| pm.part_of(v).unwrap_or(0).min(parts - 1))
        .collect();
    let budget = pass
        .stopping_criterion
        .as_ref()
        .map(|_| pass.stopping_criterion_checking_frequency.max(1));
    let mut report = PassReport::default();
    let mut pending = descs;
    let mut full_rounds = 0;

    while full_rounds < pass.config.max_passes.max(1) && !pending.is_empty() {
        if pass.criterion_holds(mesh) {
            report.stopped_early = true;
            log::debug!("stopping criterion met after {} rounds, {} queued", report.passes, pending.len());
            break;
        }
        let mut regions = (0..parts)
            .map(|p| Region::extract(mesh, &owners, p))
            .collect::<Result<Vec<_>, _>>()?;
        let (buckets, stale) = route(mesh, &owners, &regions, std::mem::take(&mut pending));
        report.stale += stale;

        let outcomes: Vec<WorkerOutcome> = pool.install(|| {
            regions
                .par_iter_mut()
                .zip(buckets)
                .map(|(region, bucket)| work(pass, region, bucket, budget))
                .collect()
        });

        let executed_before = report.executed;
        let mut truncated = false;
        for (region, o) in regions.into_iter().zip(outcomes) {
            report.merge(&o.report);
            truncated |= o.truncated;
            let (back, stale) = region.merge_into(mesh, &mut owners, o.deferred);
            report.stale += stale;
            pending.extend(back);
        }
        crate::debug_invariants!(mesh.check_connectivity(), "partitioned round");
        report.passes += 1;
        if !truncated {
            full_rounds += 1;
        }
        log::debug!(
            "round {}: {} committed, {} carried over",
            report.passes,
            report.executed - executed_before,
            pending.len()
        );
        if report.executed == executed_before {
            break;
        }
    }

    if !pending.is_empty() && !report.stopped_early {
        log::debug!("draining {} deferred operations sequentially", pending.len());
        sequential::run_sequential(pass, mesh, pending, &mut report);
    }
    Ok(report)
}
