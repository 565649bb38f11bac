//! Single-queue execution.

use crate::operations::EditHooks;
use crate::scheduler::queue::OperationQueue;
use crate::scheduler::{Descriptor, ExecutePass, PassReport};
use crate::topology::mesh::Mesh;
use crate::topology::simplex::CellShape;

/// Pop, validate and execute until the queue is empty or the stopping
/// criterion holds. Every pop counts as one iteration toward the checking
/// frequency, stale and refused ones included.
///
/// A descriptor whose priority is out of date goes back in with its fresh
/// priority instead of executing. If the refreshed priority equals the one it
/// was queued with, the descriptor runs anyway so a freshness predicate that
/// never agrees cannot spin forever.
pub(crate) fn run_sequential<S, H>(
    pass: &ExecutePass<S, H>,
    mesh: &mut Mesh<S>,
    ops: Vec<Descriptor>,
    report: &mut PassReport,
) where
    S: CellShape,
    H: EditHooks<S> + Sync,
{
    let mut queue = OperationQueue::new();
    queue.extend(ops);
    report.passes += 1;
    let mut iterations = 0usize;

    loop {
        if pass.should_stop(mesh, iterations) {
            report.stopped_early = true;
            log::debug!("stopping criterion met after {iterations} iterations, {} queued", queue.len());
            break;
        }
        let Some(d) = queue.pop() else {
            break;
        };
        iterations += 1;
        if !mesh.is_valid(&d.tuple) {
            report.stale += 1;
            continue;
        }
        if !(pass.is_weight_up_to_date)(mesh, &d) {
            let fresh = pass.descriptor(mesh, d.kind, d.tuple);
            if fresh.priority.total_cmp(&d.priority).is_ne() {
                report.requeued += 1;
                queue.push(fresh);
                continue;
            }
        }
        match mesh.execute(d.kind, &d.tuple, &pass.hooks) {
            Ok(applied) => {
                report.executed += 1;
                let renewed = (pass.renew_neighbor_tuples)(mesh, d.kind, &applied.affected);
                queue.extend(renewed.into_iter().map(|(k, t)| pass.descriptor(mesh, k, t)));
            }
            Err(r) => {
                log::trace!("{:?} at {:?} refused: {r}", d.kind, d.tuple);
                report.record(r);
            }
        }
    }
}
