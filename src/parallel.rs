//! Independent replications spread across threads.
//!
//! Each replication gets its own [`Simulation`] and its own block of random numbers carved out of a base set of
//! [`Streams`] with [`Streams::substreams()`], so results do not depend on how replications are scheduled onto threads.
//! Replication `k` always draws from the `k`th substream; running it sequentially from that same substream gives
//! bit-identical output.

use crate::config::RunConfig;
use crate::context::SimulationContext;
use crate::rng::Streams;
use crate::simulation::{Model, ReplicationReport, Simulation};

use std::thread;
use tracing::{debug, info};

/// Summaries a worker produced, tagged with their replication index, or the first error it hit.
type WorkerOutcome<R> = Result<Vec<(usize, R)>, (usize, crate::Error)>;

/// Run `config.replications` replications on up to `threads` scoped threads and return one summary per replication,
/// ordered by replication index.
///
/// Every worker thread calls `build_model` once to register its instances in a fresh context, then runs its share of
/// replications on that simulation. Before replication `k` the context's streams are replaced with
/// `base.substreams(..)[k]`, i.e. `base` advanced by `k * spacing` draws. `summarize` is called right after each
/// replication terminates, exactly as in [`Simulation::replicate()`].
///
/// # Errors
///
/// Returns [`Error::InvalidConfig`] if `config` is invalid or `threads` is zero, and otherwise the error of the
/// lowest-numbered replication that failed. A panic on any worker is propagated to the caller once every worker has
/// stopped.
///
/// [`Error::InvalidConfig`]: crate::Error::InvalidConfig
pub fn replicate_parallel<M, R, B, S>(
    config: &RunConfig,
    base: &Streams,
    spacing: u64,
    threads: usize,
    build_model: B,
    summarize: S,
) -> crate::Result<Vec<R>>
where
    M: Model,
    R: Send,
    B: Fn(&mut SimulationContext<M::Event, M::Tag>) -> crate::Result<M> + Sync,
    S: Fn(&mut Simulation<M>, &ReplicationReport) -> R + Sync,
{
    config.validate()?;
    if threads == 0 {
        return Err(crate::Error::InvalidConfig("at least one thread is required".into()));
    }

    let replications = config.replications;
    let threads = threads.min(replications);
    let substreams = base.substreams(replications, spacing);
    info!(replications, threads, spacing, "starting parallel replications");

    let outcomes: Vec<WorkerOutcome<R>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..threads)
            .map(|worker| {
                let substreams = &substreams;
                let build_model = &build_model;
                let summarize = &summarize;
                scope.spawn(move || -> WorkerOutcome<R> {
                    let mut sim =
                        Simulation::<M>::build(config.clone(), build_model).map_err(|error| (worker, error))?;
                    let mut results = Vec::new();
                    for replication in (worker..replications).step_by(threads) {
                        sim.context_mut().replace_streams(substreams[replication].clone());
                        sim.set_next_replication(replication);
                        let report = sim.run_replication().map_err(|error| (replication, error))?;
                        results.push((replication, summarize(&mut sim, &report)));
                    }
                    debug!(worker, completed = results.len(), "worker finished");
                    Ok(results)
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or_else(|payload| std::panic::resume_unwind(payload)))
            .collect()
    });

    let mut indexed = Vec::with_capacity(replications);
    let mut first_error: Option<(usize, crate::Error)> = None;
    for outcome in outcomes {
        match outcome {
            Ok(results) => indexed.extend(results),
            Err((replication, error)) => {
                if first_error.as_ref().map_or(true, |(earliest, _)| replication < *earliest) {
                    first_error = Some((replication, error));
                }
            },
        }
    }
    if let Some((_, error)) = first_error {
        return Err(error);
    }

    indexed.sort_by_key(|&(replication, _)| replication);
    info!(replications, "parallel replications finished");
    Ok(indexed.into_iter().map(|(_, result)| result).collect())
}
