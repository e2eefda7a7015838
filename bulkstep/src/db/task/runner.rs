//! The superstep loop.
//!
//! [`Job::run`] drives a [`VertexProgram`] over a [`GraphStore`]:
//!
//! 1. every partition computes its active vertices in parallel, reading the
//!    sealed inboxes of the current superstep and writing its own outbox;
//! 2. the barrier shuffles the outboxes into the inboxes of the next
//!    superstep and the counter moves on;
//! 3. the loop ends once no vertex is active and no message is pending, or
//!    when the superstep limit is hit;
//! 4. every vertex runs cleanup and the records it writes are collected.
//!
//! Any error stops the job at the superstep it happened in.

use crate::{
    core::{
        state::{combiner::Combiner, router::MessageBuffers},
        storage::GraphStore,
        utils::errors::BspError,
    },
    db::task::{
        custom_pool,
        executor::{cleanup_partition, PartitionStats, Superstep},
        pool,
        program::VertexProgram,
    },
    io::GraphWriter,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Instant,
};
use tracing::{debug, info, warn};

/// Execution options of a job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobConfig {
    /// Size of a dedicated thread pool. Uses the shared pool when unset.
    pub num_threads: Option<usize>,
    /// Stops the job after this many supersteps even if it has not converged.
    pub max_supersteps: Option<usize>,
}

/// Cancels a running job. Checked between supersteps only, so a superstep
/// that has started always runs to its barrier.
#[derive(Debug, Clone, Default)]
pub struct CancellationHandle(Arc<AtomicBool>);

impl CancellationHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Counters of one superstep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuperstepStats {
    pub superstep: usize,
    /// vertices that ran compute
    pub computed: usize,
    /// vertices that did not vote to halt
    pub active: usize,
    /// messages sent, before combining
    pub messages_sent: usize,
    /// messages waiting for the next superstep, after combining
    pub messages_delivered: usize,
}

#[derive(Debug)]
pub struct JobResult<Id, V, E, O> {
    /// Number of supersteps that ran.
    pub supersteps: usize,
    /// False when the job stopped at its superstep limit.
    pub converged: bool,
    pub stats: Vec<SuperstepStats>,
    /// The graph with its final vertex values.
    pub graph: GraphStore<Id, V, E>,
    /// Records written during cleanup, partition by partition.
    pub output: Vec<O>,
}

impl<Id, V, E, O> JobResult<Id, V, E, O> {
    pub fn messages_sent(&self) -> usize {
        self.stats.iter().map(|s| s.messages_sent).sum()
    }

    pub fn messages_delivered(&self) -> usize {
        self.stats.iter().map(|s| s.messages_delivered).sum()
    }
}

pub type ProgramResult<P, O> = JobResult<
    <P as VertexProgram>::Id,
    <P as VertexProgram>::Value,
    <P as VertexProgram>::EdgeValue,
    O,
>;

pub type ProgramGraph<P> = GraphStore<
    <P as VertexProgram>::Id,
    <P as VertexProgram>::Value,
    <P as VertexProgram>::EdgeValue,
>;

pub struct Job<P: VertexProgram> {
    program: P,
    combiner: Option<Box<dyn Combiner<P::Id, P::Message>>>,
    config: JobConfig,
    cancellation: CancellationHandle,
}

impl<P: VertexProgram> Job<P> {
    pub fn new(program: P) -> Self {
        Self {
            program,
            combiner: None,
            config: JobConfig::default(),
            cancellation: CancellationHandle::default(),
        }
    }

    pub fn with_combiner<C>(mut self, combiner: C) -> Self
    where
        C: Combiner<P::Id, P::Message> + 'static,
    {
        self.combiner = Some(Box::new(combiner));
        self
    }

    /// Sets or clears the combiner when it is only known at runtime.
    pub fn with_boxed_combiner(
        mut self,
        combiner: Option<Box<dyn Combiner<P::Id, P::Message>>>,
    ) -> Self {
        self.combiner = combiner;
        self
    }

    pub fn with_config(mut self, config: JobConfig) -> Self {
        self.config = config;
        self
    }

    pub fn num_threads(mut self, num_threads: usize) -> Self {
        self.config.num_threads = Some(num_threads);
        self
    }

    pub fn max_supersteps(mut self, max_supersteps: usize) -> Self {
        self.config.max_supersteps = Some(max_supersteps);
        self
    }

    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    pub fn cancellation_handle(&self) -> CancellationHandle {
        self.cancellation.clone()
    }

    /// Lets the job be cancelled through an existing handle.
    pub fn with_cancellation(mut self, handle: CancellationHandle) -> Self {
        self.cancellation = handle;
        self
    }

    /// Runs the job to completion and returns the final graph together with
    /// the records `writer` produced during cleanup.
    pub fn run<W>(
        self,
        mut graph: ProgramGraph<P>,
        writer: &W,
    ) -> Result<ProgramResult<P, W::Output>, BspError>
    where
        W: GraphWriter<P::Id, P::Value>,
    {
        let Job {
            program,
            combiner,
            config,
            cancellation,
        } = self;

        let pool = match config.num_threads {
            Some(n_threads) => custom_pool(n_threads)?,
            None => pool()?,
        };

        let total_num_vertices = graph.num_vertices();
        let total_num_edges = graph.num_edges();
        info!(
            vertices = total_num_vertices,
            edges = total_num_edges,
            partitions = graph.num_partitions(),
            threads = pool.current_num_threads(),
            combiner = combiner.is_some(),
            "Starting job"
        );
        let start = Instant::now();

        // a graph that already went through a job may hold halted vertices
        graph.activate_all();
        let mut buffers = MessageBuffers::new(graph.partitions(), combiner);
        let mut stats: Vec<SuperstepStats> = vec![];
        let mut superstep = 0;
        let mut converged = false;

        loop {
            if cancellation.is_cancelled() {
                warn!(superstep, "Job cancelled");
                return Err(BspError::Cancelled { superstep });
            }
            if config.max_supersteps.is_some_and(|max| superstep >= max) {
                warn!(
                    superstep,
                    pending = buffers.pending(),
                    "Superstep limit reached before the job converged"
                );
                break;
            }

            let (layout, partitions) = graph.split_mut();
            let (inboxes, outboxes) = buffers.split_mut();
            let step = Superstep {
                superstep,
                program: &program,
                layout,
                total_num_vertices,
                total_num_edges,
            };
            let partition_stats = pool.install(|| {
                partitions
                    .par_iter_mut()
                    .zip(inboxes.as_slice().par_iter())
                    .zip(outboxes.par_iter_mut())
                    .map(|((partition, inbox), outbox)| {
                        step.compute_partition(partition, inbox, outbox)
                    })
                    .collect::<Result<Vec<PartitionStats>, BspError>>()
            })?;

            let messages_sent = pool.install(|| buffers.barrier(superstep, graph.partitions()))?;

            let step_stats = SuperstepStats {
                superstep,
                computed: partition_stats.iter().map(|s| s.computed).sum(),
                active: partition_stats.iter().map(|s| s.active).sum(),
                messages_sent,
                messages_delivered: buffers.pending(),
            };
            debug!(
                superstep,
                computed = step_stats.computed,
                active = step_stats.active,
                sent = step_stats.messages_sent,
                delivered = step_stats.messages_delivered,
                "Superstep done"
            );
            stats.push(step_stats);
            superstep += 1;

            if step_stats.active == 0 && step_stats.messages_delivered == 0 {
                converged = true;
                break;
            }
        }

        let last = superstep.saturating_sub(1);
        let output = pool
            .install(|| {
                graph
                    .partitions()
                    .par_iter()
                    .map(|partition| cleanup_partition(&program, last, partition, writer))
                    .collect::<Result<Vec<_>, BspError>>()
            })?
            .into_iter()
            .flatten()
            .collect();

        info!(
            supersteps = superstep,
            converged,
            "Job finished in {:?}",
            start.elapsed()
        );

        Ok(JobResult {
            supersteps: superstep,
            converged,
            stats,
            graph,
            output,
        })
    }
}
