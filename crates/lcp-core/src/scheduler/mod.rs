//! The multi-tile relaxation loop.
//!
//! Every tile gets one startup pass. When a pass reports that one of its
//! edges changed, the neighbour on that edge is recomputed with the new
//! boundary vector; if the neighbour is busy the update is parked and
//! replayed when it finishes. At most one task per tile is ever in flight.
//! The loop ends when the queue drains, when it stops delivering for
//! `stall_limit` consecutive polls, or when the cancel token fires.

mod config;
pub use config::{CoalescePolicy, DEFAULT_POLL_TIMEOUT, DEFAULT_STALL_LIMIT, SchedulerConfig};


use std::{path::Path, time::Instant};

use lcp_model::{BoundaryUpdate, RunOutcome, Side, TaskId, TaskOutcome, TileKey};
use thiserror::Error;
use tracing::{debug, error, info, instrument, trace, warn};

use crate::{
    builder::{BuildError, TaskArtifacts, TaskBuilder, TileTask},
    codec,
    metrics::{MetricsHandle, noop_metrics},
    queue::{Completion, QueueError, WorkQueue},
    report::RunSummary,
    state::ScheduleState,
};

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("task {task} completed for tile {key}, which was not running under it")]
    RunningSetInvariantViolation { key: TileKey, task: TaskId },
    #[error("completion for unknown task {0}")]
    UnknownTask(TaskId),
    #[error("tile {key} already runs task {running}; refused task {submitted}")]
    AlreadyRunning {
        key: TileKey,
        running: TaskId,
        submitted: TaskId,
    },
    #[error("task build failed: {0}")]
    Build(#[from] BuildError),
    #[error("queue failure: {0}")]
    Queue(#[from] QueueError),
}

pub struct Scheduler<Q> {
    config: SchedulerConfig,
    builder: TaskBuilder,
    queue: Q,
    state: ScheduleState,
    summary: RunSummary,
    metrics: MetricsHandle,
    next_id: TaskId,
}

impl<Q: WorkQueue> Scheduler<Q> {
    pub fn new(config: SchedulerConfig, builder: TaskBuilder, queue: Q) -> Self {
        Self {
            config,
            builder,
            queue,
            state: ScheduleState::new(),
            summary: RunSummary::new(),
            metrics: noop_metrics(),
            next_id: TaskId::FIRST,
        }
    }

    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.metrics = metrics;
        self
    }

    /// Drive the run to completion.
    ///
    /// The summary is finalised on every exit path, including errors; read it
    /// through [`Scheduler::summary`] afterwards.
    #[instrument(level = "info", skip(self), fields(queue = self.queue.name(), tiles = self.builder.index().len()))]
    pub async fn run(&mut self) -> Result<RunOutcome, SchedulerError> {
        let started = Instant::now();
        info!("multi-tile run starting");

        let result = match self.submit_startup_tasks().await {
            Ok(()) => self.poll_loop().await,
            Err(e) => Err(e),
        };
        let outcome = match &result {
            Ok(outcome) => *outcome,
            Err(e) => {
                error!(error = %e, "run aborted");
                self.summary.abort_reason = Some(e.to_string());
                RunOutcome::Aborted
            }
        };

        let abandoned = self.state.in_flight_ids();
        if !abandoned.is_empty() {
            warn!(count = abandoned.len(), "abandoning in-flight tasks");
        }
        self.summary.finish(outcome, started.elapsed(), abandoned);

        info!(
            ?outcome,
            tasks = self.summary.tasks.len(),
            changed_cells = self.summary.total_changed_cells,
            elapsed_secs = self.summary.elapsed_secs,
            "multi-tile run finished"
        );
        result
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    pub fn into_summary(self) -> RunSummary {
        self.summary
    }

    pub fn state(&self) -> &ScheduleState {
        &self.state
    }

    pub fn queue(&self) -> &Q {
        &self.queue
    }

    pub fn builder(&self) -> &TaskBuilder {
        &self.builder
    }

    async fn submit_startup_tasks(&mut self) -> Result<(), SchedulerError> {
        let keys: Vec<TileKey> = self.builder.index().records().map(|r| r.key).collect();
        for key in &keys {
            if self.state.is_running(key) {
                debug!(tile = %key, "tile already registered");
                continue;
            }
            let task = self.builder.startup(*key, self.next_id)?;
            self.submit(task).await?;
        }
        info!(tiles = keys.len(), "startup tasks submitted");
        Ok(())
    }

    async fn poll_loop(&mut self) -> Result<RunOutcome, SchedulerError> {
        let cancel = self.config.cancel.clone();
        let timeout = self.config.poll_timeout;
        let stall_limit = self.config.stall_limit.max(1);
        let mut idle: u32 = 0;

        loop {
            if self.queue.is_empty() {
                if self.state.running_len() > 0 {
                    warn!(
                        running = self.state.running_len(),
                        "queue reports empty while tiles are still marked running"
                    );
                }
                return Ok(RunOutcome::Settled);
            }
            if idle >= stall_limit {
                warn!(
                    idle,
                    window = ?self.config.stall_window(),
                    running = self.state.running_len(),
                    "queue stopped delivering; run stalled"
                );
                self.metrics.record_stall();
                return Ok(RunOutcome::Stalled);
            }

            let polled = match &cancel {
                Some(token) => tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        info!("run cancelled");
                        return Ok(RunOutcome::Cancelled);
                    }
                    polled = self.queue.poll_one(timeout) => polled,
                },
                None => self.queue.poll_one(timeout).await,
            };

            match polled? {
                Some(completion) => {
                    idle = 0;
                    self.handle_completion(completion).await?;
                }
                None => {
                    idle += 1;
                    trace!(idle, "empty poll");
                }
            }
        }
    }

    /// Consume one delivered task: retire its tile, replay parked updates,
    /// and relay every changed edge to the neighbour behind it.
    #[instrument(level = "debug", skip(self, completion), fields(task_id = %completion.task_id))]
    async fn handle_completion(&mut self, completion: Completion) -> Result<(), SchedulerError> {
        let id = completion.task_id;
        let flight = self.state.retire(id)?;
        let key = flight.key;
        debug!(
            tile = %key,
            kind = flight.kind,
            handle = %completion.handle,
            exit_code = ?completion.exit_code,
            "task delivered"
        );

        let artifacts = TaskArtifacts::for_task(&self.builder.config().output_dir, id);
        self.collect_error_artifact(id, key, &artifacts.error).await;

        let decoded = match codec::read_summary(&artifacts.summary).await {
            Ok(summary) => {
                if summary.key().ok() != Some(key) {
                    warn!(
                        tile = %key,
                        min_x = summary.min_x,
                        min_y = summary.min_y,
                        "summary extent does not match the submitted tile"
                    );
                }
                debug!(tile = %key, changed_cells = summary.changed_cells, "summary decoded");
                self.summary.record_decoded(id, key, &summary);
                self.metrics.record_changed_cells(summary.changed_cells);
                self.metrics
                    .record_task_completed(TaskOutcome::Decoded, flight.submitted_at.elapsed());
                Some(summary)
            }
            Err(e) => {
                warn!(
                    tile = %key,
                    error = %e,
                    "tile retired without fan-out; its boundary changes are dropped"
                );
                self.summary.record_corrupt(id, key);
                self.metrics
                    .record_task_completed(TaskOutcome::CorruptSummary, flight.submitted_at.elapsed());
                None
            }
        };

        self.replay_parked(key).await?;

        if let Some(summary) = decoded {
            for side in summary.changed_sides() {
                self.relay(key, side, id, &artifacts).await?;
            }
        }
        self.metrics.record_waiting(self.state.waiting_total());
        Ok(())
    }

    /// Resubmit `key` if updates arrived while it was running.
    async fn replay_parked(&mut self, key: TileKey) -> Result<(), SchedulerError> {
        let updates = self.state.take_pending(&key, self.config.coalesce);
        if updates.is_empty() {
            return Ok(());
        }
        debug!(
            tile = %key,
            sides = ?updates.iter().map(|u| u.side).collect::<Vec<_>>(),
            still_parked = self.state.pending(&key),
            "replaying parked updates"
        );
        let task = self.builder.connected(key, self.next_id, updates)?;
        self.submit(task).await
    }

    /// Deliver the edge `side` of `from` (changed by task `source`) to its neighbour.
    async fn relay(
        &mut self,
        from: TileKey,
        side: Side,
        source: TaskId,
        artifacts: &TaskArtifacts,
    ) -> Result<(), SchedulerError> {
        let target = self
            .builder
            .index()
            .neighbor(from, side, self.builder.tile_size());
        let update = BoundaryUpdate::new(side.opposite(), artifacts.vector(side), source);

        if self.state.is_running(&target) {
            debug!(tile = %target, side = ?update.side, "neighbour running; update parked");
            self.state.enqueue(target, update);
            return Ok(());
        }

        match self.builder.connected(target, self.next_id, vec![update]) {
            Ok(task) => self.submit(task).await,
            Err(BuildError::NoSuchTile(_)) => {
                trace!(tile = %from, ?side, "edge of surface; nothing to relay");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn submit(&mut self, task: TileTask) -> Result<(), SchedulerError> {
        if let Some(running) = self.state.running_task(&task.key) {
            return Err(SchedulerError::AlreadyRunning {
                key: task.key,
                running,
                submitted: task.id,
            });
        }

        let handle = self.queue.submit(&task).await?;
        let kind = task.kind.kind();
        self.state.mark_running(task.key, task.id, kind)?;
        self.next_id = task.id.next();
        self.summary.record_submitted();
        self.metrics.record_task_submitted(kind);

        debug!(
            task_id = %task.id,
            tile = %task.key,
            kind,
            %handle,
            updates = task.kind.updates().len(),
            "task submitted"
        );
        Ok(())
    }

    async fn collect_error_artifact(&mut self, id: TaskId, key: TileKey, path: &Path) {
        match tokio::fs::read_to_string(path).await {
            Ok(message) => {
                warn!(task_id = %id, tile = %key, %message, "task left an error artifact");
                self.summary.record_error(id, Some(key), message);
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(task_id = %id, path = %path.display(), error = %e, "unreadable error artifact");
                self.summary
                    .record_error(id, Some(key), format!("unreadable error artifact: {e}"));
            }
        }
    }
}
