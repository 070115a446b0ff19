//! [`WorkQueue`] backed by a bounded pool of local solver processes.

use std::{path::PathBuf, process::Stdio, sync::Arc, time::Duration};

use async_trait::async_trait;
use lcp_core::{Completion, QueueHandle, TileTask, WorkQueue, queue::QueueError};
use lcp_model::TaskId;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::{Semaphore, mpsc},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::{
    error::ExecError,
    limits::{RlimitConfig, attach_rlimits},
    util::{cmd_program, exit_code, kill_graceful},
};

#[derive(Clone, Debug)]
pub struct LocalQueueConfig {
    /// Solver processes allowed to run at once.
    pub workers: usize,
    pub env: Vec<(String, String)>,
    pub cwd: Option<PathBuf>,
    /// Log failed solver exits at warn level instead of debug.
    pub warn_on_non_zero: bool,
    /// Time between SIGTERM and SIGKILL when the queue shuts down.
    pub kill_grace: Duration,
    pub rlimits: RlimitConfig,
    /// Parent token; cancelling it kills every running solver.
    pub cancel: Option<CancellationToken>,
}

impl Default for LocalQueueConfig {
    fn default() -> Self {
        Self {
            workers: 2,
            env: Vec::new(),
            cwd: None,
            warn_on_non_zero: true,
            kill_grace: Duration::from_secs(2),
            rlimits: RlimitConfig::default(),
            cancel: None,
        }
    }
}

impl LocalQueueConfig {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn with_rlimits(mut self, rlimits: RlimitConfig) -> Self {
        self.rlimits = rlimits;
        self
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Runs every submitted task as a child process on this host.
///
/// At most `workers` solvers run at once; the rest wait for a slot in
/// submission order. Completions are delivered in finishing order. A solver
/// that fails still completes: the scheduler reads its artifacts either way.
pub struct LocalQueue {
    cfg: Arc<LocalQueueConfig>,
    slots: Arc<Semaphore>,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
    /// Submitted and not yet handed out by `poll_one`.
    outstanding: usize,
    next_handle: u64,
    cancel: CancellationToken,
}

impl LocalQueue {
    pub fn new(cfg: LocalQueueConfig) -> Self {
        let workers = cfg.workers.max(1);
        let cancel = cfg
            .cancel
            .as_ref()
            .map_or_else(CancellationToken::new, CancellationToken::child_token);
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            cfg: Arc::new(cfg),
            slots: Arc::new(Semaphore::new(workers)),
            tx,
            rx,
            outstanding: 0,
            next_handle: 0,
            cancel,
        }
    }

    /// Kill running solvers and drop queued ones. Nothing is delivered afterwards.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding
    }
}

impl Drop for LocalQueue {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[async_trait]
impl WorkQueue for LocalQueue {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn submit(&mut self, task: &TileTask) -> Result<QueueHandle, QueueError> {
        if task.command.program.is_empty() {
            return Err(QueueError::Submit {
                task: task.id,
                reason: ExecError::MissingProgram.to_string(),
            });
        }
        if self.cancel.is_cancelled() {
            return Err(QueueError::Closed);
        }

        self.next_handle += 1;
        let handle = QueueHandle(self.next_handle);
        self.outstanding += 1;

        let worker = Worker {
            id: task.id,
            handle,
            task: task.clone(),
            cfg: Arc::clone(&self.cfg),
            cancel: self.cancel.clone(),
        };
        let slots = Arc::clone(&self.slots);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let permit = tokio::select! {
                permit = slots.acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => return,
                },
                _ = worker.cancel.cancelled() => return,
            };
            let completion = worker.run().await;
            drop(permit);
            if let Some(completion) = completion {
                let _ = tx.send(completion);
            }
        });

        trace!(task_id = %task.id, %handle, "task queued locally");
        Ok(handle)
    }

    async fn poll_one(&mut self, timeout: Duration) -> Result<Option<Completion>, QueueError> {
        if self.outstanding == 0 {
            return Ok(None);
        }
        match tokio::time::timeout(timeout, self.rx.recv()).await {
            Ok(Some(completion)) => {
                self.outstanding -= 1;
                Ok(Some(completion))
            }
            Ok(None) => Err(QueueError::Closed),
            Err(_) => Ok(None),
        }
    }

    fn is_empty(&self) -> bool {
        self.outstanding == 0
    }
}

struct Worker {
    id: TaskId,
    handle: QueueHandle,
    task: TileTask,
    cfg: Arc<LocalQueueConfig>,
    cancel: CancellationToken,
}

impl Worker {
    /// `None` when cancelled; the completion is never delivered then.
    async fn run(&self) -> Option<Completion> {
        let completion = Completion::new(self.id, self.handle);
        match self.spawn_and_wait().await {
            Ok(0) => {
                debug!(task_id = %self.id, "solver exited cleanly");
                Some(completion.with_exit_code(0))
            }
            Ok(code) => {
                if self.cfg.warn_on_non_zero {
                    warn!(task_id = %self.id, tile = %self.task.key, code, "solver exited with failure");
                } else {
                    debug!(task_id = %self.id, code, "solver exited with failure");
                }
                Some(completion.with_exit_code(code))
            }
            Err(ExecError::Cancelled) => {
                debug!(task_id = %self.id, "solver cancelled");
                None
            }
            Err(e) => {
                warn!(task_id = %self.id, tile = %self.task.key, error = %e, "solver did not finish");
                Some(completion)
            }
        }
    }

    async fn spawn_and_wait(&self) -> Result<i32, ExecError> {
        let command = &self.task.command;
        trace!(target: "lcp.exec.local", program = %command.program, args = ?command.args, "spawn");

        let mut cmd = cmd_program(command);
        if let Some(cwd) = &self.cfg.cwd {
            cmd.current_dir(cwd);
        }
        for (k, v) in &self.cfg.env {
            cmd.env(k, v);
        }
        attach_rlimits(&mut cmd, &self.cfg.rlimits);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::inherit());
        cmd.kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| ExecError::Spawn(e.to_string()))?;

        let id = self.id;
        let reader = child.stdout.take().map(|stdout| {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stdout).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    trace!(target: "lcp.exec.solver", task_id = %id, %line);
                }
            })
        });

        tokio::select! {
            status = child.wait() => {
                let status = status?;
                if let Some(reader) = reader {
                    let _ = reader.await;
                }
                match exit_code(status) {
                    Ok(code) | Err(ExecError::NonZeroExit { code }) => Ok(code),
                    Err(e) => Err(e),
                }
            }
            _ = self.cancel.cancelled() => {
                kill_graceful(&mut child, self.cfg.kill_grace).await?;
                Err(ExecError::Cancelled)
            }
        }
    }
}
