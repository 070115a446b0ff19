//! Seam between the scheduler and whatever actually runs solver processes.

use std::{fmt, time::Duration};

use async_trait::async_trait;
use lcp_model::TaskId;
use thiserror::Error;

use crate::builder::TileTask;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("submit failed for task {task}: {reason}")]
    Submit { task: TaskId, reason: String },
    #[error("poll failed: {0}")]
    Poll(String),
    #[error("queue is closed")]
    Closed,
}

/// Substrate-side identifier of a submitted task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueueHandle(pub u64);

impl fmt::Display for QueueHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A finished task handed back by the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// The tag the task was submitted with.
    pub task_id: TaskId,
    pub handle: QueueHandle,
    /// Process exit code when the substrate knows it.
    pub exit_code: Option<i32>,
}

impl Completion {
    pub fn new(task_id: TaskId, handle: QueueHandle) -> Self {
        Self {
            task_id,
            handle,
            exit_code: None,
        }
    }

    pub fn with_exit_code(mut self, code: i32) -> Self {
        self.exit_code = Some(code);
        self
    }
}

/// Execution substrate for tile tasks.
///
/// Completions may arrive in any order. The scheduler relies on nothing but
/// eventual delivery of every submitted task.
#[async_trait]
pub trait WorkQueue: Send {
    fn name(&self) -> &'static str;

    /// Hand `task` over for execution; its id is the tag reported back.
    async fn submit(&mut self, task: &TileTask) -> Result<QueueHandle, QueueError>;

    /// Wait at most `timeout` for one finished task.
    async fn poll_one(&mut self, timeout: Duration) -> Result<Option<Completion>, QueueError>;

    /// `true` once nothing is queued, running, or waiting to be polled.
    fn is_empty(&self) -> bool;
}
