//! Multi-tile orchestration of least-cost-path computations.
//!
//! A surface is split into tiles; every tile is solved by an external
//! single-tile solver running on some work queue. The [`Scheduler`] submits
//! one startup pass per tile and then relays changed boundaries between
//! neighbours until the queue drains or stops delivering.

pub mod builder;
pub use builder::{SolverCommand, SolverConfig, TaskArtifacts, TaskBuilder, TileTask};
pub mod codec;
pub mod error;
pub use error::CoreError;
pub mod index;
pub use index::TileIndex;
pub mod metrics;
pub use metrics::{MetricsBackend, MetricsHandle, NoopMetrics};
pub mod queue;
pub use queue::{Completion, QueueHandle, WorkQueue};
pub mod report;
pub use report::{ReportWriter, RunSummary};
mod run;
pub use run::MultiTileRun;
pub mod scheduler;
pub use scheduler::{CoalescePolicy, Scheduler, SchedulerConfig};
pub mod state;
pub use state::ScheduleState;
