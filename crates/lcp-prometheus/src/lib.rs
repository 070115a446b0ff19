//! Prometheus metrics backend for multi-tile runs.
//!
//! [`PrometheusMetrics`] implements [`lcp_core::MetricsBackend`] on its own
//! [`Registry`]; inject it with [`lcp_core::MultiTileRun::with_metrics`].
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use lcp_core::{MultiTileRun, SolverConfig};
//! use lcp_prometheus::PrometheusMetrics;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let metrics = PrometheusMetrics::new()?;
//! let run = MultiTileRun::new(SolverConfig::new("python"))
//!     .with_metrics(Arc::new(metrics.clone()));
//!
//! // After the run:
//! let text = metrics.render()?;
//! # let _ = (run, text);
//! # Ok(())
//! # }
//! ```
//!
//! ## Metrics
//! - `lcp_tasks_submitted_total{kind}` - Counter
//! - `lcp_tasks_completed_total{outcome}` - Counter
//! - `lcp_task_duration_seconds` - Histogram, submit to consume
//! - `lcp_changed_cells_total` - Counter
//! - `lcp_waiting_updates` - Gauge
//! - `lcp_stalls_total` - Counter
//!
//! No HTTP endpoint is provided; serve [`PrometheusMetrics::gather`] with
//! whatever the host application already runs.

mod backend;
pub use backend::{MetricsError, PrometheusMetrics};

pub use prometheus::{Encoder, Registry, TextEncoder};
