use std::time::Duration;

use lcp_core::MetricsBackend;
use lcp_model::{CellCount, TaskOutcome};
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder, proto::MetricFamily,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus: {0}")]
    Prometheus(#[from] prometheus::Error),
    #[error("metrics text is not utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Solver passes run from seconds to tens of minutes.
const DURATION_BUCKETS: &[f64] = &[
    0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0, 600.0, 1800.0,
];

/// Prometheus-backed [`MetricsBackend`]. Clones share one registry.
#[derive(Clone)]
pub struct PrometheusMetrics {
    registry: Registry,
    submitted: IntCounterVec,
    completed: IntCounterVec,
    duration: Histogram,
    changed_cells: IntCounter,
    waiting: IntGauge,
    stalls: IntCounter,
}

impl PrometheusMetrics {
    pub fn new() -> Result<Self, MetricsError> {
        Self::with_registry(Registry::new())
    }

    /// Register the collectors on an existing registry.
    pub fn with_registry(registry: Registry) -> Result<Self, MetricsError> {
        let submitted = IntCounterVec::new(
            Opts::new("lcp_tasks_submitted_total", "Tile tasks handed to the queue"),
            &["kind"],
        )?;
        let completed = IntCounterVec::new(
            Opts::new("lcp_tasks_completed_total", "Tile tasks consumed by the scheduler"),
            &["outcome"],
        )?;
        let duration = Histogram::with_opts(
            HistogramOpts::new(
                "lcp_task_duration_seconds",
                "Time from submission to consumption of a tile task",
            )
            .buckets(DURATION_BUCKETS.to_vec()),
        )?;
        let changed_cells = IntCounter::new(
            "lcp_changed_cells_total",
            "Cells whose cost improved, summed over decoded summaries",
        )?;
        let waiting = IntGauge::new(
            "lcp_waiting_updates",
            "Boundary updates parked behind running tiles",
        )?;
        let stalls = IntCounter::new("lcp_stalls_total", "Runs that ended without settling")?;

        registry.register(Box::new(submitted.clone()))?;
        registry.register(Box::new(completed.clone()))?;
        registry.register(Box::new(duration.clone()))?;
        registry.register(Box::new(changed_cells.clone()))?;
        registry.register(Box::new(waiting.clone()))?;
        registry.register(Box::new(stalls.clone()))?;

        Ok(Self {
            registry,
            submitted,
            completed,
            duration,
            changed_cells,
            waiting,
            stalls,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Current values in the Prometheus text format.
    pub fn render(&self) -> Result<String, MetricsError> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.gather(), &mut buf)?;
        Ok(String::from_utf8(buf)?)
    }
}

impl MetricsBackend for PrometheusMetrics {
    fn record_task_submitted(&self, kind: &'static str) {
        self.submitted.with_label_values(&[kind]).inc();
    }

    fn record_task_completed(&self, outcome: TaskOutcome, duration: Duration) {
        self.completed.with_label_values(&[outcome.as_str()]).inc();
        self.duration.observe(duration.as_secs_f64());
    }

    fn record_changed_cells(&self, cells: CellCount) {
        self.changed_cells.inc_by(cells);
    }

    fn record_waiting(&self, depth: usize) {
        self.waiting.set(i64::try_from(depth).unwrap_or(i64::MAX));
    }

    fn record_stall(&self) {
        self.stalls.inc();
    }
}
