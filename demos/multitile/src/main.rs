use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use lcp_core::{
    CoalescePolicy, MultiTileRun, SchedulerConfig, SolverConfig,
    scheduler::{DEFAULT_POLL_TIMEOUT, DEFAULT_STALL_LIMIT},
};
use lcp_exec::{LocalQueue, LocalQueueConfig};
use lcp_observe::{LoggerConfig, LoggerFormat, LoggerTarget, logger_init};
use lcp_prometheus::PrometheusMetrics;

/// Least-cost paths across a surface split into square tiles.
#[derive(Debug, Parser)]
#[command(name = "multitile", version, about)]
struct Cli {
    /// Directory of input grids named `grid<minx>-<miny>-<maxx>-<maxy>.asc`.
    input_dir: PathBuf,
    /// Directory of cost grids, same file names as the input grids.
    cost_dir: PathBuf,
    /// Where the solver writes summaries, vectors and error files.
    output_dir: PathBuf,
    tile_size: f64,
    step_size: f64,
    /// Run report, overwritten if present.
    report: PathBuf,

    /// Solver executable.
    #[arg(long, default_value = "python3")]
    solver: String,
    /// Argument placed before the grid paths; repeatable.
    #[arg(long = "solver-arg", value_name = "ARG", allow_hyphen_values = true)]
    solver_args: Vec<String>,
    /// Flags passed to the solver unchanged.
    #[arg(
        long = "solver-flags",
        value_delimiter = ' ',
        allow_hyphen_values = true,
        default_value = "-g 1 -w 50"
    )]
    solver_flags: Vec<String>,

    /// Solver processes running at once.
    #[arg(long, default_value_t = 2)]
    workers: usize,
    #[arg(long, default_value_t = DEFAULT_POLL_TIMEOUT.as_millis() as u64)]
    poll_timeout_ms: u64,
    /// Consecutive empty polls before the run is declared stalled.
    #[arg(long, default_value_t = DEFAULT_STALL_LIMIT)]
    stall_limit: u32,
    /// Replay every parked side of a tile in one pass.
    #[arg(long)]
    merge_sides: bool,

    /// Also write the full run summary as JSON.
    #[arg(long)]
    json_report: Option<PathBuf>,
    /// Dump Prometheus metrics here after the run.
    #[arg(long)]
    metrics_out: Option<PathBuf>,

    #[arg(long, default_value = "text")]
    log_format: LoggerFormat,
    /// Log to stdout instead of stderr.
    #[arg(long)]
    log_stdout: bool,
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 1) Logger
    let mut log = LoggerConfig::default()
        .with_format(cli.log_format)
        .with_verbosity(cli.verbose);
    if cli.log_stdout {
        log = log.with_target(LoggerTarget::Stdout);
    }
    logger_init(&log)?;

    std::fs::create_dir_all(&cli.output_dir)
        .with_context(|| format!("creating {}", cli.output_dir.display()))?;

    // 2) Ctrl+C stops the scheduler and kills running solvers
    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received; stopping");
                cancel.cancel();
            }
        }
    });

    // 3) Orchestrator
    let solver = SolverConfig::new(cli.solver)
        .with_program_args(cli.solver_args)
        .with_dirs(&cli.input_dir, &cli.cost_dir, &cli.output_dir)
        .with_tile_size(cli.tile_size)
        .with_step_size(cli.step_size)
        .with_solver_flags(cli.solver_flags);
    let coalesce = if cli.merge_sides {
        CoalescePolicy::MergeBySide
    } else {
        CoalescePolicy::OneSidePerPass
    };
    let scheduler = SchedulerConfig::default()
        .with_poll_timeout(Duration::from_millis(cli.poll_timeout_ms))
        .with_stall_limit(cli.stall_limit)
        .with_coalesce(coalesce)
        .with_cancel(cancel.clone());

    let metrics = PrometheusMetrics::new()?;
    let mut run = MultiTileRun::new(solver)
        .with_scheduler(scheduler)
        .with_report(&cli.report)
        .with_metrics(Arc::new(metrics.clone()));
    if let Some(path) = &cli.json_report {
        run = run.with_json_report(path);
    }

    // 4) Local workers
    let queue = LocalQueue::new(
        LocalQueueConfig::default()
            .with_workers(cli.workers)
            .with_cancel(cancel.clone()),
    );
    info!(workers = cli.workers, input = %cli.input_dir.display(), "starting");

    let summary = run.execute(queue).await.context("multi-tile run failed")?;
    info!(
        outcome = ?summary.outcome,
        tasks = summary.tasks.len(),
        decode_failures = summary.decode_failures().count(),
        changed_cells = summary.total_changed_cells,
        elapsed_secs = summary.elapsed_secs,
        report = %cli.report.display(),
        "done"
    );
    if summary.stalled() {
        warn!("run stalled; the report holds partial results");
    }

    if let Some(path) = &cli.metrics_out {
        std::fs::write(path, metrics.render()?)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_arguments_follow_the_classic_order() {
        let cli = Cli::try_parse_from([
            "multitile", "in", "cost", "out", "10", "2.5", "run.txt",
        ])
        .unwrap();
        assert_eq!(cli.input_dir, PathBuf::from("in"));
        assert_eq!(cli.report, PathBuf::from("run.txt"));
        assert_eq!(cli.tile_size, 10.0);
        assert_eq!(cli.solver_flags, ["-g", "1", "-w", "50"]);
        assert_eq!(cli.workers, 2);
        assert_eq!(cli.stall_limit, DEFAULT_STALL_LIMIT);
        assert_eq!(cli.log_format, LoggerFormat::Text);
        assert!(!cli.log_stdout);
    }

    #[test]
    fn options_override_defaults() {
        let cli = Cli::try_parse_from([
            "multitile",
            "--solver-arg",
            "/opt/lcp/solve.py",
            "--solver-flags",
            "-g 2",
            "--workers",
            "8",
            "--merge-sides",
            "--log-format",
            "json",
            "--log-stdout",
            "-vv",
            "in",
            "cost",
            "out",
            "10",
            "1",
            "run.txt",
        ])
        .unwrap();
        assert_eq!(cli.solver_args, ["/opt/lcp/solve.py"]);
        assert_eq!(cli.solver_flags, ["-g", "2"]);
        assert_eq!(cli.workers, 8);
        assert!(cli.merge_sides);
        assert_eq!(cli.log_format, LoggerFormat::Json);
        assert!(cli.log_stdout);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn missing_positionals_are_rejected() {
        assert!(Cli::try_parse_from(["multitile", "in", "cost"]).is_err());
    }
}
