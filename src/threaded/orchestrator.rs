//! Runs one monitored parallel multiplication from start to finish.

use std::any::Any;
use std::io::{self, Write};
use std::panic;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use super::metrics::{MetricsSnapshot, WorkerMetrics};
use super::monitor::{Monitor, MonitorReport};
use super::signal::{ShutdownFlag, StartGate};
use super::worker::{RowKernel, Worker};
use crate::config::RunConfig;
use crate::error::{MatmulError, Result};
use crate::matrix::generate::generate_operands;
use crate::matrix::naive_ijk::{multiply_reference, row_product};
use crate::matrix::{Matrix, check_product_shapes};
use crate::partition::{WorkRange, available_cores, effective_thread_count, partition_rows};
use crate::platform;
use crate::report::{Baseline, Dimensions, RunSummary};

/// Operands, product and metrics of a finished run.
#[derive(Debug)]
pub struct RunOutcome {
    pub a: Matrix,
    pub b: Matrix,
    pub c: Matrix,
    pub summary: RunSummary,
}

/// Product plus metrics, without the operands.
#[derive(Debug)]
pub struct ParallelProduct<W> {
    pub c: Matrix,
    pub summary: RunSummary,
    pub ranges: Vec<WorkRange>,
    /// Final metrics of every worker, taken after all joins.
    pub snapshots: Vec<MetricsSnapshot>,
    pub monitor: MonitorReport<W>,
}

/// Generates the operands, runs the workers and the monitor, aggregates.
#[derive(Clone, Debug)]
pub struct Orchestrator {
    config: RunConfig,
    available: usize,
}

impl Orchestrator {
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            available: available_cores(),
        }
    }

    /// Overrides the detected core count.
    pub fn with_available_cores(mut self, available: usize) -> Self {
        self.available = available.max(1);
        self
    }

    /// Row ranges the run will use, one per worker.
    pub fn plan(&self) -> Result<Vec<WorkRange>> {
        let threads = effective_thread_count(self.config.threads, self.available, self.config.rows_a);
        partition_rows(self.config.rows_a, threads)
    }

    /// Full run with the live table on stdout.
    pub fn run(&self) -> Result<RunOutcome> {
        self.run_with_sink(io::stdout()).map(|(outcome, _)| outcome)
    }

    /// Full run with the live table written to `sink`, which is returned.
    pub fn run_with_sink<W: Write + Send>(&self, sink: W) -> Result<(RunOutcome, W)> {
        let cfg = &self.config;
        cfg.validate()?;

        let (a, b) = generate_operands(cfg.rows_a, cfg.cols_a, cfg.cols_b, cfg.seed);
        let product = run_parallel(&a, &b, &self.plan()?, self.available, cfg.monitor_interval, sink)?;
        let ParallelProduct {
            c,
            mut summary,
            monitor,
            ..
        } = product;

        if cfg.compare_sequential {
            let t0 = Instant::now();
            let reference = multiply_reference(&a, &b)?;
            let sequential_time = t0.elapsed();
            let matches = reference == c;
            if !matches {
                warn!("parallel product differs from the sequential reference");
            }
            summary.baseline = Some(Baseline {
                sequential_time,
                matches,
            });
        }

        Ok((RunOutcome { a, b, c, summary }, monitor.out))
    }
}

/// Multiplies caller-provided matrices with up to `threads` workers.
///
/// Uses the same engine as [`Orchestrator`] with the monitor writing to
/// [`io::sink`].
///
/// ```
/// use matmul_monitor::{Matrix, multiply_parallel};
///
/// let a = Matrix::from_rows(vec![vec![1, 2], vec![3, 4]]).unwrap();
/// let b = Matrix::from_rows(vec![vec![5, 6], vec![7, 8]]).unwrap();
/// let (c, _summary) = multiply_parallel(&a, &b, 2).unwrap();
/// assert_eq!(c.to_rows(), vec![vec![19, 22], vec![43, 50]]);
/// ```
pub fn multiply_parallel(a: &Matrix, b: &Matrix, threads: usize) -> Result<(Matrix, RunSummary)> {
    check_product_shapes(a, b)?;
    if threads == 0 {
        return Err(MatmulError::InvalidThreadCount);
    }
    let available = available_cores();
    let count = effective_thread_count(Some(threads), available, a.rows());
    let ranges = partition_rows(a.rows(), count)?;
    let product = run_parallel(a, b, &ranges, available, Duration::from_millis(50), io::sink())?;
    Ok((product.c, product.summary))
}

/// Splits `data` into one mutable window per range, in order.
///
/// `ranges` must be contiguous from row 0, as produced by
/// [`partition_rows`].
fn split_rows<'c>(mut data: &'c mut [i32], cols: usize, ranges: &[WorkRange]) -> Vec<&'c mut [i32]> {
    let mut windows = Vec::with_capacity(ranges.len());
    for r in ranges {
        let (head, tail) = std::mem::take(&mut data).split_at_mut(r.len() * cols);
        windows.push(head);
        data = tail;
    }
    windows
}

/// Ranges must tile `[0, rows)` in order with no empty entry.
fn check_ranges(ranges: &[WorkRange], rows: usize) -> Result<()> {
    let mut next = 0;
    for r in ranges {
        if r.start != next || r.is_empty() {
            return Err(MatmulError::ShapeMismatch(format!(
                "row range {}..{} does not continue at row {}",
                r.start, r.end, next
            )));
        }
        next = r.end;
    }
    if next != rows {
        return Err(MatmulError::ShapeMismatch(format!(
            "row ranges cover {} rows, A has {}",
            next, rows
        )));
    }
    Ok(())
}

fn spawn_error(name: String) -> impl FnOnce(io::Error) -> MatmulError {
    move |source| MatmulError::ThreadSpawn { name, source }
}

/// Core engine: one pinned worker per range plus the monitor.
///
/// Steps run strictly in order: allocate C and the metrics, spawn workers
/// then the monitor, join every worker, signal shutdown, join the monitor,
/// aggregate. A panicking worker is re-raised after the monitor has been
/// stopped and joined.
pub fn run_parallel<W: Write + Send>(
    a: &Matrix,
    b: &Matrix,
    ranges: &[WorkRange],
    available: usize,
    interval: Duration,
    sink: W,
) -> Result<ParallelProduct<W>> {
    run_with_kernel(a, b, ranges, available, interval, sink, row_product)
}

fn run_with_kernel<W: Write + Send>(
    a: &Matrix,
    b: &Matrix,
    ranges: &[WorkRange],
    available: usize,
    interval: Duration,
    sink: W,
    kernel: RowKernel,
) -> Result<ParallelProduct<W>> {
    check_product_shapes(a, b)?;
    check_ranges(ranges, a.rows())?;
    let n = b.cols();

    let mut c = Matrix::zeros(a.rows(), n);
    let metrics: Vec<WorkerMetrics> = ranges
        .iter()
        .enumerate()
        .map(|(i, r)| WorkerMetrics::new(i, i, *r))
        .collect();
    let gate = StartGate::new();
    let shutdown = ShutdownFlag::new();

    info!(
        workers = ranges.len(),
        available,
        rows_a = a.rows(),
        cols_a = a.cols(),
        cols_b = n,
        "starting parallel multiplication"
    );

    let (wall_time, monitor) = thread::scope(|s| -> Result<(Duration, MonitorReport<W>)> {
        let global_start = Instant::now();

        let mut workers = Vec::with_capacity(ranges.len());
        for (m, out) in metrics.iter().zip(split_rows(c.as_mut_slice(), n, ranges)) {
            let name = format!("matmul-worker-{}", m.worker_id());
            let worker = Worker::new(a, b, out, m, &gate).with_kernel(kernel);
            let handle = thread::Builder::new()
                .name(name.clone())
                .spawn_scoped(s, move || worker.run())
                .map_err(spawn_error(name))?;
            workers.push(handle);
        }

        let monitor = Monitor::new(&metrics, &gate, &shutdown, sink).with_interval(interval);
        let monitor_handle = thread::Builder::new()
            .name("matmul-monitor".to_string())
            .spawn_scoped(s, move || monitor.run())
            .map_err(spawn_error("matmul-monitor".to_string()));

        let mut worker_panic: Option<Box<dyn Any + Send>> = None;
        for handle in workers {
            if let Err(payload) = handle.join() {
                worker_panic.get_or_insert(payload);
            }
        }
        let wall_time = global_start.elapsed();

        shutdown.signal();
        gate.wake();
        let monitor_handle = monitor_handle?;
        let report = match monitor_handle.join() {
            Ok(report) => report,
            Err(payload) => panic::resume_unwind(worker_panic.unwrap_or(payload)),
        };

        if let Some(payload) = worker_panic {
            panic::resume_unwind(payload);
        }
        Ok((wall_time, report))
    })?;

    if let Some(e) = &monitor.write_error {
        warn!(error = %e, "monitor output failed, live table stopped early");
    }

    let snapshots: Vec<_> = metrics.iter().map(WorkerMetrics::snapshot).collect();
    let dims = Dimensions {
        rows_a: a.rows(),
        cols_a: a.cols(),
        cols_b: n,
    };
    let summary = RunSummary::aggregate(
        dims,
        available,
        &snapshots,
        wall_time,
        platform::process_memory_mb(),
    );
    info!(wall = ?summary.wall_time, speedup = ?summary.speedup, "parallel multiplication finished");

    Ok(ParallelProduct {
        c,
        summary,
        ranges: ranges.to_vec(),
        snapshots,
        monitor,
    })
}
