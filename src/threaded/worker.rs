//! The compute thread body.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::metrics::{ProgressUpdate, WorkerMetrics};
use super::signal::StartGate;
use crate::matrix::Matrix;
use crate::matrix::naive_ijk::row_product;
use crate::platform;

/// Number of progress samples a worker aims to publish over its range.
pub const REPORTS_PER_WORKER: usize = 20;

/// Wall-time deltas are floored to this before computing utilization.
const MIN_WALL_DELTA: Duration = Duration::from_millis(1);

/// Computes row `i` of `a * b` into `out`.
pub type RowKernel = fn(&Matrix, &Matrix, usize, &mut [i32]);

/// Rows between two progress samples: `ceil(total_rows / 20)`, at least 1.
pub fn report_interval(total_rows: usize) -> usize {
    total_rows.div_ceil(REPORTS_PER_WORKER).max(1)
}

/// CPU utilization over one interval, in percent.
///
/// The wall delta is floored to 1 ms so very short intervals cannot blow up.
pub fn cpu_utilization(cpu_delta: Duration, wall_delta: Duration) -> f64 {
    let wall = wall_delta.max(MIN_WALL_DELTA).as_secs_f64();
    cpu_delta.as_secs_f64() / wall * 100.0
}

/// One worker: a row range of C and the metrics it reports into.
///
/// `out` is the worker's slice of C, exactly `range.len() * b.cols()`
/// elements starting at row `range.start`. No other thread can see it.
pub struct Worker<'a> {
    a: &'a Matrix,
    b: &'a Matrix,
    out: &'a mut [i32],
    metrics: &'a WorkerMetrics,
    gate: &'a StartGate,
    kernel: RowKernel,
}

impl<'a> Worker<'a> {
    pub fn new(
        a: &'a Matrix,
        b: &'a Matrix,
        out: &'a mut [i32],
        metrics: &'a WorkerMetrics,
        gate: &'a StartGate,
    ) -> Self {
        debug_assert_eq!(out.len(), metrics.range().len() * b.cols());
        Self {
            a,
            b,
            out,
            metrics,
            gate,
            kernel: row_product,
        }
    }

    /// Swaps the row kernel, [`row_product`] by default.
    pub fn with_kernel(mut self, kernel: RowKernel) -> Self {
        self.kernel = kernel;
        self
    }

    /// Pins, announces, computes every assigned row, publishing a sample
    /// every [`report_interval`] rows and on the last row.
    pub fn run(self) {
        let Worker {
            a,
            b,
            out,
            metrics,
            gate,
            kernel,
        } = self;
        let worker_id = metrics.worker_id();
        let range = metrics.range();

        let pinned = platform::pin_to_core(metrics.core_id()).is_pinned();
        if !pinned {
            warn!(
                worker_id,
                core_id = metrics.core_id(),
                "could not pin worker, running unpinned"
            );
        }

        let total = range.len();
        let interval = report_interval(total);
        let n = b.cols();

        let mut prev_cpu = platform::thread_cpu_time();
        let start_wall = Instant::now();
        let mut prev_wall = start_wall;

        metrics.mark_started(platform::native_thread_id(), pinned);
        gate.announce();
        debug!(worker_id, start = range.start, end = range.end, pinned, "worker started");

        for (idx, row_out) in out.chunks_mut(n).enumerate() {
            kernel(a, b, range.start + idx, row_out);

            let rows_done = idx + 1;
            if rows_done % interval == 0 || rows_done == total {
                let now = Instant::now();
                let cur_cpu = platform::thread_cpu_time();
                let cpu_delta = match (prev_cpu, cur_cpu) {
                    (Some(prev), Some(cur)) => cur.saturating_sub(prev),
                    _ => Duration::ZERO,
                };

                metrics.publish(ProgressUpdate {
                    rows_done,
                    cpu_pct: cpu_utilization(cpu_delta, now - prev_wall),
                    elapsed: now - start_wall,
                });

                prev_cpu = cur_cpu;
                prev_wall = now;
            }
        }

        debug!(worker_id, elapsed = ?start_wall.elapsed(), "worker done");
    }
}
