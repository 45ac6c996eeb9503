//! Post-run aggregation and the text report printed by the binary.

use std::fmt;
use std::time::Duration;

use crate::partition::WorkRange;
use crate::threaded::metrics::MetricsSnapshot;

/// Shortest wall time a speedup is computed for.
pub const MIN_MEASURABLE_WALL: Duration = Duration::from_micros(1);

const RULE_WIDTH: usize = 70;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dimensions {
    pub rows_a: usize,
    pub cols_a: usize,
    pub cols_b: usize,
}

/// Cumulative worker time over wall time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Speedup {
    Measured(f64),
    TooFastToMeasure,
}

impl Speedup {
    /// Never NaN or negative: tiny or zero timings give `TooFastToMeasure`.
    ///
    /// ```
    /// use std::time::Duration;
    /// use matmul_monitor::Speedup;
    ///
    /// let s = Speedup::estimate(Duration::from_secs(4), Duration::from_secs(2));
    /// assert_eq!(s, Speedup::Measured(2.0));
    /// assert_eq!(
    ///     Speedup::estimate(Duration::ZERO, Duration::ZERO),
    ///     Speedup::TooFastToMeasure
    /// );
    /// ```
    pub fn estimate(cumulative: Duration, wall: Duration) -> Self {
        if wall < MIN_MEASURABLE_WALL || cumulative.is_zero() {
            return Speedup::TooFastToMeasure;
        }
        Speedup::Measured(cumulative.as_secs_f64() / wall.as_secs_f64())
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Speedup::Measured(v) => Some(*v),
            Speedup::TooFastToMeasure => None,
        }
    }
}

/// Final numbers for one worker.
#[derive(Clone, Debug, PartialEq)]
pub struct WorkerSummary {
    pub worker_id: usize,
    pub core_id: usize,
    pub native_tid: Option<u64>,
    pub pinned: bool,
    pub range: WorkRange,
    pub total_time: Duration,
    pub avg_cpu: f64,
    pub peak_cpu: f64,
    pub samples: usize,
}

impl From<&MetricsSnapshot> for WorkerSummary {
    fn from(snap: &MetricsSnapshot) -> Self {
        Self {
            worker_id: snap.worker_id,
            core_id: snap.core_id,
            native_tid: snap.native_tid,
            pinned: snap.pinned,
            range: snap.range,
            total_time: snap.total_time.unwrap_or(snap.elapsed),
            avg_cpu: snap.avg_cpu(),
            peak_cpu: snap.peak_cpu(),
            samples: snap.cpu_samples.len(),
        }
    }
}

/// Timing of the single-threaded reference run, when requested.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Baseline {
    pub sequential_time: Duration,
    pub matches: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    pub dims: Dimensions,
    pub available_cores: usize,
    pub workers: Vec<WorkerSummary>,
    pub wall_time: Duration,
    pub cumulative_cpu_time: Duration,
    pub speedup: Speedup,
    pub memory_mb: f64,
    pub baseline: Option<Baseline>,
}

impl RunSummary {
    /// Sums per-worker totals and derives the speedup estimate.
    pub fn aggregate(
        dims: Dimensions,
        available_cores: usize,
        snapshots: &[MetricsSnapshot],
        wall_time: Duration,
        memory_mb: f64,
    ) -> Self {
        let workers: Vec<WorkerSummary> = snapshots.iter().map(WorkerSummary::from).collect();
        let cumulative_cpu_time: Duration = workers.iter().map(|w| w.total_time).sum();
        Self {
            dims,
            available_cores,
            speedup: Speedup::estimate(cumulative_cpu_time, wall_time),
            workers,
            wall_time,
            cumulative_cpu_time,
            memory_mb,
            baseline: None,
        }
    }

    /// Sequential time over parallel wall time.
    pub fn measured_speedup(&self) -> Option<Speedup> {
        self.baseline
            .map(|b| Speedup::estimate(b.sequential_time, self.wall_time))
    }
}

fn banner(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f, "\n{}", "=".repeat(RULE_WIDTH))?;
    writeln!(f, "  {}", title)?;
    writeln!(f, "{}", "=".repeat(RULE_WIDTH))
}

fn fmt_tid(tid: Option<u64>) -> String {
    tid.map_or_else(|| "-".to_string(), |t| t.to_string())
}

/// Work distribution printed before the workers start.
pub fn distribution_table(ranges: &[WorkRange]) -> String {
    let mut out = String::new();
    out.push_str(&format!("\n{}\n", "=".repeat(RULE_WIDTH)));
    out.push_str("  WORK DISTRIBUTION\n");
    out.push_str(&format!("{}\n", "=".repeat(RULE_WIDTH)));
    for (i, r) in ranges.iter().enumerate() {
        out.push_str(&format!(
            "  Worker {:>2}  |  Core {:>2}  |  Rows {:>5} - {:>5}  ({} rows)\n",
            i,
            i,
            r.start,
            r.end - 1,
            r.len()
        ));
    }
    out.push_str(&format!("{}\n", "=".repeat(RULE_WIDTH)));
    out
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = self.dims;

        banner(f, "RESULT")?;
        writeln!(
            f,
            "  Dimensions: A({}x{}) x B({}x{}) = C({}x{})",
            d.rows_a, d.cols_a, d.cols_a, d.cols_b, d.rows_a, d.cols_b
        )?;
        writeln!(f, "  Wall clock time:   {:.6} s", self.wall_time.as_secs_f64())?;
        writeln!(f, "  Workers used:      {}", self.workers.len())?;
        writeln!(f, "  Process memory:    {:.2} MB", self.memory_mb)?;

        banner(f, "PER-WORKER METRICS")?;
        for w in &self.workers {
            writeln!(
                f,
                "\n  --- Worker {} (core {}, tid {}{}) ---",
                w.worker_id,
                w.core_id,
                fmt_tid(w.native_tid),
                if w.pinned { "" } else { ", unpinned" }
            )?;
            writeln!(
                f,
                "  Rows assigned:   {} - {} ({} rows)",
                w.range.start,
                w.range.end - 1,
                w.range.len()
            )?;
            writeln!(f, "  Execution time:  {:.4} s", w.total_time.as_secs_f64())?;
            writeln!(f, "  Average CPU:     {:.1}%", w.avg_cpu)?;
            writeln!(f, "  Peak CPU:        {:.1}%", w.peak_cpu)?;
        }

        banner(f, "PARALLELISM SUMMARY")?;
        writeln!(
            f,
            "  Wall clock time:                    {:.6} s",
            self.wall_time.as_secs_f64()
        )?;
        writeln!(
            f,
            "  Cumulative worker time:             {:.4} s",
            self.cumulative_cpu_time.as_secs_f64()
        )?;
        match self.speedup {
            Speedup::Measured(s) => {
                writeln!(f, "  Approximate speedup:                {:.2}x", s)?;
                writeln!(
                    f,
                    "\n  A speedup close to {} means the workers ran in parallel.",
                    self.workers.len()
                )?;
            }
            Speedup::TooFastToMeasure => {
                writeln!(f, "\n  (Too fast to measure a speedup.")?;
                writeln!(f, "   Try larger matrices such as 300x300.)")?;
            }
        }

        if let Some(b) = self.baseline {
            writeln!(
                f,
                "\n  Sequential baseline:                {:.6} s",
                b.sequential_time.as_secs_f64()
            )?;
            match self.measured_speedup() {
                Some(Speedup::Measured(s)) => {
                    writeln!(f, "  Measured speedup vs sequential:     {:.2}x", s)?
                }
                _ => writeln!(f, "  Measured speedup vs sequential:     too fast to measure")?,
            }
            writeln!(
                f,
                "  Result matches sequential:          {}",
                if b.matches { "yes" } else { "NO" }
            )?;
        }
        writeln!(f, "{}", "=".repeat(RULE_WIDTH))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(id: usize, range: WorkRange, total_ms: u64, samples: Vec<f64>) -> MetricsSnapshot {
        MetricsSnapshot {
            worker_id: id,
            core_id: id,
            range,
            native_tid: None,
            pinned: false,
            total_rows: range.len(),
            rows_done: range.len(),
            progress: 100.0,
            cpu_pct: samples.last().copied().unwrap_or(0.0),
            elapsed: Duration::from_millis(total_ms),
            total_time: Some(Duration::from_millis(total_ms)),
            cpu_samples: samples,
            started: true,
            done: true,
        }
    }

    const DIMS: Dimensions = Dimensions {
        rows_a: 4,
        cols_a: 3,
        cols_b: 2,
    };

    #[test]
    fn test_speedup_guards() {
        assert_eq!(
            Speedup::estimate(Duration::from_millis(5), Duration::ZERO),
            Speedup::TooFastToMeasure
        );
        assert_eq!(
            Speedup::estimate(Duration::ZERO, Duration::from_millis(5)),
            Speedup::TooFastToMeasure
        );
        let s = Speedup::estimate(Duration::from_millis(30), Duration::from_millis(10));
        let v = s.value().unwrap();
        assert!((v - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_aggregate_sums_worker_times() {
        let snaps = vec![
            snapshot(0, WorkRange::new(0, 2), 40, vec![50.0, 100.0]),
            snapshot(1, WorkRange::new(2, 4), 60, vec![80.0]),
        ];
        let summary = RunSummary::aggregate(DIMS, 8, &snaps, Duration::from_millis(50), 3.0);
        assert_eq!(summary.cumulative_cpu_time, Duration::from_millis(100));
        assert_eq!(summary.workers[0].avg_cpu, 75.0);
        assert_eq!(summary.workers[0].peak_cpu, 100.0);
        let v = summary.speedup.value().unwrap();
        assert!((v - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_render_mentions_too_fast() {
        let snaps = vec![snapshot(0, WorkRange::new(0, 4), 0, vec![])];
        let summary = RunSummary::aggregate(DIMS, 1, &snaps, Duration::ZERO, 0.0);
        let text = summary.to_string();
        assert!(text.contains("Too fast to measure"));
        assert!(!text.contains("NaN"));
        assert!(text.contains("A(4x3) x B(3x2) = C(4x2)"));
    }

    #[test]
    fn test_baseline_speedup() {
        let snaps = vec![snapshot(0, WorkRange::new(0, 4), 10, vec![99.0])];
        let mut summary = RunSummary::aggregate(DIMS, 1, &snaps, Duration::from_millis(10), 0.0);
        summary.baseline = Some(Baseline {
            sequential_time: Duration::from_millis(30),
            matches: true,
        });
        let v = summary.measured_speedup().and_then(|s| s.value()).unwrap();
        assert!((v - 3.0).abs() < 1e-9);
        assert!(summary.to_string().contains("Result matches sequential:          yes"));
    }

    #[test]
    fn test_distribution_table() {
        let table = distribution_table(&[WorkRange::new(0, 3), WorkRange::new(3, 5)]);
        assert!(table.contains("  Worker  0  |  Core  0  |  Rows     0 -     2  (3 rows)"));
        assert!(table.contains("  Worker  1  |  Core  1  |  Rows     3 -     4  (2 rows)"));
    }
}
