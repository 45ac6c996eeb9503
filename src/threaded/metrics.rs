//! Per-worker progress record.
//!
//! Each worker owns exactly one [`WorkerMetrics`] and is its only writer.
//! The monitor and the final aggregation read it through [`snapshot`],
//! which copies the state out under the lock so no reader ever holds the
//! lock while formatting or printing.
//!
//! [`snapshot`]: WorkerMetrics::snapshot

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::partition::WorkRange;

#[derive(Debug, Default)]
struct MetricsState {
    native_tid: Option<u64>,
    pinned: bool,
    total_rows: usize,
    rows_done: usize,
    progress: f64,
    cpu_pct: f64,
    elapsed: Duration,
    total_time: Option<Duration>,
    cpu_samples: Vec<f64>,
    started: bool,
    done: bool,
}

/// Copy of a worker's metrics at one instant.
#[derive(Clone, Debug, PartialEq)]
pub struct MetricsSnapshot {
    pub worker_id: usize,
    pub core_id: usize,
    pub range: WorkRange,
    pub native_tid: Option<u64>,
    pub pinned: bool,
    pub total_rows: usize,
    pub rows_done: usize,
    /// Percentage of assigned rows finished, `0.0..=100.0`.
    pub progress: f64,
    /// Most recent CPU utilization sample in percent.
    pub cpu_pct: f64,
    pub elapsed: Duration,
    /// Set once, when the last row is published.
    pub total_time: Option<Duration>,
    pub cpu_samples: Vec<f64>,
    pub started: bool,
    pub done: bool,
}

impl MetricsSnapshot {
    pub fn avg_cpu(&self) -> f64 {
        if self.cpu_samples.is_empty() {
            return 0.0;
        }
        self.cpu_samples.iter().sum::<f64>() / self.cpu_samples.len() as f64
    }

    pub fn peak_cpu(&self) -> f64 {
        self.cpu_samples.iter().copied().fold(0.0, f64::max)
    }
}

/// One progress sample published by a worker.
#[derive(Clone, Copy, Debug)]
pub struct ProgressUpdate {
    pub rows_done: usize,
    pub cpu_pct: f64,
    pub elapsed: Duration,
}

/// Mutex-guarded metrics for a single worker.
#[derive(Debug)]
pub struct WorkerMetrics {
    worker_id: usize,
    core_id: usize,
    range: WorkRange,
    state: Mutex<MetricsState>,
}

impl WorkerMetrics {
    /// Created by the orchestrator before any thread starts.
    pub fn new(worker_id: usize, core_id: usize, range: WorkRange) -> Self {
        Self {
            worker_id,
            core_id,
            range,
            state: Mutex::new(MetricsState::default()),
        }
    }

    pub fn worker_id(&self) -> usize {
        self.worker_id
    }

    pub fn core_id(&self) -> usize {
        self.core_id
    }

    pub fn range(&self) -> WorkRange {
        self.range
    }

    fn lock(&self) -> MutexGuard<'_, MetricsState> {
        // Only the owning worker writes and it never panics while holding the
        // lock, so poisoning means the process is already going down.
        self.state.lock().expect("worker metrics lock poisoned")
    }

    /// Publishes `started = true` along with the row total.
    pub fn mark_started(&self, native_tid: Option<u64>, pinned: bool) {
        let mut st = self.lock();
        st.native_tid = native_tid;
        st.pinned = pinned;
        st.total_rows = self.range.len();
        st.started = true;
    }

    /// Records one progress sample. The final row also freezes `total_time`.
    ///
    /// `rows_done` and `elapsed` never move backwards: stale samples are
    /// clamped to the last published values.
    pub fn publish(&self, update: ProgressUpdate) {
        let mut st = self.lock();
        let total = st.total_rows.max(1);
        st.rows_done = update.rows_done.clamp(st.rows_done, total);
        st.progress = st.rows_done as f64 * 100.0 / total as f64;
        st.cpu_pct = update.cpu_pct;
        st.elapsed = update.elapsed.max(st.elapsed);
        st.cpu_samples.push(update.cpu_pct);
        if st.rows_done == st.total_rows && !st.done {
            st.done = true;
            st.total_time = Some(st.elapsed);
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let st = self.lock();
        MetricsSnapshot {
            worker_id: self.worker_id,
            core_id: self.core_id,
            range: self.range,
            native_tid: st.native_tid,
            pinned: st.pinned,
            total_rows: st.total_rows,
            rows_done: st.rows_done,
            progress: st.progress,
            cpu_pct: st.cpu_pct,
            elapsed: st.elapsed,
            total_time: st.total_time,
            cpu_samples: st.cpu_samples.clone(),
            started: st.started,
            done: st.done,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(rows_done: usize, cpu_pct: f64, ms: u64) -> ProgressUpdate {
        ProgressUpdate {
            rows_done,
            cpu_pct,
            elapsed: Duration::from_millis(ms),
        }
    }

    #[test]
    fn test_fresh_metrics_not_started() {
        let m = WorkerMetrics::new(3, 3, WorkRange::new(10, 20));
        let snap = m.snapshot();
        assert!(!snap.started);
        assert!(!snap.done);
        assert_eq!(snap.total_rows, 0);
        assert_eq!(snap.worker_id, 3);
        assert_eq!(snap.range.len(), 10);
    }

    #[test]
    fn test_lifecycle_to_done() {
        let m = WorkerMetrics::new(0, 0, WorkRange::new(0, 4));
        m.mark_started(Some(77), true);
        assert!(m.snapshot().started);

        m.publish(update(2, 90.0, 5));
        let mid = m.snapshot();
        assert_eq!(mid.progress, 50.0);
        assert!(!mid.done);
        assert_eq!(mid.total_time, None);

        m.publish(update(4, 100.0, 9));
        let end = m.snapshot();
        assert!(end.done);
        assert_eq!(end.progress, 100.0);
        assert_eq!(end.total_time, Some(Duration::from_millis(9)));
        assert_eq!(end.native_tid, Some(77));
        assert_eq!(end.cpu_samples, vec![90.0, 100.0]);
    }

    #[test]
    fn test_counters_monotonic() {
        let m = WorkerMetrics::new(0, 0, WorkRange::new(0, 10));
        m.mark_started(None, false);
        m.publish(update(6, 50.0, 20));
        m.publish(update(3, 50.0, 10));
        let snap = m.snapshot();
        assert_eq!(snap.rows_done, 6);
        assert_eq!(snap.elapsed, Duration::from_millis(20));
    }

    #[test]
    fn test_total_time_frozen_once() {
        let m = WorkerMetrics::new(0, 0, WorkRange::new(0, 1));
        m.mark_started(None, false);
        m.publish(update(1, 10.0, 3));
        m.publish(update(1, 10.0, 8));
        assert_eq!(m.snapshot().total_time, Some(Duration::from_millis(3)));
    }

    #[test]
    fn test_cpu_stats() {
        let m = WorkerMetrics::new(0, 0, WorkRange::new(0, 3));
        m.mark_started(None, false);
        m.publish(update(1, 40.0, 1));
        m.publish(update(2, 100.0, 2));
        m.publish(update(3, 70.0, 3));
        let snap = m.snapshot();
        assert_eq!(snap.avg_cpu(), 70.0);
        assert_eq!(snap.peak_cpu(), 100.0);
    }
}
