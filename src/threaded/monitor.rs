//! Live status table for running workers.
//!
//! The monitor never writes to worker metrics. Each frame locks every
//! record in turn through [`WorkerMetrics::snapshot`], so rows within one
//! frame may come from slightly different instants. Only the aggregation
//! done after all workers joined is authoritative.

use std::io::{self, Write};
use std::thread;
use std::time::Duration;

use tracing::debug;

use super::metrics::{MetricsSnapshot, WorkerMetrics};
use super::signal::{ShutdownFlag, StartGate};
use crate::platform;

/// Default time between two frames.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MonitorState {
    WaitingForStart,
    Polling { first: bool },
    Stopped,
}

/// What the monitor hands back when it stops.
#[derive(Debug)]
pub struct MonitorReport<W> {
    pub frames: usize,
    pub out: W,
    /// First write failure, after which the monitor stopped printing.
    pub write_error: Option<io::Error>,
}

pub struct Monitor<'a, W: Write> {
    metrics: &'a [WorkerMetrics],
    gate: &'a StartGate,
    shutdown: &'a ShutdownFlag,
    interval: Duration,
    memory: fn() -> f64,
    out: W,
    frames: usize,
}

impl<'a, W: Write> Monitor<'a, W> {
    pub fn new(
        metrics: &'a [WorkerMetrics],
        gate: &'a StartGate,
        shutdown: &'a ShutdownFlag,
        out: W,
    ) -> Self {
        Self {
            metrics,
            gate,
            shutdown,
            interval: DEFAULT_INTERVAL,
            memory: platform::process_memory_mb,
            out,
            frames: 0,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Replaces the process memory reader, mostly for tests.
    pub fn with_memory_reader(mut self, memory: fn() -> f64) -> Self {
        self.memory = memory;
        self
    }

    /// Runs the state machine until shutdown and returns the sink.
    pub fn run(mut self) -> MonitorReport<W> {
        let mut state = MonitorState::WaitingForStart;
        let mut write_error = None;

        while state != MonitorState::Stopped {
            state = match self.step(state) {
                Ok(next) => next,
                Err(e) => {
                    write_error = Some(e);
                    MonitorState::Stopped
                }
            };
        }

        debug!(frames = self.frames, "monitor stopped");
        MonitorReport {
            frames: self.frames,
            out: self.out,
            write_error,
        }
    }

    fn step(&mut self, state: MonitorState) -> io::Result<MonitorState> {
        match state {
            MonitorState::WaitingForStart => {
                if self.gate.wait(self.shutdown) {
                    Ok(MonitorState::Polling { first: true })
                } else {
                    Ok(MonitorState::Stopped)
                }
            }
            MonitorState::Polling { first } => {
                if self.shutdown.is_set() {
                    return Ok(MonitorState::Stopped);
                }
                if !first {
                    thread::sleep(self.interval);
                    if self.shutdown.is_set() {
                        return Ok(MonitorState::Stopped);
                    }
                }
                self.print_frame()?;
                Ok(MonitorState::Polling { first: false })
            }
            MonitorState::Stopped => Ok(MonitorState::Stopped),
        }
    }

    fn print_frame(&mut self) -> io::Result<()> {
        let mem_mb = (self.memory)();
        let mut any_active = false;

        for m in self.metrics {
            let snap = m.snapshot();
            // Not started yet: total_rows is not published.
            if !snap.started {
                continue;
            }
            any_active = true;
            writeln!(self.out, "{}", render_line(&snap, mem_mb))?;
        }

        if any_active {
            writeln!(self.out)?;
            self.out.flush()?;
            self.frames += 1;
        }
        Ok(())
    }
}

/// One status line for a started worker.
pub fn render_line(snap: &MetricsSnapshot, mem_mb: f64) -> String {
    let tid = snap
        .native_tid
        .map_or_else(|| "-".to_string(), |t| t.to_string());
    let mut line = format!(
        "  [worker {:>2} | tid {:>6} | core {:>2}]  progress: {:>5.1}%  |  cpu: {:>5.1}%  |  ram: {:>7.2} MB  |  rows: {:>5}/{:>5}",
        snap.worker_id,
        tid,
        snap.core_id,
        snap.progress,
        snap.cpu_pct,
        mem_mb,
        snap.rows_done,
        snap.total_rows
    );
    if snap.done {
        line.push_str("  [done]");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::WorkRange;
    use crate::threaded::metrics::ProgressUpdate;

    fn fixed_memory() -> f64 {
        12.5
    }

    #[test]
    fn test_render_line_done() {
        let m = WorkerMetrics::new(1, 1, WorkRange::new(0, 4));
        m.mark_started(Some(4242), true);
        m.publish(ProgressUpdate {
            rows_done: 4,
            cpu_pct: 98.76,
            elapsed: Duration::from_millis(3),
        });
        let line = render_line(&m.snapshot(), 12.5);
        assert_eq!(
            line,
            "  [worker  1 | tid   4242 | core  1]  progress: 100.0%  |  cpu:  98.8%  |  ram:   12.50 MB  |  rows:     4/    4  [done]"
        );
    }

    #[test]
    fn test_stops_without_any_worker() {
        let metrics: Vec<WorkerMetrics> = Vec::new();
        let gate = StartGate::new();
        let shutdown = ShutdownFlag::new();

        let report = thread::scope(|s| {
            let handle = s.spawn(|| Monitor::new(&metrics, &gate, &shutdown, Vec::new()).run());
            thread::sleep(Duration::from_millis(10));
            shutdown.signal();
            gate.wake();
            handle.join().unwrap()
        });

        assert_eq!(report.frames, 0);
        assert!(report.out.is_empty());
    }

    #[test]
    fn test_prints_started_workers_only() {
        let metrics = vec![
            WorkerMetrics::new(0, 0, WorkRange::new(0, 2)),
            WorkerMetrics::new(1, 1, WorkRange::new(2, 4)),
        ];
        metrics[0].mark_started(None, false);
        let gate = StartGate::new();
        gate.announce();
        let shutdown = ShutdownFlag::new();

        let report = thread::scope(|s| {
            let handle = s.spawn(|| {
                Monitor::new(&metrics, &gate, &shutdown, Vec::new())
                    .with_interval(Duration::from_millis(5))
                    .with_memory_reader(fixed_memory)
                    .run()
            });
            thread::sleep(Duration::from_millis(30));
            shutdown.signal();
            gate.wake();
            handle.join().unwrap()
        });

        assert!(report.frames >= 1);
        assert!(report.write_error.is_none());
        let text = String::from_utf8(report.out).unwrap();
        assert!(text.contains("[worker  0 | tid      - | core  0]"));
        assert!(!text.contains("[worker  1"));
        assert!(text.contains("ram:   12.50 MB"));
    }

    #[test]
    fn test_no_frame_after_shutdown() {
        let metrics = vec![WorkerMetrics::new(0, 0, WorkRange::new(0, 1))];
        metrics[0].mark_started(None, false);
        let gate = StartGate::new();
        gate.announce();
        let shutdown = ShutdownFlag::new();
        shutdown.signal();

        let report = Monitor::new(&metrics, &gate, &shutdown, Vec::new()).run();
        assert_eq!(report.frames, 0);
    }

    #[test]
    fn test_shutdown_during_sleep_skips_frame() {
        let metrics = vec![WorkerMetrics::new(0, 0, WorkRange::new(0, 1))];
        metrics[0].mark_started(None, false);
        let gate = StartGate::new();
        gate.announce();
        let shutdown = ShutdownFlag::new();

        let report = thread::scope(|s| {
            let handle = s.spawn(|| {
                Monitor::new(&metrics, &gate, &shutdown, Vec::new())
                    .with_interval(Duration::from_millis(200))
                    .with_memory_reader(fixed_memory)
                    .run()
            });
            thread::sleep(Duration::from_millis(50));
            shutdown.signal();
            handle.join().unwrap()
        });

        // Only the immediate first frame; the wakeup after the signal prints nothing.
        assert_eq!(report.frames, 1);
    }
}
