//! Cross-thread signals between the orchestrator, workers and monitor.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex};

/// Process-wide "all workers joined" flag. Only ever goes false -> true.
#[derive(Debug, Default)]
pub struct ShutdownFlag(AtomicBool);

impl ShutdownFlag {
    pub fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    pub fn signal(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Lets the monitor sleep until the first worker has started.
///
/// Workers call [`announce`](Self::announce) after publishing their start.
/// The orchestrator calls [`wake`](Self::wake) after setting the shutdown
/// flag so a monitor still waiting (no worker ever started) gets released.
#[derive(Debug, Default)]
pub struct StartGate {
    started: Mutex<bool>,
    cv: Condvar,
}

impl StartGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn announce(&self) {
        let mut started = self.started.lock().expect("start gate lock poisoned");
        *started = true;
        self.cv.notify_all();
    }

    pub fn wake(&self) {
        let _guard = self.started.lock().expect("start gate lock poisoned");
        self.cv.notify_all();
    }

    /// Blocks until some worker announced or `shutdown` is set.
    ///
    /// Returns `true` if a worker started. The shutdown flag is checked
    /// under the gate lock, and `wake` takes the same lock, so a wake-up
    /// issued after `signal` cannot be lost.
    pub fn wait(&self, shutdown: &ShutdownFlag) -> bool {
        let mut started = self.started.lock().expect("start gate lock poisoned");
        while !*started && !shutdown.is_set() {
            started = self.cv.wait(started).expect("start gate lock poisoned");
        }
        *started
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_shutdown_flag_transitions_once() {
        let flag = ShutdownFlag::new();
        assert!(!flag.is_set());
        flag.signal();
        flag.signal();
        assert!(flag.is_set());
    }

    #[test]
    fn test_gate_released_by_announce() {
        let gate = StartGate::new();
        let shutdown = ShutdownFlag::new();
        thread::scope(|s| {
            let waiter = s.spawn(|| gate.wait(&shutdown));
            thread::sleep(Duration::from_millis(10));
            gate.announce();
            assert!(waiter.join().unwrap());
        });
    }

    #[test]
    fn test_gate_released_by_shutdown() {
        let gate = StartGate::new();
        let shutdown = ShutdownFlag::new();
        thread::scope(|s| {
            let waiter = s.spawn(|| gate.wait(&shutdown));
            thread::sleep(Duration::from_millis(10));
            shutdown.signal();
            gate.wake();
            assert!(!waiter.join().unwrap());
        });
    }

    #[test]
    fn test_announce_before_wait_does_not_block() {
        let gate = StartGate::new();
        gate.announce();
        assert!(gate.wait(&ShutdownFlag::new()));
    }
}
