//! Run configuration.

use std::time::Duration;

use crate::error::{MatmulError, Result, check_dimensions};
use crate::matrix::generate::DEFAULT_SEED;
use crate::threaded::monitor::DEFAULT_INTERVAL;

/// Shortest time allowed between two monitor frames.
pub const MIN_MONITOR_INTERVAL: Duration = Duration::from_millis(1);

/// Largest side printed in full by default.
pub const DEFAULT_PRINT_LIMIT: usize = 10;

/// Everything one multiplication run needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunConfig {
    pub rows_a: usize,
    pub cols_a: usize,
    pub cols_b: usize,
    pub seed: u64,
    /// Requested workers; `None` means one per available core.
    pub threads: Option<usize>,
    pub monitor_interval: Duration,
    pub print_limit: usize,
    /// Also time the single-threaded reference product.
    pub compare_sequential: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            rows_a: 1,
            cols_a: 1,
            cols_b: 1,
            seed: DEFAULT_SEED,
            threads: None,
            monitor_interval: DEFAULT_INTERVAL,
            print_limit: DEFAULT_PRINT_LIMIT,
            compare_sequential: false,
        }
    }
}

impl RunConfig {
    pub fn new(rows_a: usize, cols_a: usize, cols_b: usize) -> Self {
        Self {
            rows_a,
            cols_a,
            cols_b,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn with_monitor_interval(mut self, interval: Duration) -> Self {
        self.monitor_interval = interval;
        self
    }

    pub fn with_compare_sequential(mut self, compare: bool) -> Self {
        self.compare_sequential = compare;
        self
    }

    /// Fails fast on zero dimensions, an explicit zero thread count, or a
    /// monitor interval under [`MIN_MONITOR_INTERVAL`].
    pub fn validate(&self) -> Result<()> {
        check_dimensions(self.rows_a, self.cols_a, self.cols_b)?;
        if self.threads == Some(0) {
            return Err(MatmulError::InvalidThreadCount);
        }
        if self.monitor_interval < MIN_MONITOR_INTERVAL {
            return Err(MatmulError::InvalidInterval);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = RunConfig::new(3, 4, 5);
        assert_eq!(cfg.seed, 42);
        assert_eq!(cfg.monitor_interval, Duration::from_millis(50));
        assert_eq!(cfg.threads, None);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_input() {
        assert!(RunConfig::new(0, 4, 5).validate().is_err());
        assert!(matches!(
            RunConfig::new(3, 4, 5).with_threads(0).validate(),
            Err(MatmulError::InvalidThreadCount)
        ));
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let cfg = RunConfig::new(3, 4, 5).with_monitor_interval(Duration::ZERO);
        assert!(matches!(cfg.validate(), Err(MatmulError::InvalidInterval)));
        let cfg = RunConfig::new(3, 4, 5).with_monitor_interval(MIN_MONITOR_INTERVAL);
        assert!(cfg.validate().is_ok());
    }
}
