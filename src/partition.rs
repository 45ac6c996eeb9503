//! Splitting the rows of A across workers.

use std::ops::Range;
use std::thread;

use crate::error::{MatmulError, Result};

/// Core count assumed when the platform cannot report one.
const FALLBACK_CORES: usize = 4;

/// Half-open row interval `[start, end)` owned by one worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkRange {
    pub start: usize,
    pub end: usize,
}

impl WorkRange {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn rows(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Logical cores visible to this process.
pub fn available_cores() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(FALLBACK_CORES)
}

/// Number of workers to launch.
///
/// `requested` defaults to `available`; the result is capped by both the
/// available cores and the row count, and never drops below 1.
pub fn effective_thread_count(requested: Option<usize>, available: usize, rows_a: usize) -> usize {
    let requested = requested.unwrap_or(available);
    requested.min(available.max(1)).min(rows_a).max(1)
}

/// Splits `rows_a` rows into contiguous, near-equal ranges.
///
/// The base size is `rows_a / threads`; the first `rows_a % threads` ranges
/// get one extra row. Slots that would get zero rows are dropped, so the
/// result has exactly `min(threads, rows_a)` entries.
///
/// ```
/// use matmul_monitor::partition::{partition_rows, WorkRange};
///
/// let ranges = partition_rows(10, 3).unwrap();
/// assert_eq!(
///     ranges,
///     vec![WorkRange::new(0, 4), WorkRange::new(4, 7), WorkRange::new(7, 10)]
/// );
/// ```
///
/// # Errors
///
/// `rows_a == 0` is [`MatmulError::EmptyRows`], `threads == 0` is
/// [`MatmulError::InvalidThreadCount`].
pub fn partition_rows(rows_a: usize, threads: usize) -> Result<Vec<WorkRange>> {
    if rows_a == 0 {
        return Err(MatmulError::EmptyRows);
    }
    if threads == 0 {
        return Err(MatmulError::InvalidThreadCount);
    }

    let base = rows_a / threads;
    let remainder = rows_a % threads;

    let mut ranges = Vec::with_capacity(threads.min(rows_a));
    let mut start = 0;
    for i in 0..threads {
        let count = base + usize::from(i < remainder);
        if count == 0 {
            continue;
        }
        ranges.push(WorkRange::new(start, start + count));
        start += count;
    }

    debug_assert_eq!(start, rows_a);
    Ok(ranges)
}
