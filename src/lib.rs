//! Parallel integer matrix multiplication you can watch.
//!
//! The rows of A are split into contiguous chunks, one per worker thread.
//! Each worker is pinned to its own logical core (when the OS allows it),
//! runs a plain triple loop over its rows and publishes progress and CPU
//! utilization as it goes. A monitor thread prints a live table until the
//! last worker joins, and the run ends with a per-worker summary and a
//! speedup estimate.
//!
//! ## Usage
//!
//! ```
//! use matmul_monitor::{Orchestrator, RunConfig};
//!
//! let config = RunConfig::new(64, 32, 48).with_seed(42);
//! let (outcome, _table) = Orchestrator::new(config)
//!     .run_with_sink(std::io::sink())
//!     .unwrap();
//!
//! assert_eq!(outcome.c.rows(), 64);
//! assert_eq!(outcome.c.cols(), 48);
//! ```
//!
//! For matrices you already have:
//!
//! ```
//! use matmul_monitor::{Matrix, multiply_parallel};
//!
//! let a = Matrix::from_rows(vec![vec![5]]).unwrap();
//! let b = Matrix::from_rows(vec![vec![6]]).unwrap();
//! let (c, _) = multiply_parallel(&a, &b, 4).unwrap();
//! assert_eq!(c.get(0, 0), 30);
//! ```
//!
//! ## What's inside
//!
//! - Row partitioning with at most one row difference between workers
//! - Mutex-guarded per-worker metrics, read through snapshots
//! - Core pinning, per-thread CPU clock and RSS readings, all best-effort
//! - A condvar start gate and an atomic shutdown flag for the monitor

pub mod config;
pub mod error;
pub mod matrix;
pub mod partition;
pub mod platform;
pub mod report;
pub mod threaded;

pub use config::RunConfig;
pub use error::{MatmulError, Result};
pub use matrix::Matrix;
pub use matrix::generate::generate_operands;
pub use matrix::naive_ijk::multiply_reference;
pub use partition::{WorkRange, partition_rows};
pub use report::{RunSummary, Speedup};
pub use threaded::orchestrator::{Orchestrator, RunOutcome, multiply_parallel};
