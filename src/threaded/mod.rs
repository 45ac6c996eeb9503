//! Monitored multi-threaded multiplication.
//!
//! One worker thread per row range, each pinned to the core matching its
//! index, plus a monitor thread printing a live table. Workers share A and
//! B read-only and each gets a disjoint mutable window of C, so C needs no
//! lock. Each worker's metrics sit behind their own mutex.
//!
//! - `metrics`: per-worker record and snapshots
//! - `worker`: the compute loop
//! - `monitor`: the live status table
//! - `signal`: shutdown flag and start gate
//! - `orchestrator`: wiring, joins and aggregation

pub mod metrics;
pub mod monitor;
pub mod orchestrator;
pub mod signal;
pub mod worker;
