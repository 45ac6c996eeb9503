//! Best-effort OS hooks used by the workers and the monitor.
//!
//! None of these can fail the computation. When the platform does not
//! support something the caller gets a degraded value (`Unsupported`,
//! `None`, `0.0`) and carries on.
//!
//! | Hook | Linux | macOS | Windows | Other |
//! |------|-------|-------|---------|-------|
//! | [`pin_to_core`] | ✓ | scheduler hint | ✓ | `Unsupported` |
//! | [`thread_cpu_time`] | ✓ | ✓ | `None` | `None` |
//! | [`process_memory_mb`] | current RSS | peak RSS | `0.0` | peak RSS or `0.0` |
//! | [`native_thread_id`] | ✓ | `None` | `None` | `None` |

pub mod affinity;
pub mod cpu_time;
pub mod memory;

pub use affinity::{PinOutcome, native_thread_id, pin_to_core};
pub use cpu_time::thread_cpu_time;
pub use memory::process_memory_mb;
