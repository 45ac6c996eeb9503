use std::time::Duration;

/// CPU time consumed so far by the calling thread.
///
/// `None` on platforms without a per-thread CPU clock; workers then report
/// 0% utilization instead of guessing.
#[cfg(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "freebsd"
))]
pub fn thread_cpu_time() -> Option<Duration> {
    // SAFETY: zeroed timespec is valid and we check the return code.
    let ts = unsafe {
        let mut ts: libc::timespec = std::mem::zeroed();
        if libc::clock_gettime(libc::CLOCK_THREAD_CPUTIME_ID, &mut ts) != 0 {
            return None;
        }
        ts
    };
    let secs = u64::try_from(ts.tv_sec).ok()?;
    let nanos = u32::try_from(ts.tv_nsec.clamp(0, 999_999_999)).ok()?;
    Some(Duration::new(secs, nanos))
}

#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "freebsd"
)))]
pub fn thread_cpu_time() -> Option<Duration> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_clock_monotonic_when_available() {
        let Some(before) = thread_cpu_time() else {
            println!("Skipping - no per-thread CPU clock");
            return;
        };
        let mut x: u64 = 1;
        for i in 0..2_000_000u64 {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(i);
        }
        std::hint::black_box(x);
        let after = thread_cpu_time().unwrap();
        assert!(after >= before);
    }
}
