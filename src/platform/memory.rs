/// Resident memory of the whole process in MiB.
///
/// Linux reads the current RSS from `/proc/self/statm`. Other Unix systems
/// fall back to the `getrusage` high-water mark. Anything else reports 0.
pub fn process_memory_mb() -> f64 {
    resident_bytes().map_or(0.0, |b| b as f64 / (1024.0 * 1024.0))
}

#[cfg(target_os = "linux")]
fn resident_bytes() -> Option<u64> {
    let statm = std::fs::read_to_string("/proc/self/statm").ok()?;
    let pages: u64 = statm.split_whitespace().nth(1)?.parse().ok()?;
    // SAFETY: sysconf has no preconditions.
    let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    let page_size = u64::try_from(page_size).ok().filter(|&p| p > 0)?;
    Some(pages.saturating_mul(page_size))
}

#[cfg(all(unix, not(target_os = "linux")))]
fn resident_bytes() -> Option<u64> {
    // SAFETY: zeroed rusage is valid and we check the return code.
    let ru = unsafe {
        let mut ru: libc::rusage = std::mem::zeroed();
        if libc::getrusage(libc::RUSAGE_SELF, &mut ru) != 0 {
            return None;
        }
        ru
    };
    let max_rss = u64::try_from(ru.ru_maxrss).ok()?;
    // ru_maxrss is bytes on macOS, KiB elsewhere.
    if cfg!(target_os = "macos") {
        Some(max_rss)
    } else {
        Some(max_rss.saturating_mul(1024))
    }
}

#[cfg(not(unix))]
fn resident_bytes() -> Option<u64> {
    None
}
