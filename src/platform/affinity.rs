/// Result of asking the OS to pin the current thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PinOutcome {
    Pinned(usize),
    Unsupported,
}

impl PinOutcome {
    pub fn is_pinned(&self) -> bool {
        matches!(self, PinOutcome::Pinned(_))
    }
}

/// Pins the calling thread to logical core `index`.
///
/// Returns [`PinOutcome::Unsupported`] when the platform has no affinity
/// control, the core does not exist, or the OS refuses. Callers run
/// unpinned in that case.
pub fn pin_to_core(index: usize) -> PinOutcome {
    let Some(cores) = core_affinity::get_core_ids() else {
        return PinOutcome::Unsupported;
    };
    let Some(core) = cores.into_iter().find(|c| c.id == index) else {
        return PinOutcome::Unsupported;
    };
    if core_affinity::set_for_current(core) {
        PinOutcome::Pinned(index)
    } else {
        PinOutcome::Unsupported
    }
}

/// Kernel thread id of the caller, where the OS exposes one.
#[cfg(any(target_os = "linux", target_os = "android"))]
pub fn native_thread_id() -> Option<u64> {
    // SAFETY: gettid takes no arguments and cannot fail.
    let tid = unsafe { libc::syscall(libc::SYS_gettid) };
    u64::try_from(tid).ok()
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
pub fn native_thread_id() -> Option<u64> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_core_is_unsupported() {
        let outcome = pin_to_core(usize::MAX);
        assert_eq!(outcome, PinOutcome::Unsupported);
        assert!(!outcome.is_pinned());
    }

    #[test]
    fn test_pin_core_zero_never_panics() {
        let outcome = std::thread::spawn(|| pin_to_core(0)).join().unwrap();
        if let PinOutcome::Pinned(id) = outcome {
            assert_eq!(id, 0);
            assert!(outcome.is_pinned());
        }
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_native_tid_differs_per_thread() {
        let main_tid = native_thread_id().unwrap();
        let other = std::thread::spawn(native_thread_id).join().unwrap().unwrap();
        assert_ne!(main_tid, other);
    }
}
