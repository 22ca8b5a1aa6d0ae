//! Memory ceiling watchdog (spec.md §4.7, §5): resident heap is sampled
//! on a fixed interval by a dedicated background thread (see `stdio.rs`),
//! independent of whether a request is in flight; breaching the
//! configured ceiling is a resource-class error (spec.md §7) and
//! terminates the process.
//!
//! No direct teacher precedent — `keel-server` has no equivalent check.
//! Reads `/proc/self/status` directly rather than pulling in a crate,
//! since the only portable alternative (`libc::getrusage`) reports peak
//! RSS, not current RSS, which is the wrong quantity for a ceiling that
//! should recover if memory is freed.

pub struct MemoryWatchdog {
    ceiling_mb: u32,
}

impl MemoryWatchdog {
    pub fn new(ceiling_mb: u32) -> Self {
        Self { ceiling_mb }
    }

    /// Returns `Some(resident_mb)` when the process has crossed its
    /// ceiling, `None` otherwise — including when resident memory can't
    /// be determined on the current platform.
    pub fn check(&self) -> Option<u32> {
        let resident_mb = resident_memory_mb()?;
        (resident_mb > self.ceiling_mb).then_some(resident_mb)
    }
}

#[cfg(target_os = "linux")]
fn resident_memory_mb() -> Option<u32> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    for line in status.lines() {
        if let Some(rest) = line.strip_prefix("VmRSS:") {
            let kb: u64 = rest.trim().split_whitespace().next()?.parse().ok()?;
            return Some((kb / 1024) as u32);
        }
    }
    None
}

#[cfg(not(target_os = "linux"))]
fn resident_memory_mb() -> Option<u32> {
    None
}
