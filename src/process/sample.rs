use super::{Pid, Uid};

/// Minimal record produced by enumerating the process table.
///
/// Only what is needed to decide visibility is read here; everything else
/// comes from a later [`ProcessSample`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessStub {
    pub pid: Pid,
    pub uid: Uid,
}

/// Raw per-process counters as the kernel reports them.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessSample {
    pub ppid: Pid,
    pub command: String,
    pub state_code: char,
    pub priority: i64,
    pub nice: i64,
    pub size_kib: u64,
    pub resident_kib: u64,
    pub share_kib: u64,
    pub user_ticks: u64,
    pub system_ticks: u64,
}

/// System memory counters, all in KiB.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryInfo {
    pub total_kib: u64,
    pub free_kib: u64,
    pub buffers_kib: u64,
    pub cached_kib: u64,
}
