use crate::error::ProcessResult;
use crate::process::{MemoryInfo, Pid, ProcessSample, ProcessStub, Uid};

#[cfg(test)]
pub(crate) mod fake;
pub mod linux;

pub use self::linux::ProcfsSource;

/// Everything the engine needs from the operating system.
pub trait ProcessSource {
    /// Lists every process currently in the process table.
    fn enumerate(&self) -> ProcessResult<Vec<ProcessStub>>;

    fn sample(&self, pid: Pid) -> ProcessResult<ProcessSample>;

    fn command_line(&self, pid: Pid) -> ProcessResult<Vec<String>>;

    /// Login name for `uid`, or the uid itself when it has no passwd entry.
    fn user_name(&self, uid: Uid) -> String;

    fn memory_info(&self) -> ProcessResult<MemoryInfo>;

    fn ticks_per_second(&self) -> u64;

    fn total_memory_kib(&self) -> Option<u64> {
        self.memory_info()
            .ok()
            .map(|info| info.total_kib)
            .filter(|&total| total > 0)
    }
}
