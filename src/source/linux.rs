use std::cell::RefCell;

use procfs::process::{Process as ProcfsProcess, all_processes};
use procfs::{Current, Meminfo, ProcError};
use tracing::trace;

use crate::error::{ProcessError, ProcessResult};
use crate::process::{MemoryInfo, Pid, ProcessSample, ProcessStub, Uid};
use crate::source::ProcessSource;
use crate::user::UserNameCache;

/// Reads processes from the Linux `/proc` filesystem.
pub struct ProcfsSource {
    page_kib: u64,
    hz: u64,
    users: RefCell<UserNameCache>,
}

impl ProcfsSource {
    pub fn new() -> Self {
        let page_size: u64 = procfs::page_size();
        // _SC_CLK_TCK is almost always 100 but 1000 exists in the wild
        let hz = unsafe { libc::sysconf(libc::_SC_CLK_TCK) };
        ProcfsSource {
            page_kib: (page_size / 1024).max(1),
            hz: if hz > 0 { hz as u64 } else { 100 },
            users: RefCell::new(UserNameCache::default()),
        }
    }

    fn open(pid: Pid) -> ProcessResult<ProcfsProcess> {
        ProcfsProcess::new(pid).map_err(|err| read_error(pid, err))
    }
}

impl Default for ProcfsSource {
    fn default() -> Self {
        Self::new()
    }
}

fn read_error(pid: Pid, err: ProcError) -> ProcessError {
    match err {
        ProcError::NotFound(_) => ProcessError::UnknownProcess(pid),
        source => ProcessError::Read { pid, source },
    }
}

impl ProcessSource for ProcfsSource {
    fn enumerate(&self) -> ProcessResult<Vec<ProcessStub>> {
        let processes = all_processes().map_err(ProcessError::CannotAccessProcesses)?;

        let mut stubs = Vec::new();
        for process in processes {
            let process = match process {
                Ok(p) => p,
                Err(_) => continue, //Vanished between listing and opening
            };
            match process.uid() {
                Ok(uid) => stubs.push(ProcessStub {
                    pid: process.pid(),
                    uid,
                }),
                Err(err) => trace!(pid = process.pid(), %err, "cannot stat process directory"),
            }
        }
        stubs.sort_by_key(|stub| stub.pid);
        Ok(stubs)
    }

    fn sample(&self, pid: Pid) -> ProcessResult<ProcessSample> {
        let process = Self::open(pid)?;
        let stat = process.stat().map_err(|err| read_error(pid, err))?;
        let statm = process.statm().map_err(|err| read_error(pid, err))?;

        Ok(ProcessSample {
            ppid: stat.ppid,
            command: stat.comm,
            state_code: stat.state,
            priority: stat.priority,
            nice: stat.nice,
            size_kib: statm.size * self.page_kib,
            resident_kib: statm.resident * self.page_kib,
            share_kib: statm.shared * self.page_kib,
            user_ticks: stat.utime,
            system_ticks: stat.stime,
        })
    }

    fn command_line(&self, pid: Pid) -> ProcessResult<Vec<String>> {
        Self::open(pid)?
            .cmdline()
            .map_err(|err| read_error(pid, err))
    }

    fn user_name(&self, uid: Uid) -> String {
        self.users.borrow_mut().name(uid)
    }

    fn memory_info(&self) -> ProcessResult<MemoryInfo> {
        // procfs reports bytes
        let meminfo = Meminfo::current().map_err(ProcessError::MemoryInfo)?;
        Ok(MemoryInfo {
            total_kib: meminfo.mem_total / 1024,
            free_kib: meminfo.mem_free / 1024,
            buffers_kib: meminfo.buffers / 1024,
            cached_kib: meminfo.cached / 1024,
        })
    }

    fn ticks_per_second(&self) -> u64 {
        self.hz
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sees_own_process() {
        let source = ProcfsSource::new();
        let me = std::process::id() as Pid;

        let stubs = source.enumerate().unwrap();
        let stub = stubs.iter().find(|s| s.pid == me).expect("own pid listed");
        assert_eq!(stub.uid, nix::unistd::getuid().as_raw());
        assert!(stubs.windows(2).all(|w| w[0].pid < w[1].pid));

        let sample = source.sample(me).unwrap();
        assert!(sample.resident_kib > 0);
        assert!(!source.command_line(me).unwrap().is_empty());
    }

    #[test]
    fn missing_pid_is_unknown() {
        let source = ProcfsSource::new();
        // pid_max never reaches i32::MAX
        assert!(matches!(
            source.sample(Pid::MAX),
            Err(ProcessError::UnknownProcess(_))
        ));
    }

    #[test]
    fn memory_total_is_known() {
        let source = ProcfsSource::new();
        assert!(source.total_memory_kib().unwrap() > 0);
        assert!(source.ticks_per_second() > 0);
    }
}
