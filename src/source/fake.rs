use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, HashSet};

use procfs::ProcError;

use crate::error::{ProcessError, ProcessResult};
use crate::process::{MemoryInfo, Pid, ProcessSample, ProcessStub, Uid};
use crate::source::ProcessSource;

/// Scripted process table for tests.
pub(crate) struct FakeSource {
    processes: RefCell<BTreeMap<Pid, (Uid, ProcessSample)>>,
    command_lines: RefCell<HashMap<Pid, Vec<String>>>,
    failing: RefCell<HashSet<Pid>>,
    users: RefCell<HashMap<Uid, String>>,
    enumeration_fails: Cell<bool>,
    memory: Cell<MemoryInfo>,
}

impl FakeSource {
    pub fn new() -> Self {
        FakeSource {
            processes: RefCell::new(BTreeMap::new()),
            command_lines: RefCell::new(HashMap::new()),
            failing: RefCell::new(HashSet::new()),
            users: RefCell::new(HashMap::new()),
            enumeration_fails: Cell::new(false),
            memory: Cell::new(MemoryInfo {
                total_kib: 1024 * 1024,
                free_kib: 512 * 1024,
                buffers_kib: 64 * 1024,
                cached_kib: 128 * 1024,
            }),
        }
    }

    pub fn insert(&self, pid: Pid, uid: Uid, sample: ProcessSample) {
        self.failing.borrow_mut().remove(&pid);
        self.processes.borrow_mut().insert(pid, (uid, sample));
    }

    /// Adds a process with only the fields the engine orders by.
    pub fn spawn(&self, pid: Pid, ppid: Pid, uid: Uid, command: &str) {
        self.insert(pid, uid, ProcessSample {
            ppid,
            command: command.to_string(),
            state_code: 'S',
            priority: 20,
            nice: 0,
            size_kib: 4096,
            resident_kib: 1024,
            share_kib: 512,
            user_ticks: 0,
            system_ticks: 0,
        });
    }

    pub fn set_ticks(&self, pid: Pid, user_ticks: u64, system_ticks: u64) {
        if let Some((_, sample)) = self.processes.borrow_mut().get_mut(&pid) {
            sample.user_ticks = user_ticks;
            sample.system_ticks = system_ticks;
        }
    }

    pub fn set_ppid(&self, pid: Pid, ppid: Pid) {
        if let Some((_, sample)) = self.processes.borrow_mut().get_mut(&pid) {
            sample.ppid = ppid;
        }
    }

    /// Same pid, new image, as after `exec`.
    pub fn set_command(&self, pid: Pid, command: &str) {
        if let Some((_, sample)) = self.processes.borrow_mut().get_mut(&pid) {
            sample.command = command.to_string();
        }
    }

    pub fn kill(&self, pid: Pid) {
        self.processes.borrow_mut().remove(&pid);
    }

    /// Keeps `pid` listed but makes every read of it fail.
    pub fn fail(&self, pid: Pid) {
        self.failing.borrow_mut().insert(pid);
    }

    pub fn set_command_line(&self, pid: Pid, args: &[&str]) {
        self.command_lines
            .borrow_mut()
            .insert(pid, args.iter().map(|s| s.to_string()).collect());
    }

    pub fn set_user(&self, uid: Uid, name: &str) {
        self.users.borrow_mut().insert(uid, name.to_string());
    }

    pub fn fail_enumeration(&self, fails: bool) {
        self.enumeration_fails.set(fails);
    }

    pub fn set_memory(&self, memory: MemoryInfo) {
        self.memory.set(memory);
    }
}

impl ProcessSource for FakeSource {
    fn enumerate(&self) -> ProcessResult<Vec<ProcessStub>> {
        if self.enumeration_fails.get() {
            return Err(ProcessError::CannotAccessProcesses(ProcError::PermissionDenied(Some(
                "/proc".into(),
            ))));
        }
        Ok(self
            .processes
            .borrow()
            .iter()
            .map(|(&pid, &(uid, _))| ProcessStub { pid, uid })
            .collect())
    }

    fn sample(&self, pid: Pid) -> ProcessResult<ProcessSample> {
        if self.failing.borrow().contains(&pid) {
            return Err(ProcessError::UnknownProcess(pid));
        }
        self.processes
            .borrow()
            .get(&pid)
            .map(|(_, sample)| sample.clone())
            .ok_or(ProcessError::UnknownProcess(pid))
    }

    fn command_line(&self, pid: Pid) -> ProcessResult<Vec<String>> {
        Ok(self.command_lines.borrow().get(&pid).cloned().unwrap_or_default())
    }

    fn user_name(&self, uid: Uid) -> String {
        self.users
            .borrow()
            .get(&uid)
            .cloned()
            .unwrap_or_else(|| uid.to_string())
    }

    fn memory_info(&self) -> ProcessResult<MemoryInfo> {
        Ok(self.memory.get())
    }

    fn ticks_per_second(&self) -> u64 {
        100
    }
}
