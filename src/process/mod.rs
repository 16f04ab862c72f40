use tracing::trace;

use crate::source::ProcessSource;

pub mod compare;
mod sample;
pub mod tree;

pub use compare::SortKey;
pub use sample::{MemoryInfo, ProcessSample, ProcessStub};

pub type Pid = libc::pid_t;
pub type Uid = libc::uid_t;

/// Scheduling state as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Sleep,
    UninterruptibleSleep,
    Running,
    Zombie,
    Stopped,
}

impl ProcessState {
    /// Maps the single-letter code of `/proc/[pid]/stat`.
    pub fn from_code(code: char) -> Self {
        match code {
            'S' => ProcessState::Sleep,
            'D' => ProcessState::UninterruptibleSleep,
            'Z' => ProcessState::Zombie,
            'T' => ProcessState::Stopped,
            _ => ProcessState::Running,
        }
    }

    pub fn code(self) -> char {
        match self {
            ProcessState::Sleep => 'S',
            ProcessState::UninterruptibleSleep => 'D',
            ProcessState::Running => 'R',
            ProcessState::Zombie => 'Z',
            ProcessState::Stopped => 'T',
        }
    }
}

/// Handle standing in for object identity. An entry keeps its id for as
/// long as its pid stays in the process table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub(crate) u64);

/// One process, kept alive across refreshes while its pid persists.
#[derive(Debug, Clone)]
pub struct ProcessEntry {
    id: EntryId,
    pid: Pid,
    ppid: Pid,
    uid: Uid,
    user: String,
    command: String,
    full_command: Option<String>,
    state: ProcessState,
    priority: i64,
    nice: i64,
    size: u64,
    resident: u64,
    share: u64,
    user_ticks: u64,
    system_ticks: u64,
    last_ticks: Option<(u64, u64)>,
    time: u64,
    percent_cpu: f64,
    percent_memory: f64,
}

impl ProcessEntry {
    pub fn new(id: EntryId, pid: Pid, uid: Uid, user: String) -> Self {
        ProcessEntry {
            id,
            pid,
            ppid: 0,
            uid,
            user,
            command: String::new(),
            full_command: None,
            state: ProcessState::Running,
            priority: 0,
            nice: 0,
            size: 0,
            resident: 0,
            share: 0,
            user_ticks: 0,
            system_ticks: 0,
            last_ticks: None,
            time: 0,
            percent_cpu: 0.0,
            percent_memory: 0.0,
        }
    }

    /// Re-reads the kernel counters and recomputes the derived metrics.
    ///
    /// A failed read marks the entry as a zombie and leaves every other
    /// value at its last good reading.
    pub fn update(&mut self, source: &dyn ProcessSource, elapsed_secs: f64, total_memory_kib: Option<u64>) {
        match source.sample(self.pid) {
            Ok(sample) => {
                self.apply_sample(sample);
                if self.full_command.is_none() {
                    self.read_command_line(source);
                }
            }
            Err(err) => {
                trace!(pid = self.pid, %err, "process read failed, marking as zombie");
                self.state = ProcessState::Zombie;
            }
        }

        self.percent_memory = match total_memory_kib {
            Some(total) if total > 0 => self.resident as f64 * 100.0 / total as f64,
            _ => 0.0,
        };

        let hz = source.ticks_per_second().max(1);
        self.time = (self.user_ticks + self.system_ticks) / hz;

        let delta = self.last_ticks.map(|(last_user, last_system)| {
            self.user_ticks.saturating_sub(last_user) + self.system_ticks.saturating_sub(last_system)
        });
        self.last_ticks = Some((self.user_ticks, self.system_ticks));

        self.percent_cpu = match delta {
            Some(ticks) if elapsed_secs > 0.0 && self.state != ProcessState::Zombie => {
                let cpu_millis = ticks * 1000 / hz;
                cpu_millis as f64 / (10.0 * elapsed_secs)
            }
            _ => 0.0,
        };
    }

    pub(crate) fn apply_sample(&mut self, sample: ProcessSample) {
        self.ppid = sample.ppid;
        self.command = sample.command;
        self.state = ProcessState::from_code(sample.state_code);
        self.priority = sample.priority;
        self.nice = sample.nice;
        self.size = sample.size_kib;
        self.resident = sample.resident_kib;
        self.share = sample.share_kib;
        self.user_ticks = sample.user_ticks;
        self.system_ticks = sample.system_ticks;
    }

    // Kernel threads have no command line; keep asking until one shows up.
    fn read_command_line(&mut self, source: &dyn ProcessSource) {
        if let Ok(args) = source.command_line(self.pid) {
            let joined = args.join(" ");
            let trimmed = joined.trim();
            if !trimmed.is_empty() {
                self.full_command = Some(trimmed.to_string());
            }
        }
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn ppid(&self) -> Pid {
        self.ppid
    }

    pub fn uid(&self) -> Uid {
        self.uid
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Full argument vector joined with spaces, once it has been read.
    pub fn full_command(&self) -> Option<&str> {
        self.full_command.as_deref()
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    pub fn priority(&self) -> i64 {
        self.priority
    }

    pub fn nice(&self) -> i64 {
        self.nice
    }

    /// Virtual size in KiB.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Resident set size in KiB.
    pub fn resident(&self) -> u64 {
        self.resident
    }

    pub fn share(&self) -> u64 {
        self.share
    }

    /// Accumulated user + system CPU time in seconds.
    pub fn time(&self) -> u64 {
        self.time
    }

    pub fn percent_cpu(&self) -> f64 {
        self.percent_cpu
    }

    pub fn percent_memory(&self) -> f64 {
        self.percent_memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::fake::FakeSource;

    fn sample(command: &str, ticks: (u64, u64), resident: u64) -> ProcessSample {
        ProcessSample {
            ppid: 1,
            command: command.to_string(),
            state_code: 'R',
            priority: 20,
            nice: 0,
            size_kib: resident * 4,
            resident_kib: resident,
            share_kib: resident / 2,
            user_ticks: ticks.0,
            system_ticks: ticks.1,
        }
    }

    #[test]
    fn state_codes() {
        assert_eq!(ProcessState::from_code('S'), ProcessState::Sleep);
        assert_eq!(ProcessState::from_code('D'), ProcessState::UninterruptibleSleep);
        assert_eq!(ProcessState::from_code('Z'), ProcessState::Zombie);
        assert_eq!(ProcessState::from_code('T'), ProcessState::Stopped);
        assert_eq!(ProcessState::from_code('R'), ProcessState::Running);
        assert_eq!(ProcessState::from_code('I'), ProcessState::Running);
    }

    #[test]
    fn first_update_reports_no_cpu() {
        let source = FakeSource::new();
        source.insert(42, 1000, sample("worker", (500, 500), 1024));

        let mut entry = ProcessEntry::new(EntryId(0), 42, 1000, "alice".into());
        entry.update(&source, 3.0, Some(8192));

        assert_eq!(entry.percent_cpu(), 0.0);
        assert_eq!(entry.time(), 10);
        assert_eq!(entry.percent_memory(), 12.5);
        assert_eq!(entry.command(), "worker");
    }

    #[test]
    fn cpu_percent_from_tick_delta() {
        let source = FakeSource::new();
        source.insert(42, 1000, sample("worker", (100, 50), 0));

        let mut entry = ProcessEntry::new(EntryId(0), 42, 1000, "alice".into());
        entry.update(&source, 0.0, None);

        // 150 ticks at 100 Hz over 3 seconds is half a CPU.
        source.insert(42, 1000, sample("worker", (200, 100), 0));
        entry.update(&source, 3.0, None);
        assert!((entry.percent_cpu() - 50.0).abs() < 1e-9);

        // zero elapsed time never divides
        source.insert(42, 1000, sample("worker", (300, 100), 0));
        entry.update(&source, 0.0, None);
        assert_eq!(entry.percent_cpu(), 0.0);
    }

    #[test]
    fn read_failure_marks_zombie_and_freezes_stats() {
        let source = FakeSource::new();
        source.insert(7, 0, sample("daemon", (10, 10), 2048));

        let mut entry = ProcessEntry::new(EntryId(0), 7, 0, "root".into());
        entry.update(&source, 0.0, Some(4096));
        source.fail(7);
        entry.update(&source, 3.0, Some(4096));

        assert_eq!(entry.state(), ProcessState::Zombie);
        assert_eq!(entry.resident(), 2048);
        assert_eq!(entry.command(), "daemon");
        assert_eq!(entry.percent_cpu(), 0.0);
        assert_eq!(entry.percent_memory(), 50.0);
    }

    #[test]
    fn command_line_read_until_present() {
        let source = FakeSource::new();
        source.insert(9, 0, sample("kworker", (0, 0), 0));

        let mut entry = ProcessEntry::new(EntryId(0), 9, 0, "root".into());
        entry.update(&source, 0.0, None);
        assert_eq!(entry.full_command(), None);

        source.set_command_line(9, &["/usr/bin/python3", "-m", "http.server"]);
        entry.update(&source, 1.0, None);
        assert_eq!(entry.full_command(), Some("/usr/bin/python3 -m http.server"));

        // read once; later changes are not picked up
        source.set_command_line(9, &["other"]);
        entry.update(&source, 1.0, None);
        assert_eq!(entry.full_command(), Some("/usr/bin/python3 -m http.server"));
    }
}
