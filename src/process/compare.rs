use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::{Pid, ProcessEntry};

/// Attribute a list or tree level is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    Pid,
    User,
    Nice,
    Size,
    PercentCpu,
    PercentMemory,
    Time,
    Command,
}

impl SortKey {
    /// Columns that read best largest-first are sorted descending.
    pub fn is_descending(self) -> bool {
        matches!(
            self,
            SortKey::Size | SortKey::PercentCpu | SortKey::PercentMemory | SortKey::Time
        )
    }

    /// Strict total order: every key except `Pid` falls back to the pid,
    /// which always ascends.
    pub fn compare(self, a: &ProcessEntry, b: &ProcessEntry) -> Ordering {
        let primary = match self {
            SortKey::Pid => Ordering::Equal,
            SortKey::User => cmp_ignore_case(a.user(), b.user()),
            SortKey::Nice => a.nice().cmp(&b.nice()),
            SortKey::Size => a.resident().cmp(&b.resident()),
            SortKey::PercentCpu => a.percent_cpu().total_cmp(&b.percent_cpu()),
            SortKey::PercentMemory => a.percent_memory().total_cmp(&b.percent_memory()),
            SortKey::Time => a.time().cmp(&b.time()),
            SortKey::Command => cmp_ignore_case(a.command(), b.command()),
        };
        let primary = if self.is_descending() {
            primary.reverse()
        } else {
            primary
        };
        primary.then_with(|| a.pid().cmp(&b.pid()))
    }

    /// Compares two pids through their entries. A pid without an entry
    /// sorts by pid alone.
    pub fn compare_pids(self, entries: &BTreeMap<Pid, ProcessEntry>, a: Pid, b: Pid) -> Ordering {
        match (entries.get(&a), entries.get(&b)) {
            (Some(ea), Some(eb)) => self.compare(ea, eb),
            _ => a.cmp(&b),
        }
    }
}

/// Order of the type-ahead index: command name, case-insensitive.
pub fn compare_for_search(a: &ProcessEntry, b: &ProcessEntry) -> Ordering {
    cmp_ignore_case(a.command(), b.command()).then_with(|| a.pid().cmp(&b.pid()))
}

pub fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

/// Inserts `pid` into an already sorted list at its ordered position.
pub(crate) fn insert_sorted<F>(list: &mut Vec<Pid>, pid: Pid, mut compare: F)
where
    F: FnMut(Pid, Pid) -> Ordering,
{
    let pos = list.partition_point(|&other| compare(other, pid) == Ordering::Less);
    list.insert(pos, pid);
}
