use std::collections::VecDeque;

use crate::manager::ProcessList;
use crate::process::{MemoryInfo, Uid};
use crate::source::ProcessSource;

/// CPU and memory split between the current user and everybody else.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SystemSummary {
    pub user_cpu: f64,
    pub other_cpu: f64,
    pub user_memory: f64,
    pub other_memory: f64,
}

impl SystemSummary {
    /// Hidden entries always count as "other", whoever owns them.
    ///
    /// The memory split follows `free`: buffers and cache are "other", the
    /// rest of the used memory is "user".
    pub fn compute<S: ProcessSource>(list: &ProcessList<S>, memory: Option<MemoryInfo>, uid: Uid) -> Self {
        let mut summary = SystemSummary::default();

        for entry in list.iter() {
            if entry.uid() == uid {
                summary.user_cpu += entry.percent_cpu();
            } else {
                summary.other_cpu += entry.percent_cpu();
            }
        }
        summary.other_cpu += list.hidden_processes().map(|e| e.percent_cpu()).sum::<f64>();

        if let Some(memory) = memory.filter(|m| m.total_kib > 0) {
            let total = memory.total_kib as f64;
            let other = (memory.buffers_kib + memory.cached_kib) as f64;
            summary.user_memory = 100.0 * (1.0 - (memory.free_kib as f64 + other) / total);
            summary.other_memory = 100.0 * other / total;
        }

        summary
    }

    pub fn total_cpu(&self) -> f64 {
        self.user_cpu + self.other_cpu
    }
}

/// Rolling CPU history, newest sample last.
#[derive(Debug, Clone)]
pub struct CpuHistory {
    samples: VecDeque<(f64, f64)>,
    capacity: usize,
    max_cpu: f64,
}

impl CpuHistory {
    pub fn new(capacity: usize) -> Self {
        CpuHistory {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            max_cpu: 100.0,
        }
    }

    pub fn push(&mut self, summary: &SystemSummary) {
        // more than 100% means more than one CPU
        while summary.total_cpu() > self.max_cpu + 5.0 {
            self.max_cpu += 100.0;
        }

        self.samples.push_back((summary.user_cpu, summary.other_cpu));
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    /// Scale of the history: 100 per CPU seen busy so far.
    pub fn max_cpu(&self) -> f64 {
        self.max_cpu
    }

    pub fn samples(&self) -> impl Iterator<Item = &(f64, f64)> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::Config;
    use crate::source::fake::FakeSource;

    #[test]
    fn cpu_split_by_owner_including_hidden() {
        let source = FakeSource::new();
        source.spawn(1, 0, 0, "init");
        source.spawn(10, 1, 1000, "editor");
        source.spawn(20, 1, 33, "httpd");
        let mut list = ProcessList::with_user(source, &Config::default(), 1000);

        list.source().set_ticks(10, 60, 0);
        list.source().set_ticks(20, 30, 0);
        let now = list.last_update().unwrap() + Duration::from_secs(3);
        list.update_at(now);

        let summary = SystemSummary::compute(&list, None, 1000);
        assert!((summary.user_cpu - 20.0).abs() < 1e-9);
        assert!((summary.other_cpu - 10.0).abs() < 1e-9);
        assert_eq!(summary.user_memory, 0.0);
    }

    #[test]
    fn memory_split() {
        let source = FakeSource::new();
        source.set_memory(MemoryInfo {
            total_kib: 1000,
            free_kib: 250,
            buffers_kib: 100,
            cached_kib: 150,
        });
        let memory = source.memory_info().ok();
        let list = ProcessList::with_user(source, &Config::default(), 1000);

        let summary = SystemSummary::compute(&list, memory, 1000);
        assert!((summary.user_memory - 50.0).abs() < 1e-9);
        assert!((summary.other_memory - 25.0).abs() < 1e-9);
    }

    #[test]
    fn history_scale_grows_per_cpu() {
        let mut history = CpuHistory::new(3);
        assert_eq!(history.max_cpu(), 100.0);

        history.push(&SystemSummary { user_cpu: 60.0, other_cpu: 44.0, ..Default::default() });
        assert_eq!(history.max_cpu(), 100.0);

        history.push(&SystemSummary { user_cpu: 250.0, other_cpu: 10.0, ..Default::default() });
        assert_eq!(history.max_cpu(), 300.0);

        history.push(&SystemSummary::default());
        history.push(&SystemSummary::default());
        assert_eq!(history.len(), 3);
        assert_eq!(history.samples().next(), Some(&(250.0, 10.0)));
    }
}
