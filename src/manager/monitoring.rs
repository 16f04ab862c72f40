use std::collections::BTreeMap;
use std::time::Instant;

use tracing::{debug, warn};

use crate::config::EnumerationFailurePolicy;
use crate::manager::{ListEvent, ProcessList};
use crate::process::tree::TreeParent;
use crate::process::{Pid, ProcessEntry, ProcessStub};
use crate::source::ProcessSource;

impl<S: ProcessSource> ProcessList<S> {
    /// Re-synchronizes the entries with the process table.
    ///
    /// Entries whose pid is still listed are kept and refreshed in place, so
    /// anything holding their pid or [`EntryId`](crate::process::EntryId)
    /// stays valid. Per-process read failures only turn that entry into a
    /// zombie; nothing here fails.
    pub fn update(&mut self) {
        self.update_at(Instant::now());
    }

    pub(crate) fn update_at(&mut self, now: Instant) {
        self.broadcast(ListEvent::PrepareForUpdate);

        let stubs = match self.source.enumerate() {
            Ok(stubs) => stubs,
            Err(err) => match self.on_enumeration_failure {
                EnumerationFailurePolicy::TreatAsEmpty => {
                    warn!(%err, "cannot list processes, treating the table as empty");
                    Vec::new()
                }
                EnumerationFailurePolicy::KeepPrevious => {
                    warn!(%err, "cannot list processes, keeping the previous snapshot");
                    self.broadcast(ListEvent::ListChanged);
                    return;
                }
            },
        };

        let elapsed = self
            .last_update
            .map(|last| now.saturating_duration_since(last).as_secs_f64())
            .unwrap_or(0.0);
        self.last_update = Some(now);

        let mut fresh: BTreeMap<Pid, ProcessStub> =
            stubs.into_iter().map(|stub| (stub.pid, stub)).collect();

        // Without filtering, hidden entries are candidates for the visible
        // list again and keep their identity if still alive.
        let mut candidates = if self.show_user_only {
            BTreeMap::new()
        } else {
            std::mem::take(&mut self.hidden)
        };
        // an owner change means the pid was reused
        candidates.retain(|pid, entry| {
            fresh
                .get(pid)
                .is_some_and(|stub| stub.uid == entry.uid())
        });

        let uid = self.uid;
        self.hidden.retain(|pid, entry| {
            fresh
                .get(pid)
                .is_some_and(|stub| stub.uid != uid && stub.uid == entry.uid())
        });

        if self.show_user_only {
            self.hide_foreign(&mut fresh, elapsed);
        }

        // remove dead processes from the visible list
        let known: Vec<Pid> = self.visible.clone();
        let mut vanished = 0;
        for pid in known {
            if fresh.remove(&pid).is_none() {
                self.take_visible(pid);
                vanished += 1;
            }
        }

        let total_memory_kib = self.total_memory_kib;
        for entry in self.entries.values_mut() {
            entry.update(&self.source, elapsed, total_memory_kib);
        }

        self.sort_visible();
        self.sort_alpha();
        self.tree.sort_children(&self.entries);

        let appeared = fresh.len();
        for (pid, stub) in fresh {
            let mut entry = match candidates.remove(&pid) {
                Some(entry) => entry,
                None => self.new_entry(stub),
            };
            entry.update(&self.source, elapsed, total_memory_kib);
            self.insert_visible(entry);
        }

        self.reparent();

        debug!(
            visible = self.visible.len(),
            hidden = self.hidden.len(),
            appeared,
            vanished,
            elapsed,
            "process list updated"
        );
        self.broadcast(ListEvent::ListChanged);
    }

    /// Moves every fresh process of another user into the hidden set, then
    /// refreshes all hidden entries so system totals stay right.
    fn hide_foreign(&mut self, fresh: &mut BTreeMap<Pid, ProcessStub>, elapsed: f64) {
        let uid = self.uid;
        let foreign: Vec<ProcessStub> = fresh
            .values()
            .filter(|stub| stub.uid != uid)
            .copied()
            .collect();

        for stub in foreign {
            fresh.remove(&stub.pid);
            if self.hidden.contains_key(&stub.pid) {
                continue;
            }
            let entry: ProcessEntry = match self.take_visible(stub.pid) {
                Some(entry) if entry.uid() == stub.uid => entry,
                _ => self.new_entry(stub),
            };
            self.hidden.insert(stub.pid, entry);
        }

        let total_memory_kib = self.total_memory_kib;
        for entry in self.hidden.values_mut() {
            entry.update(&self.source, elapsed, total_memory_kib);
        }
    }

    /// Hangs every visible entry under the visible entry of its parent pid,
    /// or under the root when there is none.
    fn reparent(&mut self) {
        let pids: Vec<Pid> = self.visible.clone();
        for pid in pids {
            let Some(entry) = self.entries.get(&pid) else {
                continue;
            };
            let ppid = entry.ppid();
            let parent = if ppid != pid && self.entries.contains_key(&ppid) {
                TreeParent::Entry(ppid)
            } else {
                TreeParent::Root
            };
            self.tree.attach(&self.entries, pid, parent);
        }
    }
}
