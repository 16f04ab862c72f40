use std::collections::BTreeMap;
use std::time::Instant;

use crate::config::{Config, EnumerationFailurePolicy};
use crate::process::compare::{cmp_ignore_case, compare_for_search, insert_sorted};
use crate::process::tree::ProcessTree;
use crate::process::{EntryId, Pid, ProcessEntry, ProcessStub, SortKey, Uid};
use crate::source::{ProcessSource, ProcfsSource};
use crate::user::User;

pub mod columns;
pub mod monitoring;

use columns::{ListColumn, TreeColumn};

/// Notifications sent around every change of the visible entries, so a
/// front end can remember its selection before and restore it after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListEvent {
    PrepareForUpdate,
    ListChanged,
}

type Observer = Box<dyn FnMut(ListEvent)>;

/// Owner of every known process and of the views over them: the sorted
/// visible list, the type-ahead index, the hidden set and the tree.
pub struct ProcessList<S: ProcessSource = ProcfsSource> {
    source: S,
    entries: BTreeMap<Pid, ProcessEntry>,
    visible: Vec<Pid>,
    alpha: Vec<Pid>,
    hidden: BTreeMap<Pid, ProcessEntry>,
    tree: ProcessTree,
    list_col: ListColumn,
    list_key: SortKey,
    tree_col: TreeColumn,
    show_user_only: bool,
    uid: Uid,
    total_memory_kib: Option<u64>,
    last_update: Option<Instant>,
    next_id: u64,
    on_enumeration_failure: EnumerationFailurePolicy,
    observers: Vec<Observer>,
}

impl ProcessList<ProcfsSource> {
    /// Lists the processes of the machine, filtered for the current user
    /// unless `config.all_users` is set.
    pub fn from_proc(config: &Config) -> Self {
        Self::new(ProcfsSource::new(), config)
    }
}

impl<S: ProcessSource> ProcessList<S> {
    pub fn new(source: S, config: &Config) -> Self {
        Self::with_user(source, config, User::current().id)
    }

    /// Builds the list and takes the first snapshot.
    pub fn with_user(source: S, config: &Config, uid: Uid) -> Self {
        let (list_col, list_key) = match config.sort.sort_key() {
            Some(key) => (config.sort, key),
            None => (ListColumn::Pid, SortKey::Pid),
        };
        let (tree_col, tree_key) = match config.tree_sort.sort_key() {
            Some(key) => (config.tree_sort, key),
            None => (TreeColumn::Command, SortKey::Command),
        };
        let total_memory_kib = source.total_memory_kib();

        let mut list = ProcessList {
            source,
            entries: BTreeMap::new(),
            visible: Vec::new(),
            alpha: Vec::new(),
            hidden: BTreeMap::new(),
            tree: ProcessTree::new(tree_key),
            list_col,
            list_key,
            tree_col,
            show_user_only: !config.all_users,
            uid,
            total_memory_kib,
            last_update: None,
            next_id: 0,
            on_enumeration_failure: config.on_enumeration_failure,
            observers: Vec::new(),
        };
        list.update();
        list
    }

    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: FnMut(ListEvent) + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    pub(crate) fn broadcast(&mut self, event: ListEvent) {
        for observer in &mut self.observers {
            observer(event);
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// The user whose processes stay visible while filtering.
    pub fn uid(&self) -> Uid {
        self.uid
    }

    pub fn will_show_user_only(&self) -> bool {
        self.show_user_only
    }

    pub fn should_show_user_only(&mut self, show: bool) {
        if self.show_user_only != show {
            self.show_user_only = show;
            self.update();
        }
    }

    pub fn len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    /// Visible entry at `index` in the current sort order.
    pub fn get_process_entry(&self, index: usize) -> Option<&ProcessEntry> {
        self.visible.get(index).and_then(|pid| self.entries.get(pid))
    }

    pub fn entry_index(&self, pid: Pid) -> Option<usize> {
        if !self.entries.contains_key(&pid) {
            return None;
        }
        let key = self.list_key;
        self.visible
            .binary_search_by(|&other| key.compare_pids(&self.entries, other, pid))
            .ok()
    }

    pub fn find_process_entry(&self, pid: Pid) -> Option<&ProcessEntry> {
        self.entries.get(&pid)
    }

    /// Visible entries in the current sort order.
    pub fn iter(&self) -> impl Iterator<Item = &ProcessEntry> + '_ {
        self.visible.iter().filter_map(|pid| self.entries.get(pid))
    }

    /// Processes of other users, tracked while they are filtered out.
    pub fn hidden_processes(&self) -> impl Iterator<Item = &ProcessEntry> + '_ {
        self.hidden.values()
    }

    pub fn tree(&self) -> &ProcessTree {
        &self.tree
    }

    /// Type-ahead lookup: the first command at or after `prefix`, ignoring
    /// case, or the last command when every one sorts before it.
    pub fn closest_match(&self, prefix: &str) -> Option<&ProcessEntry> {
        let index = self.alpha.partition_point(|pid| {
            self.entries
                .get(pid)
                .is_some_and(|e| cmp_ignore_case(e.command(), prefix).is_lt())
        });
        let index = index.min(self.alpha.len().checked_sub(1)?);
        self.alpha.get(index).and_then(|pid| self.entries.get(pid))
    }

    pub fn list_col_is_selected(&self, index: usize) -> bool {
        self.list_col.index() == index
    }

    pub fn selected_list_col(&self) -> ListColumn {
        self.list_col
    }

    pub fn list_col_selected(&mut self, index: usize) {
        let Some(column) = ListColumn::from_index(index) else {
            return;
        };
        let Some(key) = column.sort_key() else {
            return;
        };

        self.broadcast(ListEvent::PrepareForUpdate);
        self.list_col = column;
        self.list_key = key;
        self.sort_visible();
        self.broadcast(ListEvent::ListChanged);
    }

    pub fn tree_col_is_selected(&self, index: usize) -> bool {
        self.tree_col.index() == index
    }

    pub fn selected_tree_col(&self) -> TreeColumn {
        self.tree_col
    }

    pub fn tree_col_selected(&mut self, index: usize) {
        let Some(column) = TreeColumn::from_index(index) else {
            return;
        };
        let Some(key) = column.sort_key() else {
            return;
        };

        self.broadcast(ListEvent::PrepareForUpdate);
        self.tree_col = column;
        self.tree.set_child_key(&self.entries, key);
        self.broadcast(ListEvent::ListChanged);
    }

    #[cfg(test)]
    pub(crate) fn last_update(&self) -> Option<Instant> {
        self.last_update
    }

    fn sort_visible(&mut self) {
        let key = self.list_key;
        self.visible
            .sort_by(|&a, &b| key.compare_pids(&self.entries, a, b));
    }

    fn sort_alpha(&mut self) {
        let entries = &self.entries;
        self.alpha.sort_by(|a, b| match (entries.get(a), entries.get(b)) {
            (Some(ea), Some(eb)) => compare_for_search(ea, eb),
            _ => a.cmp(b),
        });
    }

    fn new_entry(&mut self, stub: ProcessStub) -> ProcessEntry {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        ProcessEntry::new(id, stub.pid, stub.uid, self.source.user_name(stub.uid))
    }

    /// Adds an entry to the visible views. Tree placement happens when
    /// every pid of the refresh is known.
    fn insert_visible(&mut self, entry: ProcessEntry) {
        let pid = entry.pid();
        self.entries.insert(pid, entry);

        let key = self.list_key;
        let entries = &self.entries;
        insert_sorted(&mut self.visible, pid, |a, b| {
            key.compare_pids(entries, a, b)
        });
        insert_sorted(&mut self.alpha, pid, |a, b| {
            match (entries.get(&a), entries.get(&b)) {
                (Some(ea), Some(eb)) => compare_for_search(ea, eb),
                _ => a.cmp(&b),
            }
        });
    }

    /// Takes an entry out of every visible view, handing its children to
    /// the root first.
    fn take_visible(&mut self, pid: Pid) -> Option<ProcessEntry> {
        if !self.entries.contains_key(&pid) {
            return None;
        }
        self.tree.orphan_children(&self.entries, pid);
        self.tree.remove(pid);
        self.alpha.retain(|&p| p != pid);
        self.visible.retain(|&p| p != pid);
        self.entries.remove(&pid)
    }
}
