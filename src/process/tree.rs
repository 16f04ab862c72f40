use std::collections::{BTreeMap, HashMap};

use super::compare::insert_sorted;
use super::{Pid, ProcessEntry, SortKey};

/// Where a node hangs in the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeParent {
    Root,
    Entry(Pid),
}

#[derive(Debug, Default)]
struct Node {
    parent: Option<TreeParent>,
    children: Vec<Pid>,
}

/// Parent/child hierarchy of the visible processes.
///
/// Nodes are addressed by pid; the entries themselves live in the owning
/// list and are only borrowed for ordering. Every level is kept sorted by a
/// single child key.
#[derive(Debug)]
pub struct ProcessTree {
    key: SortKey,
    root: Vec<Pid>,
    nodes: HashMap<Pid, Node>,
}

impl ProcessTree {
    pub fn new(key: SortKey) -> Self {
        ProcessTree {
            key,
            root: Vec::new(),
            nodes: HashMap::new(),
        }
    }

    pub fn root_children(&self) -> &[Pid] {
        &self.root
    }

    pub fn children(&self, pid: Pid) -> &[Pid] {
        self.nodes
            .get(&pid)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn parent(&self, pid: Pid) -> Option<TreeParent> {
        self.nodes.get(&pid).and_then(|node| node.parent)
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.parent(pid).is_some()
    }

    /// Hangs `pid` under `parent`, detaching it from wherever it was.
    pub fn attach(&mut self, entries: &BTreeMap<Pid, ProcessEntry>, pid: Pid, parent: TreeParent) {
        if self.parent(pid) == Some(parent) {
            return;
        }
        self.unlink(pid);

        let key = self.key;
        let siblings = match parent {
            TreeParent::Root => &mut self.root,
            TreeParent::Entry(ppid) => &mut self.nodes.entry(ppid).or_default().children,
        };
        insert_sorted(siblings, pid, |a, b| key.compare_pids(entries, a, b));
        self.nodes.entry(pid).or_default().parent = Some(parent);
    }

    /// Moves every child of `pid` up to the root.
    pub fn orphan_children(&mut self, entries: &BTreeMap<Pid, ProcessEntry>, pid: Pid) {
        let children = match self.nodes.get_mut(&pid) {
            Some(node) => std::mem::take(&mut node.children),
            None => return,
        };
        let key = self.key;
        for child in children {
            insert_sorted(&mut self.root, child, |a, b| key.compare_pids(entries, a, b));
            self.nodes.entry(child).or_default().parent = Some(TreeParent::Root);
        }
    }

    /// Drops the node for `pid`. Its children must have been orphaned first.
    pub fn remove(&mut self, pid: Pid) {
        self.unlink(pid);
        self.nodes.remove(&pid);
    }

    /// Re-sorts every level with the current key.
    pub fn sort_children(&mut self, entries: &BTreeMap<Pid, ProcessEntry>) {
        let key = self.key;
        self.root.sort_by(|&a, &b| key.compare_pids(entries, a, b));
        for node in self.nodes.values_mut() {
            node.children.sort_by(|&a, &b| key.compare_pids(entries, a, b));
        }
    }

    pub fn set_child_key(&mut self, entries: &BTreeMap<Pid, ProcessEntry>, key: SortKey) {
        self.key = key;
        self.sort_children(entries);
    }

    /// Depth-first walk in display order, yielding `(pid, depth)`.
    pub fn walk(&self) -> Vec<(Pid, usize)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(Pid, usize)> = self.root.iter().rev().map(|&pid| (pid, 0)).collect();
        while let Some((pid, depth)) = stack.pop() {
            out.push((pid, depth));
            stack.extend(self.children(pid).iter().rev().map(|&child| (child, depth + 1)));
        }
        out
    }

    fn unlink(&mut self, pid: Pid) {
        let previous = match self.nodes.get_mut(&pid) {
            Some(node) => node.parent.take(),
            None => None,
        };
        let siblings = match previous {
            Some(TreeParent::Root) => &mut self.root,
            Some(TreeParent::Entry(ppid)) => match self.nodes.get_mut(&ppid) {
                Some(node) => &mut node.children,
                None => return,
            },
            None => return,
        };
        if let Some(pos) = siblings.iter().position(|&p| p == pid) {
            siblings.remove(pos);
        }
    }
}
