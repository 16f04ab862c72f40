use clap::ValueEnum;

use crate::process::SortKey;

/// Columns of the flat list, numbered from 1 in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListColumn {
    #[value(skip)]
    State = 1,
    Pid,
    User,
    Nice,
    Size,
    Cpu,
    Memory,
    Time,
    Command,
}

impl ListColumn {
    pub const ALL: [ListColumn; 9] = [
        ListColumn::State,
        ListColumn::Pid,
        ListColumn::User,
        ListColumn::Nice,
        ListColumn::Size,
        ListColumn::Cpu,
        ListColumn::Memory,
        ListColumn::Time,
        ListColumn::Command,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        index.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// `None` for columns the list cannot be ordered by.
    pub fn sort_key(self) -> Option<SortKey> {
        match self {
            ListColumn::State => None,
            ListColumn::Pid => Some(SortKey::Pid),
            ListColumn::User => Some(SortKey::User),
            ListColumn::Nice => Some(SortKey::Nice),
            ListColumn::Size => Some(SortKey::Size),
            ListColumn::Cpu => Some(SortKey::PercentCpu),
            ListColumn::Memory => Some(SortKey::PercentMemory),
            ListColumn::Time => Some(SortKey::Time),
            ListColumn::Command => Some(SortKey::Command),
        }
    }
}

/// Columns of the tree view. The first one only holds the expander.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TreeColumn {
    #[value(skip)]
    OpenClose = 1,
    Command,
    #[value(skip)]
    State,
    Pid,
    User,
    Nice,
    Size,
    Cpu,
    Memory,
    Time,
}

impl TreeColumn {
    pub const ALL: [TreeColumn; 10] = [
        TreeColumn::OpenClose,
        TreeColumn::Command,
        TreeColumn::State,
        TreeColumn::Pid,
        TreeColumn::User,
        TreeColumn::Nice,
        TreeColumn::Size,
        TreeColumn::Cpu,
        TreeColumn::Memory,
        TreeColumn::Time,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        index.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn sort_key(self) -> Option<SortKey> {
        match self {
            TreeColumn::OpenClose | TreeColumn::State => None,
            TreeColumn::Command => Some(SortKey::Command),
            TreeColumn::Pid => Some(SortKey::Pid),
            TreeColumn::User => Some(SortKey::User),
            TreeColumn::Nice => Some(SortKey::Nice),
            TreeColumn::Size => Some(SortKey::Size),
            TreeColumn::Cpu => Some(SortKey::PercentCpu),
            TreeColumn::Memory => Some(SortKey::PercentMemory),
            TreeColumn::Time => Some(SortKey::Time),
        }
    }
}
