use clap::{Args, ValueEnum};

use crate::manager::columns::{ListColumn, TreeColumn};

/// What a refresh does when the process table cannot be listed at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum EnumerationFailurePolicy {
    /// Reconcile against an empty table; every entry is dropped and comes
    /// back on the next successful refresh.
    #[default]
    TreatAsEmpty,
    /// Skip the refresh and keep the previous entries untouched.
    KeepPrevious,
}

/// Settings of the process list itself.
#[derive(Debug, Clone, Args)]
pub struct Config {
    /// Show processes of every user instead of only your own
    #[arg(short, long)]
    pub all_users: bool,

    /// Column the list is sorted by
    #[arg(long, value_enum, default_value = "pid")]
    pub sort: ListColumn,

    /// Column sibling processes in the tree are sorted by
    #[arg(long, value_enum, default_value = "command")]
    pub tree_sort: TreeColumn,

    /// Behaviour when /proc cannot be listed
    #[arg(long, value_enum, default_value = "treat-as-empty")]
    pub on_enumeration_failure: EnumerationFailurePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            all_users: false,
            sort: ListColumn::Pid,
            tree_sort: TreeColumn::Command,
            on_enumeration_failure: EnumerationFailurePolicy::default(),
        }
    }
}
