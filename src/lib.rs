//! Process snapshot and reconciliation engine of the Drakon process manager.
//!
//! [`ProcessList`] re-reads the process table on every [`ProcessList::update`],
//! keeps one [`ProcessEntry`] per live pid across refreshes and maintains a
//! sorted list, a type-ahead index, a hidden set for other users' processes
//! and a parent/child tree over them.

pub mod config;
pub mod error;
pub mod manager;
pub mod process;
pub mod render;
pub mod source;
pub mod stats;
pub mod user;

pub use config::{Config, EnumerationFailurePolicy};
pub use error::{ProcessError, ProcessResult};
pub use manager::columns::{ListColumn, TreeColumn};
pub use manager::{ListEvent, ProcessList};
pub use process::{EntryId, Pid, ProcessEntry, ProcessState, SortKey, Uid};
pub use source::{ProcessSource, ProcfsSource};
