use std::io::{self, Write};

use crate::manager::ProcessList;
use crate::process::ProcessEntry;
use crate::source::ProcessSource;
use crate::stats::SystemSummary;

const HEADER: &str = "S    PID USER       NI     SIZE   %CPU   %MEM     TIME COMMAND";

/// Formats CPU seconds as `H:MM:SS`.
pub fn format_time(seconds: u64) -> String {
    format!("{}:{:02}:{:02}", seconds / 3600, (seconds / 60) % 60, seconds % 60)
}

fn row(entry: &ProcessEntry, command: &str) -> String {
    let user: String = entry.user().chars().take(10).collect();
    format!(
        "{} {:>6} {:<10} {:>3} {:>8} {:>6.1} {:>6.1} {:>8} {}",
        entry.state().code(),
        entry.pid(),
        user,
        entry.nice(),
        entry.resident(),
        entry.percent_cpu(),
        entry.percent_memory(),
        format_time(entry.time()),
        command
    )
}

/// Writes the visible entries in list order.
pub fn write_list<S: ProcessSource, W: Write>(list: &ProcessList<S>, out: &mut W) -> io::Result<()> {
    writeln!(out, "{HEADER}")?;
    for entry in list.iter() {
        let command = entry.full_command().unwrap_or(entry.command());
        writeln!(out, "{}", row(entry, command))?;
    }
    Ok(())
}

/// Writes the process tree, children indented under their parent.
pub fn write_tree<S: ProcessSource, W: Write>(list: &ProcessList<S>, out: &mut W) -> io::Result<()> {
    writeln!(out, "{HEADER}")?;
    for (pid, depth) in list.tree().walk() {
        let Some(entry) = list.find_process_entry(pid) else {
            continue;
        };
        let command = format!("{}{}", "  ".repeat(depth), entry.command());
        writeln!(out, "{}", row(entry, &command))?;
    }
    Ok(())
}

pub fn write_summary<W: Write>(summary: &SystemSummary, out: &mut W) -> io::Result<()> {
    writeln!(
        out,
        "cpu: {:.1}% user, {:.1}% other | mem: {:.1}% user, {:.1}% buffers/cache",
        summary.user_cpu, summary.other_cpu, summary.user_memory, summary.other_memory
    )
}
