use std::io::{self, Write};
use std::thread;
use std::time::Duration;

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use drakon::render::{write_list, write_summary, write_tree};
use drakon::stats::{CpuHistory, SystemSummary};
use drakon::user::User;
use drakon::{Config, ListEvent, ProcessList, ProcessSource};

/// Headless front end of the Drakon process manager.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    config: Config,

    /// Seconds between refreshes
    #[arg(short, long, default_value_t = 3)]
    interval: u64,

    /// Print the process tree instead of the flat list
    #[arg(short, long)]
    tree: bool,

    /// Stop after this many refreshes
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u64).range(1..))]
    iterations: Option<u64>,

    /// Print the process whose command is closest to PREFIX and exit
    #[arg(long, value_name = "PREFIX")]
    find: Option<String>,

    /// The minimum log level to display
    #[arg(long, value_name = "LEVEL", default_value = "warn")]
    log_level: tracing::Level,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = EnvFilter::from_default_env().add_directive(cli.log_level.into());
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    let mut list = ProcessList::from_proc(&cli.config);
    list.subscribe(|event| {
        if event == ListEvent::ListChanged {
            debug!("list changed");
        }
    });
    let user = User::current();
    info!(
        user = %user.name,
        root = user.is_root(),
        processes = list.len(),
        user_only = list.will_show_user_only(),
        "initial snapshot taken"
    );

    if let Some(prefix) = cli.find.as_deref() {
        match list.closest_match(prefix) {
            Some(entry) => println!(
                "{} {}",
                entry.pid(),
                entry.full_command().unwrap_or(entry.command())
            ),
            None => println!("no processes"),
        }
        return Ok(());
    }

    let mut history = CpuHistory::new(60);
    let mut remaining = cli.iterations;
    loop {
        let summary = SystemSummary::compute(&list, list.source().memory_info().ok(), list.uid());
        history.push(&summary);

        let stdout = io::stdout();
        let mut out = stdout.lock();
        write_summary(&summary, &mut out)?;
        if cli.tree {
            write_tree(&list, &mut out)?;
        } else {
            write_list(&list, &mut out)?;
        }
        writeln!(out)?;
        out.flush()?;
        drop(out);

        if let Some(n) = remaining.as_mut() {
            *n = n.saturating_sub(1);
            if *n == 0 {
                break;
            }
        }

        thread::sleep(Duration::from_secs(cli.interval.max(1)));
        list.update();
    }

    debug!(samples = history.len(), peak_scale = history.max_cpu(), "exiting");
    Ok(())
}
