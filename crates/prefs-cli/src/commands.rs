use std::thread;

use anyhow::{anyhow, Context};
use colored::Colorize;
use prefs_core::{
    registry, DurableStore, FileDurableStore, IntKey, Key, KeyKind, LongListKey,
    PreferenceManager, PrefsConfig,
};
use tracing::info;

use crate::cli::*;

/// Worker layout for the list demo: (range index, key). Index `i` appends
/// `1000*(i-1)+1 ..= 1000*i`.
const LIST_WORKERS: [(i64, LongListKey); 6] = [
    (1, LongListKey::Long1),
    (2, LongListKey::Long2),
    (3, LongListKey::Long1),
    (4, LongListKey::Long2),
    (5, LongListKey::Long1),
    (5, LongListKey::Long2),
];

const RANGE_LEN: i64 = 1000;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = resolve_config(&cli)?;
    match cli.command {
        Command::Keys => cmd_keys(&cli.format),
        Command::GetInt(args) => {
            let prefs = open(config)?;
            let value = prefs.get_int(args.key)?;
            match cli.format {
                OutputFormat::Text => println!("{} = {}", args.key.name().bold(), value),
                OutputFormat::Json => println!("{value}"),
            }
            Ok(())
        }
        Command::SetInt(args) => {
            let prefs = open(config)?;
            prefs.set_int(args.key, args.value)?;
            println!("{} Set {} = {}", "✓".green(), args.key.name().bold(), args.value);
            Ok(())
        }
        Command::GetList(args) => {
            let prefs = open(config)?;
            let list = prefs.get_list(args.key)?;
            match cli.format {
                OutputFormat::Text => {
                    println!("{} ({} items): {:?}", args.key.name().bold(), list.len(), list)
                }
                OutputFormat::Json => println!("{}", serde_json::to_string(&list)?),
            }
            Ok(())
        }
        Command::Add(args) => {
            let prefs = open(config)?;
            prefs.add_from_list(args.key, args.value)?;
            println!("{} Added {} to {}", "✓".green(), args.value, args.key.name().bold());
            Ok(())
        }
        Command::Remove(args) => {
            let prefs = open(config)?;
            prefs.remove_from_list(args.key, args.value)?;
            println!("{} Removed {} from {}", "✓".green(), args.value, args.key.name().bold());
            Ok(())
        }
        Command::DemoLists => {
            let prefs = open(config)?;
            let report = demo_lists(&prefs)?;
            print_list_report(&report);
            Ok(())
        }
        Command::DemoInts(args) => {
            let prefs = open(config)?;
            let report = demo_ints(&prefs, &args)?;
            print_int_report(&report, args.serialized);
            Ok(())
        }
    }
}

fn resolve_config(cli: &Cli) -> anyhow::Result<PrefsConfig> {
    let mut config = match &cli.config {
        Some(path) => PrefsConfig::load(path)?,
        None => PrefsConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(lock) = cli.lock {
        config.lock_mode = lock.into();
    }
    Ok(config)
}

fn open(config: PrefsConfig) -> anyhow::Result<PreferenceManager<FileDurableStore>> {
    let dir = config.data_dir.display().to_string();
    PreferenceManager::open(config).with_context(|| format!("opening preferences in {dir}"))
}

fn cmd_keys(format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            for d in registry() {
                let kind = match d.kind {
                    KeyKind::Int => "int".cyan(),
                    KeyKind::List => "list<i64>".yellow(),
                };
                println!("{:<8} {}", d.name.bold(), kind);
            }
        }
        OutputFormat::Json => println!("{}", keys_json()?),
    }
    Ok(())
}

fn keys_json() -> anyhow::Result<String> {
    Ok(serde_json::to_string(&registry())?)
}

// ---------------------------------------------------------------------------
// List demo
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct ListDemoRow {
    pub key: LongListKey,
    pub start_len: usize,
    pub end_len: usize,
    pub expected_growth: usize,
}

impl ListDemoRow {
    /// Signed change in length; negative if the list shrank meanwhile.
    pub fn growth(&self) -> i64 {
        self.end_len as i64 - self.start_len as i64
    }
}

/// Run the list workers concurrently and report per-key growth.
pub fn demo_lists<S: DurableStore>(
    prefs: &PreferenceManager<S>,
) -> anyhow::Result<Vec<ListDemoRow>> {
    let mut rows = Vec::new();
    for key in LongListKey::ALL {
        let start = prefs.get_list(key)?;
        info!(key = key.name(), len = start.len(), "start");
        let workers = LIST_WORKERS.iter().filter(|(_, k)| *k == key).count();
        rows.push(ListDemoRow {
            key,
            start_len: start.len(),
            end_len: 0,
            expected_growth: workers * RANGE_LEN as usize,
        });
    }

    thread::scope(|scope| -> anyhow::Result<()> {
        let handles: Vec<_> = LIST_WORKERS
            .iter()
            .map(|&(index, key)| {
                scope.spawn(move || -> anyhow::Result<()> {
                    info!(key = key.name(), index, "worker started");
                    for v in (RANGE_LEN * (index - 1) + 1)..=(RANGE_LEN * index) {
                        prefs.add_from_list(key, v)?;
                    }
                    info!(key = key.name(), index, "worker finished");
                    Ok(())
                })
            })
            .collect();
        for h in handles {
            h.join().map_err(|_| anyhow!("list worker panicked"))??;
        }
        Ok(())
    })?;

    for row in &mut rows {
        let end = prefs.get_list(row.key)?;
        info!(key = row.key.name(), len = end.len(), "end");
        row.end_len = end.len();
    }
    Ok(rows)
}

fn print_list_report(rows: &[ListDemoRow]) {
    for row in rows {
        let growth = row.growth();
        let mark = if growth == row.expected_growth as i64 {
            "✓".green().bold()
        } else {
            "✗".red().bold()
        };
        println!(
            "{} {}: {} → {} ({:+}, expected +{})",
            mark,
            row.key.name().bold(),
            row.start_len,
            row.end_len,
            growth,
            row.expected_growth
        );
    }
}

// ---------------------------------------------------------------------------
// Int demo
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct IntDemoReport {
    pub key: IntKey,
    pub start: i32,
    pub end: i32,
    pub expected: i64,
}

impl IntDemoReport {
    pub fn lost_updates(&self) -> i64 {
        self.expected - i64::from(self.end)
    }
}

/// Increment `args.key` from `args.workers` threads and report the outcome.
///
/// Without `serialized` each increment is a bare `get_int` then `set_int`,
/// so the end value can fall short of the expected total.
pub fn demo_ints<S: DurableStore>(
    prefs: &PreferenceManager<S>,
    args: &DemoIntsArgs,
) -> anyhow::Result<IntDemoReport> {
    let key = args.key;
    let start = prefs.get_int(key)?;
    info!(key = key.name(), start, workers = args.workers, "int demo start");

    thread::scope(|scope| -> anyhow::Result<()> {
        let handles: Vec<_> = (0..args.workers)
            .map(|index| {
                scope.spawn(move || -> anyhow::Result<()> {
                    info!(key = key.name(), index, "worker started");
                    for _ in 0..args.increments {
                        if args.serialized {
                            prefs.update_int_serialized(key, |v| v.wrapping_add(1))?;
                        } else {
                            let v = prefs.get_int(key)?;
                            prefs.set_int(key, v.wrapping_add(1))?;
                        }
                    }
                    info!(key = key.name(), index, "worker finished");
                    Ok(())
                })
            })
            .collect();
        for h in handles {
            h.join().map_err(|_| anyhow!("int worker panicked"))??;
        }
        Ok(())
    })?;

    let end = prefs.get_int(key)?;
    let expected = i64::from(start) + (args.workers * args.increments) as i64;
    info!(key = key.name(), end, expected, "int demo end");
    Ok(IntDemoReport {
        key,
        start,
        end,
        expected,
    })
}

fn print_int_report(report: &IntDemoReport, serialized: bool) {
    let mode = if serialized { "serialized" } else { "unguarded" };
    println!(
        "{} ({}): {} → {} (expected {})",
        report.key.name().bold(),
        mode.cyan(),
        report.start,
        report.end,
        report.expected
    );
    match report.lost_updates() {
        0 => println!("  {} no lost updates", "✓".green()),
        lost => println!("  {} {} lost updates", "!".yellow().bold(), lost),
    }
}
