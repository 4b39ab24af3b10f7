use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use prefs_core::{IntKey, LockMode, LongListKey};

#[derive(Parser)]
#[command(
    name = "prefs",
    about = "Typed preference store with explicit mutation contracts",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding settings files (overrides config)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Mutation lock partitioning (overrides config)
    #[arg(long, global = true)]
    pub lock: Option<LockArg>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LockArg {
    Global,
    PerKey,
}

impl From<LockArg> for LockMode {
    fn from(arg: LockArg) -> Self {
        match arg {
            LockArg::Global => LockMode::Global,
            LockArg::PerKey => LockMode::PerKey,
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// List registered keys
    Keys,
    /// Read an int key
    GetInt(IntKeyArgs),
    /// Write an int key
    SetInt(SetIntArgs),
    /// Read a list key
    GetList(ListKeyArgs),
    /// Append a value to a list key
    Add(ListValueArgs),
    /// Remove the first occurrence of a value from a list key
    Remove(ListValueArgs),
    /// Append disjoint ranges to both list keys from concurrent workers
    DemoLists,
    /// Increment an int key from concurrent workers and count lost updates
    DemoInts(DemoIntsArgs),
}

#[derive(Args)]
pub struct IntKeyArgs {
    pub key: IntKey,
}

#[derive(Args)]
pub struct SetIntArgs {
    pub key: IntKey,
    #[arg(allow_negative_numbers = true)]
    pub value: i32,
}

#[derive(Args)]
pub struct ListKeyArgs {
    pub key: LongListKey,
}

#[derive(Args)]
pub struct ListValueArgs {
    pub key: LongListKey,
    #[arg(allow_negative_numbers = true)]
    pub value: i64,
}

#[derive(Args)]
pub struct DemoIntsArgs {
    #[arg(long, default_value = "INT1")]
    pub key: IntKey,
    #[arg(long, default_value = "6")]
    pub workers: usize,
    #[arg(long, default_value = "10000")]
    pub increments: usize,
    /// Use the lock-guarded increment instead of get/set
    #[arg(long)]
    pub serialized: bool,
}
