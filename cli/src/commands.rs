pub mod edit;
pub mod list;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use conncheck_common::device::{DEFAULT_SSH_PORT, TestMode};

#[derive(Parser)]
#[command(name = "conncheck")]
#[command(about = "Track ping and SSH reachability for a fleet of devices.")]
pub struct CommandLine {
    /// Enable debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe devices and merge the results into the inventory
    #[command(alias = "t")]
    Test {
        /// Inventory CSV file
        file: PathBuf,
        /// Which probes to run: all, ping or ssh
        #[arg(long, default_value_t = TestMode::All)]
        mode: TestMode,
        /// Only test the named devices (default: every device)
        #[arg(long = "devices", num_args = 0..)]
        devices: Vec<String>,
        /// Upper bound on devices probed at once
        #[arg(long)]
        concurrency: Option<usize>,
    },
    /// Show the inventory with derived connectivity classes
    #[command(alias = "l")]
    List { file: PathBuf },
    /// Append a device to the inventory
    #[command(alias = "a")]
    Add {
        file: PathBuf,
        #[command(flatten)]
        entry: NewEntry,
    },
    /// Delete devices from the inventory by name
    #[command(alias = "rm")]
    Remove { file: PathBuf, names: Vec<String> },
}

#[derive(Args)]
pub struct NewEntry {
    #[arg(long)]
    pub name: String,
    /// Hostname or IP address
    #[arg(long)]
    pub address: String,
    #[arg(long, default_value_t = DEFAULT_SSH_PORT)]
    pub port: u16,
    #[arg(long, default_value = "")]
    pub username: String,
    #[arg(long, default_value = "")]
    pub password: String,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
