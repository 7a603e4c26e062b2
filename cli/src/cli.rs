use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "vm-wizard", version, about = "Replay and inspect VM creation wizard sessions")]
pub struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a recorded session through the wizard and print the tab summary
    Replay {
        /// Session file: `{ "commonData", "templates", "actions" }`
        session: PathBuf,
        /// Print the final state as JSON instead of a table
        #[arg(long)]
        json: bool,
        /// Print the internal actions each step emitted
        #[arg(long)]
        trace: bool,
    },
    /// Show the effective configuration
    Config {
        /// Write the default configuration to the config path
        #[arg(long)]
        init: bool,
    },
}
