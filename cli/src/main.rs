//! VM Wizard - command line driver
//!
//! Replays recorded wizard sessions through the core pipeline and prints
//! the resulting tab state.

mod cli;
mod report;
mod session;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use session::Session;
use std::path::{Path, PathBuf};
use vm_wizard_core::{WizardConfig, WizardStore};

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(WizardConfig::default_path);

    match cli.command {
        Command::Replay {
            session,
            json,
            trace,
        } => {
            let config = load_config(&config_path)?;
            replay(config, session, json, trace)
        }
        Command::Config { init } => {
            if init {
                WizardConfig::default()
                    .save_to(&config_path)
                    .with_context(|| format!("Failed to write {}", config_path.display()))?;
                println!("Wrote default config to {}", config_path.display());
            }
            let config = load_config(&config_path)?;
            println!("# {}", config_path.display());
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn load_config(path: &Path) -> Result<WizardConfig> {
    if path.exists() {
        WizardConfig::load(path).with_context(|| format!("Failed to load {}", path.display()))
    } else {
        log::info!("No config at {}, using defaults", path.display());
        Ok(WizardConfig::default())
    }
}

fn replay(config: WizardConfig, path: PathBuf, json: bool, trace: bool) -> Result<()> {
    let session = Session::load(&path)?;
    let mut store = WizardStore::new(config);
    let id = store.create(session.common_data);

    for (step, action) in session.actions.into_iter().enumerate() {
        let name = action.name();
        let emitted = store
            .dispatch(id, action)
            .with_context(|| format!("Step {} ({}) failed", step + 1, name))?;
        if trace {
            let names: Vec<&str> = emitted.iter().map(|a| a.name()).collect();
            println!("{:>3}. {} -> [{}]", step + 1, name, names.join(", "));
        }
    }

    let state = store
        .get(id)
        .context("Wizard disappeared during replay")?;
    if json {
        println!("{}", serde_json::to_string_pretty(state)?);
    } else {
        print!("{}", report::render(state));
    }
    Ok(())
}
